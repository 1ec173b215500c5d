//! User management operations.

use super::{body_from, query_from, unsupported, Arguments, Operation, ToolCategory};
use crate::partner::PartnerRequest;
use crate::types::Result;

pub(crate) fn prepare(operation: Operation, arguments: &Arguments) -> Result<PartnerRequest> {
    let request = match operation {
        Operation::CreateUser => PartnerRequest::post("/api/v5/entity/user/create").with_body(
            body_from(arguments, &["mobile", "area_code", "email", "source", "corp_id"]),
        ),
        Operation::FetchUserProfile => PartnerRequest::get("/api/v5/entity/profile/fetch")
            .with_query(query_from(arguments, &["user_id", "corp_id"])),
        Operation::UpdateUserOwner => PartnerRequest::post("/api/v5/entity/user/owner/update")
            .with_body(body_from(arguments, &["user_id", "owner_id", "corp_id"])),
        Operation::UpdateUserPool => PartnerRequest::post("/api/v5/entity/user/pool/update")
            .with_body(body_from(arguments, &["user_id", "pool_id", "corp_id"])),
        Operation::UpdateUserEmail => PartnerRequest::post("/api/v5/entity/user/email/update")
            .with_body(body_from(arguments, &["user_id", "email", "corp_id"])),
        Operation::FetchUserContact => PartnerRequest::get("/api/v5/entity/user/contact/fetch")
            .with_query(query_from(arguments, &["user_id", "contact_type", "corp_id"])),
        other => return Err(unsupported(ToolCategory::User, other)),
    };
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use serde_json::json;

    fn args(value: serde_json::Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_fetch_profile_forwards_user_id() {
        let request =
            prepare(Operation::FetchUserProfile, &args(json!({"user_id": "u1"}))).unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/api/v5/entity/profile/fetch");
        assert_eq!(request.query, vec![("user_id".to_string(), "u1".to_string())]);
    }

    #[test]
    fn test_create_user_body_omits_missing_fields() {
        let request = prepare(
            Operation::CreateUser,
            &args(json!({"email": "a@b.c", "source": "", "corp_id": "c1"})),
        )
        .unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.body, Some(json!({"email": "a@b.c", "corp_id": "c1"})));
    }

    #[test]
    fn test_rejects_foreign_operation() {
        assert!(prepare(Operation::FetchOrder, &Arguments::new()).is_err());
    }
}
