//! Tag group and user tag operations.

use super::{body_from, query_from, unsupported, Arguments, Operation, ToolCategory};
use crate::partner::PartnerRequest;
use crate::types::Result;

pub(crate) fn prepare(operation: Operation, arguments: &Arguments) -> Result<PartnerRequest> {
    let request = match operation {
        Operation::CreateTagGroup => PartnerRequest::post("/api/v5/entity/tags/group/create")
            .with_body(body_from(arguments, &["name", "description", "corp_id"])),
        Operation::ListTagGroups => PartnerRequest::get("/api/v5/entity/tags/group/list")
            .with_query(query_from(arguments, &["limit", "offset", "corp_id"])),
        Operation::UpdateTagGroup => PartnerRequest::post("/api/v5/entity/tags/group/update")
            .with_body(body_from(arguments, &["group_id", "name", "description", "corp_id"])),
        Operation::DeactivateTagGroup => {
            PartnerRequest::post("/api/v5/entity/tags/group/deactivate")
                .with_body(body_from(arguments, &["group_id", "corp_id"]))
        }
        Operation::ActivateTagGroup => PartnerRequest::post("/api/v5/entity/tags/group/activate")
            .with_body(body_from(arguments, &["group_id", "corp_id"])),
        Operation::AssignUserTag => PartnerRequest::post("/api/v5/entity/user/tags/assign")
            .with_body(body_from(arguments, &["user_id", "tag_id", "corp_id"])),
        Operation::ListUserTags => PartnerRequest::get("/api/v5/entity/user/tags/list")
            .with_query(query_from(arguments, &["user_id", "corp_id"])),
        other => return Err(unsupported(ToolCategory::Tag, other)),
    };
    Ok(request)
}
