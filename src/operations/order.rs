//! Order operations. All reads.

use super::{query_from, unsupported, Arguments, Operation, ToolCategory};
use crate::partner::PartnerRequest;
use crate::types::Result;

pub(crate) fn prepare(operation: Operation, arguments: &Arguments) -> Result<PartnerRequest> {
    let request = match operation {
        Operation::FetchOrder => PartnerRequest::get("/api/v5/entity/order/fetch")
            .with_query(query_from(arguments, &["order_id", "corp_id"])),
        Operation::ListOrders => PartnerRequest::get("/api/v5/entity/order/list").with_query(
            query_from(arguments, &["user_id", "status", "limit", "offset", "corp_id"]),
        ),
        Operation::ListOrderFinancials => {
            PartnerRequest::get("/api/v5/entity/order/financial/list")
                .with_query(query_from(arguments, &["order_id", "limit", "offset", "corp_id"]))
        }
        other => return Err(unsupported(ToolCategory::Order, other)),
    };
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_orders_filters() {
        let arguments = json!({"status": "paid", "limit": 5}).as_object().cloned().unwrap();
        let request = prepare(Operation::ListOrders, &arguments).unwrap();
        assert_eq!(request.path, "/api/v5/entity/order/list");
        assert_eq!(
            request.query,
            vec![
                ("status".to_string(), "paid".to_string()),
                ("limit".to_string(), "5".to_string()),
            ]
        );
    }
}
