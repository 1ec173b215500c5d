//! Tool calls end to end: dispatcher, handlers, partner client, fake partner.

mod common;

use axum::http::Method;
use common::{FakePartner, APP_ID};
use emeritus_mcp::envelope::Envelope;
use emeritus_mcp::{AppContext, ErrorKind};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

async fn setup() -> (FakePartner, AppContext) {
    let fake = FakePartner::start().await;
    let ctx = AppContext::new(fake.config()).unwrap();
    (fake, ctx)
}

#[tokio::test]
async fn test_fetch_user_profile_forwards_user_id() {
    let (fake, ctx) = setup().await;

    let data = ctx
        .dispatcher()
        .call_tool("fetch_user_profile", json!({"user_id": "u1"}))
        .await
        .unwrap();

    assert_eq!(data["path"], "/api/v5/entity/profile/fetch");
    let call = fake.state.last_call();
    assert_eq!(call.method, Method::GET);
    assert_eq!(call.query.get("user_id").map(String::as_str), Some("u1"));
    assert_eq!(call.query.len(), 1);
    assert_eq!(call.authorization.as_deref(), Some("Bearer tok-1"));
    assert_eq!(call.app_id.as_deref(), Some(APP_ID));
}

#[tokio::test]
async fn test_post_body_drops_unset_fields() {
    let (fake, ctx) = setup().await;

    ctx.dispatcher()
        .call_tool(
            "create_tag_group",
            json!({"name": "vip", "description": "", "corp_id": "c1"}),
        )
        .await
        .unwrap();

    let call = fake.state.last_call();
    assert_eq!(call.method, Method::POST);
    assert_eq!(call.path, "/api/v5/entity/tags/group/create");
    assert_eq!(call.body, json!({"name": "vip", "corp_id": "c1"}));
}

#[tokio::test]
async fn test_one_token_serves_many_calls() {
    let (fake, ctx) = setup().await;

    for order_id in ["o1", "o2", "o3"] {
        ctx.dispatcher()
            .call_tool("fetch_order", json!({"order_id": order_id}))
            .await
            .unwrap();
    }
    assert_eq!(fake.state.api_hits(), 3);
    assert_eq!(fake.state.token_hits(), 1);
    assert_eq!(ctx.credentials().fetch_count(), 1);
}

#[tokio::test]
async fn test_import_leads_with_user_id_only() {
    let (fake, ctx) = setup().await;

    ctx.dispatcher()
        .call_tool("import_leads", json!({"user_id": "u1"}))
        .await
        .unwrap();

    let call = fake.state.last_call();
    assert_eq!(call.path, "/api/v5/entity/leads/import");
    assert_eq!(call.body, json!({"user_id": "u1"}));
}

#[tokio::test]
async fn test_import_leads_without_identity_never_reaches_partner() {
    let (fake, ctx) = setup().await;

    let err = ctx
        .dispatcher()
        .call_tool("import_leads", json!({"name": "Ada", "mobile": "1380000"}))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(fake.state.api_hits(), 0);
    assert_eq!(fake.state.token_hits(), 0);
}

#[tokio::test]
async fn test_partner_refusal_keeps_message_and_kind() {
    let (fake, ctx) = setup().await;
    fake.state
        .next_api_reply(200, json!({"code": 400, "msg": "bad corp id"}));

    let result = ctx
        .dispatcher()
        .call_tool("fetch_user_profile", json!({"user_id": "u1", "corp_id": "zz"}))
        .await;
    let envelope = Envelope::from_result(result);

    assert!(!envelope.success);
    assert!(envelope.message.contains("bad corp id"), "{}", envelope.message);
    let value = serde_json::to_value(&envelope).unwrap();
    assert_eq!(value["error"], json!({"kind": "REMOTE_API_ERROR", "code": 400}));
}

#[tokio::test]
async fn test_http_failure_is_remote_error_with_status() {
    let (fake, ctx) = setup().await;
    fake.state
        .next_api_reply(503, json!({"error": "upstream unavailable"}));

    let err = ctx
        .dispatcher()
        .call_tool("list_orders", json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RemoteApiError);
    assert_eq!(err.remote_code(), Some(503));
    assert!(err.to_string().contains("upstream unavailable"));
}

#[tokio::test]
async fn test_rejected_token_is_dropped() {
    let (fake, ctx) = setup().await;
    fake.state
        .next_api_reply(401, json!({"code": 401, "msg": "token expired"}));

    let err = ctx
        .dispatcher()
        .call_tool("list_user_tags", json!({"user_id": "u1"}))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthFailure);

    ctx.dispatcher()
        .call_tool("list_user_tags", json!({"user_id": "u1"}))
        .await
        .unwrap();
    assert_eq!(fake.state.token_hits(), 2);
    assert_eq!(
        fake.state.last_call().authorization.as_deref(),
        Some("Bearer tok-2")
    );
}

#[tokio::test]
async fn test_late_rejection_keeps_refreshed_token() {
    let fake = FakePartner::start().await;
    let ctx = Arc::new(AppContext::new(fake.config()).unwrap());
    assert_eq!(ctx.credentials().get_token().await.unwrap(), "tok-1");

    fake.state.api_delay_ms.store(200, Ordering::SeqCst);
    fake.state
        .next_api_reply(401, json!({"code": 401, "msg": "token expired"}));
    let call = tokio::spawn({
        let ctx = ctx.clone();
        async move {
            ctx.dispatcher()
                .call_tool("list_user_tags", json!({"user_id": "u1"}))
                .await
        }
    });

    // Refresh while the call carrying tok-1 is still in flight.
    tokio::time::sleep(Duration::from_millis(50)).await;
    ctx.credentials().invalidate().await;
    assert_eq!(ctx.credentials().get_token().await.unwrap(), "tok-2");

    let err = call.await.unwrap().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthFailure);
    assert_eq!(ctx.credentials().get_token().await.unwrap(), "tok-2");
    assert_eq!(fake.state.token_hits(), 2);
}

#[tokio::test]
async fn test_missing_data_becomes_empty_object() {
    let (fake, ctx) = setup().await;
    fake.state.next_api_reply(200, json!({"code": 0, "msg": "ok"}));

    let data = ctx
        .dispatcher()
        .call_tool("activate_tag_group", json!({"group_id": "g1"}))
        .await
        .unwrap();
    assert_eq!(data, json!({}));
}

#[tokio::test]
async fn test_unreachable_partner_is_transport_failure() {
    let mut config = emeritus_mcp::Config::new(emeritus_mcp::PartnerConfig::new(
        "http://127.0.0.1:1",
        APP_ID,
        common::SECRET,
    ));
    config.partner.request_timeout = std::time::Duration::from_secs(2);
    let ctx = AppContext::new(config).unwrap();

    let err = ctx
        .dispatcher()
        .call_tool("fetch_order", json!({"order_id": "o1"}))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransportFailure);
}
