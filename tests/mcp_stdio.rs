//! JSON-RPC session over an in-memory pipe against the fake partner.

mod common;

use common::FakePartner;
use emeritus_mcp::mcp::serve;
use emeritus_mcp::AppContext;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::test]
async fn test_session_round_trip() {
    let fake = FakePartner::start().await;
    let ctx = Arc::new(AppContext::new(fake.config()).unwrap());

    let (client, server) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server);
    let session = tokio::spawn({
        let ctx = ctx.clone();
        async move { serve(&ctx, BufReader::new(server_read), server_write).await }
    });

    let (client_read, mut client_write) = tokio::io::split(client);
    let mut lines = BufReader::new(client_read).lines();

    let messages = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
               "params": {"name": "list_orders", "arguments": {"user_id": "u1", "limit": 10}}}),
        json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call",
               "params": {"name": "unknown_tool_xyz", "arguments": {}}}),
    ];
    for message in &messages {
        client_write
            .write_all(format!("{}\n", message).as_bytes())
            .await
            .unwrap();
    }
    client_write.shutdown().await.unwrap();

    let mut replies = Vec::new();
    while let Some(line) = lines.next_line().await.unwrap() {
        replies.push(serde_json::from_str::<Value>(&line).unwrap());
    }
    session.await.unwrap().unwrap();

    // The notification gets no reply.
    let ids: Vec<&Value> = replies.iter().map(|r| &r["id"]).collect();
    assert_eq!(ids, vec![&json!(1), &json!(2), &json!(3), &json!(4)]);

    assert_eq!(replies[0]["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(replies[1]["result"]["tools"].as_array().unwrap().len(), 17);

    let text = replies[2]["result"]["content"][0]["text"].as_str().unwrap();
    let data: Value = serde_json::from_str(text).unwrap();
    assert_eq!(data["path"], "/api/v5/entity/order/list");
    assert_eq!(data["query"], json!({"user_id": "u1", "limit": "10"}));

    assert_eq!(replies[3]["error"]["code"], -32601);
    assert_eq!(replies[3]["error"]["data"]["kind"], "UNKNOWN_TOOL");
    assert_eq!(fake.state.api_hits(), 1);
}

/// Feed raw bytes to a session and collect every reply line.
async fn replies_for(ctx: Arc<AppContext>, input: Vec<u8>) -> Vec<Value> {
    let (client, server) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server);
    let session =
        tokio::spawn(async move { serve(&ctx, BufReader::new(server_read), server_write).await });

    let (client_read, mut client_write) = tokio::io::split(client);
    let writer = tokio::spawn(async move {
        client_write.write_all(&input).await.unwrap();
        client_write.shutdown().await.unwrap();
    });

    let mut lines = BufReader::new(client_read).lines();
    let mut replies = Vec::new();
    while let Some(line) = lines.next_line().await.unwrap() {
        replies.push(serde_json::from_str::<Value>(&line).unwrap());
    }
    writer.await.unwrap();
    session.await.unwrap().unwrap();
    replies
}

#[tokio::test]
async fn test_non_utf8_line_gets_parse_error_and_session_continues() {
    let fake = FakePartner::start().await;
    let ctx = Arc::new(AppContext::new(fake.config()).unwrap());

    let mut input = b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"\xff\"}\n".to_vec();
    input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n");
    let replies = replies_for(ctx, input).await;

    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0]["id"], Value::Null);
    assert_eq!(replies[0]["error"]["code"], -32700);
    assert_eq!(replies[1]["id"], 2);
    assert_eq!(replies[1]["result"], json!({}));
}

#[tokio::test]
async fn test_oversized_line_is_rejected_and_skipped() {
    let fake = FakePartner::start().await;
    let mut config = fake.config();
    config.ipc.max_frame_bytes = 256;
    let ctx = Arc::new(AppContext::new(config).unwrap());

    let padding = "x".repeat(10 * 1024);
    let mut input = format!(
        "{}\n",
        json!({"jsonrpc": "2.0", "id": 1, "method": "ping", "params": {"pad": padding}})
    )
    .into_bytes();
    input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n");
    let replies = replies_for(ctx, input).await;

    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0]["error"]["code"], -32600);
    assert_eq!(replies[0]["error"]["message"], "request too large");
    assert_eq!(replies[1]["id"], 2);
    assert_eq!(replies[1]["result"], json!({}));
}
