use indoc::formatdoc;
use integration_tests::{MockReply, TEST_API_KEY, TestServer, UpstreamMock, closed_address};
use serde_json::json;

fn hello() -> serde_json::Value {
    json!({ "messages": [{ "role": "user", "content": "Hello" }] })
}

#[tokio::test]
async fn rate_limit_is_forwarded() {
    let upstream = UpstreamMock::new()
        .with_reply(MockReply::json(429, r#"{"error":"rate limited"}"#))
        .spawn()
        .await;

    let server = TestServer::start(&upstream.relay_config()).await;

    let response = server.client.post("/api/chat", &hello()).await;
    assert_eq!(response.status(), 429);

    let body: serde_json::Value = response.json().await.unwrap();
    insta::assert_json_snapshot!(body, @r#"
    {
      "error": "Error from API service",
      "details": {
        "error": "rate limited"
      }
    }
    "#);
}

#[tokio::test]
async fn upstream_auth_failure_is_forwarded() {
    let upstream = UpstreamMock::new()
        .with_reply(MockReply::json(
            401,
            r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error","code":"invalid_api_key"}}"#,
        ))
        .spawn()
        .await;

    let server = TestServer::start(&upstream.relay_config()).await;

    let response = server.client.post("/api/chat", &hello()).await;
    assert_eq!(response.status(), 401);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["details"]["error"]["code"], "invalid_api_key");
}

#[tokio::test]
async fn unreachable_upstream_is_contained() {
    let config = formatdoc! {r#"
        [relay]
        base_url = "http://{}/v1"
        api_key = "{TEST_API_KEY}"
    "#, closed_address().await};

    let server = TestServer::start(&config).await;

    let response = server.client.post("/api/chat", &hello()).await;
    assert_eq!(response.status(), 500);

    let body: serde_json::Value = response.json().await.unwrap();
    insta::assert_json_snapshot!(body, @r#"
    {
      "error": "Internal server error",
      "message": "Failed to reach the upstream completion service"
    }
    "#);

    // The process keeps serving.
    let response = server.client.get("/api/health").await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn dropped_connection_then_success() {
    let upstream = UpstreamMock::new().with_reply(MockReply::BrokenBody).spawn().await;
    let server = TestServer::start(&upstream.relay_config()).await;

    let response = server.client.post("/api/chat", &hello()).await;
    assert_eq!(response.status(), 500);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Internal server error");
    assert!(body["message"].is_string());

    let response = server.client.post("/api/chat", &hello()).await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["choices"][0]["message"]["content"], "Hello from the mock upstream");

    assert_eq!(upstream.calls(), 2);
}

#[tokio::test]
async fn non_json_error_page_is_contained() {
    let upstream = UpstreamMock::new()
        .with_reply(MockReply::text(502, "<html><body>Bad Gateway</body></html>"))
        .spawn()
        .await;

    let server = TestServer::start(&upstream.relay_config()).await;

    let response = server.client.post("/api/chat", &hello()).await;
    assert_eq!(response.status(), 500);

    let body = response.text().await.unwrap();
    assert!(!body.contains("Bad Gateway"));

    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    insta::assert_json_snapshot!(body, @r#"
    {
      "error": "Internal server error",
      "message": "Failed to parse the upstream error response"
    }
    "#);

    let response = server.client.post("/api/chat", &hello()).await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn non_json_success_body_is_contained() {
    let upstream = UpstreamMock::new()
        .with_reply(MockReply::text(200, "definitely not json"))
        .spawn()
        .await;

    let server = TestServer::start(&upstream.relay_config()).await;

    let response = server.client.post("/api/chat", &hello()).await;
    assert_eq!(response.status(), 500);

    let body: serde_json::Value = response.json().await.unwrap();
    insta::assert_json_snapshot!(body, @r#"
    {
      "error": "Internal server error",
      "message": "Failed to parse the upstream response"
    }
    "#);
}
