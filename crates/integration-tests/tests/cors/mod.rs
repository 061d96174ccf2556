use indoc::formatdoc;
use integration_tests::{TestServer, UpstreamMock};
use reqwest::Method;

#[tokio::test]
async fn any_origin_by_default() {
    let upstream = UpstreamMock::new().spawn().await;
    let server = TestServer::start(&upstream.relay_config()).await;

    let response = server
        .client
        .request(Method::OPTIONS, "/api/chat")
        .header("Origin", "https://portfolio.example.com")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);

    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert!(headers.contains_key("access-control-allow-methods"));
    assert!(headers.contains_key("access-control-allow-headers"));

    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn simple_request_gets_origin_header() {
    let upstream = UpstreamMock::new().spawn().await;
    let server = TestServer::start(&upstream.relay_config()).await;

    let response = server
        .client
        .request(Method::GET, "/api/health")
        .header("Origin", "https://portfolio.example.com")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn configured_origins() {
    let upstream = UpstreamMock::new().spawn().await;

    let config = formatdoc! {r#"
        [server.cors]
        allow_origins = ["https://portfolio.example.com", "https://*.preview.example.com"]
        allow_methods = ["POST"]
        allow_headers = ["content-type"]

        {}
    "#, upstream.relay_config()};

    let server = TestServer::start(&config).await;

    let preflight = |origin: &'static str| {
        server
            .client
            .request(Method::OPTIONS, "/api/chat")
            .header("Origin", origin)
            .header("Access-Control-Request-Method", "POST")
            .header("Access-Control-Request-Headers", "content-type")
            .send()
    };

    let response = preflight("https://portfolio.example.com").await.unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://portfolio.example.com"
    );

    let response = preflight("https://branch-1.preview.example.com").await.unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://branch-1.preview.example.com"
    );

    let response = preflight("https://evil.example.org").await.unwrap();
    assert!(!response.headers().contains_key("access-control-allow-origin"));
}
