use std::time::Duration;

use gap_engine::{
    AnalysisClient, AnalysisRequest, ClientSettings, Document, FailureKind, ReqwestAnalysisClient,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> AnalysisRequest {
    AnalysisRequest {
        document: Document::new("resume.pdf", b"%PDF-1.4 fake cv".to_vec()),
        job_description: "Senior data engineer with SQL and Docker".to_string(),
    }
}

fn client_for(server: &MockServer) -> ReqwestAnalysisClient {
    ReqwestAnalysisClient::new(ClientSettings {
        endpoint: format!("{}/analyze", server.uri()),
        ..ClientSettings::default()
    })
    .expect("client")
}

#[tokio::test]
async fn posts_multipart_fields_and_decodes_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(body_string_contains("name=\"cv\"; filename=\"resume.pdf\""))
        .and(body_string_contains("%PDF-1.4 fake cv"))
        .and(body_string_contains("name=\"job_description\""))
        .and(body_string_contains("Senior data engineer with SQL and Docker"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "raw_output": "{}" })))
        .expect(1)
        .mount(&server)
        .await;

    let body = client_for(&server).send(&request()).await.expect("send ok");
    assert_eq!(body, json!({ "raw_output": "{}" }));
}

#[tokio::test]
async fn non_json_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).send(&request()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidResponse);
}

#[tokio::test]
async fn error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "boom" })))
        .mount(&server)
        .await;

    let err = client_for(&server).send(&request()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({})),
        )
        .mount(&server)
        .await;

    let client = ReqwestAnalysisClient::new(ClientSettings {
        endpoint: format!("{}/analyze", server.uri()),
        request_timeout: Duration::from_millis(50),
        ..ClientSettings::default()
    })
    .expect("client");

    let err = client.send(&request()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_response_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"matched\":[\"SQL\"]}"))
        .mount(&server)
        .await;

    let client = ReqwestAnalysisClient::new(ClientSettings {
        endpoint: format!("{}/analyze", server.uri()),
        max_bytes: 8,
        ..ClientSettings::default()
    })
    .expect("client");

    let err = client.send(&request()).await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 8, .. }));
}

#[tokio::test]
async fn unreachable_service_is_a_network_error() {
    let client = ReqwestAnalysisClient::new(ClientSettings {
        endpoint: "http://127.0.0.1:9/analyze".to_string(),
        connect_timeout: Duration::from_secs(2),
        ..ClientSettings::default()
    })
    .expect("client");

    let err = client.send(&request()).await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::Network | FailureKind::Timeout));
}

#[test]
fn invalid_endpoint_is_rejected_up_front() {
    let err = ReqwestAnalysisClient::new(ClientSettings {
        endpoint: "not a url".to_string(),
        ..ClientSettings::default()
    })
    .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidEndpoint);
}
