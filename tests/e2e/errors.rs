//! Failure paths against a mock QAPI server.

use std::time::Duration;

use super::common::{fault_envelope, response_envelope, session_for, session_with, SECRET};
use mplus_qapi::{ErrorKind, SessionConfig};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_server_fault() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string(fault_envelope("Invalid credentials")))
        .mount(&server)
        .await;

    let err = session_for(&server)
        .execute("getProducts", None, Some("req-fault"))
        .await
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::ServerFault { status: 500, .. }));
    assert!(err.to_string().contains("Invalid credentials"));
    assert_eq!(err.request_id(), Some("req-fault"));
}

#[tokio::test]
async fn test_server_error_without_xml_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = session_for(&server)
        .execute("getProducts", None, None)
        .await
        .unwrap_err();

    assert_eq!(err.fault(), None);
    assert_eq!(err.to_string(), "Server error: HTTP 502");
}

#[tokio::test]
async fn test_non_200_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = session_for(&server)
        .execute("getProducts", None, None)
        .await
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::HttpStatus { status: 401 }));
    assert_eq!(err.code(), 4000);
}

#[tokio::test]
async fn test_decode_failures() {
    let cases = [
        ("<SOAP-ENV:Envelope><SOAP-ENV:Body/></SOAP-ENV:Envelope>".to_string(), 1000),
        ("<SOAP-ENV:Body><ns:getProductsResponse><product>".to_string(), 2000),
        (
            "<SOAP-ENV:Envelope><SOAP-ENV:Body><!-- ns:getProductsResponse --><x/></SOAP-ENV:Body></SOAP-ENV:Envelope>"
                .to_string(),
            3000,
        ),
    ];

    for (body, code) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
            .mount(&server)
            .await;

        let err = session_for(&server)
            .execute("getProducts", None, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), code, "body: {body}");
        assert_eq!(err.response_xml.as_deref(), Some(body.as_str()));
        assert!(err.request_id().is_some());
    }
}

#[tokio::test]
async fn test_timeout_is_a_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(response_envelope("getProducts", "<product/>"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let config = SessionConfig::builder()
        .with_timeout(Duration::from_millis(50))
        .build();
    let err = session_with(&server, config)
        .execute("getProducts", None, None)
        .await
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::Transport(_)));
    assert_eq!(err.code(), 6000);
    assert!(!err.to_string().contains(SECRET));
}
