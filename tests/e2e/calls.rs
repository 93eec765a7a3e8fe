//! Successful calls against a mock QAPI server.

use std::time::Duration;

use super::common::{init_tracing, response_envelope, session_for, session_with, IDENT, SECRET};
use mplus_qapi::soap::RequestPreparer;
use mplus_qapi::{ListIdentifierTable, ListPolicy, SessionConfig};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_products_round_trip() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(query_param("ident", IDENT))
        .and(query_param("secret", SECRET))
        .and(header("SOAPAction", "getProducts"))
        .and(header("Content-Type", "text/xml; charset=utf-8"))
        .and(header_exists("X-Request-Id"))
        .and(header_exists("User-Agent"))
        .and(body_string_contains("<ns1:getProducts>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(response_envelope(
            "getProducts",
            "<product><id>1</id></product>",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server);
    let record = session.execute("getProducts", None, None).await.unwrap();

    assert_eq!(record.value, json!({"product": {"id": "1"}}));
    assert!(record.duration > Duration::ZERO);
    assert!(record.request_id.starts_with("mpac_"));
    assert!(record.response_xml.contains("getProductsResponse"));
}

#[tokio::test]
async fn test_request_id_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("X-Request-Id", "order-sync-17"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(response_envelope("getOrders", "<orderList/>")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let record = session_for(&server)
        .execute("getOrders", None, Some("order-sync-17"))
        .await
        .unwrap();

    assert_eq!(record.request_id, "order-sync-17");
    assert_eq!(record.value, json!({"orderList": []}));
}

#[tokio::test]
async fn test_request_fields_on_the_wire() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("<ns1:syncMarker>12</ns1:syncMarker>"))
        .and(body_string_contains("<ns1:articleNumbers>100</ns1:articleNumbers>"))
        .and(body_string_contains("<ns1:articleNumbers>200</ns1:articleNumbers>"))
        .and(body_string_contains("<ns1:onlyActive>1</ns1:onlyActive>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(response_envelope(
            "getProducts",
            "<productList><product><articleNumber>100</articleNumber></product>\
             <product><articleNumber>200</articleNumber></product></productList>",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let request = RequestPreparer::new()
        .convert_bools(true)
        .prepare(json!({"syncMarker": 12, "articleNumbers": [100, 200], "onlyActive": true}));

    let record = session_for(&server)
        .execute("getProducts", Some(&request), None)
        .await
        .unwrap();

    assert_eq!(
        record.value,
        json!({"productList": [{"articleNumber": "100"}, {"articleNumber": "200"}]})
    );
}

#[tokio::test]
async fn test_nested_response_is_normalized() {
    let server = MockServer::start().await;

    let inner = "<result>GET-ORDERS-RESULT-OK</result>\
                 <orderList><order>\
                   <orderId>A-1</orderId>\
                   <paid>true</paid>\
                   <lineList><line><articleNumber>7</articleNumber></line></lineList>\
                   <remarks/>\
                 </order></orderList>";
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(response_envelope("getOrders", inner)),
        )
        .mount(&server)
        .await;

    let record = session_for(&server).execute("getOrders", None, None).await.unwrap();

    assert_eq!(
        record.value,
        json!({
            "result": "GET-ORDERS-RESULT-OK",
            "orderList": [{
                "orderId": "A-1",
                "paid": 1,
                "lineList": [{"articleNumber": "7"}],
                "remarks": null
            }]
        })
    );
}

#[tokio::test]
async fn test_custom_list_table() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(response_envelope(
            "getTags",
            "<tags><tag>a</tag></tags>",
        )))
        .mount(&server)
        .await;

    let table: ListIdentifierTable = serde_json::from_value(json!([
        {"pattern": "tags", "policy": "unwrap"}
    ]))
    .unwrap();
    let config = SessionConfig::builder().with_list_table(table).build();

    let record = session_with(&server, config)
        .execute("getTags", None, None)
        .await
        .unwrap();
    assert_eq!(record.value, json!({"tags": ["a"]}));

    let config = SessionConfig::builder()
        .with_list_table(ListIdentifierTable::new().with("tags", ListPolicy::Passthrough))
        .build();
    let record = session_with(&server, config)
        .execute("getTags", None, None)
        .await
        .unwrap();
    assert_eq!(record.value, json!({"tags": [{"tag": "a"}]}));
}

#[tokio::test]
async fn test_concurrent_calls_on_one_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(response_envelope(
            "getProducts",
            "<product><id>1</id></product>",
        )))
        .expect(2)
        .mount(&server)
        .await;

    let session = session_for(&server);
    let (first, second) = tokio::join!(
        session.execute("getProducts", None, Some("first")),
        session.execute("getProducts", None, Some("second")),
    );

    assert_eq!(first.unwrap().request_id, "first");
    assert_eq!(second.unwrap().request_id, "second");
}
