//! Tests for the Firestore record store

use serde_json::json;
use shelf_common::{RecordFields, Session, WriteMode};
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::config::FirebaseConfig;

const DOCS: &str = "/v1/projects/stock-shelf/databases/(default)/documents";

fn store_with_mock(mock_uri: &str) -> FirestoreStore {
    let config = FirebaseConfig::new("stock-shelf", "api-key").with_base_url(mock_uri);
    let session = Session::new("uid-1", "token-1");
    FirestoreStore::new(Client::new(), &config, &session)
}

fn document_json(key: &str, quantity: &str, image_url: Option<&str>) -> serde_json::Value {
    let mut fields = json!({ "quantity": { "integerValue": quantity } });
    if let Some(url) = image_url {
        fields["imageUrl"] = json!({ "stringValue": url });
    }
    json!({
        "name": format!("projects/stock-shelf/databases/(default)/documents/inventory/{}", key),
        "fields": fields,
        "createTime": "2024-08-01T10:00:00.000000Z",
        "updateTime": "2024-08-01T10:00:00.000000Z"
    })
}

// ── decoding ─────────────────────────────────────────────────────────

#[test]
fn decode_record_reads_string_encoded_integer() {
    let doc: Document =
        serde_json::from_value(document_json("Widget", "12", Some("https://img/w.jpg"))).unwrap();
    let record = decode_record("Widget", &doc.fields).unwrap();
    assert_eq!(record.quantity, 12);
    assert_eq!(record.image_url.as_deref(), Some("https://img/w.jpg"));
}

#[test]
fn decode_record_treats_empty_image_as_absent() {
    let doc: Document =
        serde_json::from_value(document_json("Widget", "1", Some(""))).unwrap();
    let record = decode_record("Widget", &doc.fields).unwrap();
    assert!(record.image_url.is_none());
}

#[test]
fn decode_record_accepts_whole_double() {
    let fields = HashMap::from([("quantity".to_string(), json!({ "doubleValue": 3.0 }))]);
    assert_eq!(decode_record("x", &fields).unwrap().quantity, 3);

    let fields = HashMap::from([("quantity".to_string(), json!({ "doubleValue": 2.5 }))]);
    assert!(decode_record("x", &fields).is_err());
}

#[test]
fn decode_record_rejects_missing_quantity() {
    let err = decode_record("Widget", &HashMap::new()).unwrap_err();
    assert!(matches!(err, StoreError::MalformedRecord { ref key, .. } if key == "Widget"));
}

#[test]
fn document_key_is_percent_decoded() {
    assert_eq!(
        document_key("projects/p/databases/(default)/documents/inventory/Blue%20Widget"),
        "Blue Widget"
    );
    assert_eq!(document_key("plain"), "plain");
}

#[test]
fn encode_fields_skips_unset() {
    let encoded = encode_fields(&RecordFields::quantity(4));
    assert_eq!(encoded.len(), 1);
    assert_eq!(encoded["quantity"], json!({ "integerValue": "4" }));

    let encoded = encode_fields(&RecordFields::default().with_image_url(Some("u".into())));
    assert_eq!(encoded["imageUrl"], json!({ "stringValue": "u" }));
}

// ── get ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_existing_document() {
    let mock_server = MockServer::start().await;
    let store = store_with_mock(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path(format!("{}/inventory/Widget", DOCS)))
        .and(header("Authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(document_json("Widget", "5", None)))
        .mount(&mock_server)
        .await;

    let record = store.get("inventory", "Widget").await.unwrap().unwrap();
    assert_eq!(record.quantity, 5);
    assert!(record.image_url.is_none());
}

#[tokio::test]
async fn session_without_token_sends_no_authorization() {
    let mock_server = MockServer::start().await;
    let config = FirebaseConfig::new("stock-shelf", "api-key").with_base_url(&mock_server.uri());
    let store = FirestoreStore::new(Client::new(), &config, &Session::local());

    Mock::given(method("GET"))
        .and(path(format!("{}/inventory/Widget", DOCS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(document_json("Widget", "2", None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    assert_eq!(store.get("inventory", "Widget").await.unwrap().unwrap().quantity, 2);
    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn get_missing_document_returns_none() {
    let mock_server = MockServer::start().await;
    let store = store_with_mock(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path(format!("{}/inventory/Gadget", DOCS)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "message": "Document not found", "status": "NOT_FOUND" }
        })))
        .mount(&mock_server)
        .await;

    assert!(store.get("inventory", "Gadget").await.unwrap().is_none());
}

#[tokio::test]
async fn get_encodes_key_in_path() {
    let mock_server = MockServer::start().await;
    let store = store_with_mock(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path(format!("{}/inventory/Blue%20Widget", DOCS)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(document_json("Blue%20Widget", "2", None)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let record = store.get("inventory", "Blue Widget").await.unwrap().unwrap();
    assert_eq!(record.quantity, 2);
}

#[tokio::test]
async fn get_permission_denied_is_an_error() {
    let mock_server = MockServer::start().await;
    let store = store_with_mock(&mock_server.uri());

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "Missing or insufficient permissions.", "status": "PERMISSION_DENIED" }
        })))
        .mount(&mock_server)
        .await;

    let err = store.get("inventory", "Widget").await.unwrap_err();
    match err {
        StoreError::HttpStatus { status, message } => {
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(message, "Missing or insufficient permissions.");
        }
        other => panic!("Expected HttpStatus error, got: {:?}", other),
    }
}

// ── list_all ─────────────────────────────────────────────────────────

#[tokio::test]
async fn list_all_follows_page_tokens() {
    let mock_server = MockServer::start().await;
    let store = store_with_mock(&mock_server.uri()).with_page_size(2);

    Mock::given(method("GET"))
        .and(path(format!("{}/inventory", DOCS)))
        .and(query_param("pageSize", "2"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                document_json("apples", "3", None),
                document_json("pears", "1", Some("https://img/p.jpg"))
            ],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/inventory", DOCS)))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [document_json("plums", "7", None)]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut records = store.list_all("inventory").await.unwrap();
    records.sort_by(|a, b| a.0.cmp(&b.0));

    let keys: Vec<&str> = records.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["apples", "pears", "plums"]);
    assert_eq!(records[1].1.image_url.as_deref(), Some("https://img/p.jpg"));
    assert_eq!(records[2].1.quantity, 7);
}

#[tokio::test]
async fn list_all_empty_collection() {
    let mock_server = MockServer::start().await;
    let store = store_with_mock(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path(format!("{}/inventory", DOCS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&mock_server)
        .await;

    assert!(store.list_all("inventory").await.unwrap().is_empty());
}

#[tokio::test]
async fn list_all_skips_malformed_documents() {
    let mock_server = MockServer::start().await;
    let store = store_with_mock(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path(format!("{}/inventory", DOCS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                document_json("apples", "3", None),
                {
                    "name": "projects/stock-shelf/databases/(default)/documents/inventory/broken",
                    "fields": { "imageUrl": { "stringValue": "" } }
                }
            ]
        })))
        .mount(&mock_server)
        .await;

    let records = store.list_all("inventory").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].0, "apples");
}

#[tokio::test]
async fn list_all_server_error() {
    let mock_server = MockServer::start().await;
    let store = store_with_mock(&mock_server.uri());

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&mock_server)
        .await;

    let err = store.list_all("inventory").await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::HttpStatus { status, .. } if status == StatusCode::SERVICE_UNAVAILABLE
    ));
}

// ── put / delete ─────────────────────────────────────────────────────

#[tokio::test]
async fn replace_sends_full_document_without_mask() {
    let mock_server = MockServer::start().await;
    let store = store_with_mock(&mock_server.uri());

    Mock::given(method("PATCH"))
        .and(path(format!("{}/inventory/Widget", DOCS)))
        .and(query_param_is_missing("updateMask.fieldPaths"))
        .and(body_json(json!({
            "fields": {
                "quantity": { "integerValue": "2" },
                "imageUrl": { "stringValue": "https://img/w.jpg" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(document_json("Widget", "2", None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    store
        .put(
            "inventory",
            "Widget",
            RecordFields::quantity(2).with_image_url(Some("https://img/w.jpg".to_string())),
            WriteMode::Replace,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn merge_sends_update_mask_for_written_fields() {
    let mock_server = MockServer::start().await;
    let store = store_with_mock(&mock_server.uri());

    Mock::given(method("PATCH"))
        .and(path(format!("{}/inventory/Widget", DOCS)))
        .and(query_param("updateMask.fieldPaths", "quantity"))
        .and(body_json(json!({
            "fields": { "quantity": { "integerValue": "8" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(document_json("Widget", "8", None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    store
        .put("inventory", "Widget", RecordFields::quantity(8), WriteMode::Merge)
        .await
        .unwrap();
}

#[tokio::test]
async fn replace_without_quantity_makes_no_request() {
    let mock_server = MockServer::start().await;
    let store = store_with_mock(&mock_server.uri());

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = store
        .put("inventory", "Widget", RecordFields::default(), WriteMode::Replace)
        .await;
    assert!(matches!(result, Err(StoreError::IncompleteWrite(_))));
}

#[tokio::test]
async fn delete_document() {
    let mock_server = MockServer::start().await;
    let store = store_with_mock(&mock_server.uri());

    Mock::given(method("DELETE"))
        .and(path(format!("{}/inventory/Widget", DOCS)))
        .and(header("Authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    store.delete("inventory", "Widget").await.unwrap();
}

#[tokio::test]
async fn delete_failure_is_reported() {
    let mock_server = MockServer::start().await;
    let store = store_with_mock(&mock_server.uri());

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    assert!(store.delete("inventory", "Widget").await.is_err());
}
