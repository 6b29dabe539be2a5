//! Tests for the Data API client and pager

use super::*;
use crate::http::{HttpClient, HttpClientConfig};
use crate::query::SortSpec;
use crate::types::QueryGroup;
use serde_json::json;
use wiremock::matchers::{basic_auth, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> DataApiClient {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .max_retries(0)
        .build();
    DataApiClient::new(HttpClient::with_config(config).unwrap())
}

fn records_body(table: &str, rows: Vec<serde_json::Value>, found: usize) -> serde_json::Value {
    let returned = rows.len();
    json!({
        "response": {
            "data": rows
                .into_iter()
                .map(|fields| json!({ "fieldData": fields, "recordId": "1", "modId": "0" }))
                .collect::<Vec<_>>(),
            "dataInfo": {
                "table": table,
                "returnedCount": returned,
                "foundCount": found
            }
        },
        "messages": [{ "code": "0", "message": "OK" }]
    })
}

#[tokio::test]
async fn test_login_stores_token_and_logout_releases_it() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/fmi/data/v2/databases/Sales/sessions"))
        .and(basic_auth("user", "pass"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "response": { "token": "tok-1" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/fmi/data/v2/databases/Sales/sessions/tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": {} })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.login("Sales", "user", "pass").await.unwrap();
    assert!(client.has_session());

    client.logout().await.unwrap();
    assert!(!client.has_session());

    // Idempotent-safe: a second logout is a no-op, not a second DELETE.
    client.logout().await.unwrap();
}

#[tokio::test]
async fn test_login_rejection_is_auth_error_with_server_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/fmi/data/v2/databases/Sales/sessions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid user account"))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let err = client.login("Sales", "user", "wrong").await.unwrap_err();
    match err {
        crate::error::Error::Auth { detail } => {
            assert!(detail.contains("Invalid user account"));
        }
        other => panic!("expected Auth error, got {other:?}"),
    }
    assert!(!client.has_session());
}

#[tokio::test]
async fn test_listing_pagination_with_exact_multiple() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/fmi/data/v2/databases/Sales/sessions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "response": { "token": "tok-1" } })),
        )
        .mount(&server)
        .await;

    // 4 rows, page size 2: two full pages, then one empty terminal call.
    let rows = |range: std::ops::Range<i64>| {
        range.map(|i| json!({ "id": i })).collect::<Vec<_>>()
    };

    Mock::given(method("GET"))
        .and(path("/fmi/data/v2/databases/Sales/layouts/Orders/records"))
        .and(query_param("_offset", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records_body("orders", rows(0..2), 4)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/fmi/data/v2/databases/Sales/layouts/Orders/records"))
        .and(query_param("_offset", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records_body("orders", rows(2..4), 4)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/fmi/data/v2/databases/Sales/layouts/Orders/records"))
        .and(query_param("_offset", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records_body("orders", vec![], 4)))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.login("Sales", "user", "pass").await.unwrap();

    let mut pager = RecordPager::list(&client, "Sales", "Orders", 2);
    let mut pages = Vec::new();
    while let Some(page) = pager.next_page().await.unwrap() {
        pages.push(page);
    }

    assert_eq!(pages.len(), 3);
    assert_eq!(pages[0].records.len(), 2);
    assert_eq!(pages[1].records.len(), 2);
    assert!(pages[2].records.is_empty());
    // Table name is read from metadata on every page.
    assert!(pages.iter().all(|p| p.info.table == "orders"));

    // The sequence has ended; further calls yield nothing.
    assert!(pager.next_page().await.unwrap().is_none());
}

#[tokio::test]
async fn test_listing_short_page_ends_sequence() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/fmi/data/v2/databases/Sales/sessions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "response": { "token": "tok-1" } })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/fmi/data/v2/databases/Sales/layouts/Orders/records"))
        .and(query_param("_offset", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records_body(
            "orders",
            vec![json!({ "id": 1 })],
            1,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.login("Sales", "user", "pass").await.unwrap();

    let mut pager = RecordPager::list(&client, "Sales", "Orders", 100);
    let page = pager.next_page().await.unwrap().unwrap();
    assert_eq!(page.records.len(), 1);
    assert!(pager.next_page().await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_pagination_stops_on_empty_batch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/fmi/data/v2/databases/Sales/sessions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "response": { "token": "tok-1" } })),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/fmi/data/v2/databases/Sales/layouts/Orders/_find"))
        .and(body_partial_json(json!({ "offset": 1, "limit": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(records_body(
            "orders",
            vec![json!({ "id": 1 }), json!({ "id": 2 })],
            // Metadata total is deliberately wrong; termination must depend
            // only on batch emptiness.
            999,
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/fmi/data/v2/databases/Sales/layouts/Orders/_find"))
        .and(body_partial_json(json!({ "offset": 3, "limit": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(records_body("orders", vec![], 999)))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.login("Sales", "user", "pass").await.unwrap();

    let mut group = QueryGroup::new();
    group.insert("status".to_string(), "active".to_string());

    let mut pager = RecordPager::find(
        &client,
        "Sales",
        "Orders",
        vec![group],
        vec![SortSpec::ascending("id")],
        2,
    );

    let first = pager.next_page().await.unwrap().unwrap();
    assert_eq!(first.records.len(), 2);
    let second = pager.next_page().await.unwrap().unwrap();
    assert!(second.records.is_empty());
    assert!(pager.next_page().await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_request_error_carries_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/fmi/data/v2/databases/Sales/sessions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "response": { "token": "tok-1" } })),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/fmi/data/v2/databases/Sales/layouts/Orders/_find"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Field missing from layout"))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.login("Sales", "user", "pass").await.unwrap();

    let mut pager = RecordPager::find(&client, "Sales", "Orders", vec![QueryGroup::new()], vec![], 10);
    let err = pager.next_page().await.unwrap_err();
    match err {
        crate::error::Error::Request { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("Field missing"));
        }
        other => panic!("expected Request error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_databases_and_layout_folder_expansion_types() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/fmi/data/v2/databases"))
        .and(basic_auth("user", "pass"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": { "databases": [{ "name": "Sales" }, { "name": "HR" }] }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/fmi/data/v2/databases/Sales/sessions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "response": { "token": "tok-1" } })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/fmi/data/v2/databases/Sales/layouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": { "layouts": [
                { "name": "Orders" },
                { "name": "Archive", "isFolder": true, "folderLayoutNames": [
                    { "name": "Orders2019" }
                ]}
            ]}
        })))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let databases = client.list_databases("user", "pass").await.unwrap();
    assert_eq!(databases, vec!["Sales", "HR"]);

    client.login("Sales", "user", "pass").await.unwrap();
    let layouts = client.list_layouts("Sales").await.unwrap();
    assert_eq!(layouts.len(), 2);
    assert!(layouts[1].is_folder);
    assert_eq!(layouts[1].folder_layout_names[0].name, "Orders2019");
}
