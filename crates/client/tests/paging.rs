//! Integration tests for paged iteration across multi-page result sets.

mod common;

use adflux_client::{ClientError, QueryPager, Selector};
use futures::TryStreamExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{error_body, order_service_proxy, page_body, RotatingTokenProvider, ORDER_SERVICE_PATH};

fn selector() -> Selector {
    Selector::builder().fields(["Id"]).build()
}

async fn mount_selector_page(server: &MockServer, offset: u32, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(ORDER_SERVICE_PATH))
        .and(body_partial_json(serde_json::json!({
            "method": "get",
            "selector": {"paging": {"startIndex": offset, "numberResults": 500}},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

/// Tests a 1200-entity result set is walked in three pages at increasing
/// offsets and collected in order.
#[tokio::test]
async fn test_pager_walks_full_result_set() {
    let server = MockServer::start().await;

    mount_selector_page(&server, 0, page_body(0, 500, 1200)).await;
    mount_selector_page(&server, 500, page_body(500, 500, 1200)).await;
    mount_selector_page(&server, 1000, page_body(1000, 200, 1200)).await;

    let provider = RotatingTokenProvider::new();
    let proxy = order_service_proxy(&server.uri(), provider);

    let entities: Vec<serde_json::Value> =
        QueryPager::for_selector(&proxy, selector()).try_collect().await.expect("scan should succeed");

    assert_eq!(entities.len(), 1200);
    assert_eq!(entities[0]["id"], 0);
    assert_eq!(entities[1199]["id"], 1199);
}

/// Tests the pager trusts the total reported by each page, so a result set
/// that shrinks mid-scan just ends earlier.
#[tokio::test]
async fn test_pager_follows_shrinking_total() {
    let server = MockServer::start().await;

    mount_selector_page(&server, 0, page_body(0, 500, 1200)).await;
    mount_selector_page(&server, 500, page_body(500, 100, 600)).await;

    let provider = RotatingTokenProvider::new();
    let proxy = order_service_proxy(&server.uri(), provider);

    let entities: Vec<serde_json::Value> =
        QueryPager::for_selector(&proxy, selector()).try_collect().await.expect("scan should succeed");

    assert_eq!(entities.len(), 600);
}

/// Validates a failed page stops the walk for good.
///
/// Assertions:
/// - Confirms the first page comes back.
/// - Confirms the second page surfaces the API error.
/// - Confirms the pager reports finished and returns `None` afterwards.
#[tokio::test]
async fn test_pager_stops_on_error() {
    let server = MockServer::start().await;

    mount_selector_page(&server, 0, page_body(0, 500, 1000)).await;

    Mock::given(method("POST"))
        .and(path(ORDER_SERVICE_PATH))
        .and(body_partial_json(serde_json::json!({
            "selector": {"paging": {"startIndex": 500, "numberResults": 500}},
        })))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(error_body("INVALID_ARGUMENT", "selector became invalid")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = RotatingTokenProvider::new();
    let proxy = order_service_proxy(&server.uri(), provider);

    let mut pager: QueryPager<'_, serde_json::Value> = QueryPager::for_selector(&proxy, selector());

    let first = pager.next_page().await.expect("first page should succeed");
    assert_eq!(first.expect("first page should exist").len(), 500);

    let err = pager.next_page().await.expect_err("second page should fail");
    assert!(matches!(err, ClientError::Api(_)));

    assert!(pager.is_finished());
    let after = pager.next_page().await.expect("finished pager returns cleanly");
    assert!(after.is_none());
}

/// Tests query-statement paging appends LIMIT/OFFSET per page.
#[tokio::test]
async fn test_pager_pages_query_statements() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ORDER_SERVICE_PATH))
        .and(body_partial_json(serde_json::json!({
            "method": "query",
            "query": "SELECT Id FROM Order LIMIT 500 OFFSET 0",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0, 500, 700)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(ORDER_SERVICE_PATH))
        .and(body_partial_json(serde_json::json!({
            "method": "query",
            "query": "SELECT Id FROM Order LIMIT 500 OFFSET 500",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(500, 200, 700)))
        .expect(1)
        .mount(&server)
        .await;

    let provider = RotatingTokenProvider::new();
    let proxy = order_service_proxy(&server.uri(), provider);

    let entities: Vec<serde_json::Value> = QueryPager::for_query(&proxy, "SELECT Id FROM Order")
        .try_collect()
        .await
        .expect("scan should succeed");

    assert_eq!(entities.len(), 700);
}

/// Tests the stream adapter yields the pages in offset order and then ends.
#[tokio::test]
async fn test_pager_stream_yields_pages_in_order() {
    let server = MockServer::start().await;

    mount_selector_page(&server, 0, page_body(0, 500, 700)).await;
    mount_selector_page(&server, 500, page_body(500, 200, 700)).await;

    let provider = RotatingTokenProvider::new();
    let proxy = order_service_proxy(&server.uri(), provider);

    let pager: QueryPager<'_, serde_json::Value> = QueryPager::for_selector(&proxy, selector());
    let pages: Vec<_> = pager.into_stream().try_collect().await.expect("stream should succeed");

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].start_index, 0);
    assert_eq!(pages[0].len(), 500);
    assert_eq!(pages[1].start_index, 500);
    assert_eq!(pages[1].len(), 200);
}

/// Tests an empty first page ends the walk immediately.
#[tokio::test]
async fn test_pager_empty_result_set() {
    let server = MockServer::start().await;

    mount_selector_page(&server, 0, page_body(0, 0, 0)).await;

    let provider = RotatingTokenProvider::new();
    let proxy = order_service_proxy(&server.uri(), provider);

    let entities: Vec<serde_json::Value> =
        QueryPager::for_selector(&proxy, selector()).try_collect().await.expect("scan should succeed");

    assert!(entities.is_empty());
}
