use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use super::*;
use crate::test_support::{client_for, detection_json, spawn_api};

fn rows(n: usize) -> Vec<u32> {
    (0..u32::try_from(n).unwrap()).collect()
}

// =============================================================================
// Pager
// =============================================================================

#[test]
fn default_is_first_page_of_ten() {
    let pager = Pager::default();
    assert_eq!(pager.window(), PageWindow { skip: 0, limit: DEFAULT_PAGE_SIZE });
    assert!(PAGE_SIZE_OPTIONS.contains(&DEFAULT_PAGE_SIZE));
}

#[test]
fn window_skips_whole_pages() {
    let pager = Pager::new(1, 10).unwrap();
    assert_eq!(pager.window(), PageWindow { skip: 10, limit: 10 });
    let pager = Pager::new(4, 25).unwrap();
    assert_eq!(pager.window(), PageWindow { skip: 100, limit: 25 });
}

#[test]
fn changing_page_size_returns_to_first_page() {
    let mut pager = Pager::new(3, 10).unwrap();
    pager.set_page_size(5).unwrap();
    assert_eq!(pager.page(), 0);
    assert_eq!(pager.page_size(), 5);
}

#[test]
fn zero_page_size_is_rejected() {
    assert!(Pager::new(0, 0).unwrap_err().is_validation());
    let mut pager = Pager::new(2, 10).unwrap();
    assert!(pager.set_page_size(0).is_err());
    assert_eq!(pager, Pager::new(2, 10).unwrap());
}

#[test]
fn previous_page_stops_at_zero() {
    let mut pager = Pager::default();
    pager.previous_page();
    assert_eq!(pager.page(), 0);
    pager.next_page();
    pager.next_page();
    pager.previous_page();
    assert_eq!(pager.page(), 1);
}

// =============================================================================
// visible
// =============================================================================

#[test]
fn server_windowed_rows_pass_through() {
    let data = rows(7);
    let window = PageWindow { skip: 20, limit: 10 };
    assert_eq!(visible(window, &data), &data[..]);
}

#[test]
fn oversize_response_is_resliced() {
    let data = rows(30);
    assert_eq!(visible(PageWindow { skip: 10, limit: 10 }, &data), &data[10..20]);
    assert_eq!(visible(PageWindow { skip: 25, limit: 10 }, &data), &data[25..30]);
}

#[test]
fn skipped_but_unlimited_response_shows_leading_rows() {
    let data = rows(30);
    assert_eq!(visible(PageWindow { skip: 40, limit: 10 }, &data), &data[..10]);
    assert_eq!(visible(PageWindow { skip: 30, limit: 10 }, &data), &data[..10]);
}

// =============================================================================
// HistoryView
// =============================================================================

#[tokio::test]
async fn refresh_loads_current_window() {
    let api = spawn_api(Router::new().route(
        "/detection",
        get(|Query(window): Query<std::collections::HashMap<String, u64>>| async move {
            assert_eq!(window.get("skip"), Some(&5));
            assert_eq!(window.get("limit"), Some(&5));
            Json(json!([detection_json(0.9), detection_json(0.1)]))
        }),
    ))
    .await;
    let (client, _) = client_for(&api.base_url);
    let mut view = HistoryView::new(Pager::new(1, 5).unwrap());

    view.refresh(&client).await;
    assert_eq!(view.rows().len(), 2);
    assert_eq!(view.error(), None);
    assert!(!view.is_loading());
}

#[tokio::test]
async fn page_size_change_refetches_first_page() {
    let api = spawn_api(Router::new().route("/detection", get(|| async { Json(json!([])) }))).await;
    let (client, _) = client_for(&api.base_url);
    let mut view = HistoryView::new(Pager::new(3, 10).unwrap());

    view.refresh(&client).await;
    assert_eq!(api.log.last().query.as_deref(), Some("skip=30&limit=10"));

    view.pager_mut().set_page_size(5).unwrap();
    view.refresh(&client).await;
    assert_eq!(api.log.last().query.as_deref(), Some("skip=0&limit=5"));
}

#[tokio::test]
async fn refresh_accepts_integer_row_ids() {
    let api = spawn_api(Router::new().route(
        "/detection",
        get(|| async {
            Json(json!([{
                "id": 42,
                "user_id": 7,
                "detection_type": "text",
                "threat_score": 0.55,
                "confidence_score": 0.8,
                "threat_category": "spam",
                "created_at": "2024-03-01T10:00:00Z"
            }]))
        }),
    ))
    .await;
    let (client, _) = client_for(&api.base_url);
    let mut view = HistoryView::default();

    view.refresh(&client).await;
    assert_eq!(view.error(), None);
    assert_eq!(view.rows()[0].id.as_deref(), Some("42"));
}

#[tokio::test]
async fn refresh_failure_shows_message_and_no_rows() {
    let api = spawn_api(Router::new()).await;
    let (client, _) = client_for(&api.base_url);
    let mut view = HistoryView::default();

    view.refresh(&client).await;
    assert!(view.rows().is_empty());
    assert_eq!(view.error(), Some("Failed to fetch detections"));
}

#[test]
fn superseded_fetch_is_discarded() {
    let mut view = HistoryView::default();
    let (first, window) = view.begin();
    view.pager_mut().next_page();
    let (second, next_window) = view.begin();

    let stale: Vec<DetectionResult> = vec![serde_json::from_value(detection_json(0.3)).unwrap()];
    assert!(!view.settle(first, window, Ok(stale)));
    assert!(view.rows().is_empty());
    assert!(view.is_loading());

    assert!(view.settle(second, next_window, Ok(Vec::new())));
    assert!(!view.is_loading());
}

#[test]
fn decode_failure_uses_generic_message() {
    let mut view = HistoryView::default();
    let (ticket, window) = view.begin();
    let failure = ApiError::Decode { endpoint: "GET /detection", reason: "bad".to_owned() };
    assert!(view.settle(ticket, window, Err(failure)));
    assert_eq!(view.error(), Some(HISTORY_LOAD_FAILED));
}

#[test]
fn unmounted_view_ignores_results() {
    let mut view = HistoryView::default();
    let (ticket, window) = view.begin();
    view.unmount();
    assert!(!view.settle(ticket, window, Err(ApiError::validation("late"))));
    assert_eq!(view.error(), None);
}
