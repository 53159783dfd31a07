use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use forestwatch::dashboard::{DashboardState, UpdateResponse, create_router};
use forestwatch::dataset::Column;
use forestwatch::{Config, ObservationTable};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use std::sync::Arc;

fn app() -> Router {
    let table = ObservationTable::new(vec![
        Column::numeric("year", vec![Some(2020.0), Some(2021.0), Some(2021.0)]),
        Column::numeric("income", vec![Some(1000.0), Some(1200.0), Some(1500.0)]),
        Column::numeric("deforested_area", vec![Some(10.0), Some(20.0), Some(5.0)]),
        Column::text("activity", vec![Some("A"), Some("A"), Some("B")]),
    ])
    .unwrap();
    let state = DashboardState::new(Arc::new(table), &Config::default()).unwrap();
    create_router(Arc::new(state))
}

fn update_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/_update")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

#[tokio::test]
async fn test_index_serves_page() {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(page.contains("id=\"activity-dropdown\""));
    assert!(page.contains("id=\"activity-chart\""));
    assert!(page.contains("id=\"deforestation-chart\""));
    assert!(page.contains("<option value=\"A\" selected>A</option>"));
    assert!(page.contains("<option value=\"B\">B</option>"));
}

#[tokio::test]
async fn test_update_returns_selected_rows() {
    let response = app()
        .oneshot(update_request(json!({ "input": "activity-dropdown", "value": "B" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let update: UpdateResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(update.output, "activity-chart");
    assert_eq!(update.value, "B");
    assert_eq!(update.rows, 1);
    assert!(update.svg.contains("<svg"));
}

#[tokio::test]
async fn test_update_with_unmatched_value_is_empty() {
    let response = app()
        .oneshot(update_request(json!({ "input": "activity-dropdown", "value": "Z" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let update: UpdateResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(update.rows, 0);
}

#[tokio::test]
async fn test_update_unknown_input_is_rejected() {
    let response = app()
        .oneshot(update_request(json!({ "input": "year-slider", "value": "2020" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["error"], "No binding for input 'year-slider'");
}

#[tokio::test]
async fn test_update_requires_json_body() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/_update")
                .body(Body::from("activity=B"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = app()
        .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
