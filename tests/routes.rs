use chrono::NaiveDate;
use deal_flow_dashboard::models::Deal;
use deal_flow_dashboard::routes::routes;
use deal_flow_dashboard::services::aggregation::DealTables;
use serde_json::Value;
use std::sync::Arc;
use warp::http::StatusCode;

fn tables() -> Arc<DealTables> {
    let date = |m, d| NaiveDate::from_ymd_opt(2022, m, d).unwrap();
    Arc::new(DealTables::build(vec![
        Deal::new("Acme", date(3, 1), "Series A", Some(5.0), "Rockets"),
        Deal::new("Globex", date(3, 2), "Series A", Some(3.0), "Energy"),
        Deal::new("Initech", date(5, 20), "Seed", Some(0.5), "Software"),
        Deal::new("Wayne", date(11, 9), "Series B", Some(40.0), "Defense"),
    ]))
}

#[tokio::test]
async fn figures_for_default_selection() {
    let resp = warp::test::request()
        .method("GET")
        .path("/api/figures")
        .reply(&routes(tables()))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(body["amount_rows"], 3);
    assert_eq!(body["count_rows"], 3);
    assert_eq!(body["amount_y_range"]["max"], 44.0);
    assert!(body["amount"].is_object());
}

#[tokio::test]
async fn monthly_log_figures() {
    let resp = warp::test::request()
        .path("/api/figures?lo=3&hi=5&series=Series%20A,Seed&aggregation=monthly&axis=log")
        .reply(&routes(tables()))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(body["amount_rows"], 2);
    assert!(body["amount_y_range"].is_null());
}

#[tokio::test]
async fn empty_selection_still_answers() {
    let resp = warp::test::request()
        .path("/api/figures?lo=3&hi=5&series=Series%20B")
        .reply(&routes(tables()))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(body["amount_rows"], 0);
    assert!(body["count_y_range"].is_null());
}

#[tokio::test]
async fn inverted_month_range_is_bad_request() {
    let resp = warp::test::request()
        .path("/api/figures?lo=9&hi=4")
        .reply(&routes(tables()))
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    assert!(body["error"].as_str().unwrap().contains("inverted"));
}

#[tokio::test]
async fn unknown_aggregation_is_bad_request() {
    let resp = warp::test::request()
        .path("/api/figures?aggregation=weekly")
        .reply(&routes(tables()))
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn active_cell_prompt_and_echo() {
    let filter = routes(tables());

    let resp = warp::test::request()
        .path("/api/active-cell")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.body(), "Click the table");

    let resp = warp::test::request()
        .path("/api/active-cell?row=2&column=0&column_id=Name")
        .reply(&filter)
        .await;
    assert_eq!(resp.body(), "{'row': 2, 'column': 0, 'column_id': 'Name'}");
}

#[tokio::test]
async fn dashboard_page_and_details() {
    let filter = routes(tables());

    let resp = warp::test::request().path("/").reply(&filter).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = String::from_utf8(resp.body().to_vec()).unwrap();
    assert!(page.contains("graph-with-slider2"));
    assert!(page.contains("Wayne"));

    let resp = warp::test::request().path("/api/deals").reply(&filter).await;
    let deals: Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(deals.as_array().unwrap().len(), 4);
    assert_eq!(deals[0]["Name"], "Acme");
    assert_eq!(deals[0]["Date"], "2022-03-01");
}

#[tokio::test]
async fn healthcheck_and_unknown_path() {
    let filter = routes(tables());

    let resp = warp::test::request().path("/healthcheck").reply(&filter).await;
    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["deals"], 4);

    let resp = warp::test::request().path("/nope").reply(&filter).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
