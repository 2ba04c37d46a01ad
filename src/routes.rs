// src/routes.rs
use std::sync::Arc;
use warp::reject::Rejection;
use crate::handlers::{
    figures::get_figures,
    page::{get_dashboard, get_deals, healthcheck},
    table::get_active_cell,
};
use crate::services::aggregation::DealTables;
use log::{info, warn};

use std::convert::Infallible;
use warp::http::StatusCode;
use warp::{Filter, Reply};
use crate::handlers::error::ApiError;

// Add recovery handling for our custom errors
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message: String;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status();
        message = api_error.message.clone();
    } else if let Some(invalid) = err.find::<warp::reject::InvalidQuery>() {
        code = StatusCode::BAD_REQUEST;
        message = invalid.to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed".to_string();
    } else {
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    if code != StatusCode::NOT_FOUND {
        warn!("Request rejected with {}: {}", code, message);
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(tables: Arc<DealTables>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let tables_filter = warp::any().map(move || tables.clone());

    let dashboard_route = warp::path::end()
        .and(warp::get())
        .and(tables_filter.clone())
        .and_then(get_dashboard);

    let figures_route = warp::path!("api" / "figures")
        .and(warp::get())
        .and(warp::query())
        .and(tables_filter.clone())
        .and_then(get_figures);

    let active_cell_route = warp::path!("api" / "active-cell")
        .and(warp::get())
        .and(warp::query())
        .and_then(get_active_cell);

    let deals_route = warp::path!("api" / "deals")
        .and(warp::get())
        .and(tables_filter.clone())
        .and_then(get_deals);

    let healthcheck_route = warp::path!("healthcheck")
        .and(warp::get())
        .and(tables_filter.clone())
        .and_then(healthcheck);

    info!("All routes configured successfully.");

    dashboard_route
        .or(figures_route)
        .or(active_cell_route)
        .or(deals_route)
        .or(healthcheck_route)
        .recover(handle_rejection)
        .with(warp::log("deal_flow_dashboard"))
}
