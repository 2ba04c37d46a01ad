// src/handlers/page.rs
use log::info;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use warp::reply::{Html, Json};

use crate::services::aggregation::DealTables;
use crate::services::layout::dashboard_page;

#[derive(Serialize)]
struct HealthcheckResponse {
    status: &'static str,
    deals: usize,
}

pub async fn get_dashboard(tables: Arc<DealTables>) -> Result<Html<String>, Infallible> {
    info!("Rendering dashboard page");
    Ok(warp::reply::html(dashboard_page(&tables).into_string()))
}

pub async fn get_deals(tables: Arc<DealTables>) -> Result<Json, Infallible> {
    info!("Handling request to list deal details");
    Ok(warp::reply::json(&tables.details()))
}

pub async fn healthcheck(tables: Arc<DealTables>) -> Result<Json, Infallible> {
    Ok(warp::reply::json(&HealthcheckResponse {
        status: "ok",
        deals: tables.deals().len(),
    }))
}
