use deal_flow_dashboard::config::Config;
use deal_flow_dashboard::routes;
use deal_flow_dashboard::services::aggregation::DealTables;
use deal_flow_dashboard::services::spreadsheet::load_deals;
use log::{error, info};
use std::net::SocketAddr;
use std::process::exit;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize the logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    info!("Logger initialized. Starting the dashboard...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Could not read configuration: {:#}", e);
            exit(1);
        }
    };

    let deals = match load_deals(&config.source).await {
        Ok(deals) => deals,
        Err(e) => {
            error!("Failed to load deals: {:#}", e);
            exit(1);
        }
    };

    let tables = Arc::new(DealTables::build(deals));
    info!("Funding series: {:?}", tables.series());

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    info!("Starting server on {}", addr);
    warp::serve(routes::routes(tables)).run(addr).await;
}
