use deal_flow_dashboard::config::Config;
use deal_flow_dashboard::services::aggregation::DealTables;
use deal_flow_dashboard::services::spreadsheet::load_deals;
use log::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()?;
    info!("Checking deal sheet at {}...", config.source);

    let deals = match load_deals(&config.source).await {
        Ok(deals) => deals,
        Err(e) => {
            error!("✗ Failed to load deals: {:#}", e);
            return Err(e);
        }
    };
    let without_amount = deals.iter().filter(|d| d.amount.is_none()).count();
    info!("✓ Loaded {} deals ({} without an amount)", deals.len(), without_amount);

    let tables = DealTables::build(deals);
    let (lo, hi) = tables.month_bounds();
    info!("  Months: {}..={}", lo, hi);
    info!("  Series: {:?}", tables.series());

    for row in &tables.monthly_amounts {
        info!("  {:>2} {:<20} ${:.1}m", row.month, row.series, row.amount);
    }
    for row in &tables.monthly_counts {
        info!("  {:>2} {:<20} {} deals", row.month, row.series, row.count);
    }

    Ok(())
}
