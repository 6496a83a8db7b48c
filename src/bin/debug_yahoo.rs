use dotenv::dotenv;
use env_logger;
use log::{error, info};
use stock_blend_api::services::yahoo::fetch_chart;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();

    let ticker = std::env::args().nth(1).unwrap_or_else(|| "SPY".to_string());
    info!("Testing Yahoo Finance chart fetching for {}...", ticker);

    match fetch_chart(&ticker, "2y", "1d", true).await {
        Ok(chart) => {
            let points = chart.price_points();
            let surviving = points.iter().filter(|p| p.price.is_some()).count();
            let events = chart.dividend_events();
            info!(
                "SUCCESS: {} — price {:?}, {} samples ({} with prices), {} dividend events",
                chart.meta.symbol,
                chart.meta.regular_market_price,
                points.len(),
                surviving,
                events.len()
            );
        }
        Err(e) => {
            error!("ERROR: Failed to fetch chart data: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
