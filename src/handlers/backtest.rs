// src/handlers/backtest.rs
use log::{error, info};
use serde::Deserialize;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::models::BacktestResponse;
use crate::services::backtest::{normalize_series, simulate_contributions};
use crate::services::yahoo;

const DEFAULT_YEARS: &str = "3";
const DEFAULT_AMOUNT: f64 = 50.0;

#[derive(Debug, Deserialize)]
pub struct BacktestQuery {
    pub ticker: Option<String>,
    pub years: Option<String>,
    pub amount: Option<f64>,
}

pub async fn get_backtest(query: BacktestQuery) -> Result<Json, Rejection> {
    let ticker = query
        .ticker
        .filter(|t| !t.is_empty())
        .ok_or_else(|| warp::reject::custom(ApiError::missing_input("Ticker required")))?;

    let amount = query.amount.unwrap_or(DEFAULT_AMOUNT);
    if amount <= 0.0 {
        return Err(warp::reject::custom(ApiError::missing_input(
            "Contribution amount must be positive",
        )));
    }

    let years = query.years.unwrap_or_else(|| DEFAULT_YEARS.to_string());
    // The requested horizon only bounds the upstream query; duration math
    // uses the surviving samples.
    let range = format!("{}y", years);
    info!("Handling backtest for {} ({} @ {})", ticker, range, amount);

    let chart = yahoo::fetch_chart(&ticker, &range, "1mo", false)
        .await
        .map_err(|e| {
            error!("Chart fetch failed for {}: {}", ticker, e);
            warp::reject::custom(e)
        })?;

    let raw = chart.price_points();
    if raw.is_empty() {
        return Err(warp::reject::custom(ApiError::upstream(format!(
            "No historical data for {}",
            ticker
        ))));
    }

    let series = normalize_series(&raw).map_err(warp::reject::custom)?;
    let run = simulate_contributions(&series, amount).map_err(warp::reject::custom)?;

    Ok(warp::reply::json(&BacktestResponse {
        chart_data: run.records,
        summary: run.summary,
    }))
}
