// src/handlers/quote.rs
use log::{error, info};
use serde::Deserialize;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::models::{QuotePoint, QuoteResponse};
use crate::services::yahoo::{self, interval_for_range};

const DEFAULT_RANGE: &str = "3mo";

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub ticker: Option<String>,
    pub range: Option<String>,
}

pub async fn get_quote(query: QuoteQuery) -> Result<Json, Rejection> {
    let ticker = query
        .ticker
        .filter(|t| !t.is_empty())
        .ok_or_else(|| warp::reject::custom(ApiError::missing_input("Ticker required")))?;

    let range = query.range.unwrap_or_else(|| DEFAULT_RANGE.to_string());
    let interval = interval_for_range(&range);
    info!("Handling quote request for {} ({} / {})", ticker, range, interval);

    let chart = yahoo::fetch_chart(&ticker, &range, interval, false)
        .await
        .map_err(|e| {
            error!("Chart fetch failed for {}: {}", ticker, e);
            warp::reject::custom(e)
        })?;

    let chart_data: Vec<QuotePoint> = chart
        .price_points()
        .into_iter()
        .filter_map(|point| {
            point.price.map(|price| QuotePoint {
                date: point.timestamp.format("%Y-%m-%d").to_string(),
                price: (price * 100.0).round() / 100.0,
            })
        })
        .collect();

    Ok(warp::reply::json(&QuoteResponse {
        price: chart.meta.regular_market_price.unwrap_or(0.0),
        currency: chart.meta.currency.clone().unwrap_or_default(),
        chart_data,
    }))
}
