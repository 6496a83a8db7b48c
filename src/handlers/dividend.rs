// src/handlers/dividend.rs
use chrono::Utc;
use log::{error, info, warn};
use serde::Deserialize;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::models::{
    CycleLabel, DividendResponse, PayoutCycle, ScheduleProjection, ScheduleStatus, YieldEstimate,
};
use crate::services::dividend::{
    annotate_events, classify_cycle, project_schedule, project_yield, CalendarDates,
};
use crate::services::market::profile_for_ticker;
use crate::services::yahoo;

#[derive(Debug, Deserialize)]
pub struct DividendQuery {
    pub ticker: Option<String>,
}

pub async fn get_dividend(query: DividendQuery) -> Result<Json, Rejection> {
    let ticker = query
        .ticker
        .filter(|t| !t.is_empty())
        .ok_or_else(|| warp::reject::custom(ApiError::missing_input("Ticker required")))?;

    let profile = profile_for_ticker(&ticker);
    info!("Handling dividend request for {} ({:?})", ticker, profile);

    let chart = yahoo::fetch_chart(&ticker, "2y", "1d", true)
        .await
        .map_err(|e| {
            error!("Chart fetch failed for {}: {}", ticker, e);
            warp::reject::custom(e)
        })?;

    let symbol = chart.meta.symbol.clone();
    let price = chart.meta.regular_market_price.unwrap_or(0.0);
    let currency = chart.meta.currency.clone().unwrap_or_default();

    let events = chart.dividend_events();
    if events.is_empty() {
        info!("No distribution events for {}", ticker);
        return Ok(warp::reply::json(&DividendResponse {
            symbol,
            price,
            currency,
            history: Vec::new(),
            cycle: PayoutCycle {
                label: CycleLabel::Irregular,
                period_days: 0,
                trailing_year_count: 0,
            },
            schedule: ScheduleProjection {
                next_record_date: None,
                next_pay_date: None,
                is_official: false,
                status: ScheduleStatus::Unknown,
            },
            yield_estimate: YieldEstimate {
                projected_annual_amount: 0.0,
                yield_percent: 0.0,
            },
        }));
    }

    // The calendar provider is optional: any failure degrades the schedule
    // to pattern estimation instead of surfacing an error.
    let calendar = match yahoo::fetch_calendar(&ticker).await {
        Ok(calendar) => calendar,
        Err(e) => {
            warn!("Calendar fetch failed for {}, falling back: {}", ticker, e);
            CalendarDates::default()
        }
    };

    let now = Utc::now();
    let history = annotate_events(events, profile);
    let cycle = classify_cycle(&history, now);
    let schedule = project_schedule(&history, &calendar, &cycle, profile, now.date_naive());
    let yield_estimate = project_yield(&history, cycle.trailing_year_count, price);

    Ok(warp::reply::json(&DividendResponse {
        symbol,
        price,
        currency,
        history,
        cycle,
        schedule,
        yield_estimate,
    }))
}
