// src/models.rs
use serde::Serialize;
use chrono::{DateTime, NaiveDate, Utc};
use chrono::serde::ts_seconds;

/// One raw sample from the price-series provider. A `None` price means the
/// provider had no close for that period; such samples are dropped during
/// normalization, never interpolated.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: Option<f64>,
}

/// One step of the periodic-contribution simulation, keyed by calendar month.
#[derive(Debug, Clone, Serialize)]
pub struct ContributionRecord {
    pub date: String,
    pub principal: f64,
    pub valuation: f64,
    pub price: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestSummary {
    pub total_principal: f64,
    pub total_valuation: f64,
    pub roi: String,
    pub annual_roi: String,
    pub start_date: String,
    pub end_date: String,
    pub duration_years: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResponse {
    pub chart_data: Vec<ContributionRecord>,
    pub summary: BacktestSummary,
}

/// A historical distribution as reported by the event provider. The record
/// date (ex-date) is derived from the provider's timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionEvent {
    pub record_date: NaiveDate,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

/// A distribution event with its estimated settlement (pay) date attached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedDistributionEvent {
    pub ex_date: NaiveDate,
    pub pay_date: NaiveDate,
    pub amount: f64,
    #[serde(with = "ts_seconds")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleLabel {
    Monthly,
    Quarterly,
    SemiAnnualOrAnnual,
    Irregular,
}

/// Payout frequency inferred from the trailing-12-month event count.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutCycle {
    pub label: CycleLabel,
    pub period_days: i64,
    pub trailing_year_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Confirmed,
    RecordDateConfirmedPayEstimated,
    PatternEstimated,
    Unknown,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleProjection {
    pub next_record_date: Option<NaiveDate>,
    pub next_pay_date: Option<NaiveDate>,
    pub is_official: bool,
    pub status: ScheduleStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldEstimate {
    pub projected_annual_amount: f64,
    pub yield_percent: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendResponse {
    pub symbol: String,
    pub price: f64,
    pub currency: String,
    pub history: Vec<AnnotatedDistributionEvent>,
    pub cycle: PayoutCycle,
    pub schedule: ScheduleProjection,
    #[serde(rename = "yield")]
    pub yield_estimate: YieldEstimate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotePoint {
    pub date: String,
    pub price: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub price: f64,
    pub currency: String,
    pub chart_data: Vec<QuotePoint>,
}
