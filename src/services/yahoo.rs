// src/services/yahoo.rs
use chrono::{DateTime, NaiveDate, Utc};
use log::{info, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::handlers::error::ApiError;
use crate::models::{DistributionEvent, PricePoint};
use crate::services::dividend::CalendarDates;

const CHART_BASE: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const QUOTE_SUMMARY_BASE: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";

/// Granularity ladder for chart requests: intraday candles for short
/// ranges, up to monthly candles for multi-year ranges.
pub fn interval_for_range(range: &str) -> &'static str {
    match range {
        "1d" | "5d" => "15m",
        "1mo" | "3mo" => "1d",
        "1y" | "2y" => "1wk",
        "5y" | "10y" | "max" => "1mo",
        _ => "1d",
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
    events: Option<ChartEvents>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: String,
    pub regular_market_price: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct ChartEvents {
    dividends: Option<std::collections::HashMap<String, DividendWire>>,
}

#[derive(Debug, Deserialize)]
struct DividendWire {
    amount: f64,
    date: i64,
}

impl ChartResult {
    /// Zips timestamps with close prices. Provider holes stay as `None`
    /// prices; the normalizer decides what to do with them.
    pub fn price_points(&self) -> Vec<PricePoint> {
        let timestamps = match &self.timestamp {
            Some(ts) => ts,
            None => return Vec::new(),
        };
        let closes = self
            .indicators
            .quote
            .first()
            .and_then(|q| q.close.as_ref());
        let closes = match closes {
            Some(c) => c,
            None => return Vec::new(),
        };

        timestamps
            .iter()
            .zip(closes.iter())
            .filter_map(|(&secs, &price)| {
                DateTime::<Utc>::from_timestamp(secs, 0)
                    .map(|timestamp| PricePoint { timestamp, price })
            })
            .collect()
    }

    /// Distribution events in provider order (a map, effectively
    /// unordered); callers sort.
    pub fn dividend_events(&self) -> Vec<DistributionEvent> {
        self.events
            .as_ref()
            .and_then(|e| e.dividends.as_ref())
            .map(|dividends| {
                dividends
                    .values()
                    .filter_map(|wire| {
                        DateTime::<Utc>::from_timestamp(wire.date, 0).map(|timestamp| {
                            DistributionEvent {
                                record_date: timestamp.date_naive(),
                                amount: wire.amount,
                                timestamp,
                            }
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn build_client() -> Result<Client, ApiError> {
    Client::builder()
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
        .build()
        .map_err(|e| ApiError::upstream(format!("Failed to build HTTP client: {}", e)))
}

/// Fetches the chart series for a ticker. This is the mandatory provider:
/// any failure, provider-reported error, or empty result aborts the
/// calling operation.
pub async fn fetch_chart(
    ticker: &str,
    range: &str,
    interval: &str,
    include_dividends: bool,
) -> Result<ChartResult, ApiError> {
    let mut url = format!(
        "{}/{}?range={}&interval={}",
        CHART_BASE, ticker, range, interval
    );
    if include_dividends {
        url.push_str("&events=div");
    }
    info!("Fetching chart data from URL: {}", url);

    let client = build_client()?;
    let envelope: ChartEnvelope = client
        .get(&url)
        .send()
        .await
        .map_err(|e| ApiError::upstream(format!("Chart request failed: {}", e)))?
        .json()
        .await
        .map_err(|e| ApiError::upstream(format!("Malformed chart response: {}", e)))?;

    parse_chart_envelope(envelope, ticker)
}

fn parse_chart_envelope(envelope: ChartEnvelope, ticker: &str) -> Result<ChartResult, ApiError> {
    if envelope.chart.error.is_some() {
        return Err(ApiError::upstream(format!(
            "Chart provider reported an error for {}",
            ticker
        )));
    }

    envelope
        .chart
        .result
        .and_then(|mut results| {
            if results.is_empty() {
                None
            } else {
                Some(results.remove(0))
            }
        })
        .ok_or_else(|| ApiError::upstream(format!("No chart data for {}", ticker)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryEnvelope {
    quote_summary: Option<QuoteSummary>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    summary_detail: Option<SummaryDetail>,
    calendar_events: Option<CalendarEvents>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    ex_dividend_date: Option<FormattedValue>,
}

#[derive(Debug, Deserialize)]
struct CalendarEvents {
    dividends: Option<CalendarDividends>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarDividends {
    dividend_date: Option<FormattedValue>,
}

#[derive(Debug, Deserialize)]
struct FormattedValue {
    fmt: Option<String>,
}

/// Fetches the authoritative distribution calendar. This provider is
/// optional: callers absorb any error here and fall back to pattern
/// estimation.
pub async fn fetch_calendar(ticker: &str) -> anyhow::Result<CalendarDates> {
    let url = format!(
        "{}/{}?modules=summaryDetail,calendarEvents",
        QUOTE_SUMMARY_BASE, ticker
    );
    info!("Fetching calendar data from URL: {}", url);

    let client = build_client()?;
    let envelope: QuoteSummaryEnvelope = client.get(&url).send().await?.json().await?;

    Ok(parse_calendar_envelope(envelope))
}

fn parse_calendar_envelope(envelope: QuoteSummaryEnvelope) -> CalendarDates {
    let result = envelope
        .quote_summary
        .and_then(|qs| qs.result)
        .and_then(|mut results| {
            if results.is_empty() {
                None
            } else {
                Some(results.remove(0))
            }
        });

    let result = match result {
        Some(r) => r,
        None => return CalendarDates::default(),
    };

    let record_date = result
        .summary_detail
        .and_then(|d| d.ex_dividend_date)
        .and_then(|v| v.fmt)
        .and_then(|s| parse_provider_date(&s));
    let pay_date = result
        .calendar_events
        .and_then(|c| c.dividends)
        .and_then(|d| d.dividend_date)
        .and_then(|v| v.fmt)
        .and_then(|s| parse_provider_date(&s));

    CalendarDates {
        record_date,
        pay_date,
    }
}

fn parse_provider_date(s: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            warn!("Unparseable calendar date {:?}: {}", s, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART_JSON: &str = r#"{
        "chart": {
            "result": [{
                "meta": {
                    "symbol": "TEST",
                    "regularMarketPrice": 102.5,
                    "currency": "USD"
                },
                "timestamp": [1700000000, 1702592000, 1705184000],
                "indicators": {
                    "quote": [{ "close": [100.0, null, 105.0] }]
                },
                "events": {
                    "dividends": {
                        "1700000000": { "amount": 0.25, "date": 1700000000 },
                        "1705184000": { "amount": 0.26, "date": 1705184000 }
                    }
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_chart_with_null_closes() {
        let envelope: ChartEnvelope = serde_json::from_str(CHART_JSON).unwrap();
        let result = parse_chart_envelope(envelope, "TEST").unwrap();

        assert_eq!(result.meta.symbol, "TEST");
        assert_eq!(result.meta.regular_market_price, Some(102.5));

        let points = result.price_points();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].price, Some(100.0));
        assert_eq!(points[1].price, None);
        assert_eq!(points[2].price, Some(105.0));
    }

    #[test]
    fn extracts_dividend_events() {
        let envelope: ChartEnvelope = serde_json::from_str(CHART_JSON).unwrap();
        let result = parse_chart_envelope(envelope, "TEST").unwrap();

        let mut events = result.dividend_events();
        events.sort_by_key(|e| e.timestamp);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].amount, 0.25);
        assert_eq!(events[1].amount, 0.26);
        assert_eq!(
            events[0].record_date,
            events[0].timestamp.date_naive()
        );
    }

    #[test]
    fn chart_without_events_yields_no_dividends() {
        let json = r#"{
            "chart": {
                "result": [{
                    "meta": { "symbol": "TEST" },
                    "timestamp": [1700000000],
                    "indicators": { "quote": [{ "close": [100.0] }] }
                }],
                "error": null
            }
        }"#;
        let envelope: ChartEnvelope = serde_json::from_str(json).unwrap();
        let result = parse_chart_envelope(envelope, "TEST").unwrap();
        assert!(result.dividend_events().is_empty());
    }

    #[test]
    fn provider_error_is_upstream_error() {
        let json = r#"{
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found" }
            }
        }"#;
        let envelope: ChartEnvelope = serde_json::from_str(json).unwrap();
        assert!(parse_chart_envelope(envelope, "BOGUS").is_err());
    }

    #[test]
    fn empty_result_is_upstream_error() {
        let json = r#"{ "chart": { "result": [], "error": null } }"#;
        let envelope: ChartEnvelope = serde_json::from_str(json).unwrap();
        assert!(parse_chart_envelope(envelope, "BOGUS").is_err());
    }

    #[test]
    fn parses_full_calendar() {
        let json = r#"{
            "quoteSummary": {
                "result": [{
                    "summaryDetail": {
                        "exDividendDate": { "fmt": "2024-06-28" }
                    },
                    "calendarEvents": {
                        "dividends": {
                            "dividendDate": { "fmt": "2024-07-25" }
                        }
                    }
                }]
            }
        }"#;
        let envelope: QuoteSummaryEnvelope = serde_json::from_str(json).unwrap();
        let calendar = parse_calendar_envelope(envelope);

        assert_eq!(
            calendar.record_date,
            NaiveDate::from_ymd_opt(2024, 6, 28)
        );
        assert_eq!(calendar.pay_date, NaiveDate::from_ymd_opt(2024, 7, 25));
    }

    #[test]
    fn missing_calendar_modules_parse_to_empty() {
        let json = r#"{ "quoteSummary": { "result": [{}] } }"#;
        let envelope: QuoteSummaryEnvelope = serde_json::from_str(json).unwrap();
        let calendar = parse_calendar_envelope(envelope);

        assert_eq!(calendar.record_date, None);
        assert_eq!(calendar.pay_date, None);
    }

    #[test]
    fn interval_ladder_matches_range() {
        assert_eq!(interval_for_range("1d"), "15m");
        assert_eq!(interval_for_range("3mo"), "1d");
        assert_eq!(interval_for_range("2y"), "1wk");
        assert_eq!(interval_for_range("max"), "1mo");
        assert_eq!(interval_for_range("unknown"), "1d");
    }
}
