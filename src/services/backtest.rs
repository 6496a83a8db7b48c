// src/services/backtest.rs
use chrono::{DateTime, Utc};
use log::info;

use crate::handlers::error::ApiError;
use crate::models::{BacktestSummary, ContributionRecord, PricePoint};

/// A price series with absent samples removed. The surviving first and last
/// timestamps are authoritative for duration math; the caller's requested
/// lookback window is never consulted.
#[derive(Debug, Clone)]
pub struct NormalizedSeries {
    samples: Vec<(DateTime<Utc>, f64)>,
}

impl NormalizedSeries {
    pub fn samples(&self) -> &[(DateTime<Utc>, f64)] {
        &self.samples
    }

    pub fn first_timestamp(&self) -> DateTime<Utc> {
        self.samples[0].0
    }

    pub fn last_timestamp(&self) -> DateTime<Utc> {
        self.samples[self.samples.len() - 1].0
    }

    pub fn duration_years(&self) -> f64 {
        let elapsed = self.last_timestamp() - self.first_timestamp();
        elapsed.num_seconds() as f64 / 86_400.0 / 365.25
    }
}

/// Drops samples without a price, keeping the provider's order. Absent
/// periods are excluded from simulation, never interpolated.
pub fn normalize_series(raw: &[PricePoint]) -> Result<NormalizedSeries, ApiError> {
    let samples: Vec<(DateTime<Utc>, f64)> = raw
        .iter()
        .filter_map(|p| p.price.map(|price| (p.timestamp, price)))
        .collect();

    if samples.is_empty() {
        return Err(ApiError::computation("no usable samples in price series"));
    }

    Ok(NormalizedSeries { samples })
}

#[derive(Debug)]
pub struct BacktestRun {
    pub records: Vec<ContributionRecord>,
    pub summary: BacktestSummary,
}

/// Replays a fixed contribution once per surviving sample: each period buys
/// `amount / price` units, so high prices buy fewer units and low prices
/// more. The summary's annualized figure is total return divided by elapsed
/// years — a simple annualization, not a CAGR or IRR, since an exact rate
/// for staggered contributions would require an internal-rate-of-return
/// solve.
pub fn simulate_contributions(
    series: &NormalizedSeries,
    amount: f64,
) -> Result<BacktestRun, ApiError> {
    let mut total_units = 0.0_f64;
    let mut total_principal = 0.0_f64;
    let mut final_valuation = 0.0_f64;
    let mut records = Vec::with_capacity(series.samples().len());

    for &(timestamp, price) in series.samples() {
        total_principal += amount;
        total_units += amount / price;
        final_valuation = total_units * price;

        records.push(ContributionRecord {
            date: timestamp.format("%Y-%m").to_string(),
            principal: total_principal.round(),
            valuation: final_valuation.round(),
            price,
        });
    }

    if total_principal == 0.0 {
        return Err(ApiError::computation("zero principal after simulation"));
    }

    let duration_years = series.duration_years();
    let roi_percent = (final_valuation - total_principal) / total_principal * 100.0;
    let annual_roi = if duration_years > 0.0 {
        roi_percent / duration_years
    } else {
        roi_percent
    };

    let start_date = series.first_timestamp().format("%Y.%m").to_string();
    let end_date = series.last_timestamp().format("%Y.%m").to_string();
    info!(
        "Simulated {} contributions of {} over {:.1} years (roi {:.2}%)",
        records.len(),
        amount,
        duration_years,
        roi_percent
    );

    let summary = BacktestSummary {
        total_principal: total_principal.round(),
        total_valuation: final_valuation.round(),
        roi: format!("{:.2}", roi_percent),
        annual_roi: format!("{:.2}", annual_roi),
        start_date: start_date.clone(),
        end_date,
        duration_years: format!("{:.1}", duration_years),
        message: format!("Since {} (~{:.1} years)", start_date, duration_years),
    };

    Ok(BacktestRun { records, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn monthly_points(prices: &[Option<f64>]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                timestamp: Utc
                    .with_ymd_and_hms(2023, 1 + i as u32, 1, 0, 0, 0)
                    .unwrap(),
                price,
            })
            .collect()
    }

    #[test]
    fn normalization_drops_absent_prices_and_keeps_order() {
        let raw = monthly_points(&[Some(10.0), None, Some(12.0), None, Some(11.0)]);
        let series = normalize_series(&raw).unwrap();

        let prices: Vec<f64> = series.samples().iter().map(|s| s.1).collect();
        assert_eq!(prices, vec![10.0, 12.0, 11.0]);
        assert_eq!(series.first_timestamp(), raw[0].timestamp);
        assert_eq!(series.last_timestamp(), raw[4].timestamp);
    }

    #[test]
    fn empty_series_is_an_error() {
        assert!(normalize_series(&[]).is_err());
        assert!(normalize_series(&monthly_points(&[None, None])).is_err());
    }

    #[test]
    fn duration_comes_from_surviving_samples_only() {
        // Two surviving samples exactly one year apart, flanked by holes.
        let raw = vec![
            PricePoint {
                timestamp: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
                price: None,
            },
            PricePoint {
                timestamp: Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap(),
                price: Some(10.0),
            },
            PricePoint {
                timestamp: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
                price: Some(11.0),
            },
        ];
        let series = normalize_series(&raw).unwrap();
        let years = series.duration_years();
        assert!((years - 365.0 / 365.25).abs() < 1e-9);
    }

    #[test]
    fn principal_is_contribution_times_surviving_count() {
        let raw = monthly_points(&[Some(10.0), None, Some(20.0), Some(25.0), None]);
        let series = normalize_series(&raw).unwrap();
        let run = simulate_contributions(&series, 100.0).unwrap();

        assert_eq!(run.records.len(), 3);
        assert_eq!(run.summary.total_principal, 300.0);
        assert_eq!(run.records.last().unwrap().principal, 300.0);
    }

    #[test]
    fn dca_over_ten_twenty_ten() {
        let raw = monthly_points(&[Some(10.0), Some(20.0), Some(10.0)]);
        let series = normalize_series(&raw).unwrap();
        let run = simulate_contributions(&series, 100.0).unwrap();

        // Month 1: 10 units, 100 in, worth 100.
        assert_eq!(run.records[0].principal, 100.0);
        assert_eq!(run.records[0].valuation, 100.0);
        // Month 2: +5 units (15 total), 200 in, worth 300.
        assert_eq!(run.records[1].principal, 200.0);
        assert_eq!(run.records[1].valuation, 300.0);
        // Month 3: +10 units (25 total), 300 in, worth 250.
        assert_eq!(run.records[2].principal, 300.0);
        assert_eq!(run.records[2].valuation, 250.0);

        assert_eq!(run.summary.roi, "-16.67");
        assert_eq!(run.summary.total_valuation, 250.0);
    }

    #[test]
    fn roi_matches_final_valuation_formula() {
        let raw = monthly_points(&[Some(50.0), Some(40.0), Some(60.0), Some(55.0)]);
        let series = normalize_series(&raw).unwrap();
        let run = simulate_contributions(&series, 75.0).unwrap();

        let principal = 4.0 * 75.0;
        let units = 75.0 / 50.0 + 75.0 / 40.0 + 75.0 / 60.0 + 75.0 / 55.0;
        let expected = (units * 55.0 - principal) / principal * 100.0;
        let got: f64 = run.summary.roi.parse().unwrap();
        assert!((got - expected).abs() < 0.01);
    }

    #[test]
    fn single_sample_does_not_divide_by_zero_duration() {
        let raw = monthly_points(&[Some(10.0)]);
        let series = normalize_series(&raw).unwrap();
        let run = simulate_contributions(&series, 100.0).unwrap();

        assert_eq!(run.summary.roi, "0.00");
        assert_eq!(run.summary.annual_roi, "0.00");
    }
}
