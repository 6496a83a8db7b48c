// src/services/market.rs
use chrono::{Datelike, NaiveDate};

/// Which settlement-lag profile applies to an instrument. Korean exchange
/// suffixes select the domestic profile; everything else is foreign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketProfile {
    Domestic,
    Foreign,
}

const DOMESTIC_SUFFIXES: [&str; 2] = [".KS", ".KQ"];

pub fn profile_for_ticker(ticker: &str) -> MarketProfile {
    if DOMESTIC_SUFFIXES.iter().any(|s| ticker.ends_with(s)) {
        MarketProfile::Domestic
    } else {
        MarketProfile::Foreign
    }
}

struct GapRule {
    profile: MarketProfile,
    /// Record-date month this rule is restricted to; `None` matches any.
    month: Option<u32>,
    gap_days: i64,
}

/// Approximate record-date-to-pay-date lags. Domestic December events fall
/// under fiscal year-end settlement, paid roughly four months later; other
/// domestic events settle in about two months, foreign ones in about one.
/// First matching row wins. No holiday calendar is applied.
const GAP_RULES: [GapRule; 3] = [
    GapRule { profile: MarketProfile::Domestic, month: Some(12), gap_days: 115 },
    GapRule { profile: MarketProfile::Domestic, month: None, gap_days: 55 },
    GapRule { profile: MarketProfile::Foreign, month: None, gap_days: 30 },
];

pub fn pay_gap_days(profile: MarketProfile, record_date: NaiveDate) -> i64 {
    let month = record_date.month();
    GAP_RULES
        .iter()
        .find(|rule| rule.profile == profile && rule.month.map_or(true, |m| m == month))
        .map(|rule| rule.gap_days)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn korean_suffixes_are_domestic() {
        assert_eq!(profile_for_ticker("005930.KS"), MarketProfile::Domestic);
        assert_eq!(profile_for_ticker("035720.KQ"), MarketProfile::Domestic);
    }

    #[test]
    fn other_tickers_are_foreign() {
        assert_eq!(profile_for_ticker("AAPL"), MarketProfile::Foreign);
        assert_eq!(profile_for_ticker("VOD.L"), MarketProfile::Foreign);
        assert_eq!(profile_for_ticker("KS"), MarketProfile::Foreign);
    }

    #[test]
    fn domestic_december_gap_is_115_days() {
        assert_eq!(pay_gap_days(MarketProfile::Domestic, date(2023, 12, 28)), 115);
    }

    #[test]
    fn domestic_non_december_gap_is_55_days() {
        assert_eq!(pay_gap_days(MarketProfile::Domestic, date(2024, 3, 29)), 55);
        assert_eq!(pay_gap_days(MarketProfile::Domestic, date(2024, 6, 27)), 55);
    }

    #[test]
    fn foreign_gap_is_30_days_regardless_of_month() {
        assert_eq!(pay_gap_days(MarketProfile::Foreign, date(2023, 12, 15)), 30);
        assert_eq!(pay_gap_days(MarketProfile::Foreign, date(2024, 5, 10)), 30);
    }
}
