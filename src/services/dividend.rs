// src/services/dividend.rs
use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::debug;

use crate::models::{
    AnnotatedDistributionEvent, CycleLabel, DistributionEvent, PayoutCycle, ScheduleProjection,
    ScheduleStatus, YieldEstimate,
};
use crate::services::market::{pay_gap_days, MarketProfile};

/// Authoritative upcoming dates from the calendar provider, when it had any.
#[derive(Debug, Clone, Default)]
pub struct CalendarDates {
    pub record_date: Option<NaiveDate>,
    pub pay_date: Option<NaiveDate>,
}

/// Sorts raw events and attaches an estimated pay date to each via the
/// market gap table. Returned history is most-recent-first.
pub fn annotate_events(
    mut events: Vec<DistributionEvent>,
    profile: MarketProfile,
) -> Vec<AnnotatedDistributionEvent> {
    events.sort_by_key(|e| e.timestamp);

    let mut history: Vec<AnnotatedDistributionEvent> = events
        .into_iter()
        .map(|event| {
            let gap = pay_gap_days(profile, event.record_date);
            AnnotatedDistributionEvent {
                ex_date: event.record_date,
                pay_date: event.record_date + Duration::days(gap),
                amount: event.amount,
                timestamp: event.timestamp,
            }
        })
        .collect();

    history.reverse();
    history
}

/// Labels the payout frequency from the trailing-365-day event count. A
/// heuristic, not a fit: 11+ events reads as monthly, 3+ as quarterly, 1+
/// as semiannual-or-annual. Boundary counts (2, or 10) intentionally fall
/// through to the lower bucket.
pub fn classify_cycle(
    history: &[AnnotatedDistributionEvent],
    now: DateTime<Utc>,
) -> PayoutCycle {
    let cutoff = now - Duration::days(365);
    let trailing_year_count = history.iter().filter(|e| e.timestamp > cutoff).count();

    let (label, period_days) = match trailing_year_count {
        n if n >= 11 => (CycleLabel::Monthly, 30),
        n if n >= 3 => (CycleLabel::Quarterly, 91),
        n if n >= 1 => (CycleLabel::SemiAnnualOrAnnual, 182),
        _ => (CycleLabel::Irregular, 0),
    };

    debug!(
        "Classified payout cycle: {:?} ({} events in trailing year)",
        label, trailing_year_count
    );

    PayoutCycle {
        label,
        period_days,
        trailing_year_count,
    }
}

/// Projects the next record and pay dates. An authoritative calendar entry
/// always wins over pattern extrapolation; with only a record date the pay
/// date is estimated via the gap table. Without calendar data the last
/// known record date is advanced by one cycle period, with a single
/// catch-up step if that still lands in the past. A schedule more than two
/// periods stale is not advanced further.
pub fn project_schedule(
    history: &[AnnotatedDistributionEvent],
    calendar: &CalendarDates,
    cycle: &PayoutCycle,
    profile: MarketProfile,
    today: NaiveDate,
) -> ScheduleProjection {
    if let Some(record_date) = calendar.record_date {
        if let Some(pay_date) = calendar.pay_date {
            return ScheduleProjection {
                next_record_date: Some(record_date),
                next_pay_date: Some(pay_date),
                is_official: true,
                status: ScheduleStatus::Confirmed,
            };
        }

        let gap = pay_gap_days(profile, record_date);
        return ScheduleProjection {
            next_record_date: Some(record_date),
            next_pay_date: Some(record_date + Duration::days(gap)),
            is_official: true,
            status: ScheduleStatus::RecordDateConfirmedPayEstimated,
        };
    }

    if cycle.period_days > 0 {
        if let Some(latest) = history.first() {
            let mut projected = latest.ex_date + Duration::days(cycle.period_days);
            if projected <= today {
                projected = projected + Duration::days(cycle.period_days);
            }

            let gap = pay_gap_days(profile, projected);
            return ScheduleProjection {
                next_record_date: Some(projected),
                next_pay_date: Some(projected + Duration::days(gap)),
                is_official: false,
                status: ScheduleStatus::PatternEstimated,
            };
        }
    }

    ScheduleProjection {
        next_record_date: None,
        next_pay_date: None,
        is_official: false,
        status: ScheduleStatus::Unknown,
    }
}

/// Forward annual estimate: latest per-unit amount times the trailing-year
/// event count (at least one). A non-positive price yields zero rather
/// than an error.
pub fn project_yield(
    history: &[AnnotatedDistributionEvent],
    trailing_year_count: usize,
    price: f64,
) -> YieldEstimate {
    let latest_amount = history.first().map(|e| e.amount).unwrap_or(0.0);
    let projected_annual_amount = latest_amount * trailing_year_count.max(1) as f64;
    let yield_percent = if price > 0.0 {
        projected_annual_amount / price * 100.0
    } else {
        0.0
    };

    YieldEstimate {
        projected_annual_amount,
        yield_percent,
    }
}
