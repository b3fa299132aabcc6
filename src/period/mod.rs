//! The vacation period engine.
//!
//! Pure functions over a collaborator's hiring date, its vacation requests,
//! the resolved [`PeriodRules`], and an explicit `today`. Nothing here reads
//! a clock or performs I/O, and nothing returns an error: out-of-range input
//! is clamped (inverted requests count 0 days, balances stop at 0, calendar
//! overflow saturates to [`chrono::NaiveDate::MAX`]).
//!
//! The four building blocks, [`make_period_range`], [`make_period_limits`],
//! [`make_period_days_allowed`] and [`make_period_status`], are composed by
//! [`compute_period`].

mod days;
mod limits;
mod range;
mod status;

use chrono::NaiveDate;

use crate::config::PeriodRules;
use crate::models::{Period, VacationRequest};

pub use days::{make_period_days_allowed, request_day_span, requests_in_period};
pub use limits::make_period_limits;
pub use range::{
    MAX_TRACKED_PERIODS, accrual_period, accrual_period_start, current_period_index,
    is_period_boundary, make_period_range,
};
pub use status::{due_soon_from, make_period_status};

/// Computes the full view of the open accrual period.
///
/// # Example
///
/// ```
/// use vacation_engine::config::PeriodRules;
/// use vacation_engine::models::Situation;
/// use vacation_engine::period::compute_period;
/// use chrono::NaiveDate;
///
/// let hiring = NaiveDate::from_ymd_opt(2023, 1, 10).unwrap();
/// let today = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
/// let period = compute_period(hiring, &[], &PeriodRules::default(), today);
///
/// assert_eq!(period.start, hiring);
/// assert_eq!(period.days_balance, 30);
/// assert_eq!(period.situation, Situation::Ok);
/// ```
pub fn compute_period(
    hiring_date: NaiveDate,
    requests: &[VacationRequest],
    rules: &PeriodRules,
    today: NaiveDate,
) -> Period {
    let range = make_period_range(requests, hiring_date, today, rules);
    let limits = make_period_limits(&range, rules);
    let days = make_period_days_allowed(requests, &range, rules);
    let situation = make_period_status(&limits, &days, rules, today);

    Period {
        start: range.start,
        end: range.end,
        limit_enterprise: limits.limit_enterprise,
        ultimate: limits.ultimate,
        days_allowed: days.days_allowed,
        days_enjoyed: days.days_enjoyed,
        days_balance: days.days_balance,
        requests: requests_in_period(requests, range.start).cloned().collect(),
        situation,
    }
}
