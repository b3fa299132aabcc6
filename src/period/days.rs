//! Entitlement bookkeeping for an accrual period.

use chrono::NaiveDate;

use crate::config::PeriodRules;
use crate::models::{PeriodDays, PeriodRange, VacationRequest};

/// Returns the inclusive number of days a request covers.
///
/// An inverted request (final date before start date) counts as 0 days.
pub fn request_day_span(request: &VacationRequest) -> u32 {
    if request.final_date < request.start_date {
        return 0;
    }
    let days = (request.final_date - request.start_date).num_days() + 1;
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// Returns the requests charged to the period starting at `start`.
pub fn requests_in_period(
    requests: &[VacationRequest],
    start: NaiveDate,
) -> impl Iterator<Item = &VacationRequest> {
    requests.iter().filter(move |r| r.start_period == start)
}

/// Sums the days charged to the period starting at `start`.
pub(crate) fn days_enjoyed_in(requests: &[VacationRequest], start: NaiveDate) -> u32 {
    requests_in_period(requests, start)
        .map(request_day_span)
        .fold(0, u32::saturating_add)
}

/// Computes the allowed, enjoyed, and remaining days of a period.
///
/// `days_enjoyed` reports the true total even when it exceeds the
/// entitlement; `days_balance` is clamped at zero.
///
/// # Example
///
/// ```
/// use vacation_engine::config::PeriodRules;
/// use vacation_engine::models::PeriodRange;
/// use vacation_engine::period::make_period_days_allowed;
/// use chrono::NaiveDate;
///
/// let range = PeriodRange {
///     start: NaiveDate::from_ymd_opt(2023, 1, 10).unwrap(),
///     end: NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
/// };
/// let days = make_period_days_allowed(&[], &range, &PeriodRules::default());
///
/// assert_eq!(days.days_allowed, 30);
/// assert_eq!(days.days_balance, 30);
/// ```
pub fn make_period_days_allowed(
    requests: &[VacationRequest],
    range: &PeriodRange,
    rules: &PeriodRules,
) -> PeriodDays {
    let days_allowed = rules.days_allowed;
    let days_enjoyed = days_enjoyed_in(requests, range.start);

    PeriodDays {
        days_allowed,
        days_enjoyed,
        days_balance: days_allowed.saturating_sub(days_enjoyed),
    }
}
