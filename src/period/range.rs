//! Accrual period boundaries and open-period selection.
//!
//! Accrual period `k` starts `k × accrual_period_months` months after the
//! hiring date and ends the day before period `k + 1` starts. Every start is
//! computed from the hiring date itself, so a 29 February hire anchors on
//! 28 February in common years and on 29 February again in leap years.

use chrono::{Months, NaiveDate};

use crate::config::PeriodRules;
use crate::models::{PeriodRange, VacationRequest};

use super::days::days_enjoyed_in;

/// Upper bound on the number of periods the engine walks through.
///
/// Far beyond any employment length; keeps the walk finite for corrupt
/// hiring dates.
pub const MAX_TRACKED_PERIODS: u32 = 200;

/// Returns the first day of accrual period `index`.
///
/// Saturates to [`NaiveDate::MAX`] when the result leaves the calendar.
pub fn accrual_period_start(hiring_date: NaiveDate, index: u32, rules: &PeriodRules) -> NaiveDate {
    let months = index.saturating_mul(rules.accrual_period_months);
    hiring_date
        .checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Returns the boundaries of accrual period `index`.
///
/// # Example
///
/// ```
/// use vacation_engine::config::PeriodRules;
/// use vacation_engine::period::accrual_period;
/// use chrono::NaiveDate;
///
/// let hiring = NaiveDate::from_ymd_opt(2022, 1, 10).unwrap();
/// let period = accrual_period(hiring, 1, &PeriodRules::default());
///
/// assert_eq!(period.start, NaiveDate::from_ymd_opt(2023, 1, 10).unwrap());
/// assert_eq!(period.end, NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
/// ```
pub fn accrual_period(hiring_date: NaiveDate, index: u32, rules: &PeriodRules) -> PeriodRange {
    let start = accrual_period_start(hiring_date, index, rules);
    let next = accrual_period_start(hiring_date, index.saturating_add(1), rules);
    let end = next.pred_opt().unwrap_or(next).max(start);
    PeriodRange { start, end }
}

/// Returns the index of the period containing `today`.
///
/// Period 0 is returned when `today` precedes the hiring date.
pub fn current_period_index(hiring_date: NaiveDate, today: NaiveDate, rules: &PeriodRules) -> u32 {
    let mut index = 0;
    while index < MAX_TRACKED_PERIODS
        && accrual_period_start(hiring_date, index + 1, rules) <= today
    {
        index += 1;
    }
    index
}

/// Checks whether `date` is the start of one of the collaborator's periods.
pub fn is_period_boundary(hiring_date: NaiveDate, date: NaiveDate, rules: &PeriodRules) -> bool {
    (0..=MAX_TRACKED_PERIODS)
        .map(|index| accrual_period_start(hiring_date, index, rules))
        .take_while(|start| *start <= date)
        .any(|start| start == date)
}

/// Determines the currently open accrual period.
///
/// Periods up to the one containing `today` are serviced oldest-first: the
/// earliest one that is not settled is open. A period is settled when its
/// enjoyed days reach the entitlement, or when an imported request is
/// charged to it or to a later period (historical data supersedes it). When
/// every period is settled, the period containing `today` is returned.
///
/// # Example
///
/// ```
/// use vacation_engine::config::PeriodRules;
/// use vacation_engine::period::make_period_range;
/// use chrono::NaiveDate;
///
/// let hiring = NaiveDate::from_ymd_opt(2023, 1, 10).unwrap();
/// let today = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
/// let range = make_period_range(&[], hiring, today, &PeriodRules::default());
///
/// assert_eq!(range.start, hiring);
/// ```
pub fn make_period_range(
    requests: &[VacationRequest],
    hiring_date: NaiveDate,
    today: NaiveDate,
    rules: &PeriodRules,
) -> PeriodRange {
    let current = current_period_index(hiring_date, today, rules);
    let latest_imported = requests
        .iter()
        .filter(|r| r.came_imported)
        .map(|r| r.start_period)
        .max();

    (0..=current)
        .map(|index| accrual_period(hiring_date, index, rules))
        .find(|range| {
            let superseded = latest_imported.is_some_and(|start| start >= range.start);
            let consumed = days_enjoyed_in(requests, range.start) >= rules.days_allowed;
            !(superseded || consumed)
        })
        .unwrap_or_else(|| accrual_period(hiring_date, current, rules))
}
