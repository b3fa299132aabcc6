//! Employer and legal deadlines of an accrual period.

use chrono::{Months, NaiveDate};

use crate::config::PeriodRules;
use crate::models::{PeriodLimits, PeriodRange};

fn add_months_saturating(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Computes the deadlines of a period from its start.
///
/// `limit_enterprise` is the start plus `limit_enterprise_months`, and
/// `ultimate` the start plus `ultimate_months`.
///
/// # Example
///
/// ```
/// use vacation_engine::config::PeriodRules;
/// use vacation_engine::models::PeriodRange;
/// use vacation_engine::period::make_period_limits;
/// use chrono::NaiveDate;
///
/// let range = PeriodRange {
///     start: NaiveDate::from_ymd_opt(2022, 1, 10).unwrap(),
///     end: NaiveDate::from_ymd_opt(2023, 1, 9).unwrap(),
/// };
/// let limits = make_period_limits(&range, &PeriodRules::default());
///
/// assert_eq!(limits.limit_enterprise, NaiveDate::from_ymd_opt(2022, 12, 10).unwrap());
/// assert_eq!(limits.ultimate, NaiveDate::from_ymd_opt(2023, 3, 10).unwrap());
/// ```
pub fn make_period_limits(range: &PeriodRange, rules: &PeriodRules) -> PeriodLimits {
    PeriodLimits {
        limit_enterprise: add_months_saturating(range.start, rules.limit_enterprise_months),
        ultimate: add_months_saturating(range.start, rules.ultimate_months),
    }
}
