//! Compliance status of an accrual period.

use chrono::{Days, NaiveDate};

use crate::config::PeriodRules;
use crate::models::{PeriodDays, PeriodLimits, Situation};

/// Returns the first day of the warning window before `limit_enterprise`.
pub fn due_soon_from(limits: &PeriodLimits, rules: &PeriodRules) -> NaiveDate {
    limits
        .limit_enterprise
        .checked_sub_days(Days::new(u64::from(rules.due_soon_warning_days)))
        .unwrap_or(NaiveDate::MIN)
}

/// Classifies a period.
///
/// Checks run in a fixed order and the first match wins:
///
/// 1. `EXHAUSTED` when the enjoyed days reach the entitlement;
/// 2. `OVERDUE` when `today` is past `limit_enterprise` or `ultimate`;
/// 3. `DUE_SOON` when `today` is inside the warning window;
/// 4. `OK` otherwise.
///
/// When `rules.deadline_exempt` is set (contractors in the shipped policy),
/// steps 2 and 3 are skipped.
///
/// # Example
///
/// ```
/// use vacation_engine::config::PeriodRules;
/// use vacation_engine::models::{PeriodDays, PeriodLimits, Situation};
/// use vacation_engine::period::make_period_status;
/// use chrono::NaiveDate;
///
/// let limits = PeriodLimits {
///     limit_enterprise: NaiveDate::from_ymd_opt(2022, 12, 10).unwrap(),
///     ultimate: NaiveDate::from_ymd_opt(2023, 3, 10).unwrap(),
/// };
/// let days = PeriodDays { days_allowed: 30, days_enjoyed: 15, days_balance: 15 };
/// let today = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
///
/// let situation = make_period_status(&limits, &days, &PeriodRules::default(), today);
/// assert_eq!(situation, Situation::Overdue);
/// ```
pub fn make_period_status(
    limits: &PeriodLimits,
    days: &PeriodDays,
    rules: &PeriodRules,
    today: NaiveDate,
) -> Situation {
    if days.days_enjoyed >= days.days_allowed {
        return Situation::Exhausted;
    }
    if rules.deadline_exempt {
        return Situation::Ok;
    }
    if today > limits.limit_enterprise || today > limits.ultimate {
        return Situation::Overdue;
    }
    if today >= due_soon_from(limits, rules) {
        return Situation::DueSoon;
    }
    Situation::Ok
}
