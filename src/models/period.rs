//! Derived period models.
//!
//! These values are computed on demand by the period engine and never
//! persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::VacationRequest;

/// Boundaries of one accrual period, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodRange {
    /// First day of the period (a hiring-date anniversary).
    pub start: NaiveDate,
    /// Last day of the period.
    pub end: NaiveDate,
}

impl PeriodRange {
    /// Checks if a given date falls within this period (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Deadlines attached to an accrual period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodLimits {
    /// Employer's deadline to grant the leave.
    pub limit_enterprise: NaiveDate,
    /// Hard legal deadline by which leave must be taken.
    pub ultimate: NaiveDate,
}

/// Entitlement bookkeeping for an accrual period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDays {
    /// Entitlement for the period.
    pub days_allowed: u32,
    /// Days charged to the period, unclamped.
    pub days_enjoyed: u32,
    /// Remaining entitlement, never below zero.
    pub days_balance: u32,
}

/// Compliance status of a collaborator's open accrual period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Situation {
    /// Balance left and no deadline close.
    Ok,
    /// Within the warning window before `limit_enterprise`.
    DueSoon,
    /// Past `limit_enterprise` or `ultimate`.
    Overdue,
    /// The entitlement has been fully used.
    Exhausted,
}

impl std::fmt::Display for Situation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Situation::Ok => write!(f, "OK"),
            Situation::DueSoon => write!(f, "DUE_SOON"),
            Situation::Overdue => write!(f, "OVERDUE"),
            Situation::Exhausted => write!(f, "EXHAUSTED"),
        }
    }
}

/// The full view of a collaborator's open accrual period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    /// First day of the period.
    pub start: NaiveDate,
    /// Last day of the period.
    pub end: NaiveDate,
    /// Employer's grant deadline.
    pub limit_enterprise: NaiveDate,
    /// Hard legal deadline.
    pub ultimate: NaiveDate,
    /// Entitlement for the period.
    pub days_allowed: u32,
    /// Days charged to the period.
    pub days_enjoyed: u32,
    /// Remaining entitlement, clamped at zero.
    pub days_balance: u32,
    /// Requests charged to this period.
    pub requests: Vec<VacationRequest>,
    /// Compliance status.
    pub situation: Situation,
}

impl Period {
    /// Returns the period boundaries.
    pub fn range(&self) -> PeriodRange {
        PeriodRange {
            start: self.start,
            end: self.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_situation_serialization() {
        assert_eq!(serde_json::to_string(&Situation::Ok).unwrap(), "\"OK\"");
        assert_eq!(
            serde_json::to_string(&Situation::DueSoon).unwrap(),
            "\"DUE_SOON\""
        );
        assert_eq!(
            serde_json::from_str::<Situation>("\"EXHAUSTED\"").unwrap(),
            Situation::Exhausted
        );
    }

    #[test]
    fn test_situation_display_matches_wire_format() {
        for situation in [
            Situation::Ok,
            Situation::DueSoon,
            Situation::Overdue,
            Situation::Exhausted,
        ] {
            let wire = serde_json::to_string(&situation).unwrap();
            assert_eq!(wire.trim_matches('"'), situation.to_string());
        }
    }

    #[test]
    fn test_range_contains_its_boundaries() {
        let range = PeriodRange {
            start: NaiveDate::from_ymd_opt(2022, 1, 10).unwrap(),
            end: NaiveDate::from_ymd_opt(2023, 1, 9).unwrap(),
        };
        assert!(range.contains_date(range.start));
        assert!(range.contains_date(range.end));
        assert!(!range.contains_date(NaiveDate::from_ymd_opt(2023, 1, 10).unwrap()));
    }
}
