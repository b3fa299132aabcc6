//! Spreadsheet serial date conversion (1900 date system).

use chrono::{Days, NaiveDate};

use crate::error::{EngineError, EngineResult};

/// Serial number of the fictitious 1900-02-29.
const PHANTOM_LEAP_DAY: f64 = 60.0;

/// Serial number of 9999-12-31, the last representable spreadsheet date.
pub const MAX_SERIAL: f64 = 2_958_465.0;

/// Converts a spreadsheet serial number to a calendar date.
///
/// Serial 1 is 1900-01-01. The 1900 system counts a 29 February that never
/// existed, so serials after 60 are shifted back by one day and 60 itself
/// is rejected. A fractional part (time of day) is ignored.
///
/// # Example
///
/// ```
/// use vacation_engine::services::from_excel_serial;
/// use chrono::NaiveDate;
///
/// let date = from_excel_serial(44927.0).unwrap();
/// assert_eq!(date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
/// ```
pub fn from_excel_serial(serial: f64) -> EngineResult<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return Err(invalid(serial, "must be a positive number"));
    }
    if serial > MAX_SERIAL {
        return Err(invalid(serial, "is past 9999-12-31"));
    }

    let whole = serial.trunc();
    if whole == PHANTOM_LEAP_DAY {
        return Err(invalid(serial, "is the nonexistent 1900-02-29"));
    }

    // 1899-12-31 is serial 0; past the phantom day the epoch moves back one.
    let epoch = if whole < PHANTOM_LEAP_DAY {
        NaiveDate::from_ymd_opt(1899, 12, 31)
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)
    };

    epoch
        .and_then(|epoch| epoch.checked_add_days(Days::new(whole as u64)))
        .ok_or_else(|| invalid(serial, "is outside the calendar"))
}

fn invalid(serial: f64, reason: &str) -> EngineError {
    EngineError::validation("hiringDate", format!("serial date {serial} {reason}"))
}
