//! Quarter-based boundary date arithmetic.
//!
//! The Treasury only finalizes exchange rates at quarter end, so every query
//! is anchored to the closing day of a calendar quarter:
//!
//! - with an explicit reference date, the close of the quarter containing it
//! - without one, the close of the quarter before the current one (the current
//!   quarter is still being published)

use chrono::{Datelike, NaiveDate};

use crate::domain::{DATE_FORMAT, QueryBoundary};
use crate::error::AppError;

/// Compute the inclusive `record_date` lower bound for a run.
pub fn compute_boundary(reference: Option<&str>, today: NaiveDate) -> Result<QueryBoundary, AppError> {
    let date = match reference {
        Some(raw) => {
            let since = parse_date(raw)?;
            if since > today {
                return Err(AppError::invalid_date(format!(
                    "Date {raw} provided is in the future, cannot retrieve exchange data."
                )));
            }
            last_day_of_quarter(since)
        }
        None => last_day_of_previous_quarter(today),
    };

    date.map(QueryBoundary::new)
        .ok_or_else(|| AppError::invalid_date("Quarter boundary falls outside the supported date range."))
}

/// Parse a `YYYY-MM-DD` date string.
///
/// Only digits and `-` are accepted. chrono's `%Y` also takes a sign and
/// surrounding whitespace, which a date flag should not.
pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    let plain = raw.starts_with(|c: char| c.is_ascii_digit())
        && raw.chars().all(|c| c.is_ascii_digit() || c == '-');
    plain
        .then(|| NaiveDate::parse_from_str(raw, DATE_FORMAT).ok())
        .flatten()
        .ok_or_else(|| {
            AppError::invalid_date(format!(
                "Invalid since date string '{raw}' provided, must be in format of YYYY-MM-DD."
            ))
        })
}

/// Quarter index (1..=4) for a date.
pub fn quarter_of(date: NaiveDate) -> u32 {
    date.month0() / 3 + 1
}

pub fn first_day_of_quarter(date: NaiveDate) -> Option<NaiveDate> {
    let month = 3 * (quarter_of(date) - 1) + 1;
    NaiveDate::from_ymd_opt(date.year(), month, 1)
}

/// Closing day of the quarter containing `date`: one day before the next
/// quarter starts (Q4 wraps to January of the following year).
pub fn last_day_of_quarter(date: NaiveDate) -> Option<NaiveDate> {
    let quarter = quarter_of(date);
    let next_start = if quarter == 4 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(date.year(), 3 * quarter + 1, 1)?
    };
    next_start.pred_opt()
}

pub fn last_day_of_previous_quarter(date: NaiveDate) -> Option<NaiveDate> {
    first_day_of_quarter(date)?.pred_opt()
}
