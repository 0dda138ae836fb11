//! Typed parsing for individual CSV fields. Every function takes the raw,
//! already-trimmed text of one cell; an empty cell means "no value".

use std::{str::FromStr, sync::LazyLock};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::error::CoercionError;

static YEAR_MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})$").expect("year_month pattern is valid"));

/// Naive forms tried in order after RFC 3339 has been ruled out.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

pub(crate) fn optional_text(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

pub(crate) fn required_text(column: &'static str, value: &str) -> Result<String, CoercionError> {
    optional_text(value).ok_or_else(|| CoercionError::new(column, value, "value is required"))
}

fn optional_number<T: FromStr>(
    column: &'static str,
    value: &str,
    kind: &str,
) -> Result<Option<T>, CoercionError> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<T>()
        .map(Some)
        .map_err(|_| CoercionError::new(column, value, format!("not {kind}")))
}

pub(crate) fn optional_integer(
    column: &'static str,
    value: &str,
) -> Result<Option<i32>, CoercionError> {
    optional_number(column, value, "an integer")
}

pub(crate) fn required_integer(column: &'static str, value: &str) -> Result<i32, CoercionError> {
    optional_integer(column, value)?
        .ok_or_else(|| CoercionError::new(column, value, "value is required"))
}

pub(crate) fn optional_amount(
    column: &'static str,
    value: &str,
) -> Result<Option<f64>, CoercionError> {
    let amount: Option<f64> = optional_number(column, value, "a number")?;
    match amount {
        Some(amount) if !amount.is_finite() => {
            Err(CoercionError::new(column, value, "not a finite number"))
        }
        _ => Ok(amount),
    }
}

/// `Y` is true, `N` is false, an empty cell is no value. Anything else is
/// rejected rather than silently stored as NULL.
pub(crate) fn sgna_flag(value: &str) -> Result<Option<bool>, CoercionError> {
    match value {
        "Y" => Ok(Some(true)),
        "N" => Ok(Some(false)),
        "" => Ok(None),
        _ => Err(CoercionError::new("sgna_flag", value, "expected Y or N")),
    }
}

/// `YYYY-MM` becomes the first day of that month.
pub(crate) fn year_month(value: &str) -> Result<NaiveDate, CoercionError> {
    let (_, [year, month]) = YEAR_MONTH_RE
        .captures(value)
        .ok_or_else(|| CoercionError::new("year_month", value, "expected YYYY-MM"))?
        .extract();
    let invalid = || CoercionError::new("year_month", value, "not a calendar month");
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}

/// Canonicalises a free-text timestamp. Values carrying an offset are
/// converted to UTC; naive values are taken as they are.
pub(crate) fn load_timestamp(value: &str) -> Result<Option<NaiveDateTime>, CoercionError> {
    if value.is_empty() {
        return Ok(None);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(datetime.naive_utc()));
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Some(datetime));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0));
    }
    Err(CoercionError::new(
        "load_timestamp",
        value,
        "unrecognised date-time",
    ))
}
