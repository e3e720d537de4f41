use chrono::NaiveDate;
use json::Value;

use crate::prelude::*;

/// Reads an integer from a JSON number or a numeric string.
/// `None` means the value is absent, anything unparsable is an error.
pub fn int_field(value: Option<&Value>, name: &str) -> Result<Option<i64>> {
  let parsed = match value {
    None | Some(Value::Null) => return Ok(None),
    Some(Value::Number(n)) => n.as_i64(),
    Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
    Some(Value::String(s)) => s.trim().parse().ok(),
    Some(_) => None,
  };
  parsed
    .map(Some)
    .ok_or_else(|| Error::validation(format!("{name} must be an integer")))
}

pub fn required_int(value: Option<&Value>, name: &str) -> Result<i64> {
  int_field(value, name)?
    .ok_or_else(|| Error::validation(format!("{name} is required")))
}

pub fn positive_int(value: Option<&Value>, name: &str) -> Result<i32> {
  let n = required_int(value, name)?;
  if n <= 0 {
    return Err(Error::validation(format!("{name} must be a positive integer")));
  }
  i32::try_from(n).map_err(|_| Error::validation(format!("{name} is too large")))
}

/// Non-negative integer that fits an `i32` column.
pub fn non_negative(n: i64, name: &'static str) -> Result<i32> {
  if n < 0 {
    return Err(Error::InvalidQuantity(name));
  }
  i32::try_from(n).map_err(|_| Error::validation(format!("{name} is too large")))
}

/// Trimmed, non-blank string field.
pub fn required_str(value: Option<String>, name: &str) -> Result<String> {
  value
    .map(|s| s.trim().to_owned())
    .filter(|s| !s.is_empty())
    .ok_or_else(|| Error::validation(format!("{name} is required")))
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` and bare dates. Zoned inputs
/// are normalized to UTC.
pub fn parse_date(raw: &str) -> Result<DateTime> {
  let raw = raw.trim();

  if let Ok(date) = chrono::DateTime::parse_from_rfc3339(raw) {
    return Ok(date.with_timezone(&Utc).naive_utc());
  }
  for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
    if let Ok(date) = DateTime::parse_from_str(raw, format) {
      return Ok(date);
    }
  }
  if let Some(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .and_then(|date| date.and_hms_opt(0, 0, 0))
  {
    return Ok(date);
  }

  Err(Error::InvalidDate(raw.to_owned()))
}

pub fn add_months(date: DateTime, months: u32) -> Result<DateTime> {
  date
    .checked_add_months(Months::new(months))
    .ok_or_else(|| Error::Internal(format!("date overflow adding {months} months")))
}
