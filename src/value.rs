//! Typed cell values.
//!
//! The value a cell holds is an explicit tagged union decided at assignment
//! time. There is no parse-and-guess path: assigning `"1/2"` stores the text
//! `"1/2"`, never a date.

use chrono::{Days, NaiveDate, NaiveDateTime, TimeDelta, Timelike};

use crate::error::{Error, Result};

/// Which serial-number epoch the workbook uses for dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateSystem {
    /// The 1900 system (epoch 1899-12-31, with the phantom 1900-02-29).
    #[default]
    V1900,
    /// The 1904 system (epoch 1904-01-01).
    V1904,
}

/// Spreadsheet error codes a cell can evaluate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    Div0,
    NA,
    Name,
    Null,
    Num,
    Ref,
    Value,
}

impl CellError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Div0 => "#DIV/0!",
            Self::NA => "#N/A",
            Self::Name => "#NAME?",
            Self::Null => "#NULL!",
            Self::Num => "#NUM!",
            Self::Ref => "#REF!",
            Self::Value => "#VALUE!",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "#DIV/0!" => Some(Self::Div0),
            "#N/A" => Some(Self::NA),
            "#NAME?" => Some(Self::Name),
            "#NULL!" => Some(Self::Null),
            "#NUM!" => Some(Self::Num),
            "#REF!" => Some(Self::Ref),
            "#VALUE!" => Some(Self::Value),
            _ => None,
        }
    }
}

/// Types of data that can be stored in a cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Empty cell
    #[default]
    Blank,
    /// Boolean value
    Boolean(bool),
    /// 64-bit floating point number
    Number(f64),
    /// String value
    Text(String),
    /// Calendar date and time, serialized as a serial number
    DateTime(NaiveDateTime),
    /// Elapsed time, serialized as a fractional day count
    TimeSpan(TimeDelta),
    /// Error value
    Error(CellError),
}

impl CellValue {
    /// Whether the cell holds no value.
    #[inline]
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }

    /// Whether the value is textual (and thus eligible for string sharing).
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, CellValue::Text(_))
    }

    /// The serial-number representation written to a `<v>` element for
    /// date and time-span values.
    pub fn to_serial(&self, date_system: DateSystem) -> Option<f64> {
        match self {
            CellValue::DateTime(dt) => Some(datetime_to_serial(*dt, date_system)),
            CellValue::TimeSpan(span) => Some(timespan_to_serial(*span)),
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::DateTime(value.and_hms_opt(0, 0, 0).unwrap_or_default())
    }
}

impl From<TimeDelta> for CellValue {
    fn from(value: TimeDelta) -> Self {
        CellValue::TimeSpan(value)
    }
}

impl From<CellError> for CellValue {
    fn from(value: CellError) -> Self {
        CellValue::Error(value)
    }
}

const SECONDS_PER_DAY: f64 = 86_400.0;

fn epoch_1900() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 31).unwrap_or_default()
}

fn epoch_1904() -> NaiveDate {
    NaiveDate::from_ymd_opt(1904, 1, 1).unwrap_or_default()
}

/// Convert a date-time to its spreadsheet serial number.
///
/// The 1900 system pretends 1900-02-29 existed, so real dates from
/// 1900-03-01 onward sit one serial higher than their true day offset.
pub fn datetime_to_serial(dt: NaiveDateTime, date_system: DateSystem) -> f64 {
    let days = match date_system {
        DateSystem::V1900 => {
            let d = (dt.date() - epoch_1900()).num_days();
            if d >= 60 { d + 1 } else { d }
        },
        DateSystem::V1904 => (dt.date() - epoch_1904()).num_days(),
    };

    let seconds = dt.num_seconds_from_midnight() as f64 + dt.nanosecond() as f64 / 1e9;
    days as f64 + seconds / SECONDS_PER_DAY
}

/// Convert a spreadsheet serial number back to a date-time.
///
/// The phantom serial 60 of the 1900 system maps to 1900-03-01.
pub fn serial_to_datetime(serial: f64, date_system: DateSystem) -> Result<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return Err(Error::MalformedDocument(format!(
            "invalid date serial {}",
            serial
        )));
    }

    let mut days = serial.trunc() as i64;
    if date_system == DateSystem::V1900 && days > 60 {
        days -= 1;
    }

    let epoch = match date_system {
        DateSystem::V1900 => epoch_1900(),
        DateSystem::V1904 => epoch_1904(),
    };
    let date = epoch
        .checked_add_days(Days::new(days as u64))
        .ok_or_else(|| Error::MalformedDocument(format!("date serial {} out of range", serial)))?;

    let frac = serial.fract();
    let total_nanos = (frac * SECONDS_PER_DAY * 1e9).round() as i64;
    let time_delta = TimeDelta::nanoseconds(total_nanos);
    date.and_hms_opt(0, 0, 0)
        .and_then(|dt| dt.checked_add_signed(time_delta))
        .ok_or_else(|| Error::MalformedDocument(format!("invalid time fraction in serial {}", serial)))
}

/// Convert an elapsed time to a fractional day count.
pub fn timespan_to_serial(span: TimeDelta) -> f64 {
    span.num_seconds() as f64 / SECONDS_PER_DAY
        + span.subsec_nanos() as f64 / (SECONDS_PER_DAY * 1e9)
}

/// Convert a fractional day count to an elapsed time.
pub fn serial_to_timespan(serial: f64) -> TimeDelta {
    TimeDelta::nanoseconds((serial * SECONDS_PER_DAY * 1e9).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_1900_system() {
        let jan1 = NaiveDate::from_ymd_opt(1900, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(datetime_to_serial(jan1, DateSystem::V1900), 1.0);

        // The phantom leap day pushes everything after 1900-02-28 up by one.
        let mar1 = NaiveDate::from_ymd_opt(1900, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(datetime_to_serial(mar1, DateSystem::V1900), 61.0);

        let modern = NaiveDate::from_ymd_opt(2020, 5, 17)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(datetime_to_serial(modern, DateSystem::V1900), 43968.5);
    }

    #[test]
    fn test_serial_1904_system() {
        let epoch = NaiveDate::from_ymd_opt(1904, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(datetime_to_serial(epoch, DateSystem::V1904), 0.0);
    }

    #[test]
    fn test_serial_round_trip() {
        for system in [DateSystem::V1900, DateSystem::V1904] {
            let dt = NaiveDate::from_ymd_opt(2023, 11, 30)
                .unwrap()
                .and_hms_opt(8, 45, 30)
                .unwrap();
            let serial = datetime_to_serial(dt, system);
            assert_eq!(serial_to_datetime(serial, system).unwrap(), dt);
        }
    }

    #[test]
    fn test_serial_rejects_garbage() {
        assert!(serial_to_datetime(-1.0, DateSystem::V1900).is_err());
        assert!(serial_to_datetime(f64::NAN, DateSystem::V1900).is_err());
    }

    #[test]
    fn test_timespan_serial() {
        let span = TimeDelta::hours(36);
        assert_eq!(timespan_to_serial(span), 1.5);
        assert_eq!(serial_to_timespan(1.5), span);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CellError::parse("#REF!"), Some(CellError::Ref));
        assert_eq!(CellError::Div0.as_str(), "#DIV/0!");
        assert_eq!(CellError::parse("#BOGUS!"), None);
    }

    #[test]
    fn test_explicit_typing() {
        // "1/2" stays text; nothing tries to parse it as a date or number.
        assert_eq!(CellValue::from("1/2"), CellValue::Text("1/2".to_string()));
        assert_eq!(CellValue::from(0.5), CellValue::Number(0.5));
    }
}
