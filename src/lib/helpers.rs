use std::fmt::Display;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::constants::{EPOCH_DAY, EPOCH_MONTH, EPOCH_YEAR, SECONDS_PER_DAY};

#[derive(Debug)]
pub struct AltimetryError {
    msg: String,
}

impl From<String> for AltimetryError {
    fn from(msg: String) -> Self {
        AltimetryError { msg }
    }
}

impl From<AltimetryError> for String {
    fn from(value: AltimetryError) -> String {
        value.msg
    }
}

impl From<&str> for AltimetryError {
    fn from(msg: &str) -> Self {
        AltimetryError { msg: msg.into() }
    }
}

impl From<std::io::Error> for AltimetryError {
    fn from(err: std::io::Error) -> Self {
        AltimetryError {
            msg: err.to_string(),
        }
    }
}

#[cfg(feature = "netcdf")]
impl From<netcdf::error::Error> for AltimetryError {
    fn from(err: netcdf::error::Error) -> Self {
        AltimetryError {
            msg: format!("netcdf error: {err}"),
        }
    }
}

impl Display for AltimetryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl std::error::Error for AltimetryError {}

/// 1950-01-01T00:00:00, origin of the day counts of the altimetry products
pub fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(EPOCH_YEAR, EPOCH_MONTH, EPOCH_DAY)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("epoch should be a valid date")
}

/// Fractional days elapsed since the epoch
pub fn days_since_epoch(time: &NaiveDateTime) -> f64 {
    let elapsed = time.signed_duration_since(epoch());
    elapsed.num_milliseconds() as f64 / (SECONDS_PER_DAY * 1000.0)
}

/// Inverse of [`days_since_epoch`], at millisecond resolution
pub fn datetime_from_days(days: f64) -> Option<NaiveDateTime> {
    offset_from(epoch(), days * SECONDS_PER_DAY)
}

fn offset_from(origin: NaiveDateTime, seconds: f64) -> Option<NaiveDateTime> {
    if !seconds.is_finite() {
        return None;
    }
    let offset = Duration::try_milliseconds((seconds * 1000.0).round() as i64)?;
    origin.checked_add_signed(offset)
}

fn parse_origin(origin: &str) -> Option<NaiveDateTime> {
    let origin = origin
        .trim()
        .trim_end_matches("UTC")
        .trim_end_matches('Z')
        .trim()
        .replace('T', " ");

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(date) = NaiveDateTime::parse_from_str(&origin, format) {
            return Some(date);
        }
    }
    NaiveDate::parse_from_str(&origin, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Splits CF time units (`<unit> since <origin>`) into the length of one unit
/// in seconds and the origin
pub fn parse_time_units(units: &str) -> Result<(f64, NaiveDateTime), AltimetryError> {
    let (unit, origin) = units
        .split_once(" since ")
        .ok_or_else(|| format!("Invalid time units '{}'", units))?;

    let seconds = match unit.trim().to_lowercase().as_str() {
        "days" | "day" | "d" => SECONDS_PER_DAY,
        "hours" | "hour" | "h" => 3600.0,
        "minutes" | "minute" | "min" => 60.0,
        "seconds" | "second" | "s" => 1.0,
        other => return Err(format!("Unsupported time unit '{}' in '{}'", other, units).into()),
    };

    let origin =
        parse_origin(origin).ok_or_else(|| format!("Invalid time origin in '{}'", units))?;

    Ok((seconds, origin))
}

/// Converts raw time values into calendar timestamps using the declared CF units
pub fn decode_time_units(values: &[f64], units: &str) -> Result<Vec<NaiveDateTime>, AltimetryError> {
    let (seconds, origin) = parse_time_units(units)?;
    values
        .iter()
        .map(|value| {
            offset_from(origin, value * seconds).ok_or_else(|| {
                AltimetryError::from(format!(
                    "Cannot decode time value {} with units '{}'",
                    value, units
                ))
            })
        })
        .collect()
}

/// Logger keeping every record in memory, so that tests can check what was logged
#[cfg(test)]
pub(crate) mod test_logger {
    use std::sync::{Mutex, Once};

    use log::{Level, LevelFilter, Log, Metadata, Record};

    static RECORDS: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());
    static INIT: Once = Once::new();
    static LOGGER: CaptureLogger = CaptureLogger;

    struct CaptureLogger;

    impl Log for CaptureLogger {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            if let Ok(mut records) = RECORDS.lock() {
                records.push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    /// Installs the logger once for the whole test binary
    pub fn init() {
        INIT.call_once(|| {
            log::set_logger(&LOGGER).expect("no other logger in tests");
            log::set_max_level(LevelFilter::Trace);
        });
    }

    /// Whether a record of `level` containing `text` was logged
    pub fn logged(level: Level, text: &str) -> bool {
        RECORDS
            .lock()
            .map(|records| {
                records
                    .iter()
                    .any(|(l, message)| *l == level && message.contains(text))
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid date")
    }

    #[test]
    fn days_since_epoch_matches_aviso_day_counts() {
        assert_abs_diff_eq!(days_since_epoch(&date(1950, 1, 1)), 0.0);
        assert_abs_diff_eq!(days_since_epoch(&date(2014, 1, 1)), 23376.0);
        assert_abs_diff_eq!(days_since_epoch(&date(2014, 5, 25)), 23520.0);
    }

    #[test]
    fn datetime_from_days_inverts_days_since_epoch() {
        let time = datetime_from_days(23376.5).expect("should decode");
        assert_eq!(time, date(2014, 1, 1) + Duration::hours(12));
        assert!(datetime_from_days(f64::NAN).is_none());
    }

    #[test]
    fn decode_days_since_epoch() {
        let times = decode_time_units(&[23427.0], "days since 1950-01-01 00:00:00")
            .expect("should decode");
        assert_eq!(times, vec![date(2014, 2, 21)]);
    }

    #[test]
    fn decode_hours_with_iso_origin() {
        let times = decode_time_units(&[0.0, 36.0], "hours since 2014-01-01T00:00:00Z")
            .expect("should decode");
        assert_eq!(times[0], date(2014, 1, 1));
        assert_eq!(times[1], date(2014, 1, 2) + Duration::hours(12));
    }

    #[test]
    fn decode_date_only_origin() {
        let times = decode_time_units(&[1.0], "days since 1950-1-1").expect("should decode");
        assert_eq!(times, vec![date(1950, 1, 2)]);
    }

    #[test]
    fn unknown_units_are_rejected() {
        assert!(parse_time_units("fortnights since 1950-01-01").is_err());
        assert!(parse_time_units("days").is_err());
        assert!(parse_time_units("days since yesterday").is_err());
    }
}
