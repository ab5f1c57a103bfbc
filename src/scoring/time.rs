use std::fmt;
use thiserror::Error;

/// A malformed elapsed-time string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("invalid time '{0}': expected HH:MM:SS")]
    Format(String),

    #[error("invalid time '{input}': {field} must be between 0 and 59")]
    OutOfRange { field: &'static str, input: String },
}

/// One participant's time as it appears in a race record.
///
/// Decided per entry, so a single race may mix textual and numeric times.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTime {
    /// "HH:MM:SS" text, parsed on demand
    Text(String),
    /// Pre-computed seconds
    Numeric(f64),
    /// Attempted but no time recorded ("")
    Empty,
    /// null in the record
    Absent,
}

impl RawTime {
    /// Build from text, mapping "" to `Empty`.
    pub fn from_text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            RawTime::Empty
        } else {
            RawTime::Text(s)
        }
    }

    /// True for entries that carry no time at all.
    pub fn is_missing(&self) -> bool {
        matches!(self, RawTime::Empty | RawTime::Absent)
    }

    /// Elapsed seconds, or `None` when the entry carries no time.
    ///
    /// Numeric values pass through unchanged; text is parsed strictly and a
    /// malformed string is an error rather than a missing value.
    pub fn seconds(&self) -> Result<Option<f64>, TimeParseError> {
        match self {
            RawTime::Text(s) => parse_time(s).map(Some),
            RawTime::Numeric(n) => Ok(Some(*n)),
            RawTime::Empty | RawTime::Absent => Ok(None),
        }
    }
}

impl fmt::Display for RawTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawTime::Text(s) => write!(f, "{}", s),
            RawTime::Numeric(n) => write!(f, "{}", format_time(*n)),
            RawTime::Empty | RawTime::Absent => Ok(()),
        }
    }
}

/// Parse "HH:MM:SS" into total seconds.
///
/// Hours are unbounded; minutes and seconds must be 0-59. Each field must be
/// one or more ASCII digits with nothing around them.
pub fn parse_time(s: &str) -> Result<f64, TimeParseError> {
    let fields: Vec<&str> = s.split(':').collect();
    if fields.len() != 3 {
        return Err(TimeParseError::Format(s.to_string()));
    }

    let mut values = [0u64; 3];
    for (value, field) in values.iter_mut().zip(&fields) {
        if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TimeParseError::Format(s.to_string()));
        }
        *value = field
            .parse()
            .map_err(|_| TimeParseError::Format(s.to_string()))?;
    }

    let [hours, minutes, seconds] = values;
    if minutes > 59 {
        return Err(TimeParseError::OutOfRange {
            field: "minutes",
            input: s.to_string(),
        });
    }
    if seconds > 59 {
        return Err(TimeParseError::OutOfRange {
            field: "seconds",
            input: s.to_string(),
        });
    }

    Ok(hours as f64 * 3600.0 + (minutes * 60 + seconds) as f64)
}

/// Format seconds as "HH:MM:SS", rounding to whole seconds.
///
/// Hours grow past 99 instead of wrapping. Negative values get a leading '-',
/// non-finite values are shown as "--:--:--".
pub fn format_time(seconds: f64) -> String {
    let duration = seconds
        .is_finite()
        .then(|| chrono::Duration::try_seconds(seconds.round().abs() as i64))
        .flatten();
    let Some(duration) = duration else {
        return "--:--:--".to_string();
    };

    let sign = if seconds.round() < 0.0 { "-" } else { "" };
    let hours = duration.num_hours();
    let minutes = duration.num_minutes() % 60;
    let secs = duration.num_seconds() % 60;

    format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_basic() {
        assert_eq!(parse_time("01:02:03").unwrap(), 3723.0);
    }

    #[test]
    fn test_parse_time_zero() {
        assert_eq!(parse_time("00:00:00").unwrap(), 0.0);
    }

    #[test]
    fn test_parse_time_unbounded_hours() {
        assert_eq!(parse_time("100:00:01").unwrap(), 360_001.0);
    }

    #[test]
    fn test_parse_time_single_digit_fields() {
        assert_eq!(parse_time("1:2:3").unwrap(), 3723.0);
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        assert_eq!(
            parse_time("abc"),
            Err(TimeParseError::Format("abc".to_string()))
        );
    }

    #[test]
    fn test_parse_time_rejects_two_fields() {
        assert!(matches!(parse_time("1:2"), Err(TimeParseError::Format(_))));
    }

    #[test]
    fn test_parse_time_rejects_empty_field() {
        assert!(parse_time("01::03").is_err());
        assert!(parse_time("::").is_err());
    }

    #[test]
    fn test_parse_time_rejects_signs_and_whitespace() {
        assert!(parse_time("-1:00:00").is_err());
        assert!(parse_time(" 01:00:00").is_err());
        assert!(parse_time("01:00:00.5").is_err());
    }

    #[test]
    fn test_parse_time_rejects_out_of_range() {
        assert!(matches!(
            parse_time("00:60:00"),
            Err(TimeParseError::OutOfRange { field: "minutes", .. })
        ));
        assert!(matches!(
            parse_time("00:00:75"),
            Err(TimeParseError::OutOfRange { field: "seconds", .. })
        ));
    }

    #[test]
    fn test_raw_time_from_text_empty() {
        assert_eq!(RawTime::from_text(""), RawTime::Empty);
        assert_eq!(
            RawTime::from_text("00:10:00"),
            RawTime::Text("00:10:00".to_string())
        );
    }

    #[test]
    fn test_raw_time_seconds() {
        assert_eq!(RawTime::from_text("00:10:00").seconds(), Ok(Some(600.0)));
        assert_eq!(RawTime::Numeric(612.5).seconds(), Ok(Some(612.5)));
        assert_eq!(RawTime::Empty.seconds(), Ok(None));
        assert_eq!(RawTime::Absent.seconds(), Ok(None));
        assert!(RawTime::from_text("soon").seconds().is_err());
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(3723.0), "01:02:03");
        assert_eq!(format_time(0.0), "00:00:00");
        assert_eq!(format_time(59.6), "00:01:00");
        assert_eq!(format_time(360_001.0), "100:00:01");
    }

    #[test]
    fn test_format_time_negative_and_non_finite() {
        assert_eq!(format_time(-90.0), "-00:01:30");
        assert_eq!(format_time(f64::INFINITY), "--:--:--");
        assert_eq!(format_time(f64::NAN), "--:--:--");
    }

    #[test]
    fn test_format_time_beyond_duration_range() {
        assert_eq!(format_time(9_223_372_036_854_776.0), "--:--:--");
        assert_eq!(format_time(-9_223_372_036_854_776.0), "--:--:--");
        assert_eq!(format_time(1e300), "--:--:--");
        assert_eq!(
            RawTime::Numeric(9_223_372_036_854_776.0).to_string(),
            "--:--:--"
        );
    }

    #[test]
    fn test_raw_time_display() {
        assert_eq!(RawTime::from_text("00:10:00").to_string(), "00:10:00");
        assert_eq!(RawTime::Numeric(600.0).to_string(), "00:10:00");
        assert_eq!(RawTime::Empty.to_string(), "");
    }
}
