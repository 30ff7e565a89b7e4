//! Inclusive calendar date ranges for historical queries.

use time::format_description::well_known::Rfc3339;
use time::macros::{format_description, time};
use time::{Date, OffsetDateTime};

use crate::error::WavefleetError;

/// An inclusive range of calendar dates, either end optional.
///
/// A `DateRange` always satisfies `start <= end` when both are set, so
/// an invalid range is rejected before any request is built.
///
/// # Example
///
/// ```rust
/// use wavefleet_api_client::types::DateRange;
///
/// let range = DateRange::new("2023-05-02", "2023-05-10").unwrap();
/// assert!(DateRange::new("2023-05-10", "2023-05-02").is_err());
/// # let _ = range;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    start: Option<Date>,
    end: Option<Date>,
}

impl DateRange {
    /// Parse a range from two `YYYY-MM-DD` dates.
    pub fn new(start: &str, end: &str) -> Result<Self, WavefleetError> {
        Self::parse(Some(start), Some(end))
    }

    /// Parse a range where either end may be open.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, WavefleetError> {
        let start = start.map(parse_date).transpose()?;
        let end = end.map(parse_date).transpose()?;
        Self::from_dates(start, end)
    }

    /// Build a range from already parsed dates.
    pub fn from_dates(start: Option<Date>, end: Option<Date>) -> Result<Self, WavefleetError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(WavefleetError::validation(format!(
                    "start date {start} is after end date {end}"
                )));
            }
        }
        Ok(Self { start, end })
    }

    /// A range with no bounds; the API applies its own defaults.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// First date of the range.
    pub fn start(&self) -> Option<Date> {
        self.start
    }

    /// Last date of the range (inclusive).
    pub fn end(&self) -> Option<Date> {
        self.end
    }

    /// Instant the range starts at: midnight UTC of the start date.
    pub fn start_instant(&self) -> Option<OffsetDateTime> {
        self.start.map(|d| d.midnight().assume_utc())
    }

    /// Instant the range stops at: midnight UTC after the end date.
    pub fn end_instant(&self) -> Option<OffsetDateTime> {
        self.end.map(|d| match d.next_day() {
            Some(next) => next.midnight().assume_utc(),
            None => d.with_time(time!(23:59:59.999)).assume_utc(),
        })
    }
}

/// Format an instant the way the API expects query timestamps.
pub(crate) fn format_instant(instant: OffsetDateTime) -> Result<String, WavefleetError> {
    instant
        .format(&Rfc3339)
        .map_err(|e| WavefleetError::validation(format!("cannot format {instant}: {e}")))
}

fn parse_date(value: &str) -> Result<Date, WavefleetError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(value.trim(), &format).map_err(|e| {
        WavefleetError::validation(format!("invalid date {value:?}, expected YYYY-MM-DD: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::*;

    #[test]
    fn test_parse_valid_range() {
        let range = DateRange::new("2023-05-02", "2023-05-10").unwrap();
        assert_eq!(range.start(), Some(date!(2023 - 05 - 02)));
        assert_eq!(range.end(), Some(date!(2023 - 05 - 10)));
    }

    #[test]
    fn test_single_day_range() {
        assert!(DateRange::new("2022-08-01", "2022-08-01").is_ok());
    }

    #[test]
    fn test_reversed_range_rejected() {
        let err = DateRange::new("2023-05-10", "2023-05-02").unwrap_err();
        assert!(matches!(err, WavefleetError::Validation(_)));
    }

    #[test]
    fn test_malformed_date_rejected() {
        let err = DateRange::parse(Some("05/02/2023"), None).unwrap_err();
        assert!(matches!(err, WavefleetError::Validation(_)));
    }

    #[test]
    fn test_open_ended_range() {
        let range = DateRange::parse(Some("2023-05-02"), None).unwrap();
        assert!(range.end_instant().is_none());
        assert!(DateRange::unbounded().start_instant().is_none());
    }

    #[test]
    fn test_instants_cover_whole_end_day() {
        let range = DateRange::new("2023-05-02", "2023-05-10").unwrap();
        assert_eq!(range.start_instant(), Some(datetime!(2023-05-02 0:00 UTC)));
        assert_eq!(range.end_instant(), Some(datetime!(2023-05-11 0:00 UTC)));
        assert_eq!(
            format_instant(range.start_instant().unwrap()).unwrap(),
            "2023-05-02T00:00:00Z"
        );
    }
}
