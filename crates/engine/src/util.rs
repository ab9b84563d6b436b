//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API.

use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Whether two instants fall in the same calendar month (UTC).
pub(crate) fn same_calendar_month(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn calendar_month_boundaries() {
        let jan_31 = Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap();
        let jan_01 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let feb_01 = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let jan_next_year = Utc.with_ymd_and_hms(2027, 1, 15, 12, 0, 0).unwrap();

        assert!(same_calendar_month(jan_31, jan_01));
        assert!(!same_calendar_month(jan_31, feb_01));
        assert!(!same_calendar_month(jan_01, jan_next_year));
    }
}
