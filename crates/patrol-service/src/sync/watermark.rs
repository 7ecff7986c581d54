//! Loose watermark parsing for sync requests.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use patrol_core::error::{CoreError, CoreResult};

/// ## Summary
/// Parses a client-supplied `last_date` watermark.
///
/// Accepts RFC 3339 as well as the bare `YYYY-MM-DD HH:MM:SS` and
/// `YYYY-MM-DD` forms; bare timestamps are interpreted as UTC. The result is
/// normalized to UTC before any database comparison.
///
/// ## Errors
/// Returns a parse error for anything else; the HTTP layer reports that as a
/// client error, never a server fault.
pub fn parse_watermark(input: &str) -> CoreResult<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(parsed.and_utc());
        }
    }

    if let Ok(parsed) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        // Midnight at the start of the given day.
        if let Some(midnight) = parsed.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(CoreError::ParseError(format!(
        "Unparseable last_date watermark: {input}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test_log::test]
    fn test_parses_space_separated_datetime() {
        let parsed = parse_watermark("2026-08-25 13:45:09").expect("should parse");
        assert_eq!(parsed.year(), 2026);
        assert_eq!(parsed.month(), 8);
        assert_eq!(parsed.day(), 25);
        assert_eq!(parsed.hour(), 13);
        assert_eq!(parsed.minute(), 45);
        assert_eq!(parsed.second(), 9);
    }

    #[test_log::test]
    fn test_parses_rfc3339_and_normalizes_to_utc() {
        let parsed = parse_watermark("2026-08-25T10:00:00+02:00").expect("should parse");
        assert_eq!(parsed.hour(), 8);
    }

    #[test_log::test]
    fn test_parses_bare_date_as_midnight() {
        let parsed = parse_watermark("2026-08-25").expect("should parse");
        assert_eq!(parsed.hour(), 0);
        assert_eq!(parsed.minute(), 0);
    }

    #[test_log::test]
    fn test_trims_surrounding_whitespace() {
        assert!(parse_watermark("  2026-08-25 00:00:00  ").is_ok());
    }

    #[test_log::test]
    fn test_rejects_junk() {
        for junk in ["next tuesday", "25/08/2026", "", "2026-13-99 00:00:00"] {
            assert!(parse_watermark(junk).is_err(), "accepted {junk:?}");
        }
    }
}
