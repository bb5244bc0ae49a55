//! ISO-8601 UTC timestamp handling.
//!
//! Creation times travel on the wire as ISO-8601 (RFC 3339) strings so that
//! lexicographic sort order matches chronological order.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a timestamp as an ISO-8601 UTC string.
pub fn to_iso8601(moment: DateTime<Utc>) -> String {
    moment.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an ISO-8601 string into a UTC timestamp.
///
/// Total: malformed or empty input decodes to the Unix epoch, keeping
/// document decoding deterministic.
pub fn parse_iso8601(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|moment| moment.with_timezone(&Utc))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn round_trip_preserves_instant() {
        let moment = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).single().unwrap();
        assert_eq!(parse_iso8601(&to_iso8601(moment)), moment);
    }

    #[test]
    fn formatted_string_is_utc_marked() {
        let rendered = to_iso8601(Utc::now());
        assert!(rendered.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&rendered).is_ok());
    }

    #[test]
    fn malformed_input_decodes_to_epoch() {
        assert_eq!(parse_iso8601("not a date").timestamp(), 0);
        assert_eq!(parse_iso8601("").timestamp(), 0);
    }
}
