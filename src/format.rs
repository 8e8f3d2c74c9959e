//! Primitive formatters shared by the normalizers and the renderer.

use jiff::Timestamp;

use crate::raw::RawTimestamp;

/// Display value for a record that carries no usable timestamp.
pub const UNKNOWN_DATE: &str = "unknown date";

/// Appended to text cut down by [`truncate`].
pub const TRUNCATION_MARKER: &str = " [truncated]";

const SIZE_UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

/// Parse a raw timestamp. Numbers (and numeric strings) are epoch
/// milliseconds; other strings must be RFC 3339 with an offset.
pub fn parse_timestamp(raw: &RawTimestamp) -> Option<Timestamp> {
    match raw {
        RawTimestamp::Millis(ms) => Timestamp::from_millisecond(*ms).ok(),
        RawTimestamp::Fractional(ms) if ms.is_finite() => {
            Timestamp::from_millisecond(ms.trunc() as i64).ok()
        }
        RawTimestamp::Fractional(_) => None,
        RawTimestamp::Text(s) => {
            let s = s.trim();
            s.parse::<Timestamp>().ok().or_else(|| {
                s.parse::<i64>()
                    .ok()
                    .and_then(|ms| Timestamp::from_millisecond(ms).ok())
            })
        }
    }
}

/// ISO-8601 display string plus the parsed instant. Anything missing or
/// unparseable becomes [`UNKNOWN_DATE`] with no instant.
pub fn format_timestamp(raw: Option<&RawTimestamp>) -> (String, Option<Timestamp>) {
    match raw.and_then(parse_timestamp) {
        Some(ts) => (ts.to_string(), Some(ts)),
        None => (UNKNOWN_DATE.to_string(), None),
    }
}

/// Short human date: `2024-03-01 09:30 UTC`.
pub fn display_date(ts: &Timestamp) -> String {
    ts.strftime("%Y-%m-%d %H:%M UTC").to_string()
}

/// Human-readable byte size using 1024-based units, at most two decimals.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", SIZE_UNITS[unit])
}

/// Cut `text` to `limit` chars and append [`TRUNCATION_MARKER`]. Text
/// within the limit is returned unchanged; a limit of 0 disables cutting.
pub fn truncate(text: &str, limit: usize) -> String {
    if limit == 0 {
        return text.to_string();
    }
    match text.char_indices().nth(limit) {
        None => text.to_string(),
        Some((byte_idx, _)) => format!("{}{TRUNCATION_MARKER}", &text[..byte_idx]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_millis_format_as_iso() {
        let (display, instant) = format_timestamp(Some(&RawTimestamp::Millis(1_700_000_000_000)));
        assert_eq!(display, "2023-11-14T22:13:20Z");
        assert_eq!(instant.unwrap().as_millisecond(), 1_700_000_000_000);
    }

    #[test]
    fn fractional_and_string_millis_are_accepted() {
        let (display, _) = format_timestamp(Some(&RawTimestamp::Fractional(1_700_000_000_000.7)));
        assert_eq!(display, "2023-11-14T22:13:20Z");

        let (display, _) =
            format_timestamp(Some(&RawTimestamp::Text("1700000000000".to_string())));
        assert_eq!(display, "2023-11-14T22:13:20Z");
    }

    #[test]
    fn rfc3339_strings_are_normalized_to_utc() {
        let raw = RawTimestamp::Text("2024-03-01T10:30:00+01:00".to_string());
        let (display, instant) = format_timestamp(Some(&raw));
        assert_eq!(display, "2024-03-01T09:30:00Z");
        assert_eq!(display_date(&instant.unwrap()), "2024-03-01 09:30 UTC");
    }

    #[test]
    fn missing_or_garbage_timestamps_are_unknown() {
        assert_eq!(format_timestamp(None), (UNKNOWN_DATE.to_string(), None));

        let garbage = RawTimestamp::Text("last tuesday".to_string());
        assert_eq!(format_timestamp(Some(&garbage)), (UNKNOWN_DATE.to_string(), None));

        let nan = RawTimestamp::Fractional(f64::NAN);
        assert_eq!(format_timestamp(Some(&nan)).0, UNKNOWN_DATE);

        let out_of_range = RawTimestamp::Millis(i64::MAX);
        assert_eq!(format_timestamp(Some(&out_of_range)).0, UNKNOWN_DATE);
    }

    #[test]
    fn sizes() {
        let cases = [
            (0, "0 B"),
            (1, "1 B"),
            (1023, "1023 B"),
            (1024, "1 KB"),
            (1536, "1.5 KB"),
            (1_048_576, "1 MB"),
            (5_368_709_120, "5 GB"),
            (1_234_567, "1.18 MB"),
        ];
        for (bytes, expected) in cases {
            assert_eq!(format_size(bytes), expected, "bytes = {bytes}");
        }
    }

    #[test]
    fn truncate_within_limit_is_unchanged() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exact", 5), "exact");
        assert_eq!(truncate("", 5), "");
    }

    #[test]
    fn truncate_appends_marker() {
        let text = "A".repeat(3000);
        let out = truncate(&text, 500);
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert_eq!(out.chars().count(), 500 + TRUNCATION_MARKER.chars().count());
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        let out = truncate("héllo wörld", 4);
        assert_eq!(out, "héll [truncated]");
    }

    #[test]
    fn zero_limit_disables_truncation() {
        assert_eq!(truncate("anything at all", 0), "anything at all");
    }
}
