use chrono::{DateTime, NaiveDate, NaiveDateTime};

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses a submitted date into a UTC-naive timestamp.
///
/// Offset-bearing timestamps are tried first (a trailing `Z` counts as
/// `+00:00`) and converted to UTC, then naive timestamps, then a bare
/// `YYYY-MM-DD` at midnight. Returns `None` when nothing matches.
pub fn parse_date(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    parse_with_offset(input)
        .or_else(|| parse_naive(input))
        .or_else(|| parse_date_only(input))
}

fn parse_with_offset(input: &str) -> Option<NaiveDateTime> {
    let normalized = match input.strip_suffix('Z').or_else(|| input.strip_suffix('z')) {
        Some(rest) => format!("{rest}+00:00"),
        None => input.to_string(),
    };

    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(&normalized, fmt).ok())
        .map(|dt| dt.naive_utc())
}

fn parse_naive(input: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
}

fn parse_date_only(input: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
