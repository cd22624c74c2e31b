//! Configuration constants and validation functions for the harvester.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::error::{HarvesterError, Result};

/// Name stamped on every envelope as `backend_name`.
pub const BACKEND_NAME: &str = "Pontoon";

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Default number of entities requested per page.
pub const DEFAULT_MAX_ITEMS: usize = 100;

/// Project filter value that selects every project on the server.
pub const ALL_PROJECTS: &str = "all-projects";

/// `plural_form` value that selects the history of all plural forms.
pub const ALL_PLURAL_FORMS: i32 = -1;

/// GraphQL query listing the codes of all locales.
pub const LOCALES_QUERY: &str = "{locales{code}}";

/// Lower bound of the default time window (1970-01-01T00:00:00Z).
const DEFAULT_FROM_TIMESTAMP: i64 = 0;

/// Upper bound of the default time window (2100-01-01T00:00:00Z).
const DEFAULT_TO_TIMESTAMP: i64 = 4_102_444_800;

/// Format of each bound in the `time` search parameter.
const TIME_BOUND_FORMAT: &str = "%Y%m%d%H%M";

/// Date pattern: an ISO-8601 calendar date, optionally followed by a time.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}([T ].+)?$").expect("valid regex"));

/// Naive date-time layouts accepted after RFC 3339 fails. Read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Start of the open-ended time window used when no `from_date` is given.
pub fn default_from_date() -> DateTime<Utc> {
    DateTime::from_timestamp(DEFAULT_FROM_TIMESTAMP, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// End of the time window used for every entities search.
pub fn default_to_date() -> DateTime<Utc> {
    DateTime::from_timestamp(DEFAULT_TO_TIMESTAMP, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Format a time window bound as `YYYYMMDDHHmm`.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use pontoon_harvester::config::format_time_bound;
///
/// let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// assert_eq!(format_time_bound(&date), "202401010000");
/// ```
pub fn format_time_bound(date: &DateTime<Utc>) -> String {
    date.format(TIME_BOUND_FORMAT).to_string()
}

/// Build the `time` search parameter, `<from>-<to>`.
pub fn time_window(from: &DateTime<Utc>, to: &DateTime<Utc>) -> String {
    format!("{}-{}", format_time_bound(from), format_time_bound(to))
}

/// Validate and normalize the server base address.
///
/// Only `http` and `https` addresses with a host are accepted. Trailing
/// slashes are removed so endpoint paths can be appended directly.
///
/// # Examples
/// ```
/// use pontoon_harvester::config::validate_base_url;
///
/// assert_eq!(
///     validate_base_url("https://pontoon.example.com/").unwrap(),
///     "https://pontoon.example.com"
/// );
/// assert!(validate_base_url("pontoon.example.com").is_err());
/// ```
pub fn validate_base_url(uri: &str) -> Result<String> {
    let trimmed = uri.trim().trim_end_matches('/');
    let invalid = |reason: &str| HarvesterError::InvalidUrl {
        url: uri.to_string(),
        reason: reason.to_string(),
    };

    let parsed = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("unsupported scheme"));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host"));
    }

    Ok(trimmed.to_string())
}

/// Validate the page size.
pub fn validate_max_items(max_items: usize) -> Result<usize> {
    if max_items == 0 {
        return Err(HarvesterError::InvalidMaxItems(max_items));
    }
    Ok(max_items)
}

/// Parse a resume checkpoint.
///
/// Accepts RFC 3339 date-times, naive date-times and plain dates. Values
/// without an offset are read as UTC; dates start at midnight.
///
/// # Examples
/// ```
/// use pontoon_harvester::config::parse_from_date;
///
/// let date = parse_from_date("2020-01-01").unwrap();
/// assert_eq!(date.to_rfc3339(), "2020-01-01T00:00:00+00:00");
/// assert!(parse_from_date("01-01-2020").is_err());
/// ```
pub fn parse_from_date(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if !DATE_PATTERN.is_match(value) {
        return Err(HarvesterError::InvalidDate(value.to_string()));
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(date) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(date.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
        .ok_or_else(|| HarvesterError::InvalidDate(value.to_string()))
}

/// Entities search endpoint.
pub fn entities_url(base_url: &str) -> String {
    format!("{base_url}/get-entities/")
}

/// History lookup endpoint.
pub fn history_url(base_url: &str) -> String {
    format!("{base_url}/get-history")
}

/// GraphQL endpoint.
pub fn graphql_url(base_url: &str) -> String {
    format!("{base_url}/graphql")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_window() {
        assert_eq!(
            time_window(&default_from_date(), &default_to_date()),
            "197001010000-210001010000"
        );
    }

    #[test]
    fn test_format_time_bound_keeps_minutes() {
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 59).unwrap();
        assert_eq!(format_time_bound(&date), "202403051407");
    }

    #[test]
    fn test_validate_base_url_valid() {
        assert_eq!(
            validate_base_url("https://pontoon.example.com").unwrap(),
            "https://pontoon.example.com"
        );
        assert_eq!(
            validate_base_url("http://localhost:8000//").unwrap(),
            "http://localhost:8000"
        );
        assert_eq!(
            validate_base_url("https://example.com/pontoon/").unwrap(),
            "https://example.com/pontoon"
        );
    }

    #[test]
    fn test_validate_base_url_invalid() {
        assert!(validate_base_url("").is_err());
        assert!(validate_base_url("pontoon.example.com").is_err());
        assert!(validate_base_url("ftp://pontoon.example.com").is_err());
        assert!(validate_base_url("mailto:l10n@example.com").is_err());
    }

    #[test]
    fn test_validate_max_items() {
        assert_eq!(validate_max_items(5).unwrap(), 5);
        assert!(matches!(
            validate_max_items(0),
            Err(HarvesterError::InvalidMaxItems(0))
        ));
    }

    #[test]
    fn test_parse_from_date_plain_date() {
        let date = parse_from_date("2024-01-01").unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_from_date_with_offset() {
        let date = parse_from_date("2024-01-01T12:30:00+02:00").unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2024, 1, 1, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_from_date_naive_datetime() {
        let date = parse_from_date("2024-01-01 08:15:00").unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2024, 1, 1, 8, 15, 0).unwrap());

        let date = parse_from_date("2024-01-01T08:15").unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2024, 1, 1, 8, 15, 0).unwrap());
    }

    #[test]
    fn test_parse_from_date_invalid() {
        assert!(parse_from_date("").is_err());
        assert!(parse_from_date("2024/01/01").is_err());
        assert!(parse_from_date("2024-13-01").is_err());
        assert!(parse_from_date("2024-02-30").is_err());
        assert!(parse_from_date("2024-01-01Tnoon").is_err());
    }

    #[test]
    fn test_endpoint_urls() {
        let base = "https://pontoon.example.com";
        assert_eq!(entities_url(base), "https://pontoon.example.com/get-entities/");
        assert_eq!(history_url(base), "https://pontoon.example.com/get-history");
        assert_eq!(graphql_url(base), "https://pontoon.example.com/graphql");
    }
}
