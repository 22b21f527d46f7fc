//! String predicates for scalar kinds, with the same acceptance rules the
//! usual `validator` helpers apply (`isInt`, `isFloat`, `isBoolean`,
//! `isISO8601`, `isEmpty`).
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

static INT_RX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-+]?(?:0|[1-9][0-9]*)$").expect("int regex"));

static FLOAT_RX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-+]?[0-9]*(?:\.[0-9]*)?(?:[eE][-+]?[0-9]+)?$").expect("float regex")
});

/// Year or year-month, which chrono will not parse on its own.
static PARTIAL_DATE_RX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?\d{4}(?:-(?:0[1-9]|1[0-2]))?$").expect("partial date regex"));

const LOCAL_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub fn is_empty(s: &str) -> bool {
    s.is_empty()
}

pub fn is_boolean(s: &str) -> bool {
    matches!(s, "true" | "false" | "1" | "0")
}

pub fn is_int(s: &str) -> bool {
    INT_RX.is_match(s)
}

pub fn is_float(s: &str) -> bool {
    if matches!(s, "" | "." | "-" | "+") {
        return false;
    }
    FLOAT_RX.is_match(s)
}

pub fn is_iso8601(s: &str) -> bool {
    PARTIAL_DATE_RX.is_match(s)
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(s).is_ok()
        || LOCAL_DATE_TIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(s, fmt).is_ok())
}
