//! DateTime display utilities.

use std::fmt;

use jiff::{Timestamp, tz::TimeZone};

/// Formats a `Timestamp` in the system time zone as `YYYY-MM-DD HH:MM:SS TZ`.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl<'a> fmt::Display for LocalDateTime<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .to_zoned(TimeZone::system())
                .strftime("%Y-%m-%d %H:%M:%S %Z")
        )
    }
}

/// A stamp read from a document: rendered in local time when it is RFC 3339,
/// verbatim otherwise.
pub struct Stamp<'a>(pub &'a str);

impl<'a> fmt::Display for Stamp<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.parse::<Timestamp>() {
            Ok(ts) => write!(f, "{}", LocalDateTime(&ts)),
            Err(_) => write!(f, "{}", self.0),
        }
    }
}
