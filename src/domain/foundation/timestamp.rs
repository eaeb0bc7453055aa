//! UTC instants stamped on sessions and reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A UTC instant. Serializes as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Minute-precision form used in report headers.
    pub fn to_report_string(&self) -> String {
        self.0.format("%Y-%m-%d %H:%M UTC").to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(rfc3339: &str) -> Timestamp {
        Timestamp::from_datetime(
            DateTime::parse_from_rfc3339(rfc3339)
                .unwrap()
                .with_timezone(&Utc),
        )
    }

    #[test]
    fn report_string_drops_seconds() {
        assert_eq!(at("2025-03-02T08:05:59Z").to_report_string(), "2025-03-02 08:05 UTC");
    }

    #[test]
    fn json_form_is_rfc3339() {
        let ts = at("2025-03-02T08:05:00Z");
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2025-03-02T08:05:00Z\"");
        assert_eq!(serde_json::from_str::<Timestamp>(&json).unwrap(), ts);
    }

    #[test]
    fn later_instants_order_after_earlier_ones() {
        assert!(at("2025-03-02T08:05:00Z") < at("2025-03-02T08:06:00Z"));
        assert!(Timestamp::now() > at("2020-01-01T00:00:00Z"));
    }
}
