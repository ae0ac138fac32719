// Telemetry sample domain models
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One decoded sample as emitted by the source.
///
/// `ts_micros` is in the source's native unit (microseconds since the Unix epoch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub ts_micros: u64,
    pub value: f64,
}

impl Sample {
    pub fn new(ts_micros: u64, value: f64) -> Self {
        Self { ts_micros, value }
    }

    /// Convert to a plotting point. Integer division floors for unsigned input.
    pub fn to_point(&self) -> Point {
        Point::new((self.ts_micros / 1_000) as i64, self.value)
    }
}

/// Plotting-ready point handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    pub timestamp_millis: i64,
    pub value: f64,
}

impl Point {
    pub fn new(timestamp_millis: i64, value: f64) -> Self {
        Self {
            timestamp_millis,
            value,
        }
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_micros_to_millis() {
        let point = Sample::new(1_000_000, 2.5).to_point();
        assert_eq!(point, Point::new(1_000, 2.5));
    }

    #[test]
    fn test_millis_floor() {
        let point = Sample::new(1_999, -1.0).to_point();
        assert_eq!(point.timestamp_millis, 1);

        let point = Sample::new(999, 0.0).to_point();
        assert_eq!(point.timestamp_millis, 0);
    }

    #[test]
    fn test_point_datetime() {
        let point = Point::new(1_700_000_000_123, 0.0);
        let dt = point.datetime().unwrap();
        assert_eq!(dt.timestamp_millis(), 1_700_000_000_123);
    }

    #[test]
    fn test_point_serializes_camel_case() {
        let json = serde_json::to_value(Point::new(1000, 4.5)).unwrap();
        assert_eq!(json, serde_json::json!({ "timestampMillis": 1000, "value": 4.5 }));
    }
}
