// Sample decoder - Parses inbound payloads into samples
use crate::domain::telemetry::Sample;
use serde_json::{Map, Value};
use thiserror::Error;

const TIMESTAMP_KEY: &str = "ts";

#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("payload is not valid JSON: {0}")]
    Malformed(String),
    #[error("payload is not a JSON object")]
    NotAnObject,
    #[error("missing field `{0}`")]
    MissingField(String),
    #[error("field `{0}` is not numeric")]
    NonNumeric(String),
    #[error("timestamp must be a non-negative integer")]
    InvalidTimestamp,
    #[error("value field `{0}` is not finite")]
    NonFiniteValue(String),
}

/// Decodes `{ "ts": <micros>, "<value_field>": <float> }` records.
///
/// The value key is fixed at construction; extra fields are ignored.
#[derive(Debug, Clone)]
pub struct SampleDecoder {
    value_field: String,
}

impl SampleDecoder {
    pub fn new(value_field: impl Into<String>) -> Self {
        Self {
            value_field: value_field.into(),
        }
    }

    pub fn decode(&self, payload: &[u8]) -> Result<Sample, DecodeError> {
        let record: Value =
            serde_json::from_slice(payload).map_err(|e| DecodeError::Malformed(e.to_string()))?;
        let Value::Object(fields) = record else {
            return Err(DecodeError::NotAnObject);
        };

        let ts_micros = Self::timestamp(&fields)?;
        let value = Self::number(&fields, &self.value_field)?;
        if !value.is_finite() {
            return Err(DecodeError::NonFiniteValue(self.value_field.clone()));
        }

        Ok(Sample::new(ts_micros, value))
    }

    fn timestamp(fields: &Map<String, Value>) -> Result<u64, DecodeError> {
        let raw = fields
            .get(TIMESTAMP_KEY)
            .ok_or_else(|| DecodeError::MissingField(TIMESTAMP_KEY.to_string()))?;
        let Value::Number(number) = raw else {
            return Err(DecodeError::NonNumeric(TIMESTAMP_KEY.to_string()));
        };

        if let Some(ts) = number.as_u64() {
            return Ok(ts);
        }
        // Accept integral floats such as 1.7e15; reject fractions and negatives.
        match number.as_f64() {
            Some(ts) if ts.is_finite() && ts >= 0.0 && ts.fract() == 0.0 && ts < u64::MAX as f64 => {
                Ok(ts as u64)
            }
            _ => Err(DecodeError::InvalidTimestamp),
        }
    }

    fn number(fields: &Map<String, Value>, key: &str) -> Result<f64, DecodeError> {
        let raw = fields
            .get(key)
            .ok_or_else(|| DecodeError::MissingField(key.to_string()))?;
        raw.as_f64()
            .ok_or_else(|| DecodeError::NonNumeric(key.to_string()))
    }
}
