//! Request bodies
//!
//! Create and edit share one body shape. Decoding is strict (unknown
//! fields are rejected) and field checks run before the engine is called.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::record::codec::STR_LEN;
use crate::record::Record;

/// Body of `POST /records` and `PUT /records/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordPayload {
    /// Accepted for symmetry with responses, never used
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(rename = "IntValue", default)]
    pub int_value: Option<i64>,

    #[serde(rename = "StrValue", default)]
    pub str_value: Option<String>,

    #[serde(rename = "BoolValue", default)]
    pub bool_value: Option<bool>,

    #[serde(rename = "TimeValue", default)]
    pub time_value: Option<DateTime<FixedOffset>>,
}

/// Body of a successful create
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateResponse {
    #[serde(rename = "ID")]
    pub id: i64,
}

impl RecordPayload {
    /// Decode a JSON body
    pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
        serde_json::from_slice(body).map_err(|e| ApiError::InvalidBody(e.to_string()))
    }

    /// Check required fields and build an unsaved record
    ///
    /// - `IntValue`: present and non-zero
    /// - `StrValue`: present, non-empty, at most 64 bytes
    /// - `TimeValue`: present
    /// - `BoolValue`: defaults to false
    pub fn into_record(self) -> Result<Record, ApiError> {
        let mut problems = Vec::new();

        let int_value = match self.int_value {
            Some(v) if v != 0 => v,
            _ => {
                problems.push("IntValue is required".to_string());
                0
            }
        };

        let str_value = match self.str_value {
            Some(s) if s.is_empty() => {
                problems.push("StrValue is required".to_string());
                s
            }
            Some(s) if s.len() > STR_LEN => {
                problems.push(format!(
                    "StrValue is {} bytes, at most {} allowed",
                    s.len(),
                    STR_LEN
                ));
                s
            }
            Some(s) => s,
            None => {
                problems.push("StrValue is required".to_string());
                String::new()
            }
        };

        let time_value = self.time_value;
        if time_value.is_none() {
            problems.push("TimeValue is required".to_string());
        }

        match time_value {
            Some(time_value) if problems.is_empty() => Ok(Record::new(
                int_value,
                str_value,
                self.bool_value.unwrap_or(false),
                time_value,
            )),
            _ => Err(ApiError::Validation(problems.join("; "))),
        }
    }
}
