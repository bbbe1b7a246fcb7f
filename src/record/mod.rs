//! Record Module
//!
//! The unit of storage and its fixed-width binary representation.
//!
//! ## Responsibilities
//! - Define the in-memory `Record`
//! - Encode/decode one record to/from a 98-byte slot
//! - Encode/decode the binary timestamp carried in each slot

pub mod codec;
pub mod timestamp;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize, Serializer};

pub use codec::{decode_slot, encode_slot, Slot, SLOT_SIZE};

/// Id value marking a deleted slot
pub const TOMBSTONE_ID: i64 = 0;

/// A single stored record
///
/// JSON field names follow the HTTP API (`id`, `IntValue`, `StrValue`,
/// `BoolValue`, `TimeValue`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Assigned by the engine on create; `0` in a slot means tombstone
    #[serde(rename = "id", default)]
    pub id: i64,

    #[serde(rename = "IntValue")]
    pub int_value: i64,

    /// At most 64 bytes once UTF-8 encoded
    #[serde(rename = "StrValue")]
    pub str_value: String,

    #[serde(rename = "BoolValue")]
    pub bool_value: bool,

    /// Serialized as RFC 3339; offsets with a seconds part are written in UTC
    #[serde(rename = "TimeValue", serialize_with = "serialize_time")]
    pub time_value: DateTime<FixedOffset>,
}

impl Record {
    /// Build a record that has not been stored yet (id 0)
    pub fn new(
        int_value: i64,
        str_value: impl Into<String>,
        bool_value: bool,
        time_value: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id: TOMBSTONE_ID,
            int_value,
            str_value: str_value.into(),
            bool_value,
            time_value,
        }
    }

    /// Same fields, different id
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Whether this record came from a deleted slot
    pub fn is_tombstone(&self) -> bool {
        self.id == TOMBSTONE_ID
    }
}

/// RFC 3339 only carries minute offsets, so sub-minute zones go out as UTC
fn serialize_time<S>(time: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if time.offset().local_minus_utc() % 60 == 0 {
        time.serialize(serializer)
    } else {
        time.with_timezone(&Utc).serialize(serializer)
    }
}
