//! Record codec
//!
//! Conversion between a `Record` and its fixed 98-byte slot.
//!
//! ## Slot Format
//! ```text
//! ┌─────────┬──────────┬───────────┬─────────┬───────────┬─────────┐
//! │ Id (8)  │ Int (8)  │ Str (64)  │ Bool(1) │ Time (16) │ '\n'(1) │
//! └─────────┴──────────┴───────────┴─────────┴───────────┴─────────┘
//! ```
//! - Id, Int: little-endian i64; id `0` marks a tombstone
//! - Str: raw UTF-8, zero-padded on the right
//! - Bool: `0x00` / `0x01`
//! - Time: see [`super::timestamp`], zero-padded on the right
//! - Separator: written for readability, never read back

use bytes::{Buf, BufMut};

use super::{timestamp, Record};
use crate::error::{Result, StoreError};

/// Width of the id field
pub const ID_LEN: usize = 8;

/// Width of the integer field
pub const INT_LEN: usize = 8;

/// Capacity of the string field
pub const STR_LEN: usize = 64;

/// Width of the boolean field
pub const BOOL_LEN: usize = 1;

/// Capacity of the timestamp field
pub const TIME_LEN: usize = 16;

/// Trailing separator byte
pub const SEPARATOR: u8 = b'\n';

/// Total slot size: 8 + 8 + 64 + 1 + 16 + 1 = 98 bytes
pub const SLOT_SIZE: usize = ID_LEN + INT_LEN + STR_LEN + BOOL_LEN + TIME_LEN + 1;

/// Field offsets within a slot
pub const INT_OFFSET: usize = ID_LEN;
pub const STR_OFFSET: usize = INT_OFFSET + INT_LEN;
pub const BOOL_OFFSET: usize = STR_OFFSET + STR_LEN;
pub const TIME_OFFSET: usize = BOOL_OFFSET + BOOL_LEN;
pub const SEPARATOR_OFFSET: usize = TIME_OFFSET + TIME_LEN;

/// Raw bytes of one slot
pub type Slot = [u8; SLOT_SIZE];

/// Encode a record into a slot
///
/// Fails with `FieldOverflow` if the string does not fit in 64 bytes;
/// values are never truncated.
pub fn encode_slot(record: &Record) -> Result<Slot> {
    let str_bytes = record.str_value.as_bytes();
    if str_bytes.len() > STR_LEN {
        return Err(StoreError::FieldOverflow {
            field: "StrValue",
            len: str_bytes.len(),
            max: STR_LEN,
        });
    }

    let time_bytes = timestamp::encode(&record.time_value)?;
    if time_bytes.len() > TIME_LEN {
        return Err(StoreError::FieldOverflow {
            field: "TimeValue",
            len: time_bytes.len(),
            max: TIME_LEN,
        });
    }

    let mut slot = [0u8; SLOT_SIZE];
    let mut buf = &mut slot[..];

    buf.put_i64_le(record.id);
    buf.put_i64_le(record.int_value);

    buf.put_slice(str_bytes);
    buf.put_bytes(0, STR_LEN - str_bytes.len());

    buf.put_u8(u8::from(record.bool_value));

    buf.put_slice(&time_bytes);
    buf.put_bytes(0, TIME_LEN - time_bytes.len());

    buf.put_u8(SEPARATOR);
    debug_assert!(buf.is_empty());

    Ok(slot)
}

/// Decode a slot into a record
///
/// Tombstoned slots decode too; callers check `Record::is_tombstone`.
pub fn decode_slot(slot: &Slot) -> Result<Record> {
    let mut buf = &slot[..STR_OFFSET];
    let id = buf.get_i64_le();
    let int_value = buf.get_i64_le();

    let str_field = trim_trailing_nul(&slot[STR_OFFSET..BOOL_OFFSET]);
    let str_value = String::from_utf8(str_field.to_vec()).map_err(|e| {
        StoreError::Corruption(format!("string field of slot with id {} is not UTF-8: {}", id, e))
    })?;

    let bool_value = slot[BOOL_OFFSET] != 0;

    // Stored times that fail to decode are corruption
    let time_value = timestamp::decode(&slot[TIME_OFFSET..SEPARATOR_OFFSET]).map_err(|e| match e {
        StoreError::InvalidTimestamp(msg) => {
            StoreError::Corruption(format!("time field of slot with id {}: {}", id, msg))
        }
        other => other,
    })?;

    Ok(Record {
        id,
        int_value,
        str_value,
        bool_value,
        time_value,
    })
}

/// Read only the id field of a slot
pub fn decode_id(bytes: &[u8; ID_LEN]) -> i64 {
    i64::from_le_bytes(*bytes)
}

/// Id field of a whole slot
pub fn slot_id(slot: &Slot) -> i64 {
    let mut id = [0u8; ID_LEN];
    id.copy_from_slice(&slot[..ID_LEN]);
    decode_id(&id)
}

/// Strip zero padding (only NUL, not whitespace)
fn trim_trailing_nul(field: &[u8]) -> &[u8] {
    let end = field.iter().rposition(|&b| b != 0).map_or(0, |pos| pos + 1);
    &field[..end]
}
