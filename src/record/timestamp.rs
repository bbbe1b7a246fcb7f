//! Binary timestamp encoding
//!
//! ## Wire Format
//! ```text
//! ┌──────────┬──────────────┬────────────┬──────────────┬─────────────┐
//! │ Ver (1)  │ Secs (8, BE) │ Nanos (4)  │ OffMin (2)   │ OffSec (1)  │
//! └──────────┴──────────────┴────────────┴──────────────┴─────────────┘
//! ```
//! - Secs: seconds since 0001-01-01T00:00:00Z
//! - OffMin: zone offset in minutes east of UTC, `-1` means UTC
//! - OffSec: only present in version 2, when the offset is not whole minutes

use bytes::{Buf, BufMut};
use chrono::{DateTime, FixedOffset, Utc};

use crate::error::{Result, StoreError};

/// Offset in whole minutes
pub const VERSION_V1: u8 = 1;

/// Offset with a seconds remainder
pub const VERSION_V2: u8 = 2;

/// Encoded length for version 1
pub const V1_LEN: usize = 15;

/// Encoded length for version 2
pub const V2_LEN: usize = 16;

/// Seconds between 0001-01-01 and 1970-01-01 (proleptic Gregorian)
const UNIX_TO_INTERNAL: i64 = 62_135_596_800;

/// Minute offset reserved for UTC
const UTC_OFFSET_MIN: i16 = -1;

/// Encode a timestamp into 15 (v1) or 16 (v2) bytes
pub fn encode(time: &DateTime<FixedOffset>) -> Result<Vec<u8>> {
    let offset = time.offset().local_minus_utc();

    let (version, offset_min, offset_sec) = if offset == 0 {
        (VERSION_V1, UTC_OFFSET_MIN, 0i8)
    } else {
        let minutes = offset / 60;
        if minutes == i32::from(UTC_OFFSET_MIN)
            || minutes < i32::from(i16::MIN)
            || minutes > i32::from(i16::MAX)
        {
            return Err(StoreError::InvalidTimestamp(format!(
                "unsupported zone offset: {}s",
                offset
            )));
        }
        // |offset % 60| < 60 always fits in i8
        let seconds = (offset % 60) as i8;
        let version = if seconds != 0 { VERSION_V2 } else { VERSION_V1 };
        (version, minutes as i16, seconds)
    };

    let secs = time
        .timestamp()
        .checked_add(UNIX_TO_INTERNAL)
        .ok_or_else(|| StoreError::InvalidTimestamp(format!("instant out of range: {}", time)))?;
    let nanos = time.timestamp_subsec_nanos();
    if nanos >= 1_000_000_000 {
        return Err(StoreError::InvalidTimestamp(format!(
            "leap second cannot be encoded: {}",
            time
        )));
    }
    let nanos = nanos as i32;

    let mut buf = Vec::with_capacity(V2_LEN);
    buf.put_u8(version);
    buf.put_i64(secs);
    buf.put_i32(nanos);
    buf.put_i16(offset_min);
    if version == VERSION_V2 {
        buf.put_i8(offset_sec);
    }

    Ok(buf)
}

/// Decode a timestamp from the start of `field`
///
/// The version byte fixes the encoding length; bytes past it are padding
/// and ignored.
pub fn decode(field: &[u8]) -> Result<DateTime<FixedOffset>> {
    let version = *field
        .first()
        .ok_or_else(|| StoreError::InvalidTimestamp("empty timestamp field".to_string()))?;

    let len = match version {
        VERSION_V1 => V1_LEN,
        VERSION_V2 => V2_LEN,
        other => {
            return Err(StoreError::InvalidTimestamp(format!(
                "unsupported version byte: {}",
                other
            )))
        }
    };

    if field.len() < len {
        return Err(StoreError::InvalidTimestamp(format!(
            "expected {} bytes, got {}",
            len,
            field.len()
        )));
    }

    let mut buf = &field[1..len];
    let secs = buf.get_i64();
    let nanos = buf.get_i32();
    let offset_min = buf.get_i16();
    let offset_sec = if version == VERSION_V2 { buf.get_i8() } else { 0 };

    if !(0..1_000_000_000).contains(&nanos) {
        return Err(StoreError::InvalidTimestamp(format!(
            "nanoseconds out of range: {}",
            nanos
        )));
    }

    let offset = if offset_min == UTC_OFFSET_MIN {
        0
    } else {
        i32::from(offset_min) * 60 + i32::from(offset_sec)
    };
    let zone = FixedOffset::east_opt(offset).ok_or_else(|| {
        StoreError::InvalidTimestamp(format!("zone offset out of range: {}s", offset))
    })?;

    let unix = secs
        .checked_sub(UNIX_TO_INTERNAL)
        .ok_or_else(|| StoreError::InvalidTimestamp(format!("seconds out of range: {}", secs)))?;
    let utc = DateTime::<Utc>::from_timestamp(unix, nanos as u32)
        .ok_or_else(|| StoreError::InvalidTimestamp(format!("seconds out of range: {}", secs)))?;

    Ok(utc.with_timezone(&zone))
}
