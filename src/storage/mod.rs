//! Storage Module
//!
//! Slot-addressed access to the single backing file.
//!
//! ## Responsibilities
//! - Own the file handle and its length
//! - Read/write whole slots by index
//! - Read/overwrite the id field alone (tombstoning)
//! - Repair a partial trailing slot left by an interrupted append
//!
//! ## File Format
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Slot 0   bytes [0, 98)      (id 1)     │
//! ├────────────────────────────────────────┤
//! │ Slot 1   bytes [98, 196)    (id 2)     │
//! ├────────────────────────────────────────┤
//! │ ...                                    │
//! ├────────────────────────────────────────┤
//! │ Slot k   bytes [k*98, (k+1)*98)        │
//! └────────────────────────────────────────┘
//! ```
//! There is no header or footer: the file length is always a multiple of
//! the slot size, and slot `k` holds the record with id `k + 1` for its
//! whole lifetime (tombstoned slots stay in place).

mod iterator;
mod slot_file;

pub use iterator::SlotIterator;
pub use slot_file::{OpenReport, SlotFile};
