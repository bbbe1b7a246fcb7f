//! Error types for recordstore
//!
//! Provides a unified error type for all operations. A missing record is
//! not an error: lookups return `Option` and deletes return `bool`.

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for recordstore operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Encoding Errors
    // -------------------------------------------------------------------------
    #[error("Field {field} is {len} bytes, slot capacity is {max}")]
    FieldOverflow {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Corrupted slot: {0}")]
    Corruption(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
