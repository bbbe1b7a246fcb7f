//! # recordstore
//!
//! A small record store backing a CRUD HTTP API:
//! - Fixed 98-byte binary slots in a single flat file
//! - Ids that encode slot positions (O(1) lookups)
//! - Soft deletes (tombstones) that never move or reuse slots
//! - One engine-wide lock serializing all file access
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      HTTP Server                             │
//! │            (axum, many concurrent requests)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  RecordStore trait
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Engine                                  │
//! │       (id → slot resolution, engine-wide Mutex)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Record    │          │  SlotFile   │
//!   │   Codec     │          │ (98B slots) │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod storage;
pub mod engine;
pub mod http;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::{Config, SyncStrategy};
pub use engine::{Engine, RecordStore};
pub use record::Record;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of recordstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
