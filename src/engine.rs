//! Engine Module
//!
//! The storage engine: CRUD over a file of fixed-size slots.
//!
//! ## Responsibilities
//! - Assign ids and map them to slot positions
//! - Create/read/update/delete records through the codec
//! - Serialize all file access behind one lock
//! - Repair a partial trailing slot on startup

use std::path::Path;

use parking_lot::Mutex;

use crate::config::{Config, SyncStrategy};
use crate::error::Result;
use crate::record::codec::{decode_id, slot_id};
use crate::record::{decode_slot, encode_slot, Record, TOMBSTONE_ID};
use crate::storage::SlotFile;

/// Narrow interface used by adapters (the HTTP layer, tests, tools)
///
/// "Not found" is part of the return value, never an error: `get` and
/// `update` return `None`, `delete` returns `false`.
pub trait RecordStore: Send + Sync {
    /// Store a new record and return its assigned id (the record's own id is ignored)
    fn create(&self, record: &Record) -> Result<i64>;

    /// Fetch a live record
    fn get(&self, id: i64) -> Result<Option<Record>>;

    /// Overwrite a live record, keeping its id
    fn update(&self, id: i64, record: &Record) -> Result<Option<i64>>;

    /// Tombstone a live record
    fn delete(&self, id: i64) -> Result<bool>;
}

/// The storage engine
///
/// ## Concurrency Model: single lock
///
/// Every operation seeks and then reads or writes, and the seek position is
/// shared state of the file handle. All operations therefore hold `file`
/// for their full duration; CRUD calls on one engine run strictly one
/// after another. Read-modify-write across calls needs outside
/// coordination.
///
/// ## Addressing
///
/// Ids are positional: id `n` lives in slot `n - 1`. Create appends, so the
/// new id is the slot count plus one, and ids are never reused because
/// tombstoned slots are never removed.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Backing file (exclusive access for every operation)
    file: Mutex<SlotFile>,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Open/create the slot file
    /// 2. Truncate any partial trailing slot
    /// 3. Ready to serve requests
    pub fn open(config: Config) -> Result<Self> {
        let (file, report) = SlotFile::open(&config.data_file)?;

        if report.truncated_bytes > 0 {
            tracing::warn!(
                "Truncated {} bytes of a partial trailing slot in {}",
                report.truncated_bytes,
                config.data_file.display()
            );
        }

        tracing::info!(
            "Opened {} with {} slots",
            config.data_file.display(),
            report.slot_count
        );

        Ok(Self {
            config,
            file: Mutex::new(file),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data file
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_file(path).build();
        Self::open(config)
    }

    /// Slot index for `id`, if the file has such a slot
    ///
    /// This is the only place ids are mapped to positions.
    fn resolve(file: &SlotFile, id: i64) -> Option<u64> {
        if id <= TOMBSTONE_ID {
            return None;
        }
        let index = (id - 1) as u64;
        (index < file.slot_count()).then_some(index)
    }

    /// Index of the slot holding live record `id`
    fn resolve_live(file: &mut SlotFile, id: i64) -> Result<Option<u64>> {
        let index = match Self::resolve(file, id) {
            Some(index) => index,
            None => return Ok(None),
        };

        let stored = decode_id(&file.read_id(index)?);
        if stored == id {
            return Ok(Some(index));
        }

        if stored != TOMBSTONE_ID {
            tracing::warn!("Slot {} holds id {} instead of {}", index, stored, id);
        }
        Ok(None)
    }

    /// Create a record
    ///
    /// Steps:
    /// 1. Acquire lock
    /// 2. Assign id = slot count + 1
    /// 3. Encode (overflow fails before the file is touched)
    /// 4. Append the slot
    pub fn create(&self, record: &Record) -> Result<i64> {
        let mut file = self.file.lock();

        let id = file.slot_count() as i64 + 1;
        let stored = Record {
            id,
            ..record.clone()
        };
        let slot = encode_slot(&stored)?;

        file.append_slot(&slot)?;
        self.sync_if_needed(&mut file)?;

        tracing::debug!("Created record {:?}", stored);
        Ok(id)
    }

    /// Get a live record by id
    ///
    /// Returns `None` for ids past the end of the file, tombstones, and
    /// slots whose stored id does not match.
    pub fn get(&self, id: i64) -> Result<Option<Record>> {
        let mut file = self.file.lock();

        let index = match Self::resolve(&file, id) {
            Some(index) => index,
            None => return Ok(None),
        };

        let slot = file.read_slot(index)?;

        // Tombstones are not decoded further
        let stored = slot_id(&slot);
        if stored != id {
            if stored != TOMBSTONE_ID {
                tracing::warn!("Slot {} holds id {} instead of {}", index, stored, id);
            }
            return Ok(None);
        }

        decode_slot(&slot).map(Some)
    }

    /// Update a live record in place
    ///
    /// The whole slot is rewritten with `id` forced, whatever `record.id`
    /// holds.
    pub fn update(&self, id: i64, record: &Record) -> Result<Option<i64>> {
        let mut file = self.file.lock();

        let index = match Self::resolve_live(&mut file, id)? {
            Some(index) => index,
            None => return Ok(None),
        };

        let stored = Record {
            id,
            ..record.clone()
        };
        let slot = encode_slot(&stored)?;

        file.write_slot(index, &slot)?;
        self.sync_if_needed(&mut file)?;

        tracing::debug!("Updated record {:?}", stored);
        Ok(Some(id))
    }

    /// Delete a live record
    ///
    /// Only the id field is zeroed; the slot keeps its position and the
    /// rest of its bytes.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let mut file = self.file.lock();

        let index = match Self::resolve_live(&mut file, id)? {
            Some(index) => index,
            None => return Ok(false),
        };

        file.write_id(index, TOMBSTONE_ID)?;
        self.sync_if_needed(&mut file)?;

        tracing::debug!("Deleted record {}", id);
        Ok(true)
    }

    /// All live records in slot order
    ///
    /// Slots whose stored id does not match their position are skipped.
    pub fn scan(&self) -> Result<Vec<Record>> {
        let mut file = self.file.lock();

        let mut records = Vec::new();
        for item in file.iter()? {
            let (index, slot) = item?;
            let stored = slot_id(&slot);
            if stored == TOMBSTONE_ID {
                continue;
            }
            // Same rule as get: slot n - 1 must hold id n
            if stored != index as i64 + 1 {
                tracing::warn!("Slot {} holds id {} instead of {}", index, stored, index + 1);
                continue;
            }
            records.push(decode_slot(&slot)?);
        }

        Ok(records)
    }

    /// Flush file contents to disk now
    pub fn sync(&self) -> Result<()> {
        self.file.lock().sync()
    }

    fn sync_if_needed(&self, file: &mut SlotFile) -> Result<()> {
        match self.config.sync_strategy {
            SyncStrategy::EveryWrite => file.sync(),
            SyncStrategy::OnClose => Ok(()),
        }
    }

    /// Close the engine gracefully
    ///
    /// Syncs to disk and releases the file handle.
    pub fn close(self) -> Result<()> {
        let mut file = self.file.into_inner();
        file.sync()?;
        tracing::info!("Closed {}", file.path().display());
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data file path
    pub fn data_file(&self) -> &Path {
        &self.config.data_file
    }

    /// Number of slots ever created (live and tombstoned)
    pub fn slot_count(&self) -> u64 {
        self.file.lock().slot_count()
    }

    /// Current file length in bytes
    pub fn file_len(&self) -> u64 {
        self.file.lock().len()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl RecordStore for Engine {
    fn create(&self, record: &Record) -> Result<i64> {
        Engine::create(self, record)
    }

    fn get(&self, id: i64) -> Result<Option<Record>> {
        Engine::get(self, id)
    }

    fn update(&self, id: i64, record: &Record) -> Result<Option<i64>> {
        Engine::update(self, id, record)
    }

    fn delete(&self, id: i64) -> Result<bool> {
        Engine::delete(self, id)
    }
}
