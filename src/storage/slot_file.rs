//! Slot File
//!
//! Owns the backing file and performs positioned slot I/O.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::record::codec::{ID_LEN, SLOT_SIZE};
use crate::record::Slot;

use super::SlotIterator;

/// What `SlotFile::open` found on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenReport {
    /// Whole slots present after opening
    pub slot_count: u64,

    /// Bytes of a partial trailing slot that were cut off
    pub truncated_bytes: u64,
}

/// Backing file viewed as an array of fixed-size slots
///
/// Not synchronized: the engine wraps it in its lock. The cached length is
/// only valid because this handle is the file's sole writer.
pub struct SlotFile {
    file: File,
    path: PathBuf,
    len: u64,
}

impl SlotFile {
    /// Open (creating if absent) the slot file in read/write mode
    ///
    /// A partial trailing slot is truncated so the length is a whole
    /// number of slots.
    pub fn open(path: &Path) -> Result<(Self, OpenReport)> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let raw_len = file.metadata()?.len();
        let remainder = raw_len % SLOT_SIZE as u64;
        let len = raw_len - remainder;

        if remainder != 0 {
            file.set_len(len)?;
            file.sync_all()?;
        }

        let slot_file = Self {
            file,
            path: path.to_path_buf(),
            len,
        };
        let report = OpenReport {
            slot_count: slot_file.slot_count(),
            truncated_bytes: remainder,
        };

        Ok((slot_file, report))
    }

    /// Number of slots in the file (live and tombstoned)
    pub fn slot_count(&self) -> u64 {
        self.len / SLOT_SIZE as u64
    }

    /// File length in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte offset of slot `index`
    pub fn offset_of(index: u64) -> u64 {
        index * SLOT_SIZE as u64
    }

    /// Read a whole slot
    ///
    /// The caller checks `index < slot_count()`; a short read past a
    /// truncated end surfaces as an `UnexpectedEof` I/O error.
    pub fn read_slot(&mut self, index: u64) -> Result<Slot> {
        let mut slot = [0u8; SLOT_SIZE];
        self.file.seek(SeekFrom::Start(Self::offset_of(index)))?;
        self.file.read_exact(&mut slot)?;
        Ok(slot)
    }

    /// Overwrite an existing slot in place
    pub fn write_slot(&mut self, index: u64, slot: &Slot) -> Result<()> {
        let offset = Self::offset_of(index);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(slot)?;
        self.len = self.len.max(offset + SLOT_SIZE as u64);
        Ok(())
    }

    /// Append a slot at end of file and return its index
    pub fn append_slot(&mut self, slot: &Slot) -> Result<u64> {
        let index = self.slot_count();
        self.write_slot(index, slot)?;
        Ok(index)
    }

    /// Read only the 8-byte id field of a slot
    pub fn read_id(&mut self, index: u64) -> Result<[u8; ID_LEN]> {
        let mut id = [0u8; ID_LEN];
        self.file.seek(SeekFrom::Start(Self::offset_of(index)))?;
        self.file.read_exact(&mut id)?;
        Ok(id)
    }

    /// Overwrite only the 8-byte id field of a slot
    pub fn write_id(&mut self, index: u64, id: i64) -> Result<()> {
        self.file.seek(SeekFrom::Start(Self::offset_of(index)))?;
        self.file.write_all(&id.to_le_bytes())?;
        Ok(())
    }

    /// Flush file contents to stable storage
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }

    /// Iterate over every slot from the start of the file
    pub fn iter(&mut self) -> Result<SlotIterator<'_>> {
        let end = self.slot_count();
        SlotIterator::new(&mut self.file, end)
    }
}
