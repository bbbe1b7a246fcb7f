//! Slot Iterator
//!
//! Sequential iteration over all slots of a slot file.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};

use crate::error::Result;
use crate::record::codec::SLOT_SIZE;
use crate::record::Slot;
use crate::StoreError;

/// Iterator over raw slots in file order, tombstones included
pub struct SlotIterator<'a> {
    reader: BufReader<&'a mut File>,
    /// Stop after this many slots
    end_index: u64,
    /// Index of the next slot to read
    current_index: u64,
}

impl<'a> SlotIterator<'a> {
    pub(super) fn new(file: &'a mut File, end_index: u64) -> Result<Self> {
        file.seek(SeekFrom::Start(0))?;
        Ok(Self {
            reader: BufReader::new(file),
            end_index,
            current_index: 0,
        })
    }
}

impl<'a> Iterator for SlotIterator<'a> {
    /// (slot index, slot bytes)
    type Item = Result<(u64, Slot)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_index >= self.end_index {
            return None;
        }

        let mut slot = [0u8; SLOT_SIZE];
        if let Err(e) = self.reader.read_exact(&mut slot) {
            // Stop after the first failure
            self.current_index = self.end_index;
            return Some(Err(StoreError::Io(e)));
        }

        let index = self.current_index;
        self.current_index += 1;

        Some(Ok((index, slot)))
    }
}
