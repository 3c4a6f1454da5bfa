// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod entry;
mod header;
mod report;

pub use entry::*;
pub use header::*;

use crate::fields::{AntFsTime, TimeFormat};

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use log::{debug, warn};
use packed_struct::prelude::{PackedStructSlice, PackingError, PrimitiveEnum};
use thiserror::Error;

/// File index reserved for the directory itself
pub const DIRECTORY_FILE_INDEX: u16 = 0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirectoryError {
    #[error("directory buffer is {0} bytes, shorter than the header")]
    InvalidFormat(usize),
    #[error("element length {0} is not supported")]
    UnsupportedEntryLength(u8),
    #[error("file index {0} cannot be used as a directory entry")]
    InvalidIndex(u16),
    #[error("file index {0} already exists")]
    AlreadyExists(u16),
    #[error("file index {0} not found")]
    NotFound(u16),
    #[error("operation not permitted on file index {0}")]
    Unauthorized(u16),
    #[error("buffer too small, need {needed} bytes but only {available} available")]
    BufferTooSmall { needed: usize, available: usize },
    #[error("packing error: {0:?}")]
    Packing(PackingError),
}

impl From<PackingError> for DirectoryError {
    fn from(err: PackingError) -> Self {
        DirectoryError::Packing(err)
    }
}

/// In memory model of an ANT-FS directory file.
///
/// Entries are keyed by file index and always serialized in ascending index order. The entry map
/// is private so every edit goes through the checked operations below. Decoding is the one
/// permissive path: a downloaded directory is kept as received, even if it lists index 0.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Directory {
    header: DirectoryHeader,
    entries: BTreeMap<u16, DirectoryEntry>,
}

impl Directory {
    /// Empty directory with the default header, for authoring
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(header: DirectoryHeader) -> Result<Self, DirectoryError> {
        check_element_length(&header)?;
        Ok(Self {
            header,
            entries: BTreeMap::new(),
        })
    }

    /// Parse a downloaded directory. All multi-byte fields are little endian on the wire
    /// regardless of the host.
    pub fn decode(buf: &[u8]) -> Result<Self, DirectoryError> {
        if buf.len() < DIRECTORY_HEADER_SIZE {
            return Err(DirectoryError::InvalidFormat(buf.len()));
        }
        let (header_bytes, records) = buf.split_at(DIRECTORY_HEADER_SIZE);
        let header = DirectoryHeader::unpack_from_slice(header_bytes)?;
        check_element_length(&header)?;

        let records = records.chunks_exact(DIRECTORY_ENTRY_SIZE);
        let trailing = records.remainder().len();
        if trailing != 0 {
            warn!("Ignoring {} trailing bytes after the last directory entry", trailing);
        }

        let mut entries = BTreeMap::new();
        for record in records {
            let entry = DirectoryEntry::unpack_from_slice(record)?;
            if entry.file_index == DIRECTORY_FILE_INDEX {
                warn!("Directory lists an entry at the reserved index 0");
            }
            // Last record wins, same as the device would index it
            if entries.insert(entry.file_index, entry).is_some() {
                warn!(
                    "Duplicate directory entry for index {}, keeping the last one",
                    entry.file_index
                );
            }
        }

        debug!(
            "Decoded directory version {:#04x} with {} entries from {} bytes",
            header.version,
            entries.len(),
            buf.len()
        );
        Ok(Self { header, entries })
    }

    /// Size in bytes of the serialized directory
    pub fn encoded_len(&self) -> usize {
        DIRECTORY_HEADER_SIZE + DIRECTORY_ENTRY_SIZE * self.entries.len()
    }

    pub fn encode(&self) -> Result<Vec<u8>, DirectoryError> {
        let mut buf = vec![0; self.encoded_len()];
        self.encode_to_slice(&mut buf)?;
        Ok(buf)
    }

    /// Serialize into `buf`, returning the number of bytes written. Nothing is written if `buf`
    /// is too small.
    pub fn encode_to_slice(&self, buf: &mut [u8]) -> Result<usize, DirectoryError> {
        let len = self.encoded_len();
        if buf.len() < len {
            return Err(DirectoryError::BufferTooSmall {
                needed: len,
                available: buf.len(),
            });
        }
        let (header_buf, records) = buf[..len].split_at_mut(DIRECTORY_HEADER_SIZE);
        self.header.pack_to_slice(header_buf)?;
        for (record, entry) in records
            .chunks_exact_mut(DIRECTORY_ENTRY_SIZE)
            .zip(self.entries.values())
        {
            entry.pack_to_slice(record)?;
        }
        debug!(
            "Encoded directory with {} entries into {} bytes",
            self.entries.len(),
            len
        );
        Ok(len)
    }

    pub fn header(&self) -> &DirectoryHeader {
        &self.header
    }

    pub fn set_version(&mut self, version: u8) {
        self.header.version = version;
    }

    pub fn set_time_format(&mut self, time_format: TimeFormat) {
        self.header.time_format = time_format.to_primitive();
    }

    pub fn set_system_time(&mut self, system_time: u32) {
        self.header.system_time = system_time;
    }

    pub fn set_date(&mut self, date: u32) {
        self.header.date = date;
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, file_index: u16) -> Option<&DirectoryEntry> {
        self.entries.get(&file_index)
    }

    pub fn contains(&self, file_index: u16) -> bool {
        self.entries.contains_key(&file_index)
    }

    /// Entries in ascending file index order
    pub fn entries(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries.values()
    }

    pub fn indexes(&self) -> impl Iterator<Item = u16> + '_ {
        self.entries.keys().copied()
    }

    pub fn entries_of_type(&self, file_data_type: u8) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries()
            .filter(move |entry| entry.file_data_type == file_data_type)
    }

    pub fn fit_files_of_type(&self, sub_type: u8) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries()
            .filter(move |entry| entry.is_fit() && entry.file_sub_type == sub_type)
    }

    pub fn find_fit_file(&self, sub_type: u8, file_number: u16) -> Option<&DirectoryEntry> {
        self.fit_files_of_type(sub_type)
            .find(|entry| entry.file_number == file_number)
    }

    /// FIT files the client has flagged for download
    pub fn selected_entries(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries()
            .filter(|entry| entry.is_fit() && entry.is_selected())
    }

    /// Lowest index that can be handed to a new file
    pub fn next_free_index(&self) -> Option<u16> {
        (1..=u16::MAX).find(|index| !self.entries.contains_key(index))
    }

    fn lookup(&self, file_index: u16) -> Result<&DirectoryEntry, DirectoryError> {
        self.entries
            .get(&file_index)
            .ok_or(DirectoryError::NotFound(file_index))
    }

    // Index 0 has no record, the directory answers for itself with `directory_value`
    fn query(
        &self,
        file_index: u16,
        directory_value: bool,
        check: fn(&DirectoryEntry) -> bool,
    ) -> Result<bool, DirectoryError> {
        if file_index == DIRECTORY_FILE_INDEX {
            return Ok(directory_value);
        }
        self.lookup(file_index).map(check)
    }

    /// The directory itself can always be downloaded
    pub fn is_readable(&self, file_index: u16) -> Result<bool, DirectoryError> {
        self.query(file_index, true, DirectoryEntry::is_readable)
    }

    pub fn is_writable(&self, file_index: u16) -> Result<bool, DirectoryError> {
        self.query(file_index, false, DirectoryEntry::is_writable)
    }

    pub fn is_eraseable(&self, file_index: u16) -> Result<bool, DirectoryError> {
        self.query(file_index, false, DirectoryEntry::is_eraseable)
    }

    pub fn is_archived(&self, file_index: u16) -> Result<bool, DirectoryError> {
        self.query(file_index, false, DirectoryEntry::is_archived)
    }

    pub fn is_encrypted(&self, file_index: u16) -> Result<bool, DirectoryError> {
        self.query(file_index, false, DirectoryEntry::is_encrypted)
    }

    pub fn is_selected(&self, file_index: u16) -> Result<bool, DirectoryError> {
        self.query(file_index, false, DirectoryEntry::is_selected)
    }

    /// Size of the file at `file_index`. For the directory this is the serialized size, which is
    /// never stored anywhere.
    pub fn get_file_size(&self, file_index: u16) -> Result<u32, DirectoryError> {
        if file_index == DIRECTORY_FILE_INDEX {
            // At most 65536 records so this always fits
            return Ok(self.encoded_len() as u32);
        }
        Ok(self.lookup(file_index)?.file_size)
    }

    /// Timestamp of a file interpreted with the header's time format. Index 0 gives the
    /// directory date.
    pub fn entry_time(&self, file_index: u16) -> Result<AntFsTime, DirectoryError> {
        if file_index == DIRECTORY_FILE_INDEX {
            return Ok(self.header.date_time());
        }
        let entry = self.lookup(file_index)?;
        Ok(AntFsTime::with_format(
            entry.time_stamp,
            self.header.time_format().unwrap_or_default(),
        ))
    }

    pub fn add_entry(&mut self, entry: DirectoryEntry) -> Result<(), DirectoryError> {
        check_entry_index(entry.file_index)?;
        if self.entries.contains_key(&entry.file_index) {
            return Err(DirectoryError::AlreadyExists(entry.file_index));
        }
        debug!("Adding directory entry {}", entry.file_index);
        self.entries.insert(entry.file_index, entry);
        Ok(())
    }

    pub fn add_or_replace_entry(&mut self, entry: DirectoryEntry) -> Result<(), DirectoryError> {
        check_entry_index(entry.file_index)?;
        if self.entries.insert(entry.file_index, entry).is_some() {
            debug!("Replaced directory entry {}", entry.file_index);
        } else {
            debug!("Adding directory entry {}", entry.file_index);
        }
        Ok(())
    }

    /// Remove a file the directory allows to be erased
    pub fn delete_entry(&mut self, file_index: u16) -> Result<(), DirectoryError> {
        if file_index == DIRECTORY_FILE_INDEX {
            return Err(DirectoryError::Unauthorized(file_index));
        }
        if !self.lookup(file_index)?.is_eraseable() {
            return Err(DirectoryError::Unauthorized(file_index));
        }
        self.entries.remove(&file_index);
        debug!("Deleted directory entry {}", file_index);
        Ok(())
    }

    /// Remove a file regardless of its erase permission
    pub fn force_delete_entry(&mut self, file_index: u16) -> Result<(), DirectoryError> {
        if file_index == DIRECTORY_FILE_INDEX {
            return Err(DirectoryError::Unauthorized(file_index));
        }
        self.entries
            .remove(&file_index)
            .ok_or(DirectoryError::NotFound(file_index))?;
        debug!("Force deleted directory entry {}", file_index);
        Ok(())
    }

    /// Flag or unflag a FIT file for download
    pub fn set_selected(&mut self, file_index: u16, selected: bool) -> Result<(), DirectoryError> {
        check_entry_index(file_index)?;
        let entry = self
            .entries
            .get_mut(&file_index)
            .ok_or(DirectoryError::NotFound(file_index))?;
        if !entry.is_fit() {
            return Err(DirectoryError::Unauthorized(file_index));
        }
        entry.specific_flags.selected = selected;
        Ok(())
    }

    /// Drop every entry, the header is left as is
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn check_element_length(header: &DirectoryHeader) -> Result<(), DirectoryError> {
    if usize::from(header.element_length) != DIRECTORY_ENTRY_SIZE {
        return Err(DirectoryError::UnsupportedEntryLength(header.element_length));
    }
    Ok(())
}

fn check_entry_index(file_index: u16) -> Result<(), DirectoryError> {
    if file_index == DIRECTORY_FILE_INDEX {
        return Err(DirectoryError::InvalidIndex(file_index));
    }
    Ok(())
}
