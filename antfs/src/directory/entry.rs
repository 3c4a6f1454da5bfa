// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::fields::{
    format_flags, AntFsTime, FileIdentifier, GeneralFlags, SpecificFlags, FIT_FILE_DATA_TYPE,
};
use alloc::string::String;
use derive_new::new;
use packed_struct::prelude::*;

/// One 16 byte file record of the directory.
#[derive(PackedStruct, new, Copy, Clone, Debug, PartialEq)]
#[packed_struct(bit_numbering = "msb0", endian = "lsb", size_bytes = "16")]
pub struct DirectoryEntry {
    /// Index 0 is the directory itself and is never a valid key
    #[packed_field(bytes = "0:1")]
    pub file_index: u16,
    #[packed_field(bytes = "2")]
    pub file_data_type: u8,
    #[packed_field(bytes = "3")]
    pub file_sub_type: u8,
    #[packed_field(bytes = "4:5")]
    pub file_number: u16,
    #[packed_field(bytes = "6")]
    pub specific_flags: SpecificFlags,
    #[packed_field(bytes = "7")]
    pub general_flags: GeneralFlags,
    #[packed_field(bytes = "8:11")]
    pub file_size: u32,
    #[packed_field(bytes = "12:15")]
    pub time_stamp: u32,
}

impl DirectoryEntry {
    pub fn is_readable(&self) -> bool {
        self.general_flags.read
    }

    pub fn is_writable(&self) -> bool {
        self.general_flags.write
    }

    pub fn is_eraseable(&self) -> bool {
        self.general_flags.erase
    }

    pub fn is_archived(&self) -> bool {
        self.general_flags.archive
    }

    pub fn is_appendable(&self) -> bool {
        self.general_flags.append
    }

    pub fn is_encrypted(&self) -> bool {
        self.general_flags.crypto
    }

    /// Selected for download. Only meaningful for FIT files.
    pub fn is_selected(&self) -> bool {
        self.specific_flags.selected
    }

    pub fn is_fit(&self) -> bool {
        self.file_data_type == FIT_FILE_DATA_TYPE
    }

    pub fn identifier(&self) -> FileIdentifier {
        FileIdentifier::new(self.file_data_type, self.file_sub_type, self.file_number)
    }

    /// Timestamp read with the Auto rule. Use [`crate::directory::Directory::entry_time`] to
    /// honour the time format of the directory the entry belongs to.
    pub fn time(&self) -> AntFsTime {
        AntFsTime::from_raw(self.time_stamp)
    }

    pub fn flags_string(&self) -> String {
        format_flags(self.general_flags.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FitFileType, GENERAL_FLAG_ERASE, GENERAL_FLAG_READ};

    #[test]
    fn directory_entry() -> Result<(), PackingError> {
        let unpacked = DirectoryEntry::unpack(&[
            0x01, 0x00, 0x80, 0x00, 0x01, 0x00, 0x00, 0x80, 0x0A, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
        ])?;
        assert_eq!(unpacked.file_index, 1);
        assert_eq!(unpacked.file_data_type, FIT_FILE_DATA_TYPE);
        assert_eq!(unpacked.file_sub_type, 0);
        assert_eq!(unpacked.file_number, 1);
        assert_eq!(unpacked.specific_flags.selected, false);
        assert_eq!(unpacked.general_flags.read, true);
        assert_eq!(unpacked.file_size, 10);
        assert_eq!(unpacked.time(), AntFsTime::Unknown);
        assert_eq!(unpacked.is_readable(), true);
        assert_eq!(unpacked.is_writable(), false);
        Ok(())
    }

    #[test]
    fn multi_byte_fields_are_little_endian() -> Result<(), PackingError> {
        let packed = DirectoryEntry::new(
            0x1234,
            0x01,
            0x02,
            0xABCD,
            SpecificFlags::from_bits(0x01),
            GeneralFlags::from_bits(0xA0),
            0x11223344,
            0x3B9ACA00,
        )
        .pack()?;
        assert_eq!(
            packed,
            [
                0x34, 0x12, 0x01, 0x02, 0xCD, 0xAB, 0x01, 0xA0, 0x44, 0x33, 0x22, 0x11, 0x00, 0xCA,
                0x9A, 0x3B
            ]
        );
        Ok(())
    }

    #[test]
    fn all_flags_set() {
        let entry = DirectoryEntry::new(
            5,
            FIT_FILE_DATA_TYPE,
            4,
            5,
            SpecificFlags::from_bits(0x01),
            GeneralFlags::from_bits(0xFC),
            0,
            0,
        );
        assert_eq!(entry.is_readable(), true);
        assert_eq!(entry.is_writable(), true);
        assert_eq!(entry.is_eraseable(), true);
        assert_eq!(entry.is_archived(), true);
        assert_eq!(entry.is_appendable(), true);
        assert_eq!(entry.is_encrypted(), true);
        assert_eq!(entry.is_selected(), true);
        assert_eq!(entry.flags_string(), "Re|Wr|Er|Ar|Ap|Cr");
    }

    #[test]
    fn no_flags_set() {
        let entry = DirectoryEntry::new(
            5,
            0x01,
            0,
            0,
            SpecificFlags::default(),
            GeneralFlags::from_bits(0x00),
            0,
            0,
        );
        assert_eq!(entry.is_readable(), false);
        assert_eq!(entry.is_writable(), false);
        assert_eq!(entry.is_eraseable(), false);
        assert_eq!(entry.is_archived(), false);
        assert_eq!(entry.is_appendable(), false);
        assert_eq!(entry.is_encrypted(), false);
        assert_eq!(entry.is_selected(), false);
        assert_eq!(entry.flags_string(), "");
    }

    #[test]
    fn identifier() {
        let entry = DirectoryEntry::new(
            9,
            FIT_FILE_DATA_TYPE,
            FitFileType::Activity.to_primitive(),
            3,
            SpecificFlags::default(),
            GeneralFlags::from_bits(GENERAL_FLAG_READ | GENERAL_FLAG_ERASE),
            2048,
            0x3B9ACA00,
        );
        assert_eq!(entry.is_fit(), true);
        assert_eq!(
            entry.identifier(),
            FileIdentifier::Fit {
                sub_type: 4,
                file_number: 3
            }
        );
        assert_eq!(entry.time(), AntFsTime::Date(0x3B9ACA00));
    }
}
