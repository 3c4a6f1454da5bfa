// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::fields::{AntFsTime, TimeFormat};
use derive_new::new;
use packed_struct::prelude::*;

pub const DIRECTORY_HEADER_SIZE: usize = 16;
pub const DIRECTORY_ENTRY_SIZE: usize = 16;

/// Version 1.0, major revision in the high nibble
pub const DEFAULT_DIRECTORY_VERSION: u8 = 0x10;

#[derive(PackedStruct, new, Copy, Clone, Debug, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "16")]
pub struct DirectoryHeader {
    #[packed_field(bytes = "0")]
    pub version: u8,
    #[new(value = "DIRECTORY_ENTRY_SIZE as u8")]
    #[packed_field(bytes = "1")]
    pub element_length: u8,
    /// Raw so that unknown formats survive a round trip, see [`DirectoryHeader::time_format`]
    #[packed_field(bytes = "2")]
    pub time_format: u8,
    #[new(default)]
    #[packed_field(bytes = "3:7")]
    pub reserved: [u8; 5],
    /// Seconds since power up
    #[packed_field(bytes = "8:11", endian = "lsb")]
    pub system_time: u32,
    #[packed_field(bytes = "12:15", endian = "lsb")]
    pub date: u32,
}

impl Default for DirectoryHeader {
    fn default() -> Self {
        DirectoryHeader::new(
            DEFAULT_DIRECTORY_VERSION,
            TimeFormat::Auto.to_primitive(),
            0,
            0,
        )
    }
}

impl DirectoryHeader {
    pub fn major_version(&self) -> u8 {
        self.version >> 4
    }

    pub fn minor_version(&self) -> u8 {
        self.version & 0x0F
    }

    pub fn time_format(&self) -> Option<TimeFormat> {
        TimeFormat::from_primitive(self.time_format)
    }

    /// The header date is always read with the Auto rule, the time format only applies to the
    /// file timestamps
    pub fn date_time(&self) -> AntFsTime {
        AntFsTime::from_raw(self.date)
    }
}
