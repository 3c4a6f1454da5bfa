// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use alloc::string::String;
use alloc::vec::Vec;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use core::fmt;
use packed_struct::prelude::*;

/// File data type used by FIT files. Changes how the identifier fields of an entry are read.
pub const FIT_FILE_DATA_TYPE: u8 = 0x80;

pub const GENERAL_FLAG_READ: u8 = 0x80;
pub const GENERAL_FLAG_WRITE: u8 = 0x40;
pub const GENERAL_FLAG_ERASE: u8 = 0x20;
pub const GENERAL_FLAG_ARCHIVE: u8 = 0x10;
pub const GENERAL_FLAG_APPEND: u8 = 0x08;
pub const GENERAL_FLAG_CRYPTO: u8 = 0x04;
const GENERAL_FLAG_RESERVED_MASK: u8 = 0x03;

/// Only defined for FIT files
pub const SPECIFIC_FLAG_SELECTED: u8 = 0x01;

// Order matters, this is the order the abbreviations are reported in
const GENERAL_FLAG_ABBREVIATIONS: [(u8, &str); 6] = [
    (GENERAL_FLAG_READ, "Re"),
    (GENERAL_FLAG_WRITE, "Wr"),
    (GENERAL_FLAG_ERASE, "Er"),
    (GENERAL_FLAG_ARCHIVE, "Ar"),
    (GENERAL_FLAG_APPEND, "Ap"),
    (GENERAL_FLAG_CRYPTO, "Cr"),
];

/// Renders the permission bits of a general flags byte as `Re|Wr|Er|Ar|Ap|Cr`, leaving out any
/// bit that is not set. Reserved bits are ignored.
pub fn format_flags(general_flags: u8) -> String {
    GENERAL_FLAG_ABBREVIATIONS
        .iter()
        .filter(|(bit, _)| general_flags & bit != 0)
        .map(|(_, abbreviation)| *abbreviation)
        .collect::<Vec<&str>>()
        .join("|")
}

#[derive(PackedStruct, Copy, Clone, Debug, Default, PartialEq)]
#[packed_struct(bit_numbering = "lsb0", size_bytes = "1")]
pub struct GeneralFlags {
    #[packed_field(bits = "7")]
    pub read: bool,
    #[packed_field(bits = "6")]
    pub write: bool,
    #[packed_field(bits = "5")]
    pub erase: bool,
    #[packed_field(bits = "4")]
    pub archive: bool,
    #[packed_field(bits = "3")]
    pub append: bool,
    #[packed_field(bits = "2")]
    pub crypto: bool,
    /// Not defined by ANT-FS, kept so a decoded directory encodes back to the same bytes
    #[packed_field(bits = "0:1")]
    pub reserved: Integer<u8, packed_bits::Bits<2>>,
}

impl GeneralFlags {
    pub fn from_bits(bits: u8) -> Self {
        Self {
            read: bits & GENERAL_FLAG_READ != 0,
            write: bits & GENERAL_FLAG_WRITE != 0,
            erase: bits & GENERAL_FLAG_ERASE != 0,
            archive: bits & GENERAL_FLAG_ARCHIVE != 0,
            append: bits & GENERAL_FLAG_APPEND != 0,
            crypto: bits & GENERAL_FLAG_CRYPTO != 0,
            reserved: (bits & GENERAL_FLAG_RESERVED_MASK).into(),
        }
    }

    pub fn bits(&self) -> u8 {
        [
            (self.read, GENERAL_FLAG_READ),
            (self.write, GENERAL_FLAG_WRITE),
            (self.erase, GENERAL_FLAG_ERASE),
            (self.archive, GENERAL_FLAG_ARCHIVE),
            (self.append, GENERAL_FLAG_APPEND),
            (self.crypto, GENERAL_FLAG_CRYPTO),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .fold(*self.reserved & GENERAL_FLAG_RESERVED_MASK, |acc, (_, bit)| {
            acc | bit
        })
    }
}

impl From<u8> for GeneralFlags {
    fn from(bits: u8) -> Self {
        GeneralFlags::from_bits(bits)
    }
}

impl From<GeneralFlags> for u8 {
    fn from(flags: GeneralFlags) -> Self {
        flags.bits()
    }
}

/// File type specific flags. Only the selected bit is defined and only for FIT files, the rest of
/// the byte is carried as is.
#[derive(PackedStruct, Copy, Clone, Debug, Default, PartialEq)]
#[packed_struct(bit_numbering = "lsb0", size_bytes = "1")]
pub struct SpecificFlags {
    #[packed_field(bits = "0")]
    pub selected: bool,
    #[packed_field(bits = "1:7")]
    pub other: Integer<u8, packed_bits::Bits<7>>,
}

impl SpecificFlags {
    pub fn from_bits(bits: u8) -> Self {
        Self {
            selected: bits & SPECIFIC_FLAG_SELECTED != 0,
            other: (bits >> 1).into(),
        }
    }

    pub fn bits(&self) -> u8 {
        (*self.other << 1) | u8::from(self.selected)
    }
}

impl From<u8> for SpecificFlags {
    fn from(bits: u8) -> Self {
        SpecificFlags::from_bits(bits)
    }
}

impl From<SpecificFlags> for u8 {
    fn from(flags: SpecificFlags) -> Self {
        flags.bits()
    }
}

#[derive(PrimitiveEnum_u8, Clone, Copy, PartialEq, Debug)]
pub enum TimeFormat {
    /// Pick system or date per value, see [`AntFsTime::from_raw`]
    Auto = 0,
    System = 1,
    Date = 2,
}

impl Default for TimeFormat {
    fn default() -> Self {
        TimeFormat::Auto
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeFormat::Auto => "Auto",
            TimeFormat::System => "System",
            TimeFormat::Date => "Date",
        };
        f.pad(name)
    }
}

/// Raw values below this are seconds on the device counter rather than a date
pub const DATE_THRESHOLD: u32 = 0x0FFF_FFFF;

/// Dates count seconds from 1989-12-31T00:00:00
fn antfs_epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1989, 12, 31)?.and_hms_opt(0, 0, 0)
}

/// A decoded ANT-FS timestamp, shared by the directory header date and every file timestamp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AntFsTime {
    Unknown,
    /// Seconds since device power up
    System(u32),
    /// Seconds since 1989-12-31T00:00:00
    Date(u32),
}

impl AntFsTime {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => AntFsTime::Unknown,
            raw if raw < DATE_THRESHOLD => AntFsTime::System(raw),
            raw => AntFsTime::Date(raw),
        }
    }

    /// Interpret a raw value the way the directory header says to
    pub fn with_format(raw: u32, format: TimeFormat) -> Self {
        match (format, raw) {
            (_, 0) => AntFsTime::Unknown,
            (TimeFormat::Auto, raw) => AntFsTime::from_raw(raw),
            (TimeFormat::System, raw) => AntFsTime::System(raw),
            (TimeFormat::Date, raw) => AntFsTime::Date(raw),
        }
    }

    pub fn raw(&self) -> u32 {
        match *self {
            AntFsTime::Unknown => 0,
            AntFsTime::System(raw) | AntFsTime::Date(raw) => raw,
        }
    }

    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        match *self {
            AntFsTime::Date(raw) => {
                antfs_epoch()?.checked_add_signed(TimeDelta::try_seconds(i64::from(raw))?)
            }
            _ => None,
        }
    }

    /// Inverse of [`AntFsTime::to_datetime`] for authoring directories. Returns `None` for dates
    /// that would not read back as a date, i.e. before the epoch, past `u32::MAX` seconds or
    /// below [`DATE_THRESHOLD`].
    pub fn encode_datetime(datetime: NaiveDateTime) -> Option<u32> {
        let seconds = datetime
            .signed_duration_since(antfs_epoch()?)
            .num_seconds();
        u32::try_from(seconds)
            .ok()
            .filter(|raw| *raw >= DATE_THRESHOLD)
    }
}

impl fmt::Display for AntFsTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AntFsTime::Unknown => f.pad("Unknown"),
            AntFsTime::System(raw) => write!(f, "{}", raw),
            AntFsTime::Date(raw) => match self.to_datetime() {
                Some(datetime) => write!(f, "{}", datetime),
                None => write!(f, "{}", raw),
            },
        }
    }
}

// TODO fill in the rest of this enum from the FIT SDK
#[derive(PrimitiveEnum_u8, Clone, Copy, PartialEq, Debug)]
pub enum FitFileType {
    Device = 1,
    Settings = 2,
    Sport = 3,
    Activity = 4,
    Workout = 5,
    Course = 6,
    Schedules = 7,
    Weight = 9,
    Totals = 10,
    Goals = 11,
    BloodPressure = 14,
    MonitoringA = 15,
    ActivitySummary = 20,
    MonitoringDaily = 28,
    MonitoringB = 32,
    Segment = 34,
    SegmentList = 35,
}

impl fmt::Display for FitFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FitFileType::Device => "Device",
            FitFileType::Settings => "Settings",
            FitFileType::Sport => "Sport",
            FitFileType::Activity => "Activity",
            FitFileType::Workout => "Workout",
            FitFileType::Course => "Course",
            FitFileType::Schedules => "Schedules",
            FitFileType::Weight => "Weight",
            FitFileType::Totals => "Totals",
            FitFileType::Goals => "Goals",
            FitFileType::BloodPressure => "Blood Pressure",
            FitFileType::MonitoringA => "Monitoring A",
            FitFileType::ActivitySummary => "Activity Summary",
            FitFileType::MonitoringDaily => "Monitoring Daily",
            FitFileType::MonitoringB => "Monitoring B",
            FitFileType::Segment => "Segment",
            FitFileType::SegmentList => "Segment List",
        };
        f.pad(name)
    }
}

/// Logical identity of a file. Only FIT files give the sub type and number a defined meaning, so
/// uniqueness is only guaranteed for those.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FileIdentifier {
    Fit {
        sub_type: u8,
        file_number: u16,
    },
    Other {
        data_type: u8,
        sub_type: u8,
        file_number: u16,
    },
}

impl FileIdentifier {
    pub fn new(data_type: u8, sub_type: u8, file_number: u16) -> Self {
        if data_type == FIT_FILE_DATA_TYPE {
            FileIdentifier::Fit {
                sub_type,
                file_number,
            }
        } else {
            FileIdentifier::Other {
                data_type,
                sub_type,
                file_number,
            }
        }
    }

    pub fn fit_file_type(&self) -> Option<FitFileType> {
        match *self {
            FileIdentifier::Fit { sub_type, .. } => FitFileType::from_primitive(sub_type),
            FileIdentifier::Other { .. } => None,
        }
    }
}

impl fmt::Display for FileIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FileIdentifier::Fit {
                sub_type,
                file_number,
            } => match self.fit_file_type() {
                Some(file_type) => write!(f, "FIT {} #{}", file_type, file_number),
                None => write!(f, "FIT {:#04x} #{}", sub_type, file_number),
            },
            FileIdentifier::Other {
                data_type,
                sub_type,
                file_number,
            } => write!(f, "{:#04x}/{:#04x} #{}", data_type, sub_type, file_number),
        }
    }
}
