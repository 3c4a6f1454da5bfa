// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::Directory;
use crate::fields::AntFsTime;

use alloc::string::ToString;
use core::fmt;

impl fmt::Display for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.header();
        writeln!(f, "ANT-FS Directory")?;
        writeln!(
            f,
            "Version: {}.{}",
            header.major_version(),
            header.minor_version()
        )?;
        writeln!(f, "Element Length: {}", header.element_length)?;
        match header.time_format() {
            Some(time_format) => writeln!(f, "Time Format: {}", time_format)?,
            None => writeln!(f, "Time Format: Unknown ({:#04x})", header.time_format)?,
        }
        writeln!(f, "System Time: {}", header.system_time)?;
        writeln!(f, "Date: {}", header.date_time())?;
        writeln!(f, "Entries: {}", self.entry_count())?;
        writeln!(
            f,
            "{:>5}  {:<24}  {:<17}  {:>10}  {:<3}  {}",
            "Index", "Identifier", "Flags", "Size", "Sel", "Timestamp"
        )?;

        let time_format = header.time_format().unwrap_or_default();
        for entry in self.entries() {
            // Selection is only defined for FIT files
            let selected = if entry.is_fit() && entry.is_selected() {
                "*"
            } else {
                ""
            };
            writeln!(
                f,
                "{:>5}  {:<24}  {:<17}  {:>10}  {:<3}  {}",
                entry.file_index,
                entry.identifier().to_string(),
                entry.flags_string(),
                entry.file_size,
                selected,
                AntFsTime::with_format(entry.time_stamp, time_format)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::directory::{Directory, DirectoryEntry, DirectoryError};
    use crate::fields::{GeneralFlags, SpecificFlags, FIT_FILE_DATA_TYPE};
    use alloc::string::ToString;
    use alloc::vec::Vec;

    #[test]
    fn report() -> Result<(), DirectoryError> {
        let mut directory = Directory::new();
        directory.set_system_time(3600);
        directory.add_entry(DirectoryEntry::new(
            1,
            FIT_FILE_DATA_TYPE,
            4,
            1,
            SpecificFlags::from_bits(0x01),
            GeneralFlags::from_bits(0xA0),
            10,
            0,
        ))?;
        directory.add_entry(DirectoryEntry::new(
            7,
            0x01,
            0x02,
            3,
            SpecificFlags::from_bits(0x01),
            GeneralFlags::from_bits(0x40),
            2048,
            0x3B9ACA00,
        ))?;

        let report = directory.to_string();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "ANT-FS Directory");
        assert_eq!(lines[1], "Version: 1.0");
        assert_eq!(lines[2], "Element Length: 16");
        assert_eq!(lines[3], "Time Format: Auto");
        assert_eq!(lines[4], "System Time: 3600");
        assert_eq!(lines[5], "Date: Unknown");
        assert_eq!(lines[6], "Entries: 2");
        assert_eq!(
            lines[7].split_whitespace().collect::<Vec<_>>(),
            ["Index", "Identifier", "Flags", "Size", "Sel", "Timestamp"]
        );
        assert_eq!(
            lines[8].split_whitespace().collect::<Vec<_>>(),
            ["1", "FIT", "Activity", "#1", "Re|Er", "10", "*", "Unknown"]
        );
        // Selected bit on a non FIT file is not reported
        assert_eq!(
            lines[9].split_whitespace().collect::<Vec<_>>(),
            ["7", "0x01/0x02", "#3", "Wr", "2048", "2021-09-08", "01:46:40"]
        );
        Ok(())
    }

    #[test]
    fn report_system_time_format() -> Result<(), DirectoryError> {
        let mut directory = Directory::new();
        directory.set_time_format(crate::fields::TimeFormat::System);
        directory.set_date(0x3B9ACA00);
        directory.add_entry(DirectoryEntry::new(
            2,
            FIT_FILE_DATA_TYPE,
            4,
            2,
            SpecificFlags::default(),
            GeneralFlags::from_bits(0xFF),
            64,
            0x3B9ACA00,
        ))?;

        let report = directory.to_string();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[3], "Time Format: System");
        assert_eq!(lines[5], "Date: 2021-09-08 01:46:40");
        // Reserved flag bits stay out of the flags column
        assert_eq!(
            lines[8].split_whitespace().collect::<Vec<_>>(),
            ["2", "FIT", "Activity", "#2", "Re|Wr|Er|Ar|Ap|Cr", "64", "1000000000"]
        );
        Ok(())
    }

    #[test]
    fn report_unknown_time_format() {
        let mut header = *Directory::new().header();
        header.time_format = 9;
        let report = Directory::with_header(header)
            .map(|directory| directory.to_string())
            .unwrap_or_default();
        assert!(report.contains("Time Format: Unknown (0x09)"));
        assert!(report.contains("Entries: 0"));
    }
}
