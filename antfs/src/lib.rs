// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # ANT-FS directory support for Rust
//!
//! ## Introduction
//!
//! This crate provides a typed interface for the ANT-FS directory file, the index stored at file
//! index 0 on every ANT-FS client. A host downloads the directory to discover which files exist
//! and what it is allowed to do with them, while a client authors one to advertise its files.
//!
//! The crate only deals with the directory bytes. Fetching or uploading those bytes is the job of
//! the ANT-FS transport, so the codec can be paired with any driver stack.
//!
//! For the full definition of the directory format please see the ANT-FS technical
//! specification at [thisisant.com](https://www.thisisant.com/)
//!
//! ## Features
//!  * Parsing and serialization of the 16 byte header and 16 byte file records
//!  * Permission queries for every file, including the directory pseudo entry at index 0
//!  * Structural edits that refuse to break the directory invariants
//!  * Decoding of ANT-FS timestamps and FIT file identifiers for reporting
//!  * `no_std` with `alloc`
//!
//! ## Example
//!
//! ```
//! use antfs::directory::{Directory, DirectoryEntry};
//! use antfs::fields::{GeneralFlags, SpecificFlags, FIT_FILE_DATA_TYPE, GENERAL_FLAG_READ};
//!
//! let mut directory = Directory::new();
//! directory
//!     .add_entry(DirectoryEntry::new(
//!         1,
//!         FIT_FILE_DATA_TYPE,
//!         4,
//!         1,
//!         SpecificFlags::default(),
//!         GeneralFlags::from_bits(GENERAL_FLAG_READ),
//!         10,
//!         0,
//!     ))
//!     .unwrap();
//!
//! let bytes = directory.encode().unwrap();
//! assert_eq!(bytes.len(), 32);
//! assert_eq!(Directory::decode(&bytes).unwrap(), directory);
//! ```

#![no_std]

#[cfg(not(feature = "alloc"))]
compile_error!("the directory map needs the `alloc` feature");

// packed_struct's std derives expand to `format!` and `::std::fmt`
#[macro_use]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod directory;
pub mod fields;
