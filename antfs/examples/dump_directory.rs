// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use antfs::directory::*;

use std::env;
use std::fs;

fn main() -> std::io::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() != 1 {
        panic!("Expected single arguement, path to a downloaded directory file")
    }
    let buf = fs::read(&args[0])?;
    let directory = Directory::decode(&buf).expect("Failed to decode directory");
    print!("{}", directory);

    let selected: Vec<u16> = directory
        .selected_entries()
        .map(|entry| entry.file_index)
        .collect();
    if !selected.is_empty() {
        println!("Selected for download: {:?}", selected);
    }
    Ok(())
}
