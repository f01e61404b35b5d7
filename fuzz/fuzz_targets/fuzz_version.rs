// SPDX-License-Identifier: AGPL-3.0-or-later
//! Fuzz target for version token parsing and bumping

#![no_main]

use cos_core::sequence::{frame_number, get_version, increment_version, sequence_name};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let version = get_version(input);
        let bumped = increment_version(input);
        if version > 0 && version < u64::MAX {
            assert_eq!(get_version(&bumped), version + 1);
        }

        let _ = sequence_name(input);
        let _ = frame_number(input);
    }
});
