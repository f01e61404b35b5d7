// SPDX-License-Identifier: AGPL-3.0-or-later
//! Fuzz target for path normalization and file info derivation

#![no_main]

use cos_core::path::{join, normalize_dir, normalize_path, unix_path, up_a_dir};
use cos_core::{FileInfo, FileInfoOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let dir = normalize_dir(input);
        assert_eq!(normalize_dir(&dir), dir);
        assert!(dir.is_empty() || dir.ends_with('/'));
        assert!(!dir.starts_with('/'));

        let path = normalize_path(input);
        assert_eq!(normalize_path(&path), path);

        let _ = unix_path(input);
        let _ = up_a_dir(input);

        // Split the input to fuzz root-relative derivation as well
        if let Some((root, file)) = input.split_once('|') {
            let _ = join(root, file);
            let info = FileInfo::new(file, &FileInfoOptions::with_root(root));
            assert!(info.basename.ends_with(&info.extension));
        }
    }
});
