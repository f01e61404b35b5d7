//! cOS Filesystem
//!
//! File collection by extension, parallel content loading, batch compilation
//! and the filesystem mutation helpers built on top of `cos-core`.

pub mod collect;
pub mod compile;
pub mod contents;
pub mod ops;

mod task;

pub use collect::{
    collect_all_files, collect_all_files_sync, collect_filenames_sync, collect_files, collect_files_sync,
    should_exclude,
};
pub use compile::compile_files;
pub use contents::{get_file_content, get_file_contents, read_file, read_file_sync};
pub use ops::DirStatus;
