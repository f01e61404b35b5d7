//! cOS Core
//!
//! Path normalization, file info derivation and the shared types used by
//! the collection, loading and process crates.

pub mod encoding;
pub mod error;
pub mod file_info;
pub mod options;
pub mod path;
pub mod platform;
pub mod sequence;

pub use encoding::Encoding;
pub use error::{CosError, CosResult};
pub use file_info::{get_file_info, FileInfo, FileInfoOptions};
pub use options::{CollectOptions, ReadOptions};
pub use sequence::FrameRange;
