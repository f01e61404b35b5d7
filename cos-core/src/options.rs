//! Operation options

use serde::{Deserialize, Serialize};

use crate::encoding::Encoding;

/// Options for collecting files from search roots
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectOptions {
    /// Paths containing any of these substrings are dropped
    pub exclude: Vec<String>,
    /// Encoding used when contents are read during collection
    pub encoding: Encoding,
    /// Read contents eagerly (blocking collection only)
    pub get_contents: bool,
    /// A missing search root contributes nothing instead of failing
    #[serde(alias = "skipSearchPathsOK")]
    pub skip_search_paths_ok: bool,
    /// Lowercase all derived name fields
    pub lowercase_names: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            encoding: Encoding::Utf8,
            get_contents: true,
            skip_search_paths_ok: false,
            lowercase_names: false,
        }
    }
}

impl CollectOptions {
    pub fn excluding<I, S>(exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exclude: exclude.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn read_options(&self) -> ReadOptions {
        ReadOptions { encoding: self.encoding }
    }
}

/// Options for reading file contents
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    pub encoding: Encoding,
}
