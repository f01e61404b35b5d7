//! Text encodings for file contents

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CosError, CosResult};

/// How raw file bytes become a `String`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    /// Strict UTF-8, invalid bytes are an error
    #[default]
    #[serde(alias = "utf-8")]
    Utf8,
    /// UTF-8 with invalid sequences replaced by U+FFFD
    #[serde(alias = "utf-8-lossy")]
    Utf8Lossy,
    /// ISO-8859-1, every byte maps to the code point of the same value
    #[serde(alias = "binary")]
    Latin1,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf8",
            Encoding::Utf8Lossy => "utf8-lossy",
            Encoding::Latin1 => "latin1",
        }
    }

    /// Decodes `bytes` read from `path`.
    pub fn decode(&self, path: &str, bytes: Vec<u8>) -> CosResult<String> {
        match self {
            Encoding::Utf8 => String::from_utf8(bytes).map_err(|_| CosError::Decode {
                path: path.to_string(),
                encoding: self.as_str().to_string(),
            }),
            Encoding::Utf8Lossy => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Encoding::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = CosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "utf8-lossy" | "utf-8-lossy" => Ok(Encoding::Utf8Lossy),
            "latin1" | "binary" => Ok(Encoding::Latin1),
            other => Err(CosError::Other(format!("Unknown encoding: {}", other))),
        }
    }
}
