//! Platform detection and process-relative locations

use crate::error::{CosError, CosResult};
use crate::path::{join, normalize_dir};

/// Host operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
    Other,
}

impl Platform {
    pub fn detect() -> Self {
        #[cfg(target_os = "windows")]
        return Self::Windows;

        #[cfg(target_os = "linux")]
        return Self::Linux;

        #[cfg(target_os = "macos")]
        return Self::MacOs;

        #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
        return Self::Other;
    }
}

pub fn is_windows() -> bool {
    Platform::detect() == Platform::Windows
}

pub fn is_linux() -> bool {
    Platform::detect() == Platform::Linux
}

pub fn is_mac() -> bool {
    Platform::detect() == Platform::MacOs
}

/// Current working directory in directory form.
pub fn cwd() -> CosResult<String> {
    let dir = std::env::current_dir()?;
    Ok(normalize_dir(&dir.to_string_lossy()))
}

/// `path` joined onto the current working directory.
///
/// Both parts are in normalized form, so the result has no leading `/` and
/// is not an absolute path on Unix. Use it for display and comparison, and
/// `std::path::absolute` for filesystem access.
pub fn absolute_path(path: &str) -> CosResult<String> {
    Ok(join(&cwd()?, path))
}

/// The user's home directory in directory form.
pub fn user_home() -> CosResult<String> {
    directories::BaseDirs::new()
        .map(|dirs| normalize_dir(&dirs.home_dir().to_string_lossy()))
        .ok_or_else(|| CosError::NotFound("home directory".into()))
}
