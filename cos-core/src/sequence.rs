//! Version tokens and frame sequences embedded in file names
//!
//! Versions are `v<digits>` tokens (`shot_v012.nk`). Frame sequences are
//! sibling files that differ only in a fixed-width frame number, addressed
//! with a printf-style placeholder (`render/frame.%04d.exr`).

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{CosError, CosResult};
use crate::path::{basename, extname};

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[vV]([0-9]+)").expect("version pattern is valid"))
}

fn sequence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+)[_.]([0-9]+)\.[a-z]+$").expect("sequence pattern is valid"))
}

/// Pads `s` on the left with `pad` until it is at least `length` chars long.
pub fn pad_left(s: &str, pad: &str, length: usize) -> String {
    if pad.is_empty() {
        return s.to_string();
    }
    let mut out = s.to_string();
    while out.chars().count() < length {
        out.insert_str(0, pad);
    }
    out
}

/// Value of the first `v<digits>` token, or 0 when there is none.
///
/// A token too large for `u64` saturates to `u64::MAX`.
pub fn get_version(filename: &str) -> u64 {
    version_regex()
        .captures(filename)
        .map(|caps| caps[1].parse().unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Replaces every version token with the first version plus one.
///
/// All tokens get the same new number, padded to three digits, so a
/// versioned directory and file name stay in step.
pub fn increment_version(filename: &str) -> String {
    let version = get_version(filename).saturating_add(1);
    let token = format!("v{}", pad_left(&version.to_string(), "0", 3));
    version_regex().replace_all(filename, NoExpand(&token)).into_owned()
}

/// Extent of a frame sequence on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    pub min: u64,
    pub max: u64,
    /// Basename of the pattern, placeholder included
    pub base: String,
    /// Extension of the pattern, with leading `.`
    pub ext: String,
}

/// Scans the pattern's directory for the lowest and highest frame present.
///
/// Only siblings starting with the text before the placeholder are
/// considered, and only when the characters at the placeholder position are
/// all digits for the full padding width.
pub fn get_frame_range(pattern: &str) -> CosResult<FrameRange> {
    let base = basename(pattern);
    let ext = extname(pattern);

    let percent = base
        .find('%')
        .ok_or_else(|| CosError::FramePaddingNotFound(pattern.to_string()))?;
    let padding: usize = base[percent + 1..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .ok()
        .filter(|p| *p > 0)
        .ok_or_else(|| CosError::InvalidFramePattern(pattern.to_string()))?;
    let prefix = &base[..percent];

    let fs_pattern = pattern.replace('\\', "/");
    let dir = match Path::new(&fs_pattern).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };

    let mut range: Option<(u64, u64)> = None;
    let entries = std::fs::read_dir(&dir).map_err(|e| CosError::read(dir.display().to_string(), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| CosError::read(dir.display().to_string(), e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.starts_with(prefix) {
            continue;
        }
        let Some(digits) = name.get(percent..percent + padding) else { continue };
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let Ok(frame) = digits.parse::<u64>() else { continue };
        range = Some(match range {
            Some((min, max)) => (min.min(frame), max.max(frame)),
            None => (frame, frame),
        });
    }

    let (min, max) = range.ok_or_else(|| CosError::NoFrames(pattern.to_string()))?;
    Ok(FrameRange { min, max, base, ext })
}

/// Name part of `<name>[_.]<frame>.<ext>`.
pub fn sequence_name(filename: &str) -> CosResult<String> {
    sequence_regex()
        .captures(filename)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| CosError::InvalidFramePattern(filename.to_string()))
}

/// Frame digits of `<name>[_.]<frame>.<ext>`, zero padding kept.
pub fn frame_number(filename: &str) -> CosResult<String> {
    sequence_regex()
        .captures(filename)
        .map(|caps| caps[2].to_string())
        .ok_or_else(|| CosError::InvalidFramePattern(filename.to_string()))
}
