//! Path string normalization
//!
//! Canonical form: forward slashes only, no leading slash, and directories
//! always end with exactly one `/`. Everything here is pure string work; no
//! function touches the filesystem.

/// Ensures that the path ends with a single `/`, replacing a trailing `\`.
///
/// An empty path has no directory and is returned unchanged.
pub fn ensure_ending_slash(path: &str) -> String {
    match path.chars().last() {
        None => String::new(),
        Some('/') | Some('\\') => format!("{}/", &path[..path.len() - 1]),
        Some(_) => format!("{}/", path),
    }
}

/// Removes leading `/` and `\` characters.
pub fn remove_starting_slash(path: &str) -> &str {
    path.trim_start_matches(['/', '\\'])
}

/// Directory form: forward slashes, no leading slash, one trailing slash.
pub fn normalize_dir(path: &str) -> String {
    let path = path.replace('\\', "/");
    ensure_ending_slash(remove_starting_slash(&path))
}

/// File form: forward slashes, no leading slash, trailing slash untouched.
pub fn normalize_path(path: &str) -> String {
    remove_starting_slash(path).replace('\\', "/")
}

/// Concatenates a directory with a file path using forward slashes.
pub fn join(dir: &str, file: &str) -> String {
    normalize_dir(dir) + &normalize_path(file)
}

/// Returns the path one directory up.
///
/// Paths with fewer than two segments cannot go higher and come back
/// normalized but otherwise unchanged.
pub fn up_a_dir(path: &str) -> String {
    let path = normalize_dir(path);
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() < 3 {
        return path;
    }
    format!("{}/", parts[..parts.len() - 2].join("/"))
}

/// Converts backslashes to forward slashes and collapses runs of separators.
pub fn unix_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut last_was_sep = false;
    for c in path.chars() {
        if c == '/' || c == '\\' {
            if !last_was_sep {
                out.push('/');
            }
            last_was_sep = true;
        } else {
            out.push(c);
            last_was_sep = false;
        }
    }
    out
}

/// Lexically resolves `.` and `..` segments and duplicate separators.
///
/// A leading `/` and a trailing `/` are preserved, `..` segments that climb
/// above a relative path are kept, and an empty result becomes `.`.
pub fn lexical_normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    if path.is_empty() {
        return ".".to_string();
    }
    let absolute = path.starts_with('/');
    let trailing = path.ends_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            seg => segments.push(seg),
        }
    }

    let mut out = segments.join("/");
    if absolute {
        out.insert(0, '/');
    }
    if out.is_empty() {
        out.push('.');
    }
    if trailing && !out.ends_with('/') {
        out.push('/');
    }
    out
}

/// Splits a path into its parent directory and final component.
///
/// Trailing separators are ignored. A bare name has the parent `.`, a name
/// directly under the filesystem root has the parent `/`.
fn split_parent(path: &str) -> (String, String) {
    let path = path.replace('\\', "/");
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        let parent = if path.starts_with('/') { "/" } else { "." };
        return (parent.to_string(), String::new());
    }
    match trimmed.rfind('/') {
        None => (".".to_string(), trimmed.to_string()),
        Some(idx) => {
            let parent = trimmed[..idx].trim_end_matches('/');
            let parent = if parent.is_empty() { "/" } else { parent };
            (parent.to_string(), trimmed[idx + 1..].to_string())
        }
    }
}

/// Final component of a path.
pub fn basename(path: &str) -> String {
    split_parent(path).1
}

/// Extension of the final component, including the leading `.`.
///
/// Dotfiles such as `.profile` have no extension.
pub fn extname(path: &str) -> String {
    let base = basename(path);
    match base.rfind('.') {
        Some(idx) if idx > 0 => base[idx..].to_string(),
        _ => String::new(),
    }
}

/// Normalized directory of a path, with a trailing `/`.
pub fn dirname(path: &str) -> String {
    normalize_dir(&split_parent(path).0)
}

/// Lowercases an extension, trims whitespace and drops the leading `.`.
pub fn normalize_extension(extension: &str) -> String {
    let extension = extension.trim().to_lowercase();
    match extension.strip_prefix('.') {
        Some(stripped) => stripped.to_string(),
        None => extension,
    }
}

/// Extension of the file name without the `.`, or an empty string.
pub fn file_extension(path: &str) -> String {
    extname(path).trim_start_matches('.').to_string()
}

/// Removes a trailing `.ext` from the path, if the final component has one.
pub fn remove_extension(path: &str) -> String {
    match path.rfind('.') {
        Some(idx) => {
            let ext = &path[idx + 1..];
            if ext.is_empty() || ext.contains(['/', '\\']) {
                path.to_string()
            } else {
                path[..idx].to_string()
            }
        }
        None => path.to_string(),
    }
}

/// Appends `.ext` unless the file already carries that extension.
pub fn ensure_extension(filename: &str, extension: &str) -> String {
    let extension = normalize_extension(extension);
    if file_extension(filename).to_lowercase() == extension {
        filename.to_string()
    } else {
        format!("{}.{}", filename, extension)
    }
}

/// Maps a shared drive root to a portable token and back.
///
/// `q:/projects/x` becomes `$root/projects/x` in universal form and
/// `Q:/projects/x` in OS form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniversalRoot {
    /// Drive prefix as it appears in OS paths, lowercase (e.g. `q:/`)
    pub drive: String,
    /// Token standing in for the drive in universal paths
    pub token: String,
    /// Prefix substituted back for the token
    pub os_root: String,
}

impl Default for UniversalRoot {
    fn default() -> Self {
        Self {
            drive: "q:/".to_string(),
            token: "$root/".to_string(),
            os_root: "Q:/".to_string(),
        }
    }
}

impl UniversalRoot {
    pub fn new(drive: impl Into<String>, token: impl Into<String>, os_root: impl Into<String>) -> Self {
        Self {
            drive: drive.into().to_lowercase(),
            token: token.into(),
            os_root: os_root.into(),
        }
    }

    /// Lowercases the path, unifies separators and swaps the drive for the token.
    pub fn to_universal(&self, path: &str) -> String {
        unix_path(&path.to_lowercase()).replacen(&self.drive, &self.token, 1)
    }

    /// Swaps the token back for the OS root.
    pub fn to_os(&self, path: &str) -> String {
        path.replacen(&self.token, &self.os_root, 1)
    }
}

/// [`UniversalRoot::to_universal`] with the default `q:/` root.
pub fn universal_path(path: &str) -> String {
    UniversalRoot::default().to_universal(path)
}

/// [`UniversalRoot::to_os`] with the default `q:/` root.
pub fn os_path(path: &str) -> String {
    UniversalRoot::default().to_os(path)
}
