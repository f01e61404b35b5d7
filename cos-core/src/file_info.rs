//! Derived file metadata

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::path::{
    basename, dirname, extname, lexical_normalize, normalize_dir, normalize_path, remove_starting_slash,
};

/// Options for [`FileInfo::new`]
#[derive(Debug, Clone, Default)]
pub struct FileInfoOptions {
    /// Search root the file was found under
    pub root: Option<String>,
    /// Lowercase every derived string field
    pub lowercase_names: bool,
}

impl FileInfoOptions {
    pub fn with_root(root: impl Into<String>) -> Self {
        Self { root: Some(root.into()), ..Default::default() }
    }
}

/// Name parts and paths of a single file, optionally with its contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    /// File name with extension
    pub basename: String,
    /// Extension including the leading `.`, or empty
    pub extension: String,
    /// File name without extension
    pub name: String,
    /// Normalized directory, with trailing `/`
    pub dirname: String,
    /// Normalized full path
    pub path: String,
    /// Location used for filesystem access
    pub absolute_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_dirname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
}

impl FileInfo {
    /// Derives the record for `file`. Never touches the filesystem.
    ///
    /// Relative fields are computed by removing the first occurrence of the
    /// normalized root from `dirname` and `path`. This is plain substring
    /// removal: a root that only prefixes a sibling directory's name (`src`
    /// against `src-old/`) still gets cut out.
    pub fn new(file: &str, options: &FileInfoOptions) -> Self {
        let extension = extname(file);
        let basename = basename(file);
        let name = basename[..basename.len() - extension.len()].to_string();

        let mut info = Self {
            dirname: dirname(file),
            path: normalize_path(&lexical_normalize(file)),
            absolute_path: absolute(file),
            basename,
            extension,
            name,
            root: None,
            relative_dirname: None,
            relative_path: None,
            contents: None,
        };

        // An empty root derives nothing; "" would otherwise normalize to "."
        let root = options.root.as_deref().filter(|r| !remove_starting_slash(r).is_empty());
        if let Some(root) = root {
            let root = normalize_path(&lexical_normalize(root));
            info.relative_dirname = Some(normalize_dir(&info.dirname.replacen(&root, "", 1)));
            info.relative_path = Some(normalize_path(&info.path.replacen(&root, "", 1)));
            info.root = Some(root);
        }

        if options.lowercase_names {
            info.lowercase();
        }

        info
    }

    /// Attaches contents, replacing any previous payload.
    pub fn with_contents(mut self, contents: impl Into<String>) -> Self {
        self.contents = Some(contents.into());
        self
    }

    fn lowercase(&mut self) {
        for field in [
            &mut self.basename,
            &mut self.extension,
            &mut self.name,
            &mut self.dirname,
            &mut self.path,
        ] {
            *field = field.to_lowercase();
        }
        for field in [&mut self.root, &mut self.relative_dirname, &mut self.relative_path]
            .into_iter()
            .flatten()
        {
            *field = field.to_lowercase();
        }
    }
}

fn absolute(file: &str) -> PathBuf {
    std::path::absolute(file).unwrap_or_else(|_| PathBuf::from(file))
}

/// Shorthand for [`FileInfo::new`].
pub fn get_file_info(file: &str, options: &FileInfoOptions) -> FileInfo {
    FileInfo::new(file, options)
}
