//! Glob-based file collection
//!
//! Every (search root, extension) pair is one independent glob search. The
//! async collector runs them all at once on the blocking pool and
//! concatenates the results in declaration order: root-major, then
//! extension, then glob order.

use cos_core::{
    path::{ensure_ending_slash, normalize_extension},
    CollectOptions, CosError, CosResult, FileInfo, FileInfoOptions,
};
use futures::future::{try_join_all, BoxFuture, FutureExt};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::contents::read_file_sync;
use crate::task::join;

/// Whether any exclude string occurs anywhere in `path`.
///
/// Plain substring containment: excluding `"a"` also drops `"abc/x.js"`.
pub fn should_exclude<S: AsRef<str>>(excludes: &[S], path: &str) -> bool {
    excludes.iter().any(|ex| path.contains(ex.as_ref()))
}

/// Search root as used on disk: forward slashes and a trailing `/`, but the
/// leading slash of an absolute path kept.
fn search_dir(path: &str) -> String {
    let path = path.replace('\\', "/");
    if path.is_empty() {
        "./".to_string()
    } else {
        ensure_ending_slash(&path)
    }
}

/// File-name filter for an extension; empty matches everything.
fn extension_filter(extension: &str) -> String {
    match normalize_extension(extension) {
        ext if ext.is_empty() => "*".to_string(),
        ext => format!("*.{}", ext),
    }
}

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    }
}

/// Runs one glob and returns the regular files it matched.
fn glob_paths(op: &'static str, pattern: &str) -> CosResult<Vec<String>> {
    let glob_error = |message: String| CosError::Glob {
        op,
        pattern: pattern.to_string(),
        message,
    };
    let mut paths = Vec::new();
    for entry in glob::glob_with(pattern, match_options()).map_err(|e| glob_error(e.to_string()))? {
        let path = entry.map_err(|e| glob_error(e.to_string()))?;
        if path.is_file() {
            paths.push(path.to_string_lossy().replace('\\', "/"));
        }
    }
    Ok(paths)
}

fn ensure_search_dir(op: &'static str, root: &str) -> CosResult<()> {
    if Path::new(root).is_dir() {
        Ok(())
    } else {
        Err(CosError::SearchPathNotFound { op, path: root.to_string() })
    }
}

/// One (root, extension) search of the async collector.
fn search(root: &str, filter: &str, options: &CollectOptions) -> CosResult<Vec<FileInfo>> {
    ensure_search_dir("collect_files", root)?;

    debug!("Searching: {} Filter: **/{}", root, filter);
    let pattern = format!("{}**/{}", Pattern::escape(root), filter);
    let info_options = FileInfoOptions {
        root: Some(root.to_string()),
        lowercase_names: options.lowercase_names,
    };

    Ok(glob_paths("collect_files", &pattern)?
        .into_iter()
        .filter(|path| !should_exclude(&options.exclude, path))
        .map(|path| FileInfo::new(&path, &info_options))
        .collect())
}

/// Finds every file under `search_paths` with one of `extensions`.
///
/// All searches run concurrently. The first failing search fails the whole
/// collection unless `skip_search_paths_ok` is set, in which case it just
/// contributes no files. Searches still running when an error is returned
/// are left to finish on their own.
pub async fn collect_files<P, E>(
    search_paths: P,
    extensions: E,
    options: &CollectOptions,
) -> CosResult<Vec<FileInfo>>
where
    P: IntoIterator,
    P::Item: AsRef<str>,
    E: IntoIterator,
    E::Item: AsRef<str>,
{
    let filters: Vec<String> = extensions
        .into_iter()
        .map(|ext| extension_filter(ext.as_ref()))
        .collect();
    let options = Arc::new(options.clone());

    let mut searches = Vec::new();
    for path in search_paths {
        let root = search_dir(path.as_ref());
        for filter in &filters {
            let (root, filter, options) = (root.clone(), filter.clone(), Arc::clone(&options));
            searches.push(tokio::task::spawn_blocking(move || {
                match search(&root, &filter, &options) {
                    Err(err) if options.skip_search_paths_ok => {
                        warn!("Skipping search path {}: {}", root, err);
                        Ok(Vec::new())
                    }
                    result => result,
                }
            }));
        }
    }

    let results = try_join_all(searches.into_iter().map(join)).await?;
    Ok(results.into_iter().flatten().collect())
}

/// Blocking collection with eager content loading.
///
/// The root is canonicalized first. Files directly in the root come first,
/// then files below every top-level directory whose name is not exactly one
/// of the excludes; the substring exclusion is applied on top of that.
/// Contents are read with `options.encoding` when `options.get_contents`.
/// As with [`collect_files`], `skip_search_paths_ok` turns a missing root or
/// a failing search into an empty contribution.
pub fn collect_files_sync<P, E>(
    search_paths: P,
    extensions: E,
    options: &CollectOptions,
) -> CosResult<Vec<FileInfo>>
where
    P: IntoIterator,
    P::Item: AsRef<str>,
    E: IntoIterator,
    E::Item: AsRef<str>,
{
    let filters: Vec<String> = extensions
        .into_iter()
        .map(|ext| extension_filter(ext.as_ref()))
        .collect();
    let read_options = options.read_options();

    let mut files = Vec::new();
    for path in search_paths {
        let path = path.as_ref();
        let root = match std::fs::canonicalize(path) {
            Ok(real) if real.is_dir() => search_dir(&real.to_string_lossy()),
            _ if options.skip_search_paths_ok => {
                warn!("Skipping search path {}", path);
                continue;
            }
            _ => {
                return Err(CosError::SearchPathNotFound {
                    op: "collect_files_sync",
                    path: path.to_string(),
                })
            }
        };
        let info_options = FileInfoOptions {
            root: Some(root.clone()),
            lowercase_names: options.lowercase_names,
        };

        for filter in &filters {
            let matches = match search_sync(&root, filter, &options.exclude) {
                Err(err) if options.skip_search_paths_ok => {
                    warn!("Skipping search path {}: {}", root, err);
                    continue;
                }
                result => result?,
            };

            for found in matches {
                let mut info = FileInfo::new(&found, &info_options);
                if options.get_contents {
                    info.contents = Some(read_file_sync(&found, &read_options)?);
                }
                files.push(info);
            }
        }
    }
    Ok(files)
}

/// One (root, extension) search of the blocking collector: root matches,
/// then nested matches outside excluded top-level directories.
fn search_sync(root: &str, filter: &str, exclude: &[String]) -> CosResult<Vec<String>> {
    debug!("Searching: {} Filter: {}", root, filter);
    let escaped = Pattern::escape(root);
    let mut matches = glob_paths("collect_files_sync", &format!("{}{}", escaped, filter))?;
    let nested = glob_paths("collect_files_sync", &format!("{}*/**/{}", escaped, filter))?;
    matches.extend(nested.into_iter().filter(|found| {
        let top = found[root.len().min(found.len())..].split('/').next().unwrap_or("");
        !exclude.iter().any(|ex| ex == top)
    }));
    matches.retain(|found| !should_exclude(exclude, found));
    Ok(matches)
}

/// Plain glob, returning matching file paths with forward slashes.
pub fn collect_filenames_sync(pattern: &str) -> CosResult<Vec<String>> {
    glob_paths("collect_filenames_sync", pattern)
}

fn walk(dir: PathBuf) -> BoxFuture<'static, CosResult<Vec<PathBuf>>> {
    async move {
        let read_error = |path: &Path, e| CosError::read(path.display().to_string(), e);

        let mut read_dir = fs::read_dir(&dir).await.map_err(|e| read_error(&dir, e))?;
        let mut children = Vec::new();
        while let Some(entry) = read_dir.next_entry().await.map_err(|e| read_error(&dir, e))? {
            children.push(entry.path());
        }
        children.sort();

        let branches = children.into_iter().map(|path| {
            tokio::spawn(async move {
                let meta = fs::metadata(&path).await.map_err(|e| read_error(&path, e))?;
                if meta.is_dir() {
                    walk(path).await
                } else {
                    Ok(vec![path])
                }
            })
        });
        let nested = try_join_all(branches.map(join)).await?;
        Ok(nested.into_iter().flatten().collect())
    }
    .boxed()
}

/// Every file below `search_dir`, at any depth and with any extension.
///
/// Directories are listed concurrently; an error anywhere fails the walk.
pub async fn collect_all_files(search_dir: &str) -> CosResult<Vec<FileInfo>> {
    let root = self::search_dir(search_dir);
    ensure_search_dir("collect_all_files", &root)?;

    let options = FileInfoOptions::with_root(root.clone());
    Ok(walk(PathBuf::from(&root))
        .await?
        .iter()
        .map(|path| FileInfo::new(&path.to_string_lossy(), &options))
        .collect())
}

/// Blocking form of [`collect_all_files`].
pub fn collect_all_files_sync(search_dir: &str) -> CosResult<Vec<FileInfo>> {
    let root = self::search_dir(search_dir);
    ensure_search_dir("collect_all_files_sync", &root)?;

    let options = FileInfoOptions::with_root(root.clone());
    let mut files = Vec::new();
    for entry in WalkDir::new(&root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| CosError::Other(format!("collect_all_files_sync: {}", e)))?;
        if entry.file_type().is_file() {
            files.push(FileInfo::new(&entry.path().to_string_lossy(), &options));
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;
    use tempfile::TempDir;

    /// one/two/three mustache templates plus a nested tree:
    ///
    /// ```text
    /// one.mustache two.mustache three.mustache four.js
    /// one/two/two.mustache
    /// three/three.mustache three/three.styl
    /// ```
    fn fixture() -> TempDir {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        for name in ["one.mustache", "two.mustache", "three.mustache", "four.js"] {
            stdfs::write(root.join(name), name).unwrap();
        }
        stdfs::create_dir_all(root.join("one/two")).unwrap();
        stdfs::create_dir_all(root.join("three")).unwrap();
        stdfs::write(root.join("one/two/two.mustache"), "nested two").unwrap();
        stdfs::write(root.join("three/three.mustache"), "nested three").unwrap();
        stdfs::write(root.join("three/three.styl"), "body").unwrap();
        tmp
    }

    /// Depth-first, siblings sorted by name.
    const WALK_ORDER: [&str; 7] = [
        "four.js",
        "one/two/two.mustache",
        "one.mustache",
        "three/three.mustache",
        "three/three.styl",
        "three.mustache",
        "two.mustache",
    ];

    /// Flat directory with only the three templates.
    fn flat_fixture() -> TempDir {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["one.mustache", "two.mustache", "three.mustache"] {
            stdfs::write(tmp.path().join(name), name).unwrap();
        }
        tmp
    }

    fn root_of(tmp: &TempDir) -> String {
        tmp.path().to_string_lossy().into_owned()
    }

    fn basenames(files: &[FileInfo]) -> Vec<&str> {
        files.iter().map(|f| f.basename.as_str()).collect()
    }

    #[test]
    fn test_should_exclude() {
        assert!(should_exclude(&["two"], "tpl/two.mustache"));
        assert!(should_exclude(&["a"], "abc/x.js"));
        assert!(!should_exclude(&["node_modules"], "src/app.js"));
        assert!(!should_exclude::<&str>(&[], "anything"));
    }

    #[test]
    fn test_extension_filter() {
        assert_eq!(extension_filter(".mustache"), "*.mustache");
        assert_eq!(extension_filter("JS"), "*.js");
        assert_eq!(extension_filter(""), "*");
    }

    #[tokio::test]
    async fn test_collect_files() {
        let tmp = flat_fixture();
        let files = collect_files([root_of(&tmp)], [".mustache"], &CollectOptions::default())
            .await
            .unwrap();
        assert_eq!(basenames(&files), vec!["one.mustache", "three.mustache", "two.mustache"]);

        let root = files[0].root.clone().unwrap();
        assert!(root.ends_with('/'));
        assert_eq!(files[0].relative_path.as_deref(), Some("one.mustache"));
        assert!(files.iter().all(|f| f.contents.is_none()));
    }

    #[tokio::test]
    async fn test_collect_files_with_exclusions() {
        let tmp = flat_fixture();
        let options = CollectOptions::excluding(["two"]);
        let files = collect_files([root_of(&tmp)], [".mustache"], &options).await.unwrap();
        assert_eq!(basenames(&files), vec!["one.mustache", "three.mustache"]);
    }

    #[tokio::test]
    async fn test_collect_files_is_recursive() {
        let tmp = fixture();
        let files = collect_files([root_of(&tmp)], ["mustache"], &CollectOptions::default())
            .await
            .unwrap();
        let mut relative: Vec<_> = files.iter().filter_map(|f| f.relative_path.clone()).collect();
        relative.sort();
        assert_eq!(
            relative,
            vec![
                "one.mustache",
                "one/two/two.mustache",
                "three.mustache",
                "three/three.mustache",
                "two.mustache",
            ]
        );
    }

    #[tokio::test]
    async fn test_collect_files_preserves_declaration_order() {
        let tmp = fixture();
        let first = tmp.path().join("one/two").to_string_lossy().into_owned();
        let second = tmp.path().join("three").to_string_lossy().into_owned();

        let files = collect_files([first, second], [".styl", ".mustache"], &CollectOptions::default())
            .await
            .unwrap();
        assert_eq!(basenames(&files), vec!["two.mustache", "three.styl", "three.mustache"]);
    }

    #[tokio::test]
    async fn test_collect_files_missing_root_fails() {
        let tmp = flat_fixture();
        let missing = tmp.path().join("plugins").to_string_lossy().into_owned();
        let err = collect_files([root_of(&tmp), missing], [".mustache"], &CollectOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CosError::SearchPathNotFound { .. }));
        assert!(err.to_string().contains("plugins"));
    }

    #[tokio::test]
    async fn test_collect_files_skip_missing_root() {
        let tmp = flat_fixture();
        let missing = tmp.path().join("plugins").to_string_lossy().into_owned();
        let options = CollectOptions { skip_search_paths_ok: true, ..Default::default() };
        let files = collect_files([missing, root_of(&tmp)], [".mustache"], &options)
            .await
            .unwrap();
        assert_eq!(files.len(), 3);
    }

    #[tokio::test]
    async fn test_collect_files_lowercase_names() {
        let tmp = tempfile::tempdir().unwrap();
        stdfs::write(tmp.path().join("Header.Mustache"), "").unwrap();
        let options = CollectOptions { lowercase_names: true, ..Default::default() };
        let files = collect_files([root_of(&tmp)], [".mustache"], &options).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].basename, "header.mustache");
        assert_eq!(files[0].relative_path.as_deref(), Some("header.mustache"));
        assert!(files[0].absolute_path.ends_with("Header.Mustache"));
    }

    #[test]
    fn test_collect_files_sync_reads_contents() {
        let tmp = fixture();
        let files = collect_files_sync([root_of(&tmp)], [".mustache"], &CollectOptions::default()).unwrap();
        assert_eq!(
            basenames(&files),
            vec!["one.mustache", "three.mustache", "two.mustache", "two.mustache", "three.mustache"]
        );
        assert_eq!(files[0].contents.as_deref(), Some("one.mustache"));
        assert_eq!(files[3].contents.as_deref(), Some("nested two"));
    }

    #[test]
    fn test_collect_files_sync_excludes_directories() {
        let tmp = fixture();
        let options = CollectOptions { get_contents: false, ..CollectOptions::excluding(["three"]) };
        let files = collect_files_sync([root_of(&tmp)], [".mustache", ".styl"], &options).unwrap();
        assert_eq!(basenames(&files), vec!["one.mustache", "two.mustache", "two.mustache"]);
        assert!(files.iter().all(|f| f.contents.is_none()));
    }

    #[test]
    fn test_collect_files_sync_missing_root() {
        let tmp = flat_fixture();
        let missing = tmp.path().join("nope").to_string_lossy().into_owned();
        assert!(collect_files_sync([missing.clone()], ["js"], &CollectOptions::default()).is_err());

        let options = CollectOptions { skip_search_paths_ok: true, ..Default::default() };
        assert!(collect_files_sync([missing], ["js"], &options).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_extension_pattern_skipped_by_both_collectors() {
        let tmp = flat_fixture();
        let skip = CollectOptions { skip_search_paths_ok: true, get_contents: false, ..Default::default() };
        let strict = CollectOptions { get_contents: false, ..Default::default() };

        let err = collect_files_sync([root_of(&tmp)], ["["], &strict).unwrap_err();
        assert!(matches!(err, CosError::Glob { .. }));
        assert!(matches!(
            collect_files([root_of(&tmp)], ["["], &strict).await,
            Err(CosError::Glob { .. })
        ));

        let sync = collect_files_sync([root_of(&tmp)], ["[", "mustache"], &skip).unwrap();
        let not_sync = collect_files([root_of(&tmp)], ["[", "mustache"], &skip).await.unwrap();
        assert_eq!(sync.len(), 3);
        assert_eq!(basenames(&sync), basenames(&not_sync));
    }

    #[test]
    fn test_collect_filenames_sync() {
        let tmp = fixture();
        let pattern = format!("{}/*.js", Pattern::escape(&root_of(&tmp)));
        let names = collect_filenames_sync(&pattern).unwrap();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with("/four.js"));
    }

    #[tokio::test]
    async fn test_collect_all_files() {
        let tmp = fixture();
        let files = collect_all_files(&root_of(&tmp)).await.unwrap();
        let relative: Vec<_> = files.iter().filter_map(|f| f.relative_path.as_deref()).collect();
        assert_eq!(relative, WALK_ORDER);
    }

    #[tokio::test]
    async fn test_collect_all_files_missing_dir() {
        let tmp = flat_fixture();
        let missing = tmp.path().join("gone").to_string_lossy().into_owned();
        assert!(collect_all_files(&missing).await.is_err());
    }

    /// Fixture with a dangling symlink two levels down.
    #[cfg(unix)]
    fn broken_fixture() -> TempDir {
        let tmp = fixture();
        std::os::unix::fs::symlink(tmp.path().join("gone.txt"), tmp.path().join("one/two/dangling")).unwrap();
        tmp
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_collect_all_files_fails_on_nested_error() {
        let tmp = broken_fixture();
        let err = collect_all_files(&root_of(&tmp)).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("dangling"));
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_all_files_sync_fails_on_nested_error() {
        let tmp = broken_fixture();
        assert!(collect_all_files_sync(&root_of(&tmp)).is_err());
    }

    #[test]
    fn test_collect_all_files_sync() {
        let tmp = fixture();
        let files = collect_all_files_sync(&root_of(&tmp)).unwrap();
        let relative: Vec<_> = files.iter().filter_map(|f| f.relative_path.as_deref()).collect();
        assert_eq!(relative, WALK_ORDER);
    }
}
