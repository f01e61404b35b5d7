//! Filesystem mutation and query helpers
//!
//! Each mutation comes in an async form built on `tokio::fs` and a blocking
//! `_sync` form built on `std::fs`; callers pick per call site.

use cos_core::{path::unix_path, CosError, CosResult};
use futures::future::{BoxFuture, FutureExt};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Removes a file or a whole directory tree.
///
/// Returns `false` when there was nothing to remove.
pub async fn remove(path: impl AsRef<Path>) -> CosResult<bool> {
    let path = path.as_ref();
    let meta = match fs::symlink_metadata(path).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    if meta.is_dir() {
        fs::remove_dir_all(path).await?;
    } else {
        fs::remove_file(path).await?;
    }
    Ok(true)
}

pub fn remove_sync(path: impl AsRef<Path>) -> CosResult<bool> {
    let path = path.as_ref();
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    if meta.is_dir() {
        std::fs::remove_dir_all(path)?;
    } else {
        std::fs::remove_file(path)?;
    }
    Ok(true)
}

pub async fn rename(from: impl AsRef<Path>, to: impl AsRef<Path>) -> CosResult<()> {
    let from = from.as_ref();
    if fs::symlink_metadata(from).await.is_err() {
        return Err(CosError::NotFound(display(from)));
    }
    fs::rename(from, to.as_ref()).await?;
    Ok(())
}

pub fn rename_sync(from: impl AsRef<Path>, to: impl AsRef<Path>) -> CosResult<()> {
    let from = from.as_ref();
    if std::fs::symlink_metadata(from).is_err() {
        return Err(CosError::NotFound(display(from)));
    }
    std::fs::rename(from, to.as_ref())?;
    Ok(())
}

/// Creates a directory and any missing parents. Existing directories are fine.
pub async fn create_dir(path: impl AsRef<Path>) -> CosResult<()> {
    fs::create_dir_all(path.as_ref()).await?;
    Ok(())
}

pub fn create_dir_sync(path: impl AsRef<Path>) -> CosResult<()> {
    std::fs::create_dir_all(path.as_ref())?;
    Ok(())
}

/// Deletes everything inside `path`, creating it if it does not exist.
pub async fn empty_dir(path: impl AsRef<Path>) -> CosResult<()> {
    let path = path.as_ref();
    if !fs::try_exists(path).await? {
        return create_dir(path).await;
    }
    let mut read_dir = fs::read_dir(path).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        remove(entry.path()).await?;
    }
    Ok(())
}

pub fn empty_dir_sync(path: impl AsRef<Path>) -> CosResult<()> {
    let path = path.as_ref();
    if !path.exists() {
        return create_dir_sync(path);
    }
    for entry in std::fs::read_dir(path)? {
        remove_sync(entry?.path())?;
    }
    Ok(())
}

fn copy_tree(src: PathBuf, dst: PathBuf) -> BoxFuture<'static, CosResult<()>> {
    async move {
        fs::create_dir_all(&dst).await?;
        let mut read_dir = fs::read_dir(&src).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            let target = dst.join(entry.file_name());
            if entry.file_type().await?.is_dir() {
                copy_tree(entry.path(), target).await?;
            } else {
                fs::copy(entry.path(), &target).await?;
            }
        }
        Ok(())
    }
    .boxed()
}

/// Copies a file or a directory tree, creating missing parents of `dst`.
pub async fn copy(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> CosResult<()> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    let meta = fs::metadata(src)
        .await
        .map_err(|_| CosError::NotFound(display(src)))?;
    if meta.is_dir() {
        return copy_tree(src.to_path_buf(), dst.to_path_buf()).await;
    }
    if let Some(parent) = dst.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::copy(src, dst).await?;
    Ok(())
}

pub fn copy_sync(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> CosResult<()> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    let meta = std::fs::metadata(src).map_err(|_| CosError::NotFound(display(src)))?;
    if !meta.is_dir() {
        if let Some(parent) = dst.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(src, dst)?;
        return Ok(());
    }

    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| CosError::Other(format!("copy_sync: {}", e)))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| CosError::InvalidPath(display(entry.path())))?;
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

pub fn is_dir(path: impl AsRef<Path>) -> bool {
    path.as_ref().is_dir()
}

pub fn is_file(path: impl AsRef<Path>) -> bool {
    path.as_ref().is_file()
}

/// Names of the entries in a directory, sorted. Missing directories are empty.
pub fn get_files_sync(path: impl AsRef<Path>) -> CosResult<Vec<String>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(path)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

/// Canonical path with forward slashes. An absolute path keeps its leading `/`.
pub fn real_path_sync(path: impl AsRef<Path>) -> CosResult<String> {
    let path = path.as_ref();
    let real = std::fs::canonicalize(path).map_err(|e| CosError::read(display(path), e))?;
    Ok(unix_path(&real.to_string_lossy()))
}

/// State of a directory checked by [`valid_empty_dir_sync`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirStatus {
    /// The directory exists (or was just created)
    pub valid: bool,
    /// It already contained entries
    pub has_files: bool,
    pub error: Option<String>,
}

/// Checks that `dir` is usable as an output directory.
///
/// An existing directory is valid. A missing one is created when its parent
/// exists. Anything else is reported in `error` rather than as `Err`; only
/// I/O failures while listing or creating are returned as errors.
pub fn valid_empty_dir_sync(dir: impl AsRef<Path>) -> CosResult<DirStatus> {
    let dir = dir.as_ref();
    if dir.exists() {
        if !dir.is_dir() {
            return Ok(DirStatus {
                error: Some(format!("Dir: {} exists but is not a directory", display(dir))),
                ..Default::default()
            });
        }
        let has_files = std::fs::read_dir(dir)?.next().is_some();
        return Ok(DirStatus { valid: true, has_files, error: None });
    }

    let parent = match dir.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Ok(DirStatus {
            error: Some(format!("Root dir: {} does not exist", display(parent))),
            ..Default::default()
        });
    }
    std::fs::create_dir(dir)?;
    Ok(DirStatus { valid: true, has_files: false, error: None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;

    fn sandbox() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        stdfs::write(root.join("file_v001.mb"), "v1").unwrap();
        stdfs::write(root.join("file.mb"), "plain").unwrap();
        stdfs::create_dir_all(root.join("testdir1/deeper")).unwrap();
        stdfs::write(root.join("testdir1/file1"), "1").unwrap();
        stdfs::write(root.join("testdir1/deeper/file2"), "2").unwrap();
        stdfs::create_dir(root.join("emptyDir")).unwrap();
        tmp
    }

    #[tokio::test]
    async fn test_remove() {
        let tmp = sandbox();
        let file = tmp.path().join("file.mb");
        assert!(remove(&file).await.unwrap());
        assert!(!file.exists());
        assert!(!remove(&file).await.unwrap());

        let dir = tmp.path().join("testdir1");
        assert!(remove(&dir).await.unwrap());
        assert!(!dir.exists());
    }

    #[test]
    fn test_remove_sync() {
        let tmp = sandbox();
        let dir = tmp.path().join("emptyDir");
        assert!(remove_sync(&dir).unwrap());
        assert!(!dir.exists());
        assert!(!remove_sync(&dir).unwrap());
    }

    #[tokio::test]
    async fn test_rename() {
        let tmp = sandbox();
        let from = tmp.path().join("file.mb");
        let to = tmp.path().join("renamed.mb");
        rename(&from, &to).await.unwrap();
        assert!(to.is_file());
        assert!(matches!(rename(&from, &to).await, Err(CosError::NotFound(_))));

        rename_sync(&to, &from).unwrap();
        assert!(from.is_file());
    }

    #[tokio::test]
    async fn test_create_and_empty_dir() {
        let tmp = sandbox();
        let nested = tmp.path().join("a/b/c");
        create_dir(&nested).await.unwrap();
        create_dir(&nested).await.unwrap();
        assert!(nested.is_dir());

        empty_dir(tmp.path()).await.unwrap();
        assert!(get_files_sync(tmp.path()).unwrap().is_empty());
        assert!(tmp.path().is_dir());
    }

    #[test]
    fn test_empty_dir_sync_creates_missing() {
        let tmp = sandbox();
        let fresh = tmp.path().join("fresh");
        empty_dir_sync(&fresh).unwrap();
        assert!(fresh.is_dir());

        empty_dir_sync(tmp.path().join("testdir1")).unwrap();
        assert!(get_files_sync(tmp.path().join("testdir1")).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_copy_tree() {
        let tmp = sandbox();
        let dst = tmp.path().join("copy/of/testdir1");
        copy(tmp.path().join("testdir1"), &dst).await.unwrap();
        assert_eq!(stdfs::read_to_string(dst.join("deeper/file2")).unwrap(), "2");

        let single = tmp.path().join("single/file.mb");
        copy(tmp.path().join("file.mb"), &single).await.unwrap();
        assert_eq!(stdfs::read_to_string(single).unwrap(), "plain");
    }

    #[test]
    fn test_copy_sync_tree() {
        let tmp = sandbox();
        let dst = tmp.path().join("testdir2");
        copy_sync(tmp.path().join("testdir1"), &dst).unwrap();
        assert_eq!(get_files_sync(&dst).unwrap(), vec!["deeper", "file1"]);
        assert!(dst.join("deeper/file2").is_file());
        assert!(copy_sync(tmp.path().join("nope"), &dst).is_err());
    }

    #[test]
    fn test_get_files_sync() {
        let tmp = sandbox();
        assert_eq!(
            get_files_sync(tmp.path()).unwrap(),
            vec!["emptyDir", "file.mb", "file_v001.mb", "testdir1"]
        );
        assert!(get_files_sync(tmp.path().join("missing")).unwrap().is_empty());
    }

    #[test]
    fn test_queries() {
        let tmp = sandbox();
        assert!(is_dir(tmp.path()));
        assert!(is_file(tmp.path().join("file.mb")));
        assert!(!is_file(tmp.path().join("testdir1")));

        let real = real_path_sync(tmp.path().join("testdir1/../file.mb")).unwrap();
        assert!(real.ends_with("/file.mb"));
        assert!(!real.contains('\\'));
    }

    #[test]
    fn test_valid_empty_dir_sync() {
        let tmp = sandbox();

        let status = valid_empty_dir_sync(tmp.path().join("emptyDir")).unwrap();
        assert_eq!(status, DirStatus { valid: true, has_files: false, error: None });

        let status = valid_empty_dir_sync(tmp.path().join("testdir1")).unwrap();
        assert!(status.valid && status.has_files);

        let status = valid_empty_dir_sync(tmp.path().join("file.mb")).unwrap();
        assert!(!status.valid);
        assert!(status.error.unwrap().contains("is not a directory"));

        let created = tmp.path().join("out");
        assert!(valid_empty_dir_sync(&created).unwrap().valid);
        assert!(created.is_dir());

        let orphan = valid_empty_dir_sync(tmp.path().join("no/parent")).unwrap();
        assert!(!orphan.valid);
        assert!(orphan.error.unwrap().contains("does not exist"));
    }
}
