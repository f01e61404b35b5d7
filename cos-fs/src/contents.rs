//! Reading file contents

use cos_core::{CosError, CosResult, FileInfo, ReadOptions};
use futures::future::try_join_all;
use std::path::Path;
use tokio::fs;

use crate::task::join;

/// Reads and decodes a whole file.
pub async fn read_file(path: impl AsRef<Path>, options: &ReadOptions) -> CosResult<String> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let bytes = fs::read(path).await.map_err(|e| CosError::read(display.clone(), e))?;
    options.encoding.decode(&display, bytes)
}

/// Blocking form of [`read_file`].
pub fn read_file_sync(path: impl AsRef<Path>, options: &ReadOptions) -> CosResult<String> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|e| CosError::read(display.clone(), e))?;
    options.encoding.decode(&display, bytes)
}

/// Loads the contents of a single file into its record.
pub async fn get_file_content(mut file: FileInfo, options: &ReadOptions) -> CosResult<FileInfo> {
    file.contents = Some(read_file(&file.absolute_path, options).await?);
    Ok(file)
}

/// Loads the contents of every file in parallel.
///
/// Either every read succeeds and all records come back in input order, or
/// the first failure is returned and nothing else is. Reads already in
/// flight at that point are not cancelled.
pub async fn get_file_contents<I>(files: I, options: &ReadOptions) -> CosResult<Vec<FileInfo>>
where
    I: IntoIterator<Item = FileInfo>,
{
    let options = *options;
    let reads = files
        .into_iter()
        .map(|file| tokio::spawn(async move { get_file_content(file, &options).await }));
    try_join_all(reads.map(join)).await
}
