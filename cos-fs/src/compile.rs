//! Running a transform over collected files

use cos_core::{CosError, CosResult, FileInfo};
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::debug;

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "compile function panicked".to_string()
    }
}

/// Replaces each file's contents with `compile(contents, file, options)`.
///
/// Every file is compiled on the blocking pool at the same time. The first
/// failure, whether an `Err` or a panic, aborts the rest of the batch and
/// comes back as [`CosError::Compile`] naming that file's path. Missing
/// contents are passed as an empty string. Output keeps the input order.
pub async fn compile_files<F, O, E>(files: Vec<FileInfo>, compile: F, options: O) -> CosResult<Vec<FileInfo>>
where
    F: Fn(&str, &FileInfo, &O) -> Result<String, E> + Send + Sync + 'static,
    O: Send + Sync + 'static,
    E: fmt::Display,
{
    let compile = Arc::new(compile);
    let options = Arc::new(options);
    let total = files.len();

    let mut batch = JoinSet::new();
    for (index, mut file) in files.into_iter().enumerate() {
        let (compile, options) = (Arc::clone(&compile), Arc::clone(&options));
        batch.spawn_blocking(move || {
            debug!("Compiling: {}", file.path);
            let contents = file.contents.as_deref().unwrap_or_default();
            let message = match catch_unwind(AssertUnwindSafe(|| compile(contents, &file, &options))) {
                Ok(Ok(compiled)) => {
                    file.contents = Some(compiled);
                    return Ok((index, file));
                }
                Ok(Err(err)) => err.to_string(),
                Err(payload) => panic_message(payload),
            };
            Err(CosError::Compile { path: file.path, message })
        });
    }

    let mut compiled: Vec<Option<FileInfo>> = std::iter::repeat_with(|| None).take(total).collect();
    while let Some(joined) = batch.join_next().await {
        match joined {
            Ok(Ok((index, file))) => compiled[index] = Some(file),
            Ok(Err(err)) => {
                batch.abort_all();
                return Err(err);
            }
            Err(err) => {
                batch.abort_all();
                return Err(CosError::Task(err.to_string()));
            }
        }
    }
    Ok(compiled.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cos_core::FileInfoOptions;

    fn files(names: &[&str]) -> Vec<FileInfo> {
        names
            .iter()
            .map(|name| FileInfo::new(&format!("tpl/{}.mustache", name), &FileInfoOptions::default()).with_contents(*name))
            .collect()
    }

    #[tokio::test]
    async fn test_compile_files() {
        let compiled = compile_files(
            files(&["one", "two", "three"]),
            |contents: &str, file: &FileInfo, suffix: &String| -> Result<String, String> {
                Ok(format!("{}:{}{}", file.name, contents.to_uppercase(), suffix))
            },
            "!".to_string(),
        )
        .await
        .unwrap();

        let contents: Vec<_> = compiled.iter().map(|f| f.contents.as_deref().unwrap()).collect();
        assert_eq!(contents, vec!["one:ONE!", "two:TWO!", "three:THREE!"]);
    }

    #[tokio::test]
    async fn test_compile_files_missing_contents() {
        let file = FileInfo::new("tpl/empty.mustache", &FileInfoOptions::default());
        let compiled = compile_files(
            vec![file],
            |contents: &str, _: &FileInfo, _: &()| -> Result<String, String> { Ok(format!("[{}]", contents)) },
            (),
        )
        .await
        .unwrap();
        assert_eq!(compiled[0].contents.as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_compile_failure_fails_batch() {
        let result = compile_files(
            files(&["one", "bad", "three"]),
            |contents: &str, _: &FileInfo, _: &()| {
                if contents == "bad" {
                    Err("unclosed tag")
                } else {
                    Ok(contents.to_string())
                }
            },
            (),
        )
        .await;

        let err = result.unwrap_err();
        assert!(err.is_compile_error());
        let message = err.to_string();
        assert!(message.starts_with("Compile failed for file:\n\ntpl/bad.mustache"));
        assert!(message.ends_with("unclosed tag"));
    }

    #[tokio::test]
    async fn test_compile_panic_is_attributed() {
        let err = compile_files(
            files(&["boom"]),
            |_: &str, _: &FileInfo, _: &()| -> Result<String, String> { panic!("template exploded") },
            (),
        )
        .await
        .unwrap_err();

        match err {
            CosError::Compile { path, message } => {
                assert_eq!(path, "tpl/boom.mustache");
                assert_eq!(message, "template exploded");
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
