// SPDX-License-Identifier: AGPL-3.0-or-later
//! CLI command implementations

use cos_core::{
    path::{normalize_dir, normalize_path, up_a_dir},
    sequence::{get_frame_range, get_version, increment_version},
    CollectOptions, CosError, CosResult, FileInfo, FileInfoOptions,
};
use cos_fs::{collect_all_files, collect_all_files_sync, collect_files, collect_files_sync, get_file_contents};
use cos_process::{global_modules_dir, run_command, Environment, RunOptions};
use console::style;
use serde::Serialize;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Ext")]
    extension: String,
    #[tabled(rename = "Relative")]
    relative: String,
    #[tabled(rename = "Size")]
    size: String,
}

/// Size of the loaded contents, or of the file on disk
fn format_size(file: &FileInfo) -> String {
    let size = match &file.contents {
        Some(contents) => Some(contents.len() as u64),
        None => std::fs::metadata(&file.absolute_path).ok().map(|m| m.len()),
    };
    size.map(|s| bytesize::ByteSize(s).to_string()).unwrap_or_else(|| "-".to_string())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CosResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| CosError::Other(format!("JSON output failed: {}", e)))?;
    println!("{text}");
    Ok(())
}

fn print_files(files: &[FileInfo], json: bool) -> CosResult<()> {
    if json {
        return print_json(files);
    }
    if files.is_empty() {
        println!("(no files)");
        return Ok(());
    }

    let rows: Vec<FileRow> = files
        .iter()
        .map(|f| FileRow {
            name: f.name.clone(),
            extension: style(&f.extension).cyan().to_string(),
            relative: f.relative_path.clone().unwrap_or_else(|| f.path.clone()),
            size: format_size(f),
        })
        .collect();
    println!("{}", Table::new(rows));
    println!("{} file(s)", style(files.len()).bold());
    Ok(())
}

/// Collect files by extension
pub async fn collect(
    paths: &[String],
    extensions: &[String],
    options: &CollectOptions,
    json: bool,
    sync: bool,
) -> CosResult<()> {
    let files = if sync {
        collect_files_sync(paths, extensions, options)?
    } else {
        let files = collect_files(paths, extensions, options).await?;
        if options.get_contents {
            get_file_contents(files, &options.read_options()).await?
        } else {
            files
        }
    };
    print_files(&files, json)
}

/// List every file under a directory
pub async fn all(dir: &str, json: bool, sync: bool) -> CosResult<()> {
    let files = if sync {
        collect_all_files_sync(dir)?
    } else {
        collect_all_files(dir).await?
    };
    print_files(&files, json)
}

/// Show derived file info
pub fn info(path: &str, root: Option<String>, lowercase: bool, json: bool) -> CosResult<()> {
    let options = FileInfoOptions { root, lowercase_names: lowercase };
    let info = FileInfo::new(path, &options);
    if json {
        return print_json(&info);
    }

    println!("  Path:      {}", info.path);
    println!("  Basename:  {}", info.basename);
    println!("  Name:      {}", info.name);
    println!("  Extension: {}", info.extension);
    println!("  Dirname:   {}", info.dirname);
    if let Some(root) = &info.root {
        println!("  Root:      {}", root);
    }
    if let Some(relative) = &info.relative_path {
        println!("  Relative:  {}", relative);
    }
    Ok(())
}

pub fn normalize(path: &str, dir: bool) -> CosResult<()> {
    let normalized = if dir { normalize_dir(path) } else { normalize_path(path) };
    println!("{normalized}");
    Ok(())
}

pub fn up(path: &str) -> CosResult<()> {
    println!("{}", up_a_dir(path));
    Ok(())
}

/// Show or bump a file's version token
pub fn version(file: &str, bump: bool) -> CosResult<()> {
    if bump {
        println!("{}", increment_version(file));
    } else {
        println!("{}", get_version(file));
    }
    Ok(())
}

/// Show the frame range of a sequence
pub fn frames(pattern: &str, json: bool) -> CosResult<()> {
    let range = get_frame_range(pattern)?;
    if json {
        return print_json(&range);
    }
    println!("  Sequence: {}", range.base);
    println!("  Frames:   {}-{}", range.min, range.max);
    println!("  Count:    {}", range.max - range.min + 1);
    Ok(())
}

fn parse_env(assignments: &[String]) -> CosResult<Environment> {
    let mut env = Environment::new();
    for assignment in assignments {
        let (key, value) = Environment::parse_assignment(assignment)
            .ok_or_else(|| CosError::Other(format!("invalid --env value {:?}, expected KEY=VALUE", assignment)))?;
        env.set(key, value);
    }
    Ok(env)
}

/// Run an external command, echoing its output
pub async fn run(program: &str, args: &[String], env: &[String], mut options: RunOptions) -> CosResult<()> {
    for (key, value) in parse_env(env)?.overrides() {
        options.env.set(key, value);
    }

    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let output = run_command(program, &args, &options).await;
    print!("{}", output.stdout);
    eprint!("{}", output.stderr);

    if let Some(err) = output.spawn_error {
        return Err(CosError::Other(err));
    }
    match output.code {
        Some(0) => Ok(()),
        Some(code) => Err(CosError::Other(format!("{} exited with code {}", program, code))),
        None => Err(CosError::Other(format!("{} was terminated by a signal", program))),
    }
}

/// Print the global npm modules directory
pub async fn npm_prefix(options: &RunOptions) -> CosResult<()> {
    let dir = global_modules_dir(options).await?;
    println!("{}", style(dir).green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env() {
        let env = parse_env(&["A=1".to_string(), "B=x=y".to_string()]).unwrap();
        assert_eq!(env.overrides().collect::<Vec<_>>(), vec![("A", "1"), ("B", "x=y")]);
        assert!(parse_env(&["oops".to_string()]).is_err());
    }

    #[test]
    fn test_format_size() {
        let info = FileInfo::new("a/b.txt", &FileInfoOptions::default()).with_contents("hello");
        assert_eq!(format_size(&info), bytesize::ByteSize(5).to_string());

        let missing = FileInfo::new("/nonexistent/cos/b.txt", &FileInfoOptions::default());
        assert_eq!(format_size(&missing), "-");
    }
}
