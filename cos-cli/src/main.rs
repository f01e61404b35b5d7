// SPDX-License-Identifier: AGPL-3.0-or-later
//! cOS CLI
//!
//! Collects, inspects and versions files, and runs external commands.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "cos")]
#[command(author, version, about = "cOS - filesystem utilities for build pipelines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML file with [collect] and [run] option tables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect files by extension from one or more search roots
    Collect {
        /// Search roots
        #[arg(required = true)]
        paths: Vec<String>,

        /// Extensions to match, with or without the leading dot
        #[arg(short, long = "ext", required = true)]
        extensions: Vec<String>,

        /// Drop paths containing this substring
        #[arg(short = 'x', long)]
        exclude: Vec<String>,

        /// Skip search roots that do not exist
        #[arg(long)]
        skip_missing: bool,

        /// Lowercase derived names
        #[arg(short, long)]
        lowercase: bool,

        /// Load file contents
        #[arg(long)]
        contents: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Use the blocking collector
        #[arg(long)]
        sync: bool,
    },

    /// List every file under a directory
    All {
        dir: String,

        #[arg(long)]
        json: bool,

        #[arg(long)]
        sync: bool,
    },

    /// Show the derived names of a path
    Info {
        path: String,

        /// Search root to derive relative paths from
        #[arg(short, long)]
        root: Option<String>,

        #[arg(short, long)]
        lowercase: bool,

        #[arg(long)]
        json: bool,
    },

    /// Normalize a path
    Normalize {
        path: String,

        /// Treat the path as a directory
        #[arg(short, long)]
        dir: bool,
    },

    /// Parent directory of a path
    Up { path: String },

    /// Show or bump the version token of a file name
    Version {
        file: String,

        /// Print the name with every version token incremented
        #[arg(short, long)]
        bump: bool,
    },

    /// Show the frame range of a sequence pattern like shot.%04d.exr
    Frames {
        pattern: String,

        #[arg(long)]
        json: bool,
    },

    /// Run an external command and report its output
    Run {
        program: String,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,

        /// Working directory
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// Environment override, KEY=VALUE
        #[arg(short, long = "env")]
        env: Vec<String>,
    },

    /// Print the global npm modules directory
    NpmPrefix,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let config = match config::Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Collect { paths, extensions, exclude, skip_missing, lowercase, contents, json, sync } => {
            let mut options = config.collect;
            options.exclude.extend(exclude);
            options.skip_search_paths_ok |= skip_missing;
            options.lowercase_names |= lowercase;
            options.get_contents = contents;
            commands::collect(&paths, &extensions, &options, json, sync).await
        }
        Commands::All { dir, json, sync } => commands::all(&dir, json, sync).await,
        Commands::Info { path, root, lowercase, json } => commands::info(&path, root, lowercase, json),
        Commands::Normalize { path, dir } => commands::normalize(&path, dir),
        Commands::Up { path } => commands::up(&path),
        Commands::Version { file, bump } => commands::version(&file, bump),
        Commands::Frames { pattern, json } => commands::frames(&pattern, json),
        Commands::Run { program, args, cwd, env } => {
            let mut options = config.run;
            if cwd.is_some() {
                options.cwd = cwd;
            }
            commands::run(&program, &args, &env, options).await
        }
        Commands::NpmPrefix => commands::npm_prefix(&config.run).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
