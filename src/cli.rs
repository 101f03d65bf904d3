//! Command-line interface for icon-font.
//!
//! This module handles CLI argument parsing and the `init` subcommand;
//! `build` and `watch` are run by [`crate::app`].

use clap::{Parser, Subcommand};
use icon_font_config::LogLevel;
use icon_font_config::defaults::CONFIG_FILE_NAME;
use std::path::{Path, PathBuf};

/// icon-font - Build an icon font and its CSS from a directory of SVG icons
#[derive(Parser, Debug)]
#[command(name = "icon-font")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: icon-font.yaml in the project root)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Project root that relative config paths resolve against
    #[arg(long, value_name = "DIR", default_value = ".", global = true)]
    pub root: PathBuf,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Generate the fonts and CSS once
    Build,
    /// Generate, then regenerate whenever icon sources change
    Watch,
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}

/// What the binary should run after argument parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Build,
    Watch,
}

/// Runtime options passed from CLI to the application
#[derive(Clone, Debug)]
pub struct RuntimeOptions {
    pub mode: Mode,
    /// Resolved config file path
    pub config_path: PathBuf,
    pub root: PathBuf,
    /// `--log-level`, if given
    pub log_level: Option<log::LevelFilter>,
}

/// Result of CLI processing
pub enum CliResult {
    /// Continue with a build or watch run
    Continue(RuntimeOptions),
    /// Exit with the given code (subcommand completed)
    Exit(i32),
}

impl Cli {
    /// Config file path, defaulting to `icon-font.yaml` under the root.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.root.join(CONFIG_FILE_NAME))
    }
}

/// Process CLI arguments and handle subcommands
pub fn process_cli() -> CliResult {
    process(Cli::parse())
}

fn process(cli: Cli) -> CliResult {
    let config_path = cli.config_path();
    let log_level = cli.log_level.map(LogLevel::to_level_filter);

    let mode = match cli.command {
        Commands::Init { force } => {
            return match init_config(&config_path, &cli.root, force) {
                Ok(()) => CliResult::Exit(0),
                Err(e) => {
                    eprintln!("icon-font: error: {e:#}");
                    CliResult::Exit(1)
                }
            };
        }
        Commands::Build => Mode::Build,
        Commands::Watch => Mode::Watch,
    };

    CliResult::Continue(RuntimeOptions {
        mode,
        config_path,
        root: cli.root,
        log_level,
    })
}

/// Write the default config to `config_path` and create the icon source
/// directory.
pub fn init_config(config_path: &Path, root: &Path, force: bool) -> anyhow::Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    let config = icon_font_config::Config::default();
    config.save(config_path)?;

    let source_dir = config.source_path(root);
    std::fs::create_dir_all(&source_dir)?;

    println!("Wrote {}", config_path.display());
    println!("Put SVG icons in {}", source_dir.display());
    println!("Set compiler.command before running `icon-font build`.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_build_with_flags() {
        let cli = Cli::try_parse_from([
            "icon-font",
            "--root",
            "/project",
            "--log-level",
            "debug",
            "build",
        ])
        .unwrap();
        assert_eq!(cli.command, Commands::Build);
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        assert_eq!(cli.config_path(), PathBuf::from("/project/icon-font.yaml"));
    }

    #[test]
    fn test_parse_watch_with_config_after_subcommand() {
        let cli = Cli::try_parse_from(["icon-font", "watch", "--config", "fonts.yaml"]).unwrap();
        assert_eq!(cli.command, Commands::Watch);
        assert_eq!(cli.config_path(), PathBuf::from("fonts.yaml"));
    }

    #[test]
    fn test_parse_rejects_bad_log_level() {
        assert!(Cli::try_parse_from(["icon-font", "--log-level", "loud", "build"]).is_err());
    }

    #[test]
    fn test_init_writes_config_and_refuses_overwrite() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE_NAME);

        init_config(&config_path, temp_dir.path(), false).unwrap();
        assert!(config_path.exists());
        assert!(temp_dir.path().join("assets/icon-font").is_dir());

        assert!(init_config(&config_path, temp_dir.path(), false).is_err());
        assert!(init_config(&config_path, temp_dir.path(), true).is_ok());
    }

    #[test]
    fn test_process_build_continues() {
        let cli = Cli::try_parse_from(["icon-font", "build"]).unwrap();
        match process(cli) {
            CliResult::Continue(options) => {
                assert_eq!(options.mode, Mode::Build);
                assert_eq!(options.log_level, None);
            }
            CliResult::Exit(code) => panic!("unexpected exit {code}"),
        }
    }
}
