//! CLI definition and parsing.
//! Each subcommand maps onto one library operation.
//!
//! Notes:
//! - --debug is a shorthand for --log-level debug.
//! - Flags override values from the XML config file.

use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use patchfs::config::{Config, LogLevel};

/// Low-level file operations for application updaters.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Replace files, unpack packed archives and walk trees safely"
)]
pub struct Args {
    /// Config file (overrides PATCHFS_CONFIG and the OS default location).
    #[arg(long, global = true, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Emit logs in structured JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Print the config file location that would be used, then exit.
    #[arg(long)]
    pub print_config: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Replace DEST with SRC (rename, displace-then-rename, or copy fallback).
    Replace {
        #[arg(value_hint = ValueHint::FilePath)]
        src: PathBuf,
        #[arg(value_hint = ValueHint::FilePath)]
        dest: PathBuf,
    },
    /// Unpack a packed payload (optionally .gz) into an archive at TARGET.
    Unpack {
        #[arg(value_hint = ValueHint::FilePath)]
        packed: PathBuf,
        #[arg(value_hint = ValueHint::FilePath)]
        target: PathBuf,
    },
    /// Print every file and directory below ROOT.
    Walk {
        #[arg(value_hint = ValueHint::DirPath)]
        root: PathBuf,
    },
    /// Copy SRC over TARGET, leaving SRC in place.
    Copy {
        #[arg(value_hint = ValueHint::FilePath)]
        src: PathBuf,
        #[arg(value_hint = ValueHint::FilePath)]
        target: PathBuf,
    },
    /// Print the lines of FILE.
    Lines {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Print only the number of lines.
        #[arg(long)]
        count: bool,
    },
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config value).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if self.json {
            cfg.json_logs = true;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
