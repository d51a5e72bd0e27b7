//! Configuration for ringlog
//!
//! Settings come from the command line, optionally seeded by a TOML file.
//! They are resolved once at startup into an immutable [`Settings`].

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use ringlog_kernel::KMSG_DEVICE_PATH;
use ringlog_types::{ColorMode, FormatOptions};

use crate::Args;

/// Optional settings file (`~/.config/ringlog/config.toml`)
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Color mode when `--color` is not given
    pub color: Option<ColorMode>,

    /// Structured log device to read
    pub kmsg_path: Option<PathBuf>,

    /// Legacy read size when `--buffer-size` is not given
    pub buffer_size: Option<usize>,
}

impl FileConfig {
    /// Get the default config file path
    fn default_path() -> Option<PathBuf> {
        let config_dir = dirs::config_dir()?;
        Some(config_dir.join("ringlog").join("config.toml"))
    }

    /// Load an explicit config file, or the default one if it exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::read(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::read(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// What this invocation does
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Set the console log level and exit
    ConsoleLevel(u8),
    /// Clear the ring buffer and exit
    Clear,
    /// Print the ring buffer
    Read,
}

/// Resolved, immutable settings for one run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub mode: Mode,

    /// Rendering options, shared by both backends
    pub format: FormatOptions,

    /// Block waiting for new records
    pub follow: bool,

    /// Clear the ring buffer once it has been printed
    pub clear_after_read: bool,

    /// Legacy read size; queried from the kernel when unset
    pub buffer_size: Option<usize>,

    pub kmsg_path: PathBuf,
}

impl Settings {
    /// Merge command line and file settings. Command line values win.
    pub fn resolve(args: &Args, file: FileConfig, stdout_is_terminal: bool) -> Self {
        let mode = if let Some(level) = args.console_level {
            Mode::ConsoleLevel(level)
        } else if args.clear {
            Mode::Clear
        } else {
            Mode::Read
        };

        let color = args.color.or(file.color).unwrap_or_default();

        Self {
            mode,
            format: FormatOptions {
                raw: args.raw,
                suppress_timestamp: args.notime,
                color: color.enabled(stdout_is_terminal),
            },
            follow: args.follow,
            clear_after_read: args.read_clear,
            buffer_size: args
                .buffer_size
                .map(|size| size as usize)
                .or(file.buffer_size.filter(|&size| size > 0)),
            kmsg_path: file
                .kmsg_path
                .unwrap_or_else(|| PathBuf::from(KMSG_DEVICE_PATH)),
        }
    }
}
