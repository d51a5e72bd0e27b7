//! Shared types for ringlog
//!
//! This crate contains data structures used across multiple ringlog crates.

use serde::Deserialize;
use std::str::FromStr;

// ============================================================================
// Severity
// ============================================================================

/// Kernel log priority (syslog severity, the low three bits of facility/priority)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Priority {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl Priority {
    /// Extract the priority from a combined facility/priority value
    pub fn from_facility_priority(value: u32) -> Self {
        match value & 0x07 {
            0 => Self::Emergency,
            1 => Self::Alert,
            2 => Self::Critical,
            3 => Self::Error,
            4 => Self::Warning,
            5 => Self::Notice,
            6 => Self::Info,
            _ => Self::Debug,
        }
    }

    /// Error or worse
    pub fn is_severe(&self) -> bool {
        (*self as u8) <= Self::Error as u8
    }
}

// ============================================================================
// Log Types
// ============================================================================

/// One decoded record from the structured kernel log device
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    /// Facility * 8 + priority, exactly as the kernel encoded it
    pub facility_priority: u32,

    /// Microseconds since boot
    pub timestamp_micros: u64,

    /// Message text, truncated at the first newline
    pub text: Vec<u8>,

    /// Offset of the first ": " in `text`, or 0 when there is no subsystem tag
    pub subsystem_len: usize,
}

impl LogRecord {
    /// Build a record, locating the subsystem separator in `text`
    pub fn new(facility_priority: u32, timestamp_micros: u64, text: Vec<u8>) -> Self {
        let subsystem_len = text
            .windows(2)
            .position(|w| w == b": ")
            .unwrap_or(0);

        Self {
            facility_priority,
            timestamp_micros,
            text,
            subsystem_len,
        }
    }

    pub fn priority(&self) -> Priority {
        Priority::from_facility_priority(self.facility_priority)
    }

    /// The leading subsystem tag, if any (without the ": ")
    pub fn subsystem(&self) -> Option<&[u8]> {
        (self.subsystem_len > 0).then(|| &self.text[..self.subsystem_len])
    }

    /// Text after the subsystem tag (starting at ": " when a tag exists)
    pub fn body(&self) -> &[u8] {
        &self.text[self.subsystem_len..]
    }

    /// Whole seconds and the microsecond remainder of the timestamp
    pub fn seconds_micros(&self) -> (u64, u64) {
        (
            self.timestamp_micros / 1_000_000,
            self.timestamp_micros % 1_000_000,
        )
    }
}

// ============================================================================
// Output Options
// ============================================================================

/// When to emit terminal colors
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Color only when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Resolve against whether the output is a terminal
    pub fn enabled(&self, is_terminal: bool) -> bool {
        match self {
            Self::Auto => is_terminal,
            Self::Always => true,
            Self::Never => false,
        }
    }
}

impl FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            other => Err(format!(
                "invalid color mode '{}' (expected auto, always or never)",
                other
            )),
        }
    }
}

/// How records are rendered, fixed for the whole invocation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FormatOptions {
    /// Show `<facility_priority>` prefixes / keep legacy markers
    pub raw: bool,

    /// Drop the `[seconds.micros]` timestamp
    pub suppress_timestamp: bool,

    /// Emit terminal color escapes
    pub color: bool,
}
