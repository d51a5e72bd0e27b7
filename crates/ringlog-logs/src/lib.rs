//! Kernel log processing for ringlog
//!
//! This crate provides record decoding, the structured and legacy log
//! sources, the legacy marker filter, and line formatting.

mod error;
mod format;
mod legacy;
mod parser;
mod stream;
mod theme;

pub use error::SourceError;
pub use format::LineFormatter;
pub use legacy::{LegacySource, strip_markers, write_block};
pub use parser::RecordParser;
pub use stream::{ReadOutcome, StreamSource};

// Re-export types used in our public API
pub use ringlog_types::{FormatOptions, LogRecord};
