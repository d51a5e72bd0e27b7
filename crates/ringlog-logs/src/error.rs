use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Hard failures of a log source. Each names the primitive that failed; the
/// system error is the source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("kmsg open {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("kmsg read")]
    StreamRead(#[source] io::Error),

    #[error("klogctl size")]
    BufferSize(#[source] io::Error),

    #[error("klogctl size: kernel reported a {0} byte buffer")]
    EmptyBuffer(usize),

    #[error("klogctl read: cannot allocate {size} bytes")]
    Alloc {
        size: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("klogctl read")]
    BulkRead(#[source] io::Error),

    #[error("klogctl clear")]
    Clear(#[source] io::Error),

    #[error("write stdout")]
    Write(#[source] io::Error),
}
