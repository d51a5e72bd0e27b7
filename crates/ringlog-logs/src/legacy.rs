use std::io::{self, Write};

use ringlog_kernel::KernelLog;
use ringlog_types::FormatOptions;
use tracing::debug;

use crate::error::SourceError;

/// Bulk reader for kernels without `/dev/kmsg`
///
/// Pulls the whole retained ring buffer (or its last `size` bytes) with one
/// `syslog(2)` call and writes it out as a single block.
pub struct LegacySource<'a, K> {
    /// Kernel log control channel
    klog: &'a K,

    /// Bytes to request; queried from the kernel when unset
    size: Option<usize>,

    /// Clear the ring buffer after reading it
    clear: bool,
}

impl<'a, K: KernelLog> LegacySource<'a, K> {
    pub fn new(klog: &'a K, size: Option<usize>, clear: bool) -> Self {
        Self { klog, size, clear }
    }

    /// Fetch the raw ring buffer contents
    pub fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        let size = match self.size {
            Some(size) => size,
            None => {
                let size = self.klog.buffer_size().map_err(SourceError::BufferSize)?;
                if size < 1 {
                    return Err(SourceError::EmptyBuffer(size));
                }
                size
            }
        };

        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|source| SourceError::Alloc { size, source })?;
        data.resize(size, 0);

        let len = self
            .klog
            .read_all(&mut data, self.clear)
            .map_err(SourceError::BulkRead)?;
        data.truncate(len.min(size));

        debug!(
            requested = size,
            read = data.len(),
            clear = self.clear,
            "Fetched legacy ring buffer"
        );

        Ok(data)
    }

    /// Fetch, filter, and write the ring buffer. Returns the bytes written
    /// before any trailing newline is added.
    pub fn run<W: Write>(
        &self,
        options: &FormatOptions,
        out: &mut W,
    ) -> Result<usize, SourceError> {
        let mut data = self.fetch()?;
        if !options.raw {
            strip_markers(&mut data, options.suppress_timestamp);
        }
        write_block(out, &data).map_err(SourceError::Write)?;
        Ok(data.len())
    }
}

/// Remove `<N>` priority markers (and, when asked, `[time]` markers) found at
/// the start of the buffer and after every newline, compacting in place.
///
/// A marker runs to the next closing delimiter anywhere later in the buffer.
pub fn strip_markers(data: &mut Vec<u8>, strip_timestamps: bool) {
    let len = data.len();
    let mut from = 0;
    let mut to = 0;

    while from < len {
        // Bytes at and after `from` have not been overwritten yet
        if from == 0 || data[from - 1] == b'\n' {
            if data[from] == b'<' {
                if let Some(end) = find(data, from, b'>') {
                    from = end + 1;
                }
            }
            if strip_timestamps && from < len && data[from] == b'[' {
                if let Some(end) = find(data, from, b']') {
                    from = end + 1;
                    if from < len && data[from] == b' ' {
                        from += 1;
                    }
                }
            }
            if from >= len {
                break;
            }
        }
        data[to] = data[from];
        to += 1;
        from += 1;
    }

    data.truncate(to);
}

fn find(data: &[u8], start: usize, needle: u8) -> Option<usize> {
    data[start..]
        .iter()
        .position(|&b| b == needle)
        .map(|pos| start + pos)
}

/// Write a block verbatim, terminating it with a newline if needed
pub fn write_block<W: Write>(out: &mut W, data: &[u8]) -> io::Result<()> {
    if let Some(&last) = data.last() {
        out.write_all(data)?;
        if last != b'\n' {
            out.write_all(b"\n")?;
        }
    }
    out.flush()
}
