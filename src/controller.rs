//! Backend selection for printing the ring buffer
//!
//! Reading starts on the structured `/dev/kmsg` stream. If the kernel turns
//! out not to support it, the run switches once to the legacy `syslog(2)`
//! bulk read and never goes back.

use std::io::{self, Write};

use ringlog_kernel::{KernelLog, RecordChannel};
use ringlog_logs::{LegacySource, LineFormatter, ReadOutcome, SourceError, StreamSource};
use tracing::debug;

use crate::config::Settings;

/// How a read run finished
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completed {
    /// The structured stream ran to its end
    Stream { records: u64 },
    /// The legacy buffer was printed as one block
    Legacy { bytes: usize },
}

enum State<C> {
    Streaming(StreamSource<C>),
    Legacy,
}

/// Print the ring buffer to `out`.
///
/// `open` is called once to open the structured device. A missing device, or
/// an "unsupported" read before any record was printed, switches to the
/// legacy source.
pub fn run<C, O, K, W>(
    open: O,
    klog: &K,
    settings: &Settings,
    out: &mut W,
) -> Result<Completed, SourceError>
where
    C: RecordChannel,
    O: FnOnce() -> io::Result<C>,
    K: KernelLog,
    W: Write,
{
    let formatter = LineFormatter::new(settings.format);

    let mut state = match open() {
        Ok(channel) => State::Streaming(StreamSource::new(channel)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(
                path = %settings.kmsg_path.display(),
                "kmsg device missing, using legacy ring buffer read"
            );
            State::Legacy
        }
        Err(source) => {
            return Err(SourceError::Open {
                path: settings.kmsg_path.clone(),
                source,
            });
        }
    };

    loop {
        state = match state {
            State::Streaming(mut source) => match source.read_next() {
                ReadOutcome::Record(record) => {
                    formatter
                        .write_record(out, &record)
                        .map_err(SourceError::Write)?;
                    State::Streaming(source)
                }
                ReadOutcome::Malformed | ReadOutcome::Retry => State::Streaming(source),
                ReadOutcome::Eof => {
                    out.flush().map_err(SourceError::Write)?;
                    if settings.clear_after_read {
                        klog.clear().map_err(SourceError::Clear)?;
                    }
                    return Ok(Completed::Stream {
                        records: source.decoded(),
                    });
                }
                // Every decoded record has been written by now
                ReadOutcome::Unsupported(err) if source.decoded() == 0 => {
                    debug!(
                        error = %err,
                        "kmsg reads unsupported, using legacy ring buffer read"
                    );
                    // Dropping the source closes the device
                    State::Legacy
                }
                ReadOutcome::Unsupported(err) | ReadOutcome::Fatal(err) => {
                    return Err(SourceError::StreamRead(err));
                }
            },
            State::Legacy => {
                let legacy =
                    LegacySource::new(klog, settings.buffer_size, settings.clear_after_read);
                let bytes = legacy.run(&settings.format, out)?;
                return Ok(Completed::Legacy { bytes });
            }
        };
    }
}
