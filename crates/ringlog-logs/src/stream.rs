use std::io;

use ringlog_kernel::{READ_BUF_SIZE, RecordChannel};
use ringlog_types::LogRecord;
use tracing::{debug, trace};

use crate::parser::RecordParser;

/// Result of one read from the structured log device
#[derive(Debug)]
pub enum ReadOutcome {
    /// A decoded record
    Record(LogRecord),
    /// The read succeeded but the record could not be decoded
    Malformed,
    /// The buffer moved under us (`EPIPE`) or the read was interrupted;
    /// the next read returns the next available entry
    Retry,
    /// The kernel does not support structured reads (pre-3.5 `EINVAL`)
    Unsupported(io::Error),
    /// Backlog drained (`EAGAIN` in non-blocking mode) or end of file
    Eof,
    /// Any other read failure
    Fatal(io::Error),
}

impl ReadOutcome {
    /// Classify a failed read
    pub fn from_error(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::BrokenPipe | io::ErrorKind::Interrupted => Self::Retry,
            io::ErrorKind::InvalidInput => Self::Unsupported(err),
            io::ErrorKind::WouldBlock => Self::Eof,
            _ => Self::Fatal(err),
        }
    }
}

/// Reads one record per call from a structured log channel
pub struct StreamSource<C> {
    /// The open device
    channel: C,

    /// Scratch space for one raw record
    buf: Vec<u8>,

    /// Records decoded so far
    decoded: u64,
}

impl<C: RecordChannel> StreamSource<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            buf: vec![0; READ_BUF_SIZE],
            decoded: 0,
        }
    }

    /// Perform exactly one read and classify the result
    pub fn read_next(&mut self) -> ReadOutcome {
        match self.channel.read_record(&mut self.buf) {
            Ok(0) => ReadOutcome::Eof,
            Ok(len) => {
                let raw = &self.buf[..len];
                match RecordParser::parse(raw) {
                    Some(record) => {
                        self.decoded += 1;
                        ReadOutcome::Record(record)
                    }
                    None => {
                        debug!(
                            record = %String::from_utf8_lossy(raw).trim_end(),
                            "Skipping undecodable kmsg record"
                        );
                        ReadOutcome::Malformed
                    }
                }
            }
            Err(err) => {
                let outcome = ReadOutcome::from_error(err);
                if let ReadOutcome::Retry = outcome {
                    trace!("kmsg read interrupted, retrying");
                }
                outcome
            }
        }
    }

    /// Number of records successfully decoded
    pub fn decoded(&self) -> u64 {
        self.decoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Channel that replays a fixed script of reads
    struct ScriptedChannel {
        reads: VecDeque<io::Result<Vec<u8>>>,
        calls: usize,
    }

    impl ScriptedChannel {
        fn new(reads: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                reads: reads.into(),
                calls: 0,
            }
        }
    }

    impl RecordChannel for ScriptedChannel {
        fn read_record(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.calls += 1;
            match self.reads.pop_front() {
                Some(Ok(data)) => {
                    buf[..data.len()].copy_from_slice(&data);
                    Ok(data.len())
                }
                Some(Err(err)) => Err(err),
                None => Ok(0),
            }
        }
    }

    fn os_error(code: i32) -> io::Error {
        io::Error::from_raw_os_error(code)
    }

    #[test]
    fn test_record_then_eof() {
        let channel = ScriptedChannel::new(vec![Ok(b"6,1,1000000,-;hello\n".to_vec())]);
        let mut source = StreamSource::new(channel);

        match source.read_next() {
            ReadOutcome::Record(record) => assert_eq!(record.text, b"hello"),
            other => panic!("expected record, got {:?}", other),
        }
        assert!(matches!(source.read_next(), ReadOutcome::Eof));
        assert_eq!(source.decoded(), 1);
    }

    #[test]
    fn test_malformed_does_not_end_stream() {
        let channel = ScriptedChannel::new(vec![
            Ok(b"garbage without header".to_vec()),
            Ok(b"6,2,5,-;after garbage\n".to_vec()),
        ]);
        let mut source = StreamSource::new(channel);

        assert!(matches!(source.read_next(), ReadOutcome::Malformed));
        assert!(matches!(source.read_next(), ReadOutcome::Record(_)));
        assert_eq!(source.decoded(), 1);
    }

    #[test]
    fn test_error_classification() {
        assert!(matches!(
            ReadOutcome::from_error(os_error(libc::EPIPE)),
            ReadOutcome::Retry
        ));
        assert!(matches!(
            ReadOutcome::from_error(os_error(libc::EINTR)),
            ReadOutcome::Retry
        ));
        assert!(matches!(
            ReadOutcome::from_error(os_error(libc::EINVAL)),
            ReadOutcome::Unsupported(_)
        ));
        assert!(matches!(
            ReadOutcome::from_error(os_error(libc::EAGAIN)),
            ReadOutcome::Eof
        ));
        assert!(matches!(
            ReadOutcome::from_error(os_error(libc::EIO)),
            ReadOutcome::Fatal(_)
        ));
    }

    #[test]
    fn test_retry_is_not_counted() {
        let channel = ScriptedChannel::new(vec![
            Err(os_error(libc::EPIPE)),
            Ok(b"6,3,7,-;after the gap\n".to_vec()),
        ]);
        let mut source = StreamSource::new(channel);
        assert!(matches!(source.read_next(), ReadOutcome::Retry));
        assert_eq!(source.decoded(), 0);
        assert!(matches!(source.read_next(), ReadOutcome::Record(_)));
        assert_eq!(source.decoded(), 1);
        assert!(matches!(source.read_next(), ReadOutcome::Eof));
        assert_eq!(source.channel.calls, 3);
    }
}
