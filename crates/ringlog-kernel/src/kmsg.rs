use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use tracing::debug;

/// Path to the kernel message device
pub const KMSG_DEVICE_PATH: &str = "/dev/kmsg";

/// Largest record the kernel hands out in one read (CONSOLE_EXT_LOG_MAX)
pub const READ_BUF_SIZE: usize = 8192;

/// A channel that yields one whole log record per read
pub trait RecordChannel {
    /// Read the next record into `buf`, returning its length.
    ///
    /// Errors carry the raw OS error so callers can tell a moved buffer
    /// (`EPIPE`) or an old kernel (`EINVAL`) apart from real failures.
    fn read_record(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Open handle on `/dev/kmsg`, closed on drop
#[derive(Debug)]
pub struct Kmsg {
    file: File,
}

impl Kmsg {
    /// Open the device. Without `follow` the handle is non-blocking, so reads
    /// stop with `EAGAIN` once the retained backlog is drained.
    pub fn open(path: impl AsRef<Path>, follow: bool) -> io::Result<Self> {
        let path = path.as_ref();
        let mut options = OpenOptions::new();
        options.read(true);
        if !follow {
            options.custom_flags(libc::O_NONBLOCK);
        }
        let file = options.open(path)?;

        debug!(path = %path.display(), follow, "Opened kmsg device");

        Ok(Self { file })
    }
}

impl RecordChannel for Kmsg {
    fn read_record(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}
