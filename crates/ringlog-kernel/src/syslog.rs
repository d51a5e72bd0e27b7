use std::io;

use tracing::trace;

// syslog(2) actions, see include/linux/syslog.h
const SYSLOG_ACTION_READ_ALL: libc::c_int = 3;
const SYSLOG_ACTION_READ_CLEAR: libc::c_int = 4;
const SYSLOG_ACTION_CLEAR: libc::c_int = 5;
const SYSLOG_ACTION_CONSOLE_LEVEL: libc::c_int = 8;
const SYSLOG_ACTION_SIZE_BUFFER: libc::c_int = 10;

/// The kernel log control channel
pub trait KernelLog {
    /// Size of the kernel log buffer in bytes
    fn buffer_size(&self) -> io::Result<usize>;

    /// Copy the retained log into `buf`, optionally clearing it afterwards.
    /// Returns the number of bytes written.
    fn read_all(&self, buf: &mut [u8], clear: bool) -> io::Result<usize>;

    /// Set the console log level (1-9)
    fn set_console_level(&self, level: u8) -> io::Result<()>;

    /// Discard everything in the ring buffer
    fn clear(&self) -> io::Result<()>;
}

/// `KernelLog` backed by the `syslog(2)` system call
#[derive(Clone, Copy, Debug, Default)]
pub struct Klogctl;

impl KernelLog for Klogctl {
    fn buffer_size(&self) -> io::Result<usize> {
        syslog(SYSLOG_ACTION_SIZE_BUFFER, std::ptr::null_mut(), 0)
    }

    fn read_all(&self, buf: &mut [u8], clear: bool) -> io::Result<usize> {
        let action = if clear {
            SYSLOG_ACTION_READ_CLEAR
        } else {
            SYSLOG_ACTION_READ_ALL
        };
        let len = buf.len().min(libc::c_int::MAX as usize) as libc::c_int;
        syslog(action, buf.as_mut_ptr().cast(), len)
    }

    fn set_console_level(&self, level: u8) -> io::Result<()> {
        syslog(
            SYSLOG_ACTION_CONSOLE_LEVEL,
            std::ptr::null_mut(),
            libc::c_int::from(level),
        )
        .map(|_| ())
    }

    fn clear(&self) -> io::Result<()> {
        syslog(SYSLOG_ACTION_CLEAR, std::ptr::null_mut(), 0).map(|_| ())
    }
}

#[cfg(target_os = "linux")]
fn syslog(action: libc::c_int, buf: *mut libc::c_char, len: libc::c_int) -> io::Result<usize> {
    trace!(action, len, "syslog(2)");
    // SAFETY: `buf` is either null (for actions that ignore it) or points to
    // at least `len` writable bytes borrowed from the caller.
    let ret = unsafe { libc::syscall(libc::SYS_syslog, action, buf, len) };
    if ret < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret as usize)
    }
}

#[cfg(not(target_os = "linux"))]
fn syslog(action: libc::c_int, _buf: *mut libc::c_char, len: libc::c_int) -> io::Result<usize> {
    trace!(action, len, "syslog(2) unavailable");
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "kernel log control is only available on Linux",
    ))
}
