//! Kernel log interfaces for ringlog
//!
//! This crate wraps the two ways the kernel exposes its log ring buffer:
//! the structured `/dev/kmsg` device and the legacy `syslog(2)` control call.
//! Both are expressed as small traits so the readers above them can be driven
//! by fakes in tests.

mod kmsg;
mod syslog;

pub use kmsg::{KMSG_DEVICE_PATH, Kmsg, READ_BUF_SIZE, RecordChannel};
pub use syslog::{KernelLog, Klogctl};
