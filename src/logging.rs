//! Log output: stderr in debug mode, the system log otherwise.

use std::ffi::{CStr, CString};
use std::io;

use libc::c_int;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

const SYSLOG_IDENT: &CStr = c"sentinel-httpd";

pub fn init(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_target(false)
            .with_level(true)
            .with_max_level(Level::DEBUG)
            .with_writer(io::stderr)
            .init();
    } else {
        Syslog::open();
        tracing_subscriber::fmt()
            .with_target(false)
            .with_level(true)
            .with_ansi(false)
            .without_time()
            .with_max_level(Level::INFO)
            .with_writer(Syslog)
            .init();
    }
}

/// Sends each formatted event to `syslog(3)` as one record.
#[derive(Debug, Clone, Copy)]
pub struct Syslog;

impl Syslog {
    /// Connects right away so logging keeps working after a chroot.
    pub fn open() {
        // SAFETY: the identity string is 'static.
        unsafe {
            libc::openlog(SYSLOG_IDENT.as_ptr(), libc::LOG_PID | libc::LOG_NDELAY, libc::LOG_DAEMON);
        }
    }
}

impl<'a> MakeWriter<'a> for Syslog {
    type Writer = SyslogRecord;

    fn make_writer(&'a self) -> Self::Writer {
        SyslogRecord::new(libc::LOG_INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        SyslogRecord::new(priority(meta.level()))
    }
}

pub fn priority(level: &Level) -> c_int {
    match *level {
        Level::ERROR => libc::LOG_ERR,
        Level::WARN => libc::LOG_WARNING,
        Level::INFO => libc::LOG_INFO,
        Level::DEBUG | Level::TRACE => libc::LOG_DEBUG,
    }
}

/// Buffers one event; the record is sent when dropped.
pub struct SyslogRecord {
    priority: c_int,
    buf: Vec<u8>,
}

impl SyslogRecord {
    fn new(priority: c_int) -> Self {
        Self {
            priority,
            buf: Vec::with_capacity(256),
        }
    }
}

impl io::Write for SyslogRecord {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for SyslogRecord {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let text = text.trim_end().replace('\0', "");
        if text.is_empty() {
            return;
        }
        let Ok(message) = CString::new(text) else {
            return;
        };
        // SAFETY: both strings are NUL-terminated and outlive the call.
        unsafe { libc::syslog(self.priority, c"%s".as_ptr(), message.as_ptr()) };
    }
}
