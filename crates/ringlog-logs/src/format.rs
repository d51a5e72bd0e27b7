use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{Color, ResetColor, SetForegroundColor};
use ringlog_types::{FormatOptions, LogRecord};

use crate::theme::Theme;

/// Renders decoded records as terminal lines
#[derive(Clone, Copy, Debug)]
pub struct LineFormatter {
    options: FormatOptions,
}

impl LineFormatter {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Write one record as a newline-terminated line
    pub fn write_record<W: Write>(&self, out: &mut W, record: &LogRecord) -> io::Result<()> {
        // There are no level markers on the structured channel, so "raw"
        // means showing the facility/priority the kernel reported.
        if self.options.raw {
            write!(out, "<{}>", record.facility_priority)?;
        }

        if !self.options.suppress_timestamp {
            let (secs, micros) = record.seconds_micros();
            let stamp = format!("[{:5}.{:06}] ", secs, micros);
            self.paint(out, Theme::TIMESTAMP, stamp.as_bytes())?;
        }

        if let Some(subsystem) = record.subsystem() {
            self.paint(out, Theme::SUBSYSTEM, subsystem)?;
        }

        let body = record.body();
        if record.priority().is_severe() {
            self.paint(out, Theme::ERROR, body)?;
        } else {
            out.write_all(body)?;
        }
        out.write_all(b"\n")
    }

    fn paint<W: Write>(&self, out: &mut W, color: Color, bytes: &[u8]) -> io::Result<()> {
        if !self.options.color {
            return out.write_all(bytes);
        }
        queue!(out, SetForegroundColor(color))?;
        out.write_all(bytes)?;
        queue!(out, ResetColor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::bytes::Regex;

    fn plain() -> FormatOptions {
        FormatOptions::default()
    }

    fn colored() -> FormatOptions {
        FormatOptions {
            color: true,
            ..Default::default()
        }
    }

    impl LineFormatter {
        fn render(&self, record: &LogRecord) -> Vec<u8> {
            let mut line = Vec::new();
            self.write_record(&mut line, record).unwrap();
            line
        }
    }

    fn strip_ansi(line: &[u8]) -> Vec<u8> {
        let ansi = Regex::new(r"\x1b\[[0-9;]*m").unwrap();
        ansi.replace_all(line, &b""[..]).into_owned()
    }

    #[test]
    fn test_boot_line_with_subsystem() {
        let record = LogRecord::new(3, 1_000_000, b"k: boot ok".to_vec());

        let line = LineFormatter::new(colored()).render(&record);
        assert_eq!(strip_ansi(&line), b"[    1.000000] k: boot ok\n");

        let line = LineFormatter::new(plain()).render(&record);
        assert_eq!(line, b"[    1.000000] k: boot ok\n");
    }

    #[test]
    fn test_color_disabled_emits_no_escapes() {
        let record = LogRecord::new(0, 42, b"panic: everything".to_vec());
        let line = LineFormatter::new(plain()).render(&record);
        assert!(!line.contains(&0x1b));
    }

    #[test]
    fn test_severity_boundary() {
        let formatter = LineFormatter::new(FormatOptions {
            suppress_timestamp: true,
            color: true,
            ..Default::default()
        });

        let error = formatter.render(&LogRecord::new(3, 0, b"disk failed".to_vec()));
        assert!(error.starts_with(b"\x1b["));
        assert_eq!(strip_ansi(&error), b"disk failed\n");

        let warning = formatter.render(&LogRecord::new(4, 0, b"disk slow".to_vec()));
        assert_eq!(warning, b"disk slow\n");

        // Facility bits do not change the severity
        let user_error = formatter.render(&LogRecord::new(11, 0, b"x".to_vec()));
        assert!(user_error.starts_with(b"\x1b["));
        let user_warning = formatter.render(&LogRecord::new(12, 0, b"x".to_vec()));
        assert_eq!(user_warning, b"x\n");
    }

    #[test]
    fn test_subsystem_colored_separately() {
        let formatter = LineFormatter::new(FormatOptions {
            suppress_timestamp: true,
            color: true,
            ..Default::default()
        });
        let line = formatter.render(&LogRecord::new(6, 0, b"usb 1-1: new device".to_vec()));

        let text = String::from_utf8(line.clone()).unwrap();
        assert!(text.starts_with("\x1b["));
        assert!(text.ends_with("\x1b[0m: new device\n"));
        assert_eq!(strip_ansi(&line), b"usb 1-1: new device\n");
    }

    #[test]
    fn test_raw_prefix() {
        let formatter = LineFormatter::new(FormatOptions {
            raw: true,
            ..Default::default()
        });
        let record = LogRecord::new(14, 2_500_000, b"user message".to_vec());
        let line = formatter.render(&record);
        assert_eq!(line, b"<14>[    2.500000] user message\n");
    }

    #[test]
    fn test_suppress_timestamp() {
        let formatter = LineFormatter::new(FormatOptions {
            suppress_timestamp: true,
            ..Default::default()
        });
        let line = formatter.render(&LogRecord::new(6, 123_456_789, b"hello".to_vec()));
        assert_eq!(line, b"hello\n");
    }

    #[test]
    fn test_wide_timestamp() {
        let record = LogRecord::new(6, 123_456_000_007, b"late".to_vec());
        let line = LineFormatter::new(plain()).render(&record);
        assert_eq!(line, b"[123456.000007] late\n");
    }
}
