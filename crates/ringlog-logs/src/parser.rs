use std::str::FromStr;

use ringlog_types::LogRecord;

/// Decoder for `/dev/kmsg` records
///
/// A record reads `<facpri>,<seq>,<timestamp>[,<flags>...];<text>\n`,
/// optionally followed by continuation lines such as ` SUBSYSTEM=usb`.
pub struct RecordParser;

impl RecordParser {
    /// Decode one raw record. Returns `None` for anything that does not carry
    /// the required header; callers skip those and keep reading.
    pub fn parse(raw: &[u8]) -> Option<LogRecord> {
        let split = raw.iter().position(|&b| b == b';')?;
        let (header, rest) = (&raw[..split], &raw[split + 1..]);

        let mut fields = header.split(|&b| b == b',');
        let facility_priority: u32 = Self::number(fields.next()?)?;
        // Sequence number must be present but is not used
        let _sequence: u64 = Self::number(fields.next()?)?;
        let timestamp_micros: u64 = Self::number(fields.next()?)?;

        // Drop continuation lines after the message text
        let text = match rest.iter().position(|&b| b == b'\n') {
            Some(end) => &rest[..end],
            None => rest,
        };

        Some(LogRecord::new(
            facility_priority,
            timestamp_micros,
            text.to_vec(),
        ))
    }

    fn number<T: FromStr>(field: &[u8]) -> Option<T> {
        if field.is_empty() || !field.iter().all(u8::is_ascii_digit) {
            return None;
        }
        std::str::from_utf8(field).ok()?.parse().ok()
    }
}
