use crossterm::style::Color;

/// Colors used for kernel log lines
pub struct Theme;

impl Theme {
    /// `[seconds.micros]` prefix
    pub const TIMESTAMP: Color = Color::DarkGreen;

    /// Leading `subsystem:` tag
    pub const SUBSYSTEM: Color = Color::DarkYellow;

    /// Message text at error priority or worse
    pub const ERROR: Color = Color::DarkRed;
}
