//! # Output Configuration
//!
//! Controls how human-facing command output (the `validate` report) looks.
//! Document output is never decorated.
//!
//! Color and emoji follow the `--color=never|always|auto` flag. In auto mode
//! they are turned off by `NO_COLOR` (any value), `CLICOLOR=0` or `TERM=dumb`,
//! forced on by `CLICOLOR_FORCE=1`, and otherwise follow what `console`
//! detects for stdout.

use std::env;
use std::fmt;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Resolve the `--color` flag against the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };
        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stdout().features().colors_supported()
    }

    /// Render a status marker for this configuration.
    pub fn marker(&self, status: Status) -> Marker {
        Marker {
            status,
            use_color: self.use_color,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Line prefixes used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Scan,
    Ok,
    Warn,
    Error,
    Info,
}

impl Status {
    fn emoji(self) -> &'static str {
        match self {
            Status::Scan => "🔍",
            Status::Ok => "✅",
            Status::Warn => "⚠️",
            Status::Error => "❌",
            Status::Info => "📊",
        }
    }

    fn plain(self) -> &'static str {
        match self {
            Status::Scan => "[SCAN]",
            Status::Ok => "[OK]",
            Status::Warn => "[WARN]",
            Status::Error => "[ERR]",
            Status::Info => "[INFO]",
        }
    }
}

/// A [`Status`] rendered as emoji or as a plain-text tag.
#[derive(Debug, Clone, Copy)]
pub struct Marker {
    status: Status,
    use_color: bool,
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.use_color {
            f.write_str(self.status.emoji())
        } else {
            f.write_str(self.status.plain())
        }
    }
}
