use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

/// One of the three standard channels of the process.
///
/// The slot names OS-owned global state; it is passed explicitly to every
/// operation that reads or replaces that state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelSlot {
    Input,
    Output,
    Error,
}

/// How a redirect target file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
}

impl ChannelSlot {
    pub const ALL: [ChannelSlot; 3] = [ChannelSlot::Input, ChannelSlot::Output, ChannelSlot::Error];

    /// Access mode a file needs to stand in for this channel.
    pub fn access_mode(self) -> AccessMode {
        match self {
            ChannelSlot::Input => AccessMode::Read,
            ChannelSlot::Output | ChannelSlot::Error => AccessMode::Write,
        }
    }

    /// Conventional stream name (`stdin`, `stdout`, `stderr`).
    pub fn name(self) -> &'static str {
        match self {
            ChannelSlot::Input => "stdin",
            ChannelSlot::Output => "stdout",
            ChannelSlot::Error => "stderr",
        }
    }

    /// Flush Rust's own buffer for this channel so pending bytes reach the
    /// target that was live when they were written.
    ///
    /// Input has no write buffer; this is a no-op for it.
    pub(crate) fn flush_std(self) {
        let result = match self {
            ChannelSlot::Input => Ok(()),
            ChannelSlot::Output => io::stdout().flush(),
            ChannelSlot::Error => io::stderr().flush(),
        };
        if let Err(err) = result {
            tracing::warn!(slot = self.name(), "Failed to flush std buffer: {}", err);
        }
    }
}

impl fmt::Display for ChannelSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown channel '{0}' (expected stdin, stdout or stderr)")]
pub struct ParseSlotError(String);

impl FromStr for ChannelSlot {
    type Err = ParseSlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdin" | "input" | "in" => Ok(ChannelSlot::Input),
            "stdout" | "output" | "out" => Ok(ChannelSlot::Output),
            "stderr" | "error" | "err" => Ok(ChannelSlot::Error),
            _ => Err(ParseSlotError(s.to_string())),
        }
    }
}
