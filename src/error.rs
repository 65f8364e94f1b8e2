//! Error types for redirect and restore operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::slot::ChannelSlot;

/// Which step was pointing a slot at a new handle when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPhase {
    /// Installing the target file at guard creation.
    Redirect,
    /// Installing the backup again at guard release.
    Restore,
}

impl std::fmt::Display for InstallPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstallPhase::Redirect => f.write_str("redirect"),
            InstallPhase::Restore => f.write_str("restore"),
        }
    }
}

/// Errors that can occur while redirecting a standard channel.
#[derive(Debug, Error)]
pub enum RedirectError {
    /// Target file could not be opened
    #[error("Failed to open '{path}': {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Current target of the slot could not be duplicated
    #[error("Failed to back up {slot}: {source}")]
    DuplicateFailed {
        slot: ChannelSlot,
        #[source]
        source: io::Error,
    },

    /// Slot could not be pointed at a new handle
    #[error("Failed to install handle into {slot} during {phase}: {source}")]
    InstallFailed {
        slot: ChannelSlot,
        phase: InstallPhase,
        #[source]
        source: io::Error,
    },
}

impl RedirectError {
    /// Raw OS error code carried by the underlying I/O error, if any.
    pub fn os_code(&self) -> Option<i32> {
        self.io_error().raw_os_error()
    }

    /// Slot the failure concerns. `OpenFailed` never touches a slot.
    pub fn slot(&self) -> Option<ChannelSlot> {
        match self {
            RedirectError::OpenFailed { .. } => None,
            RedirectError::DuplicateFailed { slot, .. } => Some(*slot),
            RedirectError::InstallFailed { slot, .. } => Some(*slot),
        }
    }

    /// Underlying I/O error of any variant.
    pub fn io_error(&self) -> &io::Error {
        match self {
            RedirectError::OpenFailed { source, .. }
            | RedirectError::DuplicateFailed { source, .. }
            | RedirectError::InstallFailed { source, .. } => source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_failed_carries_path_and_code() {
        let err = RedirectError::OpenFailed {
            path: PathBuf::from("/nope/file.txt"),
            source: io::Error::from_raw_os_error(2),
        };
        assert_eq!(err.os_code(), Some(2));
        assert_eq!(err.slot(), None);
        assert!(err.to_string().starts_with("Failed to open '/nope/file.txt'"));
    }

    #[test]
    fn install_failed_names_slot_and_phase() {
        let err = RedirectError::InstallFailed {
            slot: ChannelSlot::Error,
            phase: InstallPhase::Restore,
            source: io::Error::from_raw_os_error(9),
        };
        assert_eq!(err.slot(), Some(ChannelSlot::Error));
        assert!(err.to_string().contains("into stderr during restore"));
    }

    #[test]
    fn synthetic_errors_have_no_os_code() {
        let err = RedirectError::DuplicateFailed {
            slot: ChannelSlot::Input,
            source: io::Error::new(io::ErrorKind::Other, "table full"),
        };
        assert_eq!(err.os_code(), None);
    }
}
