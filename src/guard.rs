//! Scoped redirection of one standard channel to a file.
//!
//! A [`RedirectGuard`] repoints its slot at a file when created and points it
//! back at the captured original when dropped. Guards over different slots
//! are independent. Guards over the same slot must be dropped in reverse
//! order of creation; the stream table is process-wide state and nothing
//! here serializes access to it across threads.
//!
//! Bytes already sitting in `std::io::stdin()`'s buffer when Input is
//! redirected are still returned before the file's contents.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backup::StreamBackup;
use crate::error::{InstallPhase, RedirectError};
use crate::file::{FileHandle, WritePolicy};
use crate::slot::ChannelSlot;
use crate::sys::{NativeTable, StreamTable};

/// What a guard does when restoring its slot fails inside `Drop`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestoreFailurePolicy {
    /// Report through `tracing` at error level and carry on.
    #[default]
    Log,
    /// Report, then abort the process.
    Abort,
}

/// Options applied when creating a guard.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectOptions {
    pub write_policy: WritePolicy,
    pub on_restore_failure: RestoreFailurePolicy,
}

/// Keeps one channel slot pointed at a file for the guard's lifetime.
#[must_use = "the redirect is undone as soon as the guard is dropped"]
pub struct RedirectGuard<T: StreamTable = NativeTable> {
    slot: ChannelSlot,
    path: PathBuf,
    policy: RestoreFailurePolicy,
    installed: Option<T::Installed>,
    backup: Option<StreamBackup<T>>,
}

impl RedirectGuard<NativeTable> {
    /// Redirect `slot` to the file at `path`.
    ///
    /// Input reads from an existing file. Output and Error write to a file
    /// that is created if missing and truncated otherwise.
    pub fn create(path: impl AsRef<Path>, slot: ChannelSlot) -> Result<Self, RedirectError> {
        Self::create_with(path, slot, &RedirectOptions::default())
    }

    pub fn create_with(
        path: impl AsRef<Path>,
        slot: ChannelSlot,
        options: &RedirectOptions,
    ) -> Result<Self, RedirectError> {
        Self::create_in(NativeTable::default(), path, slot, options)
    }
}

impl<T: StreamTable> RedirectGuard<T> {
    /// Redirect `slot` through an explicit stream table.
    ///
    /// The backup is captured before anything else happens. If the file
    /// cannot be opened the slot is never touched. If installing the file
    /// fails the slot is rolled back to the backup before the error is
    /// returned.
    pub fn create_in(
        table: T,
        path: impl AsRef<Path>,
        slot: ChannelSlot,
        options: &RedirectOptions,
    ) -> Result<Self, RedirectError> {
        let path = path.as_ref();
        let backup = StreamBackup::capture_with(table, slot)?;
        let file = FileHandle::open_with(path, slot.access_mode(), options.write_policy)?;

        slot.flush_std();
        let installed = match backup.table().install(slot, file) {
            Ok(installed) => installed,
            Err(source) => {
                if let Err(err) = backup.restore() {
                    tracing::error!(slot = slot.name(), "Rollback after failed redirect failed: {}", err);
                }
                return Err(RedirectError::InstallFailed {
                    slot,
                    phase: InstallPhase::Redirect,
                    source,
                });
            }
        };

        tracing::debug!(slot = slot.name(), path = %path.display(), "Redirected");
        Ok(Self {
            slot,
            path: path.to_path_buf(),
            policy: options.on_restore_failure,
            installed: Some(installed),
            backup: Some(backup),
        })
    }

    /// Undo the redirect now and report the outcome.
    ///
    /// After a successful call the guard is inert and dropping it does
    /// nothing. After a failed call the guard stays active and `Drop` makes
    /// one more attempt.
    pub fn restore(&mut self) -> Result<(), RedirectError> {
        let Some(backup) = self.backup.as_ref() else {
            return Ok(());
        };

        self.slot.flush_std();
        backup.restore()?;

        // The slot no longer refers to the file, so whatever kept it alive
        // can go, followed by the backup itself.
        drop(self.installed.take());
        drop(self.backup.take());
        tracing::debug!(slot = self.slot.name(), path = %self.path.display(), "Restored");
        Ok(())
    }

    /// Whether the slot is still pointed at the file.
    pub fn is_active(&self) -> bool {
        self.backup.is_some()
    }

    pub fn slot(&self) -> ChannelSlot {
        self.slot
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T: StreamTable> Drop for RedirectGuard<T> {
    fn drop(&mut self) {
        if !self.is_active() {
            return;
        }
        if let Err(err) = self.restore() {
            tracing::error!(
                slot = self.slot.name(),
                path = %self.path.display(),
                "Failed to restore redirected stream: {}",
                err
            );
            if self.policy == RestoreFailurePolicy::Abort {
                std::process::abort();
            }
            // The slot still refers to the file and the backup is the only
            // way back to the original target: neither may be closed.
            std::mem::forget(self.installed.take());
            if let Some(backup) = self.backup.take() {
                backup.leak();
            }
        }
    }
}

impl<T: StreamTable> std::fmt::Debug for RedirectGuard<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectGuard")
            .field("slot", &self.slot)
            .field("path", &self.path)
            .field("active", &self.is_active())
            .finish()
    }
}
