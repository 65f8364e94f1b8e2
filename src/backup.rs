use crate::error::{InstallPhase, RedirectError};
use crate::slot::ChannelSlot;
use crate::sys::{NativeTable, StreamTable};

/// Independent reference to what a slot pointed at when it was captured.
///
/// Safe to hold after the slot's live entry has been replaced. Released
/// when dropped.
pub struct StreamBackup<T: StreamTable = NativeTable> {
    table: T,
    slot: ChannelSlot,
    handle: Option<T::Backup>,
}

impl StreamBackup<NativeTable> {
    /// Capture the current target of `slot` from the process stream table.
    pub fn capture(slot: ChannelSlot) -> Result<Self, RedirectError> {
        Self::capture_with(NativeTable::default(), slot)
    }
}

impl<T: StreamTable> StreamBackup<T> {
    pub fn capture_with(table: T, slot: ChannelSlot) -> Result<Self, RedirectError> {
        let handle = table
            .capture(slot)
            .map_err(|source| RedirectError::DuplicateFailed { slot, source })?;
        tracing::trace!(slot = slot.name(), "Captured stream backup");
        Ok(Self {
            table,
            slot,
            handle: Some(handle),
        })
    }

    /// Point the slot back at the captured target.
    ///
    /// May be called more than once; every call installs the same target.
    pub fn restore(&self) -> Result<(), RedirectError> {
        let Some(handle) = self.handle.as_ref() else {
            return Ok(());
        };
        self.table
            .restore(self.slot, handle)
            .map_err(|source| RedirectError::InstallFailed {
                slot: self.slot,
                phase: InstallPhase::Restore,
                source,
            })
    }

    pub fn slot(&self) -> ChannelSlot {
        self.slot
    }

    pub(crate) fn table(&self) -> &T {
        &self.table
    }

    /// Give up the backup without releasing it.
    ///
    /// Used when the slot could not be restored: the captured target stays
    /// open for the rest of the process.
    pub(crate) fn leak(mut self) {
        if let Some(handle) = self.handle.take() {
            std::mem::forget(handle);
        }
        tracing::warn!(slot = self.slot.name(), "Leaked stream backup after failed restore");
    }
}

impl<T: StreamTable> Drop for StreamBackup<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.table.release(self.slot, handle);
        }
    }
}

impl<T: StreamTable> std::fmt::Debug for StreamBackup<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamBackup")
            .field("slot", &self.slot)
            .field("held", &self.handle.is_some())
            .finish()
    }
}
