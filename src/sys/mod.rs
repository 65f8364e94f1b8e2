//! Platform access to the process-wide standard stream table.
//!
//! Unix keeps the table as file descriptors 0/1/2 and redirects by
//! duplicate-and-swap (`dup` / `dup2`). Windows keeps a per-process handle
//! table that is repointed with `SetStdHandle`. Both are expressed through
//! [`StreamTable`]; the implementation for the current target is exported as
//! [`NativeTable`].

use std::io;

use crate::file::FileHandle;
use crate::slot::ChannelSlot;

#[cfg(test)]
pub(crate) mod fake;
#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::UnixTable as NativeTable;
#[cfg(windows)]
pub use windows::WindowsTable as NativeTable;

#[cfg(unix)]
pub(crate) use unix::close_file;
#[cfg(windows)]
pub(crate) use windows::close_file;

/// Capture, install and release operations over the standard stream table.
///
/// Every operation names the slot it touches. Implementations retry calls
/// that report an interrupted system call and surface every other error.
pub trait StreamTable {
    /// Independent reference to whatever a slot resolved to at capture time.
    type Backup;

    /// What has to stay alive while a file is installed in a slot.
    ///
    /// On Unix the slot holds its own descriptor and this is `()`. On
    /// Windows the slot only borrows the file's handle, so the file itself
    /// is kept here until the slot is restored.
    type Installed;

    /// Duplicate the slot's current target.
    fn capture(&self, slot: ChannelSlot) -> io::Result<Self::Backup>;

    /// Point the slot at `file`.
    fn install(&self, slot: ChannelSlot, file: FileHandle) -> io::Result<Self::Installed>;

    /// Point the slot back at a previously captured target.
    fn restore(&self, slot: ChannelSlot, backup: &Self::Backup) -> io::Result<()>;

    /// Release a backup once it is no longer needed. Never fails loudly.
    fn release(&self, slot: ChannelSlot, backup: Self::Backup);
}
