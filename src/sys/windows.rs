use std::fs::File;
use std::io;
use std::os::windows::io::{AsRawHandle, IntoRawHandle};

use windows_sys::Win32::Foundation::{CloseHandle, HANDLE, INVALID_HANDLE_VALUE};
use windows_sys::Win32::System::Console::{
    GetStdHandle, SetStdHandle, STD_ERROR_HANDLE, STD_HANDLE, STD_INPUT_HANDLE,
    STD_OUTPUT_HANDLE,
};

use super::StreamTable;
use crate::file::FileHandle;
use crate::slot::ChannelSlot;

/// Per-process standard handle table (`GetStdHandle` / `SetStdHandle`).
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsTable;

/// Handle value a slot held at capture time.
///
/// The table never owns its entries, so replacing one does not close the
/// previous handle; holding the value is enough to restore it. A null value
/// (process without that standard handle) is restored as null.
#[derive(Debug)]
pub struct StdHandle(HANDLE);

// The value is only ever handed back to SetStdHandle.
unsafe impl Send for StdHandle {}

fn std_id(slot: ChannelSlot) -> STD_HANDLE {
    match slot {
        ChannelSlot::Input => STD_INPUT_HANDLE,
        ChannelSlot::Output => STD_OUTPUT_HANDLE,
        ChannelSlot::Error => STD_ERROR_HANDLE,
    }
}

fn set_std_handle(slot: ChannelSlot, handle: HANDLE) -> io::Result<()> {
    if unsafe { SetStdHandle(std_id(slot), handle) } == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub(crate) fn close_file(file: File) -> io::Result<()> {
    let handle = file.into_raw_handle() as HANDLE;
    if unsafe { CloseHandle(handle) } == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

impl StreamTable for WindowsTable {
    type Backup = StdHandle;
    type Installed = FileHandle;

    fn capture(&self, slot: ChannelSlot) -> io::Result<StdHandle> {
        let handle = unsafe { GetStdHandle(std_id(slot)) };
        if handle == INVALID_HANDLE_VALUE {
            return Err(io::Error::last_os_error());
        }
        Ok(StdHandle(handle))
    }

    fn install(&self, slot: ChannelSlot, file: FileHandle) -> io::Result<FileHandle> {
        set_std_handle(slot, file.as_raw_handle() as HANDLE)?;
        Ok(file)
    }

    fn restore(&self, slot: ChannelSlot, backup: &StdHandle) -> io::Result<()> {
        set_std_handle(slot, backup.0)
    }

    fn release(&self, slot: ChannelSlot, _backup: StdHandle) {
        tracing::trace!(slot = slot.name(), "Released borrowed std handle");
    }
}
