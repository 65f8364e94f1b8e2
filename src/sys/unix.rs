use std::fs::File;
use std::io;
use std::os::unix::io::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};

use super::StreamTable;
use crate::file::FileHandle;
use crate::retry::retry_interrupted;
use crate::slot::ChannelSlot;

/// File-descriptor stream table (fds 0, 1 and 2).
#[derive(Debug, Default, Clone, Copy)]
pub struct UnixTable;

fn slot_fd(slot: ChannelSlot) -> RawFd {
    match slot {
        ChannelSlot::Input => libc::STDIN_FILENO,
        ChannelSlot::Output => libc::STDOUT_FILENO,
        ChannelSlot::Error => libc::STDERR_FILENO,
    }
}

fn cvt(ret: libc::c_int) -> io::Result<libc::c_int> {
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret)
    }
}

fn dup2(src: RawFd, slot: ChannelSlot) -> io::Result<()> {
    let dst = slot_fd(slot);
    retry_interrupted(|| cvt(unsafe { libc::dup2(src, dst) }))?;
    Ok(())
}

/// Close a descriptor once, reporting the result. EINTR is not retried:
/// the descriptor is released by the kernel either way.
fn close_fd(fd: OwnedFd) -> io::Result<()> {
    let raw = fd.into_raw_fd();
    cvt(unsafe { libc::close(raw) })?;
    Ok(())
}

pub(crate) fn close_file(file: File) -> io::Result<()> {
    close_fd(OwnedFd::from(file))
}

impl StreamTable for UnixTable {
    type Backup = OwnedFd;
    type Installed = ();

    fn capture(&self, slot: ChannelSlot) -> io::Result<OwnedFd> {
        // Close-on-exec so children spawned while redirected never inherit
        // a stray copy of the original target.
        let fd = retry_interrupted(|| {
            cvt(unsafe { libc::fcntl(slot_fd(slot), libc::F_DUPFD_CLOEXEC, 0) })
        })?;
        Ok(unsafe { OwnedFd::from_raw_fd(fd) })
    }

    fn install(&self, slot: ChannelSlot, file: FileHandle) -> io::Result<()> {
        dup2(file.as_raw_fd(), slot)
        // `file` drops here; the slot keeps its own descriptor.
    }

    fn restore(&self, slot: ChannelSlot, backup: &OwnedFd) -> io::Result<()> {
        dup2(backup.as_raw_fd(), slot)
    }

    fn release(&self, slot: ChannelSlot, backup: OwnedFd) {
        if let Err(err) = close_fd(backup) {
            tracing::warn!(slot = slot.name(), "Failed to close backup descriptor: {}", err);
        }
    }
}
