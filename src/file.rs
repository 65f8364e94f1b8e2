//! Target files for a redirect.

use std::fs::{File, OpenOptions};
use std::mem::ManuallyDrop;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RedirectError;
use crate::retry::retry_interrupted;
use crate::slot::AccessMode;
use crate::sys;

/// What happens to an existing file opened for write-mode redirection.
///
/// A missing file is always created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritePolicy {
    /// Discard previous contents.
    #[default]
    Truncate,
    /// Keep previous contents and write after them.
    Append,
}

/// One freshly opened file, owned exclusively.
///
/// The raw handle is exposed for duplication into a standard stream slot
/// only; no I/O goes through this type.
#[derive(Debug)]
pub struct FileHandle {
    file: ManuallyDrop<File>,
    mode: AccessMode,
    path: PathBuf,
}

impl FileHandle {
    /// Open `path` for `mode`. Write mode creates and truncates.
    pub fn open(path: impl AsRef<Path>, mode: AccessMode) -> Result<Self, RedirectError> {
        Self::open_with(path, mode, WritePolicy::default())
    }

    /// Open `path` for `mode`; `policy` only applies to write mode.
    ///
    /// Read mode requires the file to exist.
    pub fn open_with(
        path: impl AsRef<Path>,
        mode: AccessMode,
        policy: WritePolicy,
    ) -> Result<Self, RedirectError> {
        let path = path.as_ref();
        let mut options = OpenOptions::new();
        match (mode, policy) {
            (AccessMode::Read, _) => {
                options.read(true);
            }
            (AccessMode::Write, WritePolicy::Truncate) => {
                options.write(true).create(true).truncate(true);
            }
            (AccessMode::Write, WritePolicy::Append) => {
                options.append(true).create(true);
            }
        }

        let file = retry_interrupted(|| options.open(path)).map_err(|source| {
            RedirectError::OpenFailed {
                path: path.to_path_buf(),
                source,
            }
        })?;

        Ok(Self {
            file: ManuallyDrop::new(file),
            mode,
            path: path.to_path_buf(),
        })
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileHandle {
    fn drop(&mut self) {
        // SAFETY: `file` is never touched again after this point.
        let file = unsafe { ManuallyDrop::take(&mut self.file) };
        if let Err(err) = sys::close_file(file) {
            tracing::warn!(path = %self.path.display(), "Failed to close file: {}", err);
        }
    }
}

#[cfg(unix)]
impl std::os::unix::io::AsRawFd for FileHandle {
    fn as_raw_fd(&self) -> std::os::unix::io::RawFd {
        std::os::unix::io::AsRawFd::as_raw_fd(&*self.file)
    }
}

#[cfg(windows)]
impl std::os::windows::io::AsRawHandle for FileHandle {
    fn as_raw_handle(&self) -> std::os::windows::io::RawHandle {
        std::os::windows::io::AsRawHandle::as_raw_handle(&*self.file)
    }
}
