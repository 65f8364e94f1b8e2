//! Scoped, reversible redirection of the standard streams to files.
//!
//! ```no_run
//! use std::io::Write;
//! use stdio_guard::{ChannelSlot, RedirectGuard};
//!
//! # fn main() -> Result<(), stdio_guard::RedirectError> {
//! {
//!     let _guard = RedirectGuard::create("out.txt", ChannelSlot::Output)?;
//!     std::io::stdout().write_all(b"into the file").ok();
//! }
//! println!("back on the terminal");
//! # Ok(())
//! # }
//! ```

pub mod backup;
pub mod config;
pub mod error;
pub mod file;
pub mod guard;
pub mod logging;
pub mod retry;
pub mod slot;
pub mod sys;

use std::path::Path;

pub use backup::StreamBackup;
pub use error::{InstallPhase, RedirectError};
pub use file::{FileHandle, WritePolicy};
pub use guard::{RedirectGuard, RedirectOptions, RestoreFailurePolicy};
pub use slot::{AccessMode, ChannelSlot, ParseSlotError};
pub use sys::{NativeTable, StreamTable};

/// Redirect `slot` to the file at `path` until the returned guard drops.
pub fn redirect(path: impl AsRef<Path>, slot: ChannelSlot) -> Result<RedirectGuard, RedirectError> {
    RedirectGuard::create(path, slot)
}
