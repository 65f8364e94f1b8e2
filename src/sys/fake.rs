//! In-memory stream table for exercising redirect logic without touching
//! the real process streams.

use std::cell::{RefCell, RefMut};
use std::collections::HashMap;
use std::io;
use std::rc::Rc;

use super::StreamTable;
use crate::file::FileHandle;
use crate::slot::ChannelSlot;

#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub live: HashMap<ChannelSlot, String>,
    pub fail_capture: bool,
    pub fail_install: bool,
    /// Number of upcoming restore calls that fail.
    pub fail_restores: u32,
    pub installs: u32,
    pub restores: u32,
    pub outstanding_backups: i32,
    /// Files currently kept alive by an `Installed` token.
    pub installed_files: i32,
}

/// Stands in for a file the slot borrows; counted until dropped.
#[derive(Debug)]
pub(crate) struct FakeInstalled(FakeTable);

impl Drop for FakeInstalled {
    fn drop(&mut self) {
        self.0.state().installed_files -= 1;
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeTable(Rc<RefCell<FakeState>>);

impl FakeTable {
    pub fn with_terminal() -> Self {
        let table = Self::default();
        {
            let mut state = table.state();
            state.live.insert(ChannelSlot::Input, "tty:in".to_string());
            state.live.insert(ChannelSlot::Output, "tty:out".to_string());
            state.live.insert(ChannelSlot::Error, "tty:err".to_string());
        }
        table
    }

    pub fn state(&self) -> RefMut<'_, FakeState> {
        self.0.borrow_mut()
    }

    pub fn live(&self, slot: ChannelSlot) -> String {
        self.0.borrow().live.get(&slot).cloned().unwrap_or_default()
    }
}

impl StreamTable for FakeTable {
    type Backup = String;
    type Installed = FakeInstalled;

    fn capture(&self, slot: ChannelSlot) -> io::Result<String> {
        let mut state = self.state();
        if state.fail_capture {
            return Err(io::Error::from_raw_os_error(24));
        }
        state.outstanding_backups += 1;
        Ok(state.live.get(&slot).cloned().unwrap_or_default())
    }

    fn install(&self, slot: ChannelSlot, file: FileHandle) -> io::Result<FakeInstalled> {
        let mut state = self.state();
        if state.fail_install {
            // A failed swap may still leave the slot disturbed.
            state.live.insert(slot, "torn".to_string());
            return Err(io::Error::from_raw_os_error(9));
        }
        state.installs += 1;
        state.installed_files += 1;
        state
            .live
            .insert(slot, format!("file:{}", file.path().display()));
        Ok(FakeInstalled(self.clone()))
    }

    fn restore(&self, slot: ChannelSlot, backup: &String) -> io::Result<()> {
        let mut state = self.state();
        if state.fail_restores > 0 {
            state.fail_restores -= 1;
            return Err(io::Error::from_raw_os_error(5));
        }
        state.restores += 1;
        state.live.insert(slot, backup.clone());
        Ok(())
    }

    fn release(&self, _slot: ChannelSlot, _backup: String) {
        self.state().outstanding_backups -= 1;
    }
}
