use std::cell::RefCell;
use std::fs::File;
use std::io::{self, Result, Seek, Write};
use std::os::fd::{AsRawFd, BorrowedFd, RawFd};

use super::Open;
use crate::config::Target;
use crate::event::Descriptor;

/// One recorded open.
#[derive(Clone, Debug)]
pub(crate) struct Call {
    pub desc: Descriptor,
    pub target: Target,
    pub group_fd: Option<RawFd>,
    pub fd: RawFd,
}

/// Hands out temporary files holding `(value, time_enabled, time_running)`.
pub(crate) struct MockOpen {
    pub calls: RefCell<Vec<Call>>,
    /// Opens on these CPUs fail with `EINVAL`.
    pub offline: Vec<i32>,
    /// Opens on these CPUs fail with `EACCES`.
    pub denied: Vec<i32>,
    pub values: fn(&Descriptor, &Target) -> [u64; 3],
}

impl Default for MockOpen {
    fn default() -> Self {
        Self {
            calls: RefCell::default(),
            offline: vec![],
            denied: vec![],
            values: |_, _| [100, 200, 100],
        }
    }
}

impl MockOpen {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl Open for MockOpen {
    fn open(
        &self,
        desc: &Descriptor,
        target: &Target,
        group: Option<BorrowedFd<'_>>,
    ) -> Result<File> {
        if self.offline.contains(&target.cpu) {
            return Err(io::Error::from_raw_os_error(libc::EINVAL));
        }
        if self.denied.contains(&target.cpu) {
            return Err(io::Error::from_raw_os_error(libc::EACCES));
        }

        let mut file = tempfile::tempfile()?;
        for word in (self.values)(desc, target) {
            file.write_all(&word.to_ne_bytes())?;
        }
        file.rewind()?;

        self.calls.borrow_mut().push(Call {
            desc: desc.clone(),
            target: target.clone(),
            group_fd: group.map(|fd| fd.as_raw_fd()),
            fd: file.as_raw_fd(),
        });
        Ok(file)
    }
}
