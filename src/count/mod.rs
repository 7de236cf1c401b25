use std::fs::File;
use std::io::{self, ErrorKind, Result};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};

use crate::config::attr::from;
use crate::config::Target;
use crate::event::Descriptor;
use crate::ffi::{bindings as b, ioctls, syscall};

#[cfg(test)]
pub(crate) mod mock;
mod stat;

pub use stat::*;

/// Opens kernel counters.
///
/// [`EventList::setup_with`][crate::session::EventList::setup_with] takes any
/// implementation, [`PerfEventOpen`] is the real one.
pub trait Open {
    /// Opens a counter for `desc` on `target`, as a member of `group` if given.
    fn open(&self, desc: &Descriptor, target: &Target, group: Option<BorrowedFd<'_>>)
        -> Result<File>;
}

/// Opens counters with the `perf_event_open` system call.
#[derive(Clone, Copy, Debug, Default)]
pub struct PerfEventOpen;

impl Open for PerfEventOpen {
    fn open(
        &self,
        desc: &Descriptor,
        target: &Target,
        group: Option<BorrowedFd<'_>>,
    ) -> Result<File> {
        let mut attr = from(desc);
        let group_fd = group.map_or(-1, |fd| fd.as_raw_fd());
        let flags = target.flags | b::PERF_FLAG_FD_CLOEXEC as u64;
        syscall!(perf_event_open, &mut attr, target.pid, target.cpu, group_fd, flags)
    }
}

/// An open counter.
#[derive(Debug)]
pub struct Counter {
    pub(crate) perf: File,
    pub(crate) read_format: u64,
}

impl Counter {
    /// Opens a counter on its own, outside of any group.
    pub fn new(desc: &Descriptor, target: impl Into<Target>) -> Result<Self> {
        Self::open_with(&PerfEventOpen, desc, &target.into(), None)
    }

    pub fn open_with(
        opener: &impl Open,
        desc: &Descriptor,
        target: &Target,
        leader: Option<&Counter>,
    ) -> Result<Self> {
        let perf = opener.open(desc, target, leader.map(|l| l.perf.as_fd()))?;
        Ok(Self {
            perf,
            read_format: desc.read_format.as_read_format(),
        })
    }

    pub fn file(&self) -> &File {
        &self.perf
    }

    pub fn enable(&self) -> Result<()> {
        syscall!(ioctl, &self.perf, ioctls::ENABLE)?;
        Ok(())
    }

    pub fn disable(&self) -> Result<()> {
        syscall!(ioctl, &self.perf, ioctls::DISABLE)?;
        Ok(())
    }

    pub fn reset(&self) -> Result<()> {
        syscall!(ioctl, &self.perf, ioctls::RESET)?;
        Ok(())
    }

    pub fn stat(&self) -> Result<Stat> {
        let mut buf = [0; Stat::MAX_READ_LEN];
        let buf = &mut buf[..Stat::read_len(self.read_format)];
        let len = syscall!(read, &self.perf, buf)?;
        if len < buf.len() {
            return Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("short counter read of {} bytes", len),
            ));
        }
        Ok(Stat::from_bytes(buf, self.read_format))
    }
}
