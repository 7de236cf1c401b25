use std::fs::File;
use std::io::{Error, Result};
use std::os::fd::{AsRawFd, FromRawFd, RawFd};

use libc::{c_int, c_uint};
use perf_event_open_sys as sys;

use super::Attr;

/// One of the argument-less requests of [`ioctls`][super::ioctls].
pub type Request = unsafe fn(c_int, c_uint) -> c_int;

// Maps the `-1` failure return of libc calls to `errno`.
fn check<T: PartialEq + From<i8>>(ret: T) -> Result<T> {
    match ret == T::from(-1) {
        true => Err(Error::last_os_error()),
        false => Ok(ret),
    }
}

pub fn perf_event_open(
    attr: &mut Attr,
    pid: i32,
    cpu: i32,
    group_fd: RawFd,
    flags: u64,
) -> Result<File> {
    let fd = check(unsafe { sys::perf_event_open(attr, pid, cpu, group_fd, flags as _) })?;
    // The kernel hands back a fresh descriptor that nothing else owns.
    Ok(unsafe { File::from_raw_fd(fd) })
}

pub fn ioctl(file: &File, request: Request) -> Result<i32> {
    check(unsafe { request(file.as_raw_fd(), 0) })
}

pub fn read(file: &File, buf: &mut [u8]) -> Result<usize> {
    let len = buf.len();
    let ret = unsafe { libc::read(file.as_raw_fd(), buf.as_mut_ptr().cast(), len) };
    check(ret).map(|n| n as usize)
}
