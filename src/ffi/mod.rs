//! Kernel interface: the `perf_event_attr` layout and the raw syscalls.

#[cfg(any(target_os = "linux", target_os = "android"))]
pub mod linux_syscall;

pub use perf_event_open_sys::{bindings, ioctls};

/// Calls a wrapper from [`linux_syscall`], or fails with
/// [`Unsupported`][std::io::ErrorKind::Unsupported] on other systems.
macro_rules! syscall {
    ($name:ident, $($arg:expr),* $(,)?) => {{
        #[cfg(any(target_os = "linux", target_os = "android"))]
        let res = $crate::ffi::linux_syscall::$name($($arg),*);
        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        let res = {
            $(let _ = $arg;)*
            Err(std::io::Error::from(std::io::ErrorKind::Unsupported))
        };
        res
    }};
}
pub(crate) use syscall;

pub type Attr = bindings::perf_event_attr;
