use crate::ffi::bindings as b;
use crate::session::CpuMask;

pub(crate) mod attr;
mod target;

pub use target::*;

/// Options for [`EventList::setup`][crate::session::EventList::setup].
#[derive(Clone, Debug, Default)]
pub struct Opts {
    /// What to measure, and when counting starts.
    pub measure: Measure,

    /// Only open counters on these CPUs.
    ///
    /// Uncore events are matched against the representative CPU of each socket.
    pub cpumask: Option<CpuMask>,
}

/// Measurement scope.
#[derive(Clone, Debug)]
pub enum Measure {
    /// Measure a child that has not called [`execve`](https://man7.org/linux/man-pages/man2/execve.2.html) yet.
    ///
    /// Counters are opened disabled and the kernel enables them on `execve`.
    /// The caller must make sure the counters are opened before the child
    /// executes, e.g. with a pipe handshake between `fork` and `execve`.
    OnExec(Proc),

    /// Measure an already running process, counting starts immediately.
    Attach(Proc),

    /// Measure all processes, counting starts immediately (may need root).
    System,
}

impl Default for Measure {
    fn default() -> Self {
        Self::OnExec(Proc::CURRENT)
    }
}

/// Execution contexts to leave out of the count.
///
/// Set by the `u`, `k`, `h`, `G` and `I` qualifiers of an event string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Priv {
    pub user: bool,
    pub kernel: bool,
    /// Hypervisor.
    pub hv: bool,
    /// Events while running as a virtualization host.
    pub host: bool,
    pub guest: bool,
    pub idle: bool,
}

/// The `period=` or `freq=` term of an event.
///
/// Counting sessions never sample, the value only travels to the kernel.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SampleOn {
    Freq(u64),
    Count(u64),
}

impl Default for SampleOn {
    fn default() -> Self {
        Self::Count(0)
    }
}

/// Optional words after the count in a counter read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatFormat {
    pub id: bool,
    /// Needed to scale multiplexed counts, see [`Stat::scaled`][crate::count::Stat::scaled].
    pub time_enabled: bool,
    pub time_running: bool,
}

impl StatFormat {
    pub(crate) fn as_read_format(&self) -> u64 {
        [
            (self.time_enabled, b::PERF_FORMAT_TOTAL_TIME_ENABLED),
            (self.time_running, b::PERF_FORMAT_TOTAL_TIME_RUNNING),
            (self.id, b::PERF_FORMAT_ID),
        ]
        .into_iter()
        .filter(|(on, _)| *on)
        .fold(0, |acc, (_, flag)| acc | flag as u64)
    }
}

/// Size of the attr passed to the kernel.
///
/// `Ver1` is only needed once a field lands in `config2`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttrSize {
    #[default]
    Ver0,
    Ver1,
}

impl AttrSize {
    pub(crate) fn as_size(&self) -> u32 {
        match self {
            Self::Ver0 => b::PERF_ATTR_SIZE_VER0,
            Self::Ver1 => b::PERF_ATTR_SIZE_VER1,
        }
    }
}
