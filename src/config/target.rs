use super::Measure;

#[derive(Clone, Copy, Debug)]
pub struct All;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cpu(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Proc(pub u32);

impl Proc {
    pub const ALL: All = All;
    /// The calling process.
    pub const CURRENT: Proc = Proc(0);
}

/// The task and CPU a counter is opened on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub(crate) pid: i32,
    pub(crate) cpu: i32,
    pub(crate) flags: u64,
}

impl Target {
    /// Target of a session counter on `cpu`.
    pub(crate) fn measure(measure: &Measure, cpu: usize) -> Self {
        let cpu = Cpu(cpu as u32);
        match measure {
            Measure::OnExec(proc) | Measure::Attach(proc) => (*proc, cpu).into(),
            Measure::System => (Proc::ALL, cpu).into(),
        }
    }

    /// Process to count, `-1` for every process.
    pub fn pid(&self) -> i32 {
        self.pid
    }

    pub fn cpu(&self) -> i32 {
        self.cpu
    }

    /// `perf_event_open` flags besides `PERF_FLAG_FD_CLOEXEC`.
    pub fn flags(&self) -> u64 {
        self.flags
    }
}

macro_rules! into_target {
    ($ty: ty, $destruct: tt, $pid: expr, $cpu: expr) => {
        impl From<$ty> for Target {
            fn from($destruct: $ty) -> Self {
                Target {
                    pid: $pid as _,
                    cpu: $cpu as _,
                    flags: 0,
                }
            }
        }
    };
}

into_target!((Proc, Cpu), (Proc(pid), Cpu(cpu)), pid, cpu);
into_target!((Cpu, Proc), (Cpu(cpu), Proc(pid)), pid, cpu);

// System wide counters are only possible per CPU.
into_target!((All, Cpu), (_, Cpu(cpu)), -1, cpu);
into_target!((Cpu, All), (Cpu(cpu), _), -1, cpu);
