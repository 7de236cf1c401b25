use std::fmt::Write;

use crate::config::{AttrSize, Priv, SampleOn, StatFormat};
use crate::ffi::bindings as b;

pub mod raw;

/// A resolved kernel counter descriptor, the safe counterpart of `perf_event_attr`.
///
/// Produced by [`Resolver::resolve`][crate::resolve::Resolver::resolve]. Once the
/// descriptor is attached to an open counter only the enable flags are changed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Descriptor {
    /// PMU type id, see `/sys/devices/<pmu>/type`.
    pub ty: u32,
    /// Attr layout version.
    pub size: AttrSize,
    /// Event config.
    pub config: u64,
    /// Event config1.
    pub config1: u64,
    /// Event config2, requires [`AttrSize::Ver1`].
    pub config2: u64,
    pub sample_on: SampleOn,
    /// Skid constraint, 0 (arbitrary) to 3 (zero skid).
    pub precise_ip: u8,
    /// Exclude events with privilege levels.
    pub exclude: Priv,
    /// Always keep the counter on the PMU.
    pub pinned: bool,
    /// New children inherit the counter.
    pub inherit: bool,
    /// Open the counter disabled.
    pub disabled: bool,
    /// Enable the counter on `execve`.
    pub enable_on_exec: bool,
    pub read_format: StatFormat,
}

impl Default for Descriptor {
    fn default() -> Self {
        Self {
            ty: b::PERF_TYPE_RAW,
            size: AttrSize::Ver0,
            config: 0,
            config1: 0,
            config2: 0,
            sample_on: SampleOn::default(),
            precise_ip: 0,
            exclude: Priv::default(),
            pinned: false,
            inherit: false,
            disabled: false,
            enable_on_exec: false,
            read_format: StatFormat::default(),
        }
    }
}

impl Descriptor {
    /// Set `config2`, upgrading the attr layout to make room for it.
    pub fn or_config2(&mut self, bits: u64) {
        self.config2 |= bits;
        self.size = self.size.max(AttrSize::Ver1);
    }

    /// Formats the descriptor as a raw event for the `perf` command line tool.
    ///
    /// ```
    /// use pmu_events::event::Descriptor;
    ///
    /// let desc = Descriptor {
    ///     config: 0x1cd,
    ///     ..Default::default()
    /// };
    /// assert_eq!(desc.to_perf_string(Some("foo")), "cpu/config=0x1cd,name=foo/");
    /// ```
    pub fn to_perf_string(&self, name: Option<&str>) -> String {
        let mut buf = format!("cpu/config={:#x}", self.config);
        if self.config1 != 0 {
            let _ = write!(buf, ",config1={:#x}", self.config1);
        }
        if self.config2 != 0 {
            let _ = write!(buf, ",config2={:#x}", self.config2);
        }
        if let Some(name) = name {
            let _ = write!(buf, ",name={}", name);
        }
        buf.push('/');
        buf
    }
}
