//! Kernel-exposed PMU and CPU descriptions.
//!
//! Everything is read relative to a root (`/sys` by default) so a fake tree can
//! stand in for the real one.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[cfg(test)]
pub(crate) mod fake;
#[cfg(test)]
mod test;

pub mod topology;

pub use topology::Topology;

#[derive(Clone, Debug)]
pub struct Sysfs {
    root: PathBuf,
}

impl Default for Sysfs {
    fn default() -> Self {
        Self::new("/sys")
    }
}

/// Reads a small sysfs file, `None` if it does not exist.
pub(crate) fn read_opt(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

fn parse_u32(path: &Path, s: &str) -> Result<u32> {
    s.trim()
        .parse()
        .map_err(|e| Error::io(path, io::Error::new(ErrorKind::InvalidData, e)))
}

impl Sysfs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/devices`, one directory per PMU.
    pub fn devices(&self) -> PathBuf {
        self.root.join("devices")
    }

    pub fn pmu_dir(&self, pmu: &str) -> PathBuf {
        self.devices().join(pmu)
    }

    /// Numeric PMU type from `<pmu dir>/type`.
    pub fn pmu_type(&self, dir: &Path) -> Result<u32> {
        let path = dir.join("type");
        let s = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        parse_u32(&path, &s)
    }

    /// Raw bit range description of a PMU field, e.g. `config:0-7`.
    pub fn format(&self, dir: &Path, field: &str) -> Result<Option<String>> {
        read_opt(&dir.join("format").join(field))
    }

    /// Term string a kernel event alias expands to, e.g. `event=0x3c`.
    pub fn event_alias(&self, dir: &Path, name: &str) -> Result<Option<String>> {
        read_opt(&dir.join("events").join(name))
    }

    /// Whether the core PMU exposes an event alias with this name.
    pub fn has_cpu_event(&self, name: &str) -> bool {
        // Alias names never contain path separators, `..` would escape `events/`.
        !name.is_empty()
            && !name.contains(['/', '\0'])
            && name != ".."
            && name != "."
            && self.pmu_dir("cpu").join("events").join(name).is_file()
    }

    /// A PMU counting shared resources of a socket.
    ///
    /// Such PMUs publish a `cpumask` whose first CPU is 0, one entry per socket.
    pub fn is_uncore(&self, dir: &Path) -> bool {
        match read_opt(&dir.join("cpumask")) {
            Ok(Some(mask)) => mask.trim().split(',').next() == Some("0"),
            _ => false,
        }
    }

    /// Names of all PMUs.
    pub fn pmus(&self) -> Result<Vec<String>> {
        let dir = self.devices();
        let entries = fs::read_dir(&dir).map_err(|e| Error::io(&dir, e))?;
        let mut names = vec![];
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&dir, e))?;
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_owned());
            }
        }
        Ok(names)
    }

    fn cpu_dir(&self, cpu: usize) -> PathBuf {
        self.root
            .join("devices/system/cpu")
            .join(format!("cpu{}", cpu))
    }

    /// CPUs without an `online` file (usually CPU 0) cannot be taken offline.
    pub fn cpu_online(&self, cpu: usize) -> bool {
        match read_opt(&self.cpu_dir(cpu).join("online")) {
            Ok(Some(s)) => s.trim_start().starts_with('1'),
            Ok(None) => true,
            Err(_) => false,
        }
    }

    /// Socket of a CPU, `None` when offline or unknown.
    pub fn package_id(&self, cpu: usize) -> Option<u32> {
        let path = self.cpu_dir(cpu).join("topology/physical_package_id");
        let s = read_opt(&path).ok()??;
        parse_u32(&path, &s).ok()
    }
}
