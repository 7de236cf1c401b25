use std::collections::BTreeMap;

use super::Sysfs;

/// CPUs and sockets of the machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    /// Configured CPUs, online or not.
    pub num_cpus: usize,
    /// One representative CPU per socket, ordered by socket id.
    pub socket_cpus: Vec<usize>,
}

impl Topology {
    pub fn detect(sysfs: &Sysfs) -> Self {
        let num_cpus = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_CONF) };
        let num_cpus = if num_cpus > 0 { num_cpus as usize } else { 1 };
        Self::from_sysfs(sysfs, num_cpus)
    }

    /// Picks the lowest CPU of every `physical_package_id`.
    pub fn from_sysfs(sysfs: &Sysfs, num_cpus: usize) -> Self {
        let mut sockets = BTreeMap::new();
        for cpu in 0..num_cpus {
            if let Some(id) = sysfs.package_id(cpu) {
                sockets.entry(id).or_insert(cpu);
            }
        }
        let mut socket_cpus: Vec<usize> = sockets.into_values().collect();
        if socket_cpus.is_empty() {
            log::debug!("no cpu topology found, assuming one socket");
            socket_cpus.push(0);
        }
        Self {
            num_cpus,
            socket_cpus,
        }
    }

    pub fn num_sockets(&self) -> usize {
        self.socket_cpus.len()
    }
}
