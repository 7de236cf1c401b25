use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use nix::unistd::User;

/// Identity of the running CPU model, used to name cached event files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CpuId {
    pub vendor: String,
    pub family: u32,
    pub model: u32,
    pub stepping: Option<u32>,
}

impl CpuId {
    /// Reads the first processor of `/proc/cpuinfo`.
    pub fn detect() -> Option<Self> {
        let cpuinfo = fs::read_to_string("/proc/cpuinfo").ok()?;
        Self::parse(&cpuinfo)
    }

    pub fn parse(cpuinfo: &str) -> Option<Self> {
        let (mut vendor, mut family, mut model, mut stepping) = (None, None, None, None);
        for line in cpuinfo.lines() {
            let Some((key, val)) = line.split_once(':') else {
                // Blank line, end of the first processor.
                if vendor.is_some() {
                    break;
                }
                continue;
            };
            let val = val.trim();
            match key.trim() {
                "vendor_id" => vendor = Some(val.to_owned()),
                "cpu family" => family = val.parse().ok(),
                "model" => model = val.parse().ok(),
                "stepping" => stepping = val.parse().ok(),
                _ => (),
            }
        }
        Some(Self {
            vendor: vendor?,
            family: family?,
            model: model?,
            stepping,
        })
    }

    /// `GenuineIntel-6-55`
    pub fn id(&self) -> String {
        format!("{}-{}-{:X}", self.vendor, self.family, self.model)
    }

    /// `GenuineIntel-6-55-4`
    pub fn id_stepping(&self) -> Option<String> {
        self.stepping.map(|s| format!("{}-{:X}", self.id(), s))
    }
}

/// Where the default event files live.
#[derive(Clone, Debug, Default)]
pub struct Location {
    /// `EVENTMAP`: an event file, or a path prefix completed with `-core.json`/`-uncore.json`.
    pub eventmap: Option<PathBuf>,
    /// Cache directory containing `pmu-events/`.
    pub cache_dir: Option<PathBuf>,
    pub cpu: Option<CpuId>,
}

fn readable(path: &Path) -> bool {
    fs::File::open(path).is_ok()
}

fn env_path(name: &str) -> Option<PathBuf> {
    env::var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from)
}

// Home directory of the user who invoked sudo, not root's.
pub(super) fn user_home(user: &str) -> Option<PathBuf> {
    match User::from_name(user) {
        Ok(found) => found.map(|u| u.dir),
        Err(e) => {
            log::debug!("cannot look up user {}: {}", user, e);
            None
        }
    }
}

impl Location {
    /// Resolves the location from `EVENTMAP`, `JEVENTS_CACHEDIR`, `XDG_CACHE_HOME`,
    /// `SUDO_USER` and `HOME`, in that order.
    pub fn from_env() -> Self {
        let cache_dir = env_path("JEVENTS_CACHEDIR")
            .or_else(|| env_path("XDG_CACHE_HOME"))
            .or_else(|| {
                let user = env::var("SUDO_USER").ok()?;
                Some(user_home(&user)?.join(".cache"))
            })
            .or_else(|| Some(env_path("HOME")?.join(".cache")));
        Self {
            eventmap: env_path("EVENTMAP"),
            cache_dir,
            cpu: CpuId::detect(),
        }
    }

    /// An `EVENTMAP` naming a readable file replaces every default file.
    pub(crate) fn explicit_file(&self) -> Option<&Path> {
        self.eventmap.as_deref().filter(|p| readable(p))
    }

    /// Event file for `suffix` (`-core` or `-uncore`).
    pub fn path(&self, suffix: &str) -> Option<PathBuf> {
        if let Some(file) = self.explicit_file() {
            return Some(file.to_owned());
        }
        if let Some(prefix) = &self.eventmap {
            let mut path = prefix.clone().into_os_string();
            path.push(format!("{}.json", suffix));
            return Some(path.into());
        }

        let dir = self.cache_dir.as_ref()?.join("pmu-events");
        let cpu = self.cpu.as_ref()?;
        if let Some(id) = cpu.id_stepping() {
            let stepped = dir.join(format!("{}{}.json", id, suffix));
            if readable(&stepped) {
                return Some(stepped);
            }
        }
        Some(dir.join(format!("{}{}.json", cpu.id(), suffix)))
    }
}
