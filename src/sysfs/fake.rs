use std::fs;
use std::path::Path;

use tempfile::TempDir;

use super::Sysfs;

/// A throwaway sysfs tree.
pub(crate) struct FakeSys {
    dir: TempDir,
}

fn put(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

impl FakeSys {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("devices")).unwrap();
        Self { dir }
    }

    pub fn sysfs(&self) -> Sysfs {
        Sysfs::new(self.dir.path())
    }

    fn pmu_path(&self, pmu: &str) -> std::path::PathBuf {
        self.dir.path().join("devices").join(pmu)
    }

    pub fn pmu(&self, pmu: &str, ty: u32) -> &Self {
        put(&self.pmu_path(pmu).join("type"), &format!("{}\n", ty));
        self
    }

    pub fn format(&self, pmu: &str, field: &str, format: &str) -> &Self {
        put(
            &self.pmu_path(pmu).join("format").join(field),
            &format!("{}\n", format),
        );
        self
    }

    pub fn alias(&self, pmu: &str, name: &str, terms: &str) -> &Self {
        put(
            &self.pmu_path(pmu).join("events").join(name),
            &format!("{}\n", terms),
        );
        self
    }

    pub fn cpumask(&self, pmu: &str, mask: &str) -> &Self {
        put(&self.pmu_path(pmu).join("cpumask"), &format!("{}\n", mask));
        self
    }

    /// The core PMU with the usual x86 formats and a few aliases.
    pub fn cpu_pmu(&self) -> &Self {
        self.pmu("cpu", 4)
            .format("cpu", "event", "config:0-7")
            .format("cpu", "umask", "config:8-15")
            .format("cpu", "edge", "config:18")
            .format("cpu", "any", "config:21")
            .format("cpu", "inv", "config:23")
            .format("cpu", "cmask", "config:24-31")
            .format("cpu", "ldlat", "config1:0-15")
            .format("cpu", "offcore_rsp", "config1:0-63")
            .format("cpu", "frontend", "config1:0-23")
            .alias("cpu", "cpu-cycles", "event=0x3c")
            .alias("cpu", "instructions", "event=0xc0")
            .alias("cpu", "mem-loads", "event=0xcd,umask=0x1,ldlat=3")
            .cpumask("cpu", "0-3")
    }

    /// `count` instances `uncore_<name>_<N>` with consecutive types from `first_ty`.
    pub fn uncore_pmus(&self, name: &str, count: u32, first_ty: u32) -> &Self {
        for i in 0..count {
            let pmu = format!("uncore_{}_{}", name, i);
            self.pmu(&pmu, first_ty + i)
                .format(&pmu, "event", "config:0-7")
                .format(&pmu, "umask", "config:8-15")
                .cpumask(&pmu, "0,4");
        }
        self
    }

    /// `online` and `physical_package_id` of a CPU, `None` leaves the file out.
    pub fn cpu(&self, cpu: usize, online: Option<bool>, package: Option<u32>) -> &Self {
        let dir = self
            .dir
            .path()
            .join("devices/system/cpu")
            .join(format!("cpu{}", cpu));
        fs::create_dir_all(&dir).unwrap();
        if let Some(online) = online {
            put(&dir.join("online"), if online { "1\n" } else { "0\n" });
        }
        if let Some(package) = package {
            put(
                &dir.join("topology/physical_package_id"),
                &format!("{}\n", package),
            );
        }
        self
    }
}
