use std::path::PathBuf;

use crate::error::Result;
use crate::sysfs::Sysfs;

/// PMU directories an event name refers to.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Pmu {
    Single(PathBuf),
    /// `uncore_<name>_<N>` boxes, ordered by `N`.
    Multi(Vec<PathBuf>),
}

/// Probes `<name>`, `uncore_<name>` and `uncore_<name>_<N>` in that order.
pub(crate) fn find(sysfs: &Sysfs, name: &str) -> Result<Option<Pmu>> {
    if name.is_empty() || name.contains('\0') || name == "." || name == ".." {
        return Ok(None);
    }

    for candidate in [name.to_owned(), format!("uncore_{}", name)] {
        let dir = sysfs.pmu_dir(&candidate);
        if dir.is_dir() {
            log::debug!("pmu {} found at {:?}", name, dir);
            return Ok(Some(Pmu::Single(dir)));
        }
    }

    if !sysfs.devices().is_dir() {
        return Ok(None);
    }
    let prefix = format!("uncore_{}_", name);
    let mut boxes: Vec<(u64, String)> = sysfs
        .pmus()?
        .into_iter()
        .filter_map(|pmu| {
            let n = pmu.strip_prefix(&prefix)?.parse().ok()?;
            Some((n, pmu))
        })
        .collect();
    boxes.sort_unstable();
    log::debug!("pmu {} matches {} uncore boxes", name, boxes.len());

    let mut dirs: Vec<PathBuf> = boxes.iter().map(|(_, pmu)| sysfs.pmu_dir(pmu)).collect();
    Ok(match dirs.len() {
        0 => None,
        1 => dirs.pop().map(Pmu::Single),
        _ => Some(Pmu::Multi(dirs)),
    })
}
