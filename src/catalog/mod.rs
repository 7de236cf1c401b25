//! Vendor event lists, keyed by event name.
//!
//! A catalog is read from the JSON event files published for each CPU model
//! (the format downloaded by `event_download.py` into `~/.cache/pmu-events`).
//! Each record is normalized into a perf term string such as
//! `event=0x3c,umask=0x1` plus the PMU that counts it.


mod json;
mod location;
mod rmap;

use std::collections::HashMap;
use std::io::ErrorKind;
use std::ops::ControlFlow;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

pub use location::*;

use crate::error::{Error, Result};

/// One named event of the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry {
    /// Lower-cased event name, e.g. `inst_retired.any`.
    pub name: String,
    /// Perf terms, e.g. `event=0xc0,period=2000003`.
    pub event: String,
    pub desc: String,
    /// PMU name without the `uncore_` prefix, e.g. `cpu` or `cbox`.
    pub pmu: String,
}

#[derive(Debug, Default)]
struct Entries {
    list: Vec<Entry>,
    // Lower-cased name -> positions in `list`.
    index: HashMap<String, Vec<usize>>,
}

impl Entries {
    fn push(&mut self, entry: Entry) {
        let key = entry.name.to_ascii_lowercase();
        self.index.entry(key).or_default().push(self.list.len());
        self.list.push(entry);
    }

    fn extend(&mut self, entries: Vec<Entry>) {
        self.list.reserve(entries.len());
        for entry in entries {
            self.push(entry);
        }
    }
}

/// Event catalog.
///
/// The catalog is populated at most once (explicitly with [`load`][Self::load], or
/// lazily by [`ensure_loaded`][Self::ensure_loaded]) and can then be shared by
/// reference. Reloading requires exclusive access.
///
/// # Examples
///
/// ```no_run
/// use pmu_events::catalog::Catalog;
///
/// let mut catalog = Catalog::new();
/// catalog.load(None).unwrap();
///
/// for entry in catalog.lookup("INST_RETIRED.ANY") {
///     println!("{}/{}/: {}", entry.pmu, entry.event, entry.desc);
/// }
/// ```
#[derive(Debug, Default)]
pub struct Catalog {
    location: Location,
    entries: OnceLock<Entries>,
    // Set after the default files could not be read.
    failed: AtomicBool,
}

impl Catalog {
    /// An empty catalog that loads from the default location of the environment.
    pub fn new() -> Self {
        Self::with_location(Location::from_env())
    }

    pub fn with_location(location: Location) -> Self {
        Self {
            location,
            entries: OnceLock::new(),
            failed: AtomicBool::new(false),
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    fn read(&self, path: Option<&Path>) -> Result<Entries> {
        let mut entries = Entries::default();
        if let Some(path) = path {
            entries.extend(json::read_file(path)?);
            return Ok(entries);
        }

        let core = self
            .location
            .path("-core")
            .ok_or_else(|| Error::NotFound("default event file".to_owned()))?;
        entries.extend(json::read_file(&core)?);

        if self.location.explicit_file().is_none() {
            if let Some(uncore) = self.location.path("-uncore") {
                match json::read_file(&uncore) {
                    Ok(list) => entries.extend(list),
                    Err(Error::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                        log::debug!("no uncore event file {:?}", uncore);
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(entries)
    }

    /// Reads an event file, or the default `-core` and `-uncore` files for `None`.
    ///
    /// Replaces the current contents; nothing from a previous load survives.
    pub fn load(&mut self, path: Option<&Path>) -> Result<()> {
        let entries = self.read(path)?;
        self.entries = OnceLock::from(entries);
        *self.failed.get_mut() = false;
        Ok(())
    }

    /// Loads the default event files unless something was loaded already.
    ///
    /// A failure is returned once. Later calls leave the catalog empty without
    /// reading again, until [`load`][Self::load] or [`clear`][Self::clear].
    pub fn ensure_loaded(&self) -> Result<()> {
        if self.entries.get().is_some() || self.failed.load(Ordering::Relaxed) {
            return Ok(());
        }
        match self.read(None) {
            Ok(entries) => {
                // A concurrent first load may have won, its result is equivalent.
                let _ = self.entries.set(entries);
                Ok(())
            }
            Err(e) => {
                self.failed.store(true, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.entries.get().is_some()
    }

    /// Forgets all entries, the next [`ensure_loaded`][Self::ensure_loaded] reads again.
    pub fn clear(&mut self) {
        self.entries = OnceLock::new();
        *self.failed.get_mut() = false;
    }

    pub fn len(&self) -> usize {
        self.entries.get().map_or(0, |e| e.list.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All entries named `name`, ignoring ASCII case.
    pub fn lookup<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Entry> + 'a {
        let found = self.entries.get().and_then(|e| {
            let positions = e.index.get(&name.to_ascii_lowercase())?;
            Some((e, positions))
        });
        found
            .into_iter()
            .flat_map(|(e, positions)| positions.iter().map(move |&i| &e.list[i]))
    }

    /// Entries in load order.
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries
            .get()
            .map_or(&[][..], |e| e.list.as_slice())
            .iter()
    }

    /// Calls `f` on every entry until it breaks, returning the break value.
    pub fn walk<B, F>(&self, mut f: F) -> Option<B>
    where
        F: FnMut(&Entry) -> ControlFlow<B>,
    {
        match self.iter().try_for_each(|e| f(e)) {
            ControlFlow::Break(b) => Some(b),
            ControlFlow::Continue(()) => None,
        }
    }
}
