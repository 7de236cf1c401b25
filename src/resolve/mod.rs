//! Event names to counter descriptors.
//!
//! An event is written in one of these forms, tried in order:
//!
//! 1. `r1cd:u`, a raw config for the core PMU;
//! 2. `cpu-cycles:k`, an alias the kernel publishes under `cpu/events`;
//! 3. `cpu/event=0x3c,umask=0x0/ku`, field terms of a named PMU;
//! 4. `INST_RETIRED.ANY:p`, a name from the [event catalog][crate::catalog].
//!
//! Field terms are packed into the config words following the PMU's
//! `format/` description in sysfs.


mod extra;
mod format;
mod pmu;
mod qual;

use std::path::Path;

pub use extra::*;
pub use format::*;
use pmu::Pmu;

use crate::catalog::Catalog;
use crate::config::SampleOn;
use crate::error::{Error, Result};
use crate::event::raw::Raw;
use crate::event::Descriptor;
use crate::num::parse_exact;
use crate::sysfs::Sysfs;

// Fixed counters whose catalog encodings cannot be opened as is.
const FIXED: [(&str, &str); 3] = [
    ("inst_retired.any", "event=0xc0"),
    ("cpu_clk_unhalted.thread", "event=0x3c"),
    ("cpu_clk_unhalted.thread_any", "event=0x3c,any=1"),
];

fn split_quals(spec: &str) -> (&str, &str) {
    spec.split_once(':').unwrap_or((spec, ""))
}

fn is_field_name(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'-' || c == b'.')
        && s != "."
        && s != ".."
}

/// Resolves event names against a catalog and the kernel's PMU descriptions.
#[derive(Debug)]
pub struct Resolver<'a> {
    catalog: &'a Catalog,
    sysfs: Sysfs,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self::with_sysfs(catalog, Sysfs::default())
    }

    pub fn with_sysfs(catalog: &'a Catalog, sysfs: Sysfs) -> Self {
        Self { catalog, sysfs }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn sysfs(&self) -> &Sysfs {
        &self.sysfs
    }

    /// Resolves one event.
    ///
    /// The catalog is loaded from its default location on first use. If that
    /// fails the catalog is skipped and only the other forms are tried.
    pub fn resolve(&self, spec: &str) -> Result<(Descriptor, Extra)> {
        if let Some(raw) = Raw::parse(spec) {
            let mut desc = raw.descriptor();
            qual::apply(raw.quals, spec, &mut desc)?;
            let extra = Extra {
                decoded: spec.to_owned(),
                ..Default::default()
            };
            return Ok((desc, extra));
        }

        if spec.contains('/') {
            return self.resolve_pmu(spec);
        }

        let (name, quals) = split_quals(spec);
        if self.sysfs.has_cpu_event(name) {
            return self.resolve_pmu(&format!("cpu/{}/{}", name, quals));
        }

        self.resolve_catalog(spec, name, quals)
    }

    fn resolve_catalog(&self, spec: &str, name: &str, quals: &str) -> Result<(Descriptor, Extra)> {
        if let Err(e) = self.catalog.ensure_loaded() {
            log::warn!("cannot load event catalog: {}", e);
        }

        if let Some(entry) = self.catalog.lookup(name).next() {
            let lower = name.to_ascii_lowercase();
            let event = FIXED
                .iter()
                .find(|(fixed, _)| *fixed == lower)
                .map_or(entry.event.as_str(), |(_, event)| event);
            let (desc, mut extra) =
                self.resolve_pmu(&format!("{}/{}/{}", entry.pmu, event, quals))?;
            extra.name = Some(spec.to_owned());
            return Ok((desc, extra));
        }

        self.resolve_pmu(&format!("cpu/{}/{}", name, quals))
            .map_err(|e| {
                log::debug!("{} is not a cpu term list: {}", spec, e);
                Error::NotFound(spec.to_owned())
            })
    }

    fn resolve_pmu(&self, spec: &str) -> Result<(Descriptor, Extra)> {
        let mut parts = spec.splitn(3, '/');
        let (Some(pmu), Some(terms), Some(quals)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::Term {
                term: spec.to_owned(),
                event: spec.to_owned(),
            });
        };

        let (multi_pmu, pmus) = match pmu::find(&self.sysfs, pmu)? {
            Some(Pmu::Single(dir)) => (false, vec![dir]),
            Some(Pmu::Multi(dirs)) => (true, dirs),
            None => return Err(Error::NotFound(spec.to_owned())),
        };
        let Some(dir) = pmus.first() else {
            return Err(Error::NotFound(spec.to_owned()));
        };

        let mut desc = Descriptor {
            ty: self.sysfs.pmu_type(dir)?,
            ..Default::default()
        };
        let mut extra = Extra {
            decoded: spec.to_owned(),
            uncore: self.sysfs.is_uncore(dir),
            ..Default::default()
        };
        self.parse_terms(dir, terms, spec, &mut desc, &mut extra, 0)?;
        qual::apply(quals, spec, &mut desc)?;

        extra.multi_pmu = multi_pmu;
        extra.pmus = pmus;
        Ok((desc, extra))
    }

    fn parse_terms(
        &self,
        dir: &Path,
        terms: &str,
        event: &str,
        desc: &mut Descriptor,
        extra: &mut Extra,
        depth: u32,
    ) -> Result<()> {
        for term in terms.trim().split(',').map(str::trim) {
            if term.is_empty() {
                continue;
            }
            let (field, value) = match term.split_once('=') {
                Some((field, value)) => (field.trim(), Some(value.trim())),
                None => (term, None),
            };
            let bad_term = || Error::Term {
                term: term.to_owned(),
                event: event.to_owned(),
            };
            let num = || value.map_or(Some(1), parse_exact).ok_or_else(bad_term);

            match field {
                "name" => extra.name = Some(value.ok_or_else(bad_term)?.to_owned()),
                "period" => desc.sample_on = SampleOn::Count(num()?),
                "freq" => desc.sample_on = SampleOn::Freq(num()?),
                "config" => desc.config |= num()?,
                "config1" => desc.config1 |= num()?,
                "config2" => desc.or_config2(num()?),
                _ if !is_field_name(field) => return Err(bad_term()),
                _ => {
                    if let Some(raw) = self.sysfs.format(dir, field)? {
                        let format: Format = raw.parse().map_err(|_| Error::Format {
                            field: field.to_owned(),
                            format: raw.trim().to_owned(),
                        })?;
                        let value = num()?;
                        format
                            .apply(desc, value)
                            .ok_or_else(|| Error::FieldOverflow {
                                field: field.to_owned(),
                                value,
                                width: format.width(),
                            })?;
                    } else if let Some(alias) = self.sysfs.event_alias(dir, field)? {
                        // Aliases expand to plain fields, never to other aliases.
                        if depth > 0 {
                            return Err(bad_term());
                        }
                        self.parse_terms(dir, &alias, event, desc, extra, depth + 1)?;
                    } else {
                        return Err(bad_term());
                    }
                }
            }
        }
        Ok(())
    }

    /// Points the descriptor at the next PMU of `extra`.
    ///
    /// Returns `false` once every PMU was visited.
    pub fn next_pmu(&self, extra: &mut Extra, desc: &mut Descriptor) -> Result<bool> {
        let Some(dir) = extra.pmus.get(extra.next_pmu) else {
            return Ok(false);
        };
        desc.ty = self.sysfs.pmu_type(dir)?;
        extra.next_pmu += 1;
        Ok(true)
    }

    /// Name of the PMU with type `ty`.
    pub fn pmu_name(&self, ty: u32) -> Option<String> {
        let pmus = self.sysfs.pmus().ok()?;
        pmus.into_iter().find(|pmu| {
            let dir = self.sysfs.pmu_dir(pmu);
            self.sysfs.pmu_type(&dir).ok() == Some(ty)
        })
    }
}
