//! Lists of events counted together.
//!
//! An [`EventList`] goes through these states:
//!
//! 1. [`parse`][EventList::parse] resolves a comma separated event list,
//!    where `{...}` marks events that must be scheduled as one group;
//! 2. [`setup`][EventList::setup] opens a counter per event and CPU;
//! 3. [`read_all`][EventList::read_all] reads every counter back;
//! 4. [`close`][EventList::close] (or drop) releases the counters.
//!
//! ```no_run
//! use pmu_events::catalog::Catalog;
//! use pmu_events::config::{Measure, Opts};
//! use pmu_events::resolve::Resolver;
//! use pmu_events::session::EventList;
//!
//! let catalog = Catalog::new();
//! let resolver = Resolver::new(&catalog);
//!
//! let mut list = EventList::new();
//! list.parse(&resolver, "{cpu-cycles,instructions},r1cd:u").unwrap();
//!
//! let opts = Opts {
//!     measure: Measure::System,
//!     ..Default::default()
//! };
//! list.setup(&opts).unwrap();
//! std::thread::sleep(std::time::Duration::from_secs(1));
//! list.read_all().unwrap();
//!
//! for (i, event) in list.iter().enumerate() {
//!     let total: u64 = (0..list.topology().num_cpus)
//!         .map(|cpu| list.scaled_value(i, cpu))
//!         .sum();
//!     println!("{} {}", event.name(), total);
//! }
//! ```

#[cfg(test)]
mod test;

mod cpumask;
mod print;
mod setup;
mod split;

use std::mem;

pub use cpumask::*;
pub use print::*;

use crate::count::{Counter, Stat};
use crate::error::{Error, Result};
use crate::event::Descriptor;
use crate::resolve::{Extra, Resolver};
use crate::sysfs::{Sysfs, Topology};
use split::split_events;

/// Counter and last read value of an event on one CPU.
#[derive(Debug, Default)]
pub struct CpuState {
    pub(crate) counter: Option<Counter>,
    pub(crate) stat: Stat,
}

impl CpuState {
    /// `None` if never opened, closed, or the CPU was offline.
    pub fn counter(&self) -> Option<&Counter> {
        self.counter.as_ref()
    }

    pub fn stat(&self) -> &Stat {
        &self.stat
    }
}

/// One resolved event of an [`EventList`].
#[derive(Debug)]
pub struct Event {
    pub(crate) spec: String,
    pub(crate) desc: Descriptor,
    pub(crate) extra: Extra,
    pub(crate) group_leader: bool,
    pub(crate) end_group: bool,
    pub(crate) in_group: bool,
    pub(crate) uncore: bool,
    pub(crate) origin: Option<usize>,
    pub(crate) clone_count: usize,
    pub(crate) cpus: Vec<CpuState>,
}

impl Event {
    fn new(spec: &str, desc: Descriptor, extra: Extra, num_cpus: usize) -> Self {
        Self {
            spec: spec.to_owned(),
            desc,
            uncore: extra.uncore,
            extra,
            group_leader: false,
            end_group: false,
            in_group: false,
            origin: None,
            clone_count: 0,
            cpus: (0..num_cpus).map(|_| CpuState::default()).collect(),
        }
    }

    // Copy for the PMU `template` currently points at.
    fn clone_of(template: &Self) -> Self {
        Self::new(
            &template.spec,
            template.desc.clone(),
            template.extra.clone(),
            template.cpus.len(),
        )
    }

    /// The event as written in the list.
    pub fn spec(&self) -> &str {
        &self.spec
    }

    /// Display name, falls back to the spec.
    pub fn name(&self) -> &str {
        self.extra.name.as_deref().unwrap_or(&self.spec)
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.desc
    }

    pub fn extra(&self) -> &Extra {
        &self.extra
    }

    /// Opens a group, later events up to [`end_group`][Self::end_group] join it.
    pub fn group_leader(&self) -> bool {
        self.group_leader
    }

    pub fn end_group(&self) -> bool {
        self.end_group
    }

    pub fn in_group(&self) -> bool {
        self.in_group
    }

    /// Counted once per socket instead of once per CPU.
    pub fn uncore(&self) -> bool {
        self.uncore
    }

    /// Index of the first copy of a multi-PMU event, for every later copy.
    pub fn origin(&self) -> Option<usize> {
        self.origin
    }

    /// Number of later copies pointing at this event.
    pub fn clone_count(&self) -> usize {
        self.clone_count
    }

    /// Per-CPU state, indexed by CPU number.
    pub fn cpus(&self) -> &[CpuState] {
        &self.cpus
    }
}

/// Events with their counters on every CPU.
#[derive(Debug)]
pub struct EventList {
    events: Vec<Event>,
    topology: Topology,
    sysfs: Sysfs,
}

impl Default for EventList {
    fn default() -> Self {
        Self::new()
    }
}

impl EventList {
    /// An empty list for the CPUs of this machine.
    pub fn new() -> Self {
        let sysfs = Sysfs::default();
        let topology = Topology::detect(&sysfs);
        Self::with_topology(sysfs, topology)
    }

    pub fn with_topology(sysfs: Sysfs, topology: Topology) -> Self {
        Self {
            events: vec![],
            topology,
            sysfs,
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, event: usize) -> Option<&Event> {
        self.events.get(event)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// Appends the events of a comma separated list.
    ///
    /// On error the list is left as it was before the call.
    pub fn parse(&mut self, resolver: &Resolver<'_>, list: &str) -> Result<()> {
        let len = self.events.len();
        let result = self.parse_events(resolver, list);
        if result.is_err() {
            self.events.truncate(len);
        }
        result
    }

    fn parse_events(&mut self, resolver: &Resolver<'_>, list: &str) -> Result<()> {
        let group_err = || Error::GroupSyntax(list.to_owned());
        let mut in_group = false;
        let mut group_start = 0;
        // Multi-PMU events of the open group, expanded when it closes.
        let mut deferred = vec![];

        for mut spec in split_events(list) {
            let mut group_leader = false;
            let mut end_group = false;
            if let Some(rest) = spec.strip_prefix('{') {
                if in_group {
                    return Err(group_err());
                }
                spec = rest.trim_start();
                group_leader = true;
                in_group = true;
                group_start = self.events.len();
            }
            if let Some(rest) = spec.strip_suffix('}') {
                if !in_group {
                    return Err(group_err());
                }
                spec = rest.trim_end();
                end_group = true;
            }
            if spec.is_empty() || spec.contains(['{', '}']) {
                return Err(group_err());
            }

            let (desc, extra) = resolver.resolve(spec)?;
            let mut event = Event::new(spec, desc, extra, self.topology.num_cpus);
            event.group_leader = group_leader;
            event.end_group = end_group;
            event.in_group = in_group;

            match (event.extra.multi_pmu, in_group) {
                (false, _) => self.events.push(event),
                (true, true) => deferred.push(event),
                (true, false) => self.expand(resolver, vec![event])?,
            }

            if end_group {
                in_group = false;
                if let Some(multi) = deferred.first() {
                    // One copy of a single-PMU member cannot join every batch.
                    if self.events.len() > group_start {
                        return Err(Error::PmuMismatch(multi.spec.clone()));
                    }
                    self.expand(resolver, mem::take(&mut deferred))?;
                }
            }
        }

        if in_group {
            return Err(group_err());
        }
        Ok(())
    }

    // Appends one copy of every template per PMU, the k-th copies of all
    // templates counting on the k-th PMU of each. Templates of a group form
    // one group per PMU.
    fn expand(&mut self, resolver: &Resolver<'_>, mut templates: Vec<Event>) -> Result<()> {
        let Some(count) = templates.first().map(|t| t.extra.pmus.len()) else {
            return Ok(());
        };
        if let Some(t) = templates.iter().find(|t| t.extra.pmus.len() != count) {
            return Err(Error::PmuMismatch(t.spec.clone()));
        }

        let grouped = templates.iter().any(|t| t.in_group);
        let last = templates.len() - 1;
        let mut origins = vec![None; templates.len()];
        for _ in 0..count {
            for (j, (template, origin)) in templates.iter_mut().zip(&mut origins).enumerate() {
                if !resolver.next_pmu(&mut template.extra, &mut template.desc)? {
                    return Err(Error::PmuMismatch(template.spec.clone()));
                }
                let mut event = Event::clone_of(template);
                event.in_group = grouped;
                event.group_leader = grouped && j == 0;
                event.end_group = grouped && j == last;
                match *origin {
                    None => *origin = Some(self.events.len()),
                    Some(i) => {
                        event.origin = Some(i);
                        self.events[i].clone_count += 1;
                    }
                }
                self.events.push(event);
            }
        }
        Ok(())
    }

    /// Reads every open counter.
    ///
    /// A failed read is logged and the remaining counters are still read,
    /// the last failure is returned.
    pub fn read_all(&mut self) -> Result<()> {
        let mut last = None;
        for event in &mut self.events {
            for (cpu, state) in event.cpus.iter_mut().enumerate() {
                let Some(counter) = &state.counter else {
                    continue;
                };
                match counter.stat() {
                    Ok(stat) => state.stat = stat,
                    Err(e) => {
                        log::error!("error reading from {}/{}: {}", event.spec, cpu, e);
                        last = Some(Error::Read {
                            event: event.spec.clone(),
                            cpu,
                            source: e,
                        });
                    }
                }
            }
        }
        last.map_or(Ok(()), Err)
    }

    /// Last read value of an event on a CPU, corrected for multiplexing.
    ///
    /// Zero for CPUs the event was not opened on.
    pub fn scaled_value(&self, event: usize, cpu: usize) -> u64 {
        self.events
            .get(event)
            .and_then(|e| e.cpus.get(cpu))
            .map_or(0, |s| s.stat.scaled())
    }

    /// [`scaled_value`][Self::scaled_value] summed over the event and every copy of it.
    pub fn scaled_value_sum(&self, event: usize, cpu: usize) -> u64 {
        let Some(origin) = self.events.get(event) else {
            return 0;
        };
        let clones = self
            .events
            .iter()
            .enumerate()
            .skip(event + 1)
            .filter(|(_, e)| e.origin == Some(event))
            .take(origin.clone_count)
            .map(|(i, _)| self.scaled_value(i, cpu));
        clones.fold(self.scaled_value(event, cpu), u64::saturating_add)
    }

    fn control(&self, f: impl Fn(&Counter) -> std::io::Result<()>) -> Result<()> {
        let mut last = None;
        for event in &self.events {
            for (cpu, state) in event.cpus.iter().enumerate() {
                let Some(counter) = &state.counter else {
                    continue;
                };
                if let Err(e) = f(counter) {
                    log::error!("error controlling {}/{}: {}", event.spec, cpu, e);
                    last = Some(Error::Ioctl {
                        event: event.spec.clone(),
                        cpu,
                        source: e,
                    });
                }
            }
        }
        last.map_or(Ok(()), Err)
    }

    /// Starts every open counter.
    pub fn enable(&self) -> Result<()> {
        self.control(Counter::enable)
    }

    /// Stops every open counter, their values stay readable.
    pub fn disable(&self) -> Result<()> {
        self.control(Counter::disable)
    }

    /// Closes the counters of one event, it can be set up again later.
    pub fn close_event(&mut self, event: usize) {
        if let Some(event) = self.events.get_mut(event) {
            for state in &mut event.cpus {
                state.counter = None;
            }
        }
    }

    /// Closes every counter. Closing again does nothing.
    pub fn close(&mut self) {
        for i in 0..self.events.len() {
            self.close_event(i);
        }
    }
}
