use std::io::{Result, Write};

use super::{Event, EventList};
use crate::count::Stat;

/// How [`EventList::print_aggr`] and [`EventList::print_per_cpu`] lay out values.
#[derive(Clone, Debug, Default)]
pub struct PrintOpts<'a> {
    /// Written at the start of every line, e.g. a timestamp.
    pub prefix: &'a str,
    /// Show copies of a multi-PMU event as one line summing them.
    pub merge: bool,
}

// Percentage of the enabled time the counter ran, omitted when it always ran.
fn write_runtime(w: &mut impl Write, time_enabled: u64, time_running: u64) -> Result<()> {
    if time_enabled != time_running && time_enabled != 0 {
        let pct = time_running as f64 / time_enabled as f64 * 100.0;
        write!(w, " [{:.2}%]", pct)?;
    }
    Ok(())
}

impl EventList {
    fn value(&self, i: usize, cpu: usize, merge: bool) -> u64 {
        match merge {
            true => self.scaled_value_sum(i, cpu),
            false => self.scaled_value(i, cpu),
        }
    }

    fn skip(event: &Event, merge: bool) -> bool {
        merge && event.origin.is_some()
    }

    /// One line per event with the value summed over all CPUs.
    pub fn print_aggr(&self, w: &mut impl Write, opts: &PrintOpts<'_>) -> Result<()> {
        for (i, event) in self.events.iter().enumerate() {
            if Self::skip(event, opts.merge) {
                continue;
            }

            let mut value = 0u64;
            let (mut enabled, mut running) = (0u64, 0u64);
            for (cpu, state) in event.cpus.iter().enumerate() {
                value = value.saturating_add(self.value(i, cpu, opts.merge));
                // Assumes every CPU was scaled the same way.
                if state.stat.time_running != 0 {
                    enabled = enabled.saturating_add(state.stat.time_enabled);
                    running = running.saturating_add(state.stat.time_running);
                }
            }
            if enabled == 0 {
                let first = event.cpus.first().map_or(Stat::default(), |s| s.stat);
                (enabled, running) = (first.time_enabled, first.time_running);
            }

            write!(w, "{}{:<30} {:>15}", opts.prefix, event.name(), value)?;
            write_runtime(w, enabled, running)?;
            writeln!(w)?;
        }
        Ok(())
    }

    /// One line per event and CPU it was opened on.
    pub fn print_per_cpu(&self, w: &mut impl Write, opts: &PrintOpts<'_>) -> Result<()> {
        for (i, event) in self.events.iter().enumerate() {
            if Self::skip(event, opts.merge) {
                continue;
            }
            for (cpu, state) in event.cpus.iter().enumerate() {
                if state.counter.is_none() {
                    continue;
                }
                let value = self.value(i, cpu, opts.merge);
                write!(
                    w,
                    "{}{:>3} {:<30} {:>15}",
                    opts.prefix,
                    cpu,
                    event.name(),
                    value
                )?;
                write_runtime(w, state.stat.time_enabled, state.stat.time_running)?;
                writeln!(w)?;
            }
        }
        Ok(())
    }
}
