use super::EventList;
use crate::config::{Measure, Opts, Target};
use crate::count::{Counter, Open, PerfEventOpen};
use crate::error::{Error, Result};

impl EventList {
    /// Opens the counters of every event with `perf_event_open`.
    ///
    /// See [`setup_with`][Self::setup_with].
    pub fn setup(&mut self, opts: &Opts) -> Result<()> {
        self.setup_with(&PerfEventOpen, opts)
    }

    /// Opens the counters of every event on every CPU, or for uncore events on
    /// one CPU per socket.
    ///
    /// Group members join the counter of their group leader on the same CPU.
    /// Offline CPUs are skipped. Other failures are logged and do not stop the
    /// remaining opens: this succeeds if at least one counter was opened, and
    /// returns the last failure otherwise.
    pub fn setup_with(&mut self, opener: &impl Open, opts: &Opts) -> Result<()> {
        let on_exec = matches!(opts.measure, Measure::OnExec(_));
        let selected = |cpu: usize| opts.cpumask.as_ref().map_or(true, |m| m.contains(cpu));

        let mut opened = 0;
        let mut last = None;
        let mut leader: Option<usize> = None;

        for i in 0..self.events.len() {
            let event = &mut self.events[i];
            if event.group_leader || !event.in_group {
                leader = None;
            }
            event.desc.inherit = true;
            event.desc.disabled = on_exec;
            event.desc.enable_on_exec = on_exec;
            event.desc.read_format.time_enabled = true;
            event.desc.read_format.time_running = true;

            let cpus: Vec<usize> = match event.uncore {
                true => self.topology.socket_cpus.clone(),
                false => (0..self.topology.num_cpus).collect(),
            };

            for cpu in cpus.into_iter().filter(|&cpu| selected(cpu)) {
                if cpu >= self.events[i].cpus.len() {
                    continue;
                }
                let group = leader.and_then(|l| self.events[l].cpus.get(cpu)?.counter.as_ref());
                let event = &self.events[i];
                match Counter::open_with(opener, &event.desc, &Target::measure(&opts.measure, cpu), group) {
                    Ok(counter) => {
                        self.events[i].cpus[cpu].counter = Some(counter);
                        opened += 1;
                    }
                    Err(e)
                        if e.raw_os_error() == Some(libc::EINVAL)
                            && !self.sysfs.cpu_online(cpu) =>
                    {
                        log::debug!("cpu {} is offline, skipping {}", cpu, event.spec);
                    }
                    Err(e) => {
                        log::error!("cannot open perf event for {}/{}: {}", event.spec, cpu, e);
                        last = Some(Error::Open {
                            event: event.spec.clone(),
                            cpu,
                            source: e,
                        });
                    }
                }
            }

            let event = &self.events[i];
            if event.group_leader {
                leader = Some(i);
            }
            if event.end_group {
                leader = None;
            }
        }

        match opened {
            0 => Err(last.unwrap_or(Error::NoCounters)),
            _ => Ok(()),
        }
    }
}
