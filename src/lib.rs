//! Resolve symbolic PMU event names into `perf_event_open` descriptors, and
//! count them across CPUs.
//!
//! ## Example
//!
//! Count retired instructions and core cycles as one group on every CPU,
//! with the event encodings taken from the JSON event list of this CPU model.
//!
//! ```no_run
//! use pmu_events::catalog::Catalog;
//! use pmu_events::config::{Measure, Opts};
//! use pmu_events::resolve::Resolver;
//! use pmu_events::session::{EventList, PrintOpts};
//!
//! // Event files are looked up in `~/.cache/pmu-events` (see `catalog::Location`).
//! let catalog = Catalog::new();
//! let resolver = Resolver::new(&catalog);
//!
//! let mut list = EventList::new();
//! list.parse(&resolver, "{INST_RETIRED.ANY,CPU_CLK_UNHALTED.THREAD}")
//!     .unwrap();
//!
//! let opts = Opts {
//!     measure: Measure::System,
//!     ..Default::default()
//! };
//! list.setup(&opts).unwrap(); // Counting starts now.
//!
//! std::thread::sleep(std::time::Duration::from_secs(1));
//! list.disable().unwrap();
//! list.read_all().unwrap();
//!
//! list.print_aggr(&mut std::io::stdout(), &PrintOpts::default())
//!     .unwrap();
//! ```
//!
//! A single event can also be resolved and opened directly:
//!
//! ```no_run
//! use pmu_events::catalog::Catalog;
//! use pmu_events::config::{Cpu, Proc};
//! use pmu_events::count::Counter;
//! use pmu_events::resolve::Resolver;
//!
//! let catalog = Catalog::new();
//! let (desc, _) = Resolver::new(&catalog).resolve("cpu/event=0xc0/u").unwrap();
//!
//! let counter = Counter::new(&desc, (Proc::CURRENT, Cpu(0))).unwrap();
//! counter.enable().unwrap();
//! println!("{} instructions", counter.stat().unwrap().count);
//! ```

pub mod catalog;
pub mod config;
pub mod count;
mod error;
pub mod event;
mod ffi;
mod num;
pub mod resolve;
pub mod session;
pub mod sysfs;

pub use error::{Error, Result};
