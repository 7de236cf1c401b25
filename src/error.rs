use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by event resolution and session management.
///
/// Nothing in this crate terminates the process or retries: every error is
/// handed back to the immediate caller with the offending event, field or path.
#[derive(Debug, Error)]
pub enum Error {
    /// The name is neither a raw event, a kernel alias, a PMU term list nor a catalog entry.
    #[error("cannot resolve event `{0}`")]
    NotFound(String),

    /// A sysfs format string could not be parsed.
    #[error("cannot parse kernel format `{format}` of field `{field}`")]
    Format { field: String, format: String },

    /// A term value has more significant bits than its field.
    #[error("value {value:#x} of field `{field}` does not fit in {width} bits")]
    FieldOverflow { field: String, value: u64, width: u32 },

    /// A malformed `field=value` term or an unknown field of the PMU.
    #[error("invalid term `{term}` in `{event}`")]
    Term { term: String, event: String },

    /// Unknown event modifier.
    #[error("unknown modifier `{qual}` in `{event}`")]
    Qualifier { qual: char, event: String },

    /// Unbalanced or nested `{`/`}` groups.
    #[error("unbalanced event group in `{0}`")]
    GroupSyntax(String),

    /// Events of one group count on different numbers of PMU instances.
    #[error("mismatch in the number of PMU instances for multi-PMU event `{0}`")]
    PmuMismatch(String),

    /// The event catalog is not an array of flat objects.
    #[error("malformed event catalog {path:?}: {reason}")]
    Catalog { path: PathBuf, reason: String },

    /// An invalid CPU list.
    #[error("invalid cpu mask `{0}`")]
    CpuMask(String),

    #[error("cannot access {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot open perf event for {event}/{cpu}")]
    Open {
        event: String,
        cpu: usize,
        #[source]
        source: io::Error,
    },

    #[error("cannot read perf event {event}/{cpu}")]
    Read {
        event: String,
        cpu: usize,
        #[source]
        source: io::Error,
    },

    #[error("cannot enable or disable perf event {event}/{cpu}")]
    Ioctl {
        event: String,
        cpu: usize,
        #[source]
        source: io::Error,
    },

    /// No counter of the event list could be opened.
    #[error("no perf event could be opened")]
    NoCounters,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
