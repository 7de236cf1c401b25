use crate::ffi::bindings as b;

/// Counter value read back from the kernel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stat {
    pub count: u64,
    /// Nanoseconds the counter was enabled.
    pub time_enabled: u64,
    /// Nanoseconds the counter was actually on the PMU.
    pub time_running: u64,
    pub id: Option<u64>,
}

impl Stat {
    pub(crate) const MAX_READ_LEN: usize = 4 * size_of::<u64>();

    // https://github.com/torvalds/linux/blob/v6.13/include/uapi/linux/perf_event.h#L344
    // struct read_format {
    //     u64 value;
    //     { u64 time_enabled; } && PERF_FORMAT_TOTAL_TIME_ENABLED
    //     { u64 time_running; } && PERF_FORMAT_TOTAL_TIME_RUNNING
    //     { u64 id;           } && PERF_FORMAT_ID
    // };
    pub(crate) fn read_len(read_format: u64) -> usize {
        let mut size = size_of::<u64>();

        macro_rules! when {
            ($flag:ident) => {
                if read_format & b::$flag as u64 != 0 {
                    size += size_of::<u64>();
                }
            };
        }

        when!(PERF_FORMAT_TOTAL_TIME_ENABLED);
        when!(PERF_FORMAT_TOTAL_TIME_RUNNING);
        when!(PERF_FORMAT_ID);

        size
    }

    /// Decodes `read_len(read_format)` bytes in native byte order.
    pub(crate) fn from_bytes(buf: &[u8], read_format: u64) -> Self {
        let mut words = buf.chunks_exact(size_of::<u64>()).map(|c| {
            let mut word = [0; size_of::<u64>()];
            word.copy_from_slice(c);
            u64::from_ne_bytes(word)
        });

        macro_rules! when {
            ($flag:ident) => {
                if read_format & b::$flag as u64 != 0 {
                    words.next()
                } else {
                    None
                }
            };
        }

        let count = words.next().unwrap_or(0);
        let time_enabled = when!(PERF_FORMAT_TOTAL_TIME_ENABLED).unwrap_or(0);
        let time_running = when!(PERF_FORMAT_TOTAL_TIME_RUNNING).unwrap_or(0);
        let id = when!(PERF_FORMAT_ID);

        Self {
            count,
            time_enabled,
            time_running,
            id,
        }
    }

    /// The count extrapolated over the time the counter was enabled.
    ///
    /// A multiplexed counter only runs for part of the time it is enabled.
    /// Counts of counters that never ran, or always ran, are returned as is.
    pub fn scaled(&self) -> u64 {
        if self.time_enabled == self.time_running || self.time_running == 0 {
            return self.count;
        }
        let scaled =
            self.count as u128 * self.time_enabled as u128 / self.time_running as u128;
        scaled.try_into().unwrap_or(u64::MAX)
    }
}
