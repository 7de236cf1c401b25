use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// CPUs to measure on, written as `0,2-3,8-`.
///
/// A range without an end (`8-`) covers every CPU from its start on.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CpuMask(Vec<(usize, Option<usize>)>);

impl CpuMask {
    pub fn contains(&self, cpu: usize) -> bool {
        self.0
            .iter()
            .any(|&(lo, hi)| cpu >= lo && hi.map_or(true, |hi| cpu <= hi))
    }
}

impl FromStr for CpuMask {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let bad = || Error::CpuMask(s.to_owned());
        let mut ranges = vec![];
        for range in s.trim().split(',') {
            let range = range.trim();
            let (lo, hi) = match range.split_once('-') {
                Some((lo, "")) => (lo.parse().map_err(|_| bad())?, None),
                Some((lo, hi)) => (
                    lo.parse().map_err(|_| bad())?,
                    Some(hi.parse().map_err(|_| bad())?),
                ),
                None => {
                    let cpu = range.parse().map_err(|_| bad())?;
                    (cpu, Some(cpu))
                }
            };
            if hi.is_some_and(|hi| hi < lo) {
                return Err(bad());
            }
            ranges.push((lo, hi));
        }
        Ok(Self(ranges))
    }
}

impl fmt::Display for CpuMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (lo, hi)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            match hi {
                Some(hi) if hi == lo => write!(f, "{}", lo)?,
                Some(hi) => write!(f, "{}-{}", lo, hi)?,
                None => write!(f, "{}-", lo)?,
            }
        }
        Ok(())
    }
}
