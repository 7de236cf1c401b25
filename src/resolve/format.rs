use std::str::FromStr;

use crate::event::Descriptor;

/// Attr word a PMU field lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Word {
    Config,
    Config1,
    Config2,
}

/// Bit layout of a PMU field, as published in `<pmu>/format/<field>`.
///
/// The field value is scattered over the ranges, lowest value bits into the
/// first range. `config:0-7,21` is a 9-bit field whose top bit lands at bit 21.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Format {
    pub word: Word,
    /// Inclusive bit ranges.
    pub ranges: Vec<(u32, u32)>,
}

fn mask(bits: u32) -> u64 {
    u64::MAX.checked_shr(64 - bits).unwrap_or(0)
}

impl FromStr for Format {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        let (word, bits) = s.trim().split_once(':').ok_or(())?;
        let word = match word {
            "config" => Word::Config,
            "config1" => Word::Config1,
            "config2" => Word::Config2,
            _ => return Err(()),
        };

        let mut ranges = vec![];
        for range in bits.split(',') {
            let (lo, hi) = match range.split_once('-') {
                Some((lo, hi)) => (lo, hi),
                None => (range, range),
            };
            let lo: u32 = lo.trim().parse().map_err(|_| ())?;
            let hi: u32 = hi.trim().parse().map_err(|_| ())?;
            if lo > hi || hi > 63 {
                return Err(());
            }
            ranges.push((lo, hi));
        }

        let format = Self { word, ranges };
        match format.width() {
            1..=64 => Ok(format),
            _ => Err(()),
        }
    }
}

impl Format {
    /// Total number of value bits.
    pub fn width(&self) -> u32 {
        self.ranges.iter().map(|(lo, hi)| hi - lo + 1).sum()
    }

    /// Places `value` into the field bits, `None` if it does not fit.
    pub fn pack(&self, value: u64) -> Option<u64> {
        if value & !mask(self.width()) != 0 {
            return None;
        }
        let mut rest = value;
        let mut word = 0;
        for &(lo, hi) in &self.ranges {
            let bits = hi - lo + 1;
            word |= (rest & mask(bits)) << lo;
            rest = rest.checked_shr(bits).unwrap_or(0);
        }
        Some(word)
    }

    /// Extracts the field value from an attr word.
    pub fn unpack(&self, word: u64) -> u64 {
        let mut value = 0;
        let mut shift = 0;
        for &(lo, hi) in &self.ranges {
            let bits = hi - lo + 1;
            value |= ((word >> lo) & mask(bits)) << shift;
            shift += bits;
        }
        value
    }

    /// ORs `value` into the descriptor, `None` if it does not fit.
    pub(crate) fn apply(&self, desc: &mut Descriptor, value: u64) -> Option<()> {
        let bits = self.pack(value)?;
        match self.word {
            Word::Config => desc.config |= bits,
            Word::Config1 => desc.config1 |= bits,
            Word::Config2 => desc.or_config2(bits),
        }
        Some(())
    }
}
