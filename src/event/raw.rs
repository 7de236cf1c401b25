use super::Descriptor;
use crate::ffi::bindings as b;

/// A "raw" implementation-specific event written as `r<hex>[:modifiers]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raw<'a> {
    /// Event config.
    pub config: u64,
    /// Modifiers after the colon, not yet validated.
    pub quals: &'a str,
}

impl<'a> Raw<'a> {
    /// Matches `^r[0-9A-Fa-f]+(:.*)?$`.
    ///
    /// Returns `None` for anything else, including hex runs too long for 64 bits,
    /// so names such as `rs_events.empty_cycles` fall through to the catalog.
    pub fn parse(s: &'a str) -> Option<Self> {
        let rest = s.strip_prefix('r')?;
        let (hex, quals) = match rest.split_once(':') {
            Some((hex, quals)) => (hex, quals),
            None => (rest, ""),
        };
        if hex.is_empty() || !hex.bytes().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let config = u64::from_str_radix(hex, 16).ok()?;
        Some(Self { config, quals })
    }

    pub fn descriptor(&self) -> Descriptor {
        Descriptor {
            ty: b::PERF_TYPE_RAW,
            config: self.config,
            ..Default::default()
        }
    }
}
