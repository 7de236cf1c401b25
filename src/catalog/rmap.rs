use super::{Catalog, Entry};
use crate::num::parse_exact;

fn term<'a>(event: &'a str, name: &str) -> Option<&'a str> {
    event.split(',').find_map(|t| {
        let (k, v) = t.split_once('=')?;
        (k.trim() == name).then_some(v)
    })
}

impl Catalog {
    /// Finds the event for a raw code, event select in the low byte and unit mask above it.
    ///
    /// Only `event` and `umask` take part in the match, so events that differ just in
    /// other modifiers (cmask, edge, ...) map to whichever comes first.
    pub fn rmap(&self, code: u64) -> Option<&Entry> {
        let event = code & 0xff;
        let umask = (code >> 8) & 0xff;
        self.iter().find(|e| {
            let Some(ev) = term(&e.event, "event").and_then(parse_exact) else {
                return false;
            };
            let um = term(&e.event, "umask").and_then(parse_exact).unwrap_or(0);
            ev == event && um == umask
        })
    }
}
