use crate::error::{Error, Result};
use crate::event::Descriptor;

/// Applies event modifiers such as `ukp`, left to right.
pub(crate) fn apply(quals: &str, event: &str, desc: &mut Descriptor) -> Result<()> {
    for qual in quals.chars() {
        match qual {
            'p' => desc.precise_ip = (desc.precise_ip + 1).min(3),
            'k' => desc.exclude.user = true,
            'u' => desc.exclude.kernel = true,
            'h' | 'H' => desc.exclude.guest = true,
            'G' => desc.exclude.host = true,
            'I' => desc.exclude.idle = true,
            'D' => desc.pinned = true,
            ':' => (),
            _ => {
                return Err(Error::Qualifier {
                    qual,
                    event: event.to_owned(),
                })
            }
        }
    }
    Ok(())
}
