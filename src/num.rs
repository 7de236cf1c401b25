// Numbers in event files and term strings follow C conventions:
// `0x` prefix for hex, a leading `0` for octal, decimal otherwise.

fn radix_of(s: &str) -> (u32, &str) {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if hex.starts_with(|c: char| c.is_ascii_hexdigit()) {
            return (16, hex);
        }
    }
    if s.len() > 1 && s.starts_with('0') {
        return (8, &s[1..]);
    }
    (10, s)
}

/// Parses the longest numeric prefix, like `strtoul(s, NULL, 0)`.
///
/// Returns 0 if there is no number at all and saturates on overflow.
pub(crate) fn parse_prefix(s: &str) -> u64 {
    let (radix, digits) = radix_of(s.trim_start());
    let mut val: u64 = 0;
    for c in digits.chars() {
        let Some(d) = c.to_digit(radix) else {
            break;
        };
        val = val
            .checked_mul(radix as u64)
            .and_then(|v| v.checked_add(d as u64))
            .unwrap_or(u64::MAX);
    }
    val
}

/// Parses a whole string as a number, `None` on trailing garbage or overflow.
pub(crate) fn parse_exact(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let (radix, digits) = radix_of(s);
    if digits.is_empty() {
        return Some(0);
    }
    u64::from_str_radix(digits, radix).ok()
}
