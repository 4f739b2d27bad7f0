//! Short codes for recipe links: the recipe id written in base 36.

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn encode(id: i32) -> String {
    let mut n = id.unsigned_abs();
    if n == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while n > 0 {
        digits.push(ALPHABET[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();

    String::from_utf8(digits).unwrap_or_default()
}

/// Returns `None` for anything `encode` could not have produced.
pub fn decode(code: &str) -> Option<i32> {
    if code.is_empty()
        || code.len() > 6
        || !code.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
    {
        return None;
    }
    if code.len() > 1 && code.starts_with('0') {
        return None;
    }
    let id = u32::from_str_radix(code, 36).ok()?;
    i32::try_from(id).ok().filter(|id| *id > 0)
}
