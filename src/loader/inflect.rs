//! Identifier casing → path casing.

/// Convert an identifier segment to path casing.
///
/// `GearBox` → `gear_box`, `HTTPServer` → `http_server`, `Md5Hash` →
/// `md5_hash`, `Acme::Gear` → `acme/gear`.
///
/// An underscore goes before an uppercase letter when the previous character
/// is a lowercase letter or a digit, or when it closes a run of capitals and
/// digits and is itself followed by a lowercase letter.
pub fn underscore(word: &str) -> String {
    let chars: Vec<char> = word.replace("::", "/").chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let after_lower = prev.is_ascii_lowercase() || prev.is_ascii_digit();
            let ends_acronym = (prev.is_ascii_uppercase() || prev.is_ascii_digit())
                && next.map_or(false, |n| n.is_ascii_lowercase());
            if after_lower || ends_acronym {
                out.push('_');
            }
        }
        match c {
            '-' => out.push('_'),
            _ => out.push(c.to_ascii_lowercase()),
        }
    }
    out
}
