//! Small text helpers shared by the parser and the formatters.

/// Title-case a string: uppercase every letter that follows a non-letter,
/// lowercase the rest. Matches the normalization applied to query terms,
/// so `"mad scientist"` and `"MAD SCIENTIST"` hit the same cache key.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
