//! Money is tracked in integer pence. Formatting and parsing live here so
//! nothing else in the crate touches floats or currency strings.

/// Amount in pence. Signed so history deltas and reversions share the type.
pub type Pence = i64;

/// Renders pence as pounds, e.g. `1250` -> `£12.50`.
pub fn format_pence(pence: Pence) -> String {
    let sign = if pence < 0 { "-" } else { "" };
    let abs = pence.unsigned_abs();
    format!("{sign}£{}.{:02}", abs / 100, abs % 100)
}

/// Parses a pounds amount like `3`, `2.50`, or `£1.5` into pence.
///
/// Accepts an optional leading `£`, digits, and at most two fraction
/// digits. Anything else (negatives, bare `.`, trailing junk) is `None`.
pub fn parse_pounds(text: &str) -> Option<Pence> {
    let cleaned = text.trim().replace('£', "");
    let (pounds, fraction) = match cleaned.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (cleaned.as_str(), None),
    };
    if pounds.is_empty() || !pounds.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut pence = pounds.parse::<Pence>().ok()?.checked_mul(100)?;
    if let Some(frac) = fraction {
        if frac.is_empty() || frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value = frac.parse::<Pence>().ok()?;
        pence = pence.checked_add(if frac.len() == 1 { value * 10 } else { value })?;
    }
    Some(pence)
}

/// Parses a checkout score (two or three digits) into a pence amount.
/// A 101 checkout fines 101 pence, so the score is the amount.
pub fn parse_checkout(text: &str) -> Option<Pence> {
    let trimmed = text.trim();
    if trimmed.len() < 2 || trimmed.len() > 3 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<Pence>().ok()
}
