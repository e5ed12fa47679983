//! Size header grammar
//!
//! File pages report their size as free text such as `3.2 KB`. This module
//! parses the `<number> <ws> <unit>` form and normalizes it to bytes using
//! decimal multiples.

use thiserror::Error;

/// Errors produced when a size text does not follow `<number> <ws> <unit>`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitParseError {
    #[error("size text is empty")]
    Empty,

    #[error("invalid magnitude '{0}'")]
    InvalidMagnitude(String),

    #[error("unexpected token '{token}' in size text '{input}'")]
    UnexpectedToken { input: String, token: String },
}

/// Returns the byte multiplier for a unit token
///
/// Unknown tokens and the empty unit count as plain bytes.
pub fn unit_multiplier(unit: &str) -> f64 {
    match unit.to_ascii_lowercase().as_str() {
        "kb" => 1_000.0,
        "mb" => 1_000_000.0,
        "gb" => 1e9,
        _ => 1.0,
    }
}

/// Scales a magnitude expressed in `unit` to bytes
///
/// ```
/// use repo_census::crawler::to_bytes;
///
/// assert_eq!(to_bytes("kb", 12.0), 12_000.0);
/// assert_eq!(to_bytes("unknown", 5.0), 5.0);
/// ```
pub fn to_bytes(unit: &str, magnitude: f64) -> f64 {
    magnitude * unit_multiplier(unit)
}

/// Parses a size text like `3.2 kb` or `840 Bytes` into bytes
///
/// A bare number is read as bytes. Thousands separators (`1,024`) are
/// accepted in the magnitude.
pub fn parse_size(text: &str) -> Result<f64, UnitParseError> {
    let mut tokens = text.split_whitespace();

    let magnitude_token = tokens.next().ok_or(UnitParseError::Empty)?;
    let magnitude: f64 = magnitude_token
        .replace(',', "")
        .parse()
        .map_err(|_| UnitParseError::InvalidMagnitude(magnitude_token.to_string()))?;

    if !magnitude.is_finite() || magnitude < 0.0 {
        return Err(UnitParseError::InvalidMagnitude(magnitude_token.to_string()));
    }

    let unit = tokens.next().unwrap_or("");

    if let Some(extra) = tokens.next() {
        return Err(UnitParseError::UnexpectedToken {
            input: text.to_string(),
            token: extra.to_string(),
        });
    }

    Ok(to_bytes(unit, magnitude))
}

/// Reduces a raw size header to the segment after its last `)`
///
/// Headers read like `12 lines (10 sloc) · 3.2 KB`; newlines are dropped,
/// runs of whitespace collapse, the result is lowercased and separator
/// characters before the magnitude are stripped. The magnitude starts at the
/// first digit, or at a `.` directly followed by a digit (`.5 kb`).
pub fn size_segment(header_text: &str) -> String {
    let flattened = header_text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let tail = match flattened.rfind(')') {
        Some(index) => &flattened[index + 1..],
        None => flattened.as_str(),
    };

    let start = tail
        .char_indices()
        .find(|&(index, c)| {
            c.is_ascii_digit()
                || (c == '.' && tail[index + 1..].starts_with(|next: char| next.is_ascii_digit()))
        })
        .map_or(tail.len(), |(index, _)| index);

    tail[start..].trim_end().to_string()
}
