//! Human-typed duration parsing and formatting
//!
//! Three grammars are accepted, tried in this order:
//! - colon form, `mm:ss` or `hh:mm:ss`
//! - a plain integer, read as whole seconds
//! - a sequence of `<number><unit>` tokens with units `h`, `m` and `s`

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static COLON_FORM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{1,2}:[0-9]{2}(?::[0-9]{2})?$").expect("valid colon regex"));

static PLAIN_SECONDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid seconds regex"));

static TOKEN_SEQUENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[0-9]+\s*[hms]\s*)+$").expect("valid token sequence regex"));

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+)\s*([hms])").expect("valid token regex"));

static LEADING_COLON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{1,2}:[0-9]{2}(?::[0-9]{2})?)(?:\s+|$)").expect("valid leading colon regex")
});

static LEADING_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)\s*([hmsHMS])").expect("valid leading token regex"));

static LEADING_SECONDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)(?:\s+|$)").expect("valid leading seconds regex"));

/// Reasons a duration string was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,

    #[error("unrecognised duration: {0}")]
    Malformed(String),

    #[error("duration field out of range: {0}")]
    OutOfRange(String),

    #[error("duration too large")]
    Overflow,
}

/// Parse a complete duration string into whole seconds.
pub fn parse_duration(text: &str) -> Result<u64, DurationError> {
    let s = text.trim().to_ascii_lowercase();
    if s.is_empty() {
        return Err(DurationError::Empty);
    }

    if COLON_FORM.is_match(&s) {
        return parse_colon(&s);
    }

    if PLAIN_SECONDS.is_match(&s) {
        return parse_number(&s);
    }

    if TOKEN_SEQUENCE.is_match(&s) {
        let mut total: u64 = 0;
        for caps in TOKEN.captures_iter(&s) {
            total = accumulate(total, &caps[1], &caps[2])?;
        }
        return Ok(total);
    }

    Err(DurationError::Malformed(text.trim().to_string()))
}

/// Parse a duration at the start of `text`.
///
/// Returns the seconds and the number of bytes of `text` consumed, including
/// the whitespace that separates the duration from whatever follows it.
pub fn parse_leading_duration(text: &str) -> Result<(u64, usize), DurationError> {
    let offset = text.len() - text.trim_start().len();
    let s = &text[offset..];
    if s.trim_end().is_empty() {
        return Err(DurationError::Empty);
    }

    if let Some(caps) = LEADING_COLON.captures(s) {
        let seconds = parse_colon(&caps[1])?;
        return Ok((seconds, offset + caps[0].len()));
    }

    if let Some((seconds, consumed)) = leading_token_sequence(s)? {
        return Ok((seconds, offset + consumed));
    }

    if let Some(caps) = LEADING_SECONDS.captures(s) {
        let seconds = parse_number(&caps[1])?;
        return Ok((seconds, offset + caps[0].len()));
    }

    Err(DurationError::Malformed(s.trim_end().to_string()))
}

/// Render seconds as `<h>h <m>m <s>s`, dropping zero units.
pub fn format_duration(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;

    let mut parts = Vec::with_capacity(3);
    if h > 0 {
        parts.push(format!("{}h", h));
    }
    if m > 0 {
        parts.push(format!("{}m", m));
    }
    if s > 0 || parts.is_empty() {
        parts.push(format!("{}s", s));
    }
    parts.join(" ")
}

// Token sequence followed by end of input or whitespace. `None` when the
// sequence runs straight into other characters (e.g. `1h30mX`).
fn leading_token_sequence(s: &str) -> Result<Option<(u64, usize)>, DurationError> {
    let mut idx = 0;
    let mut tokens_end = 0;
    let mut total: u64 = 0;
    let mut matched = false;

    while let Some(caps) = LEADING_TOKEN.captures(&s[idx..]) {
        matched = true;
        let unit = caps[2].to_ascii_lowercase();
        total = accumulate(total, &caps[1], &unit)?;
        idx += caps[0].len();
        tokens_end = idx;

        let rest = &s[idx..];
        idx += rest.len() - rest.trim_start().len();
    }

    if !matched {
        return Ok(None);
    }

    let boundary = &s[tokens_end..];
    if boundary.is_empty() || boundary.starts_with(char::is_whitespace) {
        Ok(Some((total, idx)))
    } else {
        Ok(None)
    }
}

fn parse_colon(s: &str) -> Result<u64, DurationError> {
    let fields = s
        .split(':')
        .map(parse_number)
        .collect::<Result<Vec<_>, _>>()?;

    match fields.as_slice() {
        [mm, ss] => {
            if *ss >= 60 {
                return Err(DurationError::OutOfRange(s.to_string()));
            }
            Ok(mm * 60 + ss)
        }
        [hh, mm, ss] => {
            if *mm >= 60 || *ss >= 60 {
                return Err(DurationError::OutOfRange(s.to_string()));
            }
            Ok(hh * 3600 + mm * 60 + ss)
        }
        _ => Err(DurationError::Malformed(s.to_string())),
    }
}

fn parse_number(digits: &str) -> Result<u64, DurationError> {
    digits.parse::<u64>().map_err(|_| DurationError::Overflow)
}

fn accumulate(total: u64, digits: &str, unit: &str) -> Result<u64, DurationError> {
    let n = parse_number(digits)?;
    let scale = match unit {
        "h" => 3600,
        "m" => 60,
        _ => 1,
    };
    n.checked_mul(scale)
        .and_then(|secs| total.checked_add(secs))
        .ok_or(DurationError::Overflow)
}
