//! Canonical duration text, e.g. `72h3m0.5s`.
//!
//! Durations print with the largest useful units first and no separators.
//! Sub-second values use a single `ns`, `µs` or `ms` unit. The parser accepts
//! the same grammar plus an optional sign and the `us`/`μs` spellings of
//! microseconds.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Largest magnitude a duration may have, in nanoseconds.
const MAX_NANOS: u128 = 1 << 63;

/// Fraction digits beyond this are ignored while parsing.
const MAX_FRACTION_DIGITS: usize = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("time: invalid duration {0:?}")]
    Invalid(String),
    #[error("time: missing unit in duration {0:?}")]
    MissingUnit(String),
    #[error("time: unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },
    #[error("time: duration {0:?} out of range")]
    Overflow(String),
    #[error("time: negative duration {0:?}")]
    Negative(String),
}

/// Display adapter printing a [`Duration`] in canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Text(pub Duration);

impl Display for Text {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_nanos(f, self.0.as_nanos())
    }
}

/// A duration that may point backwards in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignedDuration {
    pub negative: bool,
    pub magnitude: Duration,
}

impl SignedDuration {
    pub fn is_negative(&self) -> bool {
        self.negative && !self.magnitude.is_zero()
    }
}

impl From<Duration> for SignedDuration {
    fn from(magnitude: Duration) -> Self {
        Self {
            negative: false,
            magnitude,
        }
    }
}

impl Display for SignedDuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            f.write_str("-")?;
        }
        write_nanos(f, self.magnitude.as_nanos())
    }
}

impl FromStr for SignedDuration {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_signed(s)
    }
}

pub fn format(duration: Duration) -> String {
    Text(duration).to_string()
}

/// Parses a non-negative duration.
pub fn parse(s: &str) -> Result<Duration, ParseError> {
    let value = parse_signed(s)?;
    if value.is_negative() {
        return Err(ParseError::Negative(s.to_string()));
    }

    Ok(value.magnitude)
}

pub fn parse_signed(input: &str) -> Result<SignedDuration, ParseError> {
    let invalid = || ParseError::Invalid(input.to_string());

    let (negative, mut rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    if rest == "0" {
        return Ok(SignedDuration {
            negative,
            magnitude: Duration::ZERO,
        });
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        if !rest.starts_with(|c: char| c == '.' || c.is_ascii_digit()) {
            return Err(invalid());
        }

        let (whole, after) = split_digits(rest);
        let value = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u128>()
                .ok()
                .filter(|value| *value <= MAX_NANOS)
                .ok_or_else(invalid)?
        };
        rest = after;

        let mut fraction = "";
        if let Some(after) = rest.strip_prefix('.') {
            let (digits, after) = split_digits(after);
            fraction = digits;
            rest = after;
        }
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        let end = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        if end == 0 {
            return Err(ParseError::MissingUnit(input.to_string()));
        }
        let (unit, after) = rest.split_at(end);
        rest = after;

        let scale = unit_nanos(unit).ok_or_else(|| ParseError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        let mut nanos = value
            .checked_mul(scale)
            .filter(|nanos| *nanos <= MAX_NANOS)
            .ok_or_else(|| ParseError::Overflow(input.to_string()))?;
        nanos += fraction_nanos(fraction, scale);

        total += nanos;
        if total > MAX_NANOS {
            return Err(ParseError::Overflow(input.to_string()));
        }
    }

    if !negative && total == MAX_NANOS {
        return Err(ParseError::Overflow(input.to_string()));
    }

    Ok(SignedDuration {
        negative,
        magnitude: nanos_to_duration(total),
    })
}

fn unit_nanos(unit: &str) -> Option<u128> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SEC,
        "m" => 60 * NANOS_PER_SEC,
        "h" => 3_600 * NANOS_PER_SEC,
        _ => return None,
    };
    Some(nanos)
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

/// Converts the digits after a decimal point into nanoseconds of `scale`,
/// truncating anything below one nanosecond.
fn fraction_nanos(digits: &str, scale: u128) -> u128 {
    let mut numerator: u128 = 0;
    let mut denominator: u128 = 1;
    for digit in digits.bytes().take(MAX_FRACTION_DIGITS) {
        numerator = numerator * 10 + u128::from(digit - b'0');
        denominator *= 10;
    }
    numerator * scale / denominator
}

fn nanos_to_duration(nanos: u128) -> Duration {
    let secs = (nanos / NANOS_PER_SEC) as u64;
    let subsec = (nanos % NANOS_PER_SEC) as u32;
    Duration::new(secs, subsec)
}

fn write_nanos(f: &mut Formatter<'_>, nanos: u128) -> fmt::Result {
    if nanos == 0 {
        return f.write_str("0s");
    }

    if nanos < NANOS_PER_SEC {
        let (precision, unit) = match nanos {
            n if n < 1_000 => (0, "ns"),
            n if n < 1_000_000 => (3, "µs"),
            _ => (6, "ms"),
        };
        let scale = 10u128.pow(precision);
        write!(f, "{}", nanos / scale)?;
        write_fraction(f, nanos % scale, precision)?;
        return f.write_str(unit);
    }

    let secs = nanos / NANOS_PER_SEC;
    let (hours, minutes, seconds) = (secs / 3_600, secs / 60 % 60, secs % 60);
    if hours > 0 {
        write!(f, "{hours}h{minutes}m")?;
    } else if minutes > 0 {
        write!(f, "{minutes}m")?;
    }
    write!(f, "{seconds}")?;
    write_fraction(f, nanos % NANOS_PER_SEC, 9)?;
    f.write_str("s")
}

fn write_fraction(f: &mut Formatter<'_>, mut fraction: u128, mut precision: u32) -> fmt::Result {
    while precision > 0 && fraction % 10 == 0 {
        fraction /= 10;
        precision -= 1;
    }
    if precision == 0 {
        return Ok(());
    }

    write!(f, ".{:0width$}", fraction, width = precision as usize)
}
