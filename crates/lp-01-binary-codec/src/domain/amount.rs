//! # Amounts and Currencies
//!
//! An amount is either native (integer drops) or issued (decimal value in a
//! currency, backed by an issuer).
//!
//! ```text
//! native:  0 | sign(1=positive) | 62-bit drops
//! issued:  1 | sign(1=positive) | exponent+97 (8) | mantissa (54) | currency (160) | issuer (160)
//! ```
//!
//! Issued mantissas are normalised into `[10^15, 10^16)`; zero is the bare
//! `0x8000000000000000` prefix.

use super::buffer::CanonicalBuffer;
use super::errors::CodecError;
use serde_json::{json, Value};
use shared_types::AccountId;
use std::fmt;

/// Largest native amount, in drops.
pub const MAX_NATIVE_DROPS: u64 = 100_000_000_000_000_000;

const MIN_MANTISSA: u64 = 1_000_000_000_000_000;
const MAX_MANTISSA: u64 = 9_999_999_999_999_999;
const MIN_EXPONENT: i32 = -96;
const MAX_EXPONENT: i32 = 80;
const EXPONENT_BIAS: i32 = 97;
const MAX_SIGNIFICANT_DIGITS: usize = 16;

const ISSUED_BIT: u64 = 1 << 63;
const POSITIVE_BIT: u64 = 1 << 62;
const NATIVE_MASK: u64 = POSITIVE_BIT - 1;
const MANTISSA_MASK: u64 = (1 << 54) - 1;

// =============================================================================
// Currency
// =============================================================================

/// A 160-bit currency code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Currency(pub [u8; 20]);

impl Currency {
    /// The native currency inside a path step.
    pub const NATIVE: Currency = Currency([0u8; 20]);

    /// Parse a three-character code (stored as ASCII at bytes 12..15) or a
    /// 40-digit hex code.
    pub fn from_code(field: &str, code: &str) -> Result<Self, CodecError> {
        if code.len() == 3 && code.is_ascii() {
            let mut bytes = [0u8; 20];
            bytes[12..15].copy_from_slice(code.as_bytes());
            return Ok(Self(bytes));
        }
        if code.len() == 40 {
            let raw = hex::decode(code).map_err(|e| CodecError::invalid(field, e.to_string()))?;
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&raw);
            return Ok(Self(bytes));
        }
        Err(CodecError::invalid(field, format!("bad currency code {code:?}")))
    }

    /// Path steps spell the native currency `XRP` but store it as zero.
    pub fn from_path_code(field: &str, code: &str) -> Result<Self, CodecError> {
        if code == "XRP" {
            Ok(Self::NATIVE)
        } else {
            Self::from_code(field, code)
        }
    }

    pub fn is_native(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Three-letter code when the bytes are in standard form.
    fn standard_code(&self) -> Option<String> {
        let zeros_outside = self.0[..12].iter().chain(&self.0[15..]).all(|b| *b == 0);
        let code = &self.0[12..15];
        if zeros_outside && code.iter().all(|b| b.is_ascii_graphic()) {
            Some(String::from_utf8_lossy(code).into_owned())
        } else {
            None
        }
    }

    pub fn to_json(&self) -> Value {
        if self.is_native() {
            return Value::String("XRP".to_string());
        }
        match self.standard_code() {
            Some(code) => Value::String(code),
            None => Value::String(hex::encode_upper(self.0)),
        }
    }
}

// =============================================================================
// Issued value
// =============================================================================

/// A normalised decimal: `(-1)^negative * mantissa * 10^exponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuedValue {
    negative: bool,
    mantissa: u64,
    exponent: i32,
}

impl IssuedValue {
    pub const ZERO: IssuedValue = IssuedValue {
        negative: false,
        mantissa: 0,
        exponent: 0,
    };

    /// Parse a decimal string such as `-1`, `87654321.12345678` or `1.5e3`.
    pub fn parse(field: &str, text: &str) -> Result<Self, CodecError> {
        let text = text.trim();
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (number, mut exponent) = match body.find(|c| c == 'e' || c == 'E') {
            Some(i) => {
                let exp = body[i + 1..]
                    .parse::<i32>()
                    .map_err(|e| CodecError::invalid(field, e.to_string()))?;
                (&body[..i], i64::from(exp))
            }
            None => (body, 0i64),
        };

        let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
        let all_digits = int_part
            .chars()
            .chain(frac_part.chars())
            .all(|c| c.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty()) || !all_digits {
            return Err(CodecError::invalid(field, format!("bad decimal {text:?}")));
        }

        // Widened so digit shifts cannot overflow an `i32` exponent.
        let frac_digits = i64::try_from(frac_part.len())
            .map_err(|_| CodecError::range(field, format!("{text} is too long")))?;
        exponent = exponent
            .checked_sub(frac_digits)
            .ok_or_else(|| CodecError::range(field, format!("{text} exponent too small")))?;
        let joined = format!("{int_part}{frac_part}");
        let mut significant = joined.trim_start_matches('0').to_string();
        if significant.is_empty() {
            return Ok(Self::ZERO);
        }
        while significant.ends_with('0') {
            significant.pop();
            exponent += 1;
        }
        if significant.len() > MAX_SIGNIFICANT_DIGITS {
            return Err(CodecError::range(
                field,
                format!("{text} has more than {MAX_SIGNIFICANT_DIGITS} significant digits"),
            ));
        }

        let mut mantissa: u64 = significant
            .parse()
            .map_err(|e: std::num::ParseIntError| CodecError::invalid(field, e.to_string()))?;
        while mantissa < MIN_MANTISSA {
            mantissa *= 10;
            exponent -= 1;
        }

        if exponent > i64::from(MAX_EXPONENT) {
            return Err(CodecError::range(field, format!("{text} exponent too large")));
        }
        if exponent < i64::from(MIN_EXPONENT) {
            return Ok(Self::ZERO);
        }
        let exponent = i32::try_from(exponent)
            .map_err(|_| CodecError::range(field, format!("{text} exponent out of range")))?;

        Ok(Self {
            negative,
            mantissa,
            exponent,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    pub fn is_negative(&self) -> bool {
        self.negative && !self.is_zero()
    }

    pub fn mantissa(&self) -> u64 {
        self.mantissa
    }

    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    /// The 64-bit issued-amount prefix.
    pub fn to_bits(&self) -> u64 {
        if self.is_zero() {
            return ISSUED_BIT;
        }
        let mut bits = ISSUED_BIT | self.mantissa;
        if !self.negative {
            bits |= POSITIVE_BIT;
        }
        bits | (((self.exponent + EXPONENT_BIAS) as u64) << 54)
    }

    pub fn from_bits(bits: u64) -> Result<Self, CodecError> {
        let mantissa = bits & MANTISSA_MASK;
        if mantissa == 0 {
            return Ok(Self::ZERO);
        }
        if !(MIN_MANTISSA..=MAX_MANTISSA).contains(&mantissa) {
            return Err(CodecError::range(
                "Amount",
                format!("mantissa {mantissa} not normalised"),
            ));
        }
        Ok(Self {
            negative: bits & POSITIVE_BIT == 0,
            mantissa,
            exponent: ((bits >> 54) & 0xff) as i32 - EXPONENT_BIAS,
        })
    }
}

impl fmt::Display for IssuedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        let mut mantissa = self.mantissa;
        let mut exponent = self.exponent;
        while mantissa % 10 == 0 {
            mantissa /= 10;
            exponent += 1;
        }

        let digits = mantissa.to_string();
        let body = if exponent >= 0 {
            format!("{digits}{}", "0".repeat(exponent as usize))
        } else {
            let point = digits.len() as i32 + exponent;
            if point > 0 {
                let (int, frac) = digits.split_at(point as usize);
                format!("{int}.{frac}")
            } else {
                format!("0.{}{digits}", "0".repeat((-point) as usize))
            }
        };

        if self.negative {
            write!(f, "-{body}")
        } else {
            f.write_str(&body)
        }
    }
}

// =============================================================================
// Amount
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amount {
    Native {
        negative: bool,
        drops: u64,
    },
    Issued {
        value: IssuedValue,
        currency: Currency,
        issuer: AccountId,
    },
}

impl Amount {
    /// A non-negative native amount.
    pub fn drops(drops: u64) -> Self {
        Self::Native {
            negative: false,
            drops,
        }
    }

    /// Parse any accepted JSON form.
    ///
    /// - native: a drops string (`"789"`) or number (`213`)
    /// - issued: `"value/currency/issuer"` or `{value, currency, issuer}`
    pub fn from_json(field: &str, value: &Value) -> Result<Self, CodecError> {
        match value {
            Value::String(s) if s.contains('/') => {
                let parts: Vec<&str> = s.split('/').collect();
                match parts.as_slice() {
                    [v, c, i] => Self::issued(field, v, c, i),
                    _ => Err(CodecError::invalid(field, format!("bad amount {s:?}"))),
                }
            }
            Value::String(s) => Self::native_from_str(field, s),
            Value::Number(n) => {
                let v = n
                    .as_f64()
                    .ok_or_else(|| CodecError::invalid(field, "not a number"))?;
                Self::native_from_f64(field, v)
            }
            Value::Object(map) => {
                let text = |key: &str| -> Result<String, CodecError> {
                    match map.get(key) {
                        Some(Value::String(s)) => Ok(s.clone()),
                        Some(Value::Number(n)) => Ok(n.to_string()),
                        _ => Err(CodecError::invalid(field, format!("missing {key}"))),
                    }
                };
                Self::issued(field, &text("value")?, &text("currency")?, &text("issuer")?)
            }
            other => Err(CodecError::invalid(field, format!("bad amount {other}"))),
        }
    }

    fn issued(field: &str, value: &str, currency: &str, issuer: &str) -> Result<Self, CodecError> {
        Ok(Self::Issued {
            value: IssuedValue::parse(field, value)?,
            currency: Currency::from_code(field, currency)?,
            issuer: issuer
                .parse::<AccountId>()
                .map_err(|e| CodecError::address(field, e))?,
        })
    }

    fn native_from_str(field: &str, text: &str) -> Result<Self, CodecError> {
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        // Fractions of a drop truncate toward zero.
        let whole = body.split_once('.').map_or(body, |(w, _)| w);
        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(CodecError::invalid(field, format!("bad drops {text:?}")));
        }
        let drops: u64 = whole
            .parse()
            .map_err(|_| CodecError::range(field, format!("{text} exceeds native range")))?;
        Self::native_checked(field, negative, drops)
    }

    fn native_from_f64(field: &str, value: f64) -> Result<Self, CodecError> {
        let truncated = value.trunc();
        if !truncated.is_finite() || truncated.abs() > MAX_NATIVE_DROPS as f64 {
            return Err(CodecError::range(field, format!("{value} exceeds native range")));
        }
        Self::native_checked(field, truncated < 0.0, truncated.abs() as u64)
    }

    fn native_checked(field: &str, negative: bool, drops: u64) -> Result<Self, CodecError> {
        if drops > MAX_NATIVE_DROPS {
            return Err(CodecError::range(field, format!("{drops} drops exceeds native range")));
        }
        Ok(Self::Native {
            negative: negative && drops != 0,
            drops,
        })
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native { .. })
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Self::Native { negative, .. } => *negative,
            Self::Issued { value, .. } => value.is_negative(),
        }
    }

    pub fn write(&self, buf: &mut CanonicalBuffer) {
        match self {
            Self::Native { negative, drops } => {
                let mut bits = *drops;
                if !negative {
                    bits |= POSITIVE_BIT;
                }
                buf.append(&bits.to_be_bytes());
            }
            Self::Issued {
                value,
                currency,
                issuer,
            } => {
                buf.append(&value.to_bits().to_be_bytes());
                buf.append(&currency.0);
                buf.append(issuer.as_bytes());
            }
        }
    }

    pub fn read(buf: &mut CanonicalBuffer) -> Result<Self, CodecError> {
        let bits = buf.read_u64()?;
        if bits & ISSUED_BIT == 0 {
            let drops = bits & NATIVE_MASK;
            return Ok(Self::Native {
                negative: bits & POSITIVE_BIT == 0 && drops != 0,
                drops,
            });
        }
        let value = IssuedValue::from_bits(bits)?;
        let currency = Currency(buf.read_array()?);
        let issuer = AccountId(buf.read_array()?);
        Ok(Self::Issued {
            value,
            currency,
            issuer,
        })
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Native { negative, drops } => {
                let sign = if *negative { "-" } else { "" };
                Value::String(format!("{sign}{drops}"))
            }
            Self::Issued {
                value,
                currency,
                issuer,
            } => json!({
                "value": value.to_string(),
                "currency": currency.to_json(),
                "issuer": issuer.to_address(),
            }),
        }
    }
}
