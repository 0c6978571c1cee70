//! # Serializer
//!
//! JSON value tree to canonical bytes. Fields are sorted by
//! `(type code, field code)` before emission, so the output never depends on
//! input order.

use super::amount::Amount;
use super::buffer::CanonicalBuffer;
use super::errors::CodecError;
use super::fields::{field_by_name, FieldDef, TypeCode, ARRAY_END, OBJECT_END};
use super::paths::PathSet;
use super::schema::{LedgerEntryType, SchemaKind, TransactionType};
use serde_json::{Map, Value};
use shared_types::{result_value, AccountId};

/// Encode a top-level object against the schema for `kind`.
pub fn encode(kind: SchemaKind, value: &Value) -> Result<CanonicalBuffer, CodecError> {
    let object = as_object(kind.to_string().as_str(), value)?;
    kind.validate(object)?;
    let mut buf = CanonicalBuffer::new();
    write_fields(&mut buf, object)?;
    Ok(buf)
}

/// Encode a top-level object, inferring its schema kind.
pub fn encode_auto(value: &Value) -> Result<CanonicalBuffer, CodecError> {
    let object = as_object("object", value)?;
    encode(SchemaKind::infer(object)?, value)
}

/// Encode a field set with no schema check and no terminator.
pub fn encode_fields(value: &Value) -> Result<CanonicalBuffer, CodecError> {
    let mut buf = CanonicalBuffer::new();
    write_fields(&mut buf, as_object("object", value)?)?;
    Ok(buf)
}

/// Encode a nested object: its fields followed by the end-of-object marker.
pub fn encode_object(value: &Value) -> Result<CanonicalBuffer, CodecError> {
    let mut buf = encode_fields(value)?;
    buf.push(OBJECT_END);
    Ok(buf)
}

/// Encode an array of single-field objects followed by the end-of-array marker.
pub fn encode_array(value: &Value) -> Result<CanonicalBuffer, CodecError> {
    let mut buf = CanonicalBuffer::new();
    write_array(&mut buf, "array", value)?;
    Ok(buf)
}

fn as_object<'a>(what: &str, value: &'a Value) -> Result<&'a Map<String, Value>, CodecError> {
    value
        .as_object()
        .ok_or_else(|| CodecError::invalid(what, "expected a JSON object"))
}

fn write_fields(buf: &mut CanonicalBuffer, object: &Map<String, Value>) -> Result<(), CodecError> {
    let mut unknown = Vec::new();
    let mut fields: Vec<(&'static FieldDef, &Value)> = Vec::with_capacity(object.len());
    for (name, value) in object {
        match field_by_name(name) {
            Some(def) => fields.push((def, value)),
            None => unknown.push(name.clone()),
        }
    }
    if !unknown.is_empty() {
        return Err(CodecError::SchemaViolation {
            kind: "object".to_string(),
            missing: Vec::new(),
            unknown,
        });
    }

    fields.sort_by_key(|(def, _)| def.ordinal());
    for (def, value) in fields {
        write_field(buf, def, value)?;
    }
    Ok(())
}

fn write_field(buf: &mut CanonicalBuffer, def: &FieldDef, value: &Value) -> Result<(), CodecError> {
    buf.append(&def.header());
    let name = def.name;
    match def.type_code {
        TypeCode::UInt8 => {
            let v = if name == "TransactionResult" {
                result_code_value(name, value)?
            } else {
                to_uint(name, value, u8::MAX as u64)?
            };
            buf.push(v as u8);
        }
        TypeCode::UInt16 => {
            let v = match name {
                "TransactionType" => {
                    named_code(name, value, |s| TransactionType::from_name(s).map(|t| t.code()))?
                }
                "LedgerEntryType" => {
                    named_code(name, value, |s| LedgerEntryType::from_name(s).map(|t| t.code()))?
                }
                _ => to_uint(name, value, u16::MAX as u64)?,
            };
            buf.append(&(v as u16).to_be_bytes());
        }
        TypeCode::UInt32 => {
            let v = to_uint(name, value, u32::MAX as u64)?;
            buf.append(&(v as u32).to_be_bytes());
        }
        TypeCode::UInt64 => buf.append(&to_uint64(name, value)?.to_be_bytes()),
        TypeCode::Hash128 => buf.append(&fixed_bytes(name, value, 16)?),
        TypeCode::Hash160 => buf.append(&fixed_bytes(name, value, 20)?),
        TypeCode::Hash256 => buf.append(&fixed_bytes(name, value, 32)?),
        TypeCode::Amount => Amount::from_json(name, value)?.write(buf),
        TypeCode::Blob => {
            let s = value
                .as_str()
                .ok_or_else(|| CodecError::invalid(name, "blob must be a hex string"))?;
            let raw = hex::decode(s).map_err(|e| CodecError::invalid(name, e.to_string()))?;
            buf.append_vl(&raw)?;
        }
        TypeCode::AccountId => {
            let s = value
                .as_str()
                .ok_or_else(|| CodecError::invalid(name, "account must be a string"))?;
            let account: AccountId = s.parse().map_err(|e| CodecError::address(name, e))?;
            buf.append_vl(account.as_bytes())?;
        }
        TypeCode::Object => {
            write_fields(buf, as_object(name, value)?)?;
            buf.push(OBJECT_END);
        }
        TypeCode::Array => write_array(buf, name, value)?,
        TypeCode::PathSet => PathSet::from_json(name, value)?.write(buf),
        TypeCode::Vector256 => {
            let items = value
                .as_array()
                .ok_or_else(|| CodecError::invalid(name, "expected a list of hashes"))?;
            let mut raw = Vec::with_capacity(items.len() * 32);
            for item in items {
                raw.extend(fixed_bytes(name, item, 32)?);
            }
            buf.append_vl(&raw)?;
        }
    }
    Ok(())
}

fn write_array(buf: &mut CanonicalBuffer, name: &str, value: &Value) -> Result<(), CodecError> {
    let items = value
        .as_array()
        .ok_or_else(|| CodecError::invalid(name, "expected a list"))?;
    for item in items {
        let element = as_object(name, item)?;
        if element.len() != 1 {
            return Err(CodecError::invalid(
                name,
                "array elements must hold exactly one field",
            ));
        }
        write_fields(buf, element)?;
    }
    buf.push(ARRAY_END);
    Ok(())
}

// -----------------------------------------------------------------------------
// Scalars
// -----------------------------------------------------------------------------

/// Unsigned integer from a JSON number or decimal string.
///
/// Fractions truncate toward zero; negatives and values above `max` are
/// range errors.
fn to_uint(field: &str, value: &Value, max: u64) -> Result<u64, CodecError> {
    let v = match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u
            } else {
                let f = n
                    .as_f64()
                    .ok_or_else(|| CodecError::invalid(field, "not a number"))?
                    .trunc();
                if f < 0.0 {
                    return Err(CodecError::range(field, format!("{n} is negative")));
                }
                if f > max as f64 {
                    return Err(CodecError::range(field, format!("{n} exceeds {max}")));
                }
                f as u64
            }
        }
        Value::String(s) => {
            let whole = s.split_once('.').map_or(s.as_str(), |(w, _)| w);
            if let Some(rest) = whole.strip_prefix('-') {
                if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
                    return Err(CodecError::range(field, format!("{s} is negative")));
                }
            }
            if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
                return Err(CodecError::invalid(field, format!("not an integer: {s:?}")));
            }
            whole
                .parse::<u64>()
                .map_err(|_| CodecError::range(field, format!("{s} exceeds {max}")))?
        }
        other => return Err(CodecError::invalid(field, format!("not an integer: {other}"))),
    };
    if v > max {
        return Err(CodecError::range(field, format!("{v} exceeds {max}")));
    }
    Ok(v)
}

/// 64-bit values travel as hex strings of at most 16 digits.
fn to_uint64(field: &str, value: &Value) -> Result<u64, CodecError> {
    match value {
        Value::String(s) => {
            if s.len() > 16 {
                return Err(CodecError::range(field, format!("{s} is wider than 64 bits")));
            }
            u64::from_str_radix(s, 16).map_err(|e| CodecError::invalid(field, e.to_string()))
        }
        other => to_uint(field, other, u64::MAX),
    }
}

fn named_code(
    field: &str,
    value: &Value,
    by_name: impl Fn(&str) -> Option<u16>,
) -> Result<u64, CodecError> {
    match value {
        Value::String(s) => by_name(s)
            .map(u64::from)
            .ok_or_else(|| CodecError::invalid(field, format!("unknown {field} {s:?}"))),
        other => to_uint(field, other, u16::MAX as u64),
    }
}

fn result_code_value(field: &str, value: &Value) -> Result<u64, CodecError> {
    match value {
        Value::String(s) => {
            let v = result_value(s)
                .ok_or_else(|| CodecError::invalid(field, format!("unknown result {s:?}")))?;
            u8::try_from(v)
                .map(u64::from)
                .map_err(|_| CodecError::range(field, format!("{s} ({v}) is not a ledger result")))
        }
        other => to_uint(field, other, u8::MAX as u64),
    }
}

/// Exact-width bytes from a hex string or a list of byte values.
fn fixed_bytes(field: &str, value: &Value, width: usize) -> Result<Vec<u8>, CodecError> {
    let raw = match value {
        Value::String(s) => hex::decode(s).map_err(|e| CodecError::invalid(field, e.to_string()))?,
        Value::Array(items) => items
            .iter()
            .map(|b| {
                b.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| CodecError::invalid(field, format!("bad byte {b}")))
            })
            .collect::<Result<Vec<u8>, _>>()?,
        other => return Err(CodecError::invalid(field, format!("expected hex, got {other}"))),
    };
    if raw.len() != width {
        return Err(CodecError::invalid(
            field,
            format!("expected {width} bytes, got {}", raw.len()),
        ));
    }
    Ok(raw)
}
