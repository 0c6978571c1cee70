//! # Parser
//!
//! Canonical bytes back to a JSON value tree. Cursor-driven: read a field
//! header, resolve it in the reverse lookup table, decode the value, repeat
//! until the buffer (or the enclosing terminator) is exhausted.

use super::amount::Amount;
use super::buffer::CanonicalBuffer;
use super::errors::CodecError;
use super::fields::{field_by_code, FieldDef, TypeCode, END_MARKER_FIELD};
use super::paths::PathSet;
use super::schema::{LedgerEntryType, TransactionType};
use serde_json::{Map, Value};
use shared_types::{result_name, AccountId};

/// Decode a complete top-level object.
pub fn decode(bytes: &[u8]) -> Result<Value, CodecError> {
    decode_buffer(&mut CanonicalBuffer::from_bytes(bytes.to_vec()))
}

/// Decode a hex-encoded top-level object.
pub fn decode_hex(hex_str: &str) -> Result<Value, CodecError> {
    decode_buffer(&mut CanonicalBuffer::from_hex(hex_str)?)
}

/// Decode the rest of `buf` as a top-level object.
pub fn decode_buffer(buf: &mut CanonicalBuffer) -> Result<Value, CodecError> {
    read_object(buf, false).map(Value::Object)
}

fn is_end(type_code: u8, field_code: u8, end_type: TypeCode) -> bool {
    type_code == end_type.code() && field_code == END_MARKER_FIELD
}

fn lookup(type_code: u8, field_code: u8) -> Result<&'static FieldDef, CodecError> {
    field_by_code(type_code, field_code).ok_or(CodecError::UnknownFieldCode {
        type_code,
        field_code,
    })
}

fn read_object(
    buf: &mut CanonicalBuffer,
    terminated: bool,
) -> Result<Map<String, Value>, CodecError> {
    let mut object = Map::new();
    loop {
        if !terminated && buf.is_exhausted() {
            return Ok(object);
        }
        let (type_code, field_code) = buf.read_field_header()?;
        if terminated && is_end(type_code, field_code, TypeCode::Object) {
            return Ok(object);
        }
        let def = lookup(type_code, field_code)?;
        let value = read_value(buf, def)?;
        object.insert(def.name.to_string(), value);
    }
}

fn read_array(buf: &mut CanonicalBuffer) -> Result<Vec<Value>, CodecError> {
    let mut items = Vec::new();
    loop {
        let (type_code, field_code) = buf.read_field_header()?;
        if is_end(type_code, field_code, TypeCode::Array) {
            return Ok(items);
        }
        let def = lookup(type_code, field_code)?;
        let mut element = Map::new();
        element.insert(def.name.to_string(), read_value(buf, def)?);
        items.push(Value::Object(element));
    }
}

fn read_value(buf: &mut CanonicalBuffer, def: &FieldDef) -> Result<Value, CodecError> {
    Ok(match def.type_code {
        TypeCode::UInt8 => {
            let v = buf.read_u8()?;
            match def.name {
                "TransactionResult" => result_name(v as i32)
                    .map(|n| Value::String(n.to_string()))
                    .unwrap_or_else(|| Value::from(v)),
                _ => Value::from(v),
            }
        }
        TypeCode::UInt16 => {
            let v = buf.read_u16()?;
            let name = match def.name {
                "TransactionType" => TransactionType::from_code(v).map(TransactionType::name),
                "LedgerEntryType" => LedgerEntryType::from_code(v).map(LedgerEntryType::name),
                _ => None,
            };
            name.map(|n| Value::String(n.to_string()))
                .unwrap_or_else(|| Value::from(v))
        }
        TypeCode::UInt32 => Value::from(buf.read_u32()?),
        TypeCode::UInt64 => Value::String(format!("{:016X}", buf.read_u64()?)),
        TypeCode::Hash128 => Value::String(hex::encode_upper(buf.read(16)?)),
        TypeCode::Hash160 => Value::String(hex::encode_upper(buf.read(20)?)),
        TypeCode::Hash256 => Value::String(hex::encode_upper(buf.read(32)?)),
        TypeCode::Amount => Amount::read(buf)?.to_json(),
        TypeCode::Blob => Value::String(hex::encode_upper(buf.read_vl()?)),
        TypeCode::AccountId => {
            let raw = buf.read_vl()?;
            let account =
                AccountId::from_slice(&raw).map_err(|e| CodecError::address(def.name, e))?;
            Value::String(account.to_address())
        }
        TypeCode::Object => Value::Object(read_object(buf, true)?),
        TypeCode::Array => Value::Array(read_array(buf)?),
        TypeCode::PathSet => PathSet::read(buf)?.to_json(),
        TypeCode::Vector256 => {
            let raw = buf.read_vl()?;
            if raw.len() % 32 != 0 {
                return Err(CodecError::invalid(
                    def.name,
                    format!("{} bytes is not a whole number of hashes", raw.len()),
                ));
            }
            Value::Array(
                raw.chunks(32)
                    .map(|h| Value::String(hex::encode_upper(h)))
                    .collect(),
            )
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DIRECTORY_NODE: &str = "110064220000000058000360186E008422E06B72D5B275E29EE3BE9D87A370F424E0E7BF613C465909\
                                  8214289D19799C892637306AAAF03805EDFCDF6C28B8\
                                  011320081342A0AB45459A54D8E4FA1842339A102680216CF9A152BCE4F4CE467D8246";

    #[test]
    fn test_decode_directory_node() {
        let value = decode_hex(DIRECTORY_NODE).unwrap();
        assert_eq!(
            value,
            json!({
                "LedgerEntryType": "DirectoryNode",
                "Owner": "rh6kN9s7spSb3vdv6H8ZGYzsddSLeEUGmc",
                "Flags": 0,
                "Indexes": ["081342A0AB45459A54D8E4FA1842339A102680216CF9A152BCE4F4CE467D8246"],
                "RootIndex": "000360186E008422E06B72D5B275E29EE3BE9D87A370F424E0E7BF613C465909"
            })
        );
    }

    #[test]
    fn test_decode_uint64() {
        assert_eq!(
            decode_hex("310123456789ABCDEF").unwrap(),
            json!({"IndexNext": "0123456789ABCDEF"})
        );
    }

    #[test]
    fn test_unknown_field_code() {
        let err = decode_hex("6F4000000000000001").unwrap_err();
        assert_eq!(
            err,
            CodecError::UnknownFieldCode {
                type_code: 6,
                field_code: 15
            }
        );
    }

    #[test]
    fn test_truncated_value() {
        let err = decode_hex("24000000").unwrap_err();
        assert!(matches!(err, CodecError::TruncatedBuffer { .. }));
    }

    #[test]
    fn test_unterminated_nested_object() {
        // Memo object opened, never closed.
        let err = decode_hex("EA7C0141").unwrap_err();
        assert!(matches!(err, CodecError::TruncatedBuffer { .. }));
    }

    #[test]
    fn test_decode_nested_array() {
        let value = decode_hex("F9EA7C0141E1F1").unwrap();
        assert_eq!(value, json!({"Memos": [{"Memo": {"MemoType": "41"}}]}));
    }
}
