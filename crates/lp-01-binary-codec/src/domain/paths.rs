//! # Payment Path Sets
//!
//! A path set is a list of alternative paths; each path is a list of steps.
//! A step's type byte flags which of account / currency / issuer follow.

use super::amount::Currency;
use super::buffer::CanonicalBuffer;
use super::errors::CodecError;
use serde_json::{Map, Value};
use shared_types::AccountId;

const STEP_ACCOUNT: u8 = 0x01;
const STEP_CURRENCY: u8 = 0x10;
const STEP_ISSUER: u8 = 0x20;
const PATH_SEPARATOR: u8 = 0xFF;
const PATH_SET_END: u8 = 0x00;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathStep {
    pub account: Option<AccountId>,
    pub currency: Option<Currency>,
    pub issuer: Option<AccountId>,
}

impl PathStep {
    fn type_byte(&self) -> u8 {
        let mut t = 0;
        if self.account.is_some() {
            t |= STEP_ACCOUNT;
        }
        if self.currency.is_some() {
            t |= STEP_CURRENCY;
        }
        if self.issuer.is_some() {
            t |= STEP_ISSUER;
        }
        t
    }

    fn from_json(field: &str, value: &Value) -> Result<Self, CodecError> {
        let map = value
            .as_object()
            .ok_or_else(|| CodecError::invalid(field, "path step must be an object"))?;
        let account = |key: &str| -> Result<Option<AccountId>, CodecError> {
            match map.get(key) {
                None => Ok(None),
                Some(Value::String(s)) => s
                    .parse()
                    .map(Some)
                    .map_err(|e| CodecError::address(field, e)),
                Some(other) => Err(CodecError::invalid(field, format!("bad {key}: {other}"))),
            }
        };
        let currency = match map.get("currency") {
            None => None,
            Some(Value::String(s)) => Some(Currency::from_path_code(field, s)?),
            Some(other) => return Err(CodecError::invalid(field, format!("bad currency: {other}"))),
        };
        let step = Self {
            account: account("account")?,
            currency,
            issuer: account("issuer")?,
        };
        if step.type_byte() == 0 {
            return Err(CodecError::invalid(field, "empty path step"));
        }
        Ok(step)
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();
        if let Some(account) = &self.account {
            map.insert("account".into(), Value::String(account.to_address()));
        }
        if let Some(currency) = &self.currency {
            map.insert("currency".into(), currency.to_json());
        }
        if let Some(issuer) = &self.issuer {
            map.insert("issuer".into(), Value::String(issuer.to_address()));
        }
        Value::Object(map)
    }
}

/// Alternatives, each a sequence of steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSet(pub Vec<Vec<PathStep>>);

impl PathSet {
    pub fn from_json(field: &str, value: &Value) -> Result<Self, CodecError> {
        let paths = value
            .as_array()
            .ok_or_else(|| CodecError::invalid(field, "path set must be a list"))?;
        paths
            .iter()
            .map(|path| -> Result<Vec<PathStep>, CodecError> {
                path.as_array()
                    .ok_or_else(|| CodecError::invalid(field, "path must be a list"))?
                    .iter()
                    .map(|step| PathStep::from_json(field, step))
                    .collect()
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn to_json(&self) -> Value {
        Value::Array(
            self.0
                .iter()
                .map(|path| Value::Array(path.iter().map(PathStep::to_json).collect()))
                .collect(),
        )
    }

    pub fn write(&self, buf: &mut CanonicalBuffer) {
        for (i, path) in self.0.iter().enumerate() {
            if i > 0 {
                buf.push(PATH_SEPARATOR);
            }
            for step in path {
                buf.push(step.type_byte());
                if let Some(account) = &step.account {
                    buf.append(account.as_bytes());
                }
                if let Some(currency) = &step.currency {
                    buf.append(&currency.0);
                }
                if let Some(issuer) = &step.issuer {
                    buf.append(issuer.as_bytes());
                }
            }
        }
        buf.push(PATH_SET_END);
    }

    pub fn read(buf: &mut CanonicalBuffer) -> Result<Self, CodecError> {
        let mut paths = Vec::new();
        let mut current = Vec::new();
        loop {
            match buf.read_u8()? {
                PATH_SET_END => break,
                PATH_SEPARATOR => paths.push(std::mem::take(&mut current)),
                t if t & !(STEP_ACCOUNT | STEP_CURRENCY | STEP_ISSUER) != 0 => {
                    return Err(CodecError::invalid("Paths", format!("bad step type 0x{t:02X}")));
                }
                t => {
                    let mut step = PathStep::default();
                    if t & STEP_ACCOUNT != 0 {
                        step.account = Some(AccountId(buf.read_array()?));
                    }
                    if t & STEP_CURRENCY != 0 {
                        step.currency = Some(Currency(buf.read_array()?));
                    }
                    if t & STEP_ISSUER != 0 {
                        step.issuer = Some(AccountId(buf.read_array()?));
                    }
                    current.push(step);
                }
            }
        }
        if !current.is_empty() || !paths.is_empty() {
            paths.push(current);
        }
        Ok(Self(paths))
    }
}
