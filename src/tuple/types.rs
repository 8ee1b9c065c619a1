use crate::errors::Error;
use anyhow::{bail, Result};

/// The four attribute kinds a schema can declare. Stored on disk as a
/// 4-byte little-endian tag (`dataType` in the table header layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrType {
    Int,
    Float,
    Bool,
    Str,
}

impl AttrType {
    pub fn tag(&self) -> i32 {
        match self {
            AttrType::Int => 0,
            AttrType::Float => 1,
            AttrType::Bool => 2,
            AttrType::Str => 3,
        }
    }

    pub fn from_tag(tag: i32) -> Result<Self> {
        Ok(match tag {
            0 => AttrType::Int,
            1 => AttrType::Float,
            2 => AttrType::Bool,
            3 => AttrType::Str,
            _ => bail!(Error::SchemaMismatch(format!("unknown attribute tag {tag}"))),
        })
    }
}

/// A single typed attribute value. `Str` is always padded/truncated to
/// the owning attribute's declared `type_length` on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
    Bool(bool),
    Str(String),
}

impl Value {
    pub fn attr_type(&self) -> AttrType {
        match self {
            Value::Int(_) => AttrType::Int,
            Value::Float(_) => AttrType::Float,
            Value::Bool(_) => AttrType::Bool,
            Value::Str(_) => AttrType::Str,
        }
    }

    /// Encodes into exactly `len` bytes. `len` is ignored for the
    /// fixed-width kinds and must be the attribute's `type_length` for
    /// `Str`.
    pub fn to_bytes(&self, len: usize) -> Vec<u8> {
        match self {
            Value::Int(v) => v.to_le_bytes().to_vec(),
            Value::Float(v) => v.to_le_bytes().to_vec(),
            Value::Bool(v) => vec![if *v { 1 } else { 0 }],
            Value::Str(s) => {
                let mut bytes = s.clone().into_bytes();
                bytes.resize(len, 0);
                bytes
            }
        }
    }

    pub fn from_bytes(attr_type: AttrType, bytes: &[u8]) -> Result<Self> {
        Ok(match attr_type {
            AttrType::Int => Value::Int(i32::from_le_bytes(bytes.try_into()?)),
            AttrType::Float => Value::Float(f32::from_le_bytes(bytes.try_into()?)),
            AttrType::Bool => Value::Bool(bytes[0] != 0),
            AttrType::Str => {
                let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                Value::Str(String::from_utf8_lossy(&bytes[..end]).into_owned())
            }
        })
    }
}

impl AttrType {
    /// Fixed on-disk width; for `Str` the caller must use the owning
    /// attribute's `type_length` instead.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            AttrType::Int => Some(4),
            AttrType::Float => Some(4),
            AttrType::Bool => Some(1),
            AttrType::Str => None,
        }
    }
}
