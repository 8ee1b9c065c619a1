use super::types::AttrType;
use crate::errors::Error;
use anyhow::{ensure, Result};

/// On-disk attribute name width (`name[10]` in the table header layout).
pub const ATTR_NAME_LEN: usize = 10;
/// `name[10] + dataType(4) + typeLength(4)`.
pub const ATTR_ENTRY_LEN: usize = ATTR_NAME_LEN + 4 + 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub attr_type: AttrType,
    /// Byte width on disk: `4` for INT/FLOAT, `1` for BOOL, declared
    /// width for STRING.
    pub type_length: usize,
}

impl Attribute {
    pub fn int(name: &str) -> Self {
        Attribute { name: name.to_string(), attr_type: AttrType::Int, type_length: 4 }
    }

    pub fn float(name: &str) -> Self {
        Attribute { name: name.to_string(), attr_type: AttrType::Float, type_length: 4 }
    }

    pub fn boolean(name: &str) -> Self {
        Attribute { name: name.to_string(), attr_type: AttrType::Bool, type_length: 1 }
    }

    pub fn string(name: &str, len: usize) -> Self {
        Attribute { name: name.to_string(), attr_type: AttrType::Str, type_length: len }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(ATTR_ENTRY_LEN);
        let mut name_bytes = self.name.clone().into_bytes();
        name_bytes.resize(ATTR_NAME_LEN, 0);
        out.extend_from_slice(&name_bytes);
        out.extend_from_slice(&self.attr_type.tag().to_le_bytes());
        out.extend_from_slice(&(self.type_length as i32).to_le_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ensure!(bytes.len() == ATTR_ENTRY_LEN, Error::SchemaMismatch("bad attribute entry length".into()));
        let name_end = bytes[..ATTR_NAME_LEN]
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(ATTR_NAME_LEN);
        let name = String::from_utf8_lossy(&bytes[..name_end]).into_owned();
        let tag = i32::from_le_bytes(bytes[ATTR_NAME_LEN..ATTR_NAME_LEN + 4].try_into()?);
        let type_length =
            i32::from_le_bytes(bytes[ATTR_NAME_LEN + 4..ATTR_NAME_LEN + 8].try_into()?) as usize;
        Ok(Attribute { name, attr_type: AttrType::from_tag(tag)?, type_length })
    }
}

/// The fixed, ordered set of attributes a table's tuples conform to.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Schema { attributes }
    }

    pub fn num_attrs(&self) -> usize {
        self.attributes.len()
    }

    /// Total byte width of the packed attribute body, excluding the
    /// leading slot status byte.
    pub fn record_body_size(&self) -> usize {
        self.attributes.iter().map(|a| a.type_length).sum()
    }

    /// `record_body_size` plus the one status byte each slot carries.
    pub fn record_size(&self) -> usize {
        self.record_body_size() + 1
    }

    /// Byte offset of attribute `idx` within the record body.
    pub fn attr_offset(&self, idx: usize) -> usize {
        self.attributes[..idx].iter().map(|a| a.type_length).sum()
    }

    pub fn attr(&self, idx: usize) -> Result<&Attribute> {
        self.attributes.get(idx).ok_or(Error::NoSuchAttribute(idx).into())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }
}
