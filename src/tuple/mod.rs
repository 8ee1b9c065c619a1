pub mod schema;
pub mod types;

use crate::errors::Error;
use crate::pages::PageId;
use anyhow::{ensure, Result};
use schema::Schema;
use types::Value;

/// A record identifier: the page it lives on and its slot within that
/// page. `SlotId` is a plain index, not a byte offset.
pub type SlotId = u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rid {
    pub page: PageId,
    pub slot: SlotId,
}

impl Rid {
    pub fn new(page: PageId, slot: SlotId) -> Self {
        Rid { page, slot }
    }

    pub const BYTE_LEN: usize = 8 + 2;

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::BYTE_LEN);
        out.extend_from_slice(&self.page.to_le_bytes());
        out.extend_from_slice(&self.slot.to_le_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ensure!(bytes.len() == Self::BYTE_LEN, Error::SchemaMismatch("bad rid length".into()));
        let page = PageId::from_le_bytes(bytes[0..8].try_into()?);
        let slot = SlotId::from_le_bytes(bytes[8..10].try_into()?);
        Ok(Rid { page, slot })
    }
}

/// A record is just an ordered vector of attribute values, with no
/// per-tuple metadata beyond the slot's own status byte.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Record { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, idx: usize) -> Result<&Value> {
        self.values.get(idx).ok_or(Error::NoSuchAttribute(idx).into())
    }

    /// Packs this record's values into the fixed-width byte layout
    /// `schema` describes (no status byte; that lives in the slotted
    /// page, not the record body).
    pub fn to_bytes(&self, schema: &Schema) -> Result<Vec<u8>> {
        ensure!(
            self.values.len() == schema.num_attrs(),
            Error::AttrCountMismatch { expected: schema.num_attrs(), got: self.values.len() }
        );
        let mut out = Vec::with_capacity(schema.record_body_size());
        for (value, attr) in self.values.iter().zip(schema.attributes.iter()) {
            ensure!(
                value.attr_type() == attr.attr_type,
                Error::SchemaMismatch(format!("attribute {} type mismatch", attr.name))
            );
            out.extend(value.to_bytes(attr.type_length));
        }
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8], schema: &Schema) -> Result<Self> {
        let mut values = Vec::with_capacity(schema.num_attrs());
        let mut offset = 0;
        for attr in &schema.attributes {
            let slice = &bytes[offset..offset + attr.type_length];
            values.push(Value::from_bytes(attr.attr_type, slice)?);
            offset += attr.type_length;
        }
        Ok(Record { values })
    }
}
