pub mod table_iterator;

use crate::buffer_pool::{BufferPoolManager, ReplacementStrategy, SharedBufferPool};
use crate::disk_manager::DiskManager;
use crate::errors::Error;
use crate::pages::slotted::SlottedPage;
use crate::pages::PageId;
use crate::printdbg;
use crate::tuple::schema::{Attribute, Schema, ATTR_ENTRY_LEN};
use crate::tuple::{Record, Rid};
use anyhow::{bail, ensure, Result};
use parking_lot::MutexGuard;

pub use table_iterator::Scan;

/// Page 0 of every table file holds this header; pages 1.. are pure
/// slotted data pages with no per-page header of their own.
pub const HEADER_PAGE: PageId = 0;
/// `numTuples|numPages|freePage|numAttr|keySize`, all little-endian i32.
const HEADER_FIXED_LEN: usize = 4 * 5;

struct Header {
    num_tuples: i32,
    num_pages: i32,
    /// Hint: the last page known to have a free slot. `-1` if unknown.
    free_page: i32,
    schema: Schema,
}

impl Header {
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_FIXED_LEN + self.schema.num_attrs() * ATTR_ENTRY_LEN);
        out.extend_from_slice(&self.num_tuples.to_le_bytes());
        out.extend_from_slice(&self.num_pages.to_le_bytes());
        out.extend_from_slice(&self.free_page.to_le_bytes());
        out.extend_from_slice(&(self.schema.num_attrs() as i32).to_le_bytes());
        out.extend_from_slice(&0i32.to_le_bytes()); // keySize: unused, kept for layout parity
        for attr in &self.schema.attributes {
            out.extend(attr.to_bytes());
        }
        out
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let num_tuples = i32::from_le_bytes(bytes[0..4].try_into()?);
        let num_pages = i32::from_le_bytes(bytes[4..8].try_into()?);
        let free_page = i32::from_le_bytes(bytes[8..12].try_into()?);
        let num_attr = i32::from_le_bytes(bytes[12..16].try_into()?) as usize;
        // bytes[16..20] is keySize, unused

        let mut attributes = Vec::with_capacity(num_attr);
        let mut offset = HEADER_FIXED_LEN;
        for _ in 0..num_attr {
            attributes.push(Attribute::from_bytes(&bytes[offset..offset + ATTR_ENTRY_LEN])?);
            offset += ATTR_ENTRY_LEN;
        }

        Ok(Header { num_tuples, num_pages, free_page, schema: Schema::new(attributes) })
    }
}

/// A single table: one backing file, one private buffer pool, a fixed
/// schema. No two tables share a buffer pool or a disk file.
pub struct Table {
    bpm: SharedBufferPool,
    schema: Schema,
}

impl Table {
    pub fn create(
        path: &str,
        schema: Schema,
        pool_size: usize,
        strategy: ReplacementStrategy,
    ) -> Result<Self> {
        let disk = DiskManager::create(path).map_err(|_| Error::CreateTableFailed(path.to_string()))?;
        let bpm = BufferPoolManager::shared(pool_size, disk, strategy);

        {
            let mut guard = bpm.lock();
            guard.new_page()?; // page 0: the header
            let header = Header { num_tuples: 0, num_pages: 0, free_page: -1, schema: schema.clone() };
            write_header(&mut guard, &header)?;
            guard.unpin(HEADER_PAGE)?;
        }

        Ok(Table { bpm, schema })
    }

    pub fn open(path: &str, pool_size: usize, strategy: ReplacementStrategy) -> Result<Self> {
        let disk = DiskManager::open(path).map_err(|_| Error::TableNotFound(path.to_string()))?;
        let bpm = BufferPoolManager::shared(pool_size, disk, strategy);

        let schema = {
            let mut guard = bpm.lock();
            let header = read_header(&mut guard)?;
            guard.unpin(HEADER_PAGE)?;
            header.schema
        };

        Ok(Table { bpm, schema })
    }

    pub fn close(&mut self) -> Result<()> {
        self.bpm.lock().shutdown()
    }

    pub fn delete(path: &str) -> Result<()> {
        DiskManager::destroy(path)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn get_num_tuples(&self) -> Result<i32> {
        let mut guard = self.bpm.lock();
        let header = read_header(&mut guard)?;
        guard.unpin(HEADER_PAGE)?;
        Ok(header.num_tuples)
    }

    fn record_size(&self) -> usize {
        self.schema.record_size()
    }

    pub fn insert(&mut self, record: &Record) -> Result<Rid> {
        let body = record.to_bytes(&self.schema)?;
        let record_size = self.record_size();

        let mut guard = self.bpm.lock();
        let mut header = read_header(&mut guard)?;

        let mut target_page = None;
        if header.free_page >= 0 {
            let candidate = header.free_page as PageId;
            guard.pin(candidate)?;
            let free = page_has_free_slot(&mut guard, candidate, record_size)?;
            guard.unpin(candidate)?;
            if free {
                target_page = Some(candidate);
            }
        }

        if target_page.is_none() {
            for p in 1..=header.num_pages as PageId {
                guard.pin(p)?;
                let free = page_has_free_slot(&mut guard, p, record_size)?;
                guard.unpin(p)?;
                if free {
                    target_page = Some(p);
                    break;
                }
            }
        }

        let page_id = match target_page {
            Some(p) => p,
            None => {
                let new_id = guard.new_page()?;
                guard.unpin(new_id)?;
                header.num_pages += 1;
                new_id
            }
        };

        guard.pin(page_id)?;
        let slot = {
            let page = guard.page_mut(page_id)?;
            let mut slotted = SlottedPage::new(page, record_size);
            let slot = slotted.find_free_slot().ok_or(Error::NoUnpinnedPages)?;
            slotted.write_slot(slot, &body);
            slot
        };
        guard.mark_dirty(page_id)?;
        guard.unpin(page_id)?;

        header.num_tuples += 1;
        header.free_page = page_id as i32;
        write_header(&mut guard, &header)?;
        guard.unpin(HEADER_PAGE)?;

        printdbg!("inserted record at page {page_id} slot {slot}");
        Ok(Rid::new(page_id, slot as u16))
    }

    pub fn get(&self, rid: Rid) -> Result<Record> {
        let mut guard = self.bpm.lock();
        guard.pin(rid.page)?;
        let record = {
            let page = guard.page_mut(rid.page)?;
            let slotted = SlottedPage::new(page, self.record_size());
            ensure!(slotted.status(rid.slot as usize) == crate::pages::slotted::SLOT_LIVE, Error::RecordNotFound);
            Record::from_bytes(slotted.read_slot(rid.slot as usize), &self.schema)?
        };
        guard.unpin(rid.page)?;
        Ok(record)
    }

    pub fn delete(&mut self, rid: Rid) -> Result<()> {
        let mut guard = self.bpm.lock();
        guard.pin(rid.page)?;
        {
            let page = guard.page_mut(rid.page)?;
            let mut slotted = SlottedPage::new(page, self.record_size());
            ensure!(slotted.status(rid.slot as usize) == crate::pages::slotted::SLOT_LIVE, Error::RecordNotFound);
            slotted.set_status(rid.slot as usize, crate::pages::slotted::SLOT_TOMBSTONE);
        }
        guard.mark_dirty(rid.page)?;
        guard.unpin(rid.page)?;

        let mut header = read_header(&mut guard)?;
        header.num_tuples -= 1;
        header.free_page = rid.page as i32;
        write_header(&mut guard, &header)?;
        guard.unpin(HEADER_PAGE)?;
        Ok(())
    }

    pub fn update(&mut self, rid: Rid, record: &Record) -> Result<()> {
        let body = record.to_bytes(&self.schema)?;
        let mut guard = self.bpm.lock();
        guard.pin(rid.page)?;
        {
            let page = guard.page_mut(rid.page)?;
            let mut slotted = SlottedPage::new(page, self.record_size());
            ensure!(slotted.status(rid.slot as usize) == crate::pages::slotted::SLOT_LIVE, Error::RecordNotFound);
            slotted.write_slot(rid.slot as usize, &body);
        }
        guard.mark_dirty(rid.page)?;
        guard.unpin(rid.page)?;
        Ok(())
    }

    pub fn scan(&self, predicate: Option<crate::expr::Expr>) -> Result<Scan> {
        let num_pages = {
            let mut guard = self.bpm.lock();
            let header = read_header(&mut guard)?;
            guard.unpin(HEADER_PAGE)?;
            header.num_pages
        };
        Ok(Scan::new(self.bpm.clone(), self.schema.clone(), num_pages, predicate))
    }
}

fn page_has_free_slot(guard: &mut MutexGuard<'_, BufferPoolManager>, page_id: PageId, record_size: usize) -> Result<bool> {
    let page = guard.page_mut(page_id)?;
    Ok(SlottedPage::new(page, record_size).has_free_slot())
}

fn read_header(guard: &mut MutexGuard<'_, BufferPoolManager>) -> Result<Header> {
    guard.pin(HEADER_PAGE)?;
    let page = guard.page(HEADER_PAGE)?;
    Header::from_bytes(page.as_bytes())
}

fn write_header(guard: &mut MutexGuard<'_, BufferPoolManager>, header: &Header) -> Result<()> {
    let bytes = header.to_bytes();
    ensure!(bytes.len() <= crate::pages::PAGE_SIZE, Error::SchemaMismatch("header overflows a page".into()));
    let page = guard.page_mut(HEADER_PAGE)?;
    let len = bytes.len();
    page.write_bytes(0, len, &bytes);
    guard.mark_dirty(HEADER_PAGE)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk_manager::test_path;
    use crate::tuple::types::Value;

    fn schema() -> Schema {
        Schema::new(vec![Attribute::int("id"), Attribute::string("name", 16)])
    }

    #[test]
    fn test_insert_and_get_roundtrip() -> Result<()> {
        let path = test_path();
        let mut table = Table::create(&path, schema(), 8, ReplacementStrategy::Lru)?;

        let record = Record::new(vec![Value::Int(42), Value::Str("hello".into())]);
        let rid = table.insert(&record)?;

        let got = table.get(rid)?;
        assert_eq!(got, record);
        assert_eq!(table.get_num_tuples()?, 1);

        std::fs::remove_file(&path).ok();
        Ok(())
    }

    #[test]
    fn test_delete_then_get_is_not_found() -> Result<()> {
        let path = test_path();
        let mut table = Table::create(&path, schema(), 8, ReplacementStrategy::Lru)?;

        let record = Record::new(vec![Value::Int(1), Value::Str("a".into())]);
        let rid = table.insert(&record)?;
        table.delete(rid)?;

        assert!(table.get(rid).is_err());
        assert_eq!(table.get_num_tuples()?, 0);

        std::fs::remove_file(&path).ok();
        Ok(())
    }

    #[test]
    fn test_insert_reuses_freed_slot() -> Result<()> {
        let path = test_path();
        let mut table = Table::create(&path, schema(), 8, ReplacementStrategy::Lru)?;

        let r1 = Record::new(vec![Value::Int(1), Value::Str("a".into())]);
        let r2 = Record::new(vec![Value::Int(2), Value::Str("b".into())]);
        let rid1 = table.insert(&r1)?;
        table.insert(&r2)?;
        table.delete(rid1)?;

        let r3 = Record::new(vec![Value::Int(3), Value::Str("c".into())]);
        let rid3 = table.insert(&r3)?;
        assert_eq!(rid3.page, rid1.page);

        std::fs::remove_file(&path).ok();
        Ok(())
    }
}
