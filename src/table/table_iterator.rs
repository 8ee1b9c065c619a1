use crate::buffer_pool::SharedBufferPool;
use crate::errors::Error;
use crate::expr::Expr;
use crate::pages::slotted::{SlottedPage, SLOT_LIVE};
use crate::pages::PageId;
use crate::tuple::schema::Schema;
use crate::tuple::types::Value;
use crate::tuple::{Record, Rid};
use anyhow::{bail, Result};

/// A cursor over every live record in a table, advancing page-by-page
/// and slot-by-slot, optionally filtering by a predicate. Exhausted once
/// every data page has been visited; re-opening a fresh `Scan` restarts
/// from the beginning.
pub struct Scan {
    bpm: SharedBufferPool,
    schema: Schema,
    record_size: usize,
    num_pages: i32,
    predicate: Option<Expr>,
    cur_page: i32,
    cur_slot: usize,
}

impl Scan {
    pub(super) fn new(bpm: SharedBufferPool, schema: Schema, num_pages: i32, predicate: Option<Expr>) -> Self {
        let record_size = schema.record_size();
        Scan { bpm, schema, record_size, num_pages, predicate, cur_page: 1, cur_slot: 0 }
    }

    /// Advances the cursor to the next record matching the predicate (or
    /// any live record, if there is none), returning `NoMoreTuples` once
    /// the last data page has been exhausted.
    pub fn next(&mut self) -> Result<(Rid, Record)> {
        let mut guard = self.bpm.lock();
        let slots_per_page = SlottedPage::slots_per_page(self.record_size);

        loop {
            if self.cur_page > self.num_pages {
                bail!(Error::NoMoreTuples);
            }

            if self.cur_slot >= slots_per_page {
                self.cur_page += 1;
                self.cur_slot = 0;
                continue;
            }

            let page_id = self.cur_page as PageId;
            guard.pin(page_id)?;
            let found = {
                let page = guard.page_mut(page_id)?;
                let slotted = SlottedPage::new(page, self.record_size);
                if slotted.status(self.cur_slot) == SLOT_LIVE {
                    Some(Record::from_bytes(slotted.read_slot(self.cur_slot), &self.schema)?)
                } else {
                    None
                }
            };
            guard.unpin(page_id)?;

            let rid = Rid::new(page_id, self.cur_slot as u16);
            self.cur_slot += 1;

            if let Some(record) = found {
                let matches = match &self.predicate {
                    None => true,
                    Some(expr) => matches!(expr.eval(&record, &self.schema)?, Value::Bool(true)),
                };
                if matches {
                    return Ok((rid, record));
                }
            }
        }
    }
}
