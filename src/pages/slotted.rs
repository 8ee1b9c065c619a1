use super::{Page, PAGE_SIZE};

pub const SLOT_LIVE: u8 = b'*';
pub const SLOT_TOMBSTONE: u8 = b'+';
pub const SLOT_UNUSED: u8 = 0;

/// A view over a data page as a sequence of equal-width slots, each
/// prefixed by a one-byte status (`SLOT_LIVE`, `SLOT_TOMBSTONE` or
/// `SLOT_UNUSED`). There is no other per-page header: slot count is
/// derived purely from `record_size`, so every data page looks identical
/// regardless of which table it belongs to.
pub(crate) struct SlottedPage<'a> {
    page: &'a mut Page,
    record_size: usize,
}

impl<'a> SlottedPage<'a> {
    pub fn new(page: &'a mut Page, record_size: usize) -> Self {
        SlottedPage { page, record_size }
    }

    /// `record_size` already includes the one status byte.
    pub fn slots_per_page(record_size: usize) -> usize {
        PAGE_SIZE / record_size
    }

    pub fn capacity(&self) -> usize {
        Self::slots_per_page(self.record_size)
    }

    fn offset(&self, slot: usize) -> usize {
        slot * self.record_size
    }

    pub fn status(&self, slot: usize) -> u8 {
        let off = self.offset(slot);
        self.page.read_bytes(off, off + 1)[0]
    }

    pub fn set_status(&mut self, slot: usize, status: u8) {
        let off = self.offset(slot);
        self.page.write_bytes(off, off + 1, &[status]);
    }

    /// The record body, excluding the status byte.
    pub fn read_slot(&self, slot: usize) -> &[u8] {
        let off = self.offset(slot);
        self.page.read_bytes(off + 1, off + self.record_size)
    }

    pub fn write_slot(&mut self, slot: usize, data: &[u8]) {
        debug_assert_eq!(data.len(), self.record_size - 1);
        let off = self.offset(slot);
        self.page.write_bytes(off + 1, off + self.record_size, data);
        self.set_status(slot, SLOT_LIVE);
    }

    /// First slot not holding a live record: a tombstone or a never-used
    /// slot both qualify, per the insert algorithm's "status byte is not
    /// `'*'`" rule.
    pub fn find_free_slot(&self) -> Option<usize> {
        (0..self.capacity()).find(|&slot| self.status(slot) != SLOT_LIVE)
    }

    pub fn count_live(&self) -> usize {
        (0..self.capacity())
            .filter(|&slot| self.status(slot) == SLOT_LIVE)
            .count()
    }

    pub fn has_free_slot(&self) -> bool {
        (0..self.capacity()).any(|slot| self.status(slot) != SLOT_LIVE)
    }
}
