mod frame;
mod replacer;

use crate::disk_manager::DiskManager;
#[cfg(debug_assertions)]
use crate::get_caller_name;
use crate::errors::Error;
use crate::pages::{Page, PageId, INVALID_PAGE};
use crate::printdbg;
use anyhow::{bail, Result};
use frame::Frame;
use parking_lot::Mutex;
use replacer::{Fifo, Lru, Replacer};
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) type FrameId = usize;
pub type SharedBufferPool = Arc<Mutex<BufferPoolManager>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementStrategy {
    Fifo,
    Lru,
}

/// Pins, unpins, and replaces pages of a single backing file behind one
/// fixed-size set of frames. `init`/`pin`/`unpin` are always called with
/// the pool's own mutex held (see [`SharedBufferPool`]) so the pin
/// algorithm in this module never has to worry about concurrent callers.
pub struct BufferPoolManager {
    disk: DiskManager,
    frames: Vec<Frame>,
    free_frames: Vec<FrameId>,
    page_table: HashMap<PageId, FrameId>,
    replacer: Box<dyn Replacer>,
    num_read_io: u64,
    num_write_io: u64,
}

impl BufferPoolManager {
    /// Corresponds to `initBufferPool`.
    pub fn new(capacity: usize, disk: DiskManager, strategy: ReplacementStrategy) -> Self {
        let replacer: Box<dyn Replacer> = match strategy {
            ReplacementStrategy::Fifo => Box::new(Fifo::new(capacity)),
            ReplacementStrategy::Lru => Box::new(Lru::new(capacity)),
        };

        BufferPoolManager {
            disk,
            frames: (0..capacity).map(Frame::new).collect(),
            free_frames: (0..capacity).rev().collect(),
            page_table: HashMap::with_capacity(capacity),
            replacer,
            num_read_io: 0,
            num_write_io: 0,
        }
    }

    pub fn shared(capacity: usize, disk: DiskManager, strategy: ReplacementStrategy) -> SharedBufferPool {
        Arc::new(Mutex::new(Self::new(capacity, disk, strategy)))
    }

    pub fn capacity(&self) -> usize {
        self.frames.len()
    }

    pub fn num_read_io(&self) -> u64 {
        self.num_read_io
    }

    pub fn num_write_io(&self) -> u64 {
        self.num_write_io
    }

    fn flush_frame(&mut self, frame_id: FrameId) -> Result<()> {
        let page = self.frames[frame_id].page();
        if page.is_dirty() {
            self.disk.write_page(page.get_page_id(), page)?;
            self.num_write_io += 1;
            self.frames[frame_id].page_mut().clear_dirty();
        }
        Ok(())
    }

    /// Picks a frame to hold a newly-fetched page: a free frame if one
    /// exists, otherwise the replacer's chosen victim (flushed first if
    /// dirty). `NoUnpinnedPages` if every frame is pinned.
    fn find_free_frame(&mut self) -> Result<FrameId> {
        if let Some(frame_id) = self.free_frames.pop() {
            return Ok(frame_id);
        }
        if !self.replacer.can_evict() {
            bail!(Error::NoUnpinnedPages);
        }
        let victim = self.replacer.evict();
        self.flush_frame(victim)?;
        let old_page_id = self.frames[victim].page().get_page_id();
        self.page_table.remove(&old_page_id);
        Ok(victim)
    }

    /// Corresponds to `pinPage`.
    pub fn pin(&mut self, page_id: PageId) -> Result<()> {
        if let Some(&frame_id) = self.page_table.get(&page_id) {
            self.frames[frame_id].pin();
            self.replacer.record_access(frame_id);
            printdbg!(
                "{} pinned page {page_id} (frame {frame_id}), pin count {}",
                get_caller_name!(),
                self.frames[frame_id].pin_count()
            );
            return Ok(());
        }

        let frame_id = self.find_free_frame()?;
        let mut page = Page::new();
        self.disk.read_page(page_id, &mut page)?;
        self.num_read_io += 1;

        self.frames[frame_id].set_page(page);
        self.frames[frame_id].pin();
        self.page_table.insert(page_id, frame_id);
        self.replacer.record_access(frame_id);

        printdbg!("{} loaded and pinned page {page_id}", get_caller_name!());
        Ok(())
    }

    /// Allocates a brand new page at the end of the file and pins it.
    pub fn new_page(&mut self) -> Result<PageId> {
        let frame_id = self.find_free_frame()?;
        let page_id = self.disk.append_empty_page()?;

        let mut page = Page::new();
        page.set_page_id(page_id);
        self.frames[frame_id].set_page(page);
        self.frames[frame_id].pin();
        self.page_table.insert(page_id, frame_id);
        self.replacer.record_access(frame_id);

        Ok(page_id)
    }

    fn frame_of(&self, page_id: PageId) -> Result<FrameId> {
        self.page_table
            .get(&page_id)
            .copied()
            .ok_or_else(|| Error::PageNotPinned.into())
    }

    pub fn page(&self, page_id: PageId) -> Result<&Page> {
        Ok(self.frames[self.frame_of(page_id)?].page())
    }

    pub fn page_mut(&mut self, page_id: PageId) -> Result<&mut Page> {
        let frame_id = self.frame_of(page_id)?;
        Ok(self.frames[frame_id].page_mut())
    }

    /// Corresponds to `markDirty`.
    pub fn mark_dirty(&mut self, page_id: PageId) -> Result<()> {
        let frame_id = self.frame_of(page_id)?;
        self.frames[frame_id].page_mut().mark_dirty();
        Ok(())
    }

    /// Corresponds to `unpinPage`.
    pub fn unpin(&mut self, page_id: PageId) -> Result<()> {
        let frame_id = self.frame_of(page_id)?;
        let frame = &mut self.frames[frame_id];
        if frame.pin_count() == 0 {
            bail!(Error::PageNotPinned);
        }
        frame.unpin();

        printdbg!(
            "{} unpinned page {page_id} (frame {frame_id}), pin count {}",
            get_caller_name!(),
            frame.pin_count()
        );

        if frame.pin_count() == 0 {
            self.replacer.set_evictable(frame_id, true);
        }
        Ok(())
    }

    /// Corresponds to `forcePage`: writes the page to disk immediately,
    /// regardless of its dirty flag.
    pub fn force_page(&mut self, page_id: PageId) -> Result<()> {
        let frame_id = self.frame_of(page_id)?;
        let page = self.frames[frame_id].page();
        self.disk.write_page(page_id, page)?;
        self.num_write_io += 1;
        self.frames[frame_id].page_mut().clear_dirty();
        Ok(())
    }

    /// Corresponds to `forceFlushPool`: writes every dirty, currently
    /// unpinned page back to disk.
    pub fn flush_all(&mut self) -> Result<()> {
        let frame_ids: Vec<FrameId> = (0..self.frames.len())
            .filter(|&id| {
                self.frames[id].page().get_page_id() != INVALID_PAGE
                    && self.frames[id].pin_count() == 0
                    && self.frames[id].page().is_dirty()
            })
            .collect();
        for frame_id in frame_ids {
            self.flush_frame(frame_id)?;
        }
        Ok(())
    }

    /// Corresponds to `shutdownBufferPool`: refuses while any page is
    /// still pinned, otherwise flushes everything dirty.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.frames.iter().any(|f| f.pin_count() > 0) {
            bail!(Error::PoolHasPinnedPages);
        }
        self.flush_all()
    }

    /// `getFrameContents`: page id resident in each physical frame slot,
    /// `INVALID_PAGE` for frames never yet used.
    pub fn frame_contents(&self) -> Vec<PageId> {
        self.frames.iter().map(|f| f.page().get_page_id()).collect()
    }

    /// `getDirtyFlags`.
    pub fn dirty_flags(&self) -> Vec<bool> {
        self.frames.iter().map(|f| f.page().is_dirty()).collect()
    }

    /// `getFixCounts`.
    pub fn fix_counts(&self) -> Vec<u32> {
        self.frames.iter().map(|f| f.pin_count()).collect()
    }

    #[cfg(test)]
    pub fn pin_count(&self, page_id: PageId) -> Option<u32> {
        let frame_id = *self.page_table.get(&page_id)?;
        Some(self.frames[frame_id].pin_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk_manager::test_path;

    fn setup(capacity: usize, strategy: ReplacementStrategy) -> BufferPoolManager {
        let path = test_path();
        let disk = DiskManager::create(&path).unwrap();
        BufferPoolManager::new(capacity, disk, strategy)
    }

    #[test]
    fn test_dont_evict_pinned_pages() -> Result<()> {
        let mut bpm = setup(2, ReplacementStrategy::Lru);

        let p1 = bpm.new_page()?;
        let p2 = bpm.new_page()?;

        assert!(bpm.new_page().is_err());

        bpm.unpin(p1)?;
        let p3 = bpm.new_page()?;
        assert_eq!(bpm.pin_count(p3), Some(1));

        bpm.unpin(p2)?;
        bpm.unpin(p3)?;
        Ok(())
    }

    #[test]
    fn test_unpinning_unpinned_page_is_error() -> Result<()> {
        let mut bpm = setup(1, ReplacementStrategy::Lru);
        let p1 = bpm.new_page()?;
        bpm.unpin(p1)?;
        assert!(bpm.unpin(p1).is_err());
        Ok(())
    }

    #[test]
    fn test_fifo_replacement_order() -> Result<()> {
        // Scenario: 3 frames, pages pinned/unpinned in an order where a
        // later re-pin of an already-loaded page must not change its
        // eviction priority under FIFO.
        let mut bpm = setup(3, ReplacementStrategy::Fifo);

        let p0 = bpm.new_page()?;
        let p1 = bpm.new_page()?;
        let p2 = bpm.new_page()?;
        bpm.unpin(p0)?;
        bpm.unpin(p1)?;
        bpm.unpin(p2)?;

        // re-pin p0: FIFO keeps its original load order, so it is still
        // the next victim once a fourth page is requested.
        bpm.pin(p0)?;
        bpm.unpin(p0)?;

        let p3 = bpm.new_page()?;
        assert_eq!(bpm.frame_contents().iter().filter(|&&id| id == p0).count(), 0);
        bpm.unpin(p3)?;
        Ok(())
    }

    #[test]
    fn test_dirty_page_flushed_on_eviction() -> Result<()> {
        let mut bpm = setup(1, ReplacementStrategy::Lru);
        let p0 = bpm.new_page()?;
        bpm.page_mut(p0)?.write_bytes(0, 4, b"data");
        bpm.mark_dirty(p0)?;
        bpm.unpin(p0)?;

        let p1 = bpm.new_page()?;
        assert_ne!(p0, p1);
        let writes_before = bpm.num_write_io();
        assert!(writes_before >= 1);
        bpm.unpin(p1)?;

        bpm.pin(p0)?;
        assert_eq!(bpm.page(p0)?.read_bytes(0, 4), b"data");
        bpm.unpin(p0)?;
        Ok(())
    }

    #[test]
    fn test_shutdown_with_pinned_page_fails() -> Result<()> {
        let mut bpm = setup(1, ReplacementStrategy::Lru);
        let _p0 = bpm.new_page()?;
        assert!(bpm.shutdown().is_err());
        Ok(())
    }
}
