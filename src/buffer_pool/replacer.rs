use core::fmt::Debug;
use std::collections::HashMap;

use priority_queue::PriorityQueue;

use super::FrameId;

pub(super) trait Replacer: Send + Sync + Debug {
    fn record_access(&mut self, frame_id: FrameId);
    fn set_evictable(&mut self, frame_id: FrameId, evictable: bool);
    fn remove(&mut self, frame_id: FrameId);
    fn can_evict(&self) -> bool;
    fn evict(&mut self) -> FrameId;
    #[cfg(test)]
    fn peek(&self) -> Option<FrameId>;
}

/// Victims are chosen by most-recent access: every `record_access` bumps
/// the frame's priority, so the least-recently-used evictable frame is
/// always at the top of the heap.
#[derive(Clone, Debug, Default)]
pub(super) struct Lru {
    timestamp: i64,
    heap: PriorityQueue<FrameId, i64>,
    /// Holds the last-seen timestamp while the frame is pinned (and thus
    /// not in `heap`); restored to the heap once unpinned.
    last_access: HashMap<FrameId, i64>,
}

impl Lru {
    pub fn new(size: usize) -> Self {
        Self {
            timestamp: 0,
            heap: PriorityQueue::with_capacity(size),
            last_access: HashMap::with_capacity(size),
        }
    }
}

impl Replacer for Lru {
    fn record_access(&mut self, frame_id: FrameId) {
        self.timestamp += 1;
        self.heap.push_decrease(frame_id, -self.timestamp);
        self.set_evictable(frame_id, false);
    }

    fn can_evict(&self) -> bool {
        !self.heap.is_empty()
    }

    fn evict(&mut self) -> FrameId {
        self.heap.pop().unwrap().0
    }

    #[cfg(test)]
    fn peek(&self) -> Option<FrameId> {
        self.heap.peek().map(|(frame_id, _)| *frame_id)
    }

    fn set_evictable(&mut self, frame_id: FrameId, evictable: bool) {
        if evictable {
            if let Some(ts) = self.last_access.remove(&frame_id) {
                self.heap.push(frame_id, ts);
            }
        } else if let Some((frame_id, ts)) = self.heap.remove(&frame_id) {
            self.last_access.insert(frame_id, ts);
        }
    }

    fn remove(&mut self, frame_id: FrameId) {
        self.heap.remove(&frame_id);
        self.last_access.remove(&frame_id);
    }
}

/// Victims are chosen by load order only: a frame's priority is set once,
/// the first time it is ever seen, and never moves afterwards no matter
/// how many times it is re-accessed while pinned.
#[derive(Clone, Debug, Default)]
pub(super) struct Fifo {
    timestamp: i64,
    heap: PriorityQueue<FrameId, i64>,
    /// The fixed load-order marker, assigned once per frame id and kept
    /// forever (mirrored here so it survives round trips through
    /// `last_access` while the frame is pinned).
    markers: HashMap<FrameId, i64>,
    last_access: HashMap<FrameId, i64>,
}

impl Fifo {
    pub fn new(size: usize) -> Self {
        Self {
            timestamp: 0,
            heap: PriorityQueue::with_capacity(size),
            markers: HashMap::with_capacity(size),
            last_access: HashMap::with_capacity(size),
        }
    }
}

impl Replacer for Fifo {
    fn record_access(&mut self, frame_id: FrameId) {
        if !self.markers.contains_key(&frame_id) {
            self.timestamp += 1;
            let marker = -self.timestamp;
            self.markers.insert(frame_id, marker);
            self.heap.push(frame_id, marker);
        }
        self.set_evictable(frame_id, false);
    }

    fn can_evict(&self) -> bool {
        !self.heap.is_empty()
    }

    fn evict(&mut self) -> FrameId {
        let (frame_id, _) = self.heap.pop().unwrap();
        self.markers.remove(&frame_id);
        frame_id
    }

    #[cfg(test)]
    fn peek(&self) -> Option<FrameId> {
        self.heap.peek().map(|(frame_id, _)| *frame_id)
    }

    fn set_evictable(&mut self, frame_id: FrameId, evictable: bool) {
        if evictable {
            if let Some(ts) = self.last_access.remove(&frame_id) {
                self.heap.push(frame_id, ts);
            }
        } else if let Some((frame_id, ts)) = self.heap.remove(&frame_id) {
            self.last_access.insert(frame_id, ts);
        }
    }

    fn remove(&mut self, frame_id: FrameId) {
        self.heap.remove(&frame_id);
        self.last_access.remove(&frame_id);
        self.markers.remove(&frame_id);
    }
}
