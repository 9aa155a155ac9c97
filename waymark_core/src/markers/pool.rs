// waymark_core/src/markers/pool.rs

//! Fixed-capacity pool of reusable marker objects.
//!
//! Objects are created once up front and recycled. When every slot is checked
//! out the pool grows by one overflow slot instead of failing; overflow slots
//! are recycled like any other and destroyed only at teardown.

use crate::error::{Result, WaymarkError};
use crate::interfaces::SceneObjectFactory;
use crate::types::{AnchorHandle, SceneObjectHandle, SlotId};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerHandle {
    pub slot: SlotId,
    pub bound_index: Option<usize>,
    pub anchor: Option<AnchorHandle>,
    pub object: SceneObjectHandle,
    pub overflow: bool,
}

#[derive(Debug, Default)]
pub struct MarkerPool {
    capacity: usize,
    handles: Vec<MarkerHandle>,
    checked_out: Vec<bool>,
    free: VecDeque<SlotId>,
    bound: HashMap<usize, SlotId>,
}

impl MarkerPool {
    /// Pre-allocates `capacity` hidden objects.
    pub fn initialize(capacity: usize, scene: &mut dyn SceneObjectFactory) -> Self {
        let mut pool = Self {
            capacity,
            handles: Vec::with_capacity(capacity),
            checked_out: Vec::with_capacity(capacity),
            free: VecDeque::with_capacity(capacity),
            bound: HashMap::with_capacity(capacity),
        };
        for _ in 0..capacity {
            let slot = pool.allocate(scene, false);
            pool.free.push_back(slot);
        }
        tracing::info!("Marker pool initialized with {} objects", capacity);
        pool
    }

    fn allocate(&mut self, scene: &mut dyn SceneObjectFactory, overflow: bool) -> SlotId {
        let object = scene.instantiate();
        scene.set_visible(object, false);
        let slot = SlotId(self.handles.len());
        self.handles.push(MarkerHandle {
            slot,
            bound_index: None,
            anchor: None,
            object,
            overflow,
        });
        self.checked_out.push(false);
        slot
    }

    /// Checks out a free slot, growing the pool when none is left.
    pub fn acquire(&mut self, scene: &mut dyn SceneObjectFactory) -> SlotId {
        let slot = match self.free.pop_front() {
            Some(slot) => slot,
            None => {
                let slot = self.allocate(scene, true);
                tracing::warn!(
                    "{}",
                    WaymarkError::ResourceExhaustion {
                        capacity: self.capacity,
                        slot: slot.0,
                    }
                );
                slot
            }
        };
        self.checked_out[slot.0] = true;
        slot
    }

    /// Records that `slot` now represents path vertex `index`.
    pub fn bind(&mut self, slot: SlotId, index: usize, anchor: AnchorHandle) -> Result<()> {
        if !self.checked_out.get(slot.0).copied().unwrap_or(false) {
            return Err(WaymarkError::InvalidInput(format!(
                "slot {} is not checked out",
                slot.0
            )));
        }
        if let Some(existing) = self.bound.get(&index) {
            return Err(WaymarkError::DuplicateBinding {
                index,
                slot: existing.0,
            });
        }
        let handle = &mut self.handles[slot.0];
        if let Some(previous) = handle.bound_index {
            return Err(WaymarkError::InvalidInput(format!(
                "slot {} is already bound to index {}",
                slot.0, previous
            )));
        }
        handle.bound_index = Some(index);
        handle.anchor = Some(anchor);
        self.bound.insert(index, slot);
        Ok(())
    }

    /// Returns `slot` to the free list, hiding and detaching its object.
    ///
    /// The detached anchor is handed back so the caller can destroy it.
    /// Releasing a slot that is already free does nothing and returns `None`.
    pub fn release(
        &mut self,
        slot: SlotId,
        scene: &mut dyn SceneObjectFactory,
    ) -> Option<AnchorHandle> {
        if !self.checked_out.get(slot.0).copied().unwrap_or(false) {
            return None;
        }
        let handle = &mut self.handles[slot.0];
        if let Some(index) = handle.bound_index.take() {
            self.bound.remove(&index);
        }
        let anchor = handle.anchor.take();
        scene.set_parent(handle.object, None);
        scene.set_visible(handle.object, false);

        self.checked_out[slot.0] = false;
        self.free.push_back(slot);
        anchor
    }

    /// Destroys every object, overflow ones included. Anchors still bound at
    /// this point are returned for destruction.
    pub fn teardown(&mut self, scene: &mut dyn SceneObjectFactory) -> Vec<AnchorHandle> {
        let mut orphaned = Vec::new();
        for handle in self.handles.drain(..) {
            if let Some(anchor) = handle.anchor {
                orphaned.push(anchor);
            }
            scene.destroy(handle.object);
        }
        self.checked_out.clear();
        self.free.clear();
        self.bound.clear();
        orphaned
    }

    /// Pre-allocated size. `len` can exceed it after overflow.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn bound_count(&self) -> usize {
        self.bound.len()
    }

    pub fn overflow_count(&self) -> usize {
        self.handles.iter().filter(|h| h.overflow).count()
    }

    pub fn slot_for_index(&self, index: usize) -> Option<SlotId> {
        self.bound.get(&index).copied()
    }

    /// Bound path indices in ascending order.
    pub fn bound_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.bound.keys().copied().collect();
        indices.sort_unstable();
        indices
    }

    pub fn handle(&self, slot: SlotId) -> Option<&MarkerHandle> {
        self.handles.get(slot.0)
    }
}
