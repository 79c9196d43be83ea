//! Recycling pool of renderable chunk slots
//!
//! Renderables have their own lifecycle, independent of the voxel data: a
//! bounded set of slots is claimed per displayed chunk and the farthest slot
//! is reclaimed when the pool fills up.

use std::collections::{HashMap, HashSet};

use glam::Vec3;

use crate::streaming::priority::FocusQueue;
use crate::voxel::chunk::ChunkCoord;

/// One renderable slot. Mesh and collider ids are assigned by the external
/// render/physics consumer; the pool only tracks slot ownership.
#[derive(Clone, Debug, Default)]
pub struct RenderHandle {
    pub world_origin: Vec3,
    pub mesh: Option<u32>,
    pub collider: Option<u32>,
}

/// Bounded pool recycling renderable slots across chunks.
pub struct ChunkPool {
    slots: Vec<RenderHandle>,
    free: Vec<usize>,
    active: HashMap<ChunkCoord, usize>,
    collidable: HashSet<ChunkCoord>,
    queue: FocusQueue,
    focus: ChunkCoord,
    capacity: usize,
}

impl ChunkPool {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "pool capacity must be positive");
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            active: HashMap::with_capacity(capacity),
            collidable: HashSet::new(),
            queue: FocusQueue::new(),
            focus: ChunkCoord::new(0, 0, 0),
            capacity,
        }
    }

    pub fn is_active(&self, coord: ChunkCoord) -> bool {
        self.active.contains_key(&coord)
    }

    pub fn is_collidable(&self, coord: ChunkCoord) -> bool {
        self.collidable.contains(&coord)
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Move the focus; queued slot priorities follow it.
    pub fn focus_update(&mut self, focus: ChunkCoord) {
        self.focus = focus;
        self.queue.rescore(focus);
    }

    /// Claim a renderable slot for a chunk. A full pool reclaims the
    /// farthest active slot first, detaching its collider.
    ///
    /// # Panics
    /// If `coord` already holds a slot.
    pub fn claim(&mut self, coord: ChunkCoord) -> &mut RenderHandle {
        if self.active.contains_key(&coord) {
            panic!("chunk {coord:?} already active");
        }
        if self.active.len() >= self.capacity {
            self.reclaim_farthest();
        }

        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push(RenderHandle::default());
                self.slots.len() - 1
            }
        };
        self.active.insert(coord, slot);
        self.queue.push(coord, self.focus);

        let handle = &mut self.slots[slot];
        handle.world_origin = coord.world_origin();
        handle.mesh = None;
        handle.collider = None;
        handle
    }

    fn reclaim_farthest(&mut self) {
        let Some(victim) = self.queue.pop_farthest() else {
            return;
        };
        let Some(slot) = self.active.remove(&victim) else {
            return;
        };
        // Detach the collider before the slot is reused.
        self.slots[slot].collider = None;
        self.slots[slot].mesh = None;
        self.collidable.remove(&victim);
        self.free.push(slot);
        log::trace!("reclaimed render slot of chunk {victim:?}");
    }

    /// Active handle for a chunk.
    ///
    /// # Panics
    /// If the chunk holds no slot.
    pub fn get(&self, coord: ChunkCoord) -> &RenderHandle {
        match self.active.get(&coord) {
            Some(&slot) => &self.slots[slot],
            None => panic!("chunk {coord:?} isn't active"),
        }
    }

    /// Mutable active handle for a chunk; see [`ChunkPool::get`].
    pub fn get_mut(&mut self, coord: ChunkCoord) -> &mut RenderHandle {
        match self.active.get(&coord) {
            Some(&slot) => &mut self.slots[slot],
            None => panic!("chunk {coord:?} isn't active"),
        }
    }

    /// Record that the consumer baked this chunk's collider.
    pub fn collider_baked(&mut self, coord: ChunkCoord) {
        self.collidable.insert(coord);
    }

    /// Handles for the subset of `coords` that currently hold a slot.
    pub fn active_handles(&self, coords: &[ChunkCoord]) -> Vec<(ChunkCoord, &RenderHandle)> {
        coords
            .iter()
            .filter_map(|&coord| {
                self.active
                    .get(&coord)
                    .map(|&slot| (coord, &self.slots[slot]))
            })
            .collect()
    }
}
