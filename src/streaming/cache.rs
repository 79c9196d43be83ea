//! Authoritative store of generated chunks
//!
//! Bounded map of chunk data with farthest-first eviction and per-chunk
//! remesh/recollide staging. The cache is mutated only by the coordination
//! thread; generation workers hand results over through the scheduler's
//! merge step.

use std::collections::{HashMap, HashSet};

use glam::IVec3;

use crate::mesh::accessor::ChunkAccessor;
use crate::streaming::priority::FocusQueue;
use crate::voxel::block::BlockId;
use crate::voxel::chunk::{self, ChunkCoord, ChunkData, FACE_DIRS};

/// Bounded cache of generated chunks, keyed by chunk coordinate.
///
/// Dirty state per coordinate steps Clean -> NeedsRemesh -> NeedsRecollide
/// -> Clean: mesh rebuilds and collider bakes have very different costs and
/// must not both be forced in the same frame.
pub struct ChunkCache {
    chunks: HashMap<ChunkCoord, ChunkData>,
    queue: FocusQueue,
    remesh: HashSet<ChunkCoord>,
    recollide: HashSet<ChunkCoord>,
    focus: ChunkCoord,
    capacity: usize,
}

impl ChunkCache {
    /// Cache holding at most `capacity` generated chunks.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "cache capacity must be positive");
        Self {
            chunks: HashMap::with_capacity(capacity),
            queue: FocusQueue::new(),
            remesh: HashSet::new(),
            recollide: HashSet::new(),
            focus: ChunkCoord::new(0, 0, 0),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&ChunkData> {
        self.chunks.get(&coord)
    }

    pub fn focus(&self) -> ChunkCoord {
        self.focus
    }

    /// Move the focus; every queued coordinate is re-scored against it.
    pub fn focus_update(&mut self, focus: ChunkCoord) {
        self.focus = focus;
        self.queue.rescore(focus);
    }

    /// Insert a freshly generated chunk, evicting the farthest cached
    /// coordinate when full.
    ///
    /// # Panics
    /// If the coordinate is already cached; generating the same chunk
    /// twice is a scheduling invariant violation.
    pub fn insert_generated(&mut self, coord: ChunkCoord, data: ChunkData) {
        if self.chunks.contains_key(&coord) {
            panic!("chunk {coord:?} already exists");
        }
        if self.chunks.len() >= self.capacity {
            self.evict_farthest();
        }
        self.chunks.insert(coord, data);
        self.queue.push(coord, self.focus);
    }

    fn evict_farthest(&mut self) {
        let Some(victim) = self.queue.pop_farthest() else {
            return;
        };
        if let Some(data) = self.chunks.remove(&victim) {
            if data.is_dirty() {
                log::warn!("evicting edited chunk {victim:?}; its changes are lost");
            }
        }
        self.remesh.remove(&victim);
        self.recollide.remove(&victim);
        log::trace!("evicted chunk {victim:?}");
    }

    /// Set one block at a world position.
    ///
    /// Returns `false` when the owning chunk is not loaded (logged at warn)
    /// or when the block already has that id. On success the containing
    /// chunks of all six face-adjacent voxels are marked for remeshing,
    /// since a boundary edit changes neighbor face visibility too.
    pub fn set_block(&mut self, pos: IVec3, block: BlockId) -> bool {
        let coord = ChunkCoord::containing(pos);
        let Some(data) = self.chunks.get_mut(&coord) else {
            log::warn!("chunk {coord:?} not loaded; ignoring set_block at {pos:?}");
            return false;
        };
        let changed = data.set(chunk::local_pos(pos), block);
        if changed {
            self.mark_remesh_around(pos);
        }
        changed
    }

    /// Mark the chunks containing each face-adjacent voxel of `pos` (always
    /// including its own chunk) as needing a remesh. An edit also voids a
    /// pending recollide: the new mesh has to land before its collider.
    fn mark_remesh_around(&mut self, pos: IVec3) {
        for dir in FACE_DIRS {
            let coord = ChunkCoord::containing(pos + dir);
            self.recollide.remove(&coord);
            self.remesh.insert(coord);
        }
    }

    pub fn should_remesh(&self, coord: ChunkCoord) -> bool {
        self.remesh.contains(&coord)
    }

    pub fn should_recollide(&self, coord: ChunkCoord) -> bool {
        self.recollide.contains(&coord)
    }

    /// Coordinates currently owing a remesh.
    pub fn remesh_pending(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.remesh.iter().copied()
    }

    /// Consume a remesh obligation: NeedsRemesh -> NeedsRecollide.
    pub fn remeshed(&mut self, coord: ChunkCoord) -> bool {
        if !self.remesh.remove(&coord) {
            return false;
        }
        self.recollide.insert(coord);
        true
    }

    /// Consume a recollide obligation: NeedsRecollide -> Clean.
    pub fn recollided(&mut self, coord: ChunkCoord) -> bool {
        self.recollide.remove(&coord)
    }

    /// Whether `coord` and all 26 of its neighbors are generated.
    pub fn has_neighborhood(&self, coord: ChunkCoord) -> bool {
        neighborhood(coord).all(|pos| self.chunks.contains_key(&pos))
    }

    /// Snapshot the full 3x3x3 neighborhood of every chunk of interest.
    ///
    /// # Panics
    /// If any required chunk has not been generated; meshing before the
    /// neighborhood exists is a scheduling-ordering bug upstream.
    pub fn accessor(&self, coords: &[ChunkCoord]) -> ChunkAccessor<'_> {
        let mut map = HashMap::with_capacity(coords.len() * 27);
        for &coord in coords {
            for pos in neighborhood(coord) {
                let Some(data) = self.chunks.get(&pos) else {
                    panic!("chunk {pos:?} has not been generated");
                };
                map.entry(pos).or_insert(data);
            }
        }
        ChunkAccessor::new(map)
    }
}

/// The 3x3x3 block of coordinates around `coord`, itself included.
fn neighborhood(coord: ChunkCoord) -> impl Iterator<Item = ChunkCoord> {
    (-1..=1).flat_map(move |dx| {
        (-1..=1).flat_map(move |dy| {
            (-1..=1).map(move |dz| coord.offset(IVec3::new(dx, dy, dz)))
        })
    })
}
