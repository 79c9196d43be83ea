//! World coordination: generation, caching, meshing, and pooling
//!
//! An explicitly constructed context owning every subsystem; there is no
//! global state. One `World` runs on a single coordination thread; only
//! generation tasks and mesh builds fan out to workers, and both hand their
//! results back before anything shared is touched.

use glam::{IVec3, Vec3};
use rayon::prelude::*;

use crate::core::types::Result;
use crate::mesh::builder::{self, AtlasLayout};
use crate::mesh::vertex::MeshBuffer;
use crate::streaming::cache::ChunkCache;
use crate::streaming::pool::ChunkPool;
use crate::streaming::scheduler::TerrainScheduler;
use crate::terrain::generator::{TerrainGenerator, TerrainParams};
use crate::voxel::block::{BlockId, BlockRegistry};
use crate::voxel::chunk::ChunkCoord;

/// World construction parameters.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    pub terrain: TerrainParams,
    /// View radius in chunks; generation targets the cube of side
    /// `2 * view_distance + 1` around the focus chunk.
    pub view_distance: i32,
    pub atlas: AtlasLayout,
    /// Worker threads for terrain generation (0 = one per core).
    pub threads: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            terrain: TerrainParams::default(),
            view_distance: 4,
            atlas: AtlasLayout::new(4),
            threads: 0,
        }
    }
}

/// Owner of the streaming pipeline: registry, generator (via the
/// scheduler), chunk cache, and renderable pool.
pub struct World {
    registry: BlockRegistry,
    cache: ChunkCache,
    scheduler: TerrainScheduler,
    pool: ChunkPool,
    atlas: AtlasLayout,
    view_distance: i32,
    focus: ChunkCoord,
}

impl World {
    pub fn new(registry: BlockRegistry, config: WorldConfig) -> Result<Self> {
        let generator = TerrainGenerator::new(config.terrain)?;
        let scheduler = TerrainScheduler::new(generator, config.threads)?;

        // Capacity covers the view cube plus a one-chunk fringe so a moving
        // focus evicts the far edge instead of thrashing the live set.
        let span = (2 * (config.view_distance + 1) + 1) as usize;
        let capacity = span * span * span;

        Ok(Self {
            registry,
            cache: ChunkCache::new(capacity),
            scheduler,
            pool: ChunkPool::new(capacity),
            atlas: config.atlas,
            view_distance: config.view_distance,
            focus: ChunkCoord::new(0, 0, 0),
        })
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &ChunkCache {
        &self.cache
    }

    pub fn pool(&self) -> &ChunkPool {
        &self.pool
    }

    /// Mutable pool access for the render consumer to attach mesh and
    /// collider ids to claimed handles.
    pub fn pool_mut(&mut self) -> &mut ChunkPool {
        &mut self.pool
    }

    pub fn focus(&self) -> ChunkCoord {
        self.focus
    }

    /// Advance the streaming state for a (possibly moved) focus position:
    /// rescore priorities, merge a finished generation batch, and submit a
    /// new batch for ungenerated coordinates in view.
    pub fn update(&mut self, focus_pos: Vec3) {
        let focus = ChunkCoord::from_world_pos(focus_pos);
        if focus != self.focus {
            self.focus = focus;
            self.cache.focus_update(focus);
            self.pool.focus_update(focus);
        }

        if self.scheduler.is_complete() {
            self.scheduler.complete(&mut self.cache);
        }

        if self.scheduler.is_idle() {
            let missing = self.missing_in_view();
            if !missing.is_empty() {
                self.scheduler.request_generation(missing);
            }
        }
    }

    /// Block until any in-flight generation batch is merged.
    pub fn finish_generation(&mut self) {
        self.scheduler.complete(&mut self.cache);
    }

    /// Ungenerated coordinates within the view cube, nearest first.
    fn missing_in_view(&self) -> Vec<ChunkCoord> {
        let r = self.view_distance;
        let mut coords = Vec::new();
        for dx in -r..=r {
            for dy in -r..=r {
                for dz in -r..=r {
                    let coord = self.focus.offset(IVec3::new(dx, dy, dz));
                    if !self.cache.contains(coord) {
                        coords.push(coord);
                    }
                }
            }
        }
        coords.sort_by_key(|coord| coord.distance_squared(self.focus));
        coords
    }

    /// Edit entry point; see [`ChunkCache::set_block`].
    pub fn set_block(&mut self, pos: IVec3, block: BlockId) -> bool {
        self.cache.set_block(pos, block)
    }

    /// Mesh the given chunks, skipping any whose 3x3x3 neighborhood is not
    /// yet generated. Meshing fans out over an immutable snapshot; once the
    /// buffers are back, each chunk consumes a pending remesh obligation
    /// and claims a render slot if it has none.
    pub fn mesh_chunks(&mut self, coords: &[ChunkCoord]) -> Vec<(ChunkCoord, MeshBuffer)> {
        let ready: Vec<ChunkCoord> = coords
            .iter()
            .copied()
            .filter(|&coord| self.cache.has_neighborhood(coord))
            .collect();
        if ready.is_empty() {
            return Vec::new();
        }

        let meshes: Vec<(ChunkCoord, MeshBuffer)> = {
            let accessor = self.cache.accessor(&ready);
            let registry = &self.registry;
            let atlas = self.atlas;
            ready
                .par_iter()
                .map(|&coord| (coord, builder::build_chunk_mesh(coord, &accessor, registry, atlas)))
                .collect()
        };

        for (coord, _) in &meshes {
            self.cache.remeshed(*coord);
            if !self.pool.is_active(*coord) {
                self.pool.claim(*coord);
            }
        }
        meshes
    }

    /// Rebuild every dirty chunk whose neighborhood allows it right now.
    pub fn remesh_ready(&mut self) -> Vec<(ChunkCoord, MeshBuffer)> {
        let eligible: Vec<ChunkCoord> = self
            .cache
            .remesh_pending()
            .filter(|&coord| self.cache.has_neighborhood(coord))
            .collect();
        self.mesh_chunks(&eligible)
    }

    /// Consumer callback once a chunk's collider is baked:
    /// NeedsRecollide -> Clean.
    pub fn collider_baked(&mut self, coord: ChunkCoord) {
        self.cache.recollided(coord);
        self.pool.collider_baked(coord);
    }
}
