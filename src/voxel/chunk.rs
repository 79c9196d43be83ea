//! Chunk coordinates and per-chunk block storage

use glam::{IVec3, UVec3, Vec3};

use crate::voxel::block::BlockId;
use crate::voxel::run::VoxelRun;

/// Side length of a cubic chunk, in blocks.
pub const CHUNK_SIZE: u32 = 32;

/// Voxels per chunk.
pub const CHUNK_VOLUME: u32 = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

/// The six axis-aligned face directions: +X, -X, +Y, -Y, +Z, -Z.
pub const FACE_DIRS: [IVec3; 6] = [
    IVec3::new(1, 0, 0),
    IVec3::new(-1, 0, 0),
    IVec3::new(0, 1, 0),
    IVec3::new(0, -1, 0),
    IVec3::new(0, 0, 1),
    IVec3::new(0, 0, -1),
];

/// Integer coordinate identifying a chunk in the chunk grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Chunk containing a world-space block position. Floor division, so
    /// negative coordinates map correctly.
    pub fn containing(block_pos: IVec3) -> Self {
        let c = block_pos.div_euclid(IVec3::splat(CHUNK_SIZE as i32));
        Self::new(c.x, c.y, c.z)
    }

    /// Chunk containing a continuous world position.
    pub fn from_world_pos(pos: Vec3) -> Self {
        Self::containing(pos.floor().as_ivec3())
    }

    /// World-space block position of this chunk's minimum corner.
    pub fn block_origin(&self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z) * CHUNK_SIZE as i32
    }

    pub fn world_origin(&self) -> Vec3 {
        self.block_origin().as_vec3()
    }

    pub fn offset(&self, delta: IVec3) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.z + delta.z)
    }

    /// Squared distance to another chunk coordinate, in chunk-grid units.
    pub fn distance_squared(&self, other: Self) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dy * dy + dz * dz
    }
}

/// Local (in-chunk) coordinate of a world-space block position.
pub fn local_pos(block_pos: IVec3) -> UVec3 {
    block_pos
        .rem_euclid(IVec3::splat(CHUNK_SIZE as i32))
        .as_uvec3()
}

/// Flatten a local coordinate into run iteration order (x, then y, then z).
pub fn flatten(local: UVec3) -> u32 {
    debug_assert!(local.max_element() < CHUNK_SIZE);
    (local.x * CHUNK_SIZE + local.y) * CHUNK_SIZE + local.z
}

/// Blocks of one chunk, backed by a [`VoxelRun`].
///
/// Created by generation, mutated by edits, dropped on cache eviction.
#[derive(Clone, Debug)]
pub struct ChunkData {
    run: VoxelRun,
    dirty: bool,
}

impl ChunkData {
    /// Wrap a fully built run.
    ///
    /// # Panics
    /// If the run does not cover the chunk volume exactly.
    pub fn from_run(run: VoxelRun) -> Self {
        assert_eq!(
            run.len(),
            CHUNK_VOLUME,
            "chunk run covers {} voxels, expected {CHUNK_VOLUME}",
            run.len()
        );
        Self { run, dirty: false }
    }

    /// Chunk filled entirely with one block.
    pub fn filled(block: BlockId) -> Self {
        let mut run = VoxelRun::new();
        run.push_run(block, CHUNK_VOLUME);
        Self { run, dirty: false }
    }

    pub fn get(&self, local: UVec3) -> BlockId {
        self.run.get(flatten(local))
    }

    /// Set one block; marks the chunk edited when the id changes.
    pub fn set(&mut self, local: UVec3, block: BlockId) -> bool {
        let changed = self.run.set(flatten(local), block);
        if changed {
            self.dirty = true;
        }
        changed
    }

    /// Whether the chunk has been edited since generation.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn run(&self) -> &VoxelRun {
        &self.run
    }
}
