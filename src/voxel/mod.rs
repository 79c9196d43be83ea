//! Voxel data structures and operations

pub mod block;
pub mod chunk;
pub mod run;

pub use block::{BlockId, BlockRegistry, BlockType};
pub use chunk::{CHUNK_SIZE, CHUNK_VOLUME, ChunkCoord, ChunkData};
pub use run::VoxelRun;
