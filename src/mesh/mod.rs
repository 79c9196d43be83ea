//! Chunk meshing: neighborhood snapshots and face-culled geometry

pub mod accessor;
pub mod builder;
pub mod vertex;

pub use accessor::ChunkAccessor;
pub use builder::{AtlasLayout, build_chunk_mesh};
pub use vertex::{MeshBuffer, Vertex};
