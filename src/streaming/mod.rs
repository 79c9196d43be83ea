//! Chunk streaming: caching, generation scheduling, and renderable pooling

pub mod cache;
pub mod pool;
pub mod priority;
pub mod scheduler;

pub use cache::ChunkCache;
pub use pool::{ChunkPool, RenderHandle};
pub use priority::FocusQueue;
pub use scheduler::TerrainScheduler;
