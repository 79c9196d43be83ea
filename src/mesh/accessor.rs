//! Read-only chunk neighborhood snapshot for meshing

use std::collections::HashMap;

use glam::IVec3;

use crate::voxel::block::{BlockId, blocks};
use crate::voxel::chunk::{self, CHUNK_SIZE, ChunkCoord, ChunkData};

/// Immutable snapshot of the chunks one meshing pass may touch.
///
/// Built through [`ChunkCache::accessor`], which guarantees the full 3x3x3
/// neighborhood of every chunk of interest is present; construction there
/// panics on a missing neighbor.
///
/// [`ChunkCache::accessor`]: crate::streaming::cache::ChunkCache::accessor
pub struct ChunkAccessor<'a> {
    chunks: HashMap<ChunkCoord, &'a ChunkData>,
}

impl<'a> ChunkAccessor<'a> {
    pub fn new(chunks: HashMap<ChunkCoord, &'a ChunkData>) -> Self {
        Self { chunks }
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&'a ChunkData> {
        self.chunks.get(&coord).copied()
    }

    /// Block at a position local to `coord`'s origin.
    ///
    /// Positions outside `[0, CHUNK_SIZE)` re-derive the owning neighbor by
    /// floor division and delegate to it. A neighbor missing from the
    /// snapshot reads as air, which keeps face culling best-effort at
    /// world/loading edges.
    pub fn get_block(&self, coord: ChunkCoord, local: IVec3) -> BlockId {
        let offset = local.div_euclid(IVec3::splat(CHUNK_SIZE as i32));
        let target = coord.offset(offset);
        match self.chunks.get(&target) {
            Some(data) => data.get(chunk::local_pos(local)),
            None => blocks::AIR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec3;

    fn snapshot(entries: &[(ChunkCoord, &'static ChunkData)]) -> ChunkAccessor<'static> {
        ChunkAccessor::new(entries.iter().copied().collect())
    }

    fn leak(data: ChunkData) -> &'static ChunkData {
        Box::leak(Box::new(data))
    }

    #[test]
    fn test_in_chunk_lookup() {
        let center = ChunkCoord::new(0, 0, 0);
        let mut data = ChunkData::filled(blocks::STONE);
        data.set(UVec3::new(3, 4, 5), blocks::DIRT);
        let accessor = snapshot(&[(center, leak(data))]);

        assert_eq!(accessor.get_block(center, IVec3::new(3, 4, 5)), blocks::DIRT);
        assert_eq!(accessor.get_block(center, IVec3::new(0, 0, 0)), blocks::STONE);
    }

    #[test]
    fn test_cross_chunk_delegation() {
        let size = CHUNK_SIZE as i32;
        let center = ChunkCoord::new(0, 0, 0);
        let above = ChunkCoord::new(0, 1, 0);
        let accessor = snapshot(&[
            (center, leak(ChunkData::filled(blocks::STONE))),
            (above, leak(ChunkData::filled(blocks::DIRT))),
        ]);

        // One step above the top face lands in the +Y neighbor.
        assert_eq!(
            accessor.get_block(center, IVec3::new(5, size, 5)),
            blocks::DIRT
        );
        // And one step below the -Y face of that neighbor lands back here.
        assert_eq!(
            accessor.get_block(above, IVec3::new(5, -1, 5)),
            blocks::STONE
        );
    }

    #[test]
    fn test_missing_neighbor_reads_as_air() {
        let size = CHUNK_SIZE as i32;
        let center = ChunkCoord::new(0, 0, 0);
        let accessor = snapshot(&[(center, leak(ChunkData::filled(blocks::STONE)))]);

        assert_eq!(accessor.get_block(center, IVec3::new(-1, 0, 0)), blocks::AIR);
        assert_eq!(
            accessor.get_block(center, IVec3::new(0, 0, size)),
            blocks::AIR
        );
        // Even multiple chunks out.
        assert_eq!(
            accessor.get_block(center, IVec3::new(size * 2 + 3, 0, 0)),
            blocks::AIR
        );
    }

    #[test]
    fn test_contains_and_chunk() {
        let center = ChunkCoord::new(2, 0, -1);
        let accessor = snapshot(&[(center, leak(ChunkData::filled(blocks::SAND)))]);

        assert!(accessor.contains(center));
        assert!(!accessor.contains(ChunkCoord::new(0, 0, 0)));
        assert!(accessor.chunk(center).is_some());
        assert!(accessor.chunk(ChunkCoord::new(0, 0, 0)).is_none());
    }
}
