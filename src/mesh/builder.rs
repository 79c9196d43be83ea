//! Face-culling chunk mesher
//!
//! Emits one quad per solid/non-solid boundary. Visible geometry scales with
//! surface area rather than volume, which is what keeps remeshing after an
//! edit cheap enough for real time.

use glam::IVec3;

use crate::mesh::accessor::ChunkAccessor;
use crate::mesh::vertex::{MeshBuffer, Vertex};
use crate::voxel::block::BlockRegistry;
use crate::voxel::chunk::{CHUNK_SIZE, ChunkCoord, FACE_DIRS};

/// Flat texture atlas layout: a square grid of equally sized tiles.
#[derive(Clone, Copy, Debug)]
pub struct AtlasLayout {
    tiles_per_row: u32,
}

/// Inset applied to tile UVs against sampling bleed between tiles.
const UV_EPSILON: f32 = 0.0005;

impl AtlasLayout {
    pub fn new(tiles_per_row: u32) -> Self {
        assert!(tiles_per_row > 0, "atlas needs at least one tile per row");
        Self { tiles_per_row }
    }

    pub fn tiles_per_row(&self) -> u32 {
        self.tiles_per_row
    }

    /// Corner UVs of a flat tile index, in quad vertex order. The tile row
    /// counts from the top of the atlas, so v is flipped.
    fn tile_uvs(&self, tile: u16) -> [[f32; 2]; 4] {
        let inv = 1.0 / self.tiles_per_row as f32;
        let u = (tile as u32 % self.tiles_per_row) as f32 * inv;
        let v = 1.0 - (tile as u32 / self.tiles_per_row) as f32 * inv - inv;
        [
            [u + UV_EPSILON, v + UV_EPSILON],
            [u + UV_EPSILON, v + inv - UV_EPSILON],
            [u + inv - UV_EPSILON, v + UV_EPSILON],
            [u + inv - UV_EPSILON, v + inv - UV_EPSILON],
        ]
    }
}

/// Unit-cube corner offsets per face, ordered to pair with
/// [`AtlasLayout::tile_uvs`]; triangles (0, 1, 2) and (2, 1, 3) wind
/// outward.
const FACE_CORNERS: [[[f32; 3]; 4]; 6] = [
    // +X
    [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0]],
    // -X
    [[0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
    // +Y
    [[0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
    // -Y
    [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 1.0]],
    // +Z
    [[1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0]],
    // -Z
    [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]],
];

/// Build the render mesh for one chunk.
///
/// Every local voxel is visited in fixed order; non-solid blocks emit
/// nothing. Neighbor tests stay inside the chunk's own run where possible
/// and cross chunk boundaries through the accessor snapshot.
///
/// # Panics
/// If `coord` itself is missing from the snapshot.
pub fn build_chunk_mesh(
    coord: ChunkCoord,
    accessor: &ChunkAccessor<'_>,
    registry: &BlockRegistry,
    atlas: AtlasLayout,
) -> MeshBuffer {
    let data = accessor
        .chunk(coord)
        .unwrap_or_else(|| panic!("chunk {coord:?} missing from accessor snapshot"));

    let size = CHUNK_SIZE as i32;
    let mut buffer = MeshBuffer::default();

    for x in 0..size {
        for y in 0..size {
            for z in 0..size {
                let local = IVec3::new(x, y, z);
                let block = data.get(local.as_uvec3());
                if !registry.is_solid(block) {
                    continue;
                }

                for (face, dir) in FACE_DIRS.iter().enumerate() {
                    let neighbor_pos = local + *dir;
                    let neighbor = if in_chunk(neighbor_pos) {
                        data.get(neighbor_pos.as_uvec3())
                    } else {
                        accessor.get_block(coord, neighbor_pos)
                    };

                    if !registry.is_solid(neighbor) {
                        emit_face(
                            &mut buffer,
                            local,
                            face,
                            registry.face_tile(block, face),
                            atlas,
                        );
                    }
                }
            }
        }
    }

    buffer
}

fn in_chunk(pos: IVec3) -> bool {
    pos.min_element() >= 0 && pos.max_element() < CHUNK_SIZE as i32
}

fn emit_face(buffer: &mut MeshBuffer, local: IVec3, face: usize, tile: u16, atlas: AtlasLayout) {
    let base = buffer.vertices.len() as u32;
    let axis = FACE_DIRS[face].as_vec3().to_array();
    let uvs = atlas.tile_uvs(tile);

    for (corner, uv) in FACE_CORNERS[face].iter().zip(uvs) {
        buffer.vertices.push(Vertex {
            position: [
                local.x as f32 + corner[0],
                local.y as f32 + corner[1],
                local.z as f32 + corner[2],
            ],
            normal: axis,
            tangent: axis,
            uv,
        });
    }

    buffer
        .indices
        .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 1, base + 3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::block::{BlockId, blocks};
    use crate::voxel::chunk::ChunkData;
    use glam::UVec3;
    use std::collections::HashMap;

    fn atlas() -> AtlasLayout {
        AtlasLayout::new(4)
    }

    /// Accessor over the center chunk plus all 26 neighbors filled with one
    /// block each.
    fn neighborhood_accessor(
        center_block: BlockId,
        neighbor_block: BlockId,
    ) -> (ChunkCoord, ChunkAccessor<'static>) {
        let center = ChunkCoord::new(0, 0, 0);
        let mut map = HashMap::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let coord = center.offset(IVec3::new(dx, dy, dz));
                    let block = if coord == center {
                        center_block
                    } else {
                        neighbor_block
                    };
                    let data: &'static ChunkData = Box::leak(Box::new(ChunkData::filled(block)));
                    map.insert(coord, data);
                }
            }
        }
        (center, ChunkAccessor::new(map))
    }

    #[test]
    fn test_buried_chunk_emits_nothing() {
        let (center, accessor) = neighborhood_accessor(blocks::STONE, blocks::STONE);
        let mesh = build_chunk_mesh(center, &accessor, &BlockRegistry::with_defaults(), atlas());

        assert!(mesh.is_empty());
        assert!(mesh.indices.is_empty());
    }

    #[test]
    fn test_exposed_chunk_emits_outer_shell() {
        let (center, accessor) = neighborhood_accessor(blocks::STONE, blocks::AIR);
        let mesh = build_chunk_mesh(center, &accessor, &BlockRegistry::with_defaults(), atlas());

        // Only the shell is visible: 6 * CHUNK_SIZE^2 quads.
        let expected = 6 * (CHUNK_SIZE * CHUNK_SIZE) as usize;
        assert_eq!(mesh.quad_count(), expected);
        assert_eq!(mesh.vertices.len(), expected * 4);
        assert_eq!(mesh.indices.len(), expected * 6);
    }

    #[test]
    fn test_air_chunk_emits_nothing() {
        let (center, accessor) = neighborhood_accessor(blocks::AIR, blocks::STONE);
        let mesh = build_chunk_mesh(center, &accessor, &BlockRegistry::with_defaults(), atlas());

        assert!(mesh.is_empty());
    }

    #[test]
    fn test_single_block_emits_six_faces() {
        let center = ChunkCoord::new(0, 0, 0);
        let mut data = ChunkData::filled(blocks::AIR);
        data.set(UVec3::new(10, 10, 10), blocks::STONE);

        let (_, accessor_base) = neighborhood_accessor(blocks::AIR, blocks::AIR);
        // Rebuild the snapshot with the single-block chunk in the middle.
        let mut map = HashMap::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let coord = center.offset(IVec3::new(dx, dy, dz));
                    map.insert(coord, accessor_base.chunk(coord).unwrap());
                }
            }
        }
        let leaked: &'static ChunkData = Box::leak(Box::new(data));
        map.insert(center, leaked);
        let accessor = ChunkAccessor::new(map);

        let mesh = build_chunk_mesh(center, &accessor, &BlockRegistry::with_defaults(), atlas());
        assert_eq!(mesh.quad_count(), 6);

        // Face normals cover every axis direction once.
        let mut normals: Vec<[f32; 3]> = mesh
            .vertices
            .chunks(4)
            .map(|quad| quad[0].normal)
            .collect();
        normals.sort_by(|a, b| a.partial_cmp(b).unwrap());
        normals.dedup();
        assert_eq!(normals.len(), 6);
    }

    #[test]
    fn test_edit_changes_face_count() {
        let (center, accessor) = neighborhood_accessor(blocks::STONE, blocks::STONE);
        let mesh = build_chunk_mesh(center, &accessor, &BlockRegistry::with_defaults(), atlas());
        assert_eq!(mesh.quad_count(), 0);

        // Carving one interior voxel exposes its six cavity walls.
        let mut data = ChunkData::filled(blocks::STONE);
        data.set(UVec3::new(16, 16, 16), blocks::AIR);
        let mut map = HashMap::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let coord = center.offset(IVec3::new(dx, dy, dz));
                    map.insert(coord, accessor.chunk(coord).unwrap());
                }
            }
        }
        let leaked: &'static ChunkData = Box::leak(Box::new(data));
        map.insert(center, leaked);
        let carved = ChunkAccessor::new(map);

        let mesh = build_chunk_mesh(center, &carved, &BlockRegistry::with_defaults(), atlas());
        assert_eq!(mesh.quad_count(), 6);
    }

    #[test]
    fn test_uvs_stay_inside_tile() {
        let (center, accessor) = neighborhood_accessor(blocks::STONE, blocks::AIR);
        let atlas = atlas();
        let mesh = build_chunk_mesh(center, &accessor, &BlockRegistry::with_defaults(), atlas);

        let inv = 1.0 / atlas.tiles_per_row() as f32;
        // Stone maps to tile 3: top-row tile starting at u = 0.75.
        let u0 = 3.0 * inv;
        let v0 = 1.0 - inv;
        for vertex in &mesh.vertices {
            let [u, v] = vertex.uv;
            assert!(u > u0 && u < u0 + inv, "u {u} escapes tile");
            assert!(v > v0 && v < v0 + inv, "v {v} escapes tile");
        }
    }

    #[test]
    fn test_missing_neighbors_mesh_as_exposed() {
        // Snapshot holding only the chunk of interest: every cross-chunk
        // lookup falls back to air, so the full shell appears.
        let center = ChunkCoord::new(0, 0, 0);
        let data: &'static ChunkData = Box::leak(Box::new(ChunkData::filled(blocks::STONE)));
        let accessor = ChunkAccessor::new(HashMap::from([(center, data)]));

        let mesh = build_chunk_mesh(center, &accessor, &BlockRegistry::with_defaults(), atlas());
        assert_eq!(mesh.quad_count(), 6 * (CHUNK_SIZE * CHUNK_SIZE) as usize);
    }

    #[test]
    fn test_index_pattern() {
        let center = ChunkCoord::new(0, 0, 0);
        let mut data = ChunkData::filled(blocks::AIR);
        data.set(UVec3::new(0, 0, 0), blocks::DIRT);
        let leaked: &'static ChunkData = Box::leak(Box::new(data));
        let accessor = ChunkAccessor::new(HashMap::from([(center, leaked)]));

        let mesh = build_chunk_mesh(center, &accessor, &BlockRegistry::with_defaults(), atlas());
        assert_eq!(mesh.quad_count(), 6);
        assert_eq!(&mesh.indices[..6], &[0, 1, 2, 2, 1, 3]);
        assert_eq!(&mesh.indices[6..12], &[4, 5, 6, 6, 5, 7]);
    }
}
