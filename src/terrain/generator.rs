//! Noise-based procedural terrain generation

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::voxel::block::{BlockId, blocks};
use crate::voxel::chunk::{CHUNK_SIZE, ChunkCoord, ChunkData};
use crate::voxel::run::VoxelRun;

/// Parameters controlling terrain generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TerrainParams {
    pub seed: u32,
    pub scale: f32,        // Horizontal scale (larger = smoother)
    pub height_scale: f32, // Vertical scale (max height in blocks)
    pub octaves: u32,      // FBM octaves (detail levels)
    pub persistence: f32,  // FBM persistence (0.5 typical)
    pub lacunarity: f32,   // FBM lacunarity (2.0 typical)
    pub sea_level: i32,    // Surface at or below this becomes sand
    pub dirt_depth: i32,   // Dirt band thickness under the surface
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 12345,
            scale: 100.0,
            height_scale: 64.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            sea_level: 20,
            dirt_depth: 3,
        }
    }
}

impl TerrainParams {
    /// Reject parameter combinations that produce degenerate noise.
    pub fn validate(&self) -> Result<()> {
        if self.octaves == 0 {
            return Err(Error::Config("octaves must be at least 1".into()));
        }
        if self.scale <= 0.0 {
            return Err(Error::Config("scale must be positive".into()));
        }
        if self.height_scale < 1.0 {
            return Err(Error::Config("height_scale must be at least 1".into()));
        }
        if self.dirt_depth < 0 {
            return Err(Error::Config("dirt_depth must not be negative".into()));
        }
        Ok(())
    }
}

/// Procedural terrain generator using fractal Brownian motion (FBM).
///
/// Generation is pure and deterministic given seed + coordinate; a failed
/// batch can simply be resubmitted.
pub struct TerrainGenerator {
    params: TerrainParams,
    noise: Fbm<Perlin>,
}

impl TerrainGenerator {
    /// Create a new terrain generator with the given parameters
    pub fn new(params: TerrainParams) -> Result<Self> {
        params.validate()?;
        let noise = Fbm::<Perlin>::new(params.seed)
            .set_octaves(params.octaves as usize)
            .set_persistence(params.persistence as f64)
            .set_lacunarity(params.lacunarity as f64);

        Ok(Self { params, noise })
    }

    /// Get terrain parameters
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Terrain surface height of the world (x, z) column, in blocks.
    pub fn height_at(&self, x: i32, z: i32) -> i32 {
        let nx = x as f64 / self.params.scale as f64;
        let nz = z as f64 / self.params.scale as f64;

        // Noise value in roughly [-1, 1], mapped to [0, height_scale].
        let noise_value = self.noise.get([nx, nz]);
        let normalized = ((noise_value + 1.0) / 2.0).clamp(0.0, 1.0);
        (normalized * self.params.height_scale as f64).floor() as i32
    }

    /// Height-banded block classification for a column of the given surface
    /// height: bedrock floor, stone body, dirt band, grass or sand at the
    /// surface, air above.
    pub fn classify(&self, y: i32, height: i32) -> BlockId {
        if y == 0 {
            return blocks::BEDROCK;
        }
        if y > height {
            return blocks::AIR;
        }
        if y == height {
            return if height <= self.params.sea_level {
                blocks::SAND
            } else {
                blocks::GRASS
            };
        }
        if y >= height - self.params.dirt_depth {
            blocks::DIRT
        } else {
            blocks::STONE
        }
    }

    /// Generate one chunk's blocks as coalesced runs.
    pub fn generate_chunk(&self, coord: ChunkCoord) -> ChunkData {
        let origin = coord.block_origin();
        let size = CHUNK_SIZE as i32;

        // Column heights, indexed x * CHUNK_SIZE + z.
        let mut heights = vec![0i32; (CHUNK_SIZE * CHUNK_SIZE) as usize];
        for x in 0..size {
            for z in 0..size {
                heights[(x * size + z) as usize] = self.height_at(origin.x + x, origin.z + z);
            }
        }

        let mut run = VoxelRun::with_capacity(64);
        let mut current = blocks::AIR;
        let mut count = 0u32;

        // Iteration order must match the flatten order for push_run.
        for x in 0..size {
            for y in 0..size {
                let world_y = origin.y + y;
                for z in 0..size {
                    let height = heights[(x * size + z) as usize];
                    let block = self.classify(world_y, height);
                    if block == current {
                        count += 1;
                    } else {
                        run.push_run(current, count);
                        current = block;
                        count = 1;
                    }
                }
            }
        }
        run.push_run(current, count);

        ChunkData::from_run(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::chunk::{CHUNK_VOLUME, local_pos};
    use glam::{IVec3, UVec3};

    fn generator() -> TerrainGenerator {
        TerrainGenerator::new(TerrainParams::default()).unwrap()
    }

    #[test]
    fn test_params_validation() {
        assert!(TerrainParams::default().validate().is_ok());

        let bad = TerrainParams {
            octaves: 0,
            ..Default::default()
        };
        assert!(TerrainGenerator::new(bad).is_err());

        let bad = TerrainParams {
            scale: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_height_within_bounds() {
        let generator = generator();
        for (x, z) in [(0, 0), (100, -250), (-1000, 4096), (31, 31)] {
            let h = generator.height_at(x, z);
            assert!(h >= 0, "height {h} below zero at ({x}, {z})");
            assert!(
                h <= generator.params().height_scale as i32,
                "height {h} above scale at ({x}, {z})"
            );
        }
    }

    #[test]
    fn test_classify_bands() {
        let generator = generator();
        let height = 40;

        assert_eq!(generator.classify(0, height), blocks::BEDROCK);
        assert_eq!(generator.classify(45, height), blocks::AIR);
        assert_eq!(generator.classify(40, height), blocks::GRASS);
        assert_eq!(generator.classify(38, height), blocks::DIRT);
        assert_eq!(generator.classify(20, height), blocks::STONE);

        // Low-lying surface reads as beach.
        let shore = generator.params().sea_level;
        assert_eq!(generator.classify(shore, shore), blocks::SAND);
    }

    #[test]
    fn test_generate_matches_classify() {
        let generator = generator();
        let coord = ChunkCoord::new(0, 0, 0);
        let data = generator.generate_chunk(coord);

        for (x, z) in [(0, 0), (13, 7), (31, 31)] {
            let height = generator.height_at(x, z);
            for y in [0, 1, 15, 31] {
                let expected = generator.classify(y, height);
                assert_eq!(
                    data.get(UVec3::new(x as u32, y as u32, z as u32)),
                    expected,
                    "block mismatch at ({x}, {y}, {z})"
                );
            }
        }
    }

    #[test]
    fn test_generate_deterministic() {
        let a = generator().generate_chunk(ChunkCoord::new(2, 0, -3));
        let b = generator().generate_chunk(ChunkCoord::new(2, 0, -3));

        assert_eq!(
            a.run().runs().collect::<Vec<_>>(),
            b.run().runs().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_sky_chunk_is_one_run() {
        let generator = generator();
        let coord = ChunkCoord::new(0, 10, 0); // Far above height_scale
        let data = generator.generate_chunk(coord);

        assert_eq!(data.run().compressed_len(), 1);
        assert_eq!(data.run().len(), CHUNK_VOLUME);
        assert_eq!(data.get(local_pos(IVec3::new(5, 5, 5))), blocks::AIR);
    }
}
