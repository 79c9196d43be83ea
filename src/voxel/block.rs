//! Block identities and the external block registry

use serde::{Deserialize, Serialize};

/// Small unsigned block identifier; 0 is always air.
pub type BlockId = u16;

/// Ids of the built-in block set used by terrain generation.
pub mod blocks {
    use super::BlockId;

    pub const AIR: BlockId = 0;
    pub const BEDROCK: BlockId = 1;
    pub const STONE: BlockId = 2;
    pub const DIRT: BlockId = 3;
    pub const GRASS: BlockId = 4;
    pub const SAND: BlockId = 5;
}

/// Static description of one block type.
///
/// `face_tiles` holds the flat atlas tile per face, in the mesher's
/// direction order: +X, -X, +Y, -Y, +Z, -Z.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockType {
    pub name: String,
    pub solid: bool,
    pub face_tiles: [u16; 6],
}

impl BlockType {
    /// Block type with the same atlas tile on every face.
    pub fn uniform(name: &str, solid: bool, tile: u16) -> Self {
        Self {
            name: name.into(),
            solid,
            face_tiles: [tile; 6],
        }
    }
}

/// Read-only registry mapping block ids to their descriptions.
///
/// Ids index the backing table directly; looking up an id the registry was
/// never built with is a precondition violation and panics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockRegistry {
    blocks: Vec<BlockType>,
}

impl BlockRegistry {
    /// Registry over an explicit block table. Id 0 must be non-solid air.
    pub fn new(blocks: Vec<BlockType>) -> Self {
        assert!(
            !blocks.is_empty() && !blocks[0].solid,
            "block id 0 must be non-solid air"
        );
        Self { blocks }
    }

    /// Registry with the built-in terrain block set.
    ///
    /// Atlas tiles assume a 4x4 sheet: grass top 0, grass side 1, dirt 2,
    /// stone 3, bedrock 4, sand 5.
    pub fn with_defaults() -> Self {
        Self::new(vec![
            BlockType::uniform("air", false, 0),
            BlockType::uniform("bedrock", true, 4),
            BlockType::uniform("stone", true, 3),
            BlockType::uniform("dirt", true, 2),
            BlockType {
                name: "grass".into(),
                solid: true,
                face_tiles: [1, 1, 0, 2, 1, 1],
            },
            BlockType::uniform("sand", true, 5),
        ])
    }

    pub fn get(&self, id: BlockId) -> &BlockType {
        &self.blocks[id as usize]
    }

    pub fn is_solid(&self, id: BlockId) -> bool {
        self.blocks[id as usize].solid
    }

    /// Atlas tile for one face of a block.
    pub fn face_tile(&self, id: BlockId, face: usize) -> u16 {
        self.blocks[id as usize].face_tiles[face]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
