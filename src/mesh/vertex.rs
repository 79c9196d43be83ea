//! Mesh vertex and buffer types

use bytemuck::{Pod, Zeroable};

/// Single mesh vertex, laid out for direct GPU upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub uv: [f32; 2],
}

/// Transient vertex/index buffers for one chunk mesh.
///
/// Owned by a single meshing pass and handed whole to the render consumer;
/// nothing retains it afterwards.
#[derive(Clone, Debug, Default)]
pub struct MeshBuffer {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshBuffer {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Emitted quad count; every face contributes 4 vertices.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }
}
