use crate::primitives::vertex::PackedVertex;

pub const DEFAULT_GROUP_NAME: &str = "unnamed";

/// A finalized partition of the model: its own packed vertices and a
/// 16-bit triangle-list index buffer into them.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    name: String,
    vertices: Vec<PackedVertex>,
    indices: Vec<u16>,
}

impl Group {
    pub fn new(name: String, vertices: Vec<PackedVertex>, indices: Vec<u16>) -> Self {
        Group {
            name,
            vertices,
            indices,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[PackedVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
