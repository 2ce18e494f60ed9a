use wgpu::util::DeviceExt;

use crate::primitives::group::Group;

/// A group's buffers, resident on the GPU.
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl Mesh {
    pub const INDEX_FORMAT: wgpu::IndexFormat = wgpu::IndexFormat::Uint16;

    pub fn from_group(device: &wgpu::Device, group: &Group) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", group.name())),
            contents: group.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", group.name())),
            contents: group.index_bytes(),
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        });

        log::info!(
            "uploaded group '{}': {} vertices, {} triangles",
            group.name(),
            group.vertices().len(),
            group.triangle_count()
        );

        Mesh {
            name: group.name().to_string(),
            vertex_buffer,
            index_buffer,
            index_count: group.indices().len() as u32,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}
