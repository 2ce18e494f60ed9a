pub const UP: [f32; 3] = [0.0, 1.0, 0.0];

/// GPU-facing vertex record. 44 bytes: position at 0, normal at 16,
/// texcoord at 28, then two floats of padding.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedVertex {
    pub position: [f32; 4],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
    _padding: [f32; 2],
}

impl PackedVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<PackedVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![
            0 => Float32x4,
            1 => Float32x3,
            2 => Float32x2
        ],
    };

    pub fn new(position: [f32; 4], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coords,
            _padding: [0.0; 2],
        }
    }

    pub fn xyz(&self) -> [f32; 3] {
        [self.position[0], self.position[1], self.position[2]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_44_bytes() {
        assert_eq!(std::mem::size_of::<PackedVertex>(), 44);
        assert_eq!(PackedVertex::LAYOUT.array_stride, 44);
    }

    #[test]
    fn layout_offsets_match_field_offsets() {
        let offsets: Vec<u64> = PackedVertex::LAYOUT
            .attributes
            .iter()
            .map(|a| a.offset)
            .collect();
        assert_eq!(offsets, vec![0, 16, 28]);
        assert_eq!(std::mem::offset_of!(PackedVertex, normal), 16);
        assert_eq!(std::mem::offset_of!(PackedVertex, tex_coords), 28);
    }

    #[test]
    fn bytes_are_tightly_packed() {
        let v = PackedVertex::new([1.0, 2.0, 3.0, 1.0], UP, [0.5, 0.25]);
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&v));
        assert_eq!(
            floats,
            &[1.0, 2.0, 3.0, 1.0, 0.0, 1.0, 0.0, 0.5, 0.25, 0.0, 0.0]
        );
    }
}
