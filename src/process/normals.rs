use cgmath::{InnerSpace, Vector3, Zero};

use crate::primitives::vertex::{PackedVertex, UP};

/// Replaces every vertex normal with the area-weighted average of the
/// face normals of the triangles that use it.
///
/// Vertices whose accumulated normal is zero (degenerate or unused) get
/// the up vector instead.
pub fn generate_normals(vertices: &mut [PackedVertex], indices: &[u16]) {
    let mut sums = vec![Vector3::<f32>::zero(); vertices.len()];

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let p0 = Vector3::from(vertices[i0].xyz());
        let p1 = Vector3::from(vertices[i1].xyz());
        let p2 = Vector3::from(vertices[i2].xyz());

        // |cross| is twice the triangle area
        let face = (p1 - p0).cross(p2 - p0);
        sums[i0] += face;
        sums[i1] += face;
        sums[i2] += face;
    }

    for (vertex, sum) in vertices.iter_mut().zip(sums) {
        let length = sum.magnitude();
        vertex.normal = if length > 0.0 && length.is_finite() {
            (sum / length).into()
        } else {
            UP
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: f32, y: f32, z: f32) -> PackedVertex {
        PackedVertex::new([x, y, z, 1.0], [9.0, 9.0, 9.0], [0.0, 0.0])
    }

    #[test]
    fn single_triangle_gets_face_normal() {
        let mut vertices = vec![
            vertex(0.0, 0.0, 0.0),
            vertex(1.0, 0.0, 0.0),
            vertex(0.0, 1.0, 0.0),
        ];
        generate_normals(&mut vertices, &[0, 1, 2]);
        for v in &vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn larger_face_dominates_shared_vertex() {
        // Shared vertex 0: a big triangle facing +z and a small one facing +x.
        let mut vertices = vec![
            vertex(0.0, 0.0, 0.0),
            vertex(10.0, 0.0, 0.0),
            vertex(0.0, 10.0, 0.0),
            vertex(0.0, 1.0, 0.0),
            vertex(0.0, 0.0, 1.0),
        ];
        generate_normals(&mut vertices, &[0, 1, 2, 0, 3, 4]);
        let n = vertices[0].normal;
        assert!(n[2] > n[0] * 10.0);
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        assert!((len - 1.0).abs() < 1e-4);
    }

    #[test]
    fn tiny_triangle_keeps_its_face_normal() {
        let mut vertices = vec![
            vertex(0.0, 0.0, 0.0),
            vertex(1e-4, 0.0, 0.0),
            vertex(0.0, 1e-4, 0.0),
        ];
        generate_normals(&mut vertices, &[0, 1, 2]);
        for v in &vertices {
            assert!((v.normal[2] - 1.0).abs() < 1e-5, "{:?}", v.normal);
            assert!(v.normal[0].abs() < 1e-5 && v.normal[1].abs() < 1e-5);
        }
    }

    #[test]
    fn degenerate_and_unused_vertices_fall_back_to_up() {
        let mut vertices = vec![
            vertex(0.0, 0.0, 0.0),
            vertex(1.0, 0.0, 0.0),
            vertex(2.0, 0.0, 0.0),
            vertex(5.0, 5.0, 5.0),
        ];
        generate_normals(&mut vertices, &[0, 1, 2]);
        for v in &vertices {
            assert_eq!(v.normal, UP);
        }
    }
}
