use cgmath::{Deg, Matrix, Matrix3, Matrix4, Rad, SquareMatrix, Vector3};

use crate::OPENGL_TO_WGPU_MATRIX;

pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 100.0;

pub fn rotation(axis: Vector3<f32>, angle: f32) -> Matrix4<f32> {
    Matrix4::from_axis_angle(axis, Rad(angle))
}

/// Right-handed perspective projection mapped into wgpu's 0..1 depth range.
pub fn perspective_projection(aspect: f32, fovy: Rad<f32>, near: f32, far: f32) -> Matrix4<f32> {
    OPENGL_TO_WGPU_MATRIX * cgmath::perspective(fovy, aspect, near, far)
}

/// Wider field of view in portrait so the model stays in frame.
pub fn vertical_fov(aspect: f32) -> Rad<f32> {
    if aspect > 1.0 {
        Deg(45.0).into()
    } else {
        Deg(90.0).into()
    }
}

pub fn upper_left_3x3(m: &Matrix4<f32>) -> Matrix3<f32> {
    Matrix3::from_cols(m.x.truncate(), m.y.truncate(), m.z.truncate())
}

/// Inverse-transpose of the upper-left 3x3, identity when it is singular.
pub fn normal_matrix(model_view: &Matrix4<f32>) -> Matrix3<f32> {
    upper_left_3x3(model_view)
        .transpose()
        .invert()
        .unwrap_or_else(Matrix3::identity)
}

/// Rotates the model by the drag angles, then pushes it `distance` units
/// away from the eye.
pub fn model_view(angle: [f32; 2], distance: f32) -> Matrix4<f32> {
    let rot_x = rotation(Vector3::unit_x(), -angle[1]);
    let rot_y = rotation(Vector3::unit_y(), -angle[0]);
    Matrix4::from_translation(Vector3::new(0.0, 0.0, -distance)) * rot_x * rot_y
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector4, Zero};

    fn close(a: Matrix3<f32>, b: Matrix3<f32>) -> bool {
        let a: [[f32; 3]; 3] = a.into();
        let b: [[f32; 3]; 3] = b.into();
        a.iter()
            .flatten()
            .zip(b.iter().flatten())
            .all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn rotation_about_y_turns_x_into_minus_z() {
        let r = rotation(Vector3::unit_y(), std::f32::consts::FRAC_PI_2);
        let v = r * Vector4::new(1.0, 0.0, 0.0, 0.0);
        assert!(v.x.abs() < 1e-6);
        assert!((v.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn normal_matrix_of_rotation_is_the_rotation() {
        let r = rotation(Vector3::new(0.6, 0.8, 0.0), 0.7);
        assert!(close(normal_matrix(&r), upper_left_3x3(&r)));
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let m = Matrix4::from_nonuniform_scale(2.0, 4.0, 1.0);
        let expected = Matrix3::from_diagonal(Vector3::new(0.5, 0.25, 1.0));
        assert!(close(normal_matrix(&m), expected));
    }

    #[test]
    fn singular_matrix_gives_identity_normal_matrix() {
        assert!(close(
            normal_matrix(&Matrix4::zero()),
            Matrix3::identity()
        ));
    }

    #[test]
    fn model_view_translates_out_of_the_screen() {
        let mv = model_view([0.0, 0.0], 1.5);
        assert_eq!(mv.w.z, -1.5);
        assert!(close(upper_left_3x3(&mv), Matrix3::identity()));
    }

    #[test]
    fn projection_maps_near_plane_to_zero_depth() {
        let p = perspective_projection(1.5, vertical_fov(1.5), NEAR, FAR);
        let clip = p * Vector4::new(0.0, 0.0, -NEAR, 1.0);
        assert!((clip.z / clip.w).abs() < 1e-4);
        let clip = p * Vector4::new(0.0, 0.0, -FAR, 1.0);
        assert!((clip.z / clip.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn fov_widens_in_portrait() {
        assert_eq!(vertical_fov(2.0), Rad::from(Deg(45.0f32)));
        assert_eq!(vertical_fov(0.5), Rad::from(Deg(90.0f32)));
    }
}
