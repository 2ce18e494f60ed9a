/// One corner of a face as written in the file: 0-based indices into the
/// model-wide position, texcoord and normal lists.
///
/// Equality and ordering compare position, then texcoord, then normal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FaceVertex {
    pub position: u16,
    pub tex_coord: Option<u16>,
    pub normal: Option<u16>,
}

impl FaceVertex {
    pub fn new(position: u16, tex_coord: Option<u16>, normal: Option<u16>) -> Self {
        Self {
            position,
            tex_coord,
            normal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_only_when_all_indices_match() {
        let a = FaceVertex::new(1, Some(2), Some(3));
        assert_eq!(a, FaceVertex::new(1, Some(2), Some(3)));
        assert_ne!(a, FaceVertex::new(1, Some(2), None));
        assert_ne!(a, FaceVertex::new(1, None, Some(3)));
    }

    #[test]
    fn orders_by_position_then_texcoord_then_normal() {
        let mut corners = vec![
            FaceVertex::new(2, Some(0), Some(0)),
            FaceVertex::new(1, Some(5), Some(1)),
            FaceVertex::new(1, Some(5), Some(0)),
            FaceVertex::new(1, Some(4), Some(9)),
        ];
        corners.sort();
        assert_eq!(
            corners,
            vec![
                FaceVertex::new(1, Some(4), Some(9)),
                FaceVertex::new(1, Some(5), Some(0)),
                FaceVertex::new(1, Some(5), Some(1)),
                FaceVertex::new(2, Some(0), Some(0)),
            ]
        );
    }
}
