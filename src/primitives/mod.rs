pub mod camera;
pub mod face_vertex;
pub mod group;
pub mod material;
pub mod mesh;
pub mod sound;
pub mod texture;
pub mod vertex;
