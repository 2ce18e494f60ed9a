pub mod normals;
pub mod obj;
pub mod pipeline;
pub mod transform;
