pub mod error;
pub mod normals_store;
pub mod point_store;
