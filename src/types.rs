pub mod doc;
pub mod normals;
pub mod point;
