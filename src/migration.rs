pub mod engine;
pub mod error;
pub mod id_map;
