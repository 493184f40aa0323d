pub mod adaptors;
pub mod resource;
