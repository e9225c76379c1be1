pub mod image;
pub mod profile;
