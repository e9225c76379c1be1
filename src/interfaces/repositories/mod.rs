pub mod blob;
pub mod clients;
pub mod profile;
