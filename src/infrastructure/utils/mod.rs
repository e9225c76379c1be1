pub mod file_name;
pub mod valid_id;
