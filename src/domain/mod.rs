pub mod entities;
pub mod filter;
pub mod store;
pub mod use_cases;
