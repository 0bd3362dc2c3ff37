pub mod date_key;
pub mod error;
pub mod money;
