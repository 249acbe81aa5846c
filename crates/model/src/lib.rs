pub mod core;
pub mod errors;
pub mod records;
pub mod transform;
