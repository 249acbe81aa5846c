pub mod executor;
pub mod prepare;
