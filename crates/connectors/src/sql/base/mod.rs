pub mod adapter;
pub mod encoder;
pub mod error;
pub mod transaction;
