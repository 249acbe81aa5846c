pub mod discovery;
pub mod error;
pub mod reader;
