pub mod bulk;
pub mod explicit;
