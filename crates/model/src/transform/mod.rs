pub mod coercion;
pub mod convert;
pub mod date_parser;
pub mod infer;
