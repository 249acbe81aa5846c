pub mod ast;
pub mod builder;
pub mod dialect;
pub mod generator;
pub mod macros;
pub mod renderer;
