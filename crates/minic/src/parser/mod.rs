//! Recursive descent parser with inline semantic checking

#[allow(clippy::module_inception)]
mod parser;

pub use parser::Parser;
