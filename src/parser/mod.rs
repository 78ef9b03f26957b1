mod expr;
mod parser;
mod stmt;

pub use parser::*;
