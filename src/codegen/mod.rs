mod vm;
mod writer;

pub use vm::*;
pub use writer::*;
