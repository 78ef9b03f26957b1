mod symbol_table;

pub use symbol_table::*;
