mod lexer;
mod token;
mod tokens;

pub use lexer::*;
pub use token::*;
pub use tokens::*;
