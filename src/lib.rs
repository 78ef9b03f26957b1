//! Single pass compiler from Jack classes to stack VM code.
//!
//! The lexer turns a whole source file into tokens up front. The parser then
//! walks them by recursive descent, filling the two tier symbol table as
//! declarations appear and emitting VM commands as each production is
//! recognized. There is no syntax tree in between.

pub mod analyzer;
pub mod codegen;
pub mod driver;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod trace;

use codegen::Command;
use lexer::Lexer;
use parser::Parser;

pub use error::{CompileError, DriverError};
pub use parser::{TraceOptions, Translation};

/// Translates one class into its instruction stream.
pub fn compile(source: &str) -> Result<Vec<Command>, CompileError> {
    Ok(translate(source, TraceOptions::default())?.commands)
}

/// Translates one class, optionally recording the token and parse tree traces.
pub fn translate(source: &str, options: TraceOptions) -> Result<Translation, CompileError> {
    let tokens = Lexer::tokenize(source);
    let tokens_xml = options.tokens.then(|| trace::tokens_xml(&tokens));

    let mut parser = Parser::new(tokens);
    if options.parse_tree {
        parser = parser.with_parse_tree();
    }
    let mut translation = parser.translate()?;
    translation.tokens_xml = tokens_xml;

    Ok(translation)
}
