use std::io;
use std::path::PathBuf;

use crate::lexer::TokenKind;

/// Errors that abort the translation of one class.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("token {position}: unexpected {kind} '{found}', expected {}", .expected.join(" or "))]
    UnexpectedToken {
        position: usize,
        found: String,
        kind: TokenKind,
        expected: Vec<String>,
    },
    #[error("token {position}: expected identifier, found {kind} '{found}'")]
    ExpectedIdentifier {
        position: usize,
        found: String,
        kind: TokenKind,
    },
    #[error("unexpected end of input, expected {}", .expected.join(" or "))]
    UnexpectedEof { expected: Vec<String> },
    #[error("token {position}: undeclared identifier '{name}'")]
    UndeclaredIdentifier { position: usize, name: String },
    #[error("token {position}: {kind} '{found}' cannot start a term")]
    InvalidTerm {
        position: usize,
        found: String,
        kind: TokenKind,
    },
    #[error("token {position}: integer constant {value} is larger than 32767")]
    IntegerOverflow { position: usize, value: String },
    #[error("token {position}: character {found:?} in string constant is outside the character set")]
    InvalidCharacter { position: usize, found: char },
}

/// Errors of the file level driver.
#[derive(thiserror::Error, Debug)]
pub enum DriverError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: {source}", .path.display())]
    Compile {
        path: PathBuf,
        #[source]
        source: CompileError,
    },
    #[error("{}: not a .jack file or a directory", .0.display())]
    UnsupportedPath(PathBuf),
    #[error("{}: no .jack files found", .0.display())]
    NoSources(PathBuf),
}
