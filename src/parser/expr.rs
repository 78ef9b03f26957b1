use crate::{
    analyzer::Resolution,
    codegen::{ArithmeticOp, Command, Segment},
    error::CompileError,
    lexer::{Keyword, Token, TokenKind},
};

use super::Parser;

const MAX_INTEGER: usize = 32767;

fn binary_op(symbol: char) -> Option<Command> {
    let op = match symbol {
        '+' => ArithmeticOp::Add,
        '-' => ArithmeticOp::Sub,
        '&' => ArithmeticOp::And,
        '|' => ArithmeticOp::Or,
        '<' => ArithmeticOp::Lt,
        '>' => ArithmeticOp::Gt,
        '=' => ArithmeticOp::Eq,
        '*' => return Some(Command::Call("Math.multiply".to_string(), 2)),
        '/' => return Some(Command::Call("Math.divide".to_string(), 2)),
        _ => return None,
    };
    Some(Command::Arithmetic(op))
}

fn unary_op(symbol: char) -> Option<ArithmeticOp> {
    match symbol {
        '-' => Some(ArithmeticOp::Neg),
        '~' => Some(ArithmeticOp::Not),
        _ => None,
    }
}

impl Parser {
    /// expression = term (op term)*
    ///
    /// No precedence: operators apply left to right in the order they appear.
    pub(super) fn compile_expression(&mut self) -> Result<(), CompileError> {
        self.open("expression");
        self.compile_term()?;
        while let Some(command) = self.current_symbol().and_then(binary_op) {
            self.advance()?;
            self.compile_term()?;
            self.writer.emit(command);
        }
        self.close("expression");
        Ok(())
    }

    /// term = integerConstant | stringConstant | keywordConstant
    ///      | varName | varName "[" expression "]" | subroutineCall
    ///      | "(" expression ")" | unaryOp term
    fn compile_term(&mut self) -> Result<(), CompileError> {
        self.open("term");
        let position = self.tokens.position();
        let Some(token) = self.tokens.current().cloned() else {
            return Err(CompileError::UnexpectedEof {
                expected: vec!["term".to_string()],
            });
        };

        match token.kind {
            TokenKind::Keyword => {
                match token.keyword() {
                    Some(Keyword::True) => {
                        self.writer.push(Segment::Constant, 0);
                        self.writer.arithmetic(ArithmeticOp::Not);
                    }
                    Some(Keyword::False | Keyword::Null) => {
                        self.writer.push(Segment::Constant, 0);
                    }
                    Some(Keyword::This) => self.writer.push(Segment::Pointer, 0),
                    _ => return Err(invalid_term(position, token)),
                }
                self.advance()?;
            }
            TokenKind::IntegerConstant => {
                let value = match token.text.parse::<usize>() {
                    Ok(value) if value <= MAX_INTEGER => value,
                    _ => {
                        return Err(CompileError::IntegerOverflow {
                            position,
                            value: token.text,
                        })
                    }
                };
                self.advance()?;
                self.writer.push(Segment::Constant, value);
            }
            TokenKind::StringConstant => {
                self.compile_string(position, &token.text)?;
                self.advance()?;
            }
            TokenKind::Symbol => {
                if let Some(op) = token.symbol().and_then(unary_op) {
                    self.advance()?;
                    self.compile_term()?;
                    self.writer.arithmetic(op);
                } else if token.is_symbol('(') {
                    self.advance()?;
                    self.compile_expression()?;
                    self.expect_symbol(')')?;
                } else {
                    return Err(invalid_term(position, token));
                }
            }
            TokenKind::Identifier => {
                if self.next_is_symbol('.') || self.next_is_symbol('(') {
                    self.compile_subroutine_call()?;
                } else if self.next_is_symbol('[') {
                    self.compile_array_read()?;
                } else {
                    self.advance()?;
                    let (segment, index) = self.resolve_variable(&token.text, position)?;
                    self.writer.push(segment, index);
                }
            }
        }

        self.close("term");
        Ok(())
    }

    /// Every character code must fit a constant push.
    fn compile_string(&mut self, position: usize, text: &str) -> Result<(), CompileError> {
        if let Some(found) = text.chars().find(|&c| u32::from(c) as usize > MAX_INTEGER) {
            return Err(CompileError::InvalidCharacter { position, found });
        }

        self.writer.push(Segment::Constant, text.chars().count());
        self.writer.call("String.new", 1);
        for c in text.chars() {
            self.writer.push(Segment::Constant, u32::from(c) as usize);
            self.writer.call("String.appendChar", 2);
        }
        Ok(())
    }

    /// varName "[" expression "]", read through `that 0`.
    fn compile_array_read(&mut self) -> Result<(), CompileError> {
        let position = self.tokens.position();
        let name = self.expect_ident()?;
        let (segment, index) = self.resolve_variable(&name, position)?;

        self.writer.push(segment, index);
        self.expect_symbol('[')?;
        self.compile_expression()?;
        self.expect_symbol(']')?;
        self.writer.arithmetic(ArithmeticOp::Add);
        self.writer.pop(Segment::Pointer, 1);
        self.writer.push(Segment::That, 0);
        Ok(())
    }

    /// subroutineCall = subroutineName "(" expressionList ")"
    ///                | (className | varName) "." subroutineName "(" expressionList ")"
    pub(super) fn compile_subroutine_call(&mut self) -> Result<(), CompileError> {
        let name = self.expect_ident()?;

        let (target, receiver) = if self.is_symbol('.') {
            self.advance()?;
            let subroutine = self.expect_ident()?;
            match self.symbols.resolve(&name) {
                Resolution::Variable { segment, index, ty } => {
                    self.writer.push(segment, index);
                    (format!("{ty}.{subroutine}"), 1)
                }
                Resolution::Unresolved => (format!("{name}.{subroutine}"), 0),
            }
        } else {
            self.writer.push(Segment::Pointer, 0);
            (format!("{}.{name}", self.symbols.class_name()), 1)
        };

        self.expect_symbol('(')?;
        let args = self.compile_expression_list()?;
        self.expect_symbol(')')?;
        self.writer.call(&target, args + receiver);
        Ok(())
    }

    /// expressionList = (expression ("," expression)*)?
    fn compile_expression_list(&mut self) -> Result<usize, CompileError> {
        self.open("expressionList");
        let mut count = 0;
        if !self.is_symbol(')') {
            loop {
                self.compile_expression()?;
                count += 1;
                if !self.is_symbol(',') {
                    break;
                }
                self.advance()?;
            }
        }
        self.close("expressionList");
        Ok(count)
    }
}

fn invalid_term(position: usize, token: Token) -> CompileError {
    CompileError::InvalidTerm {
        position,
        found: token.text,
        kind: token.kind,
    }
}
