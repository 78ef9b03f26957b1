use crate::{
    codegen::{ArithmeticOp, Segment},
    error::CompileError,
    lexer::Keyword,
};

use super::Parser;

impl Parser {
    /// statements = (let | if | while | do | return)*
    pub(super) fn compile_statements(&mut self) -> Result<(), CompileError> {
        self.open("statements");
        while let Some(keyword) = self.current_keyword() {
            match keyword {
                Keyword::Let => self.compile_let()?,
                Keyword::If => self.compile_if()?,
                Keyword::While => self.compile_while()?,
                Keyword::Do => self.compile_do()?,
                Keyword::Return => self.compile_return()?,
                _ => break,
            }
        }
        self.close("statements");
        Ok(())
    }

    pub(super) fn expect_block_end(&mut self) -> Result<(), CompileError> {
        if !self.is_symbol('}') {
            return Err(self.unexpected(&[
                "'let'", "'if'", "'while'", "'do'", "'return'", "'}'",
            ]));
        }
        self.advance()?;
        Ok(())
    }

    /// "{" statements "}"
    fn compile_block(&mut self) -> Result<(), CompileError> {
        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_block_end()
    }

    /// let = "let" varName ("[" expression "]")? "=" expression ";"
    fn compile_let(&mut self) -> Result<(), CompileError> {
        self.open("letStatement");
        self.expect_keyword(&[Keyword::Let])?;

        let position = self.tokens.position();
        let name = self.expect_ident()?;
        let (segment, index) = self.resolve_variable(&name, position)?;

        let indexed = self.is_symbol('[');
        if indexed {
            self.writer.push(segment, index);
            self.advance()?;
            self.compile_expression()?;
            self.expect_symbol(']')?;
            self.writer.arithmetic(ArithmeticOp::Add);
        }

        self.expect_symbol('=')?;
        self.compile_expression()?;
        self.expect_symbol(';')?;

        if indexed {
            // the right hand side may have moved `pointer 1`
            self.writer.pop(Segment::Temp, 0);
            self.writer.pop(Segment::Pointer, 1);
            self.writer.push(Segment::Temp, 0);
            self.writer.pop(Segment::That, 0);
        } else {
            self.writer.pop(segment, index);
        }

        self.close("letStatement");
        Ok(())
    }

    /// if = "if" "(" expression ")" "{" statements "}" ("else" "{" statements "}")?
    fn compile_if(&mut self) -> Result<(), CompileError> {
        self.open("ifStatement");
        self.expect_keyword(&[Keyword::If])?;

        let n = self.symbols.next_branch_label();
        let if_true = format!("IF_TRUE{n}");
        let if_false = format!("IF_FALSE{n}");
        let if_end = format!("IF_END{n}");

        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;

        self.writer.if_goto(&if_true);
        self.writer.goto(&if_false);
        self.writer.label(&if_true);
        self.compile_block()?;

        if self.is_keyword(Keyword::Else) {
            self.writer.goto(&if_end);
            self.writer.label(&if_false);
            self.advance()?;
            self.compile_block()?;
            self.writer.label(&if_end);
        } else {
            self.writer.label(&if_false);
        }

        self.close("ifStatement");
        Ok(())
    }

    /// while = "while" "(" expression ")" "{" statements "}"
    fn compile_while(&mut self) -> Result<(), CompileError> {
        self.open("whileStatement");
        self.expect_keyword(&[Keyword::While])?;

        let n = self.symbols.next_loop_label();
        let while_exp = format!("WHILE_EXP{n}");
        let while_end = format!("WHILE_END{n}");

        self.writer.label(&while_exp);
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;
        self.writer.arithmetic(ArithmeticOp::Not);
        self.writer.if_goto(&while_end);

        self.compile_block()?;
        self.writer.goto(&while_exp);
        self.writer.label(&while_end);

        self.close("whileStatement");
        Ok(())
    }

    /// do = "do" subroutineCall ";"
    fn compile_do(&mut self) -> Result<(), CompileError> {
        self.open("doStatement");
        self.expect_keyword(&[Keyword::Do])?;
        self.compile_subroutine_call()?;
        self.expect_symbol(';')?;
        self.writer.pop(Segment::Temp, 0);
        self.close("doStatement");
        Ok(())
    }

    /// return = "return" expression? ";"
    fn compile_return(&mut self) -> Result<(), CompileError> {
        self.open("returnStatement");
        self.expect_keyword(&[Keyword::Return])?;
        if self.is_symbol(';') {
            self.writer.push(Segment::Constant, 0);
        } else {
            self.compile_expression()?;
        }
        self.expect_symbol(';')?;
        self.writer.ret();
        self.close("returnStatement");
        Ok(())
    }
}
