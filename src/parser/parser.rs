use crate::{
    analyzer::{Kind, Resolution, SymbolTable},
    codegen::{Command, Segment, VmWriter},
    error::CompileError,
    lexer::{Keyword, Token, TokenKind, Tokens},
    trace::XmlWriter,
};

/// Which observational outputs to produce next to the VM code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraceOptions {
    pub tokens: bool,
    pub parse_tree: bool,
}

/// Output of translating one class.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Translation {
    pub commands: Vec<Command>,
    pub tokens_xml: Option<String>,
    pub parse_tree_xml: Option<String>,
}

/// Recursive descent translator: one method per grammar production, each
/// emitting VM commands as it recognizes its tokens.
#[derive(Debug)]
pub struct Parser {
    pub(super) tokens: Tokens,
    pub(super) symbols: SymbolTable,
    pub(super) writer: VmWriter,
    tree: Option<XmlWriter>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: Tokens::new(tokens),
            symbols: SymbolTable::new(),
            writer: VmWriter::new(),
            tree: None,
        }
    }

    /// Also record the parse tree while translating.
    pub fn with_parse_tree(mut self) -> Self {
        self.tree = Some(XmlWriter::new());
        self
    }

    pub fn translate(mut self) -> Result<Translation, CompileError> {
        self.tokens.reset();
        self.compile_class()?;
        if !self.tokens.is_eof() {
            return Err(self.unexpected(&["end of input"]));
        }

        Ok(Translation {
            commands: self.writer.into_commands(),
            tokens_xml: None,
            parse_tree_xml: self.tree.map(XmlWriter::finish),
        })
    }

    pub(super) fn open(&mut self, tag: &str) {
        if let Some(tree) = &mut self.tree {
            tree.open_tag(tag);
        }
    }

    pub(super) fn close(&mut self, tag: &str) {
        if let Some(tree) = &mut self.tree {
            tree.close_tag(tag);
        }
    }

    pub(super) fn current_keyword(&self) -> Option<Keyword> {
        self.tokens.current().and_then(Token::keyword)
    }

    pub(super) fn current_symbol(&self) -> Option<char> {
        self.tokens.current().and_then(Token::symbol)
    }

    pub(super) fn is_keyword(&self, keyword: Keyword) -> bool {
        self.current_keyword() == Some(keyword)
    }

    pub(super) fn is_symbol(&self, symbol: char) -> bool {
        self.current_symbol() == Some(symbol)
    }

    pub(super) fn next_is_symbol(&self, symbol: char) -> bool {
        self.tokens.peek().is_some_and(|t| t.is_symbol(symbol))
    }

    /// Consumes the current token, whatever it is.
    pub(super) fn advance(&mut self) -> Result<Token, CompileError> {
        let Some(token) = self.tokens.current().cloned() else {
            return Err(CompileError::UnexpectedEof {
                expected: vec!["a token".to_string()],
            });
        };
        if let Some(tree) = &mut self.tree {
            tree.token(&token);
        }
        self.tokens.advance();
        Ok(token)
    }

    pub(super) fn unexpected(&self, expected: &[&str]) -> CompileError {
        let expected = expected.iter().map(|s| s.to_string()).collect();
        match self.tokens.current() {
            Some(token) => CompileError::UnexpectedToken {
                position: self.tokens.position(),
                found: token.text.clone(),
                kind: token.kind,
                expected,
            },
            None => CompileError::UnexpectedEof { expected },
        }
    }

    pub(super) fn expect_symbol(&mut self, symbol: char) -> Result<(), CompileError> {
        if !self.is_symbol(symbol) {
            let expected = format!("'{symbol}'");
            return Err(self.unexpected(&[expected.as_str()]));
        }
        self.advance()?;
        Ok(())
    }

    pub(super) fn expect_keyword(&mut self, expected: &[Keyword]) -> Result<Keyword, CompileError> {
        match self.current_keyword() {
            Some(keyword) if expected.contains(&keyword) => {
                self.advance()?;
                Ok(keyword)
            }
            _ => {
                let expected: Vec<_> = expected.iter().map(|k| format!("'{k}'")).collect();
                let expected: Vec<_> = expected.iter().map(String::as_str).collect();
                Err(self.unexpected(&expected))
            }
        }
    }

    pub(super) fn expect_ident(&mut self) -> Result<String, CompileError> {
        let Some(token) = self.tokens.current() else {
            return Err(CompileError::UnexpectedEof {
                expected: vec!["identifier".to_string()],
            });
        };
        if token.kind != TokenKind::Identifier {
            return Err(CompileError::ExpectedIdentifier {
                position: self.tokens.position(),
                found: token.text.clone(),
                kind: token.kind,
            });
        }
        Ok(self.advance()?.text)
    }

    /// type = "int" | "char" | "boolean" | className, plus "void" for
    /// subroutine return types.
    fn expect_type(&mut self, allow_void: bool) -> Result<String, CompileError> {
        let is_type = match self.tokens.current() {
            Some(token) => match token.keyword() {
                Some(Keyword::Int | Keyword::Char | Keyword::Boolean) => true,
                Some(Keyword::Void) => allow_void,
                _ => token.kind == TokenKind::Identifier,
            },
            None => false,
        };
        if !is_type {
            let mut expected = vec!["'int'", "'char'", "'boolean'", "class name"];
            if allow_void {
                expected.push("'void'");
            }
            return Err(self.unexpected(&expected));
        }
        Ok(self.advance()?.text)
    }

    pub(super) fn resolve_variable(
        &self,
        name: &str,
        position: usize,
    ) -> Result<(Segment, usize), CompileError> {
        match self.symbols.resolve(name) {
            Resolution::Variable { segment, index, .. } => Ok((segment, index)),
            Resolution::Unresolved => Err(CompileError::UndeclaredIdentifier {
                position,
                name: name.to_string(),
            }),
        }
    }

    /// class = "class" className "{" classVarDec* subroutineDec* "}"
    fn compile_class(&mut self) -> Result<(), CompileError> {
        self.open("class");
        self.expect_keyword(&[Keyword::Class])?;
        let name = self.expect_ident()?;
        self.symbols.set_class_name(&name);
        self.expect_symbol('{')?;

        while matches!(
            self.current_keyword(),
            Some(Keyword::Static | Keyword::Field)
        ) {
            self.compile_class_var_dec()?;
        }
        while matches!(
            self.current_keyword(),
            Some(Keyword::Constructor | Keyword::Function | Keyword::Method)
        ) {
            self.compile_subroutine_dec()?;
        }

        if !self.is_symbol('}') {
            return Err(self.unexpected(&[
                "'static'",
                "'field'",
                "'constructor'",
                "'function'",
                "'method'",
                "'}'",
            ]));
        }
        self.advance()?;
        self.close("class");
        self.symbols.end_class();
        Ok(())
    }

    /// classVarDec = ("static" | "field") type varName ("," varName)* ";"
    fn compile_class_var_dec(&mut self) -> Result<(), CompileError> {
        self.open("classVarDec");
        let kind = match self.expect_keyword(&[Keyword::Static, Keyword::Field])? {
            Keyword::Static => Kind::Static,
            _ => Kind::Field,
        };
        let ty = self.expect_type(false)?;
        loop {
            let name = self.expect_ident()?;
            self.symbols.register_class_level(&name, &ty, kind);
            if !self.is_symbol(',') {
                break;
            }
            self.advance()?;
        }
        self.expect_symbol(';')?;
        self.close("classVarDec");
        Ok(())
    }

    /// subroutineDec = ("constructor" | "function" | "method") ("void" | type)
    ///                 subroutineName "(" parameterList ")" subroutineBody
    fn compile_subroutine_dec(&mut self) -> Result<(), CompileError> {
        self.open("subroutineDec");
        self.symbols.begin_subroutine();

        let category = self.expect_keyword(&[
            Keyword::Constructor,
            Keyword::Function,
            Keyword::Method,
        ])?;
        if category == Keyword::Method {
            let class_name = self.symbols.class_name().to_string();
            self.symbols
                .register_subroutine_level("this", &class_name, Kind::Argument);
        }

        self.expect_type(true)?;
        let name = self.expect_ident()?;
        self.symbols.set_subroutine_name(&name);

        self.expect_symbol('(')?;
        self.compile_parameter_list()?;
        self.expect_symbol(')')?;
        self.compile_subroutine_body(category)?;

        self.symbols.end_subroutine();
        self.close("subroutineDec");
        Ok(())
    }

    /// parameterList = (type varName ("," type varName)*)?
    fn compile_parameter_list(&mut self) -> Result<(), CompileError> {
        self.open("parameterList");
        if !self.is_symbol(')') {
            loop {
                let ty = self.expect_type(false)?;
                let name = self.expect_ident()?;
                self.symbols
                    .register_subroutine_level(&name, &ty, Kind::Argument);
                if !self.is_symbol(',') {
                    break;
                }
                self.advance()?;
            }
        }
        self.close("parameterList");
        Ok(())
    }

    /// subroutineBody = "{" varDec* statements "}"
    fn compile_subroutine_body(&mut self, category: Keyword) -> Result<(), CompileError> {
        self.open("subroutineBody");
        self.expect_symbol('{')?;
        while self.is_keyword(Keyword::Var) {
            self.compile_var_dec()?;
        }

        let name = self.symbols.qualified_subroutine_name();
        self.writer.function(&name, self.symbols.local_count());
        match category {
            Keyword::Constructor => {
                self.writer
                    .push(Segment::Constant, self.symbols.field_count());
                self.writer.call("Memory.alloc", 1);
                self.writer.pop(Segment::Pointer, 0);
            }
            Keyword::Method => {
                self.writer.push(Segment::Argument, 0);
                self.writer.pop(Segment::Pointer, 0);
            }
            _ => (),
        }

        self.compile_statements()?;
        self.expect_block_end()?;
        self.close("subroutineBody");
        Ok(())
    }

    /// varDec = "var" type varName ("," varName)* ";"
    fn compile_var_dec(&mut self) -> Result<(), CompileError> {
        self.open("varDec");
        self.expect_keyword(&[Keyword::Var])?;
        let ty = self.expect_type(false)?;
        loop {
            let name = self.expect_ident()?;
            self.symbols
                .register_subroutine_level(&name, &ty, Kind::Local);
            if !self.is_symbol(',') {
                break;
            }
            self.advance()?;
        }
        self.expect_symbol(';')?;
        self.close("varDec");
        Ok(())
    }
}
