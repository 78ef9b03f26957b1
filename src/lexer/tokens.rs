use super::Token;

/// Token sequence plus a read cursor. Built once, only the cursor moves.
#[derive(Clone, Debug, Default)]
pub struct Tokens {
    tokens: Vec<Token>,
    index: usize,
}

impl Tokens {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }

    pub fn current(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index + 1)
    }

    pub fn advance(&mut self) {
        if self.index < self.tokens.len() {
            self.index += 1;
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    pub fn position(&self) -> usize {
        self.index
    }

    pub fn is_eof(&self) -> bool {
        self.index >= self.tokens.len()
    }
}
