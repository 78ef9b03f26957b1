use super::{token::SYMBOLS, Token};

/// Drops comment lines and blank lines, truncates trailing `//` comments and
/// joins what is left with single spaces.
///
/// The stripping is line oriented: a block comment is removed when it starts
/// a line, together with every following line up to the one closing it.
pub fn strip_comments(source: &str) -> String {
    let mut kept = Vec::new();
    let mut in_block = false;
    for line in source.lines().map(str::trim) {
        if in_block {
            in_block = !line.contains("*/");
            continue;
        }
        if let Some(rest) = line.strip_prefix("/*") {
            in_block = !rest.contains("*/");
            continue;
        }
        if line.starts_with("//") {
            continue;
        }
        let line = truncate_line_comment(line).trim();
        if !line.is_empty() {
            kept.push(line);
        }
    }
    kept.join(" ")
}

fn truncate_line_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut prev_slash = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => {
                in_string = !in_string;
                prev_slash = false;
            }
            '/' if !in_string => {
                if prev_slash {
                    return &line[..i - 1];
                }
                prev_slash = true;
            }
            _ => prev_slash = false,
        }
    }
    line
}

#[derive(Debug, Default)]
pub struct Lexer {
    tokens: Vec<Token>,
    word: String,
}

impl Lexer {
    fn new() -> Self {
        Self::default()
    }

    fn in_string(&self) -> bool {
        self.word.matches('"').count() % 2 == 1
    }

    fn flush_word(&mut self) {
        if self.word.is_empty() {
            return;
        }
        let word = std::mem::take(&mut self.word);
        self.tokens.push(Token::classify(&word));
    }

    fn _tokenize(&mut self, text: &str) {
        for c in text.chars() {
            if self.in_string() {
                self.word.push(c);
            } else if c.is_whitespace() {
                self.flush_word();
            } else if SYMBOLS.contains(&c) {
                self.flush_word();
                self.tokens.push(Token::classify(c.encode_utf8(&mut [0; 4])));
            } else {
                self.word.push(c);
            }
        }
        self.flush_word();
    }

    /// Produces the full token sequence of a source file. Never fails; shape
    /// errors surface when the translator expects a particular token.
    ///
    /// Symbols end the current word everywhere except inside an open string
    /// literal, so `"a, b"` stays one string constant.
    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new();
        lexer._tokenize(&strip_comments(source));
        log::trace!("tokenized {} tokens", lexer.tokens.len());

        lexer.tokens
    }
}
