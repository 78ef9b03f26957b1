use crate::lexer::Token;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

fn token_element(token: &Token) -> String {
    let tag = token.kind.tag();
    format!("<{tag}> {} </{tag}>", escape(&token.text))
}

/// Flat `<tokens>` document, one element per token.
pub fn tokens_xml(tokens: &[Token]) -> String {
    let mut out = String::from("<tokens>\n");
    for token in tokens {
        out.push_str(&token_element(token));
        out.push('\n');
    }
    out.push_str("</tokens>\n");
    out
}

/// Nested rendering of grammar productions and the tokens they consume.
#[derive(Debug, Default)]
pub struct XmlWriter {
    out: String,
    depth: usize,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    pub fn open_tag(&mut self, tag: &str) {
        self.line(&format!("<{tag}>"));
        self.depth += 1;
    }

    pub fn close_tag(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(&format!("</{tag}>"));
    }

    pub fn token(&mut self, token: &Token) {
        self.line(&token_element(token));
    }

    pub fn finish(self) -> String {
        self.out
    }
}
