use std::str::Chars;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Max,
    Min,
    Urs,
    Int,
    Bin,
    Number,
    LessEqual,
    GreaterEqual,
    Equal,
    Plus,
    Minus,
    Newline,
    Eof,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: Chars<'a>,
    pos: usize,
    current: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            source,
            chars,
            pos: 0,
            current,
        }
    }

    /// Tokenize the whole source, collapsing blank lines so that the
    /// resulting stream never has two consecutive `Newline` tokens and
    /// never starts with one.
    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        let mut line_has_content = false;

        loop {
            let token = lexer.next_token();
            match token.kind {
                TokenKind::Newline => {
                    if line_has_content {
                        tokens.push(token);
                        line_has_content = false;
                    }
                }
                TokenKind::Eof => {
                    tokens.push(token);
                    break;
                }
                _ => {
                    line_has_content = true;
                    tokens.push(token);
                }
            }
        }
        tokens
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current;
        self.current = self.chars.next();
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        c
    }

    fn peek(&self) -> Option<char> {
        self.current
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' || c == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> Token {
        let start = self.pos;

        if matches!(self.peek(), Some('+') | Some('-')) {
            self.advance();
        }

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        if self.peek() == Some('.') {
            self.advance();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        Token::new(
            TokenKind::Number,
            Span::new(start, self.pos),
            &self.source[start..self.pos],
        )
    }

    fn read_word(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.source[start..self.pos];
        let kind = match text.to_ascii_lowercase().as_str() {
            "max" => TokenKind::Max,
            "min" => TokenKind::Min,
            "urs" => TokenKind::Urs,
            "int" => TokenKind::Int,
            "bin" => TokenKind::Bin,
            _ => TokenKind::Error,
        };
        Token::new(kind, Span::new(start, self.pos), text)
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let start = self.pos;

        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, Span::new(start, start), "");
        };

        match c {
            '\n' => {
                self.advance();
                Token::new(TokenKind::Newline, Span::new(start, self.pos), "\n")
            }
            '<' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    Token::new(TokenKind::LessEqual, Span::new(start, self.pos), "<=")
                } else {
                    Token::new(TokenKind::Error, Span::new(start, self.pos), "<")
                }
            }
            '>' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    Token::new(TokenKind::GreaterEqual, Span::new(start, self.pos), ">=")
                } else {
                    Token::new(TokenKind::Error, Span::new(start, self.pos), ">")
                }
            }
            '=' => {
                self.advance();
                Token::new(TokenKind::Equal, Span::new(start, self.pos), "=")
            }
            '+' | '-' => {
                if matches!(self.peek_next(), Some(d) if d.is_ascii_digit()) {
                    self.read_number()
                } else {
                    self.advance();
                    let (kind, text) = if c == '+' { (TokenKind::Plus, "+") } else { (TokenKind::Minus, "-") };
                    Token::new(kind, Span::new(start, self.pos), text)
                }
            }
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_alphabetic() => self.read_word(),
            _ => {
                self.advance();
                Token::new(
                    TokenKind::Error,
                    Span::new(start, self.pos),
                    &self.source[start..self.pos],
                )
            }
        }
    }
}
