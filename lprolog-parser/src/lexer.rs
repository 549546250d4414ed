//! # Lexer
//!
//! Turns source text into [`Token`]s on demand. The lexer is lazy: the
//! parser pulls one token at a time, so an operator declared by one
//! declaration is known before the next declaration is tokenized and
//! classified.
//!
//! Quotation blocks (`{{ ... }}`) are captured verbatim, delimiters
//! included, and never tokenized as code.

use crate::{ParseError, Token, TokenKind, bail};
use lprolog_ast::Loc;
use smartstring::alias::String;
use std::sync::Arc;

/// Characters that make up symbolic operator names.
const SYMBOL_CHARS: &str = "+-*/^<>=~:.?@#$&";

/// Characters that always form a token on their own.
fn solo(c: char) -> Option<TokenKind> {
    Some(match c {
        '(' => TokenKind::LParen,
        ')' => TokenKind::RParen,
        '[' => TokenKind::LBracket,
        ']' => TokenKind::RBracket,
        '{' => TokenKind::LBrace,
        '}' => TokenKind::RBrace,
        '\\' => TokenKind::Backslash,
        ',' | ';' | '!' | '|' => {
            let mut s = String::new();
            s.push(c);
            TokenKind::Symbolic(s)
        }
        _ => return None,
    })
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '\''
}

fn is_symbol_char(c: char) -> bool {
    SYMBOL_CHARS.contains(c)
}

/// A lazy tokenizer over one source unit.
pub struct Lexer {
    name: Arc<str>,
    src: Arc<str>,
    pos: usize,
    line: usize,
    line_start: usize,
}

impl Lexer {
    pub fn new(name: impl Into<Arc<str>>, src: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            src: src.into(),
            pos: 0,
            line: 1,
            line_start: 0,
        }
    }

    pub fn source_name(&self) -> &Arc<str> {
        &self.name
    }

    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_char_at(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.line_start = self.pos;
        }
        Some(c)
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&pred) {
            self.bump();
        }
    }

    /// Location of the text from `start` (at `line`/`line_start`) to here.
    fn loc_from(&self, start: usize, line: usize, line_start: usize) -> Loc {
        Loc {
            source_name: self.name.clone(),
            source_start: start,
            source_stop: self.pos,
            line,
            line_starts_at: line_start,
        }
    }

    /// Location of the current position, for errors.
    fn here(&self) -> Loc {
        self.loc_from(self.pos, self.line, self.line_start)
    }

    /// Skips whitespace and comments.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('%') => self.bump_while(|c| c != '\n'),
                Some('/') if self.peek_char_at(1) == Some('*') => {
                    let loc = self.here();
                    self.bump();
                    self.bump();
                    loop {
                        if self.rest().starts_with("*/") {
                            self.bump();
                            self.bump();
                            break;
                        }
                        if self.bump().is_none() {
                            bail!(loc, "unterminated comment");
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Returns `true` if a `.` at the current position closes a declaration.
    fn at_end_dot(&self) -> bool {
        self.peek_char() == Some('.')
            && match self.peek_char_at(1) {
                None => true,
                Some(c) => c.is_whitespace() || c == '%',
            }
    }

    /// Produces the next token; at the end of input, [`TokenKind::Eof`]
    /// forever.
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_trivia()?;
        let (start, line, line_start) = (self.pos, self.line, self.line_start);
        let Some(c) = self.peek_char() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                loc: self.here(),
            });
        };
        let kind = if self.at_end_dot() {
            self.bump();
            TokenKind::End
        } else if c == '{' && self.peek_char_at(1) == Some('{') {
            self.quotation()?
        } else if let Some(kind) = solo(c) {
            self.bump();
            kind
        } else if is_ident_start(c) {
            TokenKind::Ident(self.ident())
        } else if c == '@' && self.peek_char_at(1).is_some_and(is_ident_start) {
            self.bump();
            let mut name = String::from("@");
            name.push_str(&self.ident());
            TokenKind::MacroName(name)
        } else if c.is_ascii_digit() {
            self.number()
        } else if c == '"' {
            TokenKind::Str(self.string()?)
        } else if is_symbol_char(c) {
            self.symbolic()
        } else {
            bail!(self.here(), "unexpected character {c:?}");
        };
        let tok = Token {
            kind,
            loc: self.loc_from(start, line, line_start),
        };
        log::trace!("token {:?} at {}", tok.kind, tok.loc);
        Ok(tok)
    }

    /// Identifier, with `.name` segments of qualified names.
    fn ident(&mut self) -> String {
        let start = self.pos;
        loop {
            self.bump_while(is_ident_char);
            if self.peek_char() == Some('.') && self.peek_char_at(1).is_some_and(is_ident_start) {
                self.bump();
            } else {
                break;
            }
        }
        String::from(&self.src[start..self.pos])
    }

    fn number(&mut self) -> TokenKind {
        let start = self.pos;
        self.bump_while(|c| c.is_ascii_digit());
        let mut float = false;
        if self.peek_char() == Some('.') && self.peek_char_at(1).is_some_and(|c| c.is_ascii_digit()) {
            float = true;
            self.bump();
            self.bump_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let signed = matches!(self.peek_char_at(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_char_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                float = true;
                self.bump();
                if signed {
                    self.bump();
                }
                self.bump_while(|c| c.is_ascii_digit());
            }
        }
        let text = String::from(&self.src[start..self.pos]);
        if float {
            TokenKind::Float(text)
        } else {
            TokenKind::Int(text)
        }
    }

    fn string(&mut self) -> Result<String, ParseError> {
        let loc = self.here();
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None => bail!(loc, "unterminated string literal"),
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('\\') => out.push('\\'),
                    Some('"') => out.push('"'),
                    Some(c) => bail!(self.here(), "unknown escape \\{c} in string literal"),
                    None => bail!(loc, "unterminated string literal"),
                },
                Some(c) => out.push(c),
            }
        }
    }

    /// Symbolic run; a `.` that would close the declaration is left alone.
    fn symbolic(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if !is_symbol_char(c) || (self.pos > start && self.at_end_dot()) {
                break;
            }
            if c == '/' && self.pos > start && self.peek_char_at(1) == Some('*') {
                break;
            }
            self.bump();
        }
        TokenKind::Symbolic(String::from(&self.src[start..self.pos]))
    }

    /// Captures `{{ ... }}` up to the matching run of closing braces.
    fn quotation(&mut self) -> Result<TokenKind, ParseError> {
        let loc = self.here();
        let start = self.pos;
        let n = self.rest().bytes().take_while(|&b| b == b'{').count();
        let open = "{".repeat(n);
        let close = "}".repeat(n);
        for _ in 0..n {
            self.bump();
        }
        let mut depth = 1usize;
        while depth > 0 {
            if self.rest().starts_with(close.as_str()) {
                depth -= 1;
                for _ in 0..n {
                    self.bump();
                }
            } else if self.rest().starts_with(open.as_str()) {
                depth += 1;
                for _ in 0..n {
                    self.bump();
                }
            } else if self.bump().is_none() {
                bail!(loc, "unterminated quotation");
            }
        }
        Ok(TokenKind::Quotation(String::from(&self.src[start..self.pos])))
    }
}
