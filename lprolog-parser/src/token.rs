//! # Tokens
//!
//! Token kinds produced by the [`Lexer`](crate::Lexer) and consumed by the
//! term and declaration parsers.
//!
//! Operators are not a token kind of their own: whether an identifier or a
//! symbolic run acts as an operator depends on the live operator table,
//! which grammar declarations may change between two tokens.

use lprolog_ast::Loc;
use smartstring::alias::String;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Alphanumeric name, possibly qualified (`std.map`).
    Ident(String),
    /// `@name`, kept with its `@`.
    MacroName(String),
    /// Run of symbol characters, or one of `, ; ! |`.
    Symbolic(String),
    Int(String),
    Float(String),
    /// String literal with escapes resolved.
    Str(String),
    /// Raw text of a `{{ ... }}` block, delimiters included.
    Quotation(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Backslash,
    /// The `.` closing a declaration.
    End,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(s) | TokenKind::MacroName(s) | TokenKind::Symbolic(s) => {
                write!(f, "`{s}`")
            }
            TokenKind::Int(s) | TokenKind::Float(s) => write!(f, "number {s}"),
            TokenKind::Str(s) => write!(f, "string {s:?}"),
            TokenKind::Quotation(_) => f.write_str("quotation"),
            TokenKind::LParen => f.write_str("`(`"),
            TokenKind::RParen => f.write_str("`)`"),
            TokenKind::LBracket => f.write_str("`[`"),
            TokenKind::RBracket => f.write_str("`]`"),
            TokenKind::LBrace => f.write_str("`{`"),
            TokenKind::RBrace => f.write_str("`}`"),
            TokenKind::Backslash => f.write_str("`\\`"),
            TokenKind::End => f.write_str("end of declaration"),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}

/// A token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub loc: Loc,
}

impl Token {
    /// The name of an identifier or symbolic token.
    ///
    /// Only these two kinds can denote operators.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(s) | TokenKind::Symbolic(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_ident(&self, text: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(s) if s == text)
    }

    pub fn is_symbol(&self, text: &str) -> bool {
        matches!(&self.kind, TokenKind::Symbolic(s) if s == text)
    }

    pub fn is_end(&self) -> bool {
        matches!(self.kind, TokenKind::End | TokenKind::Eof)
    }
}
