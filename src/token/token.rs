use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/*
Tokens are individual atoms in the molecule that is a programming language.
The lexer groups raw source characters into lexemes and tags each one with a
`TokenType` from this closed enumeration. `position` is a zero-based byte
offset into the source, carried only so errors can later be mapped back to a
line number via `Lexer::line_of`.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Illegal,
    Eof,

    // identifiers + literals
    Ident,
    Int,

    // operators
    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,

    Lt,
    Gt,
    Eq,
    NotEq,

    // delimiters
    Comma,
    Semicolon,

    Lparen,
    Rparen,
    Lbrace,
    Rbrace,

    // keywords
    Function,
    Let,
    True,
    False,
    If,
    Else,
    Return,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenType,
    pub literal: String,
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenType, literal: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            literal: literal.into(),
            position,
        }
    }

    pub fn eof(position: usize) -> Self {
        Self::new(TokenType::Eof, "", position)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.literal)
    }
}

/// Centralized, swappable keyword table. A distinct build of the
/// language could point the lexer at a different static map (e.g. swapping
/// `let` for `olaf`) without touching any scanning logic.
pub static KEYWORDS: Lazy<HashMap<&'static str, TokenType>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("fn", TokenType::Function);
    m.insert("let", TokenType::Let);
    m.insert("true", TokenType::True);
    m.insert("false", TokenType::False);
    m.insert("if", TokenType::If);
    m.insert("else", TokenType::Else);
    m.insert("return", TokenType::Return);
    m
});

pub fn lookup_ident(ident: &str) -> TokenType {
    KEYWORDS.get(ident).copied().unwrap_or(TokenType::Ident)
}
