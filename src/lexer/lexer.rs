use crate::token::{lookup_ident, Token, TokenType};
use crate::util::format_errors;

/*
The lexer's job is to scan source code as a sequence of characters and group
runs of characters together into lexemes, then tag each lexeme with a token.
It is single-pass and one-character lookahead: `ch` is the character under
consideration, `read_position` is one past it.

Lexical errors (an unrecognized byte) never abort scanning, they accumulate
in `errors` so the parser and the caller can see every illegal character in
one pass instead of stopping at the first one.
*/
pub struct Lexer {
    input: Vec<u8>,
    position: usize,
    read_position: usize,
    ch: u8,
    /// Byte offset where each source line begins; appended on every `\n`.
    line_starts: Vec<usize>,
    errors: Vec<String>,
}

impl Lexer {
    pub fn new(input: impl Into<String>) -> Self {
        let mut lexer = Self {
            input: input.into().into_bytes(),
            position: 0,
            read_position: 0,
            ch: 0,
            line_starts: vec![0],
            errors: Vec::new(),
        };
        lexer.read_char();
        lexer
    }

    fn read_char(&mut self) {
        if self.ch == b'\n' {
            self.line_starts.push(self.read_position);
        }

        self.ch = if self.read_position >= self.input.len() {
            0
        } else {
            self.input[self.read_position]
        };
        self.position = self.read_position;
        self.read_position += 1;
    }

    fn peek_char(&self) -> u8 {
        if self.read_position >= self.input.len() {
            0
        } else {
            self.input[self.read_position]
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let tok = match self.ch {
            b'=' => {
                if self.peek_char() == b'=' {
                    let pos = self.position;
                    self.read_char();
                    Token::new(TokenType::Eq, "==", pos)
                } else {
                    self.single(TokenType::Assign)
                }
            }
            b'!' => {
                if self.peek_char() == b'=' {
                    let pos = self.position;
                    self.read_char();
                    Token::new(TokenType::NotEq, "!=", pos)
                } else {
                    self.single(TokenType::Bang)
                }
            }
            b';' => self.single(TokenType::Semicolon),
            b'(' => self.single(TokenType::Lparen),
            b')' => self.single(TokenType::Rparen),
            b',' => self.single(TokenType::Comma),
            b'+' => self.single(TokenType::Plus),
            b'-' => self.single(TokenType::Minus),
            b'/' => self.single(TokenType::Slash),
            b'*' => self.single(TokenType::Asterisk),
            b'<' => self.single(TokenType::Lt),
            b'>' => self.single(TokenType::Gt),
            b'{' => self.single(TokenType::Lbrace),
            b'}' => self.single(TokenType::Rbrace),
            0 => Token::eof(self.position),
            ch => {
                if is_letter(ch) {
                    let pos = self.position;
                    let literal = self.read_identifier();
                    let kind = lookup_ident(&literal);
                    return Token::new(kind, literal, pos);
                } else if is_digit(ch) {
                    let pos = self.position;
                    let literal = self.read_number();
                    return Token::new(TokenType::Int, literal, pos);
                } else {
                    let line = self.line_of(self.position);
                    let message = format!(
                        "Line {line}, Column {col}: illegal character '{ch}' found",
                        col = self.position - self.line_starts[line - 1] + 1,
                        ch = ch as char,
                    );
                    log::debug!("lexer: {message}");
                    self.errors.push(message);
                    self.single(TokenType::Illegal)
                }
            }
        };

        self.read_char();
        tok
    }

    fn single(&self, kind: TokenType) -> Token {
        Token::new(kind, (self.ch as char).to_string(), self.position)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.ch, b' ' | b'\t' | b'\n' | b'\r') {
            self.read_char();
        }
    }

    fn read_identifier(&mut self) -> String {
        let start = self.position;
        while is_letter(self.ch) {
            self.read_char();
        }
        String::from_utf8_lossy(&self.input[start..self.position]).into_owned()
    }

    fn read_number(&mut self) -> String {
        let start = self.position;
        while is_digit(self.ch) {
            self.read_char();
        }
        String::from_utf8_lossy(&self.input[start..self.position]).into_owned()
    }

    /// Maps a byte position back to a 1-based line number via a forward scan
    /// over recorded line-start offsets. Negative positions aren't
    /// representable in `usize`; callers only ever pass the lexer's own
    /// positions, which are always valid.
    pub fn line_of(&self, position: usize) -> usize {
        let mut line = 1;
        for &start in self.line_starts.iter().skip(1) {
            if position < start {
                break;
            }
            line += 1;
        }
        line
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn format_errors(&self) -> String {
        format_errors("Lexer errors", &self.errors)
    }
}

fn is_letter(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_' || ch == b'~'
}

fn is_digit(ch: u8) -> bool {
    ch.is_ascii_digit()
}
