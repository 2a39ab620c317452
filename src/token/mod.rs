pub mod token;

pub use token::{lookup_ident, Token, TokenType, KEYWORDS};
