//! Lexer module for tokenizing MiniC source code

mod scanner;
mod token;

pub use scanner::Scanner;
pub use token::{
    LexError, Token, TokenKind, MAX_FLOAT_PART_DIGITS, MAX_HEX_DIGITS, MAX_INT_DIGITS,
    MAX_LEX_LENGTH,
};
