//! Token definitions for the MiniC lexer
//!
//! Recognition is driven by the `logos` state machine. The shape rules a
//! regular automaton cannot express (digit caps, identifier length, what may
//! follow a numeral, character literal closure) run in the variant callbacks
//! and surface as a [`LexError`] reason.

use logos::Logos;
use thiserror::Error;

use crate::common::Span;

/// Maximum number of characters in an identifier
pub const MAX_LEX_LENGTH: usize = 100;
/// Maximum digits after `0x` (a 32-bit value)
pub const MAX_HEX_DIGITS: usize = 8;
/// Maximum digits of a decimal constant (a 32-bit signed value)
pub const MAX_INT_DIGITS: usize = 10;
/// Maximum digits on either side of the point of a floating constant
pub const MAX_FLOAT_PART_DIGITS: usize = 15;

/// Token with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact lexeme spelling
    pub text: String,
    /// 1-based line of the first character
    pub line: usize,
    pub span: Span,
    /// Why the lexeme was rejected, set only for [`TokenKind::Invalid`]
    pub fault: Option<LexError>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            span,
            fault: None,
        }
    }

    pub fn error(fault: LexError, text: impl Into<String>, line: usize, span: Span) -> Self {
        Self {
            kind: TokenKind::Invalid,
            text: text.into(),
            line,
            span,
            fault: Some(fault),
        }
    }

    pub fn eof(line: usize, offset: usize) -> Self {
        Self::new(TokenKind::Eof, "EOF", line, Span::new(offset, offset))
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, TokenKind::Invalid)
    }
}

/// Reasons a lexeme is rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexError {
    #[default]
    #[error("unrecognized character")]
    UnexpectedCharacter,
    #[error("identifier longer than {} characters", MAX_LEX_LENGTH)]
    IdentifierTooLong,
    #[error("hexadecimal constant has no digits after '0x'")]
    MissingHexDigits,
    #[error("hexadecimal constant has more than {} digits", MAX_HEX_DIGITS)]
    HexTooLong,
    #[error("integer constant has more than {} digits", MAX_INT_DIGITS)]
    IntegerTooLong,
    #[error("floating constant has more than {} digits in a part", MAX_FLOAT_PART_DIGITS)]
    FloatTooLong,
    #[error("invalid character directly after a numeric constant")]
    InvalidNumberSuffix,
    #[error("unterminated character literal")]
    UnterminatedChar,
}

/// All token kinds in MiniC
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(error = LexError)]
#[logos(skip r"[ \t\n\r\f\x0B]+")] // Skip whitespace
#[logos(skip r"//[^\n]*")] // Skip line comments
pub enum TokenKind {
    // === Keywords ===
    #[token("void")]
    Void,
    #[token("short")]
    Short,
    #[token("long")]
    Long,
    #[token("int")]
    Int,
    #[token("double")]
    Double,
    #[token("char")]
    Char,
    #[token("while")]
    While,
    /// The entry function's name, lexed apart from ordinary identifiers
    #[token("main")]
    Main,

    // === Identifiers ===
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", identifier)]
    Identifier,

    // === Constants ===
    #[regex(r"[0-9]+", decimal)]
    DecConst,
    #[regex(r"0[xX][0-9a-fA-F]*", hexadecimal)]
    HexConst,
    #[regex(r"[0-9]+\.[0-9]*", floating)]
    #[regex(r"\.[0-9]+", floating)]
    FloatConst,
    #[regex(r"'(\\[\s\S]|[^\\])?'?", character)]
    CharConst,

    // === Operators ===
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("&")]
    Amp,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("<<")]
    LtLt,
    #[token(">>")]
    GtGt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,

    // Punctuation
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    // Special
    Eof,
    Invalid,
}

type Lex<'s> = logos::Lexer<'s, TokenKind>;

fn identifier(lex: &mut Lex<'_>) -> Result<(), LexError> {
    if lex.slice().len() > MAX_LEX_LENGTH {
        return Err(LexError::IdentifierTooLong);
    }
    Ok(())
}

/// Characters that may directly follow a numeric constant
fn is_numeral_follower(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t'
            | '\n'
            | '\r'
            | '('
            | ')'
            | '['
            | ']'
            | '{'
            | '}'
            | ';'
            | ','
            | '+'
            | '-'
            | '*'
            | '/'
            | '%'
            | '<'
            | '>'
            | '='
            | '&'
            | '|'
            | '^'
    )
}

/// Rejects a numeral glued to a character that cannot follow it; the
/// offending character becomes part of the error lexeme.
fn check_follower(lex: &mut Lex<'_>) -> Result<(), LexError> {
    match lex.remainder().chars().next() {
        Some(c) if !is_numeral_follower(c) => {
            lex.bump(c.len_utf8());
            Err(LexError::InvalidNumberSuffix)
        }
        _ => Ok(()),
    }
}

fn decimal(lex: &mut Lex<'_>) -> Result<(), LexError> {
    if lex.slice().len() > MAX_INT_DIGITS {
        return Err(LexError::IntegerTooLong);
    }
    check_follower(lex)
}

fn hexadecimal(lex: &mut Lex<'_>) -> Result<(), LexError> {
    let digits = lex.slice().len() - 2;
    if digits == 0 {
        return Err(LexError::MissingHexDigits);
    }
    if digits > MAX_HEX_DIGITS {
        return Err(LexError::HexTooLong);
    }
    check_follower(lex)
}

fn floating(lex: &mut Lex<'_>) -> Result<(), LexError> {
    let (integer, fraction) = lex.slice().split_once('.').unwrap_or((lex.slice(), ""));
    if integer.len() > MAX_FLOAT_PART_DIGITS || fraction.len() > MAX_FLOAT_PART_DIGITS {
        return Err(LexError::FloatTooLong);
    }
    check_follower(lex)
}

fn character(lex: &mut Lex<'_>) -> Result<(), LexError> {
    let body = lex
        .slice()
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .unwrap_or("");
    let mut chars = body.chars();
    let closed = match (chars.next(), chars.next(), chars.next()) {
        (Some('\\'), Some(_), None) => true,
        (Some(c), None, None) => c != '\\',
        _ => false,
    };
    if closed {
        Ok(())
    } else {
        Err(LexError::UnterminatedChar)
    }
}

impl TokenKind {
    /// Type keywords usable for variables and parameters (everything but `void`)
    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Short | TokenKind::Long | TokenKind::Int | TokenKind::Double | TokenKind::Char
        )
    }

    /// Can start a top-level declaration
    pub fn starts_declaration(&self) -> bool {
        self.is_type_keyword() || matches!(self, TokenKind::Void)
    }

    /// Identifier or the `main` keyword, both usable as names
    pub fn is_name(&self) -> bool {
        matches!(self, TokenKind::Identifier | TokenKind::Main)
    }

    /// Can start an entry of a statement list
    pub fn starts_statement(&self) -> bool {
        self.is_name()
            || self.is_type_keyword()
            || matches!(self, TokenKind::LBrace | TokenKind::While | TokenKind::Semi)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Void => write!(f, "'void'"),
            TokenKind::Short => write!(f, "'short'"),
            TokenKind::Long => write!(f, "'long'"),
            TokenKind::Int => write!(f, "'int'"),
            TokenKind::Double => write!(f, "'double'"),
            TokenKind::Char => write!(f, "'char'"),
            TokenKind::While => write!(f, "'while'"),
            TokenKind::Main => write!(f, "'main'"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::DecConst => write!(f, "decimal constant"),
            TokenKind::HexConst => write!(f, "hex constant"),
            TokenKind::FloatConst => write!(f, "floating constant"),
            TokenKind::CharConst => write!(f, "character constant"),
            TokenKind::Pipe => write!(f, "'|'"),
            TokenKind::Caret => write!(f, "'^'"),
            TokenKind::Amp => write!(f, "'&'"),
            TokenKind::EqEq => write!(f, "'=='"),
            TokenKind::NotEq => write!(f, "'!='"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::LtEq => write!(f, "'<='"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::GtEq => write!(f, "'>='"),
            TokenKind::LtLt => write!(f, "'<<'"),
            TokenKind::GtGt => write!(f, "'>>'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Percent => write!(f, "'%'"),
            TokenKind::Eq => write!(f, "'='"),
            TokenKind::Semi => write!(f, "';'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::Eof => write!(f, "end of file"),
            TokenKind::Invalid => write!(f, "invalid lexeme"),
        }
    }
}
