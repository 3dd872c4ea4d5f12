//! Value types of MiniC expressions and declarations

use std::fmt;

use crate::lexer::TokenKind;

/// Type carried by symbols and propagated through expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    #[default]
    Undefined,
    Short,
    Long,
    Int,
    Double,
    Char,
    Void,
}

impl DataType {
    /// Map a type keyword to its type, `Undefined` for anything else
    pub fn from_keyword(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Short => DataType::Short,
            TokenKind::Long => DataType::Long,
            TokenKind::Int => DataType::Int,
            TokenKind::Double => DataType::Double,
            TokenKind::Char => DataType::Char,
            TokenKind::Void => DataType::Void,
            _ => DataType::Undefined,
        }
    }

    /// Type of a literal constant token
    pub fn of_constant(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::DecConst | TokenKind::HexConst => Some(DataType::Int),
            TokenKind::FloatConst => Some(DataType::Double),
            TokenKind::CharConst => Some(DataType::Char),
            _ => None,
        }
    }

    /// {int, short, long, char}
    pub fn is_integer_family(self) -> bool {
        matches!(self, DataType::Int | DataType::Short | DataType::Long | DataType::Char)
    }

    /// Operand types accepted by unary `+`/`-` and by comparisons
    pub fn is_arithmetic(self) -> bool {
        self.is_integer_family() || self == DataType::Double
    }

    /// Targets that accept any arithmetic value on assignment
    pub fn is_assignable_numeric(self) -> bool {
        matches!(self, DataType::Short | DataType::Long | DataType::Int | DataType::Double)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Undefined => "undefined",
            DataType::Short => "short",
            DataType::Long => "long",
            DataType::Int => "int",
            DataType::Double => "double",
            DataType::Char => "char",
            DataType::Void => "void",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_families() {
        assert!(DataType::Char.is_integer_family());
        assert!(!DataType::Double.is_integer_family());
        assert!(DataType::Double.is_arithmetic());
        assert!(!DataType::Void.is_arithmetic());
        assert!(!DataType::Char.is_assignable_numeric());
        assert!(DataType::Long.is_assignable_numeric());
    }

    #[test]
    fn test_keyword_and_constant_mapping() {
        assert_eq!(DataType::from_keyword(TokenKind::Short), DataType::Short);
        assert_eq!(DataType::from_keyword(TokenKind::While), DataType::Undefined);
        assert_eq!(DataType::of_constant(TokenKind::HexConst), Some(DataType::Int));
        assert_eq!(DataType::of_constant(TokenKind::CharConst), Some(DataType::Char));
        assert_eq!(DataType::of_constant(TokenKind::Identifier), None);
        assert_eq!(DataType::Double.to_string(), "double");
    }
}
