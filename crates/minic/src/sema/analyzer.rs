//! Semantic analyzer - symbol registration and type rules
//!
//! The parser calls into the analyzer as it recognizes each production; the
//! analyzer answers with resolved symbols and types or a fatal error.

use crate::common::{CompileError, CompileResult};
use crate::lexer::{Token, TokenKind};

use super::scope::{Category, ScopeId, ScopeTree, Symbol, SymbolId};
use super::types::DataType;

/// Semantic analyzer for type checking
pub struct SemanticAnalyzer {
    scope: ScopeTree,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self {
            scope: ScopeTree::new(),
        }
    }

    pub fn enter_scope(&mut self) -> ScopeId {
        self.scope.enter()
    }

    pub fn leave_scope(&mut self) {
        self.scope.leave();
    }

    /// Insert into the current scope; `None` without touching the table when
    /// the name is already declared in this exact scope
    pub fn add_symbol(&mut self, symbol: Symbol) -> Option<SymbolId> {
        self.scope.define(symbol)
    }

    pub fn find_symbol(&self, name: &str) -> Option<&Symbol> {
        self.scope.lookup(name).map(|id| self.scope.symbol(id))
    }

    /// Hand over the scope tree once analysis is complete
    pub fn into_scopes(self) -> ScopeTree {
        self.scope
    }

    /// Check `target = <value of source type>`
    pub fn check_assignment(
        &self,
        target: &Symbol,
        source: DataType,
        at: &Token,
    ) -> CompileResult<()> {
        if !matches!(target.category(), Category::Variable | Category::Parameter) {
            return Err(CompileError::semantic(
                format!("cannot assign a value to {} '{}'", target.category(), target.name),
                at,
            ));
        }

        // Narrowing between numeric types is accepted, and char widens into any of them.
        let compatible = target.ty == source
            || (target.ty.is_assignable_numeric() && source.is_arithmetic());
        if !compatible {
            return Err(CompileError::semantic(
                format!(
                    "incompatible types in assignment: cannot assign '{}' to '{}' of type '{}'",
                    source, target.name, target.ty
                ),
                at,
            ));
        }
        Ok(())
    }

    /// Type of `left op right`
    pub fn check_binary_expr(
        &self,
        left: DataType,
        op: &Token,
        right: DataType,
    ) -> CompileResult<DataType> {
        let integers = left.is_integer_family() && right.is_integer_family();

        let result = match op.kind {
            TokenKind::Plus | TokenKind::Minus | TokenKind::Star | TokenKind::Slash => {
                if left == DataType::Double || right == DataType::Double {
                    Some(DataType::Double)
                } else if integers {
                    Some(DataType::Int)
                } else {
                    None
                }
            }
            TokenKind::Percent
            | TokenKind::Pipe
            | TokenKind::Caret
            | TokenKind::Amp
            | TokenKind::LtLt
            | TokenKind::GtGt => integers.then_some(DataType::Int),
            TokenKind::EqEq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq => {
                (left.is_arithmetic() && right.is_arithmetic()).then_some(DataType::Int)
            }
            _ => None,
        };

        result.ok_or_else(|| {
            CompileError::semantic(
                format!(
                    "operator '{}' cannot be applied to operands of type '{}' and '{}'",
                    op.text, left, right
                ),
                op,
            )
        })
    }

    /// Type of unary `+operand` / `-operand`
    pub fn check_unary_expr(&self, op: &Token, operand: DataType) -> CompileResult<DataType> {
        if operand.is_arithmetic() {
            Ok(operand)
        } else {
            Err(CompileError::semantic(
                format!(
                    "unary operator '{}' applies only to numeric types, found '{}'",
                    op.text, operand
                ),
                op,
            ))
        }
    }

    /// Check the argument at 1-based `position` of a call; call sites take
    /// exactly the declared type with no conversion
    pub fn check_call_argument(
        &self,
        function: &Symbol,
        position: usize,
        arg: DataType,
        at: &Token,
    ) -> CompileResult<()> {
        let Some(param) = position.checked_sub(1).and_then(|i| function.params().get(i)) else {
            return Err(CompileError::semantic(
                format!("too many arguments in call to function '{}'", function.name),
                at,
            ));
        };
        if param.ty != arg {
            return Err(CompileError::semantic(
                format!(
                    "type mismatch for argument {} in call to function '{}': expected '{}', found '{}'",
                    position, function.name, param.ty, arg
                ),
                at,
            ));
        }
        Ok(())
    }

    pub fn check_arity(&self, function: &Symbol, given: usize, at: &Token) -> CompileResult<()> {
        if given != function.param_count() {
            return Err(CompileError::semantic(
                format!(
                    "wrong number of arguments in call to function '{}': expected {}, found {}",
                    function.name,
                    function.param_count(),
                    given
                ),
                at,
            ));
        }
        Ok(())
    }

    /// Check the condition of a `while` loop
    pub fn check_condition(&self, condition: DataType, at: &Token) -> CompileResult<()> {
        if condition == DataType::Void {
            return Err(CompileError::semantic(
                "condition of 'while' cannot be void",
                at,
            ));
        }
        Ok(())
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Span;
    use crate::sema::Param;
    use rstest::rstest;

    fn token(kind: TokenKind, text: &str) -> Token {
        Token::new(kind, text, 1, Span::new(0, text.len()))
    }

    use DataType::{Char, Double, Int, Long, Short, Undefined, Void};

    #[rstest]
    #[case(Int, Int)]
    #[case(Double, Int)]
    #[case(Int, Double)]
    #[case(Short, Long)]
    #[case(Long, Char)]
    #[case(Double, Char)]
    #[case(Char, Char)]
    fn test_assignment_accepted(#[case] target: DataType, #[case] source: DataType) {
        let sema = SemanticAnalyzer::new();
        let x = Symbol::variable("x", target);
        assert!(sema.check_assignment(&x, source, &token(TokenKind::Identifier, "x")).is_ok());
    }

    #[rstest]
    #[case(Char, Int)]
    #[case(Char, Double)]
    #[case(Int, Void)]
    #[case(Void, Int)]
    #[case(Int, Undefined)]
    fn test_assignment_rejected(#[case] target: DataType, #[case] source: DataType) {
        let sema = SemanticAnalyzer::new();
        let x = Symbol::variable("x", target);
        let err = sema
            .check_assignment(&x, source, &token(TokenKind::Identifier, "x"))
            .unwrap_err();
        assert!(err.is_semantic());
        assert!(err.message().contains("incompatible types"));
    }

    #[test]
    fn test_assignment_to_function_rejected() {
        let sema = SemanticAnalyzer::new();
        let f = Symbol::function("f", Vec::new());
        let err = sema
            .check_assignment(&f, Int, &token(TokenKind::Identifier, "f"))
            .unwrap_err();
        assert!(err.message().contains("function 'f'"));
    }

    #[test]
    fn test_assignment_to_parameter_accepted() {
        let sema = SemanticAnalyzer::new();
        let p = Symbol::parameter("p", Double);
        assert!(sema.check_assignment(&p, Long, &token(TokenKind::Identifier, "p")).is_ok());
    }

    #[rstest]
    #[case(TokenKind::Plus, "+", Int, Double, Double)]
    #[case(TokenKind::Star, "*", Char, Short, Int)]
    #[case(TokenKind::Slash, "/", Long, Long, Int)]
    #[case(TokenKind::Percent, "%", Char, Long, Int)]
    #[case(TokenKind::LtLt, "<<", Int, Char, Int)]
    #[case(TokenKind::Pipe, "|", Short, Int, Int)]
    #[case(TokenKind::Lt, "<", Double, Char, Int)]
    #[case(TokenKind::EqEq, "==", Double, Double, Int)]
    fn test_binary_result_types(
        #[case] kind: TokenKind,
        #[case] text: &str,
        #[case] left: DataType,
        #[case] right: DataType,
        #[case] expected: DataType,
    ) {
        let sema = SemanticAnalyzer::new();
        let ty = sema.check_binary_expr(left, &token(kind, text), right).unwrap();
        assert_eq!(ty, expected);
    }

    #[rstest]
    #[case(TokenKind::Percent, "%", Double, Int)]
    #[case(TokenKind::Amp, "&", Int, Double)]
    #[case(TokenKind::GtGt, ">>", Double, Double)]
    #[case(TokenKind::Minus, "-", Void, Int)]
    #[case(TokenKind::NotEq, "!=", Int, Void)]
    fn test_binary_rejected(
        #[case] kind: TokenKind,
        #[case] text: &str,
        #[case] left: DataType,
        #[case] right: DataType,
    ) {
        let sema = SemanticAnalyzer::new();
        let err = sema.check_binary_expr(left, &token(kind, text), right).unwrap_err();
        assert!(err.message().contains(&format!("'{text}'")));
        assert_eq!(err.lexeme(), text);
    }

    #[test]
    fn test_unary_is_identity_on_numbers() {
        let sema = SemanticAnalyzer::new();
        let minus = token(TokenKind::Minus, "-");
        assert_eq!(sema.check_unary_expr(&minus, Char).unwrap(), Char);
        assert_eq!(sema.check_unary_expr(&minus, Double).unwrap(), Double);
        assert!(sema.check_unary_expr(&minus, Void).is_err());
    }

    #[test]
    fn test_call_arguments_match_exactly() {
        let sema = SemanticAnalyzer::new();
        let f = Symbol::function("f", vec![Param::new("a", Int), Param::new("b", Double)]);
        let at = token(TokenKind::Identifier, "f");

        assert!(sema.check_call_argument(&f, 1, Int, &at).is_ok());
        let err = sema.check_call_argument(&f, 2, Int, &at).unwrap_err();
        assert!(err.message().contains("argument 2"));
        let err = sema.check_call_argument(&f, 3, Int, &at).unwrap_err();
        assert!(err.message().contains("too many arguments"));

        assert!(sema.check_arity(&f, 2, &at).is_ok());
        assert!(sema.check_arity(&f, 1, &at).is_err());
    }

    #[test]
    fn test_void_condition_rejected() {
        let sema = SemanticAnalyzer::new();
        let at = token(TokenKind::Identifier, "x");
        let err = sema.check_condition(Void, &at).unwrap_err();
        assert_eq!(err.message(), "condition of 'while' cannot be void");
        for ty in [Int, Double, Char] {
            assert!(sema.check_condition(ty, &at).is_ok());
        }
    }

    #[test]
    fn test_scope_operations() {
        let mut sema = SemanticAnalyzer::new();
        sema.add_symbol(Symbol::variable("x", Int)).unwrap();
        assert!(sema.add_symbol(Symbol::variable("x", Long)).is_none());

        sema.enter_scope();
        sema.add_symbol(Symbol::variable("x", Double)).unwrap();
        assert_eq!(sema.find_symbol("x").map(|s| s.ty), Some(Double));
        sema.leave_scope();
        sema.leave_scope();
        assert_eq!(sema.find_symbol("x").map(|s| s.ty), Some(Int));
        assert!(sema.find_symbol("missing").is_none());
    }
}
