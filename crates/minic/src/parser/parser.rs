//! Recursive descent parser for MiniC
//!
//! One method per grammar nonterminal. Declarations are registered and types
//! checked the moment a production is recognized, so a successful parse is
//! also a successful semantic check.

use log::debug;

use crate::common::{CompileError, CompileResult};
use crate::lexer::{Scanner, Token, TokenKind};
use crate::sema::{DataType, Param, ScopeTree, SemanticAnalyzer, Symbol};

type Operand<'a> = fn(&mut Parser<'a>) -> CompileResult<DataType>;

/// Recursive descent parser for MiniC
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    current: Token,
    sema: SemanticAnalyzer,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given source
    pub fn new(source: &'a str) -> CompileResult<Self> {
        let mut scanner = Scanner::new(source);
        let current = scanner.next_token();
        Self::reject_invalid(&current)?;
        Ok(Self {
            scanner,
            current,
            sema: SemanticAnalyzer::new(),
        })
    }

    /// Parse and check a complete program, handing back the scope tree
    pub fn parse(mut self) -> CompileResult<ScopeTree> {
        self.parse_decl_list()?;
        self.consume(TokenKind::Eof, "unexpected tokens after end of program")?;
        Ok(self.sema.into_scopes())
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn reject_invalid(token: &Token) -> CompileResult<()> {
        match token.fault {
            Some(fault) if token.is_error() => Err(CompileError::lexical(fault.to_string(), token)),
            _ if token.is_error() => Err(CompileError::lexical("invalid lexeme", token)),
            _ => Ok(()),
        }
    }

    fn advance(&mut self) -> CompileResult<Token> {
        let prev = std::mem::replace(&mut self.current, self.scanner.next_token());
        Self::reject_invalid(&self.current)?;
        Ok(prev)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> CompileResult<bool> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> CompileResult<Token> {
        if self.check(kind) {
            self.advance()
        } else {
            Err(self.error(message))
        }
    }

    fn consume_name(&mut self, message: &str) -> CompileResult<Token> {
        if self.current.kind.is_name() {
            self.advance()
        } else {
            Err(self.error(message))
        }
    }

    fn error(&self, message: &str) -> CompileError {
        CompileError::syntax(message, &self.current)
    }

    /// Kind of the token after the current one.
    ///
    /// The scanner is rewound to where it stood, so the current token and the
    /// line count are exactly as if nothing had been read.
    fn peek_kind(&mut self) -> TokenKind {
        let position = self.scanner.position();
        let line = self.scanner.line();
        let next = self.scanner.next_token().kind;
        self.scanner.set_position(position);
        self.scanner.set_line(line);
        next
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_decl_list(&mut self) -> CompileResult<()> {
        while self.current.kind.starts_declaration() {
            if self.check(TokenKind::Void) {
                self.parse_function()?;
            } else {
                self.parse_var_decl()?;
            }
        }

        if self.check(TokenKind::Identifier) {
            return Err(self.error(
                "unexpected identifier at global scope; missing type or function declaration?",
            ));
        }
        Ok(())
    }

    fn parse_type(&mut self) -> CompileResult<DataType> {
        if !self.current.kind.is_type_keyword() {
            return Err(self.error("expected a data type (int, double, etc.)"));
        }
        let keyword = self.advance()?;
        Ok(DataType::from_keyword(keyword.kind))
    }

    fn parse_var_decl(&mut self) -> CompileResult<()> {
        let ty = self.parse_type()?;
        self.parse_ident_list(ty)?;
        self.consume(TokenKind::Semi, "expected ';' after variable declaration")?;
        Ok(())
    }

    fn parse_ident_list(&mut self, ty: DataType) -> CompileResult<()> {
        loop {
            let name = self.consume_name("expected variable name")?;
            let symbol = Symbol::variable(&name.text, ty);
            self.sema.add_symbol(symbol.clone()).ok_or_else(|| {
                CompileError::semantic(format!("redeclaration of variable '{}'", name.text), &name)
            })?;

            if self.match_token(TokenKind::Eq)? {
                let value = self.parse_expression()?;
                self.sema.check_assignment(&symbol, value, &name)?;
            }

            if !self.match_token(TokenKind::Comma)? {
                break;
            }
        }
        Ok(())
    }

    fn parse_function(&mut self) -> CompileResult<()> {
        self.consume(TokenKind::Void, "expected 'void' in function declaration")?;
        let name = self.consume_name("expected function name (identifier or 'main')")?;
        self.consume(TokenKind::LParen, "expected '(' after function name")?;
        let params = self.parse_params()?;
        self.consume(TokenKind::RParen, "expected ')' after parameter list")?;

        // Registered before the body so the function can call itself.
        let signature = params.iter().map(|(param, _)| param.clone()).collect();
        self.sema
            .add_symbol(Symbol::function(&name.text, signature))
            .ok_or_else(|| {
                CompileError::semantic(format!("redeclaration of function '{}'", name.text), &name)
            })?;
        debug!("function '{}' with {} parameter(s)", name.text, params.len());

        self.sema.enter_scope();
        for (param, token) in params {
            self.sema
                .add_symbol(Symbol::parameter(&param.name, param.ty))
                .ok_or_else(|| {
                    CompileError::semantic(
                        format!("redeclaration of parameter '{}'", param.name),
                        &token,
                    )
                })?;
        }

        self.consume(TokenKind::LBrace, "expected '{' to open function body")?;
        self.parse_stmt_list()?;
        self.consume(TokenKind::RBrace, "expected '}' to close function body")?;
        self.sema.leave_scope();
        Ok(())
    }

    fn parse_params(&mut self) -> CompileResult<Vec<(Param, Token)>> {
        let mut params = Vec::new();
        if !self.current.kind.is_type_keyword() {
            return Ok(params);
        }

        loop {
            params.push(self.parse_param()?);
            if !self.match_token(TokenKind::Comma)? {
                break;
            }
        }

        if self.current.kind.is_type_keyword() {
            return Err(self.error("missing ',' between function parameters?"));
        }
        Ok(params)
    }

    fn parse_param(&mut self) -> CompileResult<(Param, Token)> {
        let ty = self.parse_type()?;
        let name = self.consume(TokenKind::Identifier, "expected parameter name")?;
        Ok((Param::new(&name.text, ty), name))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_stmt_list(&mut self) -> CompileResult<()> {
        while self.current.kind.starts_statement() {
            self.parse_statement()?;
        }
        Ok(())
    }

    fn parse_statement(&mut self) -> CompileResult<()> {
        match self.current.kind {
            kind if kind.is_name() => {
                if self.peek_kind() == TokenKind::LParen {
                    self.parse_call()?;
                    self.consume(TokenKind::Semi, "expected ';' after function call")?;
                } else {
                    self.parse_assignment()?;
                    self.consume(TokenKind::Semi, "expected ';' after assignment")?;
                }
                Ok(())
            }
            kind if kind.is_type_keyword() => self.parse_var_decl(),
            TokenKind::LBrace => self.parse_block(),
            TokenKind::While => self.parse_while(),
            TokenKind::Semi => {
                self.advance()?;
                Ok(())
            }
            _ => Err(self.error("expected a statement or declaration")),
        }
    }

    fn parse_block(&mut self) -> CompileResult<()> {
        self.consume(TokenKind::LBrace, "expected '{' to open compound statement")?;
        self.sema.enter_scope();
        self.parse_stmt_list()?;
        self.sema.leave_scope();
        self.consume(TokenKind::RBrace, "expected '}' to close compound statement")?;
        Ok(())
    }

    fn parse_assignment(&mut self) -> CompileResult<()> {
        let name = self.consume_name("expected variable name on the left of '='")?;
        let target = self.sema.find_symbol(&name.text).cloned().ok_or_else(|| {
            CompileError::semantic(format!("use of undeclared variable '{}'", name.text), &name)
        })?;

        self.consume(TokenKind::Eq, "expected assignment operator '='")?;
        let value = self.parse_expression()?;
        self.sema.check_assignment(&target, value, &name)
    }

    fn parse_while(&mut self) -> CompileResult<()> {
        self.consume(TokenKind::While, "expected 'while'")?;
        self.consume(TokenKind::LParen, "expected '(' after 'while'")?;
        let start = self.current.clone();
        let condition = self.parse_expression()?;
        self.sema.check_condition(condition, &start)?;
        self.consume(TokenKind::RParen, "expected ')' after 'while' condition")?;
        self.parse_statement()
    }

    fn parse_call(&mut self) -> CompileResult<()> {
        let name = self.consume_name("expected function name in call")?;
        let function = self.sema.find_symbol(&name.text).cloned().ok_or_else(|| {
            CompileError::semantic(format!("call to undeclared function '{}'", name.text), &name)
        })?;
        if !function.is_function() {
            return Err(CompileError::semantic(
                format!("'{}' is not a function", name.text),
                &name,
            ));
        }

        self.consume(TokenKind::LParen, "expected '(' in function call")?;
        self.parse_args(&function, &name)?;
        self.consume(TokenKind::RParen, "expected ')' after call arguments")?;
        Ok(())
    }

    fn parse_args(&mut self, function: &Symbol, name: &Token) -> CompileResult<()> {
        let mut given = 0;
        if !self.check(TokenKind::RParen) {
            loop {
                given += 1;
                let start = self.current.clone();
                let arg = self.parse_expression()?;
                self.sema.check_call_argument(function, given, arg, &start)?;
                if !self.match_token(TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.sema.check_arity(function, given, name)
    }

    // =========================================================================
    // Expressions (type-only evaluation)
    // =========================================================================

    /// Left-associative fold of one precedence level
    fn parse_binary_level(
        &mut self,
        operators: &[TokenKind],
        operand: Operand<'a>,
    ) -> CompileResult<DataType> {
        let mut left = operand(self)?;
        while operators.contains(&self.current.kind) {
            let op = self.advance()?;
            let right = operand(self)?;
            left = self.sema.check_binary_expr(left, &op, right)?;
        }
        Ok(left)
    }

    fn parse_expression(&mut self) -> CompileResult<DataType> {
        self.parse_binary_level(&[TokenKind::Pipe], Self::parse_xor_expression)
    }

    fn parse_xor_expression(&mut self) -> CompileResult<DataType> {
        self.parse_binary_level(&[TokenKind::Caret], Self::parse_and_expression)
    }

    fn parse_and_expression(&mut self) -> CompileResult<DataType> {
        self.parse_binary_level(&[TokenKind::Amp], Self::parse_equality_expression)
    }

    fn parse_equality_expression(&mut self) -> CompileResult<DataType> {
        self.parse_binary_level(
            &[TokenKind::EqEq, TokenKind::NotEq],
            Self::parse_relational_expression,
        )
    }

    fn parse_relational_expression(&mut self) -> CompileResult<DataType> {
        self.parse_binary_level(
            &[TokenKind::Lt, TokenKind::LtEq, TokenKind::Gt, TokenKind::GtEq],
            Self::parse_shift_expression,
        )
    }

    fn parse_shift_expression(&mut self) -> CompileResult<DataType> {
        self.parse_binary_level(
            &[TokenKind::LtLt, TokenKind::GtGt],
            Self::parse_additive_expression,
        )
    }

    fn parse_additive_expression(&mut self) -> CompileResult<DataType> {
        self.parse_binary_level(
            &[TokenKind::Plus, TokenKind::Minus],
            Self::parse_multiplicative_expression,
        )
    }

    fn parse_multiplicative_expression(&mut self) -> CompileResult<DataType> {
        self.parse_binary_level(
            &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
            Self::parse_unary_expression,
        )
    }

    fn parse_unary_expression(&mut self) -> CompileResult<DataType> {
        if matches!(self.current.kind, TokenKind::Plus | TokenKind::Minus) {
            let op = self.advance()?;
            let operand = self.parse_primary_expression()?;
            self.sema.check_unary_expr(&op, operand)
        } else {
            self.parse_primary_expression()
        }
    }

    fn parse_primary_expression(&mut self) -> CompileResult<DataType> {
        let kind = self.current.kind;

        if kind.is_name() {
            let ty = match self.sema.find_symbol(&self.current.text) {
                None => {
                    return Err(CompileError::semantic(
                        format!("use of undeclared identifier '{}'", self.current.text),
                        &self.current,
                    ));
                }
                Some(symbol) if symbol.is_function() => {
                    return Err(CompileError::semantic(
                        format!(
                            "function name '{}' cannot be used in an expression",
                            symbol.name
                        ),
                        &self.current,
                    ));
                }
                Some(symbol) => symbol.ty,
            };
            self.advance()?;
            return Ok(ty);
        }

        if let Some(ty) = DataType::of_constant(kind) {
            self.advance()?;
            return Ok(ty);
        }

        if kind == TokenKind::LParen {
            self.advance()?;
            let ty = self.parse_expression()?;
            self.consume(
                TokenKind::RParen,
                "expected ')' to close parenthesized expression",
            )?;
            return Ok(ty);
        }

        Err(self.error("expected an operand (variable, constant or parenthesized expression)"))
    }
}
