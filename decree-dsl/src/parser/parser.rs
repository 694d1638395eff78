//! Parser implementation

use super::ast::*;
use crate::lexer::*;

/// Parse error with line/column information.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Syntax error at line {}, column {}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// Parse a complete policy document: one or more statements.
pub fn parse_policy(source: &str) -> Result<PolicyAst, ParseError> {
    let tokens = Lexer::new(source).tokenize();
    Parser::new(tokens).parse_policy_document()
}

/// Parse a single statement-level fragment: one statement, or a bare
/// `when` clause (a guard continuation line). More permissive than the
/// policy rule — a guard is never a valid standalone policy.
pub fn parse_snippet(source: &str) -> Result<Fragment, ParseError> {
    let tokens = Lexer::new(source).tokenize();
    Parser::new(tokens).parse_fragment()
}

/// Recursive-descent parser over a token vector.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a new parser from a vector of tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Policy start rule: newline-separated statements, at least one,
    /// terminated at EOF.
    pub fn parse_policy_document(&mut self) -> Result<PolicyAst, ParseError> {
        self.fail_on_lexer_errors()?;
        self.skip_newlines();

        let mut statements = Vec::new();

        while !self.is_at_end() {
            statements.push(self.parse_statement()?);

            if !self.is_at_end() {
                self.expect(TokenKind::Newline)?;
                self.skip_newlines();
            }
        }

        if statements.is_empty() {
            return Err(self.error("Expected at least one statement"));
        }

        Ok(PolicyAst { statements })
    }

    /// Snippet start rule: exactly one statement or one bare guard.
    pub fn parse_fragment(&mut self) -> Result<Fragment, ParseError> {
        self.fail_on_lexer_errors()?;
        self.skip_newlines();

        let fragment = if self.check(&TokenKind::When) {
            let span = self.current().span;
            let condition = self.parse_when_clause()?;
            Fragment::Guard(Guard { condition, span })
        } else {
            Fragment::Statement(self.parse_statement()?)
        };

        self.skip_newlines();
        if !self.is_at_end() {
            return Err(self.error("Expected end of fragment"));
        }

        Ok(fragment)
    }

    /// Surface the first lexer error before any grammar work.
    fn fail_on_lexer_errors(&self) -> Result<(), ParseError> {
        if let Some(token) = self
            .tokens
            .iter()
            .find(|t| matches!(t.kind, TokenKind::Error(_)))
        {
            let message = match &token.kind {
                TokenKind::Error(msg) => msg.clone(),
                _ => "Lexer error".to_string(),
            };
            return Err(ParseError {
                message,
                line: token.span.line,
                column: token.span.column,
            });
        }
        Ok(())
    }

    /// Parse a single statement:
    /// `effect subject action on resource [when condition]`.
    /// The `when` clause may start on the following line.
    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let span = self.current().span;

        let effect = match &self.current().kind {
            TokenKind::Allow => {
                self.advance();
                Effect::Allow
            }
            TokenKind::Deny => {
                self.advance();
                Effect::Deny
            }
            _ => return Err(self.error("Expected 'allow' or 'deny'")),
        };

        let subject = self.parse_entity("subject")?;
        let action = self.expect_identifier("action")?;
        self.expect(TokenKind::On)?;
        let resource = self.parse_entity("resource")?;

        let condition = if self.check(&TokenKind::When) {
            Some(self.parse_when_clause()?)
        } else if self.newlines_then_when() {
            self.skip_newlines();
            Some(self.parse_when_clause()?)
        } else {
            None
        };

        Ok(Statement {
            effect,
            subject,
            action,
            resource,
            condition,
            span,
        })
    }

    /// Parse a subject or resource: `*`, `name`, `kind:name`, `kind:*`.
    fn parse_entity(&mut self, what: &str) -> Result<Entity, ParseError> {
        match &self.current().kind {
            TokenKind::Star => {
                self.advance();
                Ok(Entity {
                    kind: None,
                    name: Pattern::Any,
                })
            }
            TokenKind::Identifier(s) => {
                let first = s.clone();
                self.advance();

                if self.check(&TokenKind::Colon) {
                    self.advance();
                    let name = match &self.current().kind {
                        TokenKind::Star => {
                            self.advance();
                            Pattern::Any
                        }
                        TokenKind::Identifier(n) => {
                            let n = n.clone();
                            self.advance();
                            Pattern::Exact(n)
                        }
                        _ => return Err(self.error(&format!("Expected {} name after ':'", what))),
                    };
                    Ok(Entity {
                        kind: Some(first),
                        name,
                    })
                } else {
                    Ok(Entity {
                        kind: None,
                        name: Pattern::Exact(first),
                    })
                }
            }
            _ => Err(self.error(&format!("Expected {}", what))),
        }
    }

    /// Parse `when <or-expr>`.
    fn parse_when_clause(&mut self) -> Result<CondExpr, ParseError> {
        self.expect(TokenKind::When)?;
        self.parse_or_expr()
    }

    fn parse_or_expr(&mut self) -> Result<CondExpr, ParseError> {
        let mut left = self.parse_and_expr()?;

        while self.check(&TokenKind::Or) {
            self.advance();
            let right = self.parse_and_expr()?;
            left = CondExpr::Or(Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    fn parse_and_expr(&mut self) -> Result<CondExpr, ParseError> {
        let mut left = self.parse_unary_expr()?;

        while self.check(&TokenKind::And) {
            self.advance();
            let right = self.parse_unary_expr()?;
            left = CondExpr::And(Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    fn parse_unary_expr(&mut self) -> Result<CondExpr, ParseError> {
        if self.check(&TokenKind::Not) {
            self.advance();
            let inner = self.parse_unary_expr()?;
            return Ok(CondExpr::Not(Box::new(inner)));
        }
        self.parse_primary_expr()
    }

    fn parse_primary_expr(&mut self) -> Result<CondExpr, ParseError> {
        if self.check(&TokenKind::LParen) {
            self.advance();
            let expr = self.parse_or_expr()?;
            self.expect(TokenKind::RParen)?;
            return Ok(expr);
        }

        let attr = self.parse_attr_path()?;

        match &self.current().kind {
            TokenKind::Eq => self.parse_comparison(attr, CompareOp::Eq),
            TokenKind::Ne => self.parse_comparison(attr, CompareOp::Ne),
            TokenKind::Lt => self.parse_comparison(attr, CompareOp::Lt),
            TokenKind::Le => self.parse_comparison(attr, CompareOp::Le),
            TokenKind::Gt => self.parse_comparison(attr, CompareOp::Gt),
            TokenKind::Ge => self.parse_comparison(attr, CompareOp::Ge),
            TokenKind::Contains => self.parse_comparison(attr, CompareOp::Contains),
            TokenKind::In => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let mut values = Vec::new();
                while !self.check(&TokenKind::RParen) {
                    values.push(self.parse_value()?);
                    self.optional_comma();
                }
                self.expect(TokenKind::RParen)?;
                Ok(CondExpr::Membership { attr, values })
            }
            _ => Err(self.error("Expected comparison operator")),
        }
    }

    fn parse_comparison(&mut self, attr: String, op: CompareOp) -> Result<CondExpr, ParseError> {
        self.advance();
        let value = self.parse_value()?;
        Ok(CondExpr::Compare { attr, op, value })
    }

    /// Parse a dotted attribute path: `ident ('.' ident)*`.
    fn parse_attr_path(&mut self) -> Result<String, ParseError> {
        let mut path = self.expect_identifier("attribute")?;

        while self.check(&TokenKind::Dot) {
            self.advance();
            path.push('.');
            path.push_str(&self.expect_identifier("attribute")?);
        }

        Ok(path)
    }

    fn parse_value(&mut self) -> Result<CondValue, ParseError> {
        match &self.current().kind {
            TokenKind::String(s) => {
                let s = s.clone();
                self.advance();
                Ok(CondValue::Str(s))
            }
            TokenKind::Number(n) => {
                let n = *n;
                self.advance();
                Ok(CondValue::Num(n))
            }
            TokenKind::Identifier(s) => {
                let s = s.clone();
                self.advance();
                Ok(CondValue::Ident(s))
            }
            _ => Err(self.error("Expected value (string, number, or identifier)")),
        }
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.check(&kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(&format!("Expected {:?}", kind)))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<String, ParseError> {
        match &self.current().kind {
            TokenKind::Identifier(s) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            _ => Err(self.error(&format!("Expected {}", what))),
        }
    }

    fn optional_comma(&mut self) {
        if self.check(&TokenKind::Comma) {
            self.advance();
        }
    }

    fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    /// Lookahead: are we at one or more newlines followed by `when`?
    /// Lets a statement's guard continue on the next line.
    fn newlines_then_when(&self) -> bool {
        let mut i = self.pos;
        if !matches!(self.tokens[i].kind, TokenKind::Newline) {
            return false;
        }
        while matches!(self.tokens[i].kind, TokenKind::Newline) {
            i += 1;
        }
        matches!(self.tokens[i].kind, TokenKind::When)
    }

    fn error(&self, msg: &str) -> ParseError {
        let span = self.current().span;
        ParseError {
            message: msg.to_string(),
            line: span.line,
            column: span.column,
        }
    }
}
