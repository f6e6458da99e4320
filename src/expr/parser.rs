//! Recursive-descent parser producing the expression-script AST.

use super::error::ExprError;
use super::lexer::{tokenize, Token, TokenKind};

/// A parsed expression script: a sequence of statements.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Stmt {
    /// `return;` or `return expr;`
    Return(Option<Expr>),
    /// `var name = expr;` or `name = expr;`
    Assign { name: String, expr: Expr },
    /// A bare expression evaluated for effect (there are none; kept for parity).
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Array(Vec<Expr>),
    Ident(String),
    Member {
        object: Box<Expr>,
        field: String,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

pub(crate) fn parse(source: &str) -> Result<Program, ExprError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    parser.program()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn peek_at(&self, ahead: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + ahead).map(|t| &t.kind)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|t| t.offset)
            .unwrap_or_else(|| self.tokens.last().map(|t| t.offset + 1).unwrap_or(0))
    }

    fn advance(&mut self) -> Option<TokenKind> {
        let kind = self.tokens.get(self.pos).map(|t| t.kind.clone());
        self.pos += 1;
        kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), ExprError> {
        if self.eat(&kind) {
            Ok(())
        } else {
            Err(ExprError::syntax(self.offset(), format!("expected {}", what)))
        }
    }

    fn program(&mut self) -> Result<Program, ExprError> {
        let mut statements = Vec::new();
        while self.peek().is_some() {
            // Tolerate empty statements
            if self.eat(&TokenKind::Semi) {
                continue;
            }
            statements.push(self.statement()?);
            if self.peek().is_some() {
                self.expect(TokenKind::Semi, "';' between statements")?;
            }
        }
        Ok(Program { statements })
    }

    fn statement(&mut self) -> Result<Stmt, ExprError> {
        match self.peek() {
            Some(TokenKind::Return) => {
                self.advance();
                if self.peek().is_none() || self.peek() == Some(&TokenKind::Semi) {
                    Ok(Stmt::Return(None))
                } else {
                    Ok(Stmt::Return(Some(self.expression()?)))
                }
            }
            Some(TokenKind::Var) => {
                self.advance();
                let name = match self.advance() {
                    Some(TokenKind::Ident(name)) => name,
                    _ => {
                        return Err(ExprError::syntax(
                            self.offset(),
                            "expected identifier after 'var'",
                        ))
                    }
                };
                self.expect(TokenKind::Eq, "'=' in variable declaration")?;
                Ok(Stmt::Assign {
                    name,
                    expr: self.expression()?,
                })
            }
            Some(TokenKind::Ident(_)) if self.peek_at(1) == Some(&TokenKind::Eq) => {
                let name = match self.advance() {
                    Some(TokenKind::Ident(name)) => name,
                    _ => unreachable!("peeked identifier"),
                };
                self.advance(); // '='
                Ok(Stmt::Assign {
                    name,
                    expr: self.expression()?,
                })
            }
            _ => Ok(Stmt::Expr(self.expression()?)),
        }
    }

    fn expression(&mut self) -> Result<Expr, ExprError> {
        self.ternary()
    }

    fn ternary(&mut self) -> Result<Expr, ExprError> {
        let cond = self.logical_or()?;
        if self.eat(&TokenKind::Question) {
            let then = self.expression()?;
            self.expect(TokenKind::Colon, "':' in conditional expression")?;
            let otherwise = self.expression()?;
            return Ok(Expr::Ternary {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            });
        }
        Ok(cond)
    }

    fn logical_or(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.logical_and()?;
        while self.eat(&TokenKind::OrOr) {
            let rhs = self.logical_and()?;
            lhs = binary(BinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn logical_and(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.equality()?;
        while self.eat(&TokenKind::AndAnd) {
            let rhs = self.equality()?;
            lhs = binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn equality(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.comparison()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::EqEq) => BinaryOp::Eq,
                Some(TokenKind::BangEq) => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let rhs = self.comparison()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn comparison(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.additive()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Lt) => BinaryOp::Lt,
                Some(TokenKind::LtEq) => BinaryOp::Le,
                Some(TokenKind::Gt) => BinaryOp::Gt,
                Some(TokenKind::GtEq) => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let rhs = self.additive()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn additive(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.multiplicative()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn multiplicative(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Star) => BinaryOp::Mul,
                Some(TokenKind::Slash) => BinaryOp::Div,
                Some(TokenKind::Percent) => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let rhs = self.unary()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        let op = match self.peek() {
            Some(TokenKind::Bang) => Some(UnaryOp::Not),
            Some(TokenKind::Minus) => Some(UnaryOp::Neg),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let expr = self.unary()?;
            return Ok(Expr::Unary {
                op,
                expr: Box::new(expr),
            });
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.primary()?;
        loop {
            if self.eat(&TokenKind::Dot) {
                let field = match self.advance() {
                    Some(TokenKind::Ident(name)) => name,
                    _ => {
                        return Err(ExprError::syntax(
                            self.offset(),
                            "expected property name after '.'",
                        ))
                    }
                };
                expr = Expr::Member {
                    object: Box::new(expr),
                    field,
                };
                continue;
            }
            if self.eat(&TokenKind::LBracket) {
                let index = self.expression()?;
                self.expect(TokenKind::RBracket, "']' after index expression")?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                };
                continue;
            }
            break;
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        let offset = self.offset();
        match self.advance() {
            Some(TokenKind::Number(value)) => Ok(Expr::Number(value)),
            Some(TokenKind::Str(value)) => Ok(Expr::Str(value)),
            Some(TokenKind::True) => Ok(Expr::Bool(true)),
            Some(TokenKind::False) => Ok(Expr::Bool(false)),
            Some(TokenKind::Null) => Ok(Expr::Null),
            Some(TokenKind::Ident(name)) => Ok(Expr::Ident(name)),
            Some(TokenKind::LParen) => {
                let expr = self.expression()?;
                self.expect(TokenKind::RParen, "')' after expression")?;
                Ok(expr)
            }
            Some(TokenKind::LBracket) => {
                let mut items = Vec::new();
                if !self.eat(&TokenKind::RBracket) {
                    loop {
                        items.push(self.expression()?);
                        if self.eat(&TokenKind::Comma) {
                            continue;
                        }
                        self.expect(TokenKind::RBracket, "']' after array literal")?;
                        break;
                    }
                }
                Ok(Expr::Array(items))
            }
            Some(other) => Err(ExprError::syntax(
                offset,
                format!("unexpected token {:?}", other),
            )),
            None => Err(ExprError::syntax(offset, "unexpected end of script")),
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}
