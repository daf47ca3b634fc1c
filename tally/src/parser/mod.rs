//! Recursive-descent parser
//!
//! Precedence, lowest to highest:
//!
//! ```text
//! assignment      target = value            (right-assoc)
//! logical         && ||
//! comparison      == != > < >= <=
//! additive        + - & << >> ~ | ^
//! multiplicative  * / %
//! unary           + -                        (prefix)
//! postfix         f(args)  x[index]          (chainable)
//! primary         number string identifier ( expr )
//! ```
//!
//! Statement keywords are ordinary identifiers recognised by position.

use crate::ast::{BinOp, Expr, FuncDef, IfCase, Node, Position, Program, Span, UnOp};
use crate::error::{Result, SyntaxError};
use crate::lexer::{Lexer, Token, TokenKind};
use std::cell::RefCell;
use std::rc::Rc;

#[cfg(test)]
mod property_tests;
#[cfg(test)]
mod tests;

/// Parse a whole source buffer.
///
/// The first lexical or syntax error aborts the parse.
pub fn parse(source: &str) -> Result<Program> {
    let program = Parser::new(source)?.parse_program()?;
    tracing::debug!(statements = program.statements.len(), "parsed program");
    Ok(program)
}

/// Parser state: the lexer plus one token of lookahead
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token,
    previous_end: Position,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Result<Self> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            previous_end: Position::default(),
        })
    }

    pub fn parse_program(&mut self) -> Result<Program> {
        let mut statements = Vec::new();
        while !self.check(&TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement()? {
                statements.push(stmt);
            }
        }
        Ok(Program::new(statements))
    }

    // ---- token plumbing ----

    fn advance(&mut self) -> Result<Token> {
        let next = self.lexer.next_token()?;
        let token = std::mem::replace(&mut self.current, next);
        self.previous_end = token.span.end;
        Ok(token)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.current.kind == kind
    }

    fn at_keyword(&self, word: &str) -> bool {
        self.current.kind.is_keyword(word)
    }

    fn eat(&mut self, kind: &TokenKind) -> Result<bool> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.check(&kind) {
            self.advance()
        } else {
            Err(SyntaxError::parser(
                format!("expected {kind}, found {}", self.current.kind),
                self.current.span,
            ))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match &self.current.kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance()?;
                Ok(name)
            }
            other => Err(SyntaxError::parser(
                format!("expected identifier, found {other}"),
                self.current.span,
            )),
        }
    }

    fn unexpected(&self) -> SyntaxError {
        SyntaxError::parser(format!("unexpected {}", self.current.kind), self.current.span)
    }

    fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.previous_end)
    }

    /// Consume a statement terminator. `;` may be left out before `}` or at
    /// the end of input.
    fn end_statement(&mut self) -> Result<()> {
        if self.eat(&TokenKind::Semi)? || self.check(&TokenKind::RBrace) || self.check(&TokenKind::Eof) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    // ---- statements ----

    /// One statement. `None` for the constructs that parse but build nothing
    /// (`class`, `new`, `import`).
    fn parse_statement(&mut self) -> Result<Option<Node>> {
        if self.check(&TokenKind::LBrace) {
            return self.parse_block().map(Some);
        }

        let start = self.current.span.start;
        let keyword = match &self.current.kind {
            TokenKind::Ident(word) => word.clone(),
            _ => String::new(),
        };

        let node = match keyword.as_str() {
            "let" => {
                let node = self.parse_let()?;
                self.end_statement()?;
                node
            }
            "if" => self.parse_if()?,
            "for" => self.parse_for()?,
            "while" => self.parse_while()?,
            "func" => self.parse_func()?,
            "return" => {
                self.advance()?;
                let value = if self.check(&TokenKind::Semi)
                    || self.check(&TokenKind::RBrace)
                    || self.check(&TokenKind::Eof)
                {
                    None
                } else {
                    Some(Box::new(self.parse_expression()?))
                };
                let node = Node::new(Expr::Return(value), self.span_from(start));
                self.end_statement()?;
                node
            }
            "break" | "continue" => {
                self.advance()?;
                let expr = if keyword == "break" { Expr::Break } else { Expr::Continue };
                let node = Node::new(expr, self.span_from(start));
                self.end_statement()?;
                node
            }
            "class" => {
                self.advance()?;
                self.expect_ident()?;
                self.expect(TokenKind::LBrace)?;
                self.parse_statements_until_brace()?;
                self.expect(TokenKind::RBrace)?;
                tracing::trace!("discarded class declaration");
                return Ok(None);
            }
            "new" => {
                self.advance()?;
                self.expect_ident()?;
                self.expect(TokenKind::LParen)?;
                self.parse_arguments()?;
                self.expect(TokenKind::RParen)?;
                self.end_statement()?;
                tracing::trace!("discarded object construction");
                return Ok(None);
            }
            "import" => {
                self.advance()?;
                self.expect_ident()?;
                self.end_statement()?;
                tracing::trace!("discarded import");
                return Ok(None);
            }
            _ => {
                let node = self.parse_expression()?;
                self.end_statement()?;
                node
            }
        };
        Ok(Some(node))
    }

    /// `let name = value`, without the terminator
    fn parse_let(&mut self) -> Result<Node> {
        let start = self.current.span.start;
        self.advance()?;
        let name_start = self.current.span.start;
        let name = self.expect_ident()?;
        let target = Node::new(Expr::Ident(name), self.span_from(name_start));
        self.expect(TokenKind::Eq)?;
        let value = self.parse_expression()?;
        Ok(Node::new(
            Expr::Assign {
                target: Box::new(target),
                value: Box::new(value),
                postfix: false,
            },
            self.span_from(start),
        ))
    }

    /// Brace-delimited block, or a single statement
    fn parse_code_block(&mut self) -> Result<Node> {
        if self.check(&TokenKind::LBrace) {
            return self.parse_block();
        }
        let start = self.current.span.start;
        match self.parse_statement()? {
            Some(node) => Ok(node),
            None => Ok(Node::new(Expr::Block(Vec::new()), self.span_from(start))),
        }
    }

    fn parse_block(&mut self) -> Result<Node> {
        let start = self.expect(TokenKind::LBrace)?.span.start;
        let statements = self.parse_statements_until_brace()?;
        self.expect(TokenKind::RBrace)?;
        Ok(Node::new(Expr::Block(statements), self.span_from(start)))
    }

    fn parse_statements_until_brace(&mut self) -> Result<Vec<Node>> {
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.check(&TokenKind::Eof) {
                return Err(SyntaxError::parser("expected '}', found end of input", self.current.span));
            }
            if let Some(stmt) = self.parse_statement()? {
                statements.push(stmt);
            }
        }
        Ok(statements)
    }

    fn parse_condition(&mut self) -> Result<Node> {
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        Ok(condition)
    }

    fn parse_if(&mut self) -> Result<Node> {
        let start = self.advance()?.span.start;
        let condition = self.parse_condition()?;
        let body = self.parse_code_block()?;
        let mut cases = vec![IfCase { condition, body }];
        let mut else_body = None;

        while self.at_keyword("else") {
            self.advance()?;
            if self.at_keyword("if") {
                self.advance()?;
                let condition = self.parse_condition()?;
                let body = self.parse_code_block()?;
                cases.push(IfCase { condition, body });
            } else {
                else_body = Some(Box::new(self.parse_code_block()?));
                break;
            }
        }

        Ok(Node::new(Expr::If { cases, else_body }, self.span_from(start)))
    }

    fn parse_for(&mut self) -> Result<Node> {
        let start = self.advance()?.span.start;
        self.expect(TokenKind::LParen)?;
        let init = if self.at_keyword("let") {
            self.parse_let()?
        } else {
            self.parse_expression()?
        };
        self.expect(TokenKind::Semi)?;
        let cond = self.parse_expression()?;
        self.expect(TokenKind::Semi)?;
        let step = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_code_block()?;

        Ok(Node::new(
            Expr::For {
                init: Box::new(init),
                cond: Box::new(cond),
                step: Box::new(step),
                body: Box::new(body),
            },
            self.span_from(start),
        ))
    }

    fn parse_while(&mut self) -> Result<Node> {
        let start = self.advance()?.span.start;
        let cond = self.parse_condition()?;
        let body = self.parse_code_block()?;
        Ok(Node::new(
            Expr::While {
                cond: Box::new(cond),
                body: Box::new(body),
            },
            self.span_from(start),
        ))
    }

    /// `func name(a, b) body`
    fn parse_func(&mut self) -> Result<Node> {
        let start = self.advance()?.span.start;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            params.push(self.expect_ident()?);
            while self.eat(&TokenKind::Comma)? {
                params.push(self.expect_ident()?);
            }
        }
        self.expect(TokenKind::RParen)?;

        let body = match self.parse_code_block()? {
            Node { node: Expr::Block(statements), .. } => statements,
            single => vec![single],
        };
        let span = self.span_from(start);
        let def = FuncDef { name, params, body, span };
        Ok(Node::new(Expr::FuncDef(Rc::new(def)), span))
    }

    // ---- expressions ----

    pub fn parse_expression(&mut self) -> Result<Node> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Node> {
        let target = self.parse_logical()?;
        if self.eat(&TokenKind::Eq)? {
            let value = self.parse_assignment()?;
            let span = target.span.merge(value.span);
            return Ok(Node::new(
                Expr::Assign {
                    target: Box::new(target),
                    value: Box::new(value),
                    postfix: false,
                },
                span,
            ));
        }
        Ok(target)
    }

    /// Left-associative loop shared by every binary tier
    fn parse_binary_tier(
        &mut self,
        operator: fn(&TokenKind) -> Option<BinOp>,
        operand: fn(&mut Self) -> Result<Node>,
    ) -> Result<Node> {
        let mut left = operand(self)?;
        while let Some(op) = operator(&self.current.kind) {
            self.advance()?;
            let right = operand(self)?;
            let span = left.span.merge(right.span);
            left = Node::new(
                Expr::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn parse_logical(&mut self) -> Result<Node> {
        self.parse_binary_tier(
            |kind| match kind {
                TokenKind::AmpAmp => Some(BinOp::And),
                TokenKind::PipePipe => Some(BinOp::Or),
                _ => None,
            },
            Self::parse_comparison,
        )
    }

    fn parse_comparison(&mut self) -> Result<Node> {
        self.parse_binary_tier(
            |kind| match kind {
                TokenKind::EqEq => Some(BinOp::Eq),
                TokenKind::NotEq => Some(BinOp::Ne),
                TokenKind::Gt => Some(BinOp::Gt),
                TokenKind::Lt => Some(BinOp::Lt),
                TokenKind::GtEq => Some(BinOp::Ge),
                TokenKind::LtEq => Some(BinOp::Le),
                _ => None,
            },
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> Result<Node> {
        self.parse_binary_tier(
            |kind| match kind {
                TokenKind::Plus => Some(BinOp::Add),
                TokenKind::Minus => Some(BinOp::Sub),
                TokenKind::Amp => Some(BinOp::BitAnd),
                TokenKind::LtLt => Some(BinOp::Shl),
                TokenKind::GtGt => Some(BinOp::Shr),
                TokenKind::Tilde => Some(BinOp::BitNot),
                TokenKind::Pipe => Some(BinOp::BitOr),
                TokenKind::Caret => Some(BinOp::BitXor),
                _ => None,
            },
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> Result<Node> {
        self.parse_binary_tier(
            |kind| match kind {
                TokenKind::Star => Some(BinOp::Mul),
                TokenKind::Slash => Some(BinOp::Div),
                TokenKind::Percent => Some(BinOp::Mod),
                _ => None,
            },
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> Result<Node> {
        let op = match self.current.kind {
            TokenKind::Plus => UnOp::Plus,
            TokenKind::Minus => UnOp::Neg,
            _ => return self.parse_postfix(),
        };
        let start = self.advance()?.span.start;
        let operand = self.parse_unary()?;
        Ok(Node::new(
            Expr::Unary {
                op,
                operand: Box::new(operand),
            },
            self.span_from(start),
        ))
    }

    /// Calls and indexing, applied left to right: `f(1)(2)[0]`
    fn parse_postfix(&mut self) -> Result<Node> {
        let mut node = self.parse_primary()?;
        loop {
            if self.eat(&TokenKind::LParen)? {
                let args = self.parse_arguments()?;
                self.expect(TokenKind::RParen)?;
                let span = self.span_from(node.start());
                node = Node::new(
                    Expr::Call {
                        callee: Box::new(node),
                        args,
                    },
                    span,
                );
            } else if self.eat(&TokenKind::LBracket)? {
                let index = self.parse_expression()?;
                self.expect(TokenKind::RBracket)?;
                let span = self.span_from(node.start());
                node = Node::new(
                    Expr::Index {
                        target: Box::new(node),
                        index: Box::new(index),
                    },
                    span,
                );
            } else {
                return Ok(node);
            }
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Node>> {
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            args.push(self.parse_expression()?);
            while self.eat(&TokenKind::Comma)? {
                args.push(self.parse_expression()?);
            }
        }
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Node> {
        match &self.current.kind {
            TokenKind::Number(text) => {
                let expr = Expr::Number(text.clone());
                let token = self.advance()?;
                Ok(Node::new(expr, token.span))
            }
            TokenKind::Str(text) => {
                let expr = Expr::Str(RefCell::new(text.clone()));
                let token = self.advance()?;
                Ok(Node::new(expr, token.span))
            }
            TokenKind::Ident(name) => {
                let name = name.clone();
                let token = self.advance()?;
                self.parse_identifier_suffix(name, token.span)
            }
            TokenKind::LParen => {
                self.advance()?;
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Eof => Err(SyntaxError::parser("unexpected end of input", self.current.span)),
            _ => Err(self.unexpected()),
        }
    }

    /// `name++` / `name--` become `name = ++name` marked as postfix.
    fn parse_identifier_suffix(&mut self, name: String, span: Span) -> Result<Node> {
        let op = match self.current.kind {
            TokenKind::PlusPlus => UnOp::Inc,
            TokenKind::MinusMinus => UnOp::Dec,
            _ => return Ok(Node::new(Expr::Ident(name), span)),
        };
        let op_token = self.advance()?;
        let full = span.merge(op_token.span);
        let operand = Node::new(Expr::Ident(name), span);
        let value = Node::new(
            Expr::Unary {
                op,
                operand: Box::new(operand.clone()),
            },
            full,
        );
        Ok(Node::new(
            Expr::Assign {
                target: Box::new(operand),
                value: Box::new(value),
                postfix: true,
            },
            full,
        ))
    }
}
