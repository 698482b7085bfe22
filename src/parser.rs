use crate::ast::{DeclarationList, Expr, Ident, Stmt};
use crate::diagnostics::{FailureKind, RuntimeError};
use crate::lexer::{Token, TokenKind};
use crate::trace::trace_log;

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek_kind_at(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(&kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn match_any(&mut self, kinds: &[TokenKind]) -> Option<TokenKind> {
        for kind in kinds {
            if self.check(kind) {
                self.pos += 1;
                return Some(kind.clone());
            }
        }
        None
    }

    fn consume_kind(&mut self, kind: TokenKind) -> Result<Token, RuntimeError> {
        if self.check(&kind) {
            let token = self.current().clone();
            self.pos += 1;
            Ok(token)
        } else {
            let token = self.current();
            Err(RuntimeError::syntax(
                format!("expected {:?}, found {:?}", kind, token.kind),
                token.line,
                token.column,
            ))
        }
    }

    fn match_ident(&mut self, name: &str) -> bool {
        if let TokenKind::Ident(s) = self.peek_kind() {
            if s == name {
                self.pos += 1;
                return true;
            }
        }
        false
    }

    fn consume_ident(&mut self) -> Result<Ident, RuntimeError> {
        let token = self.current().clone();
        if let TokenKind::Ident(name) = token.kind {
            self.pos += 1;
            Ok(Ident {
                name,
                line: token.line,
                column: token.column,
            })
        } else {
            Err(RuntimeError::syntax(
                format!("expected identifier, found {:?}", token.kind),
                token.line,
                token.column,
            ))
        }
    }

    pub(crate) fn parse_program(&mut self) -> Result<Vec<Stmt>, RuntimeError> {
        trace_log!("parse", "parser start, {} tokens", self.tokens.len());
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::Eof) {
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, RuntimeError> {
        let (line, column) = {
            let token = self.current();
            (token.line, token.column)
        };
        if self.match_kind(TokenKind::LBrace) {
            let body = self.parse_block_body()?;
            return Ok(Stmt::Block(body));
        }
        if self.match_ident("let") {
            return Ok(Stmt::Let(self.parse_let_stmt(line, column)?));
        }
        if self.match_ident("fn") {
            return self.parse_fn_decl(line, column);
        }
        if self.match_ident("return") {
            let mut exprs = Vec::new();
            if !self.check(&TokenKind::Semicolon) && !self.check(&TokenKind::Eof) {
                exprs.push(self.parse_expr()?);
                while self.match_kind(TokenKind::Comma) {
                    exprs.push(self.parse_expr()?);
                }
            }
            self.match_kind(TokenKind::Semicolon);
            return Ok(Stmt::Return { exprs, line, column });
        }
        if self.match_ident("if") {
            return self.parse_if_stmt();
        }
        if self.match_ident("while") {
            let cond = self.parse_expr()?;
            let body = self.parse_block()?;
            return Ok(Stmt::While { cond, body });
        }
        if self.match_ident("for") {
            let var = self.consume_ident()?.name;
            if !self.match_ident("in") {
                let token = self.current();
                return Err(RuntimeError::syntax(
                    "expected 'in' after for-loop variable",
                    token.line,
                    token.column,
                ));
            }
            let iterable = self.parse_expr()?;
            let body = self.parse_block()?;
            return Ok(Stmt::For { var, iterable, body });
        }
        // `name = expr` is assignment; anything else is an expression statement.
        if matches!(self.peek_kind(), TokenKind::Ident(_))
            && matches!(self.peek_kind_at(1), Some(TokenKind::Eq))
        {
            let name = self.consume_ident()?.name;
            self.pos += 1; // '='
            let expr = self.parse_expr()?;
            self.match_kind(TokenKind::Semicolon);
            return Ok(Stmt::Assign {
                name,
                expr,
                line,
                column,
            });
        }
        let expr = self.parse_expr()?;
        self.match_kind(TokenKind::Semicolon);
        Ok(Stmt::Expr(expr))
    }

    /// Parse everything after the `let` keyword up to the statement
    /// delimiter, producing exactly one `DeclarationList` or a syntax
    /// failure. `line`/`column` locate the start of the statement.
    ///
    /// The shape is decided by a single token of lookahead: a comma before
    /// the first `=` always means a multi-valued declaration; it is never
    /// reinterpreted as separating two independent declarations.
    pub(crate) fn parse_let_stmt(
        &mut self,
        line: usize,
        column: usize,
    ) -> Result<DeclarationList, RuntimeError> {
        let first = self.consume_ident()?;
        if self.match_kind(TokenKind::Comma) {
            // Identifier run: collect the remaining names greedily.
            let mut names = vec![first];
            loop {
                names.push(self.consume_ident()?);
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
            if self.check(&TokenKind::Semicolon) || self.check(&TokenKind::Eof) {
                return Err(RuntimeError::failure(
                    FailureKind::MissingInitializer,
                    line,
                    column,
                ));
            }
            if !self.match_kind(TokenKind::Eq) {
                return Err(RuntimeError::failure(FailureKind::MixedForm, line, column));
            }
            if self.check(&TokenKind::Semicolon) {
                return Err(RuntimeError::failure(
                    FailureKind::MissingInitializer,
                    line,
                    column,
                ));
            }
            let expr = self.parse_expr()?;
            // A second comma-separated value would need unpacking syntax,
            // which this language does not have.
            if self.check(&TokenKind::Comma) {
                return Err(RuntimeError::failure(FailureKind::MixedForm, line, column));
            }
            self.consume_kind(TokenKind::Semicolon)?;
            trace_log!("parse", "let: multi-value, {} names", names.len());
            return Ok(DeclarationList::MultiValue {
                names,
                expr,
                line,
                column,
            });
        }
        if !self.match_kind(TokenKind::Eq) {
            return Err(RuntimeError::failure(
                FailureKind::MissingInitializer,
                line,
                column,
            ));
        }
        if self.check(&TokenKind::Semicolon) {
            return Err(RuntimeError::failure(
                FailureKind::MissingInitializer,
                line,
                column,
            ));
        }
        let mut decls = vec![(first, self.parse_expr()?)];
        while self.match_kind(TokenKind::Comma) {
            let ident = self.consume_ident()?;
            if !self.match_kind(TokenKind::Eq) {
                return Err(RuntimeError::failure(
                    FailureKind::MissingInitializer,
                    line,
                    column,
                ));
            }
            if self.check(&TokenKind::Semicolon) {
                return Err(RuntimeError::failure(
                    FailureKind::MissingInitializer,
                    line,
                    column,
                ));
            }
            decls.push((ident, self.parse_expr()?));
        }
        self.consume_kind(TokenKind::Semicolon)?;
        trace_log!("parse", "let: independent, {} pairs", decls.len());
        Ok(DeclarationList::Independent {
            decls,
            line,
            column,
        })
    }

    fn parse_fn_decl(&mut self, line: usize, column: usize) -> Result<Stmt, RuntimeError> {
        let name = self.consume_ident()?.name;
        self.consume_kind(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            params.push(self.consume_ident()?.name);
            while self.match_kind(TokenKind::Comma) {
                params.push(self.consume_ident()?.name);
            }
        }
        self.consume_kind(TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(Stmt::FnDecl {
            name,
            params,
            body,
            line,
            column,
        })
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt, RuntimeError> {
        let cond = self.parse_expr()?;
        let then_branch = self.parse_block()?;
        let else_branch = if self.match_ident("else") {
            if self.match_ident("if") {
                vec![self.parse_if_stmt()?]
            } else {
                self.parse_block()?
            }
        } else {
            Vec::new()
        };
        Ok(Stmt::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, RuntimeError> {
        self.consume_kind(TokenKind::LBrace)?;
        self.parse_block_body()
    }

    fn parse_block_body(&mut self) -> Result<Vec<Stmt>, RuntimeError> {
        let mut body = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.check(&TokenKind::Eof) {
            body.push(self.parse_stmt()?);
        }
        self.consume_kind(TokenKind::RBrace)?;
        Ok(body)
    }

    pub(crate) fn parse_expr(&mut self) -> Result<Expr, RuntimeError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, RuntimeError> {
        let mut left = self.parse_and()?;
        while self.match_kind(TokenKind::OrOr) {
            let right = self.parse_and()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: TokenKind::OrOr,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, RuntimeError> {
        let mut left = self.parse_equality()?;
        while self.match_kind(TokenKind::AndAnd) {
            let right = self.parse_equality()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: TokenKind::AndAnd,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, RuntimeError> {
        let mut left = self.parse_comparison()?;
        while let Some(op) = self.match_any(&[TokenKind::EqEq, TokenKind::BangEq]) {
            let right = self.parse_comparison()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, RuntimeError> {
        let mut left = self.parse_additive()?;
        while let Some(op) = self.match_any(&[
            TokenKind::Lt,
            TokenKind::Lte,
            TokenKind::Gt,
            TokenKind::Gte,
        ]) {
            let right = self.parse_additive()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, RuntimeError> {
        let mut left = self.parse_multiplicative()?;
        while let Some(op) = self.match_any(&[TokenKind::Plus, TokenKind::Minus]) {
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, RuntimeError> {
        let mut left = self.parse_unary()?;
        while let Some(op) =
            self.match_any(&[TokenKind::Star, TokenKind::Slash, TokenKind::Percent])
        {
            let right = self.parse_unary()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, RuntimeError> {
        if let Some(op) = self.match_any(&[TokenKind::Minus, TokenKind::Bang]) {
            let expr = self.parse_unary()?;
            return Ok(Expr::Unary {
                op,
                expr: Box::new(expr),
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, RuntimeError> {
        let mut expr = self.parse_primary()?;
        loop {
            let (line, column) = {
                let token = self.current();
                (token.line, token.column)
            };
            if self.match_kind(TokenKind::LBracket) {
                let index = self.parse_expr()?;
                self.consume_kind(TokenKind::RBracket)?;
                expr = Expr::Index {
                    target: Box::new(expr),
                    index: Box::new(index),
                    line,
                    column,
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, RuntimeError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Number(value) => {
                self.pos += 1;
                Ok(Expr::Literal(crate::value::Value::Int(value)))
            }
            TokenKind::Float(value) => {
                self.pos += 1;
                Ok(Expr::Literal(crate::value::Value::Num(value)))
            }
            TokenKind::Str(ref value) => {
                self.pos += 1;
                Ok(Expr::Literal(crate::value::Value::Str(value.clone())))
            }
            TokenKind::True => {
                self.pos += 1;
                Ok(Expr::Literal(crate::value::Value::Bool(true)))
            }
            TokenKind::False => {
                self.pos += 1;
                Ok(Expr::Literal(crate::value::Value::Bool(false)))
            }
            TokenKind::Nil => {
                self.pos += 1;
                Ok(Expr::Literal(crate::value::Value::Nil))
            }
            TokenKind::Ident(ref name) => {
                self.pos += 1;
                if self.match_kind(TokenKind::LParen) {
                    let mut args = Vec::new();
                    if !self.check(&TokenKind::RParen) {
                        args.push(self.parse_expr()?);
                        while self.match_kind(TokenKind::Comma) {
                            args.push(self.parse_expr()?);
                        }
                    }
                    self.consume_kind(TokenKind::RParen)?;
                    Ok(Expr::Call {
                        name: name.clone(),
                        args,
                        line: token.line,
                        column: token.column,
                    })
                } else {
                    Ok(Expr::Var {
                        name: name.clone(),
                        line: token.line,
                        column: token.column,
                    })
                }
            }
            TokenKind::LParen => {
                self.pos += 1;
                let expr = self.parse_expr()?;
                self.consume_kind(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::LBracket => {
                self.pos += 1;
                let mut items = Vec::new();
                if !self.check(&TokenKind::RBracket) {
                    items.push(self.parse_expr()?);
                    while self.match_kind(TokenKind::Comma) {
                        items.push(self.parse_expr()?);
                    }
                }
                self.consume_kind(TokenKind::RBracket)?;
                Ok(Expr::ArrayLiteral(items))
            }
            ref other => Err(RuntimeError::syntax(
                format!("expected expression, found {:?}", other),
                token.line,
                token.column,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(input: &str) -> Result<Vec<Stmt>, RuntimeError> {
        let tokens = Lexer::new(input).tokenize()?;
        Parser::new(tokens).parse_program()
    }

    fn parse_one(input: &str) -> Stmt {
        let mut stmts = parse(input).expect("parse");
        assert_eq!(stmts.len(), 1);
        stmts.remove(0)
    }

    #[test]
    fn single_independent_declaration() {
        let Stmt::Let(DeclarationList::Independent { decls, line, column }) =
            parse_one("let x = 1;")
        else {
            panic!("expected independent declaration list")
        };
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].0.name, "x");
        assert_eq!((line, column), (1, 1));
    }

    #[test]
    fn multiple_independent_declarations() {
        let Stmt::Let(DeclarationList::Independent { decls, .. }) =
            parse_one("let x = 1, y = 2, z = 3;")
        else {
            panic!("expected independent declaration list")
        };
        let names: Vec<&str> = decls.iter().map(|(i, _)| i.name.as_str()).collect();
        assert_eq!(names, ["x", "y", "z"]);
    }

    #[test]
    fn comma_before_eq_forces_multi_value() {
        let Stmt::Let(DeclarationList::MultiValue { names, expr, .. }) =
            parse_one("let map, err = load(\"region1.wxx\");")
        else {
            panic!("expected multi-value declaration")
        };
        assert_eq!(names.len(), 2);
        assert_eq!(names[0].name, "map");
        assert_eq!(names[1].name, "err");
        assert!(matches!(expr, Expr::Call { ref name, .. } if name == "load"));
    }

    #[test]
    fn multi_value_accepts_non_call_expression_shape() {
        // The binder rejects this by observed arity; the parser is
        // shape-only and must not peek at semantics.
        let Stmt::Let(DeclarationList::MultiValue { names, .. }) = parse_one("let x, y = 5;")
        else {
            panic!("expected multi-value declaration")
        };
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn mixed_form_is_rejected_before_ast_construction() {
        let err = parse("let x, y = 5, 4;").unwrap_err();
        assert_eq!(err.kind, Some(FailureKind::MixedForm));
        assert!(err.is_syntax());
        assert_eq!((err.line, err.column), (Some(1), Some(1)));
    }

    #[test]
    fn mixed_form_after_call_expression() {
        let err = parse("let x, y = f(), 4;").unwrap_err();
        assert_eq!(err.kind, Some(FailureKind::MixedForm));
    }

    #[test]
    fn missing_initializer_variants() {
        for src in ["let x;", "let a, b;", "let x = 1, y;", "let x = ;", "let a, b = ;"] {
            let err = parse(src).unwrap_err();
            assert_eq!(
                err.kind,
                Some(FailureKind::MissingInitializer),
                "source: {}",
                src
            );
            assert!(err.is_syntax(), "source: {}", src);
        }
    }

    #[test]
    fn let_statement_requires_delimiter() {
        let err = parse("let x = 1").unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn statement_position_reflects_let_keyword() {
        let err = parse("say(1);\n  let x, y = 5, 4;").unwrap_err();
        assert_eq!((err.line, err.column), (Some(2), Some(3)));
    }

    #[test]
    fn parsing_is_deterministic() {
        let src = "let a = 1, b = f(2), c = [3, 4];\nlet x, y = size(m);";
        let first = parse(src).expect("first parse");
        let second = parse(src).expect("second parse");
        assert_eq!(first, second);
    }

    #[test]
    fn precedence_nests_multiplication_under_addition() {
        let Stmt::Expr(Expr::Binary { op, right, .. }) = parse_one("1 + 2 * 3;") else {
            panic!("expected binary expression")
        };
        assert_eq!(op, TokenKind::Plus);
        assert!(matches!(
            *right,
            Expr::Binary {
                op: TokenKind::Star,
                ..
            }
        ));
    }

    #[test]
    fn else_if_chains() {
        let Stmt::If { else_branch, .. } = parse_one("if a { } else if b { } else { }") else {
            panic!("expected if statement")
        };
        assert!(matches!(else_branch[0], Stmt::If { .. }));
    }
}
