use std::collections::HashMap;

use crate::ast::{DeclarationList, Expr, Stmt};
use crate::builtins;
use crate::diagnostics::{FailureKind, RuntimeError};
use crate::lexer::{Lexer, TokenKind};
use crate::parser::Parser;
use crate::registry::FunctionRegistry;
use crate::scope::Scope;
use crate::trace::trace_log;
use crate::value::{CallResult, Value};

#[derive(Debug, Clone)]
struct UserFn {
    params: Vec<String>,
    body: Vec<Stmt>,
}

pub struct Interpreter {
    scope: Scope,
    functions: HashMap<String, UserFn>,
    registry: FunctionRegistry,
    output: String,
    /// Value of the last expression statement, for REPL display.
    pub last_value: Option<Value>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        let mut registry = FunctionRegistry::new();
        for (name, arity) in builtins::BUILTIN_ARITIES {
            // The table holds each name once; seeding cannot conflict.
            let _ = registry.register(name, *arity);
        }
        Self {
            scope: Scope::new(),
            functions: HashMap::new(),
            registry,
            output: String::new(),
            last_value: None,
        }
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    pub(crate) fn write_output(&mut self, text: &str) {
        self.output.push_str(text);
    }

    /// Parse and execute a program, accumulating bindings and definitions in
    /// this interpreter. Returns the output produced so far.
    pub fn run(&mut self, input: &str) -> Result<String, RuntimeError> {
        let tokens = Lexer::new(input).tokenize()?;
        let stmts = Parser::new(tokens).parse_program()?;
        trace_log!("exec", "running {} statements", stmts.len());
        let depth = self.scope.depth();
        if let Err(mut err) = self.exec_stmts(&stmts) {
            self.scope.unwind_to(depth);
            if err.return_value.take().is_some() {
                return Err(RuntimeError::new("return outside of a function"));
            }
            return Err(err);
        }
        Ok(self.output.clone())
    }

    fn exec_stmts(&mut self, stmts: &[Stmt]) -> Result<(), RuntimeError> {
        for stmt in stmts {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Let(decl) => self.bind_declaration(decl),
            Stmt::Assign {
                name,
                expr,
                line,
                column,
            } => {
                let value = self.eval_expr(expr)?;
                if self.scope.assign(name, value) {
                    Ok(())
                } else {
                    Err(RuntimeError::at(
                        format!("cannot assign to undeclared variable '{}'", name),
                        *line,
                        *column,
                    ))
                }
            }
            Stmt::FnDecl {
                name,
                params,
                body,
                line,
                column,
            } => self.define_function(name, params, body, *line, *column),
            Stmt::Return {
                exprs,
                ..
            } => {
                let values = if exprs.is_empty() {
                    vec![Value::Nil]
                } else {
                    let mut values = Vec::with_capacity(exprs.len());
                    for expr in exprs {
                        values.push(self.eval_expr(expr)?);
                    }
                    values
                };
                Err(RuntimeError::return_signal(values))
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let branch = if self.eval_expr(cond)?.truthy() {
                    then_branch
                } else {
                    else_branch
                };
                self.exec_block(branch)
            }
            Stmt::While { cond, body } => {
                while self.eval_expr(cond)?.truthy() {
                    self.exec_block(body)?;
                }
                Ok(())
            }
            Stmt::For {
                var,
                iterable,
                body,
            } => {
                let Value::Array(items) = self.eval_expr(iterable)? else {
                    return Err(RuntimeError::new("for loop expects an array"));
                };
                for item in items {
                    self.scope.push_frame();
                    self.scope.declare(var, item);
                    let result = self.exec_stmts(body);
                    self.scope.pop_frame();
                    result?;
                }
                Ok(())
            }
            Stmt::Block(body) => self.exec_block(body),
            Stmt::Expr(expr) => {
                let value = self.eval_expr(expr)?;
                self.last_value = Some(value);
                Ok(())
            }
        }
    }

    fn exec_block(&mut self, body: &[Stmt]) -> Result<(), RuntimeError> {
        self.scope.push_frame();
        let result = self.exec_stmts(body);
        self.scope.pop_frame();
        result
    }

    /// Install the bindings of one `let` statement, or fail with a
    /// positioned bind failure. Right-hand sides are evaluated before any
    /// binding is installed; on failure nothing is bound, though side
    /// effects of already-evaluated expressions are not undone.
    fn bind_declaration(&mut self, decl: &DeclarationList) -> Result<(), RuntimeError> {
        let (line, column) = decl.position();
        match decl {
            DeclarationList::Independent { decls, .. } => {
                for (i, (ident, _)) in decls.iter().enumerate() {
                    if decls[..i].iter().any(|(prev, _)| prev.name == ident.name) {
                        return Err(RuntimeError::failure(
                            FailureKind::DuplicateIdentifier(ident.name.clone()),
                            line,
                            column,
                        ));
                    }
                    if self.scope.is_declared_here(&ident.name) {
                        return Err(RuntimeError::failure(
                            FailureKind::RedeclarationInScope(ident.name.clone()),
                            line,
                            column,
                        ));
                    }
                }
                // Every right-hand side sees the scope as of statement
                // start; names from this statement are not yet visible.
                let mut values = Vec::with_capacity(decls.len());
                for (_, expr) in decls {
                    values.push(self.eval_expr(expr)?);
                }
                for ((ident, _), value) in decls.iter().zip(values) {
                    trace_log!("bind", "declare {} (independent)", ident.name);
                    self.scope.declare(&ident.name, value);
                }
                Ok(())
            }
            DeclarationList::MultiValue { names, expr, .. } => {
                for (i, ident) in names.iter().enumerate() {
                    if names[..i].iter().any(|prev| prev.name == ident.name) {
                        return Err(RuntimeError::failure(
                            FailureKind::DuplicateIdentifier(ident.name.clone()),
                            line,
                            column,
                        ));
                    }
                    if self.scope.is_declared_here(&ident.name) {
                        return Err(RuntimeError::failure(
                            FailureKind::RedeclarationInScope(ident.name.clone()),
                            line,
                            column,
                        ));
                    }
                }
                let want = names.len();
                let callee = match expr {
                    Expr::Call { name, .. } => Some(name.clone()),
                    _ => None,
                };
                // Statically resolvable callee: check the registered arity
                // before evaluating anything.
                if let Some(name) = &callee {
                    if let Some(arity) = self.registry.lookup(name) {
                        if arity != want {
                            return Err(RuntimeError::failure(
                                FailureKind::ArityMismatch {
                                    want,
                                    got: arity,
                                    callee,
                                },
                                line,
                                column,
                            ));
                        }
                    }
                }
                let results: CallResult = match expr {
                    Expr::Call {
                        name,
                        args,
                        line: call_line,
                        column: call_column,
                    } => self.eval_call(name, args, *call_line, *call_column)?,
                    other => vec![self.eval_expr(other)?],
                };
                // Re-validate from the observed result length; this is the
                // only check when the callee is not statically known.
                let got = results.len();
                if got != want {
                    return Err(RuntimeError::failure(
                        FailureKind::ArityMismatch { want, got, callee },
                        line,
                        column,
                    ));
                }
                for (ident, value) in names.iter().zip(results) {
                    trace_log!("bind", "declare {} (multi-value)", ident.name);
                    self.scope.declare(&ident.name, value);
                }
                Ok(())
            }
        }
    }

    /// Register a function definition. The fixed return arity is computed
    /// here, once, from the body's `return` statements; every later call
    /// site is held to it.
    fn define_function(
        &mut self,
        name: &str,
        params: &[String],
        body: &[Stmt],
        line: usize,
        column: usize,
    ) -> Result<(), RuntimeError> {
        // Built-ins win dispatch, so a user body under one of their names
        // could never run.
        if builtins::is_builtin(name) {
            return Err(RuntimeError::at(
                format!("cannot redefine built-in function '{}'", name),
                line,
                column,
            ));
        }
        let mut counts = Vec::new();
        return_arities(body, &mut counts);
        let arity = match counts.first() {
            None => 1,
            Some(&first) => {
                if let Some(&other) = counts.iter().find(|&&c| c != first) {
                    return Err(RuntimeError::at(
                        format!(
                            "fn '{}' must return a fixed number of values; found returns of {} and {}",
                            name, first, other
                        ),
                        line,
                        column,
                    ));
                }
                first
            }
        };
        if let Err(mut err) = self.registry.register(name, arity) {
            err.line = Some(line);
            err.column = Some(column);
            return Err(err);
        }
        trace_log!("bind", "fn {} registered with arity {}", name, arity);
        self.functions.insert(
            name.to_string(),
            UserFn {
                params: params.to_vec(),
                body: body.to_vec(),
            },
        );
        Ok(())
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Var { name, line, column } => match self.scope.lookup(name) {
                Some(value) => Ok(value.clone()),
                None => Err(RuntimeError::at(
                    format!("undefined variable '{}'", name),
                    *line,
                    *column,
                )),
            },
            Expr::ArrayLiteral(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item)?);
                }
                Ok(Value::Array(values))
            }
            Expr::Unary { op, expr } => {
                let value = self.eval_expr(expr)?;
                match op {
                    TokenKind::Minus => match value {
                        Value::Int(i) => Ok(Value::Int(i.wrapping_neg())),
                        Value::Num(f) => Ok(Value::Num(-f)),
                        other => Err(RuntimeError::new(format!(
                            "cannot negate {}",
                            other.type_name()
                        ))),
                    },
                    TokenKind::Bang => Ok(Value::Bool(!value.truthy())),
                    other => Err(RuntimeError::new(format!(
                        "unsupported unary operator {:?}",
                        other
                    ))),
                }
            }
            Expr::Binary { left, op, right } => self.eval_binary(left, op, right),
            Expr::Index {
                target,
                index,
                line,
                column,
            } => {
                let target = self.eval_expr(target)?;
                let index = self.eval_expr(index)?;
                let (Value::Array(items), Value::Int(i)) = (&target, &index) else {
                    return Err(RuntimeError::at(
                        format!(
                            "cannot index {} with {}",
                            target.type_name(),
                            index.type_name()
                        ),
                        *line,
                        *column,
                    ));
                };
                if *i < 0 || *i as usize >= items.len() {
                    return Err(RuntimeError::at(
                        format!("index {} out of bounds for array of {}", i, items.len()),
                        *line,
                        *column,
                    ));
                }
                Ok(items[*i as usize].clone())
            }
            Expr::Call {
                name,
                args,
                line,
                column,
            } => {
                let results = self.eval_call(name, args, *line, *column)?;
                // In expression position exactly one value is usable.
                if results.len() != 1 {
                    return Err(RuntimeError::at(
                        format!(
                            "{} returns {} values, but a single value is required here",
                            name,
                            results.len()
                        ),
                        *line,
                        *column,
                    ));
                }
                Ok(results.into_iter().next().unwrap_or(Value::Nil))
            }
        }
    }

    fn eval_binary(
        &mut self,
        left: &Expr,
        op: &TokenKind,
        right: &Expr,
    ) -> Result<Value, RuntimeError> {
        // Short-circuit forms evaluate the right side only when needed.
        match op {
            TokenKind::AndAnd => {
                if !self.eval_expr(left)?.truthy() {
                    return Ok(Value::Bool(false));
                }
                return Ok(Value::Bool(self.eval_expr(right)?.truthy()));
            }
            TokenKind::OrOr => {
                if self.eval_expr(left)?.truthy() {
                    return Ok(Value::Bool(true));
                }
                return Ok(Value::Bool(self.eval_expr(right)?.truthy()));
            }
            _ => {}
        }
        let lhs = self.eval_expr(left)?;
        let rhs = self.eval_expr(right)?;
        match op {
            TokenKind::EqEq => Ok(Value::Bool(values_equal(&lhs, &rhs))),
            TokenKind::BangEq => Ok(Value::Bool(!values_equal(&lhs, &rhs))),
            TokenKind::Lt | TokenKind::Lte | TokenKind::Gt | TokenKind::Gte => {
                let Some(ord) = compare_values(&lhs, &rhs) else {
                    return Err(RuntimeError::new(format!(
                        "cannot compare {} and {}",
                        lhs.type_name(),
                        rhs.type_name()
                    )));
                };
                let result = match op {
                    TokenKind::Lt => ord.is_lt(),
                    TokenKind::Lte => ord.is_le(),
                    TokenKind::Gt => ord.is_gt(),
                    _ => ord.is_ge(),
                };
                Ok(Value::Bool(result))
            }
            TokenKind::Plus => match (&lhs, &rhs) {
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
                _ => numeric_binop(op, &lhs, &rhs),
            },
            TokenKind::Minus | TokenKind::Star | TokenKind::Slash | TokenKind::Percent => {
                numeric_binop(op, &lhs, &rhs)
            }
            other => Err(RuntimeError::new(format!(
                "unsupported binary operator {:?}",
                other
            ))),
        }
    }

    /// Evaluate a call to a `CallResult`. Arguments are evaluated left to
    /// right; built-ins are tried before user functions.
    fn eval_call(
        &mut self,
        name: &str,
        args: &[Expr],
        line: usize,
        column: usize,
    ) -> Result<CallResult, RuntimeError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg)?);
        }
        if let Some(result) = builtins::call_builtin(self, name, &values, line, column) {
            return result;
        }
        let Some(func) = self.functions.get(name).cloned() else {
            return Err(RuntimeError::at(
                format!("unknown function '{}'", name),
                line,
                column,
            ));
        };
        if values.len() != func.params.len() {
            return Err(RuntimeError::at(
                format!(
                    "{} expects {} argument(s), got {}",
                    name,
                    func.params.len(),
                    values.len()
                ),
                line,
                column,
            ));
        }
        let depth = self.scope.enter_function();
        for (param, value) in func.params.iter().zip(values) {
            self.scope.declare(param, value);
        }
        let result = self.exec_stmts(&func.body);
        self.scope.exit_function(depth);
        match result {
            Ok(()) => Ok(vec![Value::Nil]),
            Err(mut err) => match err.return_value.take() {
                Some(values) => Ok(values),
                None => Err(err),
            },
        }
    }
}

/// Collect the value counts of every `return` in a body, skipping nested
/// function definitions, which carry their own contract.
fn return_arities(stmts: &[Stmt], out: &mut Vec<usize>) {
    for stmt in stmts {
        match stmt {
            Stmt::Return { exprs, .. } => out.push(exprs.len().max(1)),
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                return_arities(then_branch, out);
                return_arities(else_branch, out);
            }
            Stmt::While { body, .. } | Stmt::For { body, .. } | Stmt::Block(body) => {
                return_arities(body, out);
            }
            Stmt::FnDecl { .. } => {}
            _ => {}
        }
    }
}

fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Int(a), Value::Num(b)) | (Value::Num(b), Value::Int(a)) => *a as f64 == *b,
        _ => lhs == rhs,
    }
}

fn compare_values(lhs: &Value, rhs: &Value) -> Option<std::cmp::Ordering> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Int(_) | Value::Num(_), Value::Int(_) | Value::Num(_)) => {
            as_f64(lhs).partial_cmp(&as_f64(rhs))
        }
        _ => None,
    }
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Int(i) => *i as f64,
        Value::Num(f) => *f,
        _ => f64::NAN,
    }
}

fn numeric_binop(op: &TokenKind, lhs: &Value, rhs: &Value) -> Result<Value, RuntimeError> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => {
            let result = match op {
                TokenKind::Plus => a.wrapping_add(*b),
                TokenKind::Minus => a.wrapping_sub(*b),
                TokenKind::Star => a.wrapping_mul(*b),
                TokenKind::Slash | TokenKind::Percent => {
                    if *b == 0 {
                        return Err(RuntimeError::new("division by zero"));
                    }
                    // Wrapping, like the other ops: i64::MIN / -1 must not
                    // abort the host.
                    if matches!(op, TokenKind::Slash) {
                        a.wrapping_div(*b)
                    } else {
                        a.wrapping_rem(*b)
                    }
                }
                _ => return Err(RuntimeError::new("unsupported numeric operator")),
            };
            Ok(Value::Int(result))
        }
        (Value::Int(_) | Value::Num(_), Value::Int(_) | Value::Num(_)) => {
            let (a, b) = (as_f64(lhs), as_f64(rhs));
            let result = match op {
                TokenKind::Plus => a + b,
                TokenKind::Minus => a - b,
                TokenKind::Star => a * b,
                TokenKind::Slash => a / b,
                TokenKind::Percent => a % b,
                _ => return Err(RuntimeError::new("unsupported numeric operator")),
            };
            Ok(Value::Num(result))
        }
        _ => Err(RuntimeError::new(format!(
            "cannot apply {:?} to {} and {}",
            op,
            lhs.type_name(),
            rhs.type_name()
        ))),
    }
}
