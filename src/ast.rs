use crate::lexer::TokenKind;
use crate::value::Value;

/// A declared name plus its declaring position.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Ident {
    pub(crate) name: String,
    pub(crate) line: usize,
    pub(crate) column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Literal(Value),
    Var {
        name: String,
        line: usize,
        column: usize,
    },
    ArrayLiteral(Vec<Expr>),
    Unary {
        op: TokenKind,
        expr: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: TokenKind,
        right: Box<Expr>,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
        line: usize,
        column: usize,
    },
    Call {
        name: String,
        args: Vec<Expr>,
        line: usize,
        column: usize,
    },
}

/// The two legal shapes of a `let` statement. The mixed shape (a name list
/// fed by a value list) is rejected by the parser before any node is built.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DeclarationList {
    /// `let a = 1, b = 2;` — independent pairs, no arity relationship.
    Independent {
        decls: Vec<(Ident, Expr)>,
        line: usize,
        column: usize,
    },
    /// `let a, b = f();` — two or more names fed by one call expression.
    MultiValue {
        names: Vec<Ident>,
        expr: Expr,
        line: usize,
        column: usize,
    },
}

impl DeclarationList {
    /// Starting position of the declaring statement.
    pub(crate) fn position(&self) -> (usize, usize) {
        match self {
            DeclarationList::Independent { line, column, .. }
            | DeclarationList::MultiValue { line, column, .. } => (*line, *column),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Stmt {
    Let(DeclarationList),
    Assign {
        name: String,
        expr: Expr,
        line: usize,
        column: usize,
    },
    FnDecl {
        name: String,
        params: Vec<String>,
        body: Vec<Stmt>,
        line: usize,
        column: usize,
    },
    Return {
        exprs: Vec<Expr>,
        line: usize,
        column: usize,
    },
    If {
        cond: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    For {
        var: String,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    Block(Vec<Stmt>),
    Expr(Expr),
}
