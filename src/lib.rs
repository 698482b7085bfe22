//! WSJ is a small interpreted scripting language for automating operations
//! on hex-map documents. The crate provides the lexer, parser, and
//! tree-walking interpreter, plus a line-editing REPL.
//!
//! The language's distinguishing feature is its `let` statement, which
//! supports both independent declarations (`let a = 1, b = 2;`) and
//! multi-valued declarations fed by a single call (`let map, err =
//! load("region1.wxx");`), with fixed call-arity contracts checked at
//! function definition time and enforced at every binding site.

mod ast;
mod builtins;
mod diagnostics;
mod interpreter;
mod lexer;
mod parser;
mod registry;
pub mod repl;
mod scope;
mod trace;
mod value;

pub use diagnostics::{FailureKind, RuntimeError};
pub use interpreter::Interpreter;
pub use value::{MapDoc, Value};

/// Parse a program and render its AST for debugging.
pub fn dump_ast(input: &str) -> Result<String, RuntimeError> {
    let tokens = lexer::Lexer::new(input).tokenize()?;
    let stmts = parser::Parser::new(tokens).parse_program()?;
    Ok(format!("{:#?}", stmts))
}
