use crate::diagnostics::RuntimeError;
use crate::interpreter::Interpreter;
use crate::value::{CallResult, MapDoc, Value};

/// Fixed return arity of every built-in. Installed into the arity registry
/// at interpreter construction, before any script runs.
pub(crate) const BUILTIN_ARITIES: &[(&str, usize)] = &[
    ("say", 1),
    ("print", 1),
    ("len", 1),
    ("load", 2),
    ("save", 1),
    ("size", 2),
    ("terrainAt", 1),
];

pub(crate) fn is_builtin(name: &str) -> bool {
    BUILTIN_ARITIES.iter().any(|(n, _)| *n == name)
}

/// Dispatch a built-in call. Returns `None` when the name is not a
/// built-in, so the interpreter falls through to user functions.
pub(crate) fn call_builtin(
    interp: &mut Interpreter,
    name: &str,
    args: &[Value],
    line: usize,
    column: usize,
) -> Option<Result<CallResult, RuntimeError>> {
    match name {
        "say" => Some(emit(interp, args, true, line, column)),
        "print" => Some(emit(interp, args, false, line, column)),
        "len" => Some(len(args, line, column)),
        "load" => Some(load(args, line, column)),
        "save" => Some(save(args, line, column)),
        "size" => Some(size(args, line, column)),
        "terrainAt" => Some(terrain_at(args, line, column)),
        _ => None,
    }
}

fn want_args(
    name: &str,
    want: usize,
    args: &[Value],
    line: usize,
    column: usize,
) -> Result<(), RuntimeError> {
    if args.len() == want {
        Ok(())
    } else {
        Err(RuntimeError::at(
            format!("{} expects {} argument(s), got {}", name, want, args.len()),
            line,
            column,
        ))
    }
}

fn emit(
    interp: &mut Interpreter,
    args: &[Value],
    newline: bool,
    line: usize,
    column: usize,
) -> Result<CallResult, RuntimeError> {
    want_args(if newline { "say" } else { "print" }, 1, args, line, column)?;
    let mut text = args[0].to_string_value();
    if newline {
        text.push('\n');
    }
    interp.write_output(&text);
    Ok(vec![Value::Nil])
}

fn len(args: &[Value], line: usize, column: usize) -> Result<CallResult, RuntimeError> {
    want_args("len", 1, args, line, column)?;
    let n = match &args[0] {
        Value::Array(items) => items.len() as i64,
        Value::Str(s) => s.chars().count() as i64,
        other => {
            return Err(RuntimeError::at(
                format!("len expects a string or array, got {}", other.type_name()),
                line,
                column,
            ));
        }
    };
    Ok(vec![Value::Int(n)])
}

/// `load(path)` returns a map document and an error value; exactly one of
/// the two is nil. The real `.wxx` codec lives outside this crate, so the
/// document is an in-memory stand-in.
fn load(args: &[Value], line: usize, column: usize) -> Result<CallResult, RuntimeError> {
    want_args("load", 1, args, line, column)?;
    let Value::Str(path) = &args[0] else {
        return Err(RuntimeError::at(
            format!("load expects a path string, got {}", args[0].type_name()),
            line,
            column,
        ));
    };
    if path.ends_with(".wxx") {
        let doc = MapDoc {
            source: path.clone(),
            width: 30,
            height: 20,
            fill: "Grass".to_string(),
        };
        Ok(vec![Value::Map(doc), Value::Nil])
    } else {
        Ok(vec![
            Value::Nil,
            Value::Str(format!("unsupported map format: {}", path)),
        ])
    }
}

fn save(args: &[Value], line: usize, column: usize) -> Result<CallResult, RuntimeError> {
    want_args("save", 2, args, line, column)?;
    let Value::Map(_) = &args[0] else {
        return Err(RuntimeError::at(
            format!("save expects a map document, got {}", args[0].type_name()),
            line,
            column,
        ));
    };
    let Value::Str(_) = &args[1] else {
        return Err(RuntimeError::at(
            format!("save expects a path string, got {}", args[1].type_name()),
            line,
            column,
        ));
    };
    Ok(vec![Value::Bool(true)])
}

fn size(args: &[Value], line: usize, column: usize) -> Result<CallResult, RuntimeError> {
    want_args("size", 1, args, line, column)?;
    let Value::Map(doc) = &args[0] else {
        return Err(RuntimeError::at(
            format!("size expects a map document, got {}", args[0].type_name()),
            line,
            column,
        ));
    };
    Ok(vec![Value::Int(doc.width), Value::Int(doc.height)])
}

fn terrain_at(args: &[Value], line: usize, column: usize) -> Result<CallResult, RuntimeError> {
    want_args("terrainAt", 3, args, line, column)?;
    let (Value::Map(doc), Value::Int(col), Value::Int(row)) = (&args[0], &args[1], &args[2])
    else {
        return Err(RuntimeError::at(
            "terrainAt expects a map document and two integer coordinates",
            line,
            column,
        ));
    };
    if *col < 0 || *col >= doc.width || *row < 0 || *row >= doc.height {
        return Err(RuntimeError::at(
            format!(
                "coordinates ({}, {}) outside map {}x{}",
                col, row, doc.width, doc.height
            ),
            line,
            column,
        ));
    }
    Ok(vec![Value::Str(doc.fill.clone())])
}
