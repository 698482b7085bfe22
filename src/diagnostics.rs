use crate::value::CallResult;

/// The failure taxonomy of the declaration subsystem. `MixedForm` and
/// `MissingInitializer` are syntax failures detected before any AST node is
/// built; the rest are bind failures detected while installing bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    MixedForm,
    MissingInitializer,
    DuplicateIdentifier(String),
    RedeclarationInScope(String),
    ArityMismatch {
        want: usize,
        got: usize,
        callee: Option<String>,
    },
}

impl FailureKind {
    pub fn is_syntax(&self) -> bool {
        matches!(self, FailureKind::MixedForm | FailureKind::MissingInitializer)
    }
}

/// Render a failure as a single-line, position-prefixed message. Positions
/// are 1-based and refer to the start of the failing statement.
pub(crate) fn render(kind: &FailureKind, line: usize, column: usize) -> String {
    let detail = match kind {
        FailureKind::MixedForm => {
            "mixed declaration form: a comma-separated name list takes a single call expression, \
             not a list of values"
                .to_string()
        }
        FailureKind::MissingInitializer => {
            "every declared name requires an initializing expression".to_string()
        }
        FailureKind::DuplicateIdentifier(name) => {
            format!("duplicate identifier '{}' in declaration list", name)
        }
        FailureKind::RedeclarationInScope(name) => {
            format!("'{}' is already declared in this scope", name)
        }
        FailureKind::ArityMismatch {
            want,
            got,
            callee: Some(callee),
        } => format!(
            "{} returns {} values, but {} names were declared",
            callee, got, want
        ),
        FailureKind::ArityMismatch {
            want,
            got,
            callee: None,
        } => format!("call returns {} values, but {} names were declared", got, want),
    };
    format!("line {}, column {}: {}", line, column, detail)
}

#[derive(Debug)]
pub struct RuntimeError {
    pub message: String,
    pub kind: Option<FailureKind>,
    pub line: Option<usize>,
    pub column: Option<usize>,
    syntax: bool,
    /// Carries the values of a `return` statement up to the enclosing call.
    pub(crate) return_value: Option<CallResult>,
}

impl RuntimeError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: None,
            line: None,
            column: None,
            syntax: false,
            return_value: None,
        }
    }

    pub(crate) fn at(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            kind: None,
            line: Some(line),
            column: Some(column),
            syntax: false,
            return_value: None,
        }
    }

    /// A malformed token sequence. Always positioned.
    pub(crate) fn syntax(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            kind: None,
            line: Some(line),
            column: Some(column),
            syntax: true,
            return_value: None,
        }
    }

    /// A classified declaration failure, rendered through the formatter.
    pub(crate) fn failure(kind: FailureKind, line: usize, column: usize) -> Self {
        Self {
            message: render(&kind, line, column),
            syntax: kind.is_syntax(),
            kind: Some(kind),
            line: Some(line),
            column: Some(column),
            return_value: None,
        }
    }

    pub(crate) fn return_signal(values: CallResult) -> Self {
        Self {
            message: String::new(),
            kind: None,
            line: None,
            column: None,
            syntax: false,
            return_value: Some(values),
        }
    }

    /// True for failures detected during parsing, before any AST was built.
    pub fn is_syntax(&self) -> bool {
        self.syntax
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_is_position_prefixed_and_single_line() {
        let msg = render(&FailureKind::MixedForm, 3, 7);
        assert!(msg.starts_with("line 3, column 7: "));
        assert!(!msg.contains('\n'));
    }

    #[test]
    fn arity_mismatch_names_both_counts_and_callee() {
        let kind = FailureKind::ArityMismatch {
            want: 3,
            got: 2,
            callee: Some("getCoordinates".to_string()),
        };
        let msg = render(&kind, 1, 1);
        assert!(msg.contains("getCoordinates"));
        assert!(msg.contains("2 values"));
        assert!(msg.contains("3 names"));
    }

    #[test]
    fn arity_mismatch_without_static_callee() {
        let kind = FailureKind::ArityMismatch {
            want: 2,
            got: 1,
            callee: None,
        };
        let msg = render(&kind, 1, 1);
        assert!(msg.contains("call returns 1 values"));
    }

    #[test]
    fn syntax_classification() {
        assert!(FailureKind::MixedForm.is_syntax());
        assert!(FailureKind::MissingInitializer.is_syntax());
        assert!(!FailureKind::DuplicateIdentifier("x".to_string()).is_syntax());
        assert!(RuntimeError::failure(FailureKind::MixedForm, 1, 1).is_syntax());
        assert!(!RuntimeError::failure(
            FailureKind::RedeclarationInScope("x".to_string()),
            1,
            1
        )
        .is_syntax());
    }
}
