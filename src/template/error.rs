//! Error type for template rendering failures.

use super::expr::ExprError;
use std::fmt;

/// A template could not be rendered.
///
/// These are configuration problems in the template itself. Bad answers
/// typed by the user are not errors; the prompter asks again.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateError {
    /// A marker has fewer than 1 or more than 3 `|`-separated fields.
    FieldCount {
        /// The marker's inner content.
        content: String,
        /// Number of fields found.
        count: usize,
    },
    /// The first field of a prompted marker is not `name:type`.
    Signature {
        /// The offending first field.
        field: String,
    },
    /// A prompted marker declares a type outside the registry.
    UnknownType {
        /// The marker's name.
        name: String,
        /// The unrecognized type token.
        token: String,
    },
    /// A computed marker or `eval:` default failed to evaluate.
    Expression {
        /// The expression source.
        expression: String,
        /// Why evaluation failed.
        reason: ExprError,
    },
    /// Reassembly was given a different number of answers than markers.
    AnswerCount {
        /// Number of markers in the template.
        markers: usize,
        /// Number of answers supplied.
        answers: usize,
    },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::FieldCount { content, count } => write!(
                f,
                "marker '{{{{{}}}}}' has {} fields; expected 1 to 3 separated by '|'",
                content, count
            ),
            TemplateError::Signature { field } => write!(
                f,
                "marker field '{}' must have the form 'name:type'",
                field
            ),
            TemplateError::UnknownType { name, token } => write!(
                f,
                "unknown type '{}' for '{}'; expected one of int, float, str",
                token, name
            ),
            TemplateError::Expression { expression, reason } => {
                write!(f, "cannot evaluate '{}': {}", expression, reason)
            }
            TemplateError::AnswerCount { markers, answers } => write!(
                f,
                "template has {} markers but {} answers were given",
                markers, answers
            ),
        }
    }
}

impl std::error::Error for TemplateError {}
