//! Marker classification by field count.

use super::error::TemplateError;
use super::value::ValueType;

/// Separates the fields of a marker.
pub const FIELD_SEPARATOR: char = '|';

/// Separates the name from the type in a prompted marker's first field.
pub const TYPE_SEPARATOR: char = ':';

/// Prefix marking a default field as an expression.
pub const EVAL_PREFIX: &str = "eval:";

/// Default offered for a prompted marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    /// Used as typed text.
    Literal(String),
    /// Evaluated against the context before being offered.
    Expression(String),
}

/// A classified marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// One field: an expression whose value is substituted but never bound.
    Computed { expression: String },
    /// Two or three fields: the user is asked for a typed value.
    Prompted {
        name: String,
        kind: ValueType,
        help: String,
        default: Option<DefaultValue>,
    },
}

impl Marker {
    /// Classify a marker's inner content.
    ///
    /// An empty default field is treated as no default.
    pub fn parse(content: &str) -> Result<Self, TemplateError> {
        let fields: Vec<&str> = content.split(FIELD_SEPARATOR).collect();

        let (signature, help, default) = match fields.as_slice() {
            [expression] => {
                return Ok(Marker::Computed {
                    expression: expression.to_string(),
                });
            }
            [signature, help] => (*signature, *help, None),
            [signature, help, default] => (*signature, *help, Some(*default)),
            _ => {
                return Err(TemplateError::FieldCount {
                    content: content.to_string(),
                    count: fields.len(),
                });
            }
        };

        let (name, token) = match signature.split(TYPE_SEPARATOR).collect::<Vec<_>>()[..] {
            [name, token] if !name.trim().is_empty() => (name.trim(), token.trim()),
            _ => {
                return Err(TemplateError::Signature {
                    field: signature.to_string(),
                });
            }
        };

        let kind = token
            .parse::<ValueType>()
            .map_err(|token| TemplateError::UnknownType {
                name: name.to_string(),
                token,
            })?;

        let default = default.filter(|d| !d.is_empty()).map(|d| {
            match d.strip_prefix(EVAL_PREFIX) {
                Some(expression) => DefaultValue::Expression(expression.to_string()),
                None => DefaultValue::Literal(d.to_string()),
            }
        });

        Ok(Marker::Prompted {
            name: name.to_string(),
            kind,
            help: help.to_string(),
            default,
        })
    }

    /// Name this marker binds in the context, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Marker::Computed { .. } => None,
            Marker::Prompted { name, .. } => Some(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_field_is_computed() {
        assert_eq!(
            Marker::parse("cwd").unwrap(),
            Marker::Computed {
                expression: "cwd".to_string()
            }
        );
        assert_eq!(Marker::parse("nodes * 2").unwrap().name(), None);
    }

    #[test]
    fn two_fields_are_prompted_without_default() {
        let marker = Marker::parse("name:str|Your name").unwrap();
        assert_eq!(
            marker,
            Marker::Prompted {
                name: "name".to_string(),
                kind: ValueType::Str,
                help: "Your name".to_string(),
                default: None,
            }
        );
        assert_eq!(marker.name(), Some("name"));
    }

    #[test]
    fn three_fields_carry_a_literal_default() {
        let marker = Marker::parse("nodes:int|Number of nodes|4").unwrap();
        let Marker::Prompted { kind, default, .. } = marker else {
            panic!("expected prompted marker");
        };
        assert_eq!(kind, ValueType::Int);
        assert_eq!(default, Some(DefaultValue::Literal("4".to_string())));
    }

    #[test]
    fn eval_prefix_marks_default_expression() {
        let marker = Marker::parse("tasks:int|Tasks|eval:count*2").unwrap();
        let Marker::Prompted { default, .. } = marker else {
            panic!("expected prompted marker");
        };
        assert_eq!(default, Some(DefaultValue::Expression("count*2".to_string())));
    }

    #[test]
    fn empty_default_means_no_default() {
        let marker = Marker::parse("queue:str|Queue|").unwrap();
        let Marker::Prompted { default, .. } = marker else {
            panic!("expected prompted marker");
        };
        assert_eq!(default, None);
    }

    #[test]
    fn help_text_is_kept_verbatim() {
        let marker = Marker::parse("t:float| Wall time (h)? ").unwrap();
        let Marker::Prompted { help, .. } = marker else {
            panic!("expected prompted marker");
        };
        assert_eq!(help, " Wall time (h)? ");
    }

    #[test]
    fn too_many_fields_is_an_error() {
        let err = Marker::parse("a:int|b|c|d").unwrap_err();
        assert_eq!(
            err,
            TemplateError::FieldCount {
                content: "a:int|b|c|d".to_string(),
                count: 4
            }
        );
    }

    #[test]
    fn bad_signature_is_an_error() {
        for content in ["name|help", "a:b:c|help", ":int|help"] {
            assert!(
                matches!(Marker::parse(content), Err(TemplateError::Signature { .. })),
                "{} should be rejected",
                content
            );
        }
    }

    #[test]
    fn unknown_type_is_an_error() {
        let err = Marker::parse("flag:bool|Enable?").unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnknownType {
                name: "flag".to_string(),
                token: "bool".to_string()
            }
        );
    }
}
