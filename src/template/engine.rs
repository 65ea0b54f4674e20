//! Marker resolution and positional reassembly.

use super::context::EvalContext;
use super::error::TemplateError;
use super::expr;
use super::marker::{DefaultValue, Marker};
use super::prompt::{Prompter, Question};
use super::scanner::{MarkerSpan, scan};
use super::value::Value;
use crate::error::Result;

/// Result of rendering a template.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// The template with every marker replaced by its answer.
    pub text: String,
    /// One answer per marker occurrence, in scan order.
    pub answers: Vec<Value>,
    /// The context after every named answer was bound.
    pub context: EvalContext,
}

/// Render `template`: resolve every marker in order, then substitute.
pub fn render<P: Prompter + ?Sized>(
    template: &str,
    context: EvalContext,
    prompter: &mut P,
) -> Result<Rendered> {
    let spans: Vec<MarkerSpan<'_>> = scan(template).collect();
    let mut context = context;
    let answers = resolve(&spans, &mut context, prompter)?;
    let text = reassemble(template, &spans, &answers)?;
    Ok(Rendered {
        text,
        answers,
        context,
    })
}

/// Resolve each marker span to a value, extending `context` as names bind.
///
/// Every evaluation borrows the context as it stands before the marker's own
/// binding, so a marker only ever sees names bound by earlier markers.
pub fn resolve<P: Prompter + ?Sized>(
    spans: &[MarkerSpan<'_>],
    context: &mut EvalContext,
    prompter: &mut P,
) -> Result<Vec<Value>> {
    let mut answers = Vec::with_capacity(spans.len());

    for span in spans {
        let marker = Marker::parse(span.content)?;

        let answer = match &marker {
            Marker::Computed { expression } => evaluate(expression, context)?,
            Marker::Prompted {
                kind,
                help,
                default,
                ..
            } => {
                let default = match default {
                    Some(DefaultValue::Expression(expression)) => {
                        Some(evaluate(expression, context)?)
                    }
                    Some(DefaultValue::Literal(text)) => Some(Value::Str(text.clone())),
                    None => None,
                };
                let question = Question::new(help.as_str(), *kind).with_default(default);
                prompter.ask(&question)?
            }
        };

        let name = marker.name().unwrap_or("automatic");
        log::debug!("Got {} for {}", answer, name);

        if let Some(name) = marker.name() {
            context.bind(name, answer.clone());
        }
        answers.push(answer);
    }

    Ok(answers)
}

fn evaluate(expression: &str, context: &EvalContext) -> Result<Value> {
    expr::evaluate(expression, context).map_err(|reason| {
        TemplateError::Expression {
            expression: expression.to_string(),
            reason,
        }
        .into()
    })
}

/// Substitute `answers` into `template` at the given spans.
///
/// Text outside the spans is copied byte for byte, and substituted answers
/// are never scanned again.
pub fn reassemble(
    template: &str,
    spans: &[MarkerSpan<'_>],
    answers: &[Value],
) -> std::result::Result<String, TemplateError> {
    if spans.len() != answers.len() {
        return Err(TemplateError::AnswerCount {
            markers: spans.len(),
            answers: answers.len(),
        });
    }

    let mut result = String::with_capacity(template.len());
    let mut cursor = 0;
    for (span, answer) in spans.iter().zip(answers) {
        result.push_str(&template[cursor..span.start]);
        result.push_str(&answer.to_string());
        cursor = span.end;
    }
    result.push_str(&template[cursor..]);

    Ok(result)
}

#[cfg(test)]
mod tests;
