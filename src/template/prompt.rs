//! Interactive input: ask the user for a typed value until it is valid.

use super::value::{Value, ValueType};
use crate::error::{BatchError, Result};
use std::fmt;
use std::io::{BufRead, Write};

/// Written before re-asking after a rejected answer.
pub const INVALID_ANSWER: &str = "Invalid answer! ";

/// Which coerced answers are acceptable.
pub enum Acceptance {
    /// Any value of the right type.
    Any,
    /// Only one of these values.
    OneOf(Vec<Value>),
    /// Values for which the predicate holds.
    #[allow(dead_code)]
    Predicate(Box<dyn Fn(&Value) -> bool>),
}

impl Acceptance {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Acceptance::Any => true,
            Acceptance::OneOf(values) => values.contains(value),
            Acceptance::Predicate(check) => check(value),
        }
    }
}

impl fmt::Debug for Acceptance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Acceptance::Any => f.write_str("Any"),
            Acceptance::OneOf(values) => f.debug_tuple("OneOf").field(values).finish(),
            Acceptance::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// One request for input.
#[derive(Debug)]
pub struct Question {
    pub text: String,
    pub default: Option<Value>,
    pub kind: ValueType,
    pub accept: Acceptance,
}

impl Question {
    pub fn new(text: impl Into<String>, kind: ValueType) -> Self {
        Self {
            text: text.into(),
            default: None,
            kind,
            accept: Acceptance::Any,
        }
    }

    pub fn with_default(mut self, default: Option<Value>) -> Self {
        self.default = default;
        self
    }

    pub fn with_acceptance(mut self, accept: Acceptance) -> Self {
        self.accept = accept;
        self
    }

    /// Prompt line shown to the user: `text [default]: `.
    pub fn prompt(&self) -> String {
        let mut prompt = match &self.default {
            Some(default) => format!("{} [{}]", self.text, default),
            None => self.text.clone(),
        };
        if !(prompt.ends_with('?') || prompt.ends_with(':')) {
            prompt.push(':');
        }
        prompt.push(' ');
        prompt
    }

    /// Interpret one line of input.
    ///
    /// Returns `None` when the answer must be asked again.
    pub fn interpret(&self, line: &str) -> Option<Value> {
        let coerced = match &self.default {
            Some(default) if line.trim().is_empty() => self.kind.convert(default),
            _ => self.kind.coerce(line),
        };
        coerced.ok().filter(|v| self.accept.accepts(v))
    }
}

/// Capability to obtain a typed answer from the user.
pub trait Prompter {
    /// Ask until a valid answer is given.
    fn ask(&mut self, question: &Question) -> Result<Value>;
}

/// Prompter reading lines from `input` and writing prompts to `output`.
///
/// Retries are unbounded. End of input is an error, since no further
/// answer can ever arrive.
pub struct ConsolePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| BatchError::UserError(format!("failed to read answer: {}", e)))?;
        if read == 0 {
            return Err(BatchError::UserError(
                "input closed before a valid answer was given".to_string(),
            ));
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(line)
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.output
            .write_all(text.as_bytes())
            .and_then(|_| self.output.flush())
            .map_err(|e| BatchError::UserError(format!("failed to write prompt: {}", e)))
    }
}

impl ConsolePrompter<std::io::StdinLock<'static>, std::io::Stdout> {
    /// Prompter bound to the process terminal.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for ConsolePrompter<R, W> {
    fn ask(&mut self, question: &Question) -> Result<Value> {
        let prompt = question.prompt();
        loop {
            self.write(&prompt)?;
            let line = self.read_line()?;
            if let Some(value) = question.interpret(&line) {
                return Ok(value);
            }
            log::debug!("Rejected answer {:?} for '{}'", line, question.text);
            self.write(INVALID_ANSWER)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> ConsolePrompter<Cursor<Vec<u8>>, Vec<u8>> {
        ConsolePrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn transcript(p: ConsolePrompter<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(p.into_output()).unwrap()
    }

    #[test]
    fn prompt_formatting() {
        assert_eq!(Question::new("Your name", ValueType::Str).prompt(), "Your name: ");
        assert_eq!(Question::new("Which one?", ValueType::Int).prompt(), "Which one? ");
        assert_eq!(Question::new("Nodes:", ValueType::Int).prompt(), "Nodes: ");
        assert_eq!(
            Question::new("Nodes", ValueType::Int)
                .with_default(Some(Value::Int(4)))
                .prompt(),
            "Nodes [4]: "
        );
    }

    #[test]
    fn returns_coerced_answer() {
        let mut p = prompter("3\n");
        let value = p.ask(&Question::new("Count", ValueType::Int)).unwrap();
        assert_eq!(value, Value::Int(3));
        assert_eq!(transcript(p), "Count: ");
    }

    #[test]
    fn retries_after_coercion_failure() {
        let mut p = prompter("abc\n\n7\n");
        let value = p.ask(&Question::new("Count", ValueType::Int)).unwrap();
        assert_eq!(value, Value::Int(7));
        assert_eq!(
            transcript(p),
            "Count: Invalid answer! Count: Invalid answer! Count: "
        );
    }

    #[test]
    fn empty_line_takes_default() {
        let mut p = prompter("\n");
        let question =
            Question::new("Nodes", ValueType::Int).with_default(Some(Value::from("4")));
        assert_eq!(p.ask(&question).unwrap(), Value::Int(4));
    }

    #[test]
    fn whitespace_line_takes_default() {
        let mut p = prompter("   \r\n");
        let question =
            Question::new("Tasks", ValueType::Int).with_default(Some(Value::Int(10)));
        assert_eq!(p.ask(&question).unwrap(), Value::Int(10));
    }

    #[test]
    fn typed_answer_overrides_default() {
        let mut p = prompter("2\n");
        let question =
            Question::new("Nodes", ValueType::Int).with_default(Some(Value::Int(4)));
        assert_eq!(p.ask(&question).unwrap(), Value::Int(2));
    }

    #[test]
    fn invalid_default_is_rejected_like_input() {
        let mut p = prompter("\n5\n");
        let question =
            Question::new("Nodes", ValueType::Int).with_default(Some(Value::from("many")));
        assert_eq!(p.ask(&question).unwrap(), Value::Int(5));
        assert!(transcript(p).contains(INVALID_ANSWER));
    }

    #[test]
    fn one_of_acceptance() {
        let mut p = prompter("5\n-1\n1\n");
        let question = Question::new("Which template to use?", ValueType::Int)
            .with_acceptance(Acceptance::OneOf(vec![Value::Int(0), Value::Int(1)]));
        assert_eq!(p.ask(&question).unwrap(), Value::Int(1));
        assert_eq!(transcript(p).matches(INVALID_ANSWER).count(), 2);
    }

    #[test]
    fn predicate_acceptance() {
        let mut p = prompter("0\n16\n");
        let question = Question::new("Cores", ValueType::Int).with_acceptance(
            Acceptance::Predicate(Box::new(|v| matches!(v, Value::Int(n) if *n > 0))),
        );
        assert_eq!(p.ask(&question).unwrap(), Value::Int(16));
    }

    #[test]
    fn string_answers_keep_inner_whitespace() {
        let mut p = prompter("  my job \n");
        let value = p.ask(&Question::new("Job name", ValueType::Str)).unwrap();
        assert_eq!(value, Value::from("  my job "));
    }

    #[test]
    fn end_of_input_is_an_error() {
        let mut p = prompter("abc\n");
        let err = p.ask(&Question::new("Count", ValueType::Int)).unwrap_err();
        assert!(err.to_string().contains("input closed"));
    }
}
