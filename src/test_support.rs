use crate::backend::Backend;
use crate::error::{BatchError, Result};
use crate::template::{Prompter, Question, Value, ValueType};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;

/// Prompter that replays canned answer lines and records every question.
pub(crate) struct ScriptedPrompter {
    answers: VecDeque<&'static str>,
    pub(crate) asked: Vec<(String, Option<Value>, ValueType)>,
}

impl ScriptedPrompter {
    pub(crate) fn new(answers: &[&'static str]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            asked: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &Question) -> Result<Value> {
        self.asked.push((
            question.text.clone(),
            question.default.clone(),
            question.kind,
        ));
        let line = self.answers.pop_front().expect("script ran out of answers");
        Ok(question
            .interpret(line)
            .expect("scripted answer should be valid"))
    }
}

/// Backend that records calls instead of running scheduler commands.
#[derive(Default)]
pub(crate) struct RecordingBackend {
    pub(crate) name: &'static str,
    pub(crate) present: bool,
    pub(crate) fail: bool,
    pub(crate) calls: RefCell<Vec<String>>,
}

impl RecordingBackend {
    pub(crate) fn new(name: &'static str, present: bool) -> Self {
        Self {
            name,
            present,
            ..Default::default()
        }
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.borrow_mut().push(call);
        if self.fail {
            Err(BatchError::CommandFailed(format!(
                "{} returned exit code 1",
                self.name
            )))
        } else {
            Ok(())
        }
    }
}

impl Backend for RecordingBackend {
    fn name(&self) -> &str {
        self.name
    }

    fn detect(&self) -> bool {
        self.present
    }

    fn submit(&self, script: &Path) -> Result<String> {
        if !script.exists() {
            return Err(BatchError::MissingFile(script.display().to_string()));
        }
        self.record(format!("submit {}", script.display()))?;
        Ok("4242".to_string())
    }

    fn job_status(&self, job_id: &str) -> Result<()> {
        self.record(format!("job_status {}", job_id))
    }

    fn status(&self, user: Option<&str>) -> Result<()> {
        self.record(format!("status {}", user.unwrap_or("-")))
    }
}
