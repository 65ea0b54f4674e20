//! Implementation of the `batch generate` command.
//!
//! 1. Finds the templates for the active backend (`<backend>.*` in the data
//!    directory) and lets the user pick one when there are several
//! 2. Resolves every marker, prompting on the terminal
//! 3. Writes the rendered script atomically, replacing any existing file

use super::AppContext;
use crate::cli::GenerateArgs;
use crate::error::{BatchError, Result};
use crate::fs::atomic_write_file;
use crate::paths::current_dir;
use crate::template::{
    Acceptance, ConsolePrompter, EvalContext, Prompter, Question, Value, ValueType, render,
};
use globset::Glob;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Execute the `batch generate` command.
pub fn cmd_generate(ctx: &AppContext, args: GenerateArgs) -> Result<()> {
    let backend = ctx.backend()?;
    let output = args.output.unwrap_or_else(|| ctx.config.output.clone());

    let mut prompter = ConsolePrompter::stdio();
    generate(
        &ctx.paths.data_dir,
        backend.name(),
        Path::new(&output),
        &mut prompter,
        &mut std::io::stdout(),
    )
}

/// Render a `backend` template from `data_dir` into `output`.
///
/// The template list is written to `listing` when the user has to choose.
fn generate<P: Prompter + ?Sized, W: Write>(
    data_dir: &Path,
    backend: &str,
    output: &Path,
    prompter: &mut P,
    listing: &mut W,
) -> Result<()> {
    let templates = find_templates(data_dir, backend)?;
    let template_path = choose_template(&templates, prompter, listing)?;
    log::debug!("Using template {}", template_path.display());

    let template = fs::read_to_string(template_path).map_err(|e| {
        BatchError::UserError(format!(
            "failed to read template '{}': {}",
            template_path.display(),
            e
        ))
    })?;

    let rendered = render(&template, EvalContext::with_cwd(current_dir()?), prompter)?;
    log::debug!(
        "Resolved {} markers; bound {}",
        rendered.answers.len(),
        rendered.context.names().collect::<Vec<_>>().join(", ")
    );

    atomic_write_file(output, &rendered.text)?;
    log::info!("Wrote {}", output.display());
    Ok(())
}

fn template_pattern(backend: &str) -> String {
    format!("{}.*", backend)
}

/// Regular files in `data_dir` whose name matches `<backend>.*`, sorted.
///
/// Finding none is an error naming the directory and the pattern.
fn find_templates(data_dir: &Path, backend: &str) -> Result<Vec<PathBuf>> {
    let pattern = template_pattern(backend);
    let matcher = Glob::new(&pattern)
        .map_err(|e| {
            BatchError::UserError(format!("invalid template pattern '{}': {}", pattern, e))
        })?
        .compile_matcher();

    let read_error = |e: std::io::Error| {
        BatchError::UserError(format!(
            "failed to read template directory '{}': {}",
            data_dir.display(),
            e
        ))
    };

    let mut templates = Vec::new();
    for entry in fs::read_dir(data_dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let path = entry.path();
        if path.is_file() && matcher.is_match(entry.file_name()) {
            templates.push(path);
        }
    }
    templates.sort();

    if templates.is_empty() {
        return Err(BatchError::UserError(format!(
            "no templates found in '{}' matching '{}'\n\
             Fix: add a template, e.g. {}",
            data_dir.display(),
            pattern,
            data_dir.join(format!("{}.sh", backend)).display()
        )));
    }

    Ok(templates)
}

/// Pick one of `templates`, asking only when there is a choice to make.
fn choose_template<'a, P: Prompter + ?Sized, W: Write>(
    templates: &'a [PathBuf],
    prompter: &mut P,
    listing: &mut W,
) -> Result<&'a Path> {
    if let [only] = templates {
        return Ok(only);
    }

    for (index, template) in templates.iter().enumerate() {
        writeln!(listing, "{:2}: {}", index, template.display()).map_err(|e| {
            BatchError::UserError(format!("failed to list templates: {}", e))
        })?;
    }

    let choices = (0..templates.len()).map(|i| Value::Int(i as i64)).collect();
    let question = Question::new("Which template to use?", ValueType::Int)
        .with_acceptance(Acceptance::OneOf(choices));

    if let Value::Int(index) = prompter.ask(&question)?
        && let Some(template) = usize::try_from(index).ok().and_then(|i| templates.get(i))
    {
        return Ok(template);
    }
    Err(BatchError::UserError("invalid template choice".to_string()))
}
