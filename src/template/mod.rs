//! Template engine for batch job scripts.
//!
//! A template is plain text with `{{...}}` markers. The inner content is
//! split on `|` into one to three fields:
//!
//! - `{{expression}}` - computed from earlier answers, never bound to a name
//! - `{{name:type|help}}` - the user is asked for a value of `type`
//! - `{{name:type|help|default}}` - as above, with a default; a default
//!   written `eval:expression` is computed from earlier answers
//!
//! Types are `int`, `float` and `str`. Markers are resolved strictly in
//! textual order; each named answer becomes visible to the markers after it.
//! The builtin name `cwd` holds the absolute working directory.
//!
//! ```text
//! #SBATCH --nodes={{nodes:int|Number of nodes|1}}
//! #SBATCH --ntasks={{ntasks:int|Number of tasks|eval:nodes*32}}
//! cd {{cwd}}
//! ```

mod context;
mod engine;
mod error;
pub mod expr;
mod marker;
mod prompt;
mod scanner;
mod value;

pub use context::{CWD, EvalContext};
pub use engine::{Rendered, reassemble, render, resolve};
pub use error::TemplateError;
pub use marker::{DefaultValue, Marker};
pub use prompt::{Acceptance, ConsolePrompter, INVALID_ANSWER, Prompter, Question};
pub use scanner::{MarkerSpan, Markers, scan};
pub use value::{CoercionError, Value, ValueType};
