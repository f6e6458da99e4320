//! Expression Evaluator for calculated settings.
//!
//! A calculated setting holds a user-authored script that is re-evaluated
//! whenever a referenced datasource updates. Scripts are compiled into a
//! small expression-language program over a single input, the `resources`
//! mapping of datasource name to latest payload. The language supports
//! JSON literals, property/index access, arithmetic, comparisons, boolean
//! logic, the conditional operator, local assignments, and `return`.
//!
//! Compilation never fails outright: a script that does not parse is kept
//! as literal text, so calculated settings degrade gracefully to plain
//! strings. Two more fallbacks apply at evaluation time, matching the
//! behavior dashboards were authored against:
//!
//! * a script that is a single bare word and hits an unresolved-identifier
//!   error evaluates to that word as a string;
//! * a script that finishes without `return` produces no value, and the
//!   previous calculated value is left untouched by the caller.

mod deps;
mod error;
mod eval;
mod lexer;
mod parser;


pub use deps::{first_resource_ref, scan_resource_refs};
pub use error::ExprError;

use serde_json::{Map, Value};

use parser::Program;

/// A compiled calculated setting: the executable form plus the statically
/// extracted set of datasource names it reads.
pub struct CompiledSetting {
    raw: String,
    kind: Compiled,
    dependencies: Vec<String>,
}

enum Compiled {
    Program(Program),
    /// Parse failed; the setting acts as literal text.
    Literal(String),
}

impl CompiledSetting {
    /// Compile a single setting script.
    pub fn compile(raw: &str) -> CompiledSetting {
        Self::build(raw.to_string(), raw.to_string())
    }

    /// Compile a multi-valued setting (e.g. several plotted series) by
    /// joining the snippets with commas into one array-literal expression.
    pub fn compile_multi(parts: &[Value]) -> CompiledSetting {
        let joined = parts
            .iter()
            .map(|part| match part {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(",");
        let script = format!("[{}]", joined);
        Self::build(script.clone(), script)
    }

    /// Compile from a raw settings value, dispatching on its shape.
    pub fn compile_value(value: &Value) -> Option<CompiledSetting> {
        match value {
            Value::String(s) => Some(Self::compile(s)),
            Value::Array(items) => Some(Self::compile_multi(items)),
            Value::Null => None,
            other => Some(Self::compile(&other.to_string())),
        }
    }

    fn build(raw: String, mut script: String) -> CompiledSetting {
        // If there is no return and at most one statement terminator,
        // add an implicit one.
        let terminators = script.matches(';').count();
        if terminators <= 1 && !script.contains("return") {
            script = format!("return {}", script);
        }

        let kind = match parser::parse(&script) {
            Ok(program) => Compiled::Program(program),
            Err(error) => {
                tracing::debug!(%error, "setting did not parse, treating as literal text");
                Compiled::Literal(raw.clone())
            }
        };

        // The scan runs on the transformed script either way; a literal
        // fallback still reports the references its text happens to name.
        let dependencies = deps::scan_resource_refs(&script);

        CompiledSetting {
            raw,
            kind,
            dependencies,
        }
    }

    /// Datasource names this setting reads, in first-seen order.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// The raw setting text this was compiled from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether compilation fell back to literal text.
    pub fn is_literal(&self) -> bool {
        matches!(self.kind, Compiled::Literal(_))
    }

    /// Evaluate against the current resources mapping.
    ///
    /// `Ok(None)` means the script produced no value; the caller leaves the
    /// previous calculated value in place. An unresolved-identifier error on
    /// a bare-word script degrades to the word itself as a string.
    pub fn evaluate(&self, resources: &Map<String, Value>) -> Result<Option<Value>, ExprError> {
        match &self.kind {
            Compiled::Literal(text) => Ok(Some(Value::String(text.clone()))),
            Compiled::Program(program) => match eval::run(program, resources) {
                Ok(value) => Ok(value),
                Err(ExprError::Unresolved(_)) if is_bare_word(&self.raw) => {
                    Ok(Some(Value::String(self.raw.clone())))
                }
                Err(error) => Err(error),
            },
        }
    }
}

fn is_bare_word(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}
