// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message format strings.
//!
//! Subjects, headers, bodies and footers in the notifier configuration are
//! written with single-brace placeholders (`"Expires in {days} days"`). They
//! are converted to Jinja2 syntax and rendered with minijinja, strictly, so a
//! typo in a placeholder surfaces as an error instead of a blank.

use minijinja::{Environment, ErrorKind, UndefinedBehavior, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during template rendering.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template syntax error: {0}")]
    Syntax(String),

    #[error("undefined placeholder: {0}")]
    UndefinedVariable(String),

    #[error("render error: {0}")]
    Render(String),
}

impl From<minijinja::Error> for TemplateError {
    fn from(err: minijinja::Error) -> Self {
        let msg = err.to_string();
        match err.kind() {
            ErrorKind::UndefinedError => TemplateError::UndefinedVariable(msg),
            ErrorKind::SyntaxError => TemplateError::Syntax(msg),
            _ => TemplateError::Render(msg),
        }
    }
}

/// Renders configuration format strings.
#[derive(Debug, Clone, Default)]
pub struct TemplateEngine;

impl TemplateEngine {
    /// Engine that fails on unknown placeholders.
    pub fn new() -> Self {
        Self
    }

    fn create_env(&self) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env
    }

    /// Render a Jinja2 template string.
    pub fn render(&self, template: &str, context: &Context) -> Result<String, TemplateError> {
        let env = self.create_env();
        let tmpl = env.template_from_str(template)?;
        Ok(tmpl.render(context.to_value())?)
    }

    /// Render a single-brace format string (`{name}`).
    pub fn render_simple(&self, template: &str, context: &Context) -> Result<String, TemplateError> {
        if template.is_empty() {
            return Ok(String::new());
        }
        self.render(&convert_simple_braces(template), context)
    }
}

/// Convert simple brace syntax `{var}` to Jinja2 syntax `{{ var }}`.
///
/// Existing `{{ }}`, `{% %}` and `{# #}` blocks are copied through untouched.
fn convert_simple_braces(input: &str) -> String {
    let mut result = String::with_capacity(input.len() * 2);
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut i = 0;

    while i < len {
        let c = chars[i];

        if c == '{' {
            if let Some(&next) = chars.get(i + 1) {
                let close_char = match next {
                    '{' => Some('}'),
                    '%' => Some('%'),
                    '#' => Some('#'),
                    _ => None,
                };
                if let Some(close_char) = close_char {
                    result.push(c);
                    result.push(next);
                    i += 2;

                    while i < len {
                        if chars[i] == close_char && chars.get(i + 1) == Some(&'}') {
                            result.push(chars[i]);
                            result.push('}');
                            i += 2;
                            break;
                        }
                        result.push(chars[i]);
                        i += 1;
                    }
                    continue;
                }
            }

            if let Some(offset) = chars[i + 1..].iter().position(|&ch| ch == '}') {
                let end = i + 1 + offset;
                let expr: String = chars[i + 1..end].iter().collect();
                if is_valid_var_expr(&expr) {
                    result.push_str("{{ ");
                    result.push_str(expr.trim());
                    result.push_str(" }}");
                    i = end + 1;
                    continue;
                }
            }
        }

        result.push(c);
        i += 1;
    }

    result
}

/// Placeholder names: identifiers with optional dotted access.
fn is_valid_var_expr(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty()
        && !s.starts_with(|c: char| c.is_ascii_digit())
        && s.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}

/// Template context (variable bindings).
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: BTreeMap<String, ContextValue>,
}

/// A value in the template context.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    String(String),
    Number(i64),
    Bool(bool),
    List(Vec<ContextValue>),
    Object(BTreeMap<String, ContextValue>),
    Null,
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        ContextValue::String(s.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        ContextValue::String(s)
    }
}

impl From<i64> for ContextValue {
    fn from(n: i64) -> Self {
        ContextValue::Number(n)
    }
}

impl From<usize> for ContextValue {
    fn from(n: usize) -> Self {
        ContextValue::Number(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<bool> for ContextValue {
    fn from(b: bool) -> Self {
        ContextValue::Bool(b)
    }
}

impl From<Context> for ContextValue {
    fn from(ctx: Context) -> Self {
        ContextValue::Object(ctx.values)
    }
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Set a value in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    /// Convert the context to a minijinja Value.
    pub fn to_value(&self) -> Value {
        context_value_to_minijinja(&ContextValue::Object(self.values.clone()))
    }
}

fn context_value_to_minijinja(cv: &ContextValue) -> Value {
    match cv {
        ContextValue::String(s) => Value::from(s.clone()),
        ContextValue::Number(n) => Value::from(*n),
        ContextValue::Bool(b) => Value::from(*b),
        ContextValue::List(list) => Value::from(
            list.iter()
                .map(context_value_to_minijinja)
                .collect::<Vec<_>>(),
        ),
        ContextValue::Object(obj) => Value::from_iter(
            obj.iter()
                .map(|(k, v)| (k.clone(), context_value_to_minijinja(v))),
        ),
        ContextValue::Null => Value::from(()),
    }
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
