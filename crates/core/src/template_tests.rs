// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn user_context() -> Context {
    Context::new()
        .with("username", "jdoe")
        .with("first_name", "Jane")
        .with("days", 12i64)
        .with("days_overdue", 12i64)
}

// ============================================================================
// Simple brace conversion
// ============================================================================

#[parameterized(
    plain = { "no placeholders", "no placeholders" },
    single = { "{days}", "{{ days }}" },
    padded = { "{ days }", "{{ days }}" },
    dotted = { "{user.name}", "{{ user.name }}" },
    jinja_kept = { "{{ days }}", "{{ days }}" },
    block_kept = { "{% if x %}y{% endif %}", "{% if x %}y{% endif %}" },
    not_a_name = { "{1}", "{1}" },
    unterminated = { "{days", "{days" },
)]
fn converts_simple_braces(input: &str, expected: &str) {
    assert_eq!(convert_simple_braces(input), expected);
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn render_simple_substitutes_named_placeholders() {
    let engine = TemplateEngine::new();
    let result = engine
        .render_simple("Hello {first_name}, {days} days left", &user_context())
        .unwrap();
    assert_eq!(result, "Hello Jane, 12 days left");
}

#[test]
fn render_simple_empty_template_is_empty() {
    let engine = TemplateEngine::new();
    assert_eq!(engine.render_simple("", &Context::new()).unwrap(), "");
}

#[test]
fn strict_engine_rejects_unknown_placeholder() {
    let engine = TemplateEngine::new();
    let err = engine
        .render_simple("Hi {nickname}", &user_context())
        .unwrap_err();
    assert!(matches!(err, TemplateError::UndefinedVariable(_)), "{err}");
}

#[test]
fn syntax_errors_are_reported() {
    let engine = TemplateEngine::new();
    let err = engine
        .render("{% if %}", &Context::new())
        .unwrap_err();
    assert!(matches!(err, TemplateError::Syntax(_)), "{err}");
}

#[test]
fn nested_context_values_render() {
    let engine = TemplateEngine::new();
    let context = Context::new().with("user", Context::new().with("username", "jdoe"));
    let result = engine.render("{{ user.username }}", &context).unwrap();
    assert_eq!(result, "jdoe");
}

#[test]
fn lists_render_in_loops() {
    let engine = TemplateEngine::new();
    let context = Context::new().with(
        "names",
        ContextValue::List(vec!["a".into(), "b".into()]),
    );
    let result = engine
        .render("{% for n in names %}{{ n }};{% endfor %}", &context)
        .unwrap();
    assert_eq!(result, "a;b;");
}
