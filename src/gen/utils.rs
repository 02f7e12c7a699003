//! Small shared helpers for the emitters.

use serde_json::Value;

pub(crate) use crate::model::scalar_text;

/// Escape a string for a double-quoted JS/TS literal.
pub(crate) fn escape_js(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render a document value as a TS literal expression.
pub(crate) fn ts_literal(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", escape_js(s)),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Render a numeric bound without a spurious fractional part, so a declared
/// `minimum: 1` emits as `1`, not `1.0`.
pub(crate) fn fmt_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Turn an arbitrary parameter name into a valid TS identifier:
/// `X-Request-Id` becomes `XRequestId`, a leading digit gets an underscore.
pub(crate) fn sanitize_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
            if upper_next {
                out.extend(c.to_uppercase());
                upper_next = false;
            } else {
                out.push(c);
            }
        } else {
            upper_next = !out.is_empty();
        }
    }
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Quote an interface property name when it is not a plain identifier.
pub(crate) fn quote_prop(name: &str) -> String {
    let plain = !name.is_empty()
        && name
            .starts_with(|c: char| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", escape_js(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_render_without_fractional_noise() {
        assert_eq!(fmt_number(1.0), "1");
        assert_eq!(fmt_number(100.0), "100");
        assert_eq!(fmt_number(0.5), "0.5");
        assert_eq!(fmt_number(-3.0), "-3");
    }

    #[test]
    fn identifiers_are_sanitized() {
        assert_eq!(sanitize_ident("limit"), "limit");
        assert_eq!(sanitize_ident("X-Request-Id"), "XRequestId");
        assert_eq!(sanitize_ident("2fast"), "_2fast");
        assert_eq!(sanitize_ident("page.size"), "pageSize");
    }

    #[test]
    fn property_names_are_quoted_when_needed() {
        assert_eq!(quote_prop("name"), "name");
        assert_eq!(quote_prop("content-type"), "\"content-type\"");
        assert_eq!(quote_prop("2x"), "\"2x\"");
    }
}
