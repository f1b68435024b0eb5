//! Prompt template rendering.
//!
//! Templates use `{name}` placeholders. Doubled braces (`{{`, `}}`) render as
//! literal braces.

use serde_json::{Map, Value};
use thiserror::Error;

/// Error raised while rendering a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Missing data for placeholder in template: '{0}'")]
    MissingPlaceholder(String),
    #[error("Error formatting template: {0}")]
    Malformed(String),
}

/// Renders a template against the given input fields.
///
/// Every placeholder must have a matching key. Extra keys are ignored.
pub fn render(template: &str, fields: &Map<String, Value>) -> Result<String, RenderError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    out.push('{');
                    continue;
                }

                let mut name = String::new();
                let mut closed = false;
                for (_, nc) in chars.by_ref() {
                    if nc == '}' {
                        closed = true;
                        break;
                    }
                    if nc == '{' {
                        return Err(RenderError::Malformed(format!(
                            "unexpected '{{' inside placeholder at position {}",
                            pos
                        )));
                    }
                    name.push(nc);
                }

                if !closed {
                    return Err(RenderError::Malformed(format!(
                        "single '{{' encountered at position {}",
                        pos
                    )));
                }

                let name = validate_placeholder(&name, pos)?;
                let value = fields
                    .get(name)
                    .ok_or_else(|| RenderError::MissingPlaceholder(name.to_string()))?;
                push_value(&mut out, value);
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(RenderError::Malformed(format!(
                        "single '}}' encountered at position {}",
                        pos
                    )));
                }
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

fn validate_placeholder(name: &str, pos: usize) -> Result<&str, RenderError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RenderError::Malformed(format!(
            "empty placeholder at position {}",
            pos
        )));
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(RenderError::Malformed(format!(
            "positional placeholder '{{{}}}' is not supported",
            trimmed
        )));
    }
    if let Some(bad) = trimmed
        .chars()
        .find(|c| !(c.is_alphanumeric() || *c == '_'))
    {
        return Err(RenderError::Malformed(format!(
            "invalid character '{}' in placeholder '{}'",
            bad, trimmed
        )));
    }
    Ok(trimmed)
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => out.push_str(s),
        other => out.push_str(&other.to_string()),
    }
}
