//! `{placeholder}` substitution for role and task templates.
//!
//! Only `{identifier}` sequences are placeholders; any other brace text
//! (JSON snippets, `{}` in prose) is left untouched.

use crate::crew::context::PipelineContext;
use regex::Regex;
use std::sync::OnceLock;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap())
}

/// Substitute every placeholder from `context`.
/// On failure returns the first placeholder name that has no value.
pub fn render(template: &str, context: &PipelineContext) -> Result<String, String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in placeholder_pattern().captures_iter(template) {
        let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
        let name = &caps[1];
        let value = context.get(name).ok_or_else(|| name.to_string())?;
        out.push_str(&template[last..whole.start]);
        out.push_str(value);
        last = whole.end;
    }

    out.push_str(&template[last..]);
    Ok(out)
}
