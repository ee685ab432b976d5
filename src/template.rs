//! `{name}` placeholder templates for directory and file names.
//!
//! Templates are plain strings such as `pfsSingle/{catId}/{tract}/{patch}`. Each
//! placeholder names a filter; rendering substitutes a string per name. The same
//! template renders a concrete path (from formatted values) or a glob expression (from
//! glob fragments).

use crate::core::{FinderError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex"));

/// Substitute every `{name}` in `template` with `values[name]`.
///
/// A placeholder without a value is an [`FinderError::InvalidPattern`]; text outside
/// placeholders is copied verbatim.
pub fn render(template: &str, values: &HashMap<String, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let whole = caps.get(0).expect("group 0 always participates");
        let name = &caps[1];
        let value = values.get(name).ok_or_else(|| FinderError::InvalidPattern {
            pattern: template.to_string(),
            reason: format!("no value for placeholder '{{{name}}}'"),
        })?;
        out.push_str(&template[last..whole.start()]);
        out.push_str(value);
        last = whole.end();
    }
    out.push_str(&template[last..]);

    Ok(out)
}
