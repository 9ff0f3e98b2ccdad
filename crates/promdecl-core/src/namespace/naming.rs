//! Identifier checks and subsystem name composition.

use crate::error::{Error, Result};

/// Identifiers reserved by the declaration API itself.
pub const FORBIDDEN_IDENTIFIERS: &[&str] = &[
    "counter",
    "gauge",
    "histogram",
    "summary",
    "declare",
    "declare_with",
    "push",
    "push_periodically",
    "with_presets",
    "subsystem",
    "id_for",
    "get",
    "child",
    "resolve",
    "scope",
];

/// Reject identifiers that would shadow a declaration operation.
pub fn check_identifier(identifier: &str) -> Result<()> {
    if FORBIDDEN_IDENTIFIERS.contains(&identifier) {
        return Err(Error::CollidingName(identifier.to_string()));
    }
    Ok(())
}

/// Join `identifier` onto an optional prefix chain with `_`.
pub fn join_prefix(prefix: Option<&str>, identifier: &str) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{p}_{identifier}"),
        _ => identifier.to_string(),
    }
}

/// A subsystem segment with one trailing `_` removed.
pub fn segment(name: &str) -> &str {
    name.strip_suffix('_').unwrap_or(name)
}
