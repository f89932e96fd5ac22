//! Default policies, grouped by what they produce.

pub mod decoration;
pub mod inline;
pub mod structure;

use crate::{adhoc::NodeRef, text::Range};

/// Classes for a hand value such as `#g_t_lat`: `hand-g`, `material-t`,
/// `script-lat`. Empty segments are skipped.
pub fn hand_classes(value: &str) -> Vec<String> {
    let mut chars = value.chars();
    chars.next();
    let tokens: Vec<&str> = chars.as_str().split('_').collect();
    ["hand", "material", "script"]
        .iter()
        .zip(tokens)
        .filter(|(_, token)| !token.is_empty())
        .map(|(prefix, token)| format!("{prefix}-{token}"))
        .collect()
}

/// The full range of the node's annotation, falling back to the clipped node
/// range.
pub(crate) fn annotation_range(node: NodeRef<'_>) -> Range {
    node.annotation()
        .and_then(|a| a.local_range())
        .unwrap_or_else(|| node.range())
}

/// `rend` split into tokens; empty when absent.
pub(crate) fn rend_tokens<'a>(rend: Option<&'a str>) -> Vec<&'a str> {
    rend.map(|r| r.split_whitespace().collect()).unwrap_or_default()
}
