use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::range::Range;

/// Attribute map of an annotation. Values are always strings.
pub type AnnotationData = BTreeMap<String, String>;

/// Position of an annotation in [`Text::annotations`](super::model::Text::annotations).
pub type AnnotationRef = usize;

/// A qualified markup name, displayed as `{namespace}local`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Name {
    pub namespace: Option<String>,
    pub local: String,
}

impl Name {
    pub fn new(namespace: Option<String>, local: impl Into<String>) -> Self {
        Self {
            namespace,
            local: local.into(),
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{ns}}}{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// Which text a target points into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetText {
    /// The text that owns the annotation.
    Own,
    /// Some other text, by id.
    Foreign(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTarget {
    pub text: TargetText,
    pub range: Range,
}

/// One standoff annotation. Never mutated after load.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: String,
    pub name: Name,
    pub data: AnnotationData,
    pub targets: Vec<TextTarget>,
}

impl Annotation {
    pub fn local_name(&self) -> &str {
        &self.name.local
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Whitespace-separated tokens of an attribute, empty if absent.
    pub fn tokens(&self, key: &str) -> impl Iterator<Item = &str> {
        self.attr(key).unwrap_or_default().split_whitespace()
    }

    /// Range of the first target pointing into the owning text.
    pub fn local_range(&self) -> Option<Range> {
        self.targets
            .iter()
            .find(|t| t.text == TargetText::Own)
            .map(|t| t.range)
    }

    /// Ranges of every target pointing into the owning text.
    pub fn local_ranges(&self) -> impl Iterator<Item = Range> + '_ {
        self.targets
            .iter()
            .filter(|t| t.text == TargetText::Own)
            .map(|t| t.range)
    }
}
