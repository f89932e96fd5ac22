use std::cmp::Ordering;

use crate::text::{AnnotationRef, Range, Text};

/// Attribute holding an annotation's element path, leaf first, e.g. `2/1/4`
/// for the second child of the first child of the fourth root child.
pub const XML_NODE_ATTR: &str = "xml:node";

/// Document order of annotations, derived from their `xml:node` paths.
///
/// `None` stands for the tree root, which precedes and contains every
/// annotation. When either side lacks a usable path, order falls back to load
/// order and descent to "range contained in, loaded after".
#[derive(Debug, Clone)]
pub struct DocumentOrder {
    paths: Vec<Option<Vec<u32>>>,
    ranges: Vec<Option<Range>>,
}

impl DocumentOrder {
    pub fn new(text: &Text) -> Self {
        let annotations = text.annotations();
        Self {
            paths: annotations
                .iter()
                .map(|a| a.attr(XML_NODE_ATTR).and_then(parse_path))
                .collect(),
            ranges: annotations.iter().map(|a| a.local_range()).collect(),
        }
    }

    pub fn path(&self, a: AnnotationRef) -> Option<&[u32]> {
        self.paths[a].as_deref()
    }

    /// Ancestors sort before descendants, siblings by child index.
    pub fn compare(&self, a: AnnotationRef, b: AnnotationRef) -> Ordering {
        match (self.path(a), self.path(b)) {
            (Some(pa), Some(pb)) => pa.cmp(pb).then(a.cmp(&b)),
            _ => a.cmp(&b),
        }
    }

    /// Is `a` a strict descendant of `b`?
    pub fn is_descendant(&self, a: AnnotationRef, b: Option<AnnotationRef>) -> bool {
        let Some(b) = b else {
            return true;
        };
        if a == b {
            return false;
        }
        match (self.path(a), self.path(b)) {
            (Some(pa), Some(pb)) => pa.len() > pb.len() && pa.starts_with(pb),
            _ => match (self.ranges[a], self.ranges[b]) {
                (Some(ra), Some(rb)) => b < a && rb.includes(ra),
                _ => false,
            },
        }
    }
}

/// Parses a leaf-first path into root-first child indices.
fn parse_path(raw: &str) -> Option<Vec<u32>> {
    let mut path = raw
        .split('/')
        .filter(|step| !step.is_empty())
        .map(|step| step.trim().parse::<u32>().ok())
        .collect::<Option<Vec<_>>>()?;
    path.reverse();
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn text(nodes: &[(Option<&str>, usize, usize)]) -> Text {
        let annotations: Vec<_> = nodes
            .iter()
            .enumerate()
            .map(|(i, (path, s, e))| {
                let d = match path {
                    Some(p) => json!({ "xml:node": p }),
                    None => json!({}),
                };
                json!({"n": "0", "d": d, "t": [[s, e, 1]], "id": i})
            })
            .collect();
        let doc = json!({
            "text": {"id": 1},
            "textContent": "0123456789",
            "names": {"0": [null, "x"]},
            "annotations": annotations,
        });
        Text::from_json(&doc.to_string()).unwrap()
    }

    #[rstest]
    #[case("2/1/4", Some(vec![4, 1, 2]))]
    #[case("3", Some(vec![3]))]
    #[case("", Some(vec![]))]
    #[case("0/0", Some(vec![0, 0]))]
    #[case("a/1", None)]
    fn parses_leaf_first_paths(#[case] raw: &str, #[case] expected: Option<Vec<u32>>) {
        assert_eq!(parse_path(raw), expected);
    }

    #[test]
    fn path_order_puts_ancestors_first() {
        let t = text(&[(Some("1/1"), 0, 5), (Some("1"), 0, 10), (Some("2/1"), 5, 10), (Some("0/1"), 0, 0)]);
        let order = DocumentOrder::new(&t);
        let mut refs = vec![0, 1, 2, 3];
        refs.sort_by(|a, b| order.compare(*a, *b));
        assert_eq!(refs, vec![1, 3, 0, 2]);
    }

    #[test]
    fn descendant_means_strict_prefix() {
        let t = text(&[(Some("1"), 0, 10), (Some("2/1"), 5, 10), (Some("0/2/1"), 6, 7), (Some("2"), 0, 10)]);
        let order = DocumentOrder::new(&t);
        assert!(order.is_descendant(1, Some(0)));
        assert!(order.is_descendant(2, Some(0)));
        assert!(order.is_descendant(2, Some(1)));
        assert!(!order.is_descendant(0, Some(0)));
        assert!(!order.is_descendant(0, Some(1)));
        assert!(!order.is_descendant(1, Some(3)));
        assert!(order.is_descendant(3, None));
    }

    #[test]
    fn zero_child_index_is_a_real_step() {
        let t = text(&[(Some("0"), 0, 10), (Some("0/0"), 0, 4)]);
        let order = DocumentOrder::new(&t);
        assert!(order.is_descendant(1, Some(0)));
        assert_eq!(order.compare(0, 1), Ordering::Less);
    }

    #[test]
    fn missing_paths_fall_back_to_load_order_and_containment() {
        let t = text(&[(None, 0, 10), (Some("1/1"), 2, 4), (None, 5, 12)]);
        let order = DocumentOrder::new(&t);
        assert!(order.is_descendant(1, Some(0)));
        assert!(!order.is_descendant(0, Some(1)));
        assert!(!order.is_descendant(2, Some(0)));
        assert_eq!(order.compare(2, 0), Ordering::Greater);
    }
}
