use std::collections::BTreeSet;

use proptest::prelude::*;
use serde_json::{Value, json};
use transcript_layout_engine::{adhoc::AdhocTree, text::Text};

const NAMES: [&str; 4] = ["zone", "line", "hi", "seg"];

#[derive(Debug, Clone)]
enum Node {
    Text(String),
    Element(&'static str, Vec<Node>),
}

fn nodes() -> impl Strategy<Value = Vec<Node>> {
    let leaf = "[a-c]{1,3}".prop_map(Node::Text);
    let node = leaf.prop_recursive(4, 32, 4, |inner| {
        (prop::sample::select(NAMES.to_vec()), prop::collection::vec(inner, 1..4))
            .prop_map(|(name, children)| Node::Element(name, children))
    });
    prop::collection::vec(node, 1..4)
}

fn markup(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(s) => out.push_str(s),
            Node::Element(name, children) => {
                out.push_str(&format!("<{name}>"));
                markup(children, out);
                out.push_str(&format!("</{name}>"));
            }
        }
    }
}

/// Emits annotations children first, so load order differs from document
/// order.
fn flatten(nodes: &[Node], parent_path: &str, content: &mut String, annotations: &mut Vec<Value>) {
    for (i, node) in nodes.iter().enumerate() {
        match node {
            Node::Text(s) => content.push_str(s),
            Node::Element(name, children) => {
                let path = if parent_path.is_empty() {
                    format!("{}", i + 1)
                } else {
                    format!("{}/{parent_path}", i + 1)
                };
                let start = content.len();
                flatten(children, &path, content, annotations);
                let id = annotations.len();
                annotations.push(json!({
                    "n": name,
                    "d": {"xml:node": path},
                    "t": [[start, content.len(), 1]],
                    "id": id,
                }));
            }
        }
    }
}

fn load(nodes: &[Node]) -> Text {
    let mut content = String::new();
    let mut annotations = Vec::new();
    flatten(nodes, "", &mut content, &mut annotations);
    let names: serde_json::Map<String, Value> = NAMES
        .iter()
        .map(|n| (n.to_string(), json!([null, n])))
        .collect();
    let doc = json!({
        "text": {"id": 1},
        "textContent": content,
        "names": names,
        "annotations": annotations,
    });
    Text::from_json(&doc.to_string()).unwrap()
}

fn structural() -> BTreeSet<String> {
    NAMES.iter().map(|n| n.to_string()).collect()
}

proptest! {
    #[test]
    fn pure_nesting_is_reproduced(doc in nodes()) {
        let text = load(&doc);
        let tree = AdhocTree::build(&text, &structural());

        let mut expected = String::new();
        markup(&doc, &mut expected);
        prop_assert_eq!(tree.to_markup(&text), expected);
    }

    #[test]
    fn building_twice_is_identical(doc in nodes()) {
        let text = load(&doc);
        let a = AdhocTree::build(&text, &structural());
        let b = AdhocTree::build(&text, &structural());
        prop_assert_eq!(a.len(), b.len());
        prop_assert_eq!(a.to_markup(&text), b.to_markup(&text));
    }
}
