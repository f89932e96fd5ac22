// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use serde_json::{Value, json};

/// A page with one main zone and `lines` lines of `words` words each. Every
/// other word is highlighted and every third line carries a strikethrough.
#[allow(dead_code)]
pub fn generate_transcript(lines: usize, words: usize) -> String {
    let mut content = String::new();
    let mut annotations: Vec<Value> = Vec::new();
    let mut push = |name: &str, data: Value, start: usize, end: usize| {
        let id = annotations.len();
        annotations.push(json!({"n": name, "d": data, "t": [[start, end, 1]], "id": id}));
    };

    let mut line_starts = Vec::with_capacity(lines);
    for line in 0..lines {
        let start = content.len();
        line_starts.push(start);
        for word in 0..words {
            let word_start = content.len();
            content.push_str("word");
            if word % 2 == 1 {
                push(
                    "hi",
                    json!({"xml:node": format!("{}/{}/1", word + 1, line + 1), "rend": "underline"}),
                    word_start,
                    content.len(),
                );
            }
            content.push(' ');
        }
        let end = content.len() - 1;
        push("line", json!({"xml:node": format!("{}/1", line + 1)}), start, end);
        if line % 3 == 0 {
            push("mod", json!({"rend": "strikethrough"}), start, end);
        }
    }
    push("zone", json!({"xml:node": "1", "type": "main"}), 0, content.len());

    json!({
        "text": {"id": 1, "t": "transcript"},
        "textContent": content,
        "names": {
            "zone": [null, "zone"],
            "line": [null, "line"],
            "hi": [null, "hi"],
            "mod": [null, "mod"],
        },
        "annotations": annotations,
    })
    .to_string()
}
