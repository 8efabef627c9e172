// src/extractors/text.rs

use scraper::{node::Node, Html};

/// Character budget for extracted document text. Filings can run to tens of
/// megabytes of HTML; everything downstream (classifier window, AI excerpt,
/// cache) only needs the front of the document.
pub const MAX_DOC_CHARS: usize = 500_000;

/// Extracts visible text from a filing document: script/style subtrees are
/// dropped, each text node is whitespace-collapsed, and the nodes are joined
/// with newlines in document order.
pub fn html_to_text(html: &str) -> String {
    extract_visible_text(html, MAX_DOC_CHARS)
}

pub fn extract_visible_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let mut lines: Vec<String> = Vec::new();

    // Depth-first over the parsed tree; children pushed in reverse so they
    // pop in document order.
    let mut stack = vec![document.tree.root()];
    while let Some(node) = stack.pop() {
        if let Node::Element(element) = node.value() {
            let name = element.name();
            if name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style") {
                continue; // drop the whole subtree
            }
        }

        if let Node::Text(text) = node.value() {
            let line = collapse_whitespace(&text.text);
            if !line.is_empty() {
                lines.push(line);
            }
            continue;
        }

        let children: Vec<_> = node.children().collect();
        for child in children.into_iter().rev() {
            stack.push(child);
        }
    }

    truncate_chars(lines.join("\n"), max_chars)
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncation counts characters, not bytes, so a cut never lands inside a
/// multi-byte sequence.
fn truncate_chars(mut text: String, max_chars: usize) -> String {
    if let Some((idx, _)) = text.char_indices().nth(max_chars) {
        text.truncate(idx);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_and_style_subtrees() {
        let html = r#"
            <html><head>
            <style>body { color: red; }</style>
            <script>var tracked = true;</script>
            </head><body>
            <p>Item 1.01 Material Definitive Agreement</p>
            <div><script>more();</script><span>visible tail</span></div>
            </body></html>
        "#;
        let text = html_to_text(html);
        assert!(text.contains("Item 1.01 Material Definitive Agreement"));
        assert!(text.contains("visible tail"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("tracked"));
        assert!(!text.contains("more()"));
    }

    #[test]
    fn joins_text_nodes_with_newlines() {
        let html = "<body><p>first line</p><p>second line</p></body>";
        assert_eq!(html_to_text(html), "first line\nsecond line");
    }

    #[test]
    fn collapses_whitespace_within_a_node() {
        let html = "<body><p>spaced\n\t  out   words</p></body>";
        assert_eq!(html_to_text(html), "spaced out words");
    }

    #[test]
    fn truncates_on_character_boundaries() {
        let html = format!("<body><p>{}</p></body>", "é".repeat(50));
        let text = extract_visible_text(&html, 10);
        assert_eq!(text.chars().count(), 10);
        assert!(text.chars().all(|c| c == 'é'));
    }

    #[test]
    fn empty_document_extracts_to_empty_string() {
        assert_eq!(html_to_text(""), "");
    }
}
