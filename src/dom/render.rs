//! [`Document`] -> HTML text.

use super::{Document, NodeId, NodeKind};

/// Elements serialized without a closing tag.
const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text children are written verbatim.
const RAW_TEXT: &[&str] = &["script", "style"];

pub(super) fn render_document(doc: &Document) -> String {
    let mut out = String::with_capacity(4096);
    if let Some(doctype) = doc.doctype() {
        out.push_str(doctype);
        out.push('\n');
    }
    write_node(doc, doc.document_element(), false, &mut out);
    out.push('\n');
    out
}

pub(super) fn render_node(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, node, false, &mut out);
    out
}

fn write_node(doc: &Document, node: NodeId, raw: bool, out: &mut String) {
    match doc.kind(node) {
        Some(NodeKind::Document) => {
            for &child in doc.children(node) {
                write_node(doc, child, false, out);
            }
        }
        Some(NodeKind::Text(text)) if raw => out.push_str(text),
        Some(NodeKind::Text(text)) => escape_into(text, false, out),
        Some(NodeKind::Element(data)) => {
            out.push('<');
            out.push_str(&data.tag);
            for (name, value) in &data.attrs {
                out.push(' ');
                out.push_str(name);
                if !value.is_empty() {
                    out.push_str("=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
            }
            out.push('>');

            if VOID.contains(&data.tag.as_str()) {
                return;
            }

            let raw = RAW_TEXT.contains(&data.tag.as_str());
            for &child in doc.children(node) {
                write_node(doc, child, raw, out);
            }
            out.push_str("</");
            out.push_str(&data.tag);
            out.push('>');
        }
        None => {}
    }
}

fn escape_into(text: &str, attr: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_void_and_escaping() {
        let doc = Document::parse(r#"<p title="a &quot;b&quot;">1 &lt; 2</p><img src="x.png">"#);
        let html = doc.to_html();
        assert!(html.contains(r#"<p title="a &quot;b&quot;">1 &lt; 2</p>"#));
        assert!(html.contains(r#"<img src="x.png">"#));
        assert!(!html.contains("</img>"));
    }

    #[test]
    fn test_render_script_is_raw() {
        let doc = Document::parse("<script>if (a < b) { go(); }</script>");
        let script = doc.query(doc.root(), "script").unwrap();
        assert_eq!(
            doc.outer_html(script),
            "<script>if (a < b) { go(); }</script>"
        );
    }

    #[test]
    fn test_render_reparse_is_stable() {
        let doc = Document::parse("<!DOCTYPE html><html><body><div class=\"a\"><b>x</b></div></body></html>");
        let once = doc.to_html();
        let twice = Document::parse(&once).to_html();
        assert_eq!(once, twice);
    }
}
