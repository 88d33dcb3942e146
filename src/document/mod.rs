//! Read-only helpers over a parsed `scraper::Html` tree.
//!
//! A product container is just an `ElementRef`; these functions give the
//! extractor the handful of text views it needs without ever mutating the tree.

use scraper::{ElementRef, Html};
use scraper::node::Node;

/// Block-level tags scanned by the price-bearing fallback.
pub const BLOCK_TAGS: [&str; 3] = ["div", "article", "section"];

/// Every descendant text node concatenated, whitespace untouched.
pub fn flat_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Each descendant text node trimmed; empty ones dropped.
pub fn stripped_strings(el: ElementRef<'_>) -> Vec<String> {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trimmed text nodes glued together without separator.
pub fn stripped_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).collect()
}

/// Descendant elements (the element itself excluded) in document order.
pub fn descendant_elements(el: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    el.descendants().skip(1).filter_map(ElementRef::wrap).collect()
}

/// All elements with one of `tags`, in document order.
pub fn elements_by_tag<'a>(doc: &'a Html, tags: &[&str]) -> Vec<ElementRef<'a>> {
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| tags.contains(&el.value().name()))
        .collect()
}

/// Text nodes of the whole document paired with their parent element.
pub fn text_nodes(doc: &Html) -> Vec<(&str, ElementRef<'_>)> {
    doc.root_element()
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => {
                let parent = node.parent().and_then(ElementRef::wrap)?;
                Some((&**text, parent))
            }
            _ => None,
        })
        .collect()
}

/// Element ancestors starting with `el` itself, at most `limit` of them.
pub fn self_and_ancestors(el: ElementRef<'_>, limit: usize) -> Vec<ElementRef<'_>> {
    std::iter::once(el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .take(limit)
        .collect()
}

/// Character count, the unit every length threshold is expressed in.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub fn has_letter(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    fn first<'a>(doc: &'a Html, css: &str) -> ElementRef<'a> {
        let sel = Selector::parse(css).unwrap();
        doc.select(&sel).next().unwrap()
    }

    #[test]
    fn test_text_views() {
        let doc = Html::parse_fragment("<div id=\"c\"><h3> Ooty Carrot </h3>\n<span>₹40</span></div>");
        let el = first(&doc, "#c");
        assert_eq!(flat_text(el), " Ooty Carrot \n₹40");
        assert_eq!(stripped_text(el), "Ooty Carrot₹40");
        assert_eq!(stripped_strings(el), vec!["Ooty Carrot", "₹40"]);
    }

    #[test]
    fn test_descendants_exclude_self() {
        let doc = Html::parse_fragment("<div id=\"c\"><div><p>x</p></div></div>");
        let names: Vec<&str> = descendant_elements(first(&doc, "#c"))
            .iter()
            .map(|e| e.value().name())
            .collect();
        assert_eq!(names, vec!["div", "p"]);
    }

    #[test]
    fn test_text_nodes_and_ancestors() {
        let doc = Html::parse_fragment("<section><div><span>₹40</span></div></section>");
        let nodes = text_nodes(&doc);
        assert_eq!(nodes.len(), 1);
        let (text, parent) = nodes[0];
        assert_eq!(text, "₹40");
        assert_eq!(parent.value().name(), "span");

        let chain: Vec<&str> = self_and_ancestors(parent, 3)
            .iter()
            .map(|e| e.value().name())
            .collect();
        assert_eq!(chain, vec!["span", "div", "section"]);
    }

    #[test]
    fn test_char_len_counts_chars() {
        assert_eq!(char_len("₹40"), 3);
        assert!(has_letter("₹40 kg"));
        assert!(!has_letter("₹40"));
    }
}
