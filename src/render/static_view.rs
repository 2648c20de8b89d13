//! Static view pass
//!
//! One walk over already-rendered, read-only markup. An inline `code`
//! element whose whole text is a token (no backticks, no extra characters)
//! gets its content replaced by the widget. Code blocks (`pre > code`) and
//! partial matches are left exactly as they were.

use crate::render::markup::{Element, Node};
use crate::render::widget::{RenderContext, Widget};
use crate::scanner::token::{Syntax, TokenMatcher};

#[derive(Debug, Clone)]
pub struct StaticRenderer {
    syntaxes: Vec<Syntax>,
}

impl StaticRenderer {
    pub fn new(syntaxes: &[Syntax]) -> Self {
        let mut enabled: Vec<Syntax> = Vec::with_capacity(syntaxes.len());
        for syntax in syntaxes {
            if !enabled.contains(syntax) {
                enabled.push(*syntax);
            }
        }
        Self { syntaxes: enabled }
    }

    /// Widget for the full text of one inline code element, if it is a valid token.
    pub fn widget_for(&self, text: &str) -> Option<Widget> {
        self.syntaxes.iter().find_map(|syntax| {
            TokenMatcher::shared(*syntax)
                .match_exact(text)
                .and_then(|fields| Widget::from_fields(&fields))
        })
    }

    /// Rewrite matching inline code elements under `root`. Returns how many
    /// elements were replaced.
    pub fn transform(&self, root: &mut Node, ctx: &RenderContext<'_>) -> usize {
        match root {
            Node::Text { .. } => 0,
            Node::Element(el) => self.transform_element(el, ctx),
        }
    }

    fn transform_element(&self, el: &mut Element, ctx: &RenderContext<'_>) -> usize {
        if el.has_tag("pre") {
            return 0;
        }
        if el.has_tag("code") {
            let text = Node::Element(el.clone()).text_content();
            return match self.widget_for(&text) {
                Some(widget) => {
                    el.children = vec![widget.render(ctx)];
                    1
                }
                None => 0,
            };
        }

        el.children
            .iter_mut()
            .map(|child| self.transform(child, ctx))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassNames;
    use crate::render::format::ChronoFormatter;
    use chrono::{TimeZone, Utc};

    fn code(text: &str) -> Element {
        Element::new("code").child(Node::text(text))
    }

    fn run(root: &mut Node) -> usize {
        let formatter = ChronoFormatter::utc();
        let classes = ClassNames::default();
        let ctx = RenderContext {
            formatter: &formatter,
            classes: &classes,
            threshold_years: 100,
            now: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        };
        StaticRenderer::new(&Syntax::ALL).transform(root, &ctx)
    }

    #[test]
    fn test_full_match_is_replaced() {
        let mut root: Node = Element::new("p")
            .child(Node::text("Released "))
            .child(code("<t:1700000000>"))
            .into();

        assert_eq!(run(&mut root), 1);

        let Node::Element(p) = &root else { panic!("root changed kind") };
        let Node::Element(code_el) = &p.children[1] else { panic!("code missing") };
        assert_eq!(code_el.children.len(), 1);
        let Node::Element(widget) = &code_el.children[0] else { panic!("no widget") };
        assert_eq!(widget.get_attr("class"), Some("timestamp timestamp-epoch_tag"));
        assert!(root.to_html().contains("datetime=\"2023-11-14T22:13:20.000Z\""));
    }

    #[test]
    fn test_partial_match_is_untouched() {
        let mut root: Node = Element::new("p")
            .child(code("prefix <t:1700000000> suffix"))
            .into();
        let before = root.to_html();

        assert_eq!(run(&mut root), 0);
        assert_eq!(root.to_html(), before);
    }

    #[test]
    fn test_code_blocks_are_skipped() {
        let mut root: Node = Element::new("div")
            .child(Element::new("pre").child(code("2023-01-01")))
            .child(Element::new("p").child(code("2023-01-01")))
            .into();

        assert_eq!(run(&mut root), 1);
        let html = root.to_html();
        assert!(html.starts_with("<div><pre><code>2023-01-01</code></pre>"));
    }

    #[test]
    fn test_invalid_date_is_untouched() {
        let mut root: Node = code("2023-13-45").into();
        assert_eq!(run(&mut root), 0);
        assert_eq!(root.to_html(), "<code>2023-13-45</code>");
    }

    #[test]
    fn test_disabled_syntax_is_ignored() {
        let renderer = StaticRenderer::new(&[Syntax::Rfc3339, Syntax::Rfc3339]);
        assert!(renderer.widget_for("<t:0>").is_none());
        assert!(renderer.widget_for("2023-01-01").is_some());
    }
}
