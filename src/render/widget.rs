//! Widget rendering
//!
//! One tagged variant per token syntax. A widget is plain data (cheap to
//! compare, so the host can reuse DOM for an unchanged decoration) and only
//! becomes markup when the host asks for it.
//!
//! Fragment shape:
//! ```html
//! <span class="timestamp timestamp-rfc3339">
//!   <span class="timestamp-absolute">Jan 1, 2023</span>
//!   <relative-time class="timestamp-relative" datetime="2023-01-01T00:00:00.000Z"
//!                  title="Sunday, January 1, 2023" threshold="P100Y">3 years ago</relative-time>
//! </span>
//! ```
//! Epoch tags omit the absolute label and the threshold. Their style flag
//! does not change the output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ClassNames;
use crate::render::format::{DateStyle, LocaleFormatter, Zone};
use crate::render::markup::{Element, Node};
use crate::render::relative::{exceeds_threshold, relative_phrase};
use crate::scanner::resolve::{resolve, ResolvedTimestamp};
use crate::scanner::token::{DatePrecision, StyleFlag, Syntax, TokenFields};

/// Everything a widget needs from its surroundings to render
pub struct RenderContext<'a> {
    pub formatter: &'a dyn LocaleFormatter,
    pub classes: &'a ClassNames,
    pub threshold_years: u32,
    /// Reference point for the initial relative phrase
    pub now: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(tag = "syntax", rename_all = "snake_case")]
pub enum Widget {
    Rfc3339 {
        instant: ResolvedTimestamp,
        precision: DatePrecision,
    },
    EpochTag {
        instant: ResolvedTimestamp,
        style: Option<StyleFlag>,
    },
}

impl Widget {
    /// Validate extracted fields. Tokens that do not resolve get no widget.
    pub fn from_fields(fields: &TokenFields) -> Option<Self> {
        let instant = resolve(fields)?;
        Some(match fields {
            TokenFields::Rfc3339 { .. } => Widget::Rfc3339 {
                instant,
                precision: fields.precision(),
            },
            TokenFields::EpochTag { style, .. } => Widget::EpochTag {
                instant,
                style: *style,
            },
        })
    }

    pub fn syntax(&self) -> Syntax {
        match self {
            Widget::Rfc3339 { .. } => Syntax::Rfc3339,
            Widget::EpochTag { .. } => Syntax::EpochTag,
        }
    }

    pub fn instant(&self) -> ResolvedTimestamp {
        match self {
            Widget::Rfc3339 { instant, .. } | Widget::EpochTag { instant, .. } => *instant,
        }
    }

    pub fn render(&self, ctx: &RenderContext<'_>) -> Node {
        let wrapper = Element::new("span").attr(
            "class",
            format!("{} {}-{}", ctx.classes.widget, ctx.classes.widget, self.syntax().as_str()),
        );

        match self {
            Widget::Rfc3339 { instant, precision } => {
                let (label_style, label_zone, tip_style, tip_zone) = match precision {
                    // Date-only inputs stay in UTC so the calendar day never shifts
                    DatePrecision::DateOnly => (DateStyle::Date, Zone::Utc, DateStyle::FullDate, Zone::Utc),
                    DatePrecision::DateTime => {
                        (DateStyle::DateTime, Zone::Viewer, DateStyle::FullDateTime, Zone::Viewer)
                    }
                };
                let label = ctx.formatter.format(instant, label_style, label_zone);
                let tooltip = ctx.formatter.format(instant, tip_style, tip_zone);

                let absolute = Element::new("span")
                    .attr("class", ctx.classes.absolute.clone())
                    .child(Node::text(label.clone()));

                let initial = if exceeds_threshold(instant.instant(), ctx.now, ctx.threshold_years) {
                    label
                } else {
                    relative_phrase(instant.instant(), ctx.now)
                };
                let relative = relative_time(ctx, instant, tooltip, initial)
                    .attr("threshold", format!("P{}Y", ctx.threshold_years));

                wrapper.child(absolute).child(relative).into()
            }
            Widget::EpochTag { instant, .. } => {
                let tooltip = ctx.formatter.format(instant, DateStyle::FullDateTime, Zone::Viewer);
                let initial = relative_phrase(instant.instant(), ctx.now);
                wrapper.child(relative_time(ctx, instant, tooltip, initial)).into()
            }
        }
    }

    pub fn render_html(&self, ctx: &RenderContext<'_>) -> String {
        self.render(ctx).to_html()
    }
}

fn relative_time(
    ctx: &RenderContext<'_>,
    instant: &ResolvedTimestamp,
    tooltip: String,
    initial: String,
) -> Element {
    Element::new("relative-time")
        .attr("class", ctx.classes.relative.clone())
        .attr("datetime", instant.iso())
        .attr("title", tooltip)
        .child(Node::text(initial))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::format::ChronoFormatter;
    use crate::scanner::token::{Syntax, TokenMatcher};
    use chrono::TimeZone;

    fn widget(syntax: Syntax, token: &str) -> Option<Widget> {
        TokenMatcher::new(syntax)
            .match_exact(token)
            .and_then(|fields| Widget::from_fields(&fields))
    }

    fn render(widget: &Widget, formatter: &ChronoFormatter) -> Element {
        let classes = ClassNames::default();
        let ctx = RenderContext {
            formatter,
            classes: &classes,
            threshold_years: 100,
            now: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        };
        match widget.render(&ctx) {
            Node::Element(el) => el,
            other => panic!("expected element, got {:?}", other),
        }
    }

    fn child(el: &Element, idx: usize) -> &Element {
        match &el.children[idx] {
            Node::Element(el) => el,
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_fields_produce_no_widget() {
        assert!(widget(Syntax::Rfc3339, "2023-13-45").is_none());
        assert!(widget(Syntax::EpochTag, "<t:99999999999999999999>").is_none());
    }

    #[test]
    fn test_date_only_fragment() {
        let w = widget(Syntax::Rfc3339, "2023-01-01").unwrap();
        // A viewer west of UTC must still see January 1st
        let el = render(&w, &ChronoFormatter::with_offset_minutes(-480).unwrap());

        assert_eq!(el.get_attr("class"), Some("timestamp timestamp-rfc3339"));
        assert_eq!(el.children.len(), 2);

        let absolute = child(&el, 0);
        assert_eq!(absolute.get_attr("class"), Some("timestamp-absolute"));
        assert_eq!(Node::Element(absolute.clone()).text_content(), "Jan 1, 2023");

        let relative = child(&el, 1);
        assert!(relative.has_tag("relative-time"));
        assert_eq!(relative.get_attr("datetime"), Some("2023-01-01T00:00:00.000Z"));
        assert_eq!(relative.get_attr("title"), Some("Sunday, January 1, 2023"));
        assert_eq!(relative.get_attr("threshold"), Some("P100Y"));
        assert_eq!(Node::Element(relative.clone()).text_content(), "3 years ago");
    }

    #[test]
    fn test_date_time_fragment_uses_viewer_zone() {
        let w = widget(Syntax::Rfc3339, "2023-01-01T10:00:00+01:00").unwrap();
        let el = render(&w, &ChronoFormatter::with_offset_minutes(120).unwrap());

        let absolute = Node::Element(child(&el, 0).clone()).text_content();
        assert_eq!(absolute, "Jan 1, 2023, 11:00 AM");

        let relative = child(&el, 1);
        assert_eq!(relative.get_attr("datetime"), Some("2023-01-01T09:00:00.000Z"));
        assert_eq!(
            relative.get_attr("title"),
            Some("Sunday, January 1, 2023 at 11:00:00 AM GMT+2")
        );
    }

    #[test]
    fn test_epoch_fragment_is_relative_only() {
        let w = widget(Syntax::EpochTag, "<t:0:R>").unwrap();
        let el = render(&w, &ChronoFormatter::utc());

        assert_eq!(el.get_attr("class"), Some("timestamp timestamp-epoch_tag"));
        assert_eq!(el.children.len(), 1);
        let relative = child(&el, 0);
        assert_eq!(relative.get_attr("datetime"), Some("1970-01-01T00:00:00.000Z"));
        assert_eq!(relative.get_attr("threshold"), None);
    }

    #[test]
    fn test_style_flag_does_not_change_rendering() {
        let formatter = ChronoFormatter::utc();
        let plain = render(&widget(Syntax::EpochTag, "<t:1700000000>").unwrap(), &formatter);
        for flag in ['t', 'T', 'd', 'D', 'f', 'F', 'R'] {
            let token = format!("<t:1700000000:{}>", flag);
            let flagged = render(&widget(Syntax::EpochTag, &token).unwrap(), &formatter);
            assert_eq!(flagged, plain, "flag {} changed output", flag);
        }
    }

    #[test]
    fn test_beyond_threshold_shows_absolute_text() {
        let w = widget(Syntax::Rfc3339, "1850-06-01").unwrap();
        let el = render(&w, &ChronoFormatter::utc());
        let relative = Node::Element(child(&el, 1).clone()).text_content();
        assert_eq!(relative, "Jun 1, 1850");
    }
}
