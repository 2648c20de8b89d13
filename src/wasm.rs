//! TimestampDecorator: JavaScript host bindings
//!
//! The editor host owns the document and the event wiring. On every
//! notification it sends only what is on screen:
//!
//! ```javascript,ignore
//! import init, { TimestampDecorator } from 'chronotag';
//!
//! await init();
//! const decorator = new TimestampDecorator({ locale: 'en-US' });
//!
//! const result = decorator.update(
//!   { doc_changed: true },
//!   view.visibleRanges.map(r => ({ from: r.from, text: doc.sliceString(r.from, r.to) })),
//!   view.state.selection.ranges.map(r => ({ from: r.from, to: r.to })),
//! );
//! // result.decorations: [{ from, to, syntax, datetime, html }, ...]
//!
//! // Read-only views
//! decorator.renderStatic(document.querySelector('.markdown-body'));
//! ```
//!
//! Offsets are UTF-16 code units, the unit JavaScript strings use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::config::ChronotagConfig;
use crate::error::ChronotagError;
use crate::render::format::{IntlFormatter, LocaleFormatter};
use crate::render::static_view::StaticRenderer;
use crate::render::widget::RenderContext;
use crate::scanner::buffer::{VisibleSlice, VisibleText};
use crate::scanner::conductor::{ConductorStats, DecorationConductor, UpdateFlags};
use crate::scanner::decoration::{
    DecorationEngine, DecorationSet, DecorationStats, Selection, SelectionRange, VisibleRange,
};

// =============================================================================
// Boundary types
// =============================================================================

/// One decoration as handed to the host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecorationView {
    pub from: usize,
    pub to: usize,
    pub syntax: String,
    /// Machine-readable instant; stable across renders, usable as a DOM key
    pub datetime: String,
    pub html: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeResult {
    pub decorations: Vec<DecorationView>,
    pub stats: DecorationStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoratorStats {
    pub conductor: ConductorStats,
    pub last_scan: DecorationStats,
    pub static_replacements: u64,
}

/// Render every decoration of `set` to host-ready markup.
pub fn present(set: &DecorationSet, ctx: &RenderContext<'_>) -> ComputeResult {
    let decorations = set
        .iter()
        .map(|d| DecorationView {
            from: d.from,
            to: d.to,
            syntax: d.widget.syntax().as_str().to_string(),
            datetime: d.widget.instant().iso(),
            html: d.widget.render_html(ctx),
        })
        .collect();

    ComputeResult {
        decorations,
        stats: set.stats.clone(),
    }
}

fn visible_ranges(text: &VisibleText) -> Vec<VisibleRange> {
    text.ranges()
        .into_iter()
        .map(|r| VisibleRange::new(r.start, r.end))
        .collect()
}

fn host_now() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, ChronotagError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| ChronotagError::Serialization {
        reason: e.to_string(),
    })
}

// =============================================================================
// TimestampDecorator
// =============================================================================

#[wasm_bindgen]
pub struct TimestampDecorator {
    config: ChronotagConfig,
    conductor: DecorationConductor,
    renderer: StaticRenderer,
    formatter: IntlFormatter,
    static_replacements: u64,
}

#[wasm_bindgen]
impl TimestampDecorator {
    /// `config` may be `undefined`, `null`, or any subset of the config keys.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<TimestampDecorator, JsValue> {
        let config: ChronotagConfig = if config.is_undefined() || config.is_null() {
            ChronotagConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?
        };
        config
            .validate()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(Self::with_config(config))
    }

    /// One-off scan of the given windows. Does not touch the active set.
    #[wasm_bindgen(js_name = computeDecorations)]
    pub fn js_compute_decorations(&self, slices: JsValue, selection: JsValue) -> Result<JsValue, JsValue> {
        let (text, selection) = Self::read_inputs(slices, selection)?;
        let set = self
            .conductor
            .engine()
            .compute(&text, &visible_ranges(&text), &selection);
        self.respond(&set)
    }

    /// Host notification. Returns the new active set.
    #[wasm_bindgen(js_name = update)]
    pub fn js_update(&mut self, flags: JsValue, slices: JsValue, selection: JsValue) -> Result<JsValue, JsValue> {
        let flags: UpdateFlags = if flags.is_undefined() || flags.is_null() {
            UpdateFlags::default()
        } else {
            serde_wasm_bindgen::from_value(flags)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse update flags: {}", e)))?
        };
        let (text, selection) = Self::read_inputs(slices, selection)?;

        self.conductor
            .update(flags, &text, &visible_ranges(&text), &selection);
        let set = self.conductor.decorations().clone();
        self.respond(&set)
    }

    /// Drop the active set, e.g. when the editor view is destroyed.
    #[wasm_bindgen(js_name = detach)]
    pub fn js_detach(&mut self) {
        self.conductor.detach();
    }

    /// Replace every inline `code` element under `root` whose whole text is
    /// a token. Returns the number of elements replaced.
    #[wasm_bindgen(js_name = renderStatic)]
    pub fn js_render_static(&mut self, root: web_sys::Element) -> Result<u32, JsValue> {
        let nodes = root.query_selector_all("code")?;
        let now = host_now();
        let ctx = self.context(now);
        let mut replaced = 0;

        for i in 0..nodes.length() {
            let Some(node) = nodes.get(i) else { continue };
            let Ok(code) = node.dyn_into::<web_sys::Element>() else { continue };
            if code.closest("pre")?.is_some() {
                continue;
            }
            let text = code.text_content().unwrap_or_default();
            if let Some(widget) = self.renderer.widget_for(&text) {
                code.set_inner_html(&widget.render_html(&ctx));
                replaced += 1;
            }
        }

        self.static_replacements += u64::from(replaced);
        Ok(replaced)
    }

    /// Markup for the full text of one code element, or `undefined` if the
    /// text is not exactly one valid token.
    #[wasm_bindgen(js_name = renderToken)]
    pub fn js_render_token(&self, text: &str) -> Option<String> {
        let widget = self.renderer.widget_for(text)?;
        Some(widget.render_html(&self.context(host_now())))
    }

    #[wasm_bindgen(js_name = getStats)]
    pub fn js_get_stats(&self) -> JsValue {
        let stats = DecoratorStats {
            conductor: self.conductor.stats(),
            last_scan: self.conductor.decorations().stats.clone(),
            static_replacements: self.static_replacements,
        };
        match to_js(&stats) {
            Ok(v) => v,
            Err(e) => {
                web_sys::console::error_1(&format!("[TimestampDecorator] {}", e).into());
                JsValue::NULL
            }
        }
    }

    #[wasm_bindgen(js_name = isAttached)]
    pub fn js_is_attached(&self) -> bool {
        self.conductor.is_attached()
    }
}

impl TimestampDecorator {
    pub fn with_config(config: ChronotagConfig) -> Self {
        Self {
            conductor: DecorationConductor::new(DecorationEngine::new(&config.syntaxes)),
            renderer: StaticRenderer::new(&config.syntaxes),
            formatter: IntlFormatter::new(config.locale.clone()),
            static_replacements: 0,
            config,
        }
    }

    pub fn config(&self) -> &ChronotagConfig {
        &self.config
    }

    fn context(&self, now: DateTime<Utc>) -> RenderContext<'_> {
        RenderContext {
            formatter: &self.formatter as &dyn LocaleFormatter,
            classes: &self.config.classes,
            threshold_years: self.config.relative_threshold_years,
            now,
        }
    }

    fn read_inputs(slices: JsValue, selection: JsValue) -> Result<(VisibleText, Selection), JsValue> {
        let slices: Vec<VisibleSlice> = serde_wasm_bindgen::from_value(slices)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse visible slices: {}", e)))?;
        let ranges: Vec<SelectionRange> = if selection.is_undefined() || selection.is_null() {
            Vec::new()
        } else {
            serde_wasm_bindgen::from_value(selection)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse selection: {}", e)))?
        };
        Ok((VisibleText::new(slices), Selection::new(ranges)))
    }

    fn respond(&self, set: &DecorationSet) -> Result<JsValue, JsValue> {
        let result = present(set, &self.context(host_now()));
        to_js(&result).map_err(|e| {
            web_sys::console::error_1(&format!("[TimestampDecorator] {}", e).into());
            JsValue::from_str(&e.to_string())
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassNames;
    use crate::render::format::ChronoFormatter;
    use chrono::TimeZone;

    #[test]
    fn test_present_renders_each_decoration() {
        let text = VisibleText::new(vec![VisibleSlice::new(40, "at `<t:0>` and `2023-01-01`")]);
        let set = DecorationEngine::default().compute(&text, &visible_ranges(&text), &Selection::none());

        let formatter = ChronoFormatter::utc();
        let classes = ClassNames::default();
        let ctx = RenderContext {
            formatter: &formatter,
            classes: &classes,
            threshold_years: 100,
            now: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        };
        let result = present(&set, &ctx);

        assert_eq!(result.decorations.len(), 2);
        let epoch = &result.decorations[0];
        assert_eq!((epoch.from, epoch.to), (43, 50));
        assert_eq!(epoch.syntax, "epoch_tag");
        assert_eq!(epoch.datetime, "1970-01-01T00:00:00.000Z");
        assert!(epoch.html.starts_with("<span class=\"timestamp timestamp-epoch_tag\">"));

        let rfc = &result.decorations[1];
        assert_eq!(rfc.syntax, "rfc3339");
        assert!(rfc.html.contains("Jan 1, 2023"));
        assert_eq!(result.stats.emitted, 2);
    }

    #[test]
    fn test_config_selects_pipelines() {
        let decorator = TimestampDecorator::with_config(ChronotagConfig::epoch_tag_only());
        assert!(decorator.renderer.widget_for("2023-01-01").is_none());
        assert!(decorator.renderer.widget_for("<t:0>").is_some());
        assert_eq!(decorator.conductor.engine().syntaxes(), &[crate::scanner::token::Syntax::EpochTag]);
        assert!(decorator.config().locale.is_none());
    }
}
