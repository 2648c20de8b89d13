//! Chronotag: inline timestamp tokens for live editors and static views
//!
//! A Rust/WASM implementation of timestamp decorations for Markdown-style
//! inline code.
//!
//! # Architecture
//!
//! ## Scanner Components
//! - `buffer.rs` - TextBuffer: host text access in byte or UTF-16 offsets
//! - `token.rs` - TokenMatcher: `` `2023-01-01` `` and `` `<t:1700000000:R>` `` recognition
//! - `resolve.rs` - Resolved instants (RFC 3339 and epoch seconds)
//! - `decoration.rs` - DecorationEngine: visible ranges + selection → decorations
//! - `conductor.rs` - DecorationConductor: recompute-on-notify state machine
//!
//! ## Render Components
//! - `markup.rs` - Minimal markup tree and HTML serialization
//! - `format.rs` - LocaleFormatter seam (chrono natively, `Intl` in the browser)
//! - `relative.rs` - Initial relative phrase ("3 years ago")
//! - `widget.rs` - Widget: the replacement fragment
//! - `static_view.rs` - StaticRenderer: one pass over read-only markup
//!
//! # Usage (native)
//! ```rust
//! use chronotag::{DecorationEngine, Selection, VisibleRange};
//!
//! let text = "Released `2023-01-01`, patched `<t:1700000000:R>`";
//! let visible = [VisibleRange::new(0, text.len())];
//!
//! let set = DecorationEngine::default().compute(text, &visible, &Selection::none());
//! assert_eq!(set.len(), 2);
//! assert_eq!(&text[set.decorations[0].from..set.decorations[0].to], "`2023-01-01`");
//! ```
//!
//! # Usage (WASM)
//! See [`wasm::TimestampDecorator`].

pub mod config;
pub mod error;
pub mod render;
pub mod scanner;
pub mod wasm;

// Public exports
pub use config::*;
pub use error::*;
pub use render::*;
pub use scanner::*;
pub use wasm::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("chronotag v{}", env!("CARGO_PKG_VERSION"))
}
