pub mod markup;
pub mod format;
pub mod relative;
pub mod widget;
pub mod static_view;

pub use markup::*;
pub use format::*;
pub use relative::*;
pub use widget::*;
pub use static_view::*;
