pub mod buffer;
pub mod token;
pub mod resolve;
pub mod decoration;
pub mod conductor;

pub use buffer::*;
pub use token::*;
pub use resolve::*;
pub use decoration::*;
pub use conductor::*;
