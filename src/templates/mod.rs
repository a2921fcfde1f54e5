//! HTML and CSS for the web front end.
//!
//! - `styles` - CSS constants and theme
//! - `page` - the viewer + chat page with its inline script

mod page;
mod styles;

pub use page::render_page;
pub use styles::STYLE;
