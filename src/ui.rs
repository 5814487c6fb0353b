pub mod interface;
mod screen;
mod text_style;

pub use interface::{Capabilities, CharInput, Interface, LineInput};
pub use screen::Screen;
pub use text_style::TextStyle;
