mod theme;
mod view;

pub use theme::Theme;
pub use view::{BodyView, UiContext, draw, scroll_offset};
