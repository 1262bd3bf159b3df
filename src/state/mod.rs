pub mod gesture;
pub mod render_state;
pub mod viewport;

pub use gesture::{Cursor, PointerMode};
pub use render_state::{RenderState, StoryFocus};
pub use viewport::{ViewSnapshot, Viewport};
