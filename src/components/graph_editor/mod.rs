mod component;
mod render;
pub mod state;

pub use component::GraphEditorCanvas;
pub use state::{EditorEvent, EditorState, Tool};
