pub mod animation;
pub mod canonical;
mod component;
pub mod layout;
mod render;
pub mod snap;
pub mod state;

pub use component::{ResultGraphCanvas, ResultView};
pub use state::{ResultGraphState, ViewRole};
