//! Graph model, editor and result-view building blocks.

pub mod geometry;
pub mod graph_editor;
pub mod model;
pub mod payload;
pub mod result_graph;
pub mod viewport;
