use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{EditorState, NODE_RADIUS};

const SELECTED: &str = "#ffb347";

pub fn render(state: &EditorState, ctx: &CanvasRenderingContext2d) {
	let transform = state.viewport.transform();
	ctx.set_fill_style_str("#f7f7fb");
	ctx.fill_rect(0.0, 0.0, state.viewport.width, state.viewport.height);
	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);
	draw_edges(state, ctx, transform.k);
	draw_guide(state, ctx, transform.k);
	draw_nodes(state, ctx, transform.k);
	ctx.restore();
}

fn draw_edges(state: &EditorState, ctx: &CanvasRenderingContext2d, k: f64) {
	for edge in state.model.edges() {
		let Some(segment) = state.model.segment(edge) else {
			continue;
		};
		let selected = state.is_selected_edge(edge.id);
		ctx.set_stroke_style_str(if selected { SELECTED } else { "#555" });
		ctx.set_line_width(if selected { 4.0 / k } else { 2.0 / k });
		ctx.begin_path();
		ctx.move_to(segment.from.x, segment.from.y);
		ctx.line_to(segment.to.x, segment.to.y);
		ctx.stroke();
	}
}

fn draw_guide(state: &EditorState, ctx: &CanvasRenderingContext2d, k: f64) {
	let Some(guide) = state.guide_line() else {
		return;
	};
	ctx.set_stroke_style_str("rgba(31, 119, 180, 0.7)");
	ctx.set_line_width(1.5 / k);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(6.0 / k),
		&JsValue::from_f64(4.0 / k),
	));
	ctx.begin_path();
	ctx.move_to(guide.from.x, guide.from.y);
	ctx.line_to(guide.to.x, guide.to.y);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(state: &EditorState, ctx: &CanvasRenderingContext2d, k: f64) {
	let pending = state.pending_edge();
	for node in state.model.nodes() {
		let highlighted = state.is_selected_node(&node.id) || pending == Some(&node.id);
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, NODE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(if highlighted { SELECTED } else { "#1f77b4" });
		ctx.fill();
		ctx.set_stroke_style_str("white");
		ctx.set_line_width(2.0 / k);
		ctx.stroke();

		ctx.set_fill_style_str("white");
		ctx.set_font("bold 12px sans-serif");
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		let _ = ctx.fill_text(node.id.as_str(), node.x, node.y);
	}
	ctx.set_text_align("start");
	ctx.set_text_baseline("alphabetic");
}
