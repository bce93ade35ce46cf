use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{NODE_RADIUS, NodeRole, ResultGraphState, Scene};
use crate::components::geometry::{Point, Segment};
use crate::components::result_graph::snap::SLOT_RADIUS;

const BACKGROUND: &str = "#1a1a2e";
const EDGE_COLOR: &str = "rgba(100, 180, 255, 0.6)";
const CONFLICT_COLOR: &str = "#ff5c5c";
const CANONICAL_COLOR: &str = "rgba(255, 200, 90, 0.9)";
const CONNECTOR_COLOR: &str = "rgba(255, 255, 255, 0.35)";

pub fn render(state: &ResultGraphState, ctx: &CanvasRenderingContext2d) {
	let (width, height) = (state.viewport.width, state.viewport.height);
	let transform = state.viewport.transform();
	let scene = state.scene();

	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);
	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);
	let k = transform.k;

	for edge in &scene.edges {
		let color = if edge.conflict { CONFLICT_COLOR } else { EDGE_COLOR };
		stroke_segment(ctx, &edge.segment, color, 1.5 / k);
	}
	draw_canonical(&scene, ctx, k);
	draw_connectors(&scene, ctx, k);
	for edge in &scene.animated_edges {
		stroke_segment(ctx, edge, CANONICAL_COLOR, 2.5 / k);
	}
	draw_nodes(&scene, ctx, k);
	ctx.restore();

	if scene.progress.total > 0 {
		draw_progress(&scene, ctx, width, height);
	}
}

fn stroke_segment(ctx: &CanvasRenderingContext2d, s: &Segment, color: &str, width: f64) {
	ctx.set_stroke_style_str(color);
	ctx.set_line_width(width);
	ctx.begin_path();
	ctx.move_to(s.from.x, s.from.y);
	ctx.line_to(s.to.x, s.to.y);
	ctx.stroke();
}

fn disc(ctx: &CanvasRenderingContext2d, p: Point, radius: f64, fill: &str) {
	ctx.begin_path();
	let _ = ctx.arc(p.x, p.y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(fill);
	ctx.fill();
}

fn label(ctx: &CanvasRenderingContext2d, p: Point, text: &str, k: f64) {
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.8)");
	ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
	let _ = ctx.fill_text(text, p.x + 10.0, p.y + 4.0);
}

fn draw_canonical(scene: &Scene, ctx: &CanvasRenderingContext2d, k: f64) {
	for edge in &scene.canonical_edges {
		stroke_segment(ctx, edge, CANONICAL_COLOR, 2.0 / k);
	}
	for slot in &scene.slots {
		if slot.visible {
			disc(ctx, slot.position, SLOT_RADIUS, CANONICAL_COLOR);
			label(ctx, slot.position, &slot.label, k);
		}
		if let Some((radius, alpha)) = slot.pulse {
			ctx.set_global_alpha(alpha);
			ctx.begin_path();
			let _ = ctx.arc(slot.position.x, slot.position.y, radius, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(CANONICAL_COLOR);
			ctx.set_line_width(2.0 / k);
			ctx.stroke();
			ctx.set_global_alpha(1.0);
		}
	}
}

fn draw_connectors(scene: &Scene, ctx: &CanvasRenderingContext2d, k: f64) {
	if scene.connectors.is_empty() {
		return;
	}
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(6.0 / k),
		&JsValue::from_f64(4.0 / k),
	));
	for connector in &scene.connectors {
		stroke_segment(ctx, connector, CONNECTOR_COLOR, 1.0 / k);
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(scene: &Scene, ctx: &CanvasRenderingContext2d, k: f64) {
	for node in &scene.nodes {
		let fill = match node.role {
			NodeRole::Principal => CONFLICT_COLOR,
			NodeRole::Subdivision => "#ffa3a3",
			NodeRole::Plain => "#1f77b4",
		};
		disc(ctx, node.position, NODE_RADIUS, fill);
		if node.snapped {
			let ring = NODE_RADIUS + 3.0 / k;
			ctx.begin_path();
			let _ = ctx.arc(node.position.x, node.position.y, ring, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(CANONICAL_COLOR);
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}
		label(ctx, node.position, node.id.as_str(), k);
	}
	for node in &scene.animated_nodes {
		disc(ctx, node.position, NODE_RADIUS, "#2ca02c");
		label(ctx, node.position, &node.label, k);
	}
}

fn draw_progress(scene: &Scene, ctx: &CanvasRenderingContext2d, width: f64, height: f64) {
	let bar_width = width * 0.4;
	let (x, y) = ((width - bar_width) / 2.0, height - 24.0);
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.15)");
	ctx.fill_rect(x, y, bar_width, 6.0);
	ctx.set_fill_style_str(CANONICAL_COLOR);
	ctx.fill_rect(x, y, bar_width * scene.progress.percent() / 100.0, 6.0);
	ctx.set_fill_style_str("white");
	ctx.set_font("12px sans-serif");
	let _ = ctx.fill_text(&scene.progress.label(), x, y - 6.0);
}
