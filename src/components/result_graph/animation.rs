//! Step-by-step replay of the conflict edges onto the canonical drawing.

use log::debug;

use super::canonical::CanonicalGraph;
use crate::components::geometry::{Easing, Point, Segment, Transition};
use crate::components::model::GraphModel;
use crate::components::payload::NodeId;

/// Seconds for an edge to fly between its drawn and canonical positions.
pub const EDGE_FLIGHT_DURATION: f64 = 0.5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
	pub step: usize,
	pub total: usize,
}

impl Progress {
	pub fn percent(&self) -> f64 {
		if self.total == 0 {
			0.0
		} else {
			self.step as f64 / self.total as f64 * 100.0
		}
	}

	pub fn label(&self) -> String {
		format!("Step {} / {}", self.step, self.total)
	}
}

#[derive(Clone, Debug)]
struct ConflictEdge {
	source: NodeId,
	target: NodeId,
}

#[derive(Clone, Debug)]
struct AnimatedEdge {
	index: usize,
	tween: Transition<Segment>,
	leaving: bool,
}

/// A canonical slot drawn during replay, labelled with a conflict node id.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimatedNode {
	pub label: String,
	pub position: Point,
}

pub struct AnimationController {
	conflict_edges: Vec<ConflictEdge>,
	active: bool,
	cursor: usize,
	edges: Vec<AnimatedEdge>,
}

impl AnimationController {
	pub fn new(model: &GraphModel) -> Self {
		let conflict_edges = model
			.edges()
			.iter()
			.filter(|e| e.conflict)
			.map(|e| ConflictEdge {
				source: e.source.clone(),
				target: e.target.clone(),
			})
			.collect();
		Self {
			conflict_edges,
			active: false,
			cursor: 0,
			edges: Vec::new(),
		}
	}

	pub fn is_active(&self) -> bool {
		self.active
	}

	pub fn cursor(&self) -> usize {
		self.cursor
	}

	pub fn total(&self) -> usize {
		self.conflict_edges.len()
	}

	pub fn progress(&self) -> Progress {
		if !self.active {
			return Progress::default();
		}
		Progress {
			step: self.cursor,
			total: self.total(),
		}
	}

	pub fn enter(&mut self) {
		self.active = true;
		self.cursor = 0;
		self.edges.clear();
		debug!("animation started over {} conflict edges", self.total());
	}

	pub fn exit(&mut self) {
		self.active = false;
		self.cursor = 0;
		self.edges.clear();
		debug!("animation cancelled");
	}

	/// Moves the cursor by `delta`, clamped to `[0, total]`, and retargets the
	/// animated edge layer to the new prefix.
	pub fn step(&mut self, delta: isize, model: &GraphModel, canonical: &CanonicalGraph) {
		if !self.active {
			return;
		}
		self.cursor = self.cursor.saturating_add_signed(delta).min(self.total());

		for index in 0..self.total() {
			let in_prefix = index < self.cursor;
			match (in_prefix, self.edges.iter().position(|e| e.index == index)) {
				(true, None) => {
					let from = original_segment(&self.conflict_edges[index], model);
					self.edges.push(AnimatedEdge {
						index,
						tween: fly(from, canonical.edge_segment(index)),
						leaving: false,
					});
				}
				(true, Some(pos)) if self.edges[pos].leaving => {
					let edge = &mut self.edges[pos];
					edge.tween = fly(edge.tween.value(), canonical.edge_segment(index));
					edge.leaving = false;
				}
				(false, Some(pos)) if !self.edges[pos].leaving => {
					let to = original_segment(&self.conflict_edges[index], model);
					let edge = &mut self.edges[pos];
					edge.tween = fly(edge.tween.value(), to);
					edge.leaving = true;
				}
				_ => {}
			}
		}
		self.edges.sort_by_key(|e| e.index);
	}

	/// Advances edge tweens; edges that finished flying out are removed.
	pub fn advance(&mut self, dt: f64) -> bool {
		let animating = self.edges.iter().any(|e| !e.tween.is_finished());
		for edge in &mut self.edges {
			edge.tween.advance(dt);
		}
		self.edges.retain(|e| !(e.leaving && e.tween.is_finished()));
		animating
	}

	/// Current geometry of every edge in the animated layer.
	pub fn edge_segments(&self) -> Vec<Segment> {
		self.edges.iter().map(|e| e.tween.value()).collect()
	}

	/// Canonical slots relabelled round-robin with `ids`; slots keep their own
	/// label when `ids` is empty.
	pub fn nodes(&self, canonical: &CanonicalGraph, ids: &[NodeId]) -> Vec<AnimatedNode> {
		if !self.active {
			return Vec::new();
		}
		canonical
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| AnimatedNode {
				label: if ids.is_empty() {
					n.label.clone()
				} else {
					ids[i % ids.len()].to_string()
				},
				position: n.position,
			})
			.collect()
	}
}

fn fly(from: Segment, to: Segment) -> Transition<Segment> {
	Transition::new(from, to, EDGE_FLIGHT_DURATION, Easing::CubicInOut)
}

/// Where a conflict edge is currently drawn; missing endpoints sit at the origin.
fn original_segment(edge: &ConflictEdge, model: &GraphModel) -> Segment {
	let at = |id: &NodeId| model.node(id).map(|n| n.position()).unwrap_or_default();
	Segment::new(at(&edge.source), at(&edge.target))
}
