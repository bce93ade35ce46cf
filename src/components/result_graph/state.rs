use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::animation::{AnimatedNode, AnimationController, Progress};
use super::canonical::CanonicalGraph;
use super::layout::{FULL_ACTIVITY, LayoutConfig, LayoutDriver, PhysicsMode};
use super::snap::SnapEngine;
use crate::components::geometry::{Point, Segment};
use crate::components::model::GraphModel;
use crate::components::payload::{GraphPayload, NodeId, ResultPayload};
use crate::components::viewport::Viewport;

pub const NODE_RADIUS: f64 = 6.0;
pub const HIT_RADIUS: f64 = 12.0;
pub const ZOOM_IN_FACTOR: f64 = 1.2;
pub const ZOOM_OUT_FACTOR: f64 = 0.8;

/// Which panel a result canvas is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewRole {
	/// The input graph as submitted; physics stopped and not draggable.
	Original,
	/// A planar embedding at its computed coordinates.
	Planar,
	/// A non-planar graph with its canonical obstruction.
	NonPlanar,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeRole {
	Plain,
	Principal,
	Subdivision,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
	pub id: NodeId,
	pub position: Point,
	pub role: NodeRole,
	/// Sitting on a canonical slot.
	pub snapped: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneEdge {
	pub segment: Segment,
	pub conflict: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneSlot {
	pub label: String,
	pub position: Point,
	pub visible: bool,
	/// Radius and opacity of a snap pulse ring, if one is running.
	pub pulse: Option<(f64, f64)>,
}

/// Everything a renderer needs for one frame, derived from current state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	pub nodes: Vec<SceneNode>,
	pub edges: Vec<SceneEdge>,
	pub connectors: Vec<Segment>,
	pub slots: Vec<SceneSlot>,
	pub canonical_edges: Vec<Segment>,
	pub animated_edges: Vec<Segment>,
	pub animated_nodes: Vec<AnimatedNode>,
	pub progress: Progress,
}

struct Drag {
	id: NodeId,
	/// Node position relative to the pointer when the drag began.
	grab: Point,
}

struct Canonical {
	snap: SnapEngine,
	animation: AnimationController,
}

pub struct ResultGraphState {
	pub role: ViewRole,
	pub model: GraphModel,
	pub layout: LayoutDriver,
	pub viewport: Viewport,
	canonical: Option<Canonical>,
	source: GraphPayload,
	drag: Option<Drag>,
	rng: StdRng,
}

impl ResultGraphState {
	/// The submitted graph, drawn as-is.
	pub fn original(payload: &ResultPayload, width: f64, height: f64, seed: u64) -> Self {
		let mut state = Self::build(ViewRole::Original, payload, width, height, seed);
		state.fit();
		state
	}

	/// The tester's answer: a planar embedding or a canonical-obstruction view.
	pub fn result(payload: &ResultPayload, width: f64, height: f64, seed: u64) -> Self {
		let role = if payload.is_planar() {
			ViewRole::Planar
		} else {
			ViewRole::NonPlanar
		};
		let mut state = Self::build(role, payload, width, height, seed);
		if role == ViewRole::NonPlanar {
			let center = Point::new(width * 0.8, height * 0.7);
			let graph = CanonicalGraph::generate(payload.canonical_kind(), center);
			info!("canonical {:?} with {} slots", graph.kind, graph.slot_count());
			state.canonical = Some(Canonical {
				snap: SnapEngine::new(&state.model, graph),
				animation: AnimationController::new(&state.model),
			});
		}
		state.fit();
		state
	}

	fn build(role: ViewRole, payload: &ResultPayload, width: f64, height: f64, seed: u64) -> Self {
		let mut rng = StdRng::seed_from_u64(seed);
		let mut model = GraphModel::new();
		// non-planar graphs share the canvas with the canonical drawing on the right
		let bounds = match role {
			ViewRole::NonPlanar => (width * 2.0 / 3.0, height),
			_ => (width, height),
		};
		model.load(&payload.graph, bounds, &mut rng);
		let mode = match role {
			ViewRole::NonPlanar => PhysicsMode::Live,
			_ => PhysicsMode::Frozen,
		};
		let layout = LayoutDriver::new(&model, LayoutConfig::default(), mode);
		info!("{role:?} view with {} nodes, physics {mode:?}", model.node_count());
		Self {
			role,
			model,
			layout,
			viewport: Viewport::new(width, height),
			canonical: None,
			source: payload.graph.clone(),
			drag: None,
			rng,
		}
	}

	pub fn snap(&self) -> Option<&SnapEngine> {
		self.canonical.as_ref().map(|c| &c.snap)
	}

	pub fn animation(&self) -> Option<&AnimationController> {
		self.canonical.as_ref().map(|c| &c.animation)
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.is_some()
	}

	pub fn is_draggable(&self) -> bool {
		self.role != ViewRole::Original
	}

	pub fn node_at(&self, p: Point) -> Option<NodeId> {
		self.model.node_at(p, HIT_RADIUS).cloned()
	}

	/// Pointer down in graph space. Returns true if a node drag started.
	/// The node keeps its offset from the pointer for the whole drag.
	pub fn pointer_down(&mut self, p: Point) -> bool {
		let Some(id) = self.node_at(p) else {
			return false;
		};
		let Some(origin) = self.model.node(&id).map(|n| n.position()) else {
			return false;
		};
		if !self.start_drag(id) {
			return false;
		}
		if let Some(drag) = self.drag.as_mut() {
			drag.grab = origin - p;
		}
		true
	}

	pub fn start_drag(&mut self, id: NodeId) -> bool {
		if !self.is_draggable() || self.model.node(&id).is_none() {
			return false;
		}
		match self.canonical.as_mut() {
			Some(c) => c.snap.begin_drag(&mut self.layout, &mut self.model, &id),
			None => self.layout.drag_start(&mut self.model, &id),
		}
		self.drag = Some(Drag {
			id,
			grab: Point::default(),
		});
		true
	}

	pub fn pointer_move(&mut self, p: Point) {
		let Some(Drag { id, grab }) = self.drag.as_ref() else {
			return;
		};
		let target = p + *grab;
		match self.canonical.as_mut() {
			Some(c) => c.snap.drag(&mut self.layout, &mut self.model, id, target),
			None => self.layout.drag_to(&mut self.model, id, target),
		}
	}

	pub fn pointer_up(&mut self) {
		let Some(Drag { id, .. }) = self.drag.take() else {
			return;
		};
		match self.canonical.as_mut() {
			Some(c) => {
				c.snap.end_drag(&mut self.layout, &mut self.model, &id);
			}
			// planar drops stay pinned where they land
			None => self.layout.drag_end(),
		}
	}

	/// One animation frame: snap flights, edge replay, physics, then viewport.
	/// Returns true if anything moved.
	pub fn tick(&mut self, dt: f64) -> bool {
		let mut changed = false;
		let mut settled = false;
		if let Some(c) = self.canonical.as_mut() {
			let animating = c.snap.is_animating();
			let landed = c.snap.advance(&mut self.layout, &mut self.model, dt);
			settled = !landed.is_empty();
			changed |= animating;
			changed |= c.animation.advance(dt);
		}
		changed |= self.layout.tick(&mut self.model, dt as f32);
		if settled {
			self.fit();
		}
		changed | self.viewport.advance(dt)
	}

	pub fn play_animation(&mut self) {
		if let Some(c) = self.canonical.as_mut() {
			c.animation.enter();
			c.animation.step(0, &self.model, c.snap.canonical());
		}
	}

	pub fn step_animation(&mut self, delta: isize) {
		if let Some(c) = self.canonical.as_mut() {
			c.animation.step(delta, &self.model, c.snap.canonical());
		}
	}

	/// Replay progress while replay mode is on, even with nothing to replay.
	pub fn replay_progress(&self) -> Option<Progress> {
		self.animation()
			.filter(|a| a.is_active())
			.map(|a| a.progress())
	}

	pub fn cancel_animation(&mut self) {
		if let Some(c) = self.canonical.as_mut() {
			c.animation.exit();
		}
	}

	/// Clears all snaps and returns the layout to live physics.
	pub fn reset(&mut self) {
		if let Some(c) = self.canonical.as_mut() {
			c.snap.reset(&mut self.layout);
			self.fit();
		}
	}

	/// Planar view: start the simulation from the embedding at full activity.
	pub fn enable_physics(&mut self) {
		if self.role == ViewRole::Planar {
			self.layout.resume(FULL_ACTIVITY);
		}
	}

	/// Planar view: stop physics and restore the embedding coordinates.
	pub fn reset_planar(&mut self) {
		if self.role != ViewRole::Planar {
			return;
		}
		self.drag = None;
		let bounds = (self.viewport.width, self.viewport.height);
		self.model.load(&self.source, bounds, &mut self.rng);
		self.layout = LayoutDriver::new(&self.model, LayoutConfig::default(), PhysicsMode::Frozen);
		debug!("planar layout restored");
		self.fit();
	}

	pub fn zoom_in(&mut self) {
		self.viewport.scale_by(ZOOM_IN_FACTOR);
	}

	pub fn zoom_out(&mut self) {
		self.viewport.scale_by(ZOOM_OUT_FACTOR);
	}

	/// Frames every drawn node, canonical slots included.
	pub fn fit(&mut self) {
		let slots: Vec<Point> = self
			.snap()
			.map(|s| s.canonical().nodes.iter().map(|n| n.position).collect())
			.unwrap_or_default();
		let points = self.model.nodes().map(|n| n.position()).chain(slots);
		self.viewport.fit(points);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.viewport.resize(width, height);
	}

	pub fn scene(&self) -> Scene {
		let snap = self.snap();
		let role_of = |id: &NodeId| match snap {
			Some(s) if s.is_principal(id) => NodeRole::Principal,
			Some(s) if s.is_conflict(id) => NodeRole::Subdivision,
			_ => NodeRole::Plain,
		};

		let mut scene = Scene {
			nodes: self
				.model
				.nodes()
				.map(|n| SceneNode {
					id: n.id.clone(),
					position: n.position(),
					role: role_of(&n.id),
					snapped: snap.is_some_and(|s| s.is_snapped(&n.id)),
				})
				.collect(),
			edges: self
				.model
				.edges()
				.iter()
				.filter_map(|e| {
					Some(SceneEdge {
						segment: self.model.segment(e)?,
						conflict: snap.is_some() && e.conflict,
					})
				})
				.collect(),
			..Scene::default()
		};

		let Some(c) = self.canonical.as_ref() else {
			return scene;
		};
		let graph = c.snap.canonical();
		let animating = c.animation.is_active();
		let visibility = c.snap.visibility();

		scene.connectors = c
			.snap
			.connectors(&self.model)
			.into_iter()
			.map(|conn| conn.segment)
			.collect();
		scene.slots = graph
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| SceneSlot {
				label: n.label.clone(),
				position: n.position,
				visible: !animating && visibility.slots[i],
				pulse: c
					.snap
					.pulses()
					.iter()
					.find(|p| p.slot == i)
					.map(|p| p.appearance()),
			})
			.collect();
		if visibility.edges && !animating {
			scene.canonical_edges = (0..graph.edges.len()).map(|i| graph.edge_segment(i)).collect();
		}

		let labels = if c.snap.principals().is_empty() {
			c.snap.conflict_nodes()
		} else {
			c.snap.principals()
		};
		scene.animated_edges = c.animation.edge_segments();
		scene.animated_nodes = c.animation.nodes(graph, labels);
		scene.progress = c.animation.progress();
		scene
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::result_graph::snap::FLIGHT_DURATION;
	use pretty_assertions::assert_eq;

	const K5: &str = r#"{
		"status": "non_planar",
		"nodes": [{"id": "1"}, {"id": "2"}, {"id": "3"}, {"id": "4"}, {"id": "5"}],
		"edges": [
			{"source": "1", "target": "2", "is_conflict": true},
			{"source": "1", "target": "3", "is_conflict": true},
			{"source": "1", "target": "4", "is_conflict": true},
			{"source": "1", "target": "5", "is_conflict": true},
			{"source": "2", "target": "3", "is_conflict": true},
			{"source": "2", "target": "4", "is_conflict": true},
			{"source": "2", "target": "5", "is_conflict": true},
			{"source": "3", "target": "4", "is_conflict": true},
			{"source": "3", "target": "5", "is_conflict": true},
			{"source": "4", "target": "5", "is_conflict": true}
		]
	}"#;

	const PLANAR: &str = r#"{
		"status": "planar",
		"nodes": [
			{"id": "A", "x": 0, "y": -100},
			{"id": "B", "x": -86, "y": 50},
			{"id": "C", "x": 86, "y": 50},
			{"id": "D", "x": 0, "y": 0}
		],
		"edges": [
			{"source": "A", "target": "B"},
			{"source": "B", "target": "C"},
			{"source": "C", "target": "A"},
			{"source": "A", "target": "D"},
			{"source": "B", "target": "D"},
			{"source": "C", "target": "D"}
		]
	}"#;

	fn k5_view() -> ResultGraphState {
		let payload = ResultPayload::from_json(K5).unwrap();
		ResultGraphState::result(&payload, 900.0, 600.0, 5)
	}

	fn drag(state: &mut ResultGraphState, id: &str, to: Point) {
		assert!(state.start_drag(id.into()));
		state.pointer_move(to);
		state.pointer_up();
	}

	fn settle(state: &mut ResultGraphState) {
		for _ in 0..40 {
			state.tick(FLIGHT_DURATION / 10.0);
		}
	}

	/// Whether physics is frozen matches whether anything is snapped.
	fn assert_coupled(state: &ResultGraphState) {
		let snapped = !state.snap().unwrap().snap_map().is_empty();
		assert_eq!(snapped, state.layout.mode() == PhysicsMode::Frozen);
	}

	#[test]
	fn k5_snap_scenario_and_reset() {
		let mut state = k5_view();
		assert_eq!(state.role, ViewRole::NonPlanar);
		assert_eq!(state.snap().unwrap().principals().len(), 5);
		assert_coupled(&state);

		let slots: Vec<Point> = state
			.snap()
			.unwrap()
			.canonical()
			.nodes
			.iter()
			.map(|n| n.position)
			.collect();
		for (i, slot) in slots.iter().enumerate() {
			let id = (i + 1).to_string();
			drag(&mut state, &id, *slot);
			assert_coupled(&state);
			settle(&mut state);
			assert_coupled(&state);
		}

		let snap = state.snap().unwrap();
		assert_eq!(snap.snap_map().len(), 5);
		let mut taken: Vec<_> = snap.snap_map().values().copied().collect();
		taken.sort();
		assert_eq!(taken, vec![0, 1, 2, 3, 4]);
		assert_eq!(state.layout.free_node_count(), 0);
		let scene = state.scene();
		assert!(scene.canonical_edges.is_empty());
		assert!(scene.slots.iter().all(|s| !s.visible));
		assert!(scene.nodes.iter().all(|n| n.snapped));
		for (i, slot) in slots.iter().enumerate() {
			let id = NodeId::from((i + 1) as u64);
			assert_eq!(state.model.node(&id).unwrap().position(), *slot);
		}

		state.reset();
		assert_coupled(&state);
		assert!(state.snap().unwrap().snap_map().is_empty());
		assert_eq!(state.layout.mode(), PhysicsMode::Live);
		let scene = state.scene();
		assert_eq!(scene.canonical_edges.len(), 10);
		assert!(scene.slots.iter().all(|s| s.visible));
		assert_eq!(state.layout.free_node_count(), 5);
		assert!(scene.nodes.iter().all(|n| !n.snapped));
	}

	#[test]
	fn connectors_follow_dragged_node_while_frozen() {
		let mut state = k5_view();
		let slot = state.snap().unwrap().canonical().slot_position(0);
		drag(&mut state, "1", slot);
		settle(&mut state);
		assert_eq!(state.layout.mode(), PhysicsMode::Frozen);

		assert!(state.start_drag("2".into()));
		state.pointer_move(Point::new(-300.0, -300.0));
		let scene = state.scene();
		let connector = scene.connectors[1];
		assert_eq!(connector.from, Point::new(-300.0, -300.0));
		assert!(scene
			.edges
			.iter()
			.any(|e| e.segment.to == Point::new(-300.0, -300.0)));
		state.pointer_up();
	}

	#[test]
	fn animation_hides_static_canonical_and_reports_progress() {
		let mut state = k5_view();
		state.play_animation();
		state.step_animation(1);
		state.step_animation(1);
		let scene = state.scene();
		assert!(scene.canonical_edges.is_empty());
		assert!(scene.slots.iter().all(|s| !s.visible));
		assert!(scene.nodes.iter().all(|n| n.snapped));
		assert_eq!(scene.animated_edges.len(), 2);
		assert_eq!(scene.animated_nodes.len(), 5);
		assert_eq!(scene.progress, Progress { step: 2, total: 10 });
		assert_eq!(scene.animated_nodes[0].label, "1");

		state.cancel_animation();
		let scene = state.scene();
		assert!(scene.animated_edges.is_empty());
		assert!(scene.animated_nodes.is_empty());
		assert_eq!(scene.canonical_edges.len(), 10);
		assert_eq!(scene.progress.label(), "Step 0 / 0");
	}

	#[test]
	fn replay_without_conflict_edges_can_be_cancelled() {
		let payload = ResultPayload::from_json(
			r#"{"status": "non_planar", "nodes": [{"id": "a"}, {"id": "b"}],
			    "edges": [{"source": "a", "target": "b"}]}"#,
		)
		.unwrap();
		let mut state = ResultGraphState::result(&payload, 800.0, 600.0, 2);
		assert_eq!(state.replay_progress(), None);

		state.play_animation();
		assert_eq!(state.replay_progress(), Some(Progress { step: 0, total: 0 }));
		assert!(state.scene().slots.iter().all(|s| !s.visible));

		state.cancel_animation();
		assert_eq!(state.replay_progress(), None);
		let scene = state.scene();
		assert!(scene.slots.iter().all(|s| s.visible));
		assert_eq!(scene.canonical_edges.len(), 10);
	}

	#[test]
	fn planar_view_is_static_until_enabled() {
		let payload = ResultPayload::from_json(PLANAR).unwrap();
		let mut state = ResultGraphState::result(&payload, 800.0, 600.0, 1);
		assert_eq!(state.role, ViewRole::Planar);
		assert!(state.snap().is_none());
		assert_eq!(state.layout.mode(), PhysicsMode::Frozen);
		let before: Vec<_> = state.model.nodes().map(|n| n.position()).collect();
		for _ in 0..5 {
			state.tick(0.016);
		}
		let after: Vec<_> = state.model.nodes().map(|n| n.position()).collect();
		assert_eq!(before, after);

		state.enable_physics();
		assert_eq!(state.layout.mode(), PhysicsMode::Live);
		for _ in 0..5 {
			state.tick(0.016);
		}
		let moved: Vec<_> = state.model.nodes().map(|n| n.position()).collect();
		assert_ne!(before, moved);

		state.reset_planar();
		assert_eq!(state.layout.mode(), PhysicsMode::Frozen);
		let restored: Vec<_> = state.model.nodes().map(|n| n.position()).collect();
		assert_eq!(before, restored);
	}

	#[test]
	fn dragged_node_keeps_its_grab_offset() {
		let payload = ResultPayload::from_json(PLANAR).unwrap();
		let mut state = ResultGraphState::result(&payload, 800.0, 600.0, 1);
		assert!(state.pointer_down(Point::new(3.0, -96.0)));
		state.pointer_move(Point::new(3.0, -96.0));
		let a = NodeId::from("A");
		assert_eq!(state.model.node(&a).unwrap().position(), Point::new(0.0, -100.0));
		state.pointer_move(Point::new(50.0, 50.0));
		state.pointer_up();
		assert_eq!(state.model.node(&a).unwrap().position(), Point::new(47.0, 46.0));
	}

	#[test]
	fn original_view_ignores_drags() {
		let payload = ResultPayload::from_json(PLANAR).unwrap();
		let mut state = ResultGraphState::original(&payload, 800.0, 600.0, 1);
		assert!(!state.pointer_down(Point::new(0.0, -100.0)));
		assert!(!state.is_dragging());
		let scene = state.scene();
		assert!(scene.slots.is_empty());
		assert!(scene.nodes.iter().all(|n| n.role == NodeRole::Plain));
	}

	#[test]
	fn static_load_fits_viewport() {
		let payload = ResultPayload::from_json(PLANAR).unwrap();
		let mut state = ResultGraphState::result(&payload, 800.0, 600.0, 1);
		assert!(state.viewport.is_animating());
		for _ in 0..60 {
			state.tick(0.016);
		}
		assert!(!state.viewport.is_animating());
		// 150 tall inside 520 usable, 172 wide inside 720: capped at 2
		assert_eq!(state.viewport.transform().k, 2.0);
	}
}
