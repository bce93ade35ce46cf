//! Live/frozen wrapper around the `force_graph` simulation.

use std::collections::HashMap;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use crate::components::geometry::Point;
use crate::components::model::GraphModel;
use crate::components::payload::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhysicsMode {
	/// The simulation advances on every tick.
	Live,
	/// No ticks run; positions change only through pins.
	Frozen,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
	pub force_charge: f32,
	pub force_spring: f32,
	pub force_max: f32,
	pub node_speed: f32,
	pub damping_factor: f32,
	/// Fraction of the gap to the target activity closed per tick.
	pub activity_decay: f64,
	/// Activity held while a node is being dragged.
	pub drag_activity: f64,
	/// Activity after physics resumes from frozen.
	pub resume_activity: f64,
	/// Below this the simulation is considered settled and stops stepping.
	pub min_activity: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			activity_decay: 1.0 - 0.001f64.powf(1.0 / 300.0),
			drag_activity: 0.3,
			resume_activity: 0.3,
			min_activity: 0.001,
		}
	}
}

pub const FULL_ACTIVITY: f64 = 1.0;

pub struct LayoutDriver {
	graph: ForceGraph<NodeId, ()>,
	index: HashMap<NodeId, DefaultNodeIdx>,
	config: LayoutConfig,
	mode: PhysicsMode,
	activity: f64,
	activity_target: f64,
}

impl LayoutDriver {
	/// Builds a simulation mirroring `model`, starting in `mode` at full activity.
	pub fn new(model: &GraphModel, config: LayoutConfig, mode: PhysicsMode) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: config.force_charge,
			force_spring: config.force_spring,
			force_max: config.force_max,
			node_speed: config.node_speed,
			damping_factor: config.damping_factor,
		});
		let mut index = HashMap::new();

		for node in model.nodes() {
			let idx = graph.add_node(NodeData {
				x: node.x as f32,
				y: node.y as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: node.id.clone(),
			});
			index.insert(node.id.clone(), idx);
		}
		for edge in model.edges() {
			if let (Some(&src), Some(&tgt)) = (index.get(&edge.source), index.get(&edge.target)) {
				graph.add_edge(src, tgt, EdgeData::default());
			}
		}

		Self {
			graph,
			index,
			config,
			mode,
			activity: FULL_ACTIVITY,
			activity_target: 0.0,
		}
	}

	pub fn mode(&self) -> PhysicsMode {
		self.mode
	}

	pub fn is_live(&self) -> bool {
		self.mode == PhysicsMode::Live
	}

	pub fn activity(&self) -> f64 {
		self.activity
	}

	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	pub fn freeze(&mut self) {
		if self.mode == PhysicsMode::Live {
			debug!("physics frozen");
		}
		self.mode = PhysicsMode::Frozen;
	}

	/// Switches to live mode and reheats the simulation to `activity`.
	pub fn resume(&mut self, activity: f64) {
		if self.mode == PhysicsMode::Frozen {
			debug!("physics live at activity {activity}");
		}
		self.mode = PhysicsMode::Live;
		self.activity = activity;
	}

	pub fn is_pinned(&self, id: &NodeId) -> bool {
		let Some(&idx) = self.index.get(id) else {
			return false;
		};
		let mut pinned = false;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				pinned = node.data.is_anchor;
			}
		});
		pinned
	}

	/// Fixes a node at `p` in any mode and mirrors the write into `model`.
	pub fn pin(&mut self, model: &mut GraphModel, id: &NodeId, p: Point) {
		let Some(&idx) = self.index.get(id) else {
			return;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = p.x as f32;
				node.data.y = p.y as f32;
				node.data.is_anchor = true;
			}
		});
		model.set_position(id, p);
	}

	/// Returns a node to free physics. Frozen layouts keep it where it is.
	pub fn unpin(&mut self, id: &NodeId) {
		if !self.is_live() {
			return;
		}
		self.release(id);
	}

	/// Releases every pin regardless of mode.
	pub fn unpin_all(&mut self) {
		self.graph.visit_nodes_mut(|node| node.data.is_anchor = false);
	}

	pub fn drag_start(&mut self, model: &mut GraphModel, id: &NodeId) {
		if self.is_live() {
			self.activity_target = self.config.drag_activity;
			self.activity = self.activity.max(self.config.drag_activity);
		}
		if let Some(p) = model.node(id).map(|n| n.position()) {
			self.pin(model, id, p);
		}
	}

	pub fn drag_to(&mut self, model: &mut GraphModel, id: &NodeId, p: Point) {
		self.pin(model, id, p);
	}

	pub fn drag_end(&mut self) {
		if self.is_live() {
			self.activity_target = 0.0;
		}
	}

	/// Whether the next [`tick`](Self::tick) would move anything.
	pub fn is_running(&self) -> bool {
		self.is_live()
			&& (self.activity >= self.config.min_activity || self.activity_target > 0.0)
	}

	/// Nodes currently moved by the simulation rather than held by a pin.
	pub fn free_node_count(&self) -> usize {
		if !self.is_live() {
			return 0;
		}
		let mut free = 0;
		self.graph.visit_nodes(|node| {
			if !node.data.is_anchor {
				free += 1;
			}
		});
		free
	}

	/// Steps the simulation and copies positions into `model`.
	/// Returns false when frozen or settled.
	pub fn tick(&mut self, model: &mut GraphModel, dt: f32) -> bool {
		if !self.is_running() {
			return false;
		}
		self.activity += (self.activity_target - self.activity) * self.config.activity_decay;
		self.graph.update(dt * self.activity as f32);
		self.graph.visit_nodes(|node| {
			model.set_position(
				&node.data.user_data,
				Point::new(node.x() as f64, node.y() as f64),
			);
		});
		true
	}

	fn release(&mut self, id: &NodeId) {
		let Some(&idx) = self.index.get(id) else {
			return;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.is_anchor = false;
			}
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn triangle() -> GraphModel {
		let mut g = GraphModel::new();
		let a = g.add_node(0.0, 0.0);
		let b = g.add_node(10.0, 0.0);
		let c = g.add_node(5.0, 8.0);
		g.try_add_edge(&a, &b);
		g.try_add_edge(&b, &c);
		g.try_add_edge(&c, &a);
		g
	}

	#[test]
	fn frozen_driver_never_ticks() {
		let mut g = triangle();
		let mut d = LayoutDriver::new(&g, LayoutConfig::default(), PhysicsMode::Frozen);
		let before: Vec<_> = g.nodes().map(|n| n.position()).collect();
		assert!(!d.tick(&mut g, 0.016));
		let after: Vec<_> = g.nodes().map(|n| n.position()).collect();
		assert_eq!(before, after);
		assert_eq!(d.free_node_count(), 0);
	}

	#[test]
	fn live_driver_moves_free_nodes() {
		let mut g = triangle();
		let mut d = LayoutDriver::new(&g, LayoutConfig::default(), PhysicsMode::Live);
		let before: Vec<_> = g.nodes().map(|n| n.position()).collect();
		for _ in 0..10 {
			assert!(d.tick(&mut g, 0.016));
		}
		let after: Vec<_> = g.nodes().map(|n| n.position()).collect();
		assert_ne!(before, after);
		assert_eq!(d.free_node_count(), 3);
	}

	#[test]
	fn pinned_node_holds_position_while_live() {
		let mut g = triangle();
		let mut d = LayoutDriver::new(&g, LayoutConfig::default(), PhysicsMode::Live);
		let id = NodeId::from("1");
		d.pin(&mut g, &id, Point::new(-20.0, -20.0));
		for _ in 0..10 {
			d.tick(&mut g, 0.016);
		}
		assert_eq!(g.node(&id).unwrap().position(), Point::new(-20.0, -20.0));
		assert!(d.is_pinned(&id));
		d.unpin(&id);
		assert!(!d.is_pinned(&id));
	}

	#[test]
	fn unpin_is_ignored_while_frozen() {
		let mut g = triangle();
		let mut d = LayoutDriver::new(&g, LayoutConfig::default(), PhysicsMode::Frozen);
		let id = NodeId::from("2");
		d.drag_start(&mut g, &id);
		d.drag_to(&mut g, &id, Point::new(40.0, 40.0));
		assert_eq!(g.node(&id).unwrap().position(), Point::new(40.0, 40.0));
		d.drag_end();
		d.unpin(&id);
		assert!(d.is_pinned(&id));
		d.unpin_all();
		assert!(!d.is_pinned(&id));
	}

	#[test]
	fn activity_cools_toward_target() {
		let mut g = triangle();
		let mut d = LayoutDriver::new(&g, LayoutConfig::default(), PhysicsMode::Live);
		d.tick(&mut g, 0.016);
		assert!(d.activity() < FULL_ACTIVITY);
		d.freeze();
		assert!(!d.is_running());
		d.resume(0.3);
		assert!(d.is_running());
		assert_eq!(d.activity(), 0.3);
	}
}
