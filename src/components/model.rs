//! Node/edge store with stable identities.
//!
//! Edges refer to their endpoints by [`NodeId`] and resolve them through the
//! store, so moving a node is immediately visible to every incident edge.

use indexmap::IndexMap;
use log::{debug, info};
use rand::Rng;

use super::geometry::{Point, Segment};
use super::payload::{GraphPayload, NodeId};

/// File name used when the edge list is offered as a download.
pub const EXPORT_FILE_NAME: &str = "graph.txt";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(u64);

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: NodeId,
	pub x: f64,
	pub y: f64,
	/// Externally supplied principal flag, if any.
	pub principal: Option<bool>,
}

impl Node {
	pub fn position(&self) -> Point {
		Point::new(self.x, self.y)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	pub id: EdgeId,
	pub source: NodeId,
	pub target: NodeId,
	pub conflict: bool,
}

impl Edge {
	pub fn touches(&self, node: &NodeId) -> bool {
		&self.source == node || &self.target == node
	}

	pub fn joins(&self, a: &NodeId, b: &NodeId) -> bool {
		(&self.source == a && &self.target == b) || (&self.source == b && &self.target == a)
	}
}

#[derive(Clone, Debug)]
pub struct GraphModel {
	nodes: IndexMap<NodeId, Node>,
	edges: Vec<Edge>,
	next_node_id: u64,
	next_edge_id: u64,
}

impl Default for GraphModel {
	fn default() -> Self {
		Self {
			nodes: IndexMap::new(),
			edges: Vec::new(),
			next_node_id: 1,
			next_edge_id: 0,
		}
	}
}

impl GraphModel {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}

	pub fn nodes(&self) -> impl Iterator<Item = &Node> {
		self.nodes.values()
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn node(&self, id: &NodeId) -> Option<&Node> {
		self.nodes.get(id)
	}

	pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
		self.nodes.get_mut(id)
	}

	pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
		self.edges.iter().find(|e| e.id == id)
	}

	/// Moves a node; returns false if it does not exist.
	pub fn set_position(&mut self, id: &NodeId, p: Point) -> bool {
		match self.nodes.get_mut(id) {
			Some(node) => {
				node.x = p.x;
				node.y = p.y;
				true
			}
			None => false,
		}
	}

	/// Current geometry of an edge, read through its live endpoints.
	pub fn segment(&self, edge: &Edge) -> Option<Segment> {
		let source = self.nodes.get(&edge.source)?;
		let target = self.nodes.get(&edge.target)?;
		Some(Segment::new(source.position(), target.position()))
	}

	pub fn add_node(&mut self, x: f64, y: f64) -> NodeId {
		// the counter wraps after u64::MAX; the collision loop keeps ids unique
		let mut id = NodeId::from(self.next_node_id);
		while self.nodes.contains_key(&id) {
			self.next_node_id = self.next_node_id.wrapping_add(1);
			id = NodeId::from(self.next_node_id);
		}
		self.next_node_id = self.next_node_id.wrapping_add(1);
		self.nodes.insert(
			id.clone(),
			Node {
				id: id.clone(),
				x,
				y,
				principal: None,
			},
		);
		debug!("added node {id} at ({x:.1}, {y:.1})");
		id
	}

	/// Removes a node and every edge touching it.
	pub fn delete_node(&mut self, id: &NodeId) -> bool {
		if self.nodes.shift_remove(id).is_none() {
			return false;
		}
		let before = self.edges.len();
		self.edges.retain(|e| !e.touches(id));
		debug!(
			"deleted node {id} and {} incident edges",
			before - self.edges.len()
		);
		true
	}

	pub fn delete_edge(&mut self, id: EdgeId) -> bool {
		let before = self.edges.len();
		self.edges.retain(|e| e.id != id);
		before != self.edges.len()
	}

	pub fn has_edge_between(&self, a: &NodeId, b: &NodeId) -> bool {
		self.edges.iter().any(|e| e.joins(a, b))
	}

	/// Adds an undirected edge unless it would be a self-loop, a duplicate,
	/// or reference a missing node.
	pub fn try_add_edge(&mut self, a: &NodeId, b: &NodeId) -> bool {
		if a == b
			|| !self.nodes.contains_key(a)
			|| !self.nodes.contains_key(b)
			|| self.has_edge_between(a, b)
		{
			return false;
		}
		self.push_edge(a.clone(), b.clone(), false);
		debug!("added edge {a} - {b}");
		true
	}

	pub fn clear(&mut self) {
		*self = Self::default();
	}

	/// One `"<source> <target>"` line per edge in insertion order, or `None`
	/// when there is nothing to export.
	pub fn export_edge_list(&self) -> Option<String> {
		if self.is_empty() {
			return None;
		}
		Some(
			self.edges
				.iter()
				.map(|e| format!("{} {}\n", e.source, e.target))
				.collect(),
		)
	}

	/// Replaces the whole model with `payload`.
	///
	/// Nodes without coordinates are scattered uniformly over `bounds`
	/// (width, height). Edges naming an unknown node are dropped. A repeated
	/// node id overwrites the earlier node's data.
	pub fn load(&mut self, payload: &GraphPayload, bounds: (f64, f64), rng: &mut impl Rng) {
		self.clear();
		let (width, height) = bounds;

		for incoming in &payload.nodes {
			let x = incoming.x.unwrap_or_else(|| rng.random::<f64>() * width);
			let y = incoming.y.unwrap_or_else(|| rng.random::<f64>() * height);
			self.nodes.insert(
				incoming.id.clone(),
				Node {
					id: incoming.id.clone(),
					x,
					y,
					principal: incoming.is_principal,
				},
			);
			if let Some(n) = incoming.id.numeric_prefix() {
				if n >= self.next_node_id {
					self.next_node_id = n.saturating_add(1);
				}
			}
		}

		let mut dropped = 0;
		for incoming in &payload.edges {
			if self.nodes.contains_key(&incoming.source)
				&& self.nodes.contains_key(&incoming.target)
			{
				self.push_edge(
					incoming.source.clone(),
					incoming.target.clone(),
					incoming.is_conflict,
				);
			} else {
				dropped += 1;
			}
		}

		info!(
			"loaded graph with {} nodes and {} edges ({dropped} dropped)",
			self.nodes.len(),
			self.edges.len()
		);
	}

	/// Topmost node whose center lies within `radius` of `p`.
	pub fn node_at(&self, p: Point, radius: f64) -> Option<&NodeId> {
		self.nodes
			.values()
			.rev()
			.find(|n| n.position().distance(p) <= radius)
			.map(|n| &n.id)
	}

	/// Topmost edge passing within `tolerance` of `p`.
	pub fn edge_at(&self, p: Point, tolerance: f64) -> Option<EdgeId> {
		self.edges
			.iter()
			.rev()
			.find(|e| {
				self.segment(e)
					.is_some_and(|s| s.distance_to(p) <= tolerance)
			})
			.map(|e| e.id)
	}

	fn push_edge(&mut self, source: NodeId, target: NodeId, conflict: bool) {
		let id = EdgeId(self.next_edge_id);
		self.next_edge_id += 1;
		self.edges.push(Edge {
			id,
			source,
			target,
			conflict,
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::payload::{PayloadEdge, PayloadNode};
	use pretty_assertions::assert_eq;
	use rand::SeedableRng;
	use rand::rngs::StdRng;
	use std::collections::HashSet;

	fn payload_node(id: &str) -> PayloadNode {
		PayloadNode {
			id: id.into(),
			x: None,
			y: None,
			is_principal: None,
		}
	}

	fn payload_edge(a: &str, b: &str) -> PayloadEdge {
		PayloadEdge {
			source: a.into(),
			target: b.into(),
			is_conflict: false,
		}
	}

	#[test]
	fn add_node_assigns_increasing_ids() {
		let mut g = GraphModel::new();
		let a = g.add_node(0.0, 0.0);
		let b = g.add_node(1.0, 1.0);
		assert_eq!((a.as_str(), b.as_str()), ("1", "2"));
	}

	#[test]
	fn duplicate_and_self_edges_are_rejected() {
		let mut g = GraphModel::new();
		let a = g.add_node(0.0, 0.0);
		let b = g.add_node(1.0, 1.0);
		assert!(g.try_add_edge(&a, &b));
		assert!(!g.try_add_edge(&a, &b));
		assert!(!g.try_add_edge(&b, &a));
		assert!(!g.try_add_edge(&a, &a));
		assert_eq!(g.edges().len(), 1);
	}

	#[test]
	fn deleting_node_cascades_only_to_incident_edges() {
		let mut g = GraphModel::new();
		let ids: Vec<_> = (0..4).map(|i| g.add_node(i as f64, 0.0)).collect();
		g.try_add_edge(&ids[0], &ids[1]);
		g.try_add_edge(&ids[1], &ids[2]);
		g.try_add_edge(&ids[2], &ids[3]);
		assert!(g.delete_node(&ids[1]));
		let remaining: Vec<_> = g
			.edges()
			.iter()
			.map(|e| (e.source.as_str(), e.target.as_str()))
			.collect();
		assert_eq!(remaining, vec![("3", "4")]);
		assert!(!g.delete_node(&ids[1]));
	}

	#[test]
	fn delete_edge_by_identity() {
		let mut g = GraphModel::new();
		let a = g.add_node(0.0, 0.0);
		let b = g.add_node(1.0, 1.0);
		let c = g.add_node(2.0, 2.0);
		g.try_add_edge(&a, &b);
		g.try_add_edge(&b, &c);
		let first = g.edges()[0].id;
		assert!(g.delete_edge(first));
		assert!(!g.delete_edge(first));
		assert_eq!(g.edges().len(), 1);
		assert!(g.has_edge_between(&c, &b));
	}

	#[test]
	fn export_preserves_insertion_order() {
		let mut g = GraphModel::new();
		assert_eq!(g.export_edge_list(), None);
		let a = g.add_node(0.0, 0.0);
		assert_eq!(g.export_edge_list(), Some(String::new()));
		let b = g.add_node(1.0, 0.0);
		let c = g.add_node(2.0, 0.0);
		g.try_add_edge(&a, &b);
		g.try_add_edge(&b, &c);
		assert_eq!(g.export_edge_list().as_deref(), Some("1 2\n2 3\n"));
	}

	#[test]
	fn clear_resets_counter() {
		let mut g = GraphModel::new();
		g.add_node(0.0, 0.0);
		g.add_node(0.0, 0.0);
		g.clear();
		assert!(g.is_empty());
		assert_eq!(g.add_node(0.0, 0.0).as_str(), "1");
	}

	#[test]
	fn load_advances_counter_past_numeric_ids() {
		let mut g = GraphModel::new();
		let mut rng = StdRng::seed_from_u64(7);
		let payload = GraphPayload {
			nodes: vec![payload_node("5")],
			edges: vec![],
		};
		g.load(&payload, (800.0, 600.0), &mut rng);
		assert_eq!(g.add_node(0.0, 0.0).as_str(), "6");
	}

	#[test]
	fn load_places_missing_coordinates_inside_bounds() {
		let mut g = GraphModel::new();
		let mut rng = StdRng::seed_from_u64(1);
		let mut with_coords = payload_node("a");
		with_coords.x = Some(-30.0);
		with_coords.y = Some(12.0);
		let payload = GraphPayload {
			nodes: vec![with_coords, payload_node("b"), payload_node("c")],
			edges: vec![],
		};
		g.load(&payload, (300.0, 200.0), &mut rng);
		assert_eq!(g.node(&"a".into()).unwrap().position(), Point::new(-30.0, 12.0));
		for id in ["b", "c"] {
			let n = g.node(&id.into()).unwrap();
			assert!((0.0..300.0).contains(&n.x));
			assert!((0.0..200.0).contains(&n.y));
		}
	}

	#[test]
	fn load_drops_dangling_edges_and_keeps_nodes() {
		let mut g = GraphModel::new();
		let mut rng = StdRng::seed_from_u64(3);
		let payload = GraphPayload {
			nodes: vec![payload_node("1"), payload_node("2")],
			edges: vec![payload_edge("1", "2"), payload_edge("2", "9")],
		};
		g.load(&payload, (100.0, 100.0), &mut rng);
		assert_eq!(g.node_count(), 2);
		assert_eq!(g.edges().len(), 1);
	}

	#[test]
	fn duplicate_incoming_ids_last_wins() {
		let mut g = GraphModel::new();
		let mut rng = StdRng::seed_from_u64(3);
		let mut first = payload_node("x");
		first.x = Some(1.0);
		first.y = Some(1.0);
		let mut second = payload_node("x");
		second.x = Some(9.0);
		second.y = Some(9.0);
		let payload = GraphPayload {
			nodes: vec![first, second],
			edges: vec![],
		};
		g.load(&payload, (100.0, 100.0), &mut rng);
		assert_eq!(g.node_count(), 1);
		assert_eq!(g.node(&"x".into()).unwrap().x, 9.0);
	}

	#[test]
	fn ids_stay_unique_across_loads_and_adds() {
		let mut g = GraphModel::new();
		let mut rng = StdRng::seed_from_u64(11);
		let payload = GraphPayload {
			nodes: vec![payload_node("2"), payload_node("x7"), payload_node("10")],
			edges: vec![],
		};
		g.load(&payload, (100.0, 100.0), &mut rng);
		for _ in 0..20 {
			g.add_node(0.0, 0.0);
		}
		let ids: HashSet<_> = g.nodes().map(|n| n.id.clone()).collect();
		assert_eq!(ids.len(), g.node_count());
		assert_eq!(g.node_count(), 23);
	}

	#[test]
	fn huge_numeric_ids_do_not_overflow_the_counter() {
		let mut g = GraphModel::new();
		let mut rng = StdRng::seed_from_u64(3);
		let payload = GraphPayload {
			nodes: vec![payload_node("18446744073709551614")],
			edges: vec![],
		};
		g.load(&payload, (100.0, 100.0), &mut rng);
		let added: Vec<_> = (0..3).map(|_| g.add_node(0.0, 0.0)).collect();
		assert_eq!(
			added,
			vec![
				NodeId::from("18446744073709551615"),
				NodeId::from("0"),
				NodeId::from("1"),
			]
		);
		let ids: HashSet<_> = g.nodes().map(|n| n.id.clone()).collect();
		assert_eq!(ids.len(), 4);
	}

	#[test]
	fn hit_testing_prefers_topmost() {
		let mut g = GraphModel::new();
		let a = g.add_node(0.0, 0.0);
		let b = g.add_node(4.0, 0.0);
		let c = g.add_node(100.0, 0.0);
		assert_eq!(g.node_at(Point::new(2.0, 0.0), 15.0), Some(&b));
		assert_eq!(g.node_at(Point::new(50.0, 50.0), 15.0), None);
		g.try_add_edge(&a, &c);
		let edge = g.edges()[0].id;
		assert_eq!(g.edge_at(Point::new(50.0, 3.0), 5.0), Some(edge));
		assert_eq!(g.edge_at(Point::new(50.0, 30.0), 5.0), None);
	}
}
