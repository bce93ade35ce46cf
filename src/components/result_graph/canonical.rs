use std::f64::consts::PI;

use crate::components::geometry::{Point, Segment};
use crate::components::payload::CanonicalKind;

pub const CANONICAL_RADIUS: f64 = 100.0;

#[derive(Clone, Debug, PartialEq)]
pub struct CanonicalNode {
	pub label: String,
	pub position: Point,
}

/// Fixed reference drawing of K5 or K3,3. Slots are addressed by index.
#[derive(Clone, Debug, PartialEq)]
pub struct CanonicalGraph {
	pub kind: CanonicalKind,
	pub nodes: Vec<CanonicalNode>,
	pub edges: Vec<(usize, usize)>,
}

impl CanonicalGraph {
	pub fn generate(kind: CanonicalKind, center: Point) -> Self {
		let mut nodes = Vec::new();
		let mut edges = Vec::new();

		match kind {
			CanonicalKind::K5 => {
				// pentagon, first vertex at the top
				for i in 0..5 {
					let angle = (i as f64) * 2.0 * PI / 5.0 - PI / 2.0;
					nodes.push(CanonicalNode {
						label: format!("K5-{}", i + 1),
						position: Point::new(
							center.x + CANONICAL_RADIUS * angle.cos(),
							center.y + CANONICAL_RADIUS * angle.sin(),
						),
					});
				}
				for i in 0..5 {
					for j in i + 1..5 {
						edges.push((i, j));
					}
				}
			}
			CanonicalKind::K33 => {
				// interleaved columns: even slots are U, odd slots are V
				for i in 0..3 {
					let y = center.y - 60.0 + (i as f64) * 60.0;
					nodes.push(CanonicalNode {
						label: format!("U{}", i + 1),
						position: Point::new(center.x - 50.0, y),
					});
					nodes.push(CanonicalNode {
						label: format!("V{}", i + 1),
						position: Point::new(center.x + 50.0, y),
					});
				}
				for i in 0..3 {
					for j in 0..3 {
						edges.push((i * 2, j * 2 + 1));
					}
				}
			}
		}

		Self { kind, nodes, edges }
	}

	pub fn slot_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn slot_position(&self, slot: usize) -> Point {
		self.nodes[slot % self.nodes.len()].position
	}

	pub fn edge_segment(&self, edge: usize) -> Segment {
		let (a, b) = self.edges[edge % self.edges.len()];
		Segment::new(self.nodes[a].position, self.nodes[b].position)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn k5_is_complete_on_five_slots() {
		let g = CanonicalGraph::generate(CanonicalKind::K5, Point::new(0.0, 0.0));
		assert_eq!((g.nodes.len(), g.edges.len()), (5, 10));
		let top = g.slot_position(0);
		assert!(top.x.abs() < 1e-9);
		assert!((top.y + CANONICAL_RADIUS).abs() < 1e-9);
		for n in &g.nodes {
			assert!((n.position.distance(Point::new(0.0, 0.0)) - CANONICAL_RADIUS).abs() < 1e-9);
		}
	}

	#[test]
	fn k33_is_bipartite() {
		let g = CanonicalGraph::generate(CanonicalKind::K33, Point::new(200.0, 100.0));
		assert_eq!(g.kind, CanonicalKind::K33);
		assert_eq!((g.nodes.len(), g.edges.len()), (6, 9));
		let labels: Vec<_> = g.nodes.iter().map(|n| n.label.as_str()).collect();
		assert_eq!(labels, vec!["U1", "V1", "U2", "V2", "U3", "V3"]);
		assert!(g.edges.iter().all(|&(u, v)| u % 2 == 0 && v % 2 == 1));
		assert_eq!(g.slot_position(0), Point::new(150.0, 40.0));
	}

	#[test]
	fn generation_is_deterministic() {
		let c = Point::new(3.0, 4.0);
		assert_eq!(
			CanonicalGraph::generate(CanonicalKind::K5, c),
			CanonicalGraph::generate(CanonicalKind::K5, c)
		);
	}
}
