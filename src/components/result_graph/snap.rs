//! Matching principal conflict nodes onto canonical obstruction slots.
//!
//! The snap map is the single piece of shared state here. Physics mode,
//! slot visibility and connector geometry are all derived from it on demand,
//! and physics is live exactly when the map is empty.

use std::collections::{BTreeMap, HashMap};

use log::{debug, info};

use super::canonical::CanonicalGraph;
use super::layout::LayoutDriver;
use crate::components::geometry::{Easing, Point, Segment, Transition};
use crate::components::model::GraphModel;
use crate::components::payload::NodeId;

/// Maximum release distance from a free slot that still snaps.
pub const SNAP_DISTANCE: f64 = 30.0;
/// Seconds for a released node to fly onto its slot.
pub const FLIGHT_DURATION: f64 = 0.3;
/// Seconds per pulse phase: grow, shrink, fade.
pub const PULSE_PHASE: f64 = 0.2;
pub const SLOT_RADIUS: f64 = 8.0;
pub const PULSE_RADIUS: f64 = 12.0;

/// Line from a principal node to the slot it is assigned to.
#[derive(Clone, Debug, PartialEq)]
pub struct Connector {
	pub node: NodeId,
	pub slot: usize,
	pub segment: Segment,
}

/// Which canonical slots and edges may be drawn and hit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalVisibility {
	pub slots: Vec<bool>,
	pub edges: bool,
}

#[derive(Clone, Debug)]
struct Flight {
	slot: usize,
	path: Transition<Point>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pulse {
	pub slot: usize,
	elapsed: f64,
}

impl Pulse {
	/// Radius and opacity of the pulse ring at its current time.
	pub fn appearance(&self) -> (f64, f64) {
		let phase = self.elapsed / PULSE_PHASE;
		if phase < 1.0 {
			(SLOT_RADIUS + (PULSE_RADIUS - SLOT_RADIUS) * phase, 1.0)
		} else if phase < 2.0 {
			(PULSE_RADIUS - (PULSE_RADIUS - SLOT_RADIUS) * (phase - 1.0), 1.0)
		} else {
			(SLOT_RADIUS, (3.0 - phase).max(0.0))
		}
	}

	fn is_finished(&self) -> bool {
		self.elapsed >= PULSE_PHASE * 3.0
	}
}

pub struct SnapEngine {
	canonical: CanonicalGraph,
	snapped: BTreeMap<NodeId, usize>,
	conflict_nodes: Vec<NodeId>,
	principals: Vec<NodeId>,
	flights: BTreeMap<NodeId, Flight>,
	pulses: Vec<Pulse>,
}

impl SnapEngine {
	pub fn new(model: &GraphModel, canonical: CanonicalGraph) -> Self {
		let (conflict_nodes, principals) = classify_conflict_nodes(model);
		debug!(
			"{} conflict nodes, {} principal",
			conflict_nodes.len(),
			principals.len()
		);
		Self {
			canonical,
			snapped: BTreeMap::new(),
			conflict_nodes,
			principals,
			flights: BTreeMap::new(),
			pulses: Vec::new(),
		}
	}

	pub fn canonical(&self) -> &CanonicalGraph {
		&self.canonical
	}

	pub fn snap_map(&self) -> &BTreeMap<NodeId, usize> {
		&self.snapped
	}

	pub fn is_snapped(&self, id: &NodeId) -> bool {
		self.snapped.contains_key(id)
	}

	pub fn is_conflict(&self, id: &NodeId) -> bool {
		self.conflict_nodes.contains(id)
	}

	/// Conflict nodes in the order their edges were first encountered.
	pub fn conflict_nodes(&self) -> &[NodeId] {
		&self.conflict_nodes
	}

	pub fn principals(&self) -> &[NodeId] {
		&self.principals
	}

	pub fn is_principal(&self, id: &NodeId) -> bool {
		self.principals.contains(id)
	}

	pub fn pulses(&self) -> &[Pulse] {
		&self.pulses
	}

	pub fn is_animating(&self) -> bool {
		!self.flights.is_empty() || !self.pulses.is_empty()
	}

	/// Drag start: unsnaps the node first, then applies drag pinning.
	pub fn begin_drag(&mut self, layout: &mut LayoutDriver, model: &mut GraphModel, id: &NodeId) {
		if let Some(slot) = self.snapped.remove(id) {
			self.flights.remove(id);
			info!("unsnapped {id} from {}", self.canonical.nodes[slot].label);
			self.sync_physics(layout);
		}
		layout.drag_start(model, id);
	}

	pub fn drag(
		&mut self,
		layout: &mut LayoutDriver,
		model: &mut GraphModel,
		id: &NodeId,
		p: Point,
	) {
		layout.drag_to(model, id, p);
	}

	/// Drag release: snaps onto the nearest free slot within [`SNAP_DISTANCE`]
	/// or leaves the node where it was dropped. Returns the claimed slot.
	pub fn end_drag(
		&mut self,
		layout: &mut LayoutDriver,
		model: &mut GraphModel,
		id: &NodeId,
	) -> Option<usize> {
		layout.drag_end();
		let released = model.node(id).map(|n| n.position());
		let target = released
			.filter(|_| self.is_conflict(id))
			.and_then(|p| self.nearest_free_slot(id, p));

		let (Some(slot), Some(from)) = (target, released) else {
			layout.unpin(id);
			return None;
		};

		self.snapped.insert(id.clone(), slot);
		self.sync_physics(layout);
		self.flights.insert(
			id.clone(),
			Flight {
				slot,
				path: Transition::new(
					from,
					self.canonical.slot_position(slot),
					FLIGHT_DURATION,
					Easing::CubicOut,
				),
			},
		);
		info!("snapped {id} to {}", self.canonical.nodes[slot].label);
		Some(slot)
	}

	/// Closest slot to `p` within snapping range that no other node holds.
	pub fn nearest_free_slot(&self, id: &NodeId, p: Point) -> Option<usize> {
		self.canonical
			.nodes
			.iter()
			.enumerate()
			.filter(|(slot, _)| {
				!self
					.snapped
					.iter()
					.any(|(other, taken)| taken == slot && other != id)
			})
			.map(|(slot, node)| (slot, node.position.distance(p)))
			.filter(|&(_, d)| d < SNAP_DISTANCE)
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(slot, _)| slot)
	}

	/// Advances flights and pulses. Every frame of a flight re-pins the node so
	/// incident edges and connectors follow it. Returns the slots whose flight
	/// landed this frame.
	pub fn advance(
		&mut self,
		layout: &mut LayoutDriver,
		model: &mut GraphModel,
		dt: f64,
	) -> Vec<usize> {
		let mut landed = Vec::new();
		for (id, flight) in &mut self.flights {
			let p = flight.path.advance(dt);
			layout.pin(model, id, p);
			if flight.path.is_finished() {
				landed.push(flight.slot);
			}
		}
		self.flights.retain(|_, f| !f.path.is_finished());

		for pulse in &mut self.pulses {
			pulse.elapsed += dt;
		}
		self.pulses.retain(|p| !p.is_finished());
		self.pulses
			.extend(landed.iter().map(|&slot| Pulse { slot, elapsed: 0.0 }));
		landed
	}

	/// Clears every snap, releases all pins and reheats the simulation.
	pub fn reset(&mut self, layout: &mut LayoutDriver) {
		self.snapped.clear();
		self.flights.clear();
		self.pulses.clear();
		layout.unpin_all();
		let activity = layout.config().resume_activity;
		layout.resume(activity);
		info!("snap state reset");
	}

	/// Principal node `i` is drawn toward slot `i mod slot_count`.
	pub fn connectors(&self, model: &GraphModel) -> Vec<Connector> {
		let count = self.canonical.slot_count();
		if count == 0 {
			return Vec::new();
		}
		self.principals
			.iter()
			.enumerate()
			.filter_map(|(i, id)| {
				let node = model.node(id)?;
				let slot = i % count;
				Some(Connector {
					node: id.clone(),
					slot,
					segment: Segment::new(node.position(), self.canonical.slot_position(slot)),
				})
			})
			.collect()
	}

	/// Recomputed from the snap map on every call.
	pub fn visibility(&self) -> CanonicalVisibility {
		let mut slots = vec![true; self.canonical.slot_count()];
		for &slot in self.snapped.values() {
			slots[slot] = false;
		}
		CanonicalVisibility {
			slots,
			edges: self.snapped.is_empty(),
		}
	}

	fn sync_physics(&self, layout: &mut LayoutDriver) {
		if !self.snapped.is_empty() {
			layout.freeze();
		} else if !layout.is_live() {
			let activity = layout.config().resume_activity;
			layout.resume(activity);
		}
	}
}

/// Splits out conflict nodes (edge encounter order) and the principal ones
/// among all nodes (model order). An explicit flag wins; otherwise a node is
/// principal when its conflict degree exceeds two.
fn classify_conflict_nodes(model: &GraphModel) -> (Vec<NodeId>, Vec<NodeId>) {
	let mut order = Vec::new();
	let mut degree: HashMap<&NodeId, usize> = HashMap::new();
	for edge in model.edges().iter().filter(|e| e.conflict) {
		for end in [&edge.source, &edge.target] {
			let d = degree.entry(end).or_insert(0);
			if *d == 0 {
				order.push(end.clone());
			}
			*d += 1;
		}
	}

	let principals = model
		.nodes()
		.filter(|n| match n.principal {
			Some(flag) => flag,
			None => degree.get(&n.id).is_some_and(|&d| d > 2),
		})
		.map(|n| n.id.clone())
		.collect();
	(order, principals)
}
