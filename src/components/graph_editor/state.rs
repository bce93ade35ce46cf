//! Tool modes, selection and in-progress edge construction for the editor.

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::components::geometry::{Point, Segment};
use crate::components::model::{EdgeId, GraphModel};
use crate::components::payload::{GraphPayload, NodeId};
use crate::components::viewport::Viewport;

pub const NODE_RADIUS: f64 = 15.0;
pub const EDGE_HIT_TOLERANCE: f64 = 5.0;
pub const ZOOM_IN_FACTOR: f64 = 1.2;
pub const ZOOM_OUT_FACTOR: f64 = 0.8;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tool {
	#[default]
	Select,
	PlaceNode,
	PlaceEdge,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
	Node(NodeId),
	Edge(EdgeId),
}

/// Discrete inputs the editor reacts to. Coordinates are in graph space.
#[derive(Clone, Debug)]
pub enum EditorEvent {
	SetTool(Tool),
	ClickCanvas(Point),
	ClickNode(NodeId),
	ClickEdge(EdgeId),
	PointerMove(Point),
	/// Press on a node; a select-tool drag keeps the node's offset from here.
	GrabNode(NodeId, Point),
	DragTo(Point),
	Release,
	/// Toolbar button: deletes the selection, or clears everything.
	DeleteOrClear,
	/// Keyboard delete: only ever removes the selection.
	DeleteSelected,
	Load(GraphPayload),
}

impl EditorEvent {
	/// Maps a keyboard key to its editor action.
	pub fn from_key(key: &str) -> Option<Self> {
		match key {
			"Delete" | "Backspace" | "Enter" => Some(Self::DeleteSelected),
			_ => None,
		}
	}
}

pub struct EditorState {
	pub model: GraphModel,
	pub viewport: Viewport,
	tool: Tool,
	selection: Option<Selection>,
	pending_edge: Option<NodeId>,
	pointer: Option<Point>,
	/// Node being dragged and its offset from the pointer.
	grab: Option<(NodeId, Point)>,
	rng: StdRng,
}

impl EditorState {
	pub fn new(width: f64, height: f64, seed: u64) -> Self {
		Self {
			model: GraphModel::new(),
			viewport: Viewport::new(width, height),
			tool: Tool::default(),
			selection: None,
			pending_edge: None,
			pointer: None,
			grab: None,
			rng: StdRng::seed_from_u64(seed),
		}
	}

	pub fn tool(&self) -> Tool {
		self.tool
	}

	pub fn selection(&self) -> Option<&Selection> {
		self.selection.as_ref()
	}

	pub fn pending_edge(&self) -> Option<&NodeId> {
		self.pending_edge.as_ref()
	}

	pub fn is_selected_node(&self, id: &NodeId) -> bool {
		matches!(&self.selection, Some(Selection::Node(n)) if n == id)
	}

	pub fn is_selected_edge(&self, id: EdgeId) -> bool {
		self.selection == Some(Selection::Edge(id))
	}

	/// Guide line from the pending edge source to the pointer.
	pub fn guide_line(&self) -> Option<Segment> {
		let source = self.model.node(self.pending_edge.as_ref()?)?;
		let pointer = self.pointer.unwrap_or(source.position());
		Some(Segment::new(source.position(), pointer))
	}

	pub fn handle(&mut self, event: EditorEvent) {
		match event {
			EditorEvent::SetTool(tool) => self.set_tool(tool),
			EditorEvent::ClickCanvas(p) => self.click_canvas(p),
			EditorEvent::ClickNode(id) => self.click_node(id),
			EditorEvent::ClickEdge(id) => self.click_edge(id),
			EditorEvent::PointerMove(p) => self.pointer_move(p),
			EditorEvent::GrabNode(id, p) => {
				self.grab_node(&id, p);
			}
			EditorEvent::DragTo(p) => self.drag_to(p),
			EditorEvent::Release => self.release(),
			EditorEvent::DeleteOrClear => self.delete_or_clear(),
			EditorEvent::DeleteSelected => {
				self.delete_selected();
			}
			EditorEvent::Load(payload) => self.load(&payload),
		}
	}

	pub fn set_tool(&mut self, tool: Tool) {
		if self.tool != tool {
			debug!("tool {:?} -> {:?}", self.tool, tool);
		}
		self.tool = tool;
		self.selection = None;
		self.pending_edge = None;
		self.grab = None;
	}

	pub fn click_canvas(&mut self, p: Point) {
		match self.tool {
			Tool::PlaceNode => {
				self.model.add_node(p.x, p.y);
			}
			Tool::PlaceEdge => self.pending_edge = None,
			Tool::Select => self.selection = None,
		}
	}

	pub fn click_node(&mut self, id: NodeId) {
		if self.model.node(&id).is_none() {
			return;
		}
		match self.tool {
			Tool::PlaceEdge => match self.pending_edge.take() {
				None => self.pending_edge = Some(id),
				Some(source) if source != id => {
					self.model.try_add_edge(&source, &id);
				}
				Some(_) => {}
			},
			Tool::Select => self.selection = Some(Selection::Node(id)),
			Tool::PlaceNode => {}
		}
	}

	pub fn click_edge(&mut self, id: EdgeId) {
		if self.tool == Tool::Select && self.model.edge(id).is_some() {
			self.selection = Some(Selection::Edge(id));
		}
	}

	pub fn pointer_move(&mut self, p: Point) {
		self.pointer = Some(p);
	}

	/// Starts a select-tool drag of `id` from the pointer at `p`.
	pub fn grab_node(&mut self, id: &NodeId, p: Point) -> bool {
		if self.tool != Tool::Select {
			return false;
		}
		let Some(node) = self.model.node(id) else {
			return false;
		};
		self.grab = Some((id.clone(), node.position() - p));
		true
	}

	/// Moves the grabbed node so it keeps its offset from the pointer.
	pub fn drag_to(&mut self, p: Point) {
		if let Some((id, offset)) = &self.grab {
			self.model.set_position(id, p + *offset);
		}
	}

	pub fn release(&mut self) {
		self.grab = None;
	}

	/// Deletes the selected element; returns false when nothing was selected.
	pub fn delete_selected(&mut self) -> bool {
		let Some(selection) = self.selection.take() else {
			return false;
		};
		match selection {
			Selection::Node(id) => {
				if self.pending_edge.as_ref() == Some(&id) {
					self.pending_edge = None;
				}
				self.model.delete_node(&id);
			}
			Selection::Edge(id) => {
				self.model.delete_edge(id);
			}
		}
		true
	}

	pub fn delete_or_clear(&mut self) {
		if !self.delete_selected() {
			self.clear();
		}
	}

	pub fn clear(&mut self) {
		self.model.clear();
		self.selection = None;
		self.pending_edge = None;
		info!("editor cleared");
	}

	pub fn export(&self) -> Option<String> {
		self.model.export_edge_list()
	}

	pub fn load(&mut self, payload: &GraphPayload) {
		self.selection = None;
		self.pending_edge = None;
		let bounds = (self.viewport.width, self.viewport.height);
		self.model.load(payload, bounds, &mut self.rng);
	}

	pub fn zoom_in(&mut self) {
		self.viewport.scale_by(ZOOM_IN_FACTOR);
	}

	pub fn zoom_out(&mut self) {
		self.viewport.scale_by(ZOOM_OUT_FACTOR);
	}

	pub fn reset_view(&mut self) {
		self.viewport.reset();
	}

	/// Resolves what lies under a graph-space point: a node first, then an edge.
	pub fn hit(&self, p: Point) -> Hit {
		if let Some(id) = self.model.node_at(p, NODE_RADIUS) {
			return Hit::Node(id.clone());
		}
		match self.model.edge_at(p, EDGE_HIT_TOLERANCE) {
			Some(id) => Hit::Edge(id),
			None => Hit::Canvas,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Hit {
	Node(NodeId),
	Edge(EdgeId),
	Canvas,
}
