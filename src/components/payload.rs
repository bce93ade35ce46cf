//! Wire types for graphs coming back from the planarity tester.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
	#[error("malformed graph payload: {0}")]
	Json(#[from] serde_json::Error),
}

/// Node identity. Incoming ids may be JSON strings or numbers; both are kept
/// as their string form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "RawId")]
pub struct NodeId(String);

impl NodeId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Leading decimal digits, if the id starts with any.
	pub fn numeric_prefix(&self) -> Option<u64> {
		let digits: &str = {
			let end = self
				.0
				.find(|c: char| !c.is_ascii_digit())
				.unwrap_or(self.0.len());
			&self.0[..end]
		};
		digits.parse().ok()
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NodeId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

impl From<u64> for NodeId {
	fn from(id: u64) -> Self {
		Self(id.to_string())
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
	Int(i64),
	Float(f64),
	Text(String),
}

impl From<RawId> for NodeId {
	fn from(raw: RawId) -> Self {
		match raw {
			RawId::Int(n) => Self(n.to_string()),
			RawId::Float(n) => Self(n.to_string()),
			RawId::Text(s) => Self(s),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanarityStatus {
	Planar,
	NonPlanar,
}

/// Which Kuratowski obstruction a non-planar certificate reduces to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum CanonicalKind {
	#[default]
	#[serde(rename = "K5")]
	K5,
	#[serde(rename = "K3,3")]
	K33,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PayloadNode {
	pub id: NodeId,
	#[serde(default)]
	pub x: Option<f64>,
	#[serde(default)]
	pub y: Option<f64>,
	#[serde(default)]
	pub is_principal: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PayloadEdge {
	pub source: NodeId,
	pub target: NodeId,
	#[serde(default)]
	pub is_conflict: bool,
}

/// The `{nodes, edges}` part shared by result payloads and editor loads.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphPayload {
	#[serde(default)]
	pub nodes: Vec<PayloadNode>,
	#[serde(default)]
	pub edges: Vec<PayloadEdge>,
}

impl GraphPayload {
	pub fn from_json(json: &str) -> Result<Self, PayloadError> {
		Ok(serde_json::from_str(json)?)
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ResultPayload {
	pub status: PlanarityStatus,
	#[serde(rename = "type", default)]
	pub kind: Option<CanonicalKind>,
	#[serde(flatten)]
	pub graph: GraphPayload,
}

impl ResultPayload {
	pub fn from_json(json: &str) -> Result<Self, PayloadError> {
		Ok(serde_json::from_str(json)?)
	}

	pub fn is_planar(&self) -> bool {
		self.status == PlanarityStatus::Planar
	}

	/// Obstruction to draw for a non-planar result; K5 when unspecified.
	pub fn canonical_kind(&self) -> CanonicalKind {
		self.kind.unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn ids_accept_strings_and_numbers() {
		let g = GraphPayload::from_json(
			r#"{"nodes":[{"id":"a"},{"id":5},{"id":7.0,"x":1.5,"y":-2}],
			    "edges":[{"source":5,"target":"a","is_conflict":true}]}"#,
		)
		.unwrap();
		let ids: Vec<_> = g.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec!["a", "5", "7"]);
		assert_eq!(g.nodes[2].x, Some(1.5));
		assert_eq!(g.nodes[0].x, None);
		assert!(g.edges[0].is_conflict);
		assert_eq!(g.edges[0].source, NodeId::from("5"));
	}

	#[test]
	fn result_payload_reads_type_and_status() {
		let p = ResultPayload::from_json(
			r#"{"status":"non_planar","type":"K3,3","nodes":[],"edges":[]}"#,
		)
		.unwrap();
		assert!(!p.is_planar());
		assert_eq!(p.canonical_kind(), CanonicalKind::K33);

		let p = ResultPayload::from_json(r#"{"status":"non_planar"}"#).unwrap();
		assert_eq!(p.canonical_kind(), CanonicalKind::K5);
		assert!(p.graph.nodes.is_empty());
	}

	#[test]
	fn malformed_json_is_an_error() {
		assert!(matches!(
			ResultPayload::from_json("{\"status\":\"maybe\"}"),
			Err(PayloadError::Json(_))
		));
	}

	#[test]
	fn numeric_prefix_follows_leading_digits() {
		assert_eq!(NodeId::from("12").numeric_prefix(), Some(12));
		assert_eq!(NodeId::from("4b").numeric_prefix(), Some(4));
		assert_eq!(NodeId::from("A").numeric_prefix(), None);
	}
}
