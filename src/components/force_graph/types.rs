//! Graph data structures supplied by the extraction service.

use serde::Deserialize;

use crate::error::LoadError;

/// A node in the graph.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in relationships.
	pub id: String,
	/// Category label (e.g. "Person", "Organization"). Drives color assignment.
	#[serde(rename = "type", default)]
	pub kind: String,
	/// Free-form description attached by the producer.
	#[serde(default)]
	pub detail: String,
}

impl GraphNode {
	/// Convenience constructor.
	pub fn new(id: impl Into<String>, kind: impl Into<String>, detail: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			kind: kind.into(),
			detail: detail.into(),
		}
	}
}

/// A directed, labeled edge between two nodes.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GraphRelationship {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	/// Relationship label, drawn at the middle of the edge.
	#[serde(rename = "type", default)]
	pub label: String,
}

impl GraphRelationship {
	/// Convenience constructor.
	pub fn new(
		source: impl Into<String>,
		target: impl Into<String>,
		label: impl Into<String>,
	) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			label: label.into(),
		}
	}
}

/// Complete graph data: nodes and relationships, replaced wholesale on refresh.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct GraphData {
	/// All nodes, in producer order.
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	/// All relationships. `links` is accepted as an alias.
	#[serde(default, alias = "links")]
	pub relationships: Vec<GraphRelationship>,
}

impl GraphData {
	/// Parses graph data from its JSON wire form.
	pub fn from_json(json: &str) -> Result<Self, LoadError> {
		Ok(serde_json::from_str(json)?)
	}

	/// True when there is nothing to lay out.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}
