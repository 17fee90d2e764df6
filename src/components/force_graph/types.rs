//! Knowledge graph data structures consumed by the force graph component.
//!
//! The JSON shape is `{"nodes":[{"id","label","type","val"?}],"edges":[{"source","target","label"?}]}`,
//! shared by the graph provider, local persistence and the ambient generator.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Node value used when `val` is absent or not a positive number.
pub const DEFAULT_NODE_VALUE: f64 = 1.0;

/// Concept category of a node. Unrecognized names are kept verbatim in `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
	/// The product being defined.
	Product,
	/// A user archetype.
	Persona,
	/// A problem a persona has.
	Need,
	/// A capability the product provides.
	Feature,
	/// Why the product matters to a persona.
	ValueProposition,
	/// A limitation the product must respect.
	Constraint,
	/// An outcome the product aims for.
	Goal,
	/// Any other type name; rendered with the fallback style.
	Other(String),
}

impl NodeType {
	/// Every known type, in palette order.
	pub const KNOWN: [NodeType; 7] = [
		NodeType::Product,
		NodeType::Persona,
		NodeType::Need,
		NodeType::Feature,
		NodeType::ValueProposition,
		NodeType::Constraint,
		NodeType::Goal,
	];

	/// The type name as it appears in JSON and under node labels.
	pub fn as_str(&self) -> &str {
		match self {
			NodeType::Product => "Product",
			NodeType::Persona => "Persona",
			NodeType::Need => "Need",
			NodeType::Feature => "Feature",
			NodeType::ValueProposition => "ValueProposition",
			NodeType::Constraint => "Constraint",
			NodeType::Goal => "Goal",
			NodeType::Other(name) => name,
		}
	}
}

impl From<String> for NodeType {
	fn from(name: String) -> Self {
		match name.as_str() {
			"Product" => NodeType::Product,
			"Persona" => NodeType::Persona,
			"Need" => NodeType::Need,
			"Feature" => NodeType::Feature,
			"ValueProposition" => NodeType::ValueProposition,
			"Constraint" => NodeType::Constraint,
			"Goal" => NodeType::Goal,
			_ => NodeType::Other(name),
		}
	}
}

impl From<NodeType> for String {
	fn from(node_type: NodeType) -> Self {
		match node_type {
			NodeType::Other(name) => name,
			known => known.as_str().to_string(),
		}
	}
}

/// Untyped nodes get an empty `Other` name and the fallback style.
impl Default for NodeType {
	fn default() -> Self {
		NodeType::Other(String::new())
	}
}

impl fmt::Display for NodeType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Reads an explicit `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A concept in the graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in edges.
	pub id: String,
	/// Display label. Empty labels suppress all text for the node.
	#[serde(default, deserialize_with = "null_as_default")]
	pub label: String,
	/// Concept category, drives the node color.
	#[serde(rename = "type", default, deserialize_with = "null_as_default")]
	pub node_type: NodeType,
	/// Optional size hint.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub val: Option<f64>,
}

impl GraphNode {
	/// Effective size hint, falling back to [`DEFAULT_NODE_VALUE`].
	pub fn value(&self) -> f64 {
		match self.val {
			Some(v) if v.is_finite() && v > 0.0 => v,
			_ => DEFAULT_NODE_VALUE,
		}
	}
}

/// A directed relation between two nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	/// Optional relation name, shown as a tooltip.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
}

/// Complete knowledge graph: nodes and edges. Always replaced as a whole.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
	/// Nodes in display order.
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	/// Edges in display order. Parallel edges are allowed.
	#[serde(default)]
	pub edges: Vec<GraphEdge>,
}

/// A recoverable defect found in an incoming graph.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GraphIssue {
	/// A node id appeared more than once; later copies are dropped.
	#[error("duplicate node id `{0}`")]
	DuplicateNode(String),
	/// An edge's source does not name a node in the graph.
	#[error("edge {from} -> {to} references missing source node")]
	MissingSource {
		/// Source node ID as given.
		from: String,
		/// Target node ID as given.
		to: String,
	},
	/// An edge's target does not name a node in the graph.
	#[error("edge {from} -> {to} references missing target node")]
	MissingTarget {
		/// Source node ID as given.
		from: String,
		/// Target node ID as given.
		to: String,
	},
}

impl KnowledgeGraph {
	/// True when any node carries a non-empty label (a result graph rather than the ambient one).
	pub fn has_labels(&self) -> bool {
		self.nodes.iter().any(|n| !n.label.is_empty())
	}

	/// Returns the valid subgraph plus every defect that was dropped.
	///
	/// Later duplicates of a node id are removed, then every edge whose
	/// endpoints do not both resolve. Survivors keep their order.
	pub fn sanitize(&self) -> (KnowledgeGraph, Vec<GraphIssue>) {
		let mut issues = Vec::new();
		let mut seen = HashSet::new();
		let mut nodes = Vec::with_capacity(self.nodes.len());

		for node in &self.nodes {
			if seen.insert(node.id.as_str()) {
				nodes.push(node.clone());
			} else {
				issues.push(GraphIssue::DuplicateNode(node.id.clone()));
			}
		}

		let edges = self
			.edges
			.iter()
			.filter(|edge| {
				let issue = if !seen.contains(edge.source.as_str()) {
					GraphIssue::MissingSource {
						from: edge.source.clone(),
						to: edge.target.clone(),
					}
				} else if !seen.contains(edge.target.as_str()) {
					GraphIssue::MissingTarget {
						from: edge.source.clone(),
						to: edge.target.clone(),
					}
				} else {
					return true;
				};
				issues.push(issue);
				false
			})
			.cloned()
			.collect();

		(KnowledgeGraph { nodes, edges }, issues)
	}
}
