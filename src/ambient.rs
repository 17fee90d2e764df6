//! Label-free background graph shown before and between real results.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::components::force_graph::{GraphEdge, GraphNode, KnowledgeGraph, NodeType};

/// Nodes in every ambient graph.
pub const AMBIENT_NODE_COUNT: usize = 40;

/// Most outgoing edges a single ambient node gets.
pub const MAX_AMBIENT_EDGES: usize = 2;

/// Builds a loosely connected graph of unlabeled nodes of random type.
///
/// Each node gets 0 to [`MAX_AMBIENT_EDGES`] outgoing edges to random nodes;
/// a draw that lands on the node itself is skipped. The same seed always
/// yields the same graph.
pub fn generate_ambient_graph(seed: u64) -> KnowledgeGraph {
	let mut rng = StdRng::seed_from_u64(seed);

	let nodes: Vec<GraphNode> = (0..AMBIENT_NODE_COUNT)
		.map(|i| GraphNode {
			id: format!("node-{i}"),
			label: String::new(),
			node_type: NodeType::KNOWN[rng.gen_range(0..NodeType::KNOWN.len())].clone(),
			val: Some(rng.gen_range(1.0..3.0)),
		})
		.collect();

	let mut edges = Vec::new();
	for (i, node) in nodes.iter().enumerate() {
		for _ in 0..rng.gen_range(0..=MAX_AMBIENT_EDGES) {
			let target = rng.gen_range(0..AMBIENT_NODE_COUNT);
			if target == i {
				continue;
			}
			edges.push(GraphEdge {
				source: node.id.clone(),
				target: nodes[target].id.clone(),
				label: None,
			});
		}
	}

	KnowledgeGraph { nodes, edges }
}
