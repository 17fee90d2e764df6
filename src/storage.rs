//! Persistence of the last displayed graph in `localStorage`.
//!
//! Storage is best effort: a missing or unavailable store and malformed
//! contents all read back as "nothing saved", and failed writes are logged.

use log::{debug, warn};
use web_sys::Storage;

use crate::components::force_graph::KnowledgeGraph;

/// `localStorage` key holding the last displayed graph.
pub const STORAGE_KEY: &str = "naumu-graph";

fn local_storage() -> Option<Storage> {
	web_sys::window()?.local_storage().ok().flatten()
}

/// Restores the saved graph, if there is a readable one.
pub fn load() -> Option<KnowledgeGraph> {
	let text = local_storage()?.get_item(STORAGE_KEY).ok().flatten()?;
	decode(&text)
}

/// Saves `graph` so the next visit starts from it.
pub fn save(graph: &KnowledgeGraph) {
	let Some(storage) = local_storage() else {
		return;
	};
	match encode(graph) {
		Ok(text) => {
			if storage.set_item(STORAGE_KEY, &text).is_err() {
				warn!("naumu-graph: could not persist graph");
			} else {
				debug!("naumu-graph: saved {} nodes", graph.nodes.len());
			}
		}
		Err(e) => warn!("naumu-graph: could not encode graph: {}", e),
	}
}

/// Forgets the saved graph.
pub fn clear() {
	if let Some(storage) = local_storage() {
		let _ = storage.remove_item(STORAGE_KEY);
	}
}

/// Serializes a graph in the persisted format.
pub fn encode(graph: &KnowledgeGraph) -> serde_json::Result<String> {
	serde_json::to_string(graph)
}

/// Parses persisted text. Malformed text is logged and treated as absent.
pub fn decode(text: &str) -> Option<KnowledgeGraph> {
	match serde_json::from_str::<KnowledgeGraph>(text) {
		Ok(graph) => Some(graph),
		Err(e) => {
			warn!("naumu-graph: failed to parse stored graph: {}", e);
			None
		}
	}
}
