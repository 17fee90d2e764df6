//! Force-directed knowledge graph visualization.
//!
//! Renders an interactive force-directed graph on an HTML canvas with:
//! - A d3-force style layout that cools to rest and reheats on every new graph
//! - Node dragging that pins nodes where they are dropped
//! - Pan, wheel zoom and two-finger pinch zoom
//! - Node and edge tooltips on hover
//!
//! Everything except [`ForceGraphCanvas`] and [`CanvasSurface`] is plain Rust
//! and runs off the browser.
//!
//! # Example
//!
//! ```ignore
//! use naumu_graph::{ForceGraphCanvas, GraphEdge, GraphNode, KnowledgeGraph, NodeType};
//!
//! let data = KnowledgeGraph {
//!     nodes: vec![
//!         GraphNode { id: "a".into(), label: "Checkout".into(), node_type: NodeType::Feature, val: None },
//!         GraphNode { id: "b".into(), label: "Speed".into(), node_type: NodeType::Need, val: None },
//!     ],
//!     edges: vec![GraphEdge { source: "a".into(), target: "b".into(), label: Some("serves".into()) }],
//! };
//!
//! view! { <ForceGraphCanvas data=Signal::stored(data) fullscreen=true /> }
//! ```

mod component;
mod interaction;
pub mod render;
pub mod scale;
pub mod simulation;
pub mod state;
pub mod theme;
pub mod types;
pub mod view;

pub use component::ForceGraphCanvas;
pub use interaction::is_form_control;
pub use render::{CanvasSurface, Surface, render};
pub use simulation::{ForceConfig, ForceOverrides, Simulation, initialize};
pub use state::ForceGraphState;
pub use theme::Theme;
pub use types::{GraphEdge, GraphIssue, GraphNode, KnowledgeGraph, NodeType};
pub use view::GraphView;
