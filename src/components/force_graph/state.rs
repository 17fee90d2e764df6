//! Graph simulation state and interaction tracking.
//!
//! Wraps the layout [`Simulation`] with per-node display metadata, the
//! pan/zoom view transform and the pointer sessions (drag, pan, pinch, hover)
//! driven by the interaction handlers in `interaction.rs`.

use super::scale::{ScaleConfig, ScaledValues};
use super::simulation::{ForceConfig, Simulation, initialize};
use super::theme::{Color, node_type_color};
use super::types::{GraphIssue, KnowledgeGraph, NodeType};

/// Per-node display metadata attached to each node in the simulation.
#[derive(Clone, Debug)]
pub struct NodeInfo {
	/// Display label; empty means no text.
	pub label: String,
	/// Concept category, shown under the label.
	pub node_type: NodeType,
	/// Size hint (see [`ScaleConfig::node_radius`]).
	pub value: f64,
	/// Fill color resolved from the type palette.
	pub color: Color,
}

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	/// Screen x of the graph origin.
	pub x: f64,
	/// Screen y of the graph origin.
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
	pub k: f64,
}

impl ViewTransform {
	/// Smallest allowed zoom factor.
	pub const MIN_K: f64 = 0.1;
	/// Largest allowed zoom factor.
	pub const MAX_K: f64 = 10.0;

	/// Identity zoom with the graph origin at the viewport center.
	pub fn centered(width: f64, height: f64) -> Self {
		Self {
			x: width / 2.0,
			y: height / 2.0,
			k: 1.0,
		}
	}
}

/// Tracks an in-progress node drag operation.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	/// Whether a drag session is open.
	pub active: bool,
	/// Simulation index of the dragged node.
	pub node_idx: Option<usize>,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// Whether a pan session is open.
	pub active: bool,
	/// Pointer x when the pan started.
	pub start_x: f64,
	/// Pointer y when the pan started.
	pub start_y: f64,
	/// Transform x when the pan started.
	pub transform_start_x: f64,
	/// Transform y when the pan started.
	pub transform_start_y: f64,
}

/// Tracks a two-finger pinch zoom.
#[derive(Clone, Debug, Default)]
pub struct PinchState {
	/// Whether a pinch is in progress.
	pub active: bool,
	/// Finger distance when the pinch started.
	pub start_distance: f64,
	/// Zoom factor when the pinch started.
	pub start_k: f64,
}

/// What the pointer is resting on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HoverTarget {
	/// Empty canvas.
	#[default]
	None,
	/// A node, by simulation index.
	Node(usize),
	/// A link, by simulation index.
	Link(usize),
}

/// Hovered element plus the pointer position used to place the tooltip.
#[derive(Clone, Debug, Default)]
pub struct HoverState {
	/// Element under the pointer.
	pub target: HoverTarget,
	/// Pointer x in screen space.
	pub x: f64,
	/// Pointer y in screen space.
	pub y: f64,
}

/// Core graph state combining the simulation with interaction tracking.
///
/// Rebuilt whenever the bound graph is replaced, then mutated each frame by
/// the animation loop and by pointer handlers in between.
pub struct ForceGraphState {
	/// Layout engine bound to the current graph.
	pub sim: Simulation<NodeInfo>,
	/// Current pan/zoom.
	pub transform: ViewTransform,
	/// Drag session.
	pub drag: DragState,
	/// Pan session.
	pub pan: PanState,
	/// Pinch session.
	pub pinch: PinchState,
	/// Hover state for tooltips.
	pub hover: HoverState,
	/// Viewport width in pixels.
	pub width: f64,
	/// Viewport height in pixels.
	pub height: f64,
}

impl ForceGraphState {
	/// Binds `data` to a fresh simulation. Invalid nodes and edges are
	/// dropped and returned alongside the state.
	pub fn new(
		data: &KnowledgeGraph,
		config: ForceConfig,
		width: f64,
		height: f64,
	) -> (Self, Vec<GraphIssue>) {
		let (sim, issues) = initialize(data, config, |node| NodeInfo {
			label: node.label.clone(),
			node_type: node.node_type.clone(),
			value: node.value(),
			color: node_type_color(&node.node_type),
		});

		let state = Self {
			sim,
			transform: ViewTransform::centered(width, height),
			drag: DragState::default(),
			pan: PanState::default(),
			pinch: PinchState::default(),
			hover: HoverState::default(),
			width,
			height,
		};
		(state, issues)
	}

	/// State with no graph bound.
	pub fn empty(width: f64, height: f64) -> Self {
		Self::new(&KnowledgeGraph::default(), ForceConfig::ambient(), width, height).0
	}

	/// Advances the layout one tick unless it has come to rest.
	pub fn tick(&mut self) {
		if !self.sim.is_settled() {
			self.sim.step();
		}
	}

	/// Converts a screen position to graph space.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node whose hit area contains the screen position.
	pub fn node_at_position(&self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		// Later nodes are drawn on top, so they win.
		self.sim
			.nodes()
			.iter()
			.enumerate()
			.rev()
			.find(|(_, node)| {
				let (dx, dy) = (node.x - gx, node.y - gy);
				dx.hypot(dy) < config.hit_radius(node.data.value)
			})
			.map(|(idx, _)| idx)
	}

	/// Topmost link passing within the hover tolerance of the screen position.
	pub fn link_at_position(&self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let tolerance = ScaledValues::new(config, self.transform.k).hover_tolerance;
		let nodes = self.sim.nodes();

		self.sim
			.links()
			.iter()
			.enumerate()
			.rev()
			.filter(|(_, link)| !link.is_self_loop())
			.find(|(_, link)| {
				let (a, b) = (&nodes[link.source], &nodes[link.target]);
				distance_to_segment((gx, gy), (a.x, a.y), (b.x, b.y)) < tolerance
			})
			.map(|(idx, _)| idx)
	}

	/// Text for the hover tooltip: the node label or the link label.
	pub fn tooltip(&self) -> Option<&str> {
		let text = match self.hover.target {
			HoverTarget::None => None,
			HoverTarget::Node(idx) => self.sim.nodes().get(idx).map(|n| n.data.label.as_str()),
			HoverTarget::Link(idx) => self.sim.links().get(idx).and_then(|l| l.label.as_deref()),
		};
		text.filter(|t| !t.is_empty())
	}

	/// Tracks a new viewport size, keeping the graph origin centered.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.transform.x += (width - self.width) / 2.0;
		self.transform.y += (height - self.height) / 2.0;
		self.width = width;
		self.height = height;
	}
}

fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (abx, aby) = (b.0 - a.0, b.1 - a.1);
	let len2 = abx * abx + aby * aby;
	if len2 == 0.0 {
		return (p.0 - a.0).hypot(p.1 - a.1);
	}
	let t = (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len2).clamp(0.0, 1.0);
	(p.0 - (a.0 + t * abx)).hypot(p.1 - (a.1 + t * aby))
}
