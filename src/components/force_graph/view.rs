//! Lifecycle of the single live graph view.
//!
//! [`GraphView`] owns the interaction state bound to whatever graph is on
//! screen, plus the visual configuration used to draw it. It is created
//! unmounted, mounted once a drawing surface exists, and every new graph is a
//! full replace followed by a reheat. Nothing here touches the DOM, so the
//! canvas component is a thin shell around it.

use log::{debug, info};

use super::render::{self, Surface};
use super::scale::ScaleConfig;
use super::simulation::{ForceConfig, ForceOverrides};
use super::state::ForceGraphState;
use super::theme::Theme;
use super::types::{GraphIssue, KnowledgeGraph};

enum Phase {
	Unmounted,
	Mounted(ForceGraphState),
}

/// Owns the mounted graph state and the configuration it is drawn with.
pub struct GraphView {
	phase: Phase,
	overrides: ForceOverrides,
	scale: ScaleConfig,
	theme: Theme,
}

impl Default for GraphView {
	fn default() -> Self {
		Self::new(ForceOverrides::default(), ScaleConfig::default(), Theme::default())
	}
}

impl GraphView {
	/// Unmounted view. `overrides` patch the force configuration chosen for
	/// every graph bound later.
	pub fn new(overrides: ForceOverrides, scale: ScaleConfig, theme: Theme) -> Self {
		Self {
			phase: Phase::Unmounted,
			overrides,
			scale,
			theme,
		}
	}

	/// Whether a drawing surface is attached.
	pub fn is_mounted(&self) -> bool {
		matches!(self.phase, Phase::Mounted(_))
	}

	/// Attaches a surface of the given size, showing an empty graph.
	/// Mounting twice only resizes.
	pub fn mount(&mut self, width: f64, height: f64) {
		match &mut self.phase {
			Phase::Mounted(state) => state.resize(width, height),
			Phase::Unmounted => {
				debug!("naumu-graph: mounted at {}x{}", width, height);
				self.phase = Phase::Mounted(ForceGraphState::empty(width, height));
			}
		}
	}

	/// Replaces the bound graph and reheats. Pan/zoom and viewport size carry
	/// over; pins and pointer sessions do not. Returns whatever had to be
	/// dropped from `graph`.
	pub fn replace(&mut self, graph: &KnowledgeGraph) -> Vec<GraphIssue> {
		let Phase::Mounted(current) = &self.phase else {
			debug!("naumu-graph: ignoring graph update while unmounted");
			return Vec::new();
		};

		let config = self.overrides.apply(ForceConfig::for_graph(graph));
		let (mut next, issues) =
			ForceGraphState::new(graph, config, current.width, current.height);
		next.transform = current.transform.clone();
		next.sim.reheat();

		info!(
			"naumu-graph: bound {} nodes, {} links ({} dropped)",
			next.sim.nodes().len(),
			next.sim.links().len(),
			issues.len()
		);
		self.phase = Phase::Mounted(next);
		issues
	}

	/// Detaches from the surface, discarding all graph state.
	pub fn unmount(&mut self) {
		if self.is_mounted() {
			debug!("naumu-graph: unmounted");
		}
		self.phase = Phase::Unmounted;
	}

	/// Advances the layout by one animation frame.
	pub fn frame(&mut self) {
		if let Some(state) = self.state_mut() {
			state.tick();
		}
	}

	/// Draws the current frame.
	pub fn render(&self, surface: &mut impl Surface) {
		if let Some(state) = self.state() {
			render::render(state, surface, &self.scale, &self.theme);
		}
	}

	/// Tracks a new viewport size.
	pub fn resize(&mut self, width: f64, height: f64) {
		if let Some(state) = self.state_mut() {
			state.resize(width, height);
		}
	}

	/// Mounted state, if any.
	pub fn state(&self) -> Option<&ForceGraphState> {
		match &self.phase {
			Phase::Mounted(state) => Some(state),
			Phase::Unmounted => None,
		}
	}

	/// Mutable mounted state, if any.
	pub fn state_mut(&mut self) -> Option<&mut ForceGraphState> {
		match &mut self.phase {
			Phase::Mounted(state) => Some(state),
			Phase::Unmounted => None,
		}
	}

	/// Press at a screen position. True when a node was grabbed.
	pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
		match &mut self.phase {
			Phase::Mounted(state) => state.pointer_down(x, y, &self.scale),
			Phase::Unmounted => false,
		}
	}

	/// Pointer moved to a screen position.
	pub fn pointer_move(&mut self, x: f64, y: f64) {
		if let Phase::Mounted(state) = &mut self.phase {
			state.pointer_move(x, y, &self.scale);
		}
	}

	/// Pointer released.
	pub fn pointer_up(&mut self) {
		if let Some(state) = self.state_mut() {
			state.pointer_up();
		}
	}

	/// Pointer left the surface.
	pub fn pointer_leave(&mut self) {
		if let Some(state) = self.state_mut() {
			state.pointer_leave();
		}
	}

	/// Wheel notch at a screen position.
	pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) {
		if let Some(state) = self.state_mut() {
			state.wheel_zoom(x, y, delta_y);
		}
	}

	/// Two fingers down `distance` pixels apart.
	pub fn pinch_start(&mut self, distance: f64) {
		if let Some(state) = self.state_mut() {
			state.pinch_start(distance);
		}
	}

	/// Two fingers moved; `(cx, cy)` is their midpoint.
	pub fn pinch_move(&mut self, distance: f64, cx: f64, cy: f64) {
		if let Some(state) = self.state_mut() {
			state.pinch_move(distance, cx, cy);
		}
	}
}
