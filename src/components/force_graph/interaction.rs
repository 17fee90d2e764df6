//! Pointer and touch handling for the force graph.
//!
//! Mouse and touch events are reduced to the same pointer calls, in screen
//! coordinates relative to the canvas. Dragging a node pins it to the
//! pointer; releasing leaves it pinned where it was dropped. Dragging the
//! background pans; the wheel and two-finger pinches zoom about the pointer.

use super::scale::ScaleConfig;
use super::state::{ForceGraphState, HoverTarget, ViewTransform};

/// Tag names whose touches must never be captured by the graph.
const FORM_CONTROL_TAGS: [&str; 4] = ["INPUT", "TEXTAREA", "BUTTON", "SELECT"];

/// True for elements whose touch input belongs to the page, not the graph.
pub fn is_form_control(tag_name: &str) -> bool {
	FORM_CONTROL_TAGS
		.iter()
		.any(|tag| tag.eq_ignore_ascii_case(tag_name))
}

impl ForceGraphState {
	/// Starts a drag when the press lands on a node's hit area, a pan otherwise.
	/// Returns true when a node was grabbed.
	pub fn pointer_down(&mut self, x: f64, y: f64, config: &ScaleConfig) -> bool {
		self.pinch.active = false;
		match self.node_at_position(x, y, config) {
			Some(idx) => {
				let node = &self.sim.nodes()[idx];
				let (nx, ny) = (node.x, node.y);
				self.sim.pin_index(idx, nx, ny);
				let target = self.sim.config().drag_alpha_target;
				self.sim.set_alpha_target(target);
				self.drag.active = true;
				self.drag.node_idx = Some(idx);
				self.hover.target = HoverTarget::Node(idx);
				true
			}
			None => {
				self.pan.active = true;
				self.pan.start_x = x;
				self.pan.start_y = y;
				self.pan.transform_start_x = self.transform.x;
				self.pan.transform_start_y = self.transform.y;
				false
			}
		}
	}

	/// Moves the dragged node to the pointer, pans, or updates hover.
	pub fn pointer_move(&mut self, x: f64, y: f64, config: &ScaleConfig) {
		self.hover.x = x;
		self.hover.y = y;

		if self.drag.active {
			if let Some(idx) = self.drag.node_idx {
				let (gx, gy) = self.screen_to_graph(x, y);
				self.sim.pin_index(idx, gx, gy);
			}
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		} else if !self.pinch.active {
			self.hover.target = match self.node_at_position(x, y, config) {
				Some(idx) => HoverTarget::Node(idx),
				None => self
					.link_at_position(x, y, config)
					.map_or(HoverTarget::None, HoverTarget::Link),
			};
		}
	}

	/// Ends any session. A dragged node stays pinned where it was released.
	pub fn pointer_up(&mut self) {
		if self.drag.active {
			self.sim.set_alpha_target(0.0);
		}
		self.drag.active = false;
		self.drag.node_idx = None;
		self.pan.active = false;
		self.pinch.active = false;
	}

	/// Pointer left the canvas: end sessions and drop the tooltip.
	pub fn pointer_leave(&mut self) {
		self.pointer_up();
		self.hover.target = HoverTarget::None;
	}

	/// Zooms one wheel notch about the pointer.
	pub fn wheel_zoom(&mut self, x: f64, y: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		self.zoom_about(x, y, self.transform.k * factor);
	}

	/// Starts a two-finger pinch, cancelling any single-pointer session.
	pub fn pinch_start(&mut self, distance: f64) {
		self.pointer_up();
		self.pinch.active = distance > 0.0;
		self.pinch.start_distance = distance;
		self.pinch.start_k = self.transform.k;
	}

	/// Zooms by the ratio of finger distances about the pinch center.
	pub fn pinch_move(&mut self, distance: f64, cx: f64, cy: f64) {
		if !self.pinch.active || distance <= 0.0 {
			return;
		}
		let k = self.pinch.start_k * distance / self.pinch.start_distance;
		self.zoom_about(cx, cy, k);
	}

	fn zoom_about(&mut self, x: f64, y: f64, k: f64) {
		let new_k = k.clamp(ViewTransform::MIN_K, ViewTransform::MAX_K);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}
}
