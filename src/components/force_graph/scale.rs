//! Sizes of everything drawn, and how each one reacts to zoom.
//!
//! # Coordinate Spaces
//!
//! - **World-space**: The coordinate system of the simulation. Values in
//!   world-space scale proportionally with zoom (appear larger when zoomed in).
//! - **Screen-space**: Pixel coordinates on the canvas. Values in screen-space
//!   remain constant regardless of zoom level.
//!
//! Node circles, hit areas and arrowheads live in world-space so the drawing
//! keeps its proportions. Text and line widths are screen-space so they stay
//! legible at any zoom.

/// How a size responds to zoom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScaleBehavior {
	/// Constant world-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
}

impl ScaleBehavior {
	/// World-space size for `base` at zoom `k`, ready to draw under the view transform.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
		}
	}
}

/// Configuration for node visual scaling.
#[derive(Clone, Debug)]
pub struct NodeScaleConfig {
	/// Visible node radius in world units.
	pub radius: f64,
	/// Invisible hit area radius, as a multiple of the visible radius.
	pub hit_factor: f64,
	/// Scale the radius by `sqrt(val)` instead of drawing every node the same size.
	pub size_by_value: bool,
	/// Label font size in screen pixels.
	pub label_size: f64,
	/// Type caption font size in screen pixels.
	pub type_size: f64,
	/// Gap between label and type caption in screen pixels.
	pub caption_gap: f64,
	/// How text scales with zoom.
	pub text_behavior: ScaleBehavior,
}

/// Configuration for edge visual scaling.
#[derive(Clone, Debug)]
pub struct EdgeScaleConfig {
	/// Line width in screen pixels.
	pub line_width: f64,
	/// Arrowhead length in world units.
	pub arrow_length: f64,
	/// Arrowhead position along the visible link (0.0 = source side, 1.0 = target side).
	pub arrow_rel_pos: f64,
	/// Pointer tolerance for edge hovering, in screen pixels.
	pub hover_tolerance: f64,
}

/// Configuration for the hover tooltip.
#[derive(Clone, Debug)]
pub struct TooltipScaleConfig {
	/// Font size in screen pixels.
	pub font_size: f64,
	/// Padding around the text in screen pixels.
	pub padding: f64,
	/// Offset from the pointer in screen pixels.
	pub offset: f64,
}

/// Complete scale configuration for all graph elements.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Node sizing.
	pub node: NodeScaleConfig,
	/// Edge and arrow sizing.
	pub edge: EdgeScaleConfig,
	/// Tooltip sizing.
	pub tooltip: TooltipScaleConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				radius: 4.0,
				hit_factor: 3.0,
				size_by_value: false,
				label_size: 12.0,
				type_size: 8.0,
				caption_gap: 2.0,
				text_behavior: ScaleBehavior::Screen,
			},
			edge: EdgeScaleConfig {
				line_width: 1.0,
				arrow_length: 3.5,
				arrow_rel_pos: 1.0,
				hover_tolerance: 4.0,
			},
			tooltip: TooltipScaleConfig {
				font_size: 12.0,
				padding: 4.0,
				offset: 12.0,
			},
		}
	}
}

impl ScaleConfig {
	/// Visible radius of a node with the given value, in world units.
	pub fn node_radius(&self, value: f64) -> f64 {
		if self.node.size_by_value {
			self.node.radius * value.max(0.0).sqrt()
		} else {
			self.node.radius
		}
	}

	/// Hit area radius of a node with the given value, in world units.
	pub fn hit_radius(&self, value: f64) -> f64 {
		self.node_radius(value) * self.node.hit_factor
	}
}

/// Sizes resolved for one zoom level, all in world-space.
///
/// Built once per frame by the renderer and by hit testing.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Current zoom level.
	pub k: f64,
	/// Label font size in world-space.
	pub label_size: f64,
	/// Type caption font size in world-space.
	pub type_size: f64,
	/// Label/caption gap in world-space.
	pub caption_gap: f64,
	/// Edge line width in world-space.
	pub edge_line_width: f64,
	/// Arrowhead length in world-space.
	pub arrow_length: f64,
	/// Edge hover tolerance in world-space.
	pub hover_tolerance: f64,
}

impl ScaledValues {
	/// Resolves `config` at zoom `k`.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let text = config.node.text_behavior;
		Self {
			k,
			label_size: text.apply(config.node.label_size, k),
			type_size: text.apply(config.node.type_size, k),
			caption_gap: text.apply(config.node.caption_gap, k),
			edge_line_width: ScaleBehavior::Screen.apply(config.edge.line_width, k),
			arrow_length: ScaleBehavior::World.apply(config.edge.arrow_length, k),
			hover_tolerance: ScaleBehavior::Screen.apply(config.edge.hover_tolerance, k),
		}
	}
}
