//! Visual theming for the force graph.
//!
//! The node type palette is fixed, process-wide configuration; everything
//! else lives in [`Theme`]. The canvas background is always transparent so
//! the graph can sit under the page chrome.

use super::types::NodeType;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Alpha in 0.0..=1.0.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with explicit alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// CSS color string: `#rrggbb` when opaque, `rgba(...)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Color for nodes whose type is not one of the known categories.
pub const FALLBACK_NODE_COLOR: Color = Color::rgb(0xcc, 0xcc, 0xcc);

/// Fill color for a node type.
pub fn node_type_color(node_type: &NodeType) -> Color {
	match node_type {
		NodeType::Product => Color::rgb(0xff, 0x6b, 0x6b),          // Red
		NodeType::Persona => Color::rgb(0x4e, 0xcd, 0xc4),          // Teal
		NodeType::Need => Color::rgb(0xff, 0xe6, 0x6d),             // Yellow
		NodeType::Feature => Color::rgb(0x1a, 0x53, 0x5c),          // Dark blue
		NodeType::ValueProposition => Color::rgb(0xff, 0x9f, 0x1c), // Orange
		NodeType::Constraint => Color::rgb(0x55, 0x55, 0x55),       // Grey
		NodeType::Goal => Color::rgb(0x95, 0xe1, 0xd3),             // Light green
		NodeType::Other(_) => FALLBACK_NODE_COLOR,
	}
}

/// Edge style configuration.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	/// Link line color.
	pub color: Color,
	/// Arrowhead fill color.
	pub arrow_color: Color,
}

/// Text style configuration.
#[derive(Clone, Debug)]
pub struct TextStyle {
	/// Font family list for all canvas text.
	pub font_family: &'static str,
	/// Node label color.
	pub label_color: Color,
	/// De-emphasized type caption color.
	pub type_color: Color,
}

/// Tooltip style configuration.
#[derive(Clone, Debug)]
pub struct TooltipStyle {
	/// Box fill.
	pub background: Color,
	/// Text color.
	pub color: Color,
}

/// Complete theme configuration.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Edge colors.
	pub edge: EdgeStyle,
	/// Label colors and font.
	pub text: TextStyle,
	/// Hover tooltip colors.
	pub tooltip: TooltipStyle,
}

impl Theme {
	/// Light theme matching the naumu page.
	pub fn naumu() -> Self {
		Self {
			edge: EdgeStyle {
				color: Color::rgba(0, 0, 0, 0.2),
				arrow_color: Color::rgba(0, 0, 0, 0.35),
			},
			text: TextStyle {
				font_family: "Comfortaa, sans-serif",
				label_color: Color::rgb(0x33, 0x33, 0x33),
				type_color: Color::rgba(100, 100, 100, 0.8),
			},
			tooltip: TooltipStyle {
				background: Color::rgba(0, 0, 0, 0.75),
				color: Color::rgb(255, 255, 255),
			},
		}
	}

	/// Canvas font string for regular text.
	pub fn font(&self, size: f64) -> String {
		format!("{}px {}", size, self.text.font_family)
	}

	/// Canvas font string for the italic type caption.
	pub fn italic_font(&self, size: f64) -> String {
		format!("italic {}px {}", size, self.text.font_family)
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::naumu()
	}
}
