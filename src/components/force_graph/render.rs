//! Rendering for the force graph.
//!
//! Drawing goes through the [`Surface`] trait so the same passes can target
//! the browser canvas ([`CanvasSurface`]) or a recorder in tests.
//! Rendering uses multiple passes for correct z-ordering:
//! 1. Clear to transparent (screen space)
//! 2. Edge lines with arrowheads (world space)
//! 3. Node circles with label and type caption (world space)
//! 4. Hover tooltip (screen space)

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scale::{ScaleConfig, ScaledValues};
use super::state::{ForceGraphState, NodeInfo};
use super::theme::{Color, Theme};

/// Width-to-height ratio of arrowheads.
const ARROW_WH_RATIO: f64 = 1.6;

/// Minimal 2D drawing backend. Text is centered on its anchor.
pub trait Surface {
	/// Clears the whole surface to transparent.
	fn clear(&mut self, width: f64, height: f64);
	/// Translates then scales subsequent drawing.
	fn push_transform(&mut self, x: f64, y: f64, k: f64);
	/// Undoes the last [`Surface::push_transform`].
	fn pop_transform(&mut self);
	/// Strokes a straight line.
	fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, width: f64);
	/// Fills a closed polygon.
	fn polygon(&mut self, points: &[(f64, f64)], color: Color);
	/// Fills a circle.
	fn circle(&mut self, center: (f64, f64), radius: f64, color: Color);
	/// Fills an axis-aligned rectangle.
	fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color);
	/// Draws text centered on `at`.
	fn text(&mut self, text: &str, at: (f64, f64), font: &str, color: Color);
	/// Width of `text` in the given font.
	fn measure_text(&mut self, text: &str, font: &str) -> f64;
}

/// [`Surface`] over an HTML canvas 2D context.
pub struct CanvasSurface<'a> {
	ctx: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasSurface<'a> {
	/// Wraps a 2D context for one frame.
	pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
		Self { ctx }
	}
}

impl Surface for CanvasSurface<'_> {
	fn clear(&mut self, width: f64, height: f64) {
		self.ctx.clear_rect(0.0, 0.0, width, height);
	}

	fn push_transform(&mut self, x: f64, y: f64, k: f64) {
		self.ctx.save();
		let _ = self.ctx.translate(x, y);
		let _ = self.ctx.scale(k, k);
	}

	fn pop_transform(&mut self) {
		self.ctx.restore();
	}

	fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, width: f64) {
		self.ctx.set_stroke_style_str(&color.to_css());
		self.ctx.set_line_width(width);
		self.ctx.begin_path();
		self.ctx.move_to(from.0, from.1);
		self.ctx.line_to(to.0, to.1);
		self.ctx.stroke();
	}

	fn polygon(&mut self, points: &[(f64, f64)], color: Color) {
		let Some((first, rest)) = points.split_first() else {
			return;
		};
		self.ctx.set_fill_style_str(&color.to_css());
		self.ctx.begin_path();
		self.ctx.move_to(first.0, first.1);
		for p in rest {
			self.ctx.line_to(p.0, p.1);
		}
		self.ctx.close_path();
		self.ctx.fill();
	}

	fn circle(&mut self, center: (f64, f64), radius: f64, color: Color) {
		self.ctx.set_fill_style_str(&color.to_css());
		self.ctx.begin_path();
		let _ = self.ctx.arc(center.0, center.1, radius, 0.0, 2.0 * PI);
		self.ctx.fill();
	}

	fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
		self.ctx.set_fill_style_str(&color.to_css());
		self.ctx.fill_rect(x, y, width, height);
	}

	fn text(&mut self, text: &str, at: (f64, f64), font: &str, color: Color) {
		self.ctx.set_font(font);
		self.ctx.set_text_align("center");
		self.ctx.set_text_baseline("middle");
		self.ctx.set_fill_style_str(&color.to_css());
		let _ = self.ctx.fill_text(text, at.0, at.1);
	}

	fn measure_text(&mut self, text: &str, font: &str) -> f64 {
		self.ctx.set_font(font);
		self.ctx
			.measure_text(text)
			.map(|m| m.width())
			.unwrap_or_default()
	}
}

/// Renders the complete graph to the surface.
pub fn render(
	state: &ForceGraphState,
	surface: &mut impl Surface,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let scale = ScaledValues::new(config, state.transform.k);

	surface.clear(state.width, state.height);

	surface.push_transform(state.transform.x, state.transform.y, state.transform.k);
	draw_edges(state, surface, config, &scale, theme);
	draw_nodes(state, surface, config, &scale, theme);
	surface.pop_transform();

	draw_tooltip(state, surface, config, theme);
}

fn draw_edges(
	state: &ForceGraphState,
	surface: &mut impl Surface,
	config: &ScaleConfig,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let nodes = state.sim.nodes();

	for link in state.sim.links() {
		let (src, tgt) = (&nodes[link.source], &nodes[link.target]);
		let (x1, y1, x2, y2) = (src.x, src.y, tgt.x, tgt.y);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let len = (dx * dx + dy * dy).sqrt();
		// Self-loops and coincident endpoints have no direction to draw.
		if len < 0.001 {
			continue;
		}

		surface.line((x1, y1), (x2, y2), theme.edge.color, scale.edge_line_width);

		let start_r = config.node_radius(src.data.value);
		let end_r = config.node_radius(tgt.data.value);
		if let Some(arrow) = arrow_head(
			(x1, y1),
			(dx / len, dy / len),
			len,
			start_r,
			end_r,
			scale.arrow_length,
			config.edge.arrow_rel_pos,
		) {
			surface.polygon(&arrow, theme.edge.arrow_color);
		}
	}
}

/// Arrowhead triangle placed `rel_pos` of the way along the visible part of a link.
fn arrow_head(
	start: (f64, f64),
	dir: (f64, f64),
	len: f64,
	start_r: f64,
	end_r: f64,
	arrow_len: f64,
	rel_pos: f64,
) -> Option<[(f64, f64); 3]> {
	let visible = len - start_r - end_r - arrow_len;
	if arrow_len <= 0.0 || visible <= 0.0 {
		return None;
	}
	let along = start_r + arrow_len + visible * rel_pos.clamp(0.0, 1.0);
	let (ux, uy) = dir;
	let tip = (start.0 + ux * along, start.1 + uy * along);
	let back = (tip.0 - ux * arrow_len, tip.1 - uy * arrow_len);
	let half_width = arrow_len / ARROW_WH_RATIO / 2.0;
	let (px, py) = (-uy * half_width, ux * half_width);

	Some([
		tip,
		(back.0 + px, back.1 + py),
		(back.0 - px, back.1 - py),
	])
}

fn draw_nodes(
	state: &ForceGraphState,
	surface: &mut impl Surface,
	config: &ScaleConfig,
	scale: &ScaledValues,
	theme: &Theme,
) {
	for node in state.sim.nodes() {
		let radius = config.node_radius(node.data.value);
		surface.circle((node.x, node.y), radius, node.data.color);
		draw_captions(surface, &node.data, (node.x, node.y), radius, scale, theme);
	}
}

/// Label centered beneath the node, then the type name in a smaller italic.
fn draw_captions(
	surface: &mut impl Surface,
	info: &NodeInfo,
	(x, y): (f64, f64),
	radius: f64,
	scale: &ScaledValues,
	theme: &Theme,
) {
	if info.label.is_empty() {
		return;
	}

	let label_y = y + radius + scale.label_size;
	surface.text(
		&info.label,
		(x, label_y),
		&theme.font(scale.label_size),
		theme.text.label_color,
	);

	let type_y = label_y + scale.type_size + scale.caption_gap;
	surface.text(
		info.node_type.as_str(),
		(x, type_y),
		&theme.italic_font(scale.type_size),
		theme.text.type_color,
	);
}

fn draw_tooltip(
	state: &ForceGraphState,
	surface: &mut impl Surface,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let Some(text) = state.tooltip() else {
		return;
	};
	let tip = &config.tooltip;
	let font = theme.font(tip.font_size);
	let width = surface.measure_text(text, &font) + tip.padding * 2.0;
	let height = tip.font_size + tip.padding * 2.0;

	// Keep the box on screen.
	let x = (state.hover.x + tip.offset).min(state.width - width).max(0.0);
	let y = (state.hover.y + tip.offset).min(state.height - height).max(0.0);

	surface.rect(x, y, width, height, theme.tooltip.background);
	surface.text(
		text,
		(x + width / 2.0, y + height / 2.0),
		&font,
		theme.tooltip.color,
	);
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::simulation::ForceConfig;
	use crate::components::force_graph::state::HoverTarget;
	use crate::components::force_graph::types::{GraphEdge, GraphNode, KnowledgeGraph, NodeType};

	#[derive(Debug, PartialEq)]
	enum Op {
		Clear,
		Push(f64),
		Pop,
		Line,
		Polygon(Vec<(f64, f64)>),
		Circle(f64, Color),
		Rect,
		Text(String, (f64, f64), String),
	}

	#[derive(Default)]
	struct Recorder {
		ops: Vec<Op>,
	}

	impl Recorder {
		fn texts(&self) -> Vec<&str> {
			self.ops
				.iter()
				.filter_map(|op| match op {
					Op::Text(t, ..) => Some(t.as_str()),
					_ => None,
				})
				.collect()
		}
	}

	impl Surface for Recorder {
		fn clear(&mut self, _: f64, _: f64) {
			self.ops.push(Op::Clear);
		}
		fn push_transform(&mut self, _: f64, _: f64, k: f64) {
			self.ops.push(Op::Push(k));
		}
		fn pop_transform(&mut self) {
			self.ops.push(Op::Pop);
		}
		fn line(&mut self, _: (f64, f64), _: (f64, f64), _: Color, _: f64) {
			self.ops.push(Op::Line);
		}
		fn polygon(&mut self, points: &[(f64, f64)], _: Color) {
			self.ops.push(Op::Polygon(points.to_vec()));
		}
		fn circle(&mut self, _: (f64, f64), radius: f64, color: Color) {
			self.ops.push(Op::Circle(radius, color));
		}
		fn rect(&mut self, _: f64, _: f64, _: f64, _: f64, _: Color) {
			self.ops.push(Op::Rect);
		}
		fn text(&mut self, text: &str, at: (f64, f64), font: &str, _: Color) {
			self.ops.push(Op::Text(text.into(), at, font.into()));
		}
		fn measure_text(&mut self, text: &str, _: &str) -> f64 {
			text.len() as f64 * 6.0
		}
	}

	fn pair(label: &str) -> ForceGraphState {
		let graph = KnowledgeGraph {
			nodes: vec![
				GraphNode {
					id: "a".into(),
					label: label.into(),
					node_type: NodeType::Product,
					val: None,
				},
				GraphNode {
					id: "b".into(),
					label: "".into(),
					node_type: NodeType::Other("Mystery".into()),
					val: None,
				},
			],
			edges: vec![
				GraphEdge {
					source: "a".into(),
					target: "b".into(),
					label: None,
				},
				GraphEdge {
					source: "b".into(),
					target: "b".into(),
					label: None,
				},
			],
		};
		let (mut state, _) = ForceGraphState::new(&graph, ForceConfig::result(), 800.0, 600.0);
		state.sim.pin("a", 0.0, 0.0);
		state.sim.pin("b", 100.0, 0.0);
		state
	}

	#[test]
	fn draws_in_pass_order() {
		let state = pair("Alpha");
		let mut rec = Recorder::default();
		render(&state, &mut rec, &ScaleConfig::default(), &Theme::default());

		assert_eq!(rec.ops[0], Op::Clear);
		assert_eq!(rec.ops[1], Op::Push(1.0));
		assert_eq!(rec.ops[2], Op::Line);
		assert!(matches!(rec.ops[3], Op::Polygon(_)));
		assert!(matches!(rec.ops[4], Op::Circle(..)));
		assert_eq!(rec.ops.last(), Some(&Op::Pop));
	}

	#[test]
	fn self_loop_draws_nothing() {
		let state = pair("Alpha");
		let mut rec = Recorder::default();
		render(&state, &mut rec, &ScaleConfig::default(), &Theme::default());
		let lines = rec.ops.iter().filter(|op| **op == Op::Line).count();
		assert_eq!(lines, 1);
	}

	#[test]
	fn label_and_type_sit_beneath_the_node() {
		let mut state = pair("Alpha");
		state.transform.k = 2.0;
		let mut rec = Recorder::default();
		render(&state, &mut rec, &ScaleConfig::default(), &Theme::default());

		let texts: Vec<&Op> = rec
			.ops
			.iter()
			.filter(|op| matches!(op, Op::Text(..)))
			.collect();
		assert_eq!(
			texts,
			vec![
				&Op::Text("Alpha".into(), (0.0, 10.0), "6px Comfortaa, sans-serif".into()),
				&Op::Text(
					"Product".into(),
					(0.0, 15.0),
					"italic 4px Comfortaa, sans-serif".into()
				),
			]
		);
	}

	#[test]
	fn empty_label_suppresses_all_text() {
		let state = pair("");
		let mut rec = Recorder::default();
		render(&state, &mut rec, &ScaleConfig::default(), &Theme::default());
		assert!(rec.texts().is_empty());
		let circles = rec
			.ops
			.iter()
			.filter(|op| matches!(op, Op::Circle(..)))
			.count();
		assert_eq!(circles, 2);
	}

	#[test]
	fn unknown_type_uses_fallback_color() {
		let state = pair("");
		let mut rec = Recorder::default();
		render(&state, &mut rec, &ScaleConfig::default(), &Theme::default());
		assert!(rec.ops.contains(&Op::Circle(
			4.0,
			crate::components::force_graph::theme::FALLBACK_NODE_COLOR
		)));
	}

	#[test]
	fn arrow_tip_touches_target_boundary() {
		let [tip, left, right] =
			arrow_head((0.0, 0.0), (1.0, 0.0), 100.0, 4.0, 4.0, 3.5, 1.0).unwrap();
		assert!((tip.0 - 96.0).abs() < 1e-9);
		assert_eq!(tip.1, 0.0);
		assert!((left.0 - 92.5).abs() < 1e-9);
		assert!((left.1 + right.1).abs() < 1e-12);
		assert!(arrow_head((0.0, 0.0), (1.0, 0.0), 9.0, 4.0, 4.0, 3.5, 1.0).is_none());
	}

	#[test]
	fn tooltip_is_screen_space_and_clamped() {
		let mut state = pair("Alpha");
		state.hover.target = HoverTarget::Node(0);
		state.hover.x = 790.0;
		state.hover.y = 10.0;
		let mut rec = Recorder::default();
		render(&state, &mut rec, &ScaleConfig::default(), &Theme::default());

		let pop = rec.ops.iter().position(|op| *op == Op::Pop).unwrap();
		assert_eq!(rec.ops[pop + 1], Op::Rect);
		// 5 chars * 6px + 8px padding = 38px wide, pushed left of the edge.
		assert_eq!(
			rec.ops[pop + 2],
			Op::Text("Alpha".into(), (781.0, 32.0), "12px Comfortaa, sans-serif".into())
		);
	}
}
