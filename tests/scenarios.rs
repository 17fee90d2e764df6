//! End-to-end behavior of the graph view: binding, dragging, replacing and
//! drawing whole graphs through the public API.

// Test target reuses lib deps, silence noisy lint.
#![allow(unused_crate_dependencies)]

use naumu_graph::ambient::generate_ambient_graph;
use naumu_graph::components::force_graph::theme::Color;
use naumu_graph::components::force_graph::{
	ForceConfig, GraphEdge, GraphNode, GraphView, KnowledgeGraph, NodeType, Surface,
};
use naumu_graph::provider::{SubmissionTracker, decode_response};
use naumu_graph::storage;

#[derive(Default)]
struct Counts {
	lines: usize,
	polygons: usize,
	circles: usize,
	texts: usize,
	non_finite: usize,
}

impl Counts {
	fn check(&mut self, points: &[(f64, f64)]) {
		if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
			self.non_finite += 1;
		}
	}
}

impl Surface for Counts {
	fn clear(&mut self, _: f64, _: f64) {}
	fn push_transform(&mut self, _: f64, _: f64, _: f64) {}
	fn pop_transform(&mut self) {}
	fn line(&mut self, from: (f64, f64), to: (f64, f64), _: Color, _: f64) {
		self.lines += 1;
		self.check(&[from, to]);
	}
	fn polygon(&mut self, points: &[(f64, f64)], _: Color) {
		self.polygons += 1;
		self.check(points);
	}
	fn circle(&mut self, center: (f64, f64), _: f64, _: Color) {
		self.circles += 1;
		self.check(&[center]);
	}
	fn rect(&mut self, _: f64, _: f64, _: f64, _: f64, _: Color) {}
	fn text(&mut self, _: &str, _: (f64, f64), _: &str, _: Color) {
		self.texts += 1;
	}
	fn measure_text(&mut self, text: &str, _: &str) -> f64 {
		text.len() as f64 * 6.0
	}
}

fn node(id: &str, label: &str, node_type: NodeType) -> GraphNode {
	GraphNode {
		id: id.into(),
		label: label.into(),
		node_type,
		val: None,
	}
}

fn edge(source: &str, target: &str) -> GraphEdge {
	GraphEdge {
		source: source.into(),
		target: target.into(),
		label: None,
	}
}

fn product_and_need() -> KnowledgeGraph {
	KnowledgeGraph {
		nodes: vec![
			node("a", "A", NodeType::Product),
			node("b", "B", NodeType::Need),
		],
		edges: vec![edge("a", "b")],
	}
}

fn mounted(graph: &KnowledgeGraph) -> GraphView {
	let mut view = GraphView::default();
	view.mount(800.0, 600.0);
	view.replace(graph);
	view
}

fn position(view: &GraphView, id: &str) -> (f64, f64) {
	view.state().unwrap().sim.position(id).unwrap()
}

fn to_screen(view: &GraphView, (x, y): (f64, f64)) -> (f64, f64) {
	let t = &view.state().unwrap().transform;
	(x * t.k + t.x, y * t.k + t.y)
}

#[test]
fn linked_pair_settles_near_rest_distance() {
	let mut view = mounted(&product_and_need());
	for _ in 0..400 {
		view.frame();
	}

	let (a, b) = (position(&view, "a"), position(&view, "b"));
	assert!(a.0.is_finite() && a.1.is_finite() && b.0.is_finite() && b.1.is_finite());
	let rest = ForceConfig::result().link_distance;
	let distance = (a.0 - b.0).hypot(a.1 - b.1);
	assert!(
		(distance - rest).abs() < rest * 0.1,
		"distance {distance} vs rest {rest}"
	);
}

#[test]
fn dangling_edge_is_dropped_without_error() {
	let graph = KnowledgeGraph {
		nodes: vec![node("x", "X", NodeType::Goal)],
		edges: vec![edge("x", "missing")],
	};
	let mut view = GraphView::default();
	view.mount(800.0, 600.0);
	let issues = view.replace(&graph);

	assert_eq!(issues.len(), 1);
	let sim = &view.state().unwrap().sim;
	assert_eq!(sim.nodes().len(), 1);
	assert!(sim.links().is_empty());
	for _ in 0..50 {
		view.frame();
	}
	let (x, y) = position(&view, "x");
	assert!(x.is_finite() && y.is_finite());
}

#[test]
fn dropped_node_stays_where_it_was_released() {
	let mut view = mounted(&product_and_need());
	let (sx, sy) = to_screen(&view, position(&view, "a"));
	assert!(view.pointer_down(sx, sy));
	let (tx, ty) = to_screen(&view, (100.0, 100.0));
	view.pointer_move(tx, ty);
	view.pointer_up();

	let b_before = position(&view, "b");
	for _ in 0..120 {
		view.frame();
		assert_eq!(position(&view, "a"), (100.0, 100.0));
	}
	assert_ne!(position(&view, "b"), b_before);
}

#[test]
fn ambient_graph_draws_shapes_but_no_text() {
	let graph = generate_ambient_graph(42);
	let mut view = mounted(&graph);
	for _ in 0..30 {
		view.frame();
	}

	let mut counts = Counts::default();
	view.render(&mut counts);
	assert_eq!(counts.circles, 40);
	assert_eq!(counts.lines, graph.edges.len());
	assert!(counts.polygons <= counts.lines);
	assert_eq!(counts.texts, 0);
	assert_eq!(counts.non_finite, 0);
}

#[test]
fn replacing_a_settled_graph_reheats() {
	let graph = product_and_need();
	let mut view = mounted(&graph);
	for _ in 0..600 {
		view.frame();
	}
	let sim = &view.state().unwrap().sim;
	assert!(sim.is_settled());
	assert!(sim.kinetic_energy() < 0.1);

	view.replace(&graph);
	assert!(view.state().unwrap().sim.kinetic_energy() > 1.0);
}

#[test]
fn replacing_a_graph_discards_pins() {
	let mut view = mounted(&product_and_need());
	let (sx, sy) = to_screen(&view, position(&view, "a"));
	view.pointer_down(sx, sy);
	view.pointer_up();
	assert!(view.state().unwrap().sim.is_pinned("a"));

	view.replace(&product_and_need());
	assert!(!view.state().unwrap().sim.is_pinned("a"));
	let before = position(&view, "a");
	view.frame();
	assert_ne!(position(&view, "a"), before);
}

#[test]
fn self_loops_and_coincident_nodes_stay_finite() {
	let graph = KnowledgeGraph {
		nodes: vec![
			node("a", "A", NodeType::Product),
			node("b", "B", NodeType::Feature),
		],
		edges: vec![edge("a", "a"), edge("a", "b")],
	};
	let mut view = mounted(&graph);
	{
		let sim = &mut view.state_mut().unwrap().sim;
		sim.pin("a", 5.0, 5.0);
		sim.pin("b", 5.0, 5.0);
		sim.unpin("b");
	}
	for _ in 0..200 {
		view.frame();
	}

	let mut counts = Counts::default();
	view.render(&mut counts);
	assert_eq!(counts.non_finite, 0);
	assert_eq!(counts.lines, 1);
}

#[test]
fn persisted_graph_restores_equivalently() {
	let graph = decode_response(
		r#"{"nodes":[{"id":"p","label":"Planner","type":"Product"},{"id":"g","label":"Ship","type":"Goal","val":2}],
		"edges":[{"source":"p","target":"g","label":"aims for"}]}"#,
	)
	.unwrap();
	let text = storage::encode(&graph).unwrap();
	let restored = storage::decode(&text).unwrap();
	assert_eq!(restored, graph);

	let view = mounted(&restored);
	let sim = &view.state().unwrap().sim;
	assert_eq!(sim.nodes().len(), 2);
	assert_eq!(sim.links()[0].label.as_deref(), Some("aims for"));
}

#[test]
fn stale_provider_result_never_reaches_the_view() {
	let tracker = SubmissionTracker::new();
	let mut view = mounted(&generate_ambient_graph(1));

	let slow = tracker.begin();
	let fast = tracker.begin();
	if let Some(Ok(graph)) = tracker.accept(fast, Ok(product_and_need())) {
		view.replace(&graph);
	}
	if let Some(Ok(graph)) = tracker.accept(slow, Ok(generate_ambient_graph(2))) {
		view.replace(&graph);
	}

	assert_eq!(view.state().unwrap().sim.nodes().len(), 2);
}
