//! Force-directed layout engine.
//!
//! A d3-force style simulation. An `alpha` temperature cools toward a target
//! every tick and scales the link, many-body and centering forces, while
//! velocity decay bleeds off motion so the layout comes to rest. Pinned nodes
//! hold their forced position exactly but keep pushing and pulling their
//! neighbours.
//!
//! Nothing here touches the DOM, so the engine runs (and is tested) on any
//! target.

use std::collections::HashMap;
use std::f64::consts::{PI, TAU};

use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use super::types::{GraphIssue, GraphNode, KnowledgeGraph};

/// Radial step of the phyllotaxis seed layout.
const INITIAL_RADIUS: f64 = 10.0;

/// Golden angle used by the phyllotaxis seed layout.
fn initial_angle() -> f64 {
	PI * (3.0 - 5f64.sqrt())
}

/// Physical parameters of the simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct ForceConfig {
	/// Many-body strength. Negative values repel.
	pub charge_strength: f64,
	/// Rest length of every link.
	pub link_distance: f64,
	/// Spring stiffness. `None` uses `1 / min(degree(source), degree(target))`.
	pub link_strength: Option<f64>,
	/// Pull toward the graph origin, per unit of distance.
	pub center_strength: f64,
	/// Fraction of velocity removed each tick (0.0..1.0).
	pub velocity_decay: f64,
	/// Alpha below which the simulation counts as settled.
	pub alpha_min: f64,
	/// Per-tick cooling rate of alpha toward its target.
	pub alpha_decay: f64,
	/// Alpha restored by [`Simulation::reheat`].
	pub reheat_alpha: f64,
	/// Speed handed to every free node by [`Simulation::reheat`].
	pub reheat_velocity: f64,
	/// Alpha target held while a node is being dragged.
	pub drag_alpha_target: f64,
	/// Many-body distances are clamped to at least this much.
	pub distance_min: f64,
	/// Seed for the jiggle and reheat generator.
	pub seed: u64,
}

impl ForceConfig {
	/// Weak, compact layout for the label-free background graph.
	pub fn ambient() -> Self {
		Self::default()
	}

	/// Wider layout for extracted graphs, where labels need room.
	pub fn result() -> Self {
		Self {
			charge_strength: -800.0,
			link_distance: 150.0,
			..Self::default()
		}
	}

	/// Picks [`ForceConfig::result`] for labeled graphs and [`ForceConfig::ambient`] otherwise.
	pub fn for_graph(graph: &KnowledgeGraph) -> Self {
		if graph.has_labels() {
			Self::result()
		} else {
			Self::ambient()
		}
	}
}

impl Default for ForceConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			charge_strength: -300.0,
			link_distance: 70.0,
			link_strength: None,
			center_strength: 0.05,
			velocity_decay: 0.4,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			reheat_alpha: 1.0,
			reheat_velocity: 2.0,
			drag_alpha_target: 0.3,
			distance_min: 1.0,
			seed: 0x6e61_756d_75,
		}
	}
}

/// Optional patches on top of a [`ForceConfig`], read from page configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ForceOverrides {
	/// Replaces [`ForceConfig::charge_strength`].
	pub charge_strength: Option<f64>,
	/// Replaces [`ForceConfig::link_distance`].
	pub link_distance: Option<f64>,
	/// Replaces [`ForceConfig::link_strength`].
	pub link_strength: Option<f64>,
	/// Replaces [`ForceConfig::center_strength`].
	pub center_strength: Option<f64>,
	/// Replaces [`ForceConfig::velocity_decay`].
	pub velocity_decay: Option<f64>,
	/// Replaces [`ForceConfig::seed`].
	pub seed: Option<u64>,
}

impl ForceOverrides {
	/// Returns `config` with every present override applied.
	pub fn apply(&self, mut config: ForceConfig) -> ForceConfig {
		if let Some(v) = self.charge_strength {
			config.charge_strength = v;
		}
		if let Some(v) = self.link_distance {
			config.link_distance = v;
		}
		if self.link_strength.is_some() {
			config.link_strength = self.link_strength;
		}
		if let Some(v) = self.center_strength {
			config.center_strength = v;
		}
		if let Some(v) = self.velocity_decay {
			config.velocity_decay = v.clamp(0.0, 1.0);
		}
		if let Some(v) = self.seed {
			config.seed = v;
		}
		config
	}
}

/// A node as seen by the simulation: position, velocity, optional pin and payload.
#[derive(Clone, Debug)]
pub struct SimNode<N> {
	/// Identity key from the graph.
	pub id: String,
	/// Current x position in graph space.
	pub x: f64,
	/// Current y position in graph space.
	pub y: f64,
	/// Current x velocity.
	pub vx: f64,
	/// Current y velocity.
	pub vy: f64,
	/// Forced x position, if pinned.
	pub fx: Option<f64>,
	/// Forced y position, if pinned.
	pub fy: Option<f64>,
	/// Caller payload (display metadata).
	pub data: N,
}

impl<N> SimNode<N> {
	/// True when both coordinates are forced.
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() && self.fy.is_some()
	}
}

/// A link between two simulation nodes, by index.
#[derive(Clone, Debug)]
pub struct SimLink {
	/// Index of the source node.
	pub source: usize,
	/// Index of the target node.
	pub target: usize,
	/// Optional relation name.
	pub label: Option<String>,
}

impl SimLink {
	/// True for links whose endpoints coincide.
	pub fn is_self_loop(&self) -> bool {
		self.source == self.target
	}
}

/// Live layout state for one bound graph.
pub struct Simulation<N> {
	nodes: Vec<SimNode<N>>,
	links: Vec<SimLink>,
	index: HashMap<String, usize>,
	/// Link count per node, self-loops excluded.
	degree: Vec<usize>,
	config: ForceConfig,
	alpha: f64,
	alpha_target: f64,
	rng: StdRng,
}

/// Builds a simulation from a graph, dropping (and reporting) anything that
/// breaks the graph invariants instead of failing.
pub fn initialize<N>(
	graph: &KnowledgeGraph,
	config: ForceConfig,
	mut payload: impl FnMut(&GraphNode) -> N,
) -> (Simulation<N>, Vec<GraphIssue>) {
	let mut sim = Simulation::new(config);
	let mut issues = Vec::new();

	for node in &graph.nodes {
		if let Err(issue) = sim.add_node(node.id.clone(), payload(node)) {
			warn!("naumu-graph: dropping node: {}", issue);
			issues.push(issue);
		}
	}
	for edge in &graph.edges {
		if let Err(issue) = sim.add_link(&edge.source, &edge.target, edge.label.clone()) {
			warn!("naumu-graph: dropping edge: {}", issue);
			issues.push(issue);
		}
	}

	(sim, issues)
}

fn jiggle(rng: &mut StdRng) -> f64 {
	(rng.r#gen::<f64>() - 0.5) * 1e-6
}

impl<N> Simulation<N> {
	/// Creates an empty, fully heated simulation.
	pub fn new(config: ForceConfig) -> Self {
		Self {
			nodes: Vec::new(),
			links: Vec::new(),
			index: HashMap::new(),
			degree: Vec::new(),
			rng: StdRng::seed_from_u64(config.seed),
			config,
			alpha: 1.0,
			alpha_target: 0.0,
		}
	}

	/// Adds a node at the next slot of the phyllotaxis spiral.
	pub fn add_node(&mut self, id: impl Into<String>, data: N) -> Result<usize, GraphIssue> {
		let id = id.into();
		if self.index.contains_key(&id) {
			return Err(GraphIssue::DuplicateNode(id));
		}

		let idx = self.nodes.len();
		let radius = INITIAL_RADIUS * (0.5 + idx as f64).sqrt();
		let angle = idx as f64 * initial_angle();
		self.index.insert(id.clone(), idx);
		self.degree.push(0);
		self.nodes.push(SimNode {
			id,
			x: radius * angle.cos(),
			y: radius * angle.sin(),
			vx: 0.0,
			vy: 0.0,
			fx: None,
			fy: None,
			data,
		});
		Ok(idx)
	}

	/// Adds a link between two existing nodes.
	pub fn add_link(
		&mut self,
		source: &str,
		target: &str,
		label: Option<String>,
	) -> Result<usize, GraphIssue> {
		let Some(&s) = self.index.get(source) else {
			return Err(GraphIssue::MissingSource {
				from: source.into(),
				to: target.into(),
			});
		};
		let Some(&t) = self.index.get(target) else {
			return Err(GraphIssue::MissingTarget {
				from: source.into(),
				to: target.into(),
			});
		};

		if s != t {
			self.degree[s] += 1;
			self.degree[t] += 1;
		}
		self.links.push(SimLink {
			source: s,
			target: t,
			label,
		});
		Ok(self.links.len() - 1)
	}

	/// Advances the simulation by one tick.
	pub fn step(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		if self.nodes.is_empty() {
			return;
		}

		self.apply_links();
		self.apply_charge();
		self.apply_centering();
		self.integrate();
	}

	/// Spring force toward `link_distance`, split by endpoint degree.
	fn apply_links(&mut self) {
		let alpha = self.alpha;
		for link in &self.links {
			if link.is_self_loop() {
				continue;
			}
			let (s, t) = (link.source, link.target);
			let (ds, dt) = (self.degree[s] as f64, self.degree[t] as f64);
			let strength = self
				.config
				.link_strength
				.unwrap_or_else(|| 1.0 / ds.min(dt));
			let bias = ds / (ds + dt);

			let (src, tgt) = (&self.nodes[s], &self.nodes[t]);
			let mut dx = tgt.x + tgt.vx - src.x - src.vx;
			let mut dy = tgt.y + tgt.vy - src.y - src.vy;
			if dx == 0.0 {
				dx = jiggle(&mut self.rng);
			}
			if dy == 0.0 {
				dy = jiggle(&mut self.rng);
			}
			let l = (dx * dx + dy * dy).sqrt();
			let f = (l - self.config.link_distance) / l * alpha * strength;
			let (fx, fy) = (dx * f, dy * f);

			self.nodes[t].vx -= fx * bias;
			self.nodes[t].vy -= fy * bias;
			self.nodes[s].vx += fx * (1.0 - bias);
			self.nodes[s].vy += fy * (1.0 - bias);
		}
	}

	/// Pairwise inverse-distance repulsion. Pinned nodes still act on others.
	fn apply_charge(&mut self) {
		let strength = self.config.charge_strength * self.alpha;
		let min2 = self.config.distance_min * self.config.distance_min;
		let n = self.nodes.len();

		for i in 0..n {
			for j in (i + 1)..n {
				let mut dx = self.nodes[j].x - self.nodes[i].x;
				let mut dy = self.nodes[j].y - self.nodes[i].y;
				if dx == 0.0 {
					dx = jiggle(&mut self.rng);
				}
				if dy == 0.0 {
					dy = jiggle(&mut self.rng);
				}
				let mut l2 = dx * dx + dy * dy;
				if l2 < min2 {
					l2 = (min2 * l2).sqrt();
				}
				let w = strength / l2;

				self.nodes[i].vx += dx * w;
				self.nodes[i].vy += dy * w;
				self.nodes[j].vx -= dx * w;
				self.nodes[j].vy -= dy * w;
			}
		}
	}

	fn apply_centering(&mut self) {
		let k = self.config.center_strength * self.alpha;
		for node in &mut self.nodes {
			node.vx -= node.x * k;
			node.vy -= node.y * k;
		}
	}

	fn integrate(&mut self) {
		let keep = 1.0 - self.config.velocity_decay;
		for node in &mut self.nodes {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= keep;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= keep;
					node.y += node.vy;
				}
			}

			if !(node.x.is_finite() && node.y.is_finite()) {
				warn!("naumu-graph: node `{}` left finite space, resetting", node.id);
				node.x = node.fx.unwrap_or(0.0);
				node.y = node.fy.unwrap_or(0.0);
				node.vx = 0.0;
				node.vy = 0.0;
			}
		}
	}

	/// Restores alpha and kicks every free node so the layout visibly resettles.
	pub fn reheat(&mut self) {
		self.alpha = self.config.reheat_alpha;
		let speed = self.config.reheat_velocity;
		for node in &mut self.nodes {
			if node.is_pinned() {
				continue;
			}
			let angle = self.rng.r#gen::<f64>() * TAU;
			node.vx = speed * angle.cos();
			node.vy = speed * angle.sin();
		}
	}

	/// Forces a node to `(x, y)`. Returns false for unknown ids.
	pub fn pin(&mut self, id: &str, x: f64, y: f64) -> bool {
		match self.index.get(id) {
			Some(&idx) => {
				self.pin_index(idx, x, y);
				true
			}
			None => false,
		}
	}

	/// Forces the node at `idx` to `(x, y)`.
	pub fn pin_index(&mut self, idx: usize, x: f64, y: f64) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.fx = Some(x);
			node.fy = Some(y);
			node.x = x;
			node.y = y;
			node.vx = 0.0;
			node.vy = 0.0;
		}
	}

	/// Releases a pinned node back to the forces. Returns false for unknown ids.
	pub fn unpin(&mut self, id: &str) -> bool {
		match self.index.get(id) {
			Some(&idx) => {
				let node = &mut self.nodes[idx];
				node.fx = None;
				node.fy = None;
				true
			}
			None => false,
		}
	}

	/// True when the node exists and is pinned.
	pub fn is_pinned(&self, id: &str) -> bool {
		self.node(id).is_some_and(SimNode::is_pinned)
	}

	/// Current position of a node.
	pub fn position(&self, id: &str) -> Option<(f64, f64)> {
		self.node(id).map(|n| (n.x, n.y))
	}

	/// Looks a node up by id.
	pub fn node(&self, id: &str) -> Option<&SimNode<N>> {
		self.index.get(id).map(|&idx| &self.nodes[idx])
	}

	/// All nodes in insertion order.
	pub fn nodes(&self) -> &[SimNode<N>] {
		&self.nodes
	}

	/// All links in insertion order.
	pub fn links(&self) -> &[SimLink] {
		&self.links
	}

	/// Aggregate speed of all nodes.
	pub fn kinetic_energy(&self) -> f64 {
		self.nodes.iter().map(|n| n.vx.hypot(n.vy)).sum()
	}

	/// Current temperature.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// True once alpha has cooled below `alpha_min` and nothing holds it warm.
	pub fn is_settled(&self) -> bool {
		self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min
	}

	/// Sets the temperature alpha cools toward (held above zero while dragging).
	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	/// Active configuration.
	pub fn config(&self) -> &ForceConfig {
		&self.config
	}

	/// Swaps the force configuration and reheats.
	pub fn set_config(&mut self, config: ForceConfig) {
		self.config = config;
		self.reheat();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{GraphEdge, NodeType};

	fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> KnowledgeGraph {
		KnowledgeGraph {
			nodes: nodes
				.iter()
				.map(|id| GraphNode {
					id: (*id).into(),
					label: id.to_uppercase(),
					node_type: NodeType::Product,
					val: None,
				})
				.collect(),
			edges: edges
				.iter()
				.map(|(s, t)| GraphEdge {
					source: (*s).into(),
					target: (*t).into(),
					label: None,
				})
				.collect(),
		}
	}

	fn build(g: &KnowledgeGraph, config: ForceConfig) -> Simulation<()> {
		initialize(g, config, |_| ()).0
	}

	fn distance(sim: &Simulation<()>, a: &str, b: &str) -> f64 {
		let (ax, ay) = sim.position(a).unwrap();
		let (bx, by) = sim.position(b).unwrap();
		(ax - bx).hypot(ay - by)
	}

	fn all_finite(sim: &Simulation<()>) -> bool {
		sim.nodes()
			.iter()
			.all(|n| n.x.is_finite() && n.y.is_finite() && n.vx.is_finite() && n.vy.is_finite())
	}

	#[test]
	fn empty_graph_steps_without_error() {
		let mut sim = build(&KnowledgeGraph::default(), ForceConfig::ambient());
		for _ in 0..10 {
			sim.step();
		}
		sim.reheat();
		assert!(sim.nodes().is_empty());
		assert_eq!(sim.kinetic_energy(), 0.0);
	}

	#[test]
	fn initialize_positions_every_unique_node_and_drops_dangling_edges() {
		let mut g = graph(&["a", "b", "c"], &[("a", "b"), ("c", "nowhere"), ("ghost", "a")]);
		g.nodes.push(g.nodes[0].clone());

		let (sim, issues) = initialize(&g, ForceConfig::result(), |_| ());

		assert_eq!(sim.nodes().len(), 3);
		assert_eq!(sim.links().len(), 1);
		assert_eq!(issues.len(), 3);
		assert!(sim.nodes().iter().all(|n| n.x.is_finite() && n.y.is_finite()));
	}

	#[test]
	fn initial_positions_are_distinct() {
		let sim = build(&graph(&["a", "b", "c", "d"], &[]), ForceConfig::ambient());
		let nodes = sim.nodes();
		for i in 0..nodes.len() {
			for j in (i + 1)..nodes.len() {
				assert!((nodes[i].x - nodes[j].x).hypot(nodes[i].y - nodes[j].y) > 1.0);
			}
		}
	}

	#[test]
	fn same_seed_gives_identical_trajectories() {
		let g = graph(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c"), ("c", "a"), ("d", "d")]);
		let mut first = build(&g, ForceConfig::result());
		let mut second = build(&g, ForceConfig::result());
		first.reheat();
		second.reheat();

		for _ in 0..120 {
			first.step();
			second.step();
		}

		for (a, b) in first.nodes().iter().zip(second.nodes()) {
			assert_eq!(a.x.to_bits(), b.x.to_bits());
			assert_eq!(a.y.to_bits(), b.y.to_bits());
		}
	}

	#[test]
	fn linked_pair_settles_near_rest_distance() {
		for config in [ForceConfig::result(), ForceConfig::ambient()] {
			let rest = config.link_distance;
			let mut sim = build(&graph(&["a", "b"], &[("a", "b")]), config);
			for _ in 0..310 {
				sim.step();
			}
			let d = distance(&sim, "a", "b");
			assert!(
				(d - rest).abs() < rest * 0.1,
				"distance {d} too far from rest {rest}"
			);
			assert!(sim.is_settled());
		}
	}

	#[test]
	fn pinned_node_stays_exactly_put() {
		let mut sim = build(&graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]), ForceConfig::result());
		assert!(sim.pin("a", 12.5, -40.25));

		for _ in 0..200 {
			sim.step();
			assert_eq!(sim.position("a"), Some((12.5, -40.25)));
		}
		assert!(sim.is_pinned("a"));

		sim.reheat();
		sim.step();
		assert_eq!(sim.position("a"), Some((12.5, -40.25)));
	}

	#[test]
	fn unpinned_node_moves_again() {
		let mut sim = build(&graph(&["a", "b"], &[("a", "b")]), ForceConfig::result());
		sim.pin("a", 0.0, 0.0);
		sim.pin("b", 1.0, 0.0);
		sim.step();
		assert!(sim.unpin("b"));
		sim.step();
		assert_ne!(sim.position("b"), Some((1.0, 0.0)));
		assert!(!sim.unpin("missing"));
	}

	#[test]
	fn self_loop_never_goes_non_finite() {
		let mut sim = build(&graph(&["solo"], &[("solo", "solo"), ("solo", "solo")]), ForceConfig::result());
		for _ in 0..1000 {
			sim.step();
		}
		assert!(all_finite(&sim));
	}

	#[test]
	fn coincident_nodes_separate() {
		let mut sim = build(&graph(&["a", "b"], &[("a", "b")]), ForceConfig::ambient());
		sim.pin("a", 5.0, 5.0);
		sim.pin("b", 5.0, 5.0);
		sim.step();
		sim.unpin("a");
		sim.unpin("b");
		for _ in 0..50 {
			sim.step();
			assert!(all_finite(&sim));
		}
		assert!(distance(&sim, "a", "b") > 1.0);
	}

	#[test]
	fn reheat_injects_energy_after_rest() {
		let mut sim = build(&graph(&["a", "b", "c"], &[("a", "b")]), ForceConfig::ambient());
		for _ in 0..2000 {
			sim.step();
		}
		assert!(sim.kinetic_energy() < 1e-3);
		assert!(sim.is_settled());

		sim.reheat();

		assert!(sim.kinetic_energy() > 1.0);
		assert_eq!(sim.alpha(), 1.0);
		assert!(!sim.is_settled());
	}

	#[test]
	fn alpha_target_keeps_simulation_warm() {
		let mut sim = build(&graph(&["a", "b"], &[("a", "b")]), ForceConfig::ambient());
		sim.set_alpha_target(0.3);
		for _ in 0..1000 {
			sim.step();
		}
		assert!((sim.alpha() - 0.3).abs() < 1e-3);
		sim.set_alpha_target(0.0);
		for _ in 0..1000 {
			sim.step();
		}
		assert!(sim.is_settled());
	}

	#[test]
	fn set_config_reheats() {
		let mut sim = build(&graph(&["a", "b"], &[("a", "b")]), ForceConfig::ambient());
		for _ in 0..400 {
			sim.step();
		}
		sim.set_config(ForceConfig::result());
		assert_eq!(sim.config().link_distance, 150.0);
		assert!(!sim.is_settled());
	}

	#[test]
	fn config_follows_graph_labels() {
		let mut g = graph(&["a"], &[]);
		assert_eq!(ForceConfig::for_graph(&g), ForceConfig::result());
		g.nodes[0].label.clear();
		assert_eq!(ForceConfig::for_graph(&g), ForceConfig::ambient());
	}

	#[test]
	fn overrides_patch_only_present_fields() {
		let overrides: ForceOverrides =
			serde_json::from_str(r#"{"link_distance": 90, "velocity_decay": 3.0}"#).unwrap();
		let config = overrides.apply(ForceConfig::result());
		assert_eq!(config.link_distance, 90.0);
		assert_eq!(config.velocity_decay, 1.0);
		assert_eq!(config.charge_strength, -800.0);
	}
}
