//! Force-directed simulation over node positions keyed by node id.
//!
//! Positions live in an insertion-ordered arena (`IndexMap`) so that links can
//! be resolved to index pairs once per data refresh, while identity survives
//! refreshes through the id key. Each [`Simulation::tick`] runs, in order:
//!
//! 1. force reset
//! 2. centering spring toward the canvas middle
//! 3. pairwise inverse-square repulsion
//! 4. attraction-only link springs
//! 5. damped velocity integration
//! 6. boundary clamp
//! 7. collision relaxation
//!
//! A dragged node is a static obstacle: it pushes and pulls its neighbours but
//! never moves under forces.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::debug;

use super::config::{CanvasConfig, ForceConfig, NodeConfig};
use super::geometry::Point;
use super::types::GraphData;

/// Golden angle in radians. Spreads initial placements and picks a stable
/// axis for coincident nodes.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Floor applied to distances before dividing by them.
const MIN_DISTANCE: f64 = 1.0;

/// Below this two centers count as coincident and have no usable direction.
const COINCIDENT: f64 = 1e-9;

/// Collision pushes overshoot the overlap by this factor, which settles
/// crowded clusters in far fewer passes.
const OVER_RELAXATION: f64 = 1.5;

/// Added to every collision push so rounding cannot leave a pair a hair
/// short of the minimum separation.
const SEPARATION_SLACK: f64 = 1e-6;

/// Simulation state for one node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodePosition {
	/// Center x in world units.
	pub x: f64,
	/// Center y in world units.
	pub y: f64,
	/// Velocity along x.
	pub vx: f64,
	/// Velocity along y.
	pub vy: f64,
	/// Force along x accumulated during the current tick.
	pub fx: f64,
	/// Force along y accumulated during the current tick.
	pub fy: f64,
}

impl NodePosition {
	/// A node at rest at `p`.
	pub fn at(p: Point) -> Self {
		Self {
			x: p.x,
			y: p.y,
			..Self::default()
		}
	}

	/// Center as a point.
	pub fn point(&self) -> Point {
		Point::new(self.x, self.y)
	}

	fn halt(&mut self) {
		self.vx = 0.0;
		self.vy = 0.0;
		self.fx = 0.0;
		self.fy = 0.0;
	}

	fn push(&mut self, force: Point) {
		self.fx += force.x;
		self.fy += force.y;
	}

	fn shift(&mut self, delta: Point) {
		self.x += delta.x;
		self.y += delta.y;
	}
}

/// What changed when a new node set was merged into the arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
	/// Ids seen for the first time.
	pub added: usize,
	/// Ids that disappeared.
	pub removed: usize,
	/// Ids that kept their position.
	pub kept: usize,
	/// Relationships whose endpoints both exist.
	pub links: usize,
}

/// Axis-aligned region a node center may occupy.
#[derive(Clone, Copy, Debug)]
struct Bounds {
	min: Point,
	max: Point,
}

impl Bounds {
	fn clamp(&self, body: &mut NodePosition) {
		let x = body.x.clamp(self.min.x, self.max.x);
		let y = body.y.clamp(self.min.y, self.max.y);
		if x != body.x {
			body.x = x;
			body.vx = 0.0;
		}
		if y != body.y {
			body.y = y;
			body.vy = 0.0;
		}
	}
}

/// Unit vector from `a` to `b` and the raw distance between them.
///
/// Coincident points get a deterministic direction derived from `salt` so the
/// pair still separates.
fn separation(a: Point, b: Point, salt: usize) -> (Point, f64) {
	let delta = b - a;
	let dist = delta.length();
	if dist < COINCIDENT {
		let angle = salt as f64 * GOLDEN_ANGLE;
		(Point::new(angle.cos(), angle.sin()), 0.0)
	} else {
		(delta / dist, dist)
	}
}

/// Owns every node's position and velocity and advances them one tick at a time.
pub struct Simulation {
	forces: ForceConfig,
	canvas: CanvasConfig,
	node: NodeConfig,
	positions: IndexMap<String, NodePosition>,
	links: Vec<(usize, usize)>,
	dragged: Option<String>,
}

impl Simulation {
	/// Empty simulation.
	pub fn new(forces: ForceConfig, canvas: CanvasConfig, node: NodeConfig) -> Self {
		Self {
			forces,
			canvas,
			node,
			positions: IndexMap::new(),
			links: Vec::new(),
			dragged: None,
		}
	}

	/// Force constants.
	pub fn forces(&self) -> &ForceConfig {
		&self.forces
	}

	/// Canvas the nodes are kept inside.
	pub fn canvas(&self) -> &CanvasConfig {
		&self.canvas
	}

	/// Node footprint used for bounds.
	pub fn node(&self) -> &NodeConfig {
		&self.node
	}

	/// Number of nodes.
	pub fn len(&self) -> usize {
		self.positions.len()
	}

	/// True when there are no nodes.
	pub fn is_empty(&self) -> bool {
		self.positions.is_empty()
	}

	/// True if `id` has a position.
	pub fn contains(&self, id: &str) -> bool {
		self.positions.contains_key(id)
	}

	/// Position and velocity of `id`.
	pub fn position(&self, id: &str) -> Option<&NodePosition> {
		self.positions.get(id)
	}

	/// All live positions in arena order.
	pub fn positions(&self) -> impl Iterator<Item = (&str, &NodePosition)> {
		self.positions.iter().map(|(id, p)| (id.as_str(), p))
	}

	/// Resolved links as arena index pairs.
	pub fn links(&self) -> &[(usize, usize)] {
		&self.links
	}

	/// Id of the node currently pinned by a drag.
	pub fn dragged(&self) -> Option<&str> {
		self.dragged.as_deref()
	}

	/// Merges a fresh node/relationship set into the arena.
	///
	/// Known ids keep their position and velocity, new ids are placed on a
	/// golden-angle spiral around the canvas center, and ids that disappeared
	/// are dropped. Relationships with an unknown endpoint, and self-loops, do
	/// not take part in the force model.
	pub fn set_graph(&mut self, data: &GraphData) -> MergeReport {
		let live: HashSet<&str> = data.nodes.iter().map(|n| n.id.as_str()).collect();
		let before = self.positions.len();
		self.positions.retain(|id, _| live.contains(id.as_str()));
		let kept = self.positions.len();

		for (i, node) in data.nodes.iter().enumerate() {
			if !self.positions.contains_key(&node.id) {
				let body = NodePosition::at(self.initial_placement(i));
				self.positions.insert(node.id.clone(), body);
			}
		}

		if let Some(id) = &self.dragged {
			if !self.positions.contains_key(id) {
				debug!("simulation: dragged node {id} removed by refresh");
				self.dragged = None;
			}
		}

		self.links = data
			.relationships
			.iter()
			.filter_map(|rel| {
				let source = self.positions.get_index_of(&rel.source)?;
				let target = self.positions.get_index_of(&rel.target)?;
				(source != target).then_some((source, target))
			})
			.collect();

		MergeReport {
			added: self.positions.len() - kept,
			removed: before - kept,
			kept,
			links: self.links.len(),
		}
	}

	fn initial_placement(&self, index: usize) -> Point {
		let angle = index as f64 * GOLDEN_ANGLE;
		let radius = self.forces.min_separation * (index as f64 + 0.5).sqrt();
		let mut body =
			NodePosition::at(self.canvas.center() + Point::new(angle.cos(), angle.sin()) * radius);
		self.bounds().clamp(&mut body);
		body.point()
	}

	fn bounds(&self) -> Bounds {
		let (half_w, half_h) = (self.node.width / 2.0, self.node.height / 2.0);
		let min = Point::new(half_w, half_h);
		let max = Point::new(
			(self.canvas.width - half_w).max(half_w),
			(self.canvas.height - half_h).max(half_h),
		);
		Bounds { min, max }
	}

	fn pinned_index(&self) -> Option<usize> {
		self.dragged
			.as_deref()
			.and_then(|id| self.positions.get_index_of(id))
	}

	/// Pins `id` at `world`, zeroing its velocity and force. Returns false for
	/// unknown ids.
	pub fn drag_to(&mut self, id: &str, world: Point) -> bool {
		let Some(body) = self.positions.get_mut(id) else {
			return false;
		};
		body.x = world.x;
		body.y = world.y;
		body.halt();
		if self.dragged.as_deref() != Some(id) {
			self.dragged = Some(id.to_string());
		}
		true
	}

	/// Unpins the dragged node; it resumes moving under forces on the next tick.
	pub fn release(&mut self) -> Option<String> {
		self.dragged.take()
	}

	/// Advances the layout by one step.
	pub fn tick(&mut self) {
		if self.positions.is_empty() {
			return;
		}
		let pinned = self.pinned_index();
		let n = self.positions.len();

		for body in self.positions.values_mut() {
			body.fx = 0.0;
			body.fy = 0.0;
		}

		self.apply_centering(pinned);
		self.apply_repulsion(pinned, n);
		self.apply_links(pinned);

		let bounds = self.bounds();
		let damping = self.forces.damping;
		for (i, body) in self.positions.values_mut().enumerate() {
			if Some(i) == pinned {
				body.halt();
				continue;
			}
			body.vx = (body.vx + body.fx) * damping;
			body.vy = (body.vy + body.fy) * damping;
			body.x += body.vx;
			body.y += body.vy;
			bounds.clamp(body);
		}

		self.relax_collisions(pinned, n);
	}

	fn apply_centering(&mut self, pinned: Option<usize>) {
		let center = self.canvas.center();
		let strength = self.forces.centering_strength;
		for (i, body) in self.positions.values_mut().enumerate() {
			if Some(i) != pinned {
				body.push((center - body.point()) * strength);
			}
		}
	}

	fn apply_repulsion(&mut self, pinned: Option<usize>, n: usize) {
		let ForceConfig {
			repulsion,
			max_force,
			repulsion_cutoff,
			..
		} = self.forces;

		for i in 0..n {
			for j in (i + 1)..n {
				let (unit, dist) =
					separation(self.positions[i].point(), self.positions[j].point(), i + j);
				if repulsion_cutoff.is_some_and(|cutoff| dist > cutoff) {
					continue;
				}
				let d = dist.max(MIN_DISTANCE);
				let force = unit * (repulsion / (d * d)).min(max_force);
				if Some(i) != pinned {
					self.positions[i].push(-force);
				}
				if Some(j) != pinned {
					self.positions[j].push(force);
				}
			}
		}
	}

	fn apply_links(&mut self, pinned: Option<usize>) {
		let ForceConfig {
			rest_length,
			link_strength,
			..
		} = self.forces;

		for &(source, target) in &self.links {
			let (unit, dist) = separation(
				self.positions[source].point(),
				self.positions[target].point(),
				source + target,
			);
			if dist <= rest_length {
				continue;
			}
			let force = unit * ((dist - rest_length) * link_strength);
			if Some(source) != pinned {
				self.positions[source].push(force);
			}
			if Some(target) != pinned {
				self.positions[target].push(-force);
			}
		}
	}

	/// Pushes apart every pair closer than the minimum separation, repeating
	/// until no pair overlaps or the pass budget runs out.
	pub fn resolve_collisions(&mut self) {
		let pinned = self.pinned_index();
		let n = self.positions.len();
		self.relax_collisions(pinned, n);
	}

	fn relax_collisions(&mut self, pinned: Option<usize>, n: usize) {
		let min_separation = self.forces.min_separation;
		let bounds = self.bounds();
		let budget = self
			.forces
			.collision_passes
			.max(self.forces.collision_passes_per_node * n);

		for _ in 0..budget {
			let mut moved = false;
			for i in 0..n {
				for j in (i + 1)..n {
					let (unit, dist) =
						separation(self.positions[i].point(), self.positions[j].point(), i + j);
					if dist >= min_separation {
						continue;
					}
					let overlap = (min_separation - dist) * OVER_RELAXATION + SEPARATION_SLACK;
					let (share_i, share_j) = match pinned {
						Some(p) if p == i => (0.0, overlap),
						Some(p) if p == j => (overlap, 0.0),
						_ => (overlap / 2.0, overlap / 2.0),
					};
					if share_i > 0.0 {
						self.positions[i].shift(unit * -share_i);
						bounds.clamp(&mut self.positions[i]);
					}
					if share_j > 0.0 {
						self.positions[j].shift(unit * share_j);
						bounds.clamp(&mut self.positions[j]);
					}
					moved = true;
				}
			}
			if !moved {
				return;
			}
		}
		debug!("simulation: overlaps remain after {budget} collision passes");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{GraphNode, GraphRelationship};

	fn graph(ids: &[&str], links: &[(&str, &str)]) -> GraphData {
		GraphData {
			nodes: ids.iter().map(|id| GraphNode::new(*id, "Thing", "")).collect(),
			relationships: links
				.iter()
				.map(|(s, t)| GraphRelationship::new(*s, *t, "REL"))
				.collect(),
		}
	}

	fn simulation() -> Simulation {
		Simulation::new(
			ForceConfig::default(),
			CanvasConfig::default(),
			NodeConfig::default(),
		)
	}

	fn ids(sim: &Simulation) -> HashSet<String> {
		sim.positions().map(|(id, _)| id.to_string()).collect()
	}

	#[test]
	fn key_set_tracks_latest_node_set() {
		let mut sim = simulation();
		let report = sim.set_graph(&graph(&["a", "b", "c"], &[]));
		assert_eq!(report.added, 3);

		let report = sim.set_graph(&graph(&["b", "c", "d"], &[]));
		assert_eq!(
			report,
			MergeReport {
				added: 1,
				removed: 1,
				kept: 2,
				links: 0
			}
		);
		let expected: HashSet<String> = ["b", "c", "d"].iter().map(|s| s.to_string()).collect();
		assert_eq!(ids(&sim), expected);
	}

	#[test]
	fn refresh_preserves_known_positions() {
		let mut sim = simulation();
		let data = graph(&["a", "b", "c"], &[("a", "b")]);
		sim.set_graph(&data);
		for _ in 0..25 {
			sim.tick();
		}
		let before: Vec<NodePosition> = sim.positions().map(|(_, p)| *p).collect();
		sim.set_graph(&data);
		let after: Vec<NodePosition> = sim.positions().map(|(_, p)| *p).collect();
		assert_eq!(before, after);
	}

	#[test]
	fn unknown_endpoints_and_self_loops_are_not_linked() {
		let mut sim = simulation();
		let report = sim.set_graph(&graph(&["a", "b"], &[("a", "b"), ("a", "ghost"), ("b", "b")]));
		assert_eq!(report.links, 1);
		assert_eq!(sim.links(), &[(0, 1)]);
	}

	#[test]
	fn dragged_node_is_authoritative_and_at_rest() {
		let mut sim = simulation();
		sim.set_graph(&graph(&["a", "b", "c"], &[("a", "b")]));
		let target = Point::new(123.0, 321.0);
		for step in 0..30 {
			let p = target + Point::new(step as f64, 0.0);
			assert!(sim.drag_to("a", p));
			sim.tick();
			let body = sim.position("a").unwrap();
			assert_eq!(body.point(), p);
			assert_eq!((body.vx, body.vy, body.fx, body.fy), (0.0, 0.0, 0.0, 0.0));
		}
		assert_eq!(sim.release().as_deref(), Some("a"));
		assert_eq!(sim.dragged(), None);
	}

	#[test]
	fn dragged_node_still_repels_neighbours() {
		let mut sim = simulation();
		sim.set_graph(&graph(&["a", "b"], &[]));
		let center = sim.canvas().center();
		sim.drag_to("a", center);
		sim.drag_to("b", center + Point::new(85.0, 0.0));
		sim.release();
		sim.drag_to("a", center);
		let start = sim.position("b").unwrap().x;
		sim.tick();
		assert!(sim.position("b").unwrap().x > start);
		assert_eq!(sim.position("a").unwrap().point(), center);
	}

	#[test]
	fn drag_of_unknown_id_is_ignored() {
		let mut sim = simulation();
		sim.set_graph(&graph(&["a"], &[]));
		assert!(!sim.drag_to("zzz", Point::ZERO));
		assert_eq!(sim.dragged(), None);
	}

	#[test]
	fn refresh_removing_dragged_node_clears_drag() {
		let mut sim = simulation();
		sim.set_graph(&graph(&["a", "b"], &[]));
		sim.drag_to("a", Point::new(50.0, 50.0));
		sim.set_graph(&graph(&["b"], &[]));
		assert_eq!(sim.dragged(), None);
	}

	#[test]
	fn coincident_nodes_separate() {
		let mut sim = simulation();
		sim.set_graph(&graph(&["a", "b"], &[]));
		let center = sim.canvas().center();
		sim.drag_to("a", center);
		sim.drag_to("b", center);
		sim.release();
		sim.resolve_collisions();
		let (a, b) = (sim.position("a").unwrap(), sim.position("b").unwrap());
		assert!(a.point().distance(b.point()) >= sim.forces().min_separation - 1e-6);
		assert!(a.x.is_finite() && b.y.is_finite());
	}

	fn closest_pair(sim: &Simulation) -> f64 {
		let points: Vec<Point> = sim.positions().map(|(_, p)| p.point()).collect();
		let mut best = f64::INFINITY;
		for (i, a) in points.iter().enumerate() {
			for b in &points[i + 1..] {
				best = best.min(a.distance(*b));
			}
		}
		best
	}

	#[test]
	fn default_config_keeps_minimum_separation_every_tick() {
		for n in [20, 35, 50] {
			let names: Vec<String> = (0..n).map(|i| format!("n{i}")).collect();
			let refs: Vec<&str> = names.iter().map(String::as_str).collect();
			let tree: Vec<(&str, &str)> = (1..n).map(|i| (refs[(i - 1) / 2], refs[i])).collect();

			for links in [&[][..], &tree[..]] {
				let mut sim = simulation();
				sim.set_graph(&graph(&refs, links));
				let min_separation = sim.forces().min_separation;
				for tick in 0..200 {
					sim.tick();
					let closest = closest_pair(&sim);
					assert!(
						closest >= min_separation - 1e-9,
						"{n} nodes, {} links: pair at {closest} on tick {tick}",
						links.len()
					);
				}
			}
		}
	}

	#[test]
	fn collisions_against_a_wall_still_separate() {
		let mut sim = simulation();
		sim.set_graph(&graph(&["a", "b", "c"], &[]));
		let corner = Point::new(0.0, 0.0);
		for id in ["a", "b", "c"] {
			sim.drag_to(id, corner);
		}
		sim.release();
		sim.resolve_collisions();
		assert!(closest_pair(&sim) >= sim.forces().min_separation - 1e-9);
	}

	#[test]
	fn nodes_stay_inside_the_canvas() {
		let mut sim = simulation();
		let names: Vec<String> = (0..40).map(|i| format!("n{i}")).collect();
		let refs: Vec<&str> = names.iter().map(String::as_str).collect();
		sim.set_graph(&graph(&refs, &[]));
		for _ in 0..200 {
			sim.tick();
		}
		let (w, h) = (sim.node().width / 2.0, sim.node().height / 2.0);
		for (_, body) in sim.positions() {
			assert!(body.x >= w - 1e-9 && body.x <= sim.canvas().width - w + 1e-9);
			assert!(body.y >= h - 1e-9 && body.y <= sim.canvas().height - h + 1e-9);
		}
	}

	#[test]
	fn cutoff_disables_far_repulsion() {
		let forces = ForceConfig {
			repulsion_cutoff: Some(50.0),
			centering_strength: 0.0,
			..ForceConfig::default()
		};
		let mut sim = Simulation::new(forces, CanvasConfig::default(), NodeConfig::default());
		sim.set_graph(&graph(&["a", "b"], &[]));
		sim.drag_to("a", Point::new(200.0, 300.0));
		sim.drag_to("b", Point::new(600.0, 300.0));
		sim.release();
		sim.tick();
		assert_eq!(sim.position("b").unwrap().point(), Point::new(600.0, 300.0));
	}

	#[test]
	fn links_only_attract_beyond_rest_length() {
		let forces = ForceConfig {
			centering_strength: 0.0,
			repulsion: 0.0,
			..ForceConfig::default()
		};
		let rest = forces.rest_length;
		let mut sim = Simulation::new(forces, CanvasConfig::default(), NodeConfig::default());
		sim.set_graph(&graph(&["a", "b"], &[("a", "b")]));

		sim.drag_to("a", Point::new(300.0, 300.0));
		sim.drag_to("b", Point::new(300.0 + rest - 10.0, 300.0));
		sim.release();
		sim.tick();
		assert_eq!(sim.position("b").unwrap().x, 300.0 + rest - 10.0);

		sim.drag_to("b", Point::new(300.0 + rest + 100.0, 300.0));
		sim.release();
		sim.drag_to("a", Point::new(300.0, 300.0));
		sim.tick();
		assert!(sim.position("b").unwrap().x < 300.0 + rest + 100.0);
	}
}
