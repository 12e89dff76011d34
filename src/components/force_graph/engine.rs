//! The layout engine: single owner of simulation, viewport and interaction state.
//!
//! Hosts feed it data refreshes, pointer events and frame callbacks, and read
//! back a screen-space [`Frame`] to draw. Because every mutation goes through
//! this type, the simulation tick and the drag handler never write the
//! position map concurrently.

use std::collections::HashSet;

use log::info;

use super::config::LayoutConfig;
use super::geometry::{Point, clip_segment, midpoint};
use super::interaction::{Interaction, InteractionMode, PointerTarget, WheelOutcome};
use super::palette::{Color, NodePalette, TypeColors};
use super::scheduler::{FrameScheduler, TickLoop};
use super::simulation::{MergeReport, Simulation};
use super::types::GraphData;
use super::viewport::Viewport;

/// How an element relates to the current hover.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
	/// Nothing is hovered.
	Normal,
	/// Part of the hovered node's connected set.
	Highlighted,
	/// Something else is hovered.
	Dimmed,
}

/// Axis-aligned rectangle in screen space (top-left corner plus size).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenRect {
	/// Left edge.
	pub x: f64,
	/// Top edge.
	pub y: f64,
	/// Width in screen pixels.
	pub width: f64,
	/// Height in screen pixels.
	pub height: f64,
}

impl ScreenRect {
	/// True if `p` lies inside or on the border.
	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
	}
}

/// A node ready to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeView<'a> {
	/// Node id, also the label drawn inside the rectangle.
	pub id: &'a str,
	/// Node type; decides the color.
	pub kind: &'a str,
	/// Free-form description.
	pub detail: &'a str,
	/// Center in screen space.
	pub center: Point,
	/// Screen-space rectangle.
	pub rect: ScreenRect,
	/// Fill color for the node type.
	pub color: Color,
	/// Hover emphasis.
	pub emphasis: Emphasis,
}

/// A relationship ready to draw, trimmed to the node borders.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeView<'a> {
	/// Source node id.
	pub source: &'a str,
	/// Target node id.
	pub target: &'a str,
	/// Relationship type, drawn as the label.
	pub label: &'a str,
	/// Point on the source border.
	pub start: Point,
	/// Point on the target border, where the arrowhead goes.
	pub end: Point,
	/// Midpoint between the two centers.
	pub label_anchor: Point,
	/// Hover emphasis.
	pub emphasis: Emphasis,
}

/// Everything the rendering surface needs for one frame, in screen space.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame<'a> {
	/// Current zoom, for scaling line widths and fonts.
	pub zoom: f64,
	/// Pointer gesture in progress.
	pub mode: InteractionMode,
	/// Nodes in data order, duplicates removed.
	pub nodes: Vec<NodeView<'a>>,
	/// Relationships whose endpoints both exist.
	pub edges: Vec<EdgeView<'a>>,
}

impl<'a> Frame<'a> {
	/// Nodes in painting order: data order, with highlighted nodes last so
	/// they sit on top.
	pub fn draw_order(&self) -> impl Iterator<Item = &NodeView<'a>> {
		let (highlighted, rest): (Vec<_>, Vec<_>) = self
			.nodes
			.iter()
			.partition(|n| n.emphasis == Emphasis::Highlighted);
		rest.into_iter().chain(highlighted)
	}

	/// The node painted topmost at a screen point.
	pub fn node_at(&self, screen: Point) -> Option<&'a str> {
		self.draw_order()
			.filter(|n| n.rect.contains(screen))
			.last()
			.map(|n| n.id)
	}
}

/// Interactive force-directed layout over the most recently supplied graph.
pub struct LayoutEngine<S: FrameScheduler> {
	config: LayoutConfig,
	data: GraphData,
	simulation: Simulation,
	viewport: Viewport,
	interaction: Interaction,
	colors: TypeColors,
	ticker: TickLoop<S>,
	ticks: u64,
}

impl<S: FrameScheduler> LayoutEngine<S> {
	/// Creates an idle engine. Nothing is scheduled until data arrives.
	pub fn new(config: LayoutConfig, scheduler: S) -> Self {
		let simulation = Simulation::new(
			config.forces.clone(),
			config.canvas.clone(),
			config.node.clone(),
		);
		let viewport = Viewport::new(config.zoom.clone(), config.canvas.center());
		let colors = TypeColors::new(NodePalette::from(config.palette));
		Self {
			config,
			data: GraphData::default(),
			simulation,
			viewport,
			interaction: Interaction::default(),
			colors,
			ticker: TickLoop::new(scheduler),
			ticks: 0,
		}
	}

	/// Configuration the engine was built with.
	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	/// The graph most recently passed to [`set_data`](Self::set_data).
	pub fn data(&self) -> &GraphData {
		&self.data
	}

	/// Node positions and velocities.
	pub fn simulation(&self) -> &Simulation {
		&self.simulation
	}

	/// Pan and zoom.
	pub fn viewport(&self) -> &Viewport {
		&self.viewport
	}

	/// Pointer and hover state.
	pub fn interaction(&self) -> &Interaction {
		&self.interaction
	}

	/// Type colors for the current graph.
	pub fn colors(&self) -> &TypeColors {
		&self.colors
	}

	/// The frame scheduler.
	pub fn scheduler(&self) -> &S {
		self.ticker.scheduler()
	}

	/// Ticks run since creation.
	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	/// True while a frame is scheduled.
	pub fn is_running(&self) -> bool {
		self.ticker.is_running()
	}

	/// Replaces the graph. Positions of ids seen before are kept; the frame
	/// loop starts or stops depending on whether any nodes remain.
	pub fn set_data(&mut self, data: GraphData) -> MergeReport {
		let report = self.simulation.set_graph(&data);
		self.colors.assign(&data.nodes);
		self.interaction.retain_live(&self.simulation);
		info!(
			"layout: {} nodes (+{} -{}), {} of {} relationships linked",
			self.simulation.len(),
			report.added,
			report.removed,
			report.links,
			data.relationships.len()
		);
		self.data = data;
		self.ticker.sync(!self.simulation.is_empty());
		report
	}

	/// Frame callback. Runs one tick and schedules the next frame. Returns
	/// false, without ticking, for a frame that was cancelled.
	pub fn on_frame(&mut self) -> bool {
		if !self.ticker.fire() {
			return false;
		}
		self.tick();
		self.ticker.sync(!self.simulation.is_empty());
		true
	}

	/// Advances the simulation once, independent of the frame loop.
	pub fn tick(&mut self) {
		self.simulation.tick();
		self.ticks += 1;
	}

	/// Stops the frame loop. Dropping the engine does the same.
	pub fn shutdown(&mut self) {
		self.ticker.cancel();
	}

	/// Topmost node, as painted, whose rectangle contains the screen point.
	pub fn node_at(&self, screen: Point) -> Option<&str> {
		self.frame().node_at(screen)
	}

	/// Starts a drag on a node or a pan on the background.
	pub fn pointer_down(&mut self, screen: Point, target: PointerTarget) {
		self.interaction
			.pointer_down(screen, target, &self.viewport, &mut self.simulation);
	}

	/// Continues the current gesture. Returns true if something moved.
	pub fn pointer_move(&mut self, screen: Point) -> bool {
		self.interaction
			.pointer_move(screen, &mut self.viewport, &mut self.simulation)
	}

	/// Ends the current gesture.
	pub fn pointer_up(&mut self) {
		self.interaction.pointer_up(&mut self.simulation);
	}

	/// Ends the current gesture and clears the hover.
	pub fn pointer_leave(&mut self) {
		self.interaction.pointer_leave(&mut self.simulation);
	}

	/// Hovering an id that is not in the graph is ignored.
	pub fn hover_enter(&mut self, id: &str) {
		if self.simulation.contains(id) {
			self.interaction.hover_enter(id);
		}
	}

	/// Clears the hover.
	pub fn hover_leave(&mut self) {
		self.interaction.hover_leave();
	}

	/// Zooms toward `anchor` by one wheel notch.
	pub fn wheel(&mut self, delta_y: f64, anchor: Point) -> WheelOutcome {
		self.interaction.wheel(delta_y, anchor, &mut self.viewport)
	}

	/// Zoom driven from outside the canvas, e.g. a toolbar. Returns the
	/// clamped zoom.
	pub fn set_zoom(&mut self, zoom: f64) -> f64 {
		self.viewport.set_zoom(zoom)
	}

	/// Toolbar zoom in, anchored at the canvas center.
	pub fn zoom_in(&mut self) -> f64 {
		self.viewport.zoom_in()
	}

	/// Toolbar zoom out, anchored at the canvas center.
	pub fn zoom_out(&mut self) -> f64 {
		self.viewport.zoom_out()
	}

	/// Back to zoom 1 with no pan.
	pub fn reset_view(&mut self) {
		self.viewport.reset();
	}

	/// Screen-space snapshot of the current layout.
	pub fn frame(&self) -> Frame<'_> {
		let connected = self.interaction.connected_set(&self.data.relationships);
		let hovering = self.interaction.hovered().is_some();
		let emphasis = |highlighted: bool| match (hovering, highlighted) {
			(false, _) => Emphasis::Normal,
			(true, true) => Emphasis::Highlighted,
			(true, false) => Emphasis::Dimmed,
		};

		let zoom = self.viewport.zoom();
		let (width, height) = (self.config.node.width, self.config.node.height);

		let mut seen = HashSet::new();
		let nodes = self
			.data
			.nodes
			.iter()
			.filter(|node| seen.insert(node.id.as_str()))
			.filter_map(|node| {
				let world = self.simulation.position(&node.id)?.point();
				let center = self.viewport.screen_from_world(world);
				Some(NodeView {
					id: &node.id,
					kind: &node.kind,
					detail: &node.detail,
					center,
					rect: ScreenRect {
						x: center.x - width * zoom / 2.0,
						y: center.y - height * zoom / 2.0,
						width: width * zoom,
						height: height * zoom,
					},
					color: self.colors.color_of(&node.kind),
					emphasis: emphasis(connected.contains(node.id.as_str())),
				})
			})
			.collect();

		let edges = self
			.data
			.relationships
			.iter()
			.filter_map(|rel| {
				let a = self.simulation.position(&rel.source)?.point();
				let b = self.simulation.position(&rel.target)?.point();
				let (start, end) = clip_segment(a, b, width, height);
				let both = connected.contains(rel.source.as_str())
					&& connected.contains(rel.target.as_str());
				Some(EdgeView {
					source: &rel.source,
					target: &rel.target,
					label: &rel.label,
					start: self.viewport.screen_from_world(start),
					end: self.viewport.screen_from_world(end),
					label_anchor: self.viewport.screen_from_world(midpoint(a, b)),
					emphasis: emphasis(both),
				})
			})
			.collect();

		Frame {
			zoom,
			mode: self.interaction.mode(),
			nodes,
			edges,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::config::PaletteName;
	use crate::components::force_graph::scheduler::ManualScheduler;
	use crate::components::force_graph::types::{GraphNode, GraphRelationship};

	fn data() -> GraphData {
		GraphData {
			nodes: vec![
				GraphNode::new("A", "Person", "first"),
				GraphNode::new("B", "Place", "second"),
				GraphNode::new("C", "Person", "third"),
			],
			relationships: vec![
				GraphRelationship::new("A", "B", "VISITED"),
				GraphRelationship::new("A", "nobody", "KNOWS"),
			],
		}
	}

	fn engine() -> LayoutEngine<ManualScheduler> {
		LayoutEngine::new(LayoutConfig::default(), ManualScheduler::default())
	}

	#[test]
	fn loop_runs_only_while_nodes_exist() {
		let mut engine = engine();
		assert!(!engine.is_running());
		assert!(!engine.on_frame());

		engine.set_data(data());
		assert!(engine.is_running());
		for _ in 0..5 {
			assert!(engine.on_frame());
		}
		assert_eq!(engine.ticks(), 5);
		assert!(engine.is_running());

		engine.set_data(GraphData::default());
		assert!(!engine.is_running());
		assert_eq!(engine.scheduler().cancelled(), 1);
		assert!(!engine.on_frame());
		assert_eq!(engine.ticks(), 5);
	}

	#[test]
	fn configured_palette_colors_nodes() {
		let config = LayoutConfig {
			palette: PaletteName::Slate,
			..LayoutConfig::default()
		};
		let mut engine = LayoutEngine::new(config, ManualScheduler::default());
		engine.set_data(data());
		let slate = NodePalette::from(PaletteName::Slate);
		let frame = engine.frame();
		assert_eq!(frame.nodes[0].color, slate.get(0));
		assert_eq!(frame.nodes[1].color, slate.get(1));
	}

	#[test]
	fn shutdown_cancels_pending_frame() {
		let mut engine = engine();
		engine.set_data(data());
		engine.shutdown();
		assert!(!engine.is_running());
		assert_eq!(engine.scheduler().pending(), None);
	}

	#[test]
	fn frame_drops_dangling_relationships() {
		let mut engine = engine();
		engine.set_data(data());
		let frame = engine.frame();
		assert_eq!(frame.nodes.len(), 3);
		assert_eq!(frame.edges.len(), 1);
		assert_eq!(frame.edges[0].label, "VISITED");
		assert!(frame.nodes.iter().all(|n| n.emphasis == Emphasis::Normal));
		assert_eq!(frame.nodes[0].color, frame.nodes[2].color);
		assert_ne!(frame.nodes[0].color, frame.nodes[1].color);
	}

	#[test]
	fn hover_dims_unrelated_elements() {
		let mut engine = engine();
		engine.set_data(data());
		engine.hover_enter("B");
		let frame = engine.frame();
		let emphasis = |id: &str| frame.nodes.iter().find(|n| n.id == id).unwrap().emphasis;
		assert_eq!(emphasis("A"), Emphasis::Highlighted);
		assert_eq!(emphasis("B"), Emphasis::Highlighted);
		assert_eq!(emphasis("C"), Emphasis::Dimmed);
		assert_eq!(frame.edges[0].emphasis, Emphasis::Highlighted);

		engine.hover_enter("not-a-node");
		assert_eq!(engine.interaction().hovered(), Some("B"));
		engine.hover_leave();
		assert!(engine.frame().nodes.iter().all(|n| n.emphasis == Emphasis::Normal));
	}

	#[test]
	fn frame_is_in_screen_space() {
		let mut engine = engine();
		engine.set_data(data());
		engine.wheel(-1.0, Point::new(0.0, 0.0));
		let zoom = engine.viewport().zoom();
		let frame = engine.frame();
		let world = engine.simulation().position("A").unwrap().point();
		let node = &frame.nodes[0];
		assert_eq!(node.center, world * zoom);
		assert!((node.rect.width - engine.config().node.width * zoom).abs() < 1e-9);
		assert!(node.rect.contains(node.center));
	}

	#[test]
	fn hit_test_respects_viewport() {
		let mut engine = engine();
		engine.set_data(data());
		engine.set_zoom(2.0);
		let world = engine.simulation().position("C").unwrap().point();
		let screen = engine.viewport().screen_from_world(world);
		assert_eq!(engine.node_at(screen), Some("C"));
		assert_eq!(engine.node_at(Point::new(-5000.0, -5000.0)), None);
	}

	#[test]
	fn hit_test_picks_the_node_painted_on_top() {
		let mut engine = engine();
		engine.set_data(GraphData {
			nodes: vec![GraphNode::new("A", "Person", "")],
			relationships: vec![],
		});
		// Refresh puts the new id after A in the arena but before it in paint order.
		engine.set_data(GraphData {
			nodes: vec![
				GraphNode::new("B", "Place", ""),
				GraphNode::new("A", "Person", ""),
			],
			relationships: vec![],
		});

		let screen = |engine: &LayoutEngine<ManualScheduler>, id: &str| {
			let world = engine.simulation().position(id).unwrap().point();
			engine.viewport().screen_from_world(world)
		};
		let (a, b) = (screen(&engine, "A"), screen(&engine, "B"));
		engine.pointer_down(a, PointerTarget::Node("A".to_string()));
		engine.pointer_move(b);
		engine.pointer_up();

		assert_eq!(engine.node_at(b), Some("A"));
		let frame = engine.frame();
		assert_eq!(frame.draw_order().last().map(|n| n.id), Some("A"));

		engine.hover_enter("B");
		assert_eq!(engine.node_at(b), Some("B"));
		assert_eq!(engine.frame().draw_order().last().map(|n| n.id), Some("B"));
	}

	#[test]
	fn drag_through_engine_follows_pointer() {
		let mut engine = engine();
		engine.set_data(data());
		let start = engine
			.viewport()
			.screen_from_world(engine.simulation().position("A").unwrap().point());
		let target = engine.node_at(start).map(|id| PointerTarget::Node(id.to_string()));
		engine.pointer_down(start, target.unwrap_or(PointerTarget::Background));
		assert_eq!(engine.frame().mode, InteractionMode::Dragging);

		let pointer = Point::new(250.0, 260.0);
		engine.pointer_move(pointer);
		for _ in 0..10 {
			engine.on_frame();
			assert_eq!(
				engine.simulation().position("A").unwrap().point(),
				engine.viewport().world_from_screen(pointer)
			);
		}
		engine.pointer_up();
		assert_eq!(engine.simulation().dragged(), None);
	}
}
