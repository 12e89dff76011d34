//! Pointer interaction: panning the background, dragging nodes, hover tracking.

use std::collections::HashSet;

use log::debug;

use super::geometry::Point;
use super::simulation::Simulation;
use super::types::GraphRelationship;
use super::viewport::Viewport;

/// What a pointer-down landed on, as reported by the rendering surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PointerTarget {
	/// A node, by id.
	Node(String),
	/// Empty canvas.
	Background,
}

/// Coarse interaction mode, for hosts that want to pick a cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionMode {
	/// No gesture.
	Idle,
	/// Dragging the background moves the pan.
	Panning,
	/// Dragging a node pins it under the pointer.
	Dragging,
}

/// Result of a wheel event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelOutcome {
	/// Zoom after the event.
	pub zoom: f64,
	/// Always true: the page must not scroll while the graph handles the wheel.
	pub prevent_default: bool,
}

#[derive(Clone, Debug)]
enum Gesture {
	Idle,
	Panning { origin: Point, pan_start: Point },
	Dragging { id: String },
}

/// Tracks the current gesture and the hovered node.
#[derive(Clone, Debug)]
pub struct Interaction {
	gesture: Gesture,
	hovered: Option<String>,
}

impl Default for Interaction {
	fn default() -> Self {
		Self {
			gesture: Gesture::Idle,
			hovered: None,
		}
	}
}

impl Interaction {
	/// Current gesture, without its payload.
	pub fn mode(&self) -> InteractionMode {
		match self.gesture {
			Gesture::Idle => InteractionMode::Idle,
			Gesture::Panning { .. } => InteractionMode::Panning,
			Gesture::Dragging { .. } => InteractionMode::Dragging,
		}
	}

	/// Id of the node being dragged.
	pub fn dragged(&self) -> Option<&str> {
		match &self.gesture {
			Gesture::Dragging { id } => Some(id),
			_ => None,
		}
	}

	/// Id of the hovered node.
	pub fn hovered(&self) -> Option<&str> {
		self.hovered.as_deref()
	}

	/// Starts a drag when the pointer lands on a live node, otherwise a pan.
	///
	/// The node is pinned where it currently is; it follows the pointer from
	/// the first move onwards.
	pub fn pointer_down(
		&mut self,
		screen: Point,
		target: PointerTarget,
		viewport: &Viewport,
		sim: &mut Simulation,
	) {
		self.finish(sim);
		match target {
			PointerTarget::Node(id) if sim.contains(&id) => {
				if let Some(current) = sim.position(&id).map(|p| p.point()) {
					sim.drag_to(&id, current);
				}
				debug!("interaction: drag start {id}");
				self.gesture = Gesture::Dragging { id };
			}
			_ => {
				self.gesture = Gesture::Panning {
					origin: screen,
					pan_start: viewport.pan(),
				};
			}
		}
	}

	/// Moves the pan or the dragged node. Returns true when a gesture consumed
	/// the move.
	pub fn pointer_move(
		&mut self,
		screen: Point,
		viewport: &mut Viewport,
		sim: &mut Simulation,
	) -> bool {
		match &self.gesture {
			Gesture::Idle => false,
			Gesture::Panning { origin, pan_start } => {
				viewport.set_pan(*pan_start + (screen - *origin));
				true
			}
			Gesture::Dragging { id } => {
				let world = viewport.world_from_screen(screen);
				if !sim.drag_to(id, world) {
					// Node vanished in a refresh mid-drag.
					self.gesture = Gesture::Idle;
					return false;
				}
				true
			}
		}
	}

	/// Ends the gesture, releasing any dragged node.
	pub fn pointer_up(&mut self, sim: &mut Simulation) {
		self.finish(sim);
	}

	/// Pointer left the surface: end any gesture and drop the hover.
	pub fn pointer_leave(&mut self, sim: &mut Simulation) {
		self.finish(sim);
		self.hovered = None;
	}

	fn finish(&mut self, sim: &mut Simulation) {
		if let Gesture::Dragging { id } = &self.gesture {
			debug!("interaction: drag end {id}");
			sim.release();
		}
		self.gesture = Gesture::Idle;
	}

	/// Marks `id` as hovered.
	pub fn hover_enter(&mut self, id: &str) {
		if self.hovered.as_deref() != Some(id) {
			self.hovered = Some(id.to_string());
		}
	}

	/// Clears the hover.
	pub fn hover_leave(&mut self) {
		self.hovered = None;
	}

	/// Zooms toward the cursor.
	pub fn wheel(&self, delta_y: f64, anchor: Point, viewport: &mut Viewport) -> WheelOutcome {
		WheelOutcome {
			zoom: viewport.wheel(delta_y, anchor),
			prevent_default: true,
		}
	}

	/// Drops hover or drag state that refers to ids no longer in the simulation.
	pub fn retain_live(&mut self, sim: &Simulation) {
		if self.hovered.as_deref().is_some_and(|id| !sim.contains(id)) {
			self.hovered = None;
		}
		if self.dragged().is_some_and(|id| !sim.contains(id)) {
			self.gesture = Gesture::Idle;
		}
	}

	/// The hovered node plus its direct neighbours. Empty when nothing is hovered.
	pub fn connected_set<'a>(&'a self, relationships: &'a [GraphRelationship]) -> HashSet<&'a str> {
		match self.hovered.as_deref() {
			Some(id) => connected_set(id, relationships),
			None => HashSet::new(),
		}
	}
}

/// `id` together with every id it shares a relationship with, in either direction.
pub fn connected_set<'a>(id: &'a str, relationships: &'a [GraphRelationship]) -> HashSet<&'a str> {
	let mut set = HashSet::from([id]);
	for rel in relationships {
		if rel.source == id {
			set.insert(rel.target.as_str());
		} else if rel.target == id {
			set.insert(rel.source.as_str());
		}
	}
	set
}
