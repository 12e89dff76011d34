//! Pan and zoom: the mapping between screen space and world space.
//!
//! - **World space** is where the simulation runs.
//! - **Screen space** is the logical canvas the pointer events arrive in.
//!
//! `screen = world * zoom + pan`, and the inverse `world = (screen - pan) / zoom`.

use super::config::ZoomConfig;
use super::geometry::Point;

/// Pan offset and zoom factor applied to the whole graph view.
#[derive(Clone, Debug)]
pub struct Viewport {
	pan: Point,
	zoom: f64,
	bounds: ZoomConfig,
	/// Anchor for zoom changes that have no cursor (toolbar buttons).
	center: Point,
}

impl Viewport {
	/// Identity transform. `center` is the screen point toolbar zooms keep fixed.
	pub fn new(bounds: ZoomConfig, center: Point) -> Self {
		Self {
			pan: Point::ZERO,
			zoom: bounds.clamp(1.0),
			bounds,
			center,
		}
	}

	/// Screen offset of the world origin.
	pub fn pan(&self) -> Point {
		self.pan
	}

	/// Current zoom factor.
	pub fn zoom(&self) -> f64 {
		self.zoom
	}

	/// Zoom bounds and steps.
	pub fn bounds(&self) -> &ZoomConfig {
		&self.bounds
	}

	/// Maps a screen point into world space.
	pub fn world_from_screen(&self, p: Point) -> Point {
		(p - self.pan) / self.zoom
	}

	/// Maps a world point onto the screen.
	pub fn screen_from_world(&self, p: Point) -> Point {
		p * self.zoom + self.pan
	}

	/// Moves the pan by a screen-space delta.
	pub fn pan_by(&mut self, delta: Point) {
		self.pan += delta;
	}

	/// Replaces the pan.
	pub fn set_pan(&mut self, pan: Point) {
		self.pan = pan;
	}

	/// Sets the zoom (clamped) while keeping the world point under `anchor`
	/// fixed on screen. Returns the zoom actually applied.
	pub fn zoom_at(&mut self, zoom: f64, anchor: Point) -> f64 {
		let next = self.bounds.clamp(zoom);
		let ratio = next / self.zoom;
		self.pan = anchor - (anchor - self.pan) * ratio;
		self.zoom = next;
		next
	}

	/// Applies one wheel notch at `anchor`. Positive `delta_y` zooms out.
	pub fn wheel(&mut self, delta_y: f64, anchor: Point) -> f64 {
		let factor = if delta_y > 0.0 {
			1.0 / self.bounds.wheel_factor
		} else {
			self.bounds.wheel_factor
		};
		self.zoom_at(self.zoom * factor, anchor)
	}

	/// Externally driven zoom, anchored at the canvas center.
	pub fn set_zoom(&mut self, zoom: f64) -> f64 {
		self.zoom_at(zoom, self.center)
	}

	/// One toolbar step in.
	pub fn zoom_in(&mut self) -> f64 {
		self.set_zoom(self.zoom + self.bounds.button_step)
	}

	/// One toolbar step out.
	pub fn zoom_out(&mut self) -> f64 {
		self.set_zoom(self.zoom - self.bounds.button_step)
	}

	/// Back to the identity transform.
	pub fn reset(&mut self) {
		self.pan = Point::ZERO;
		self.zoom = self.bounds.clamp(1.0);
	}
}
