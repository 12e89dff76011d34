//! Tunable layout parameters.
//!
//! All values live in world units unless noted otherwise. Every section
//! deserializes with defaults, so a host page may override only the fields it
//! cares about:
//!
//! ```json
//! { "forces": { "repulsion": 30000.0 }, "zoom": { "max": 8.0 } }
//! ```

use serde::Deserialize;

use super::geometry::Point;

/// Fixed logical canvas. Independent of the pixel size of the container.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
	/// Logical width.
	pub width: f64,
	/// Logical height.
	pub height: f64,
}

impl CanvasConfig {
	/// Middle of the canvas, the centering target.
	pub fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}
}

impl Default for CanvasConfig {
	fn default() -> Self {
		Self {
			width: 800.0,
			height: 600.0,
		}
	}
}

/// Rectangular footprint shared by every node.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
	/// Width in world units.
	pub width: f64,
	/// Height in world units.
	pub height: f64,
}

impl Default for NodeConfig {
	fn default() -> Self {
		Self {
			width: 72.0,
			height: 28.0,
		}
	}
}

/// Force model constants.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
	/// Spring constant pulling every free node toward the canvas center.
	pub centering_strength: f64,
	/// Numerator of the inverse-square repulsion.
	pub repulsion: f64,
	/// Upper bound on a single pairwise repulsion magnitude.
	pub max_force: f64,
	/// Pairs farther apart than this skip repulsion. `None` repels unconditionally.
	pub repulsion_cutoff: Option<f64>,
	/// Distance at which a link stops pulling.
	pub rest_length: f64,
	/// Pull per unit of excess link length.
	pub link_strength: f64,
	/// Velocity decay per tick, in (0, 1).
	pub damping: f64,
	/// Minimum distance between node centers after collision resolution.
	pub min_separation: f64,
	/// Relaxation passes per tick always allowed, whatever the node count.
	pub collision_passes: usize,
	/// Additional pass budget per node. Relaxation stops as soon as no pair
	/// overlaps; the budget only matters when the canvas cannot fit the graph.
	pub collision_passes_per_node: usize,
}

impl Default for ForceConfig {
	fn default() -> Self {
		Self {
			centering_strength: 0.01,
			repulsion: 8000.0,
			max_force: 20.0,
			repulsion_cutoff: None,
			rest_length: 120.0,
			link_strength: 0.05,
			damping: 0.85,
			min_separation: 80.0,
			collision_passes: 64,
			collision_passes_per_node: 32,
		}
	}
}

/// Zoom bounds and step sizes.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
	/// Smallest zoom factor.
	pub min: f64,
	/// Largest zoom factor.
	pub max: f64,
	/// Multiplicative factor per wheel notch.
	pub wheel_factor: f64,
	/// Additive step for toolbar zoom in/out buttons.
	pub button_step: f64,
}

impl ZoomConfig {
	/// Clamps `zoom` into `[min, max]`.
	pub fn clamp(&self, zoom: f64) -> f64 {
		zoom.clamp(self.min, self.max)
	}
}

impl Default for ZoomConfig {
	fn default() -> Self {
		Self {
			min: 0.2,
			max: 5.0,
			wheel_factor: 1.1,
			button_step: 0.1,
		}
	}
}

/// Built-in node palettes, selected by name in JSON (`"category10"`, `"slate"`).
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaletteName {
	/// Ten saturated, well-separated hues.
	#[default]
	Category10,
	/// Muted blues and teals for dense graphs.
	Slate,
}

/// Complete layout configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Logical canvas size.
	pub canvas: CanvasConfig,
	/// Node footprint.
	pub node: NodeConfig,
	/// Force model constants.
	pub forces: ForceConfig,
	/// Zoom bounds and steps.
	pub zoom: ZoomConfig,
	/// Palette for node types.
	pub palette: PaletteName,
}

impl LayoutConfig {
	/// Parses a (possibly partial) configuration from JSON.
	pub fn from_json(json: &str) -> Result<Self, crate::error::LoadError> {
		Ok(serde_json::from_str(json)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let config =
			LayoutConfig::from_json(r#"{"forces": {"repulsion": 1.5}, "zoom": {"max": 8.0}}"#)
				.unwrap();
		assert_eq!(config.forces.repulsion, 1.5);
		assert_eq!(config.forces.damping, ForceConfig::default().damping);
		assert_eq!(config.zoom.max, 8.0);
		assert_eq!(config.zoom.min, 0.2);
		assert_eq!(config.canvas.center(), Point::new(400.0, 300.0));
	}

	#[test]
	fn palette_is_chosen_by_name() {
		assert_eq!(LayoutConfig::default().palette, PaletteName::Category10);
		let config = LayoutConfig::from_json(r#"{"palette": "slate"}"#).unwrap();
		assert_eq!(config.palette, PaletteName::Slate);
		assert!(LayoutConfig::from_json(r#"{"palette": "neon"}"#).is_err());
	}

	#[test]
	fn zoom_clamp() {
		let zoom = ZoomConfig::default();
		assert_eq!(zoom.clamp(0.01), 0.2);
		assert_eq!(zoom.clamp(100.0), 5.0);
		assert_eq!(zoom.clamp(1.3), 1.3);
	}
}
