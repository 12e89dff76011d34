//! Node colors: an RGBA color type, fixed palettes, and the per-type assignment.

use indexmap::IndexMap;

use super::config::PaletteName;
use super::types::GraphNode;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity in `[0, 1]`.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Same color with opacity `a`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// CSS color string: hex when opaque, `rgba()` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// A fixed, finite list of node colors. Indexing wraps around.
#[derive(Clone, Debug)]
pub struct NodePalette {
	/// Colors in slot order.
	pub colors: Vec<Color>,
}

impl NodePalette {
	/// Ten well-separated hues, so neighboring categories stay distinguishable (default).
	pub fn category10() -> Self {
		Self {
			colors: vec![
				Color::rgb(31, 119, 180),  // Blue
				Color::rgb(255, 127, 14),  // Orange
				Color::rgb(44, 160, 44),   // Green
				Color::rgb(214, 39, 40),   // Red
				Color::rgb(148, 103, 189), // Purple
				Color::rgb(140, 86, 75),   // Brown
				Color::rgb(227, 119, 194), // Pink
				Color::rgb(127, 127, 127), // Gray
				Color::rgb(188, 189, 34),  // Olive
				Color::rgb(23, 190, 207),  // Cyan
			],
		}
	}

	/// Muted slate blues and teals.
	pub fn slate() -> Self {
		Self {
			colors: vec![
				Color::rgb(94, 129, 172),  // Steel blue
				Color::rgb(129, 161, 193), // Light steel
				Color::rgb(100, 148, 160), // Teal gray
				Color::rgb(136, 160, 175), // Cadet blue
				Color::rgb(108, 142, 173), // Air force blue
				Color::rgb(119, 158, 165), // Desaturated cyan
				Color::rgb(143, 163, 180), // Cool gray
				Color::rgb(122, 153, 168), // Dusty blue
			],
		}
	}

	/// Number of slots.
	pub fn len(&self) -> usize {
		self.colors.len()
	}

	/// True if there are no slots.
	pub fn is_empty(&self) -> bool {
		self.colors.is_empty()
	}

	/// Color at `index`, modulo the palette size. An empty palette yields gray.
	pub fn get(&self, index: usize) -> Color {
		if self.colors.is_empty() {
			return Color::rgb(128, 128, 128);
		}
		self.colors[index % self.colors.len()]
	}
}

impl From<PaletteName> for NodePalette {
	fn from(name: PaletteName) -> Self {
		match name {
			PaletteName::Category10 => Self::category10(),
			PaletteName::Slate => Self::slate(),
		}
	}
}

impl Default for NodePalette {
	fn default() -> Self {
		Self::category10()
	}
}

/// Maps each distinct node `type` to a palette slot in order of first appearance.
#[derive(Clone, Debug, Default)]
pub struct TypeColors {
	palette: NodePalette,
	assigned: IndexMap<String, Color>,
}

impl TypeColors {
	/// Empty mapping over `palette`.
	pub fn new(palette: NodePalette) -> Self {
		Self {
			palette,
			assigned: IndexMap::new(),
		}
	}

	/// Rebuilds the mapping from scratch for the given node order.
	pub fn assign(&mut self, nodes: &[GraphNode]) {
		self.assigned.clear();
		for node in nodes {
			if !self.assigned.contains_key(&node.kind) {
				let color = self.palette.get(self.assigned.len());
				self.assigned.insert(node.kind.clone(), color);
			}
		}
	}

	/// Color for a type. Types never seen by [`assign`](Self::assign) get the first slot.
	pub fn color_of(&self, kind: &str) -> Color {
		self.assigned
			.get(kind)
			.copied()
			.unwrap_or_else(|| self.palette.get(0))
	}

	/// Assigned `(type, color)` pairs in first-seen order, e.g. for a legend.
	pub fn legend(&self) -> impl Iterator<Item = (&str, Color)> {
		self.assigned.iter().map(|(kind, color)| (kind.as_str(), *color))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn nodes(kinds: &[&str]) -> Vec<GraphNode> {
		kinds
			.iter()
			.enumerate()
			.map(|(i, kind)| GraphNode::new(format!("n{i}"), *kind, ""))
			.collect()
	}

	#[test]
	fn assigns_in_first_seen_order() {
		let mut colors = TypeColors::default();
		colors.assign(&nodes(&["Person", "Place", "Person", "Event"]));
		let palette = NodePalette::category10();
		assert_eq!(colors.color_of("Person"), palette.get(0));
		assert_eq!(colors.color_of("Place"), palette.get(1));
		assert_eq!(colors.color_of("Event"), palette.get(2));
		let order: Vec<&str> = colors.legend().map(|(k, _)| k).collect();
		assert_eq!(order, ["Person", "Place", "Event"]);
	}

	#[test]
	fn wraps_around_the_palette() {
		let mut colors = TypeColors::new(PaletteName::Slate.into());
		let kinds: Vec<String> = (0..10).map(|i| format!("t{i}")).collect();
		let refs: Vec<&str> = kinds.iter().map(String::as_str).collect();
		colors.assign(&nodes(&refs));
		assert_eq!(colors.color_of("t8"), colors.color_of("t0"));
		assert_eq!(colors.color_of("t9"), colors.color_of("t1"));
	}

	#[test]
	fn reassignment_follows_new_order() {
		let mut colors = TypeColors::default();
		colors.assign(&nodes(&["A", "B"]));
		let first = colors.color_of("A");
		colors.assign(&nodes(&["B", "A"]));
		assert_eq!(colors.color_of("B"), first);
		assert_eq!(colors.color_of("missing"), NodePalette::default().get(0));
	}

	#[test]
	fn css_output() {
		assert_eq!(Color::rgb(31, 119, 180).to_css(), "#1f77b4");
		assert_eq!(
			Color::rgb(255, 0, 0).with_alpha(0.5).to_css(),
			"rgba(255, 0, 0, 0.5)"
		);
		assert_eq!(Color::rgb(0, 0, 0).lighten(1.0), Color::rgb(255, 255, 255));
	}
}
