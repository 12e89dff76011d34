//! Points and rectangle-border clipping for edge geometry.

/// A 2D point or vector. Used for both world and screen coordinates.
pub type Point = glam::DVec2;

/// Returns the point where the segment from `source` toward `target` leaves
/// the `width` x `height` rectangle centered on `source`.
///
/// The slope of the segment is compared against the rectangle's aspect ratio
/// to decide whether it exits through a horizontal (top/bottom) or vertical
/// (left/right) edge. Coincident centers return `source` unchanged.
pub fn intersect(source: Point, target: Point, width: f64, height: f64) -> Point {
	let delta = target - source;
	if delta == Point::ZERO {
		return source;
	}

	let half = Point::new(width, height) / 2.0;
	if delta.y.abs() * half.x > delta.x.abs() * half.y {
		// Top or bottom edge.
		source + delta * (half.y / delta.y.abs())
	} else {
		// Left or right edge.
		source + delta * (half.x / delta.x.abs())
	}
}

/// Trims the segment between two node centers so it starts and ends on the
/// node borders instead of the centers.
pub fn clip_segment(source: Point, target: Point, width: f64, height: f64) -> (Point, Point) {
	(
		intersect(source, target, width, height),
		intersect(target, source, width, height),
	)
}

/// Label anchor halfway between two centers.
pub fn midpoint(a: Point, b: Point) -> Point {
	a.lerp(b, 0.5)
}
