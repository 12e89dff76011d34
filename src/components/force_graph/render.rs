//! Canvas rendering for the layout engine's [`Frame`].
//!
//! Everything arrives in screen space, so no canvas transform is applied.
//! Rendering uses multiple passes for correct z-ordering:
//! 1. Background
//! 2. Edge lines, arrowheads, then edge labels
//! 3. Nodes in [`Frame::draw_order`], highlighted ones on top

use web_sys::CanvasRenderingContext2d;

use super::config::CanvasConfig;
use super::engine::{EdgeView, Emphasis, Frame, NodeView};
use super::palette::Color;

const BACKGROUND: Color = Color::rgb(22, 27, 34);
const EDGE: Color = Color::rgb(140, 160, 180);
const LABEL: Color = Color::rgb(230, 236, 242);

/// Arrowhead length in screen pixels at zoom 1.
const ARROW_SIZE: f64 = 8.0;
/// Edge label baseline offset above the anchor, in screen pixels at zoom 1.
const LABEL_LIFT: f64 = 6.0;

fn alpha_for(emphasis: Emphasis) -> f64 {
	match emphasis {
		Emphasis::Normal => 0.85,
		Emphasis::Highlighted => 1.0,
		Emphasis::Dimmed => 0.2,
	}
}

/// Renders the complete frame to the canvas.
pub fn render(frame: &Frame<'_>, ctx: &CanvasRenderingContext2d, canvas: &CanvasConfig) {
	draw_background(ctx, canvas);
	draw_edges(frame, ctx);
	draw_nodes(frame, ctx);
	ctx.set_global_alpha(1.0);
}

fn draw_background(ctx: &CanvasRenderingContext2d, canvas: &CanvasConfig) {
	ctx.set_fill_style_str(&BACKGROUND.to_css());
	ctx.fill_rect(0.0, 0.0, canvas.width, canvas.height);
}

fn draw_edges(frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) {
	let width = (1.5 * frame.zoom).max(0.5);
	ctx.set_line_width(width);

	for edge in &frame.edges {
		draw_edge(ctx, edge, frame.zoom);
	}

	let _ = ctx.set_line_dash(&js_sys::Array::new());
	ctx.set_text_align("center");
	ctx.set_font(&font(11.0, frame.zoom));
	for edge in &frame.edges {
		if edge.label.is_empty() {
			continue;
		}
		ctx.set_fill_style_str(&LABEL.with_alpha(alpha_for(edge.emphasis)).to_css());
		let _ = ctx.fill_text(
			edge.label,
			edge.label_anchor.x,
			edge.label_anchor.y - LABEL_LIFT * frame.zoom,
		);
	}
}

fn draw_edge(ctx: &CanvasRenderingContext2d, edge: &EdgeView<'_>, zoom: f64) {
	let delta = edge.end - edge.start;
	let dist = delta.length();
	if dist < 0.001 {
		return;
	}
	let unit = delta / dist;
	let arrow = ARROW_SIZE * zoom;
	let color = EDGE.with_alpha(alpha_for(edge.emphasis)).to_css();

	// Dimmed edges are dashed so they recede even where they cross nodes.
	if edge.emphasis == Emphasis::Dimmed {
		let dash = wasm_bindgen::JsValue::from_f64(4.0 * zoom);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(&dash, &dash));
	} else {
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}

	let shaft_end = edge.end - unit * arrow.min(dist);
	ctx.set_stroke_style_str(&color);
	ctx.begin_path();
	ctx.move_to(edge.start.x, edge.start.y);
	ctx.line_to(shaft_end.x, shaft_end.y);
	ctx.stroke();

	let back = edge.end - unit * arrow;
	let side = unit.perp() * (arrow * 0.5);
	ctx.set_fill_style_str(&color);
	ctx.begin_path();
	ctx.move_to(edge.end.x, edge.end.y);
	ctx.line_to(back.x + side.x, back.y + side.y);
	ctx.line_to(back.x - side.x, back.y - side.y);
	ctx.close_path();
	ctx.fill();
}

fn draw_nodes(frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) {
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_font(&font(10.0, frame.zoom));

	for node in frame.draw_order() {
		draw_node(ctx, node, frame.zoom);
	}

	ctx.set_text_baseline("alphabetic");
}

fn draw_node(ctx: &CanvasRenderingContext2d, node: &NodeView<'_>, zoom: f64) {
	let alpha = alpha_for(node.emphasis);
	let rect = &node.rect;
	ctx.set_global_alpha(alpha);

	ctx.set_fill_style_str(&node.color.to_css());
	ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);

	if node.emphasis == Emphasis::Highlighted {
		ctx.set_stroke_style_str(&node.color.lighten(0.6).to_css());
		ctx.set_line_width((2.0 * zoom).max(1.0));
		ctx.stroke_rect(rect.x, rect.y, rect.width, rect.height);
	}

	ctx.set_fill_style_str("#ffffff");
	let _ = ctx.fill_text_with_max_width(node.id, node.center.x, node.center.y, rect.width * 0.9);
	ctx.set_global_alpha(1.0);
}

fn font(size: f64, zoom: f64) -> String {
	format!("{}px sans-serif", (size * zoom).max(4.0))
}
