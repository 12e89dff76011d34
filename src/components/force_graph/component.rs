//! Leptos component hosting the layout engine on a canvas element.
//!
//! The canvas has a fixed logical size taken from [`LayoutConfig::canvas`];
//! CSS stretches it to its container and pointer coordinates are mapped back
//! into logical units. Frames are driven by `requestAnimationFrame` through
//! [`AnimationFrameScheduler`], and the frame callback only holds a weak
//! reference to the engine so unmounting tears the loop down.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::config::{CanvasConfig, LayoutConfig};
use super::engine::LayoutEngine;
use super::geometry::Point;
use super::interaction::{InteractionMode, PointerTarget};
use super::render;
use super::scheduler::{AnimationFrameScheduler, FrameCallback};
use super::types::GraphData;

/// Engine plus the drawing context it paints into.
struct GraphContext {
	engine: LayoutEngine<AnimationFrameScheduler>,
	ctx: CanvasRenderingContext2d,
}

impl GraphContext {
	fn paint(&self) {
		render::render(&self.engine.frame(), &self.ctx, &self.engine.config().canvas);
	}
}

type SharedContext = Rc<RefCell<Option<GraphContext>>>;

/// Maps a mouse event to logical canvas coordinates.
fn logical_point(canvas: &HtmlCanvasElement, ev: &MouseEvent, logical: &CanvasConfig) -> Point {
	let rect = canvas.get_bounding_client_rect();
	let (sx, sy) = (
		logical.width / rect.width().max(1.0),
		logical.height / rect.height().max(1.0),
	);
	Point::new(
		(ev.client_x() as f64 - rect.left()) * sx,
		(ev.client_y() as f64 - rect.top()) * sy,
	)
}

/// Renders an interactive force-directed layout of `data`.
///
/// `data` is replaced wholesale on every change; nodes whose ids survive keep
/// their positions. When `zoom` is given it is kept in sync both ways: writes
/// from outside (toolbar buttons) zoom around the canvas center, and wheel
/// zooms are written back.
#[component]
pub fn ForceGraphCanvas(
	/// Graph to lay out; replaced wholesale on change.
	#[prop(into)]
	data: Signal<GraphData>,
	/// Zoom factor shared with the host, e.g. a toolbar.
	#[prop(optional)]
	zoom: Option<RwSignal<f64>>,
	/// Layout parameters; defaults when absent.
	#[prop(optional)]
	config: Option<LayoutConfig>,
) -> impl IntoView {
	let config = config.unwrap_or_default();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: SharedContext = Rc::new(RefCell::new(None));
	let callback: FrameCallback = Rc::new(RefCell::new(None));
	let logical = config.canvas.clone();

	let (context_init, callback_init) = (context.clone(), callback.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if context_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		canvas.set_width(config.canvas.width as u32);
		canvas.set_height(config.canvas.height as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("knowledge-graph-layout: 2d canvas context unavailable");
			return;
		};

		let weak = Rc::downgrade(&context_init);
		*callback_init.borrow_mut() = Some(Closure::new(move || {
			let Some(context) = weak.upgrade() else {
				return;
			};
			if let Some(ref mut c) = *context.borrow_mut() {
				if c.engine.on_frame() {
					c.paint();
				}
			}
		}));

		let mut engine = LayoutEngine::new(
			config.clone(),
			AnimationFrameScheduler::new(callback_init.clone()),
		);
		if let Some(zoom) = zoom {
			engine.set_zoom(zoom.get_untracked());
		}
		engine.set_data(data.get_untracked());

		let graph = GraphContext { engine, ctx };
		graph.paint();
		*context_init.borrow_mut() = Some(graph);
	});

	let context_data = context.clone();
	Effect::new(move |_| {
		let graph = data.get();
		if let Some(ref mut c) = *context_data.borrow_mut() {
			c.engine.set_data(graph);
			c.paint();
		}
	});

	if let Some(zoom) = zoom {
		let context_zoom = context.clone();
		Effect::new(move |_| {
			let requested = zoom.get();
			let applied = match *context_zoom.borrow_mut() {
				Some(ref mut c) if (c.engine.viewport().zoom() - requested).abs() > 1e-9 => {
					Some(c.engine.set_zoom(requested))
				}
				_ => None,
			};
			// Write the clamped value back so toolbars cannot run past the bounds.
			if let Some(applied) = applied {
				if (applied - requested).abs() > 1e-9 {
					zoom.set(applied);
				}
			}
		});
	}

	let (context_md, logical_md) = (context.clone(), logical.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let p = logical_point(&canvas, &ev, &logical_md);
		if let Some(ref mut c) = *context_md.borrow_mut() {
			let target = match c.engine.node_at(p) {
				Some(id) => PointerTarget::Node(id.to_string()),
				None => PointerTarget::Background,
			};
			c.engine.pointer_down(p, target);
		}
	};

	let (context_mm, logical_mm) = (context.clone(), logical.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let p = logical_point(&canvas, &ev, &logical_mm);
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			// Hover is frozen while a drag is in progress
			if c.engine.interaction().mode() != InteractionMode::Dragging {
				match c.engine.node_at(p).map(str::to_string) {
					Some(id) => c.engine.hover_enter(&id),
					None => c.engine.hover_leave(),
				}
			}
			c.engine.pointer_move(p);
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_mu.borrow_mut() {
			c.engine.pointer_up();
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.engine.pointer_leave();
		}
	};

	let (context_wh, logical_wh) = (context, logical);
	let on_wheel = move |ev: WheelEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let p = logical_point(&canvas, &ev, &logical_wh);
		let outcome = match *context_wh.borrow_mut() {
			Some(ref mut c) => c.engine.wheel(ev.delta_y(), p),
			None => return,
		};
		if outcome.prevent_default {
			ev.prevent_default();
		}
		if let Some(zoom) = zoom {
			zoom.set(outcome.zoom);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; width: 100%; cursor: grab;"
		/>
	}
}
