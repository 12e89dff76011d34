//! knowledge-graph-layout: interactive force-directed layout for extracted knowledge graphs.
//!
//! This crate provides a headless layout engine (simulation, viewport,
//! interaction) and a WASM canvas component that hosts it with pan, zoom,
//! node dragging and hover highlighting.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

pub mod components;
pub mod error;

pub use components::force_graph::{
	ForceGraphCanvas, GraphData, GraphNode, GraphRelationship, LayoutConfig, LayoutEngine,
};
pub use error::LoadError;

/// Id of the `<script type="application/json">` element holding the graph.
pub const GRAPH_DATA_ID: &str = "graph-data";
/// Id of the optional element holding a (partial) [`LayoutConfig`].
pub const GRAPH_CONFIG_ID: &str = "graph-config";

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("knowledge-graph-layout: logging initialized");
}

fn script_text(id: &'static str) -> Result<String, LoadError> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or(LoadError::NoDocument)?;
	let element = document
		.get_element_by_id(id)
		.ok_or(LoadError::MissingElement(id))?;
	let script: HtmlScriptElement = element
		.dyn_into()
		.map_err(|_| LoadError::NotAScript(id))?;
	Ok(script.text().unwrap_or_default())
}

/// Load graph data from the script element with id="graph-data".
/// Expected format: JSON with `{ nodes: [...], relationships: [...] }`.
pub fn load_graph_data() -> Result<GraphData, LoadError> {
	GraphData::from_json(&script_text(GRAPH_DATA_ID)?)
}

/// Load layout overrides from the script element with id="graph-config".
pub fn load_layout_config() -> Result<LayoutConfig, LoadError> {
	LayoutConfig::from_json(&script_text(GRAPH_CONFIG_ID)?)
}

fn initial_graph() -> GraphData {
	match load_graph_data() {
		Ok(data) => {
			info!(
				"knowledge-graph-layout: loaded {} nodes, {} relationships",
				data.nodes.len(),
				data.relationships.len()
			);
			data
		}
		Err(e) => {
			warn!("knowledge-graph-layout: no graph data: {}", e);
			GraphData::default()
		}
	}
}

fn initial_config() -> LayoutConfig {
	match load_layout_config() {
		Ok(config) => config,
		Err(LoadError::MissingElement(_)) => LayoutConfig::default(),
		Err(e) => {
			warn!("knowledge-graph-layout: ignoring layout config: {}", e);
			LayoutConfig::default()
		}
	}
}

/// Main application component.
/// Loads graph data from the DOM and renders the force-directed layout with a
/// zoom toolbar and a refresh button that re-reads the data.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph = RwSignal::new(initial_graph());
	let config = initial_config();
	let step = config.zoom.button_step;
	let zoom = RwSignal::new(1.0);

	let refresh = move |_| match load_graph_data() {
		Ok(data) => graph.set(data),
		Err(e) => warn!("knowledge-graph-layout: refresh failed: {}", e),
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Knowledge Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="graph-panel">
			<div class="graph-toolbar">
				<button title="Zoom in" on:click=move |_| zoom.update(|z| *z += step)>"+"</button>
				<button title="Zoom out" on:click=move |_| zoom.update(|z| *z -= step)>"-"</button>
				<button title="Reset zoom" on:click=move |_| zoom.set(1.0)>"1:1"</button>
				<span class="zoom-level">{move || format!("{:.0}%", zoom.get() * 100.0)}</span>
				<button title="Reload graph" on:click=refresh>"Refresh"</button>
			</div>
			<ForceGraphCanvas data=graph zoom=zoom config=config />
			<p class="subtitle">"Drag nodes to reposition. Scroll to zoom. Drag background to pan."</p>
		</div>
	}
}
