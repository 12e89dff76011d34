//! Interactive force-directed layout for knowledge graphs.
//!
//! The engine is split into headless pieces that can be driven and tested
//! without a browser, plus a canvas component that hosts them:
//! - [`simulation`]: per-node position/velocity state and the force model
//! - [`viewport`]: pan, zoom, and zoom-to-cursor
//! - [`interaction`]: pointer state machine for panning, dragging and hover
//! - [`engine`]: single owner of the above, producing screen-space [`Frame`]s
//! - [`scheduler`]: cancellable per-frame loop
//! - [`geometry`] and [`palette`]: edge clipping and per-type node colors
//!
//! # Example
//!
//! ```
//! use knowledge_graph_layout::components::force_graph::{
//!     GraphData, GraphNode, GraphRelationship, LayoutConfig, LayoutEngine, ManualScheduler,
//! };
//!
//! let mut engine = LayoutEngine::new(LayoutConfig::default(), ManualScheduler::default());
//! engine.set_data(GraphData {
//!     nodes: vec![
//!         GraphNode::new("Ada", "Person", "Mathematician"),
//!         GraphNode::new("Engine", "Machine", "Analytical Engine"),
//!     ],
//!     relationships: vec![GraphRelationship::new("Ada", "Engine", "PROGRAMMED")],
//! });
//! while engine.ticks() < 10 {
//!     engine.on_frame();
//! }
//! assert_eq!(engine.frame().edges.len(), 1);
//! ```

mod component;
pub mod config;
pub mod engine;
pub mod geometry;
pub mod interaction;
pub mod palette;
mod render;
pub mod scheduler;
pub mod simulation;
mod types;
pub mod viewport;

pub use component::ForceGraphCanvas;
pub use config::{LayoutConfig, PaletteName};
pub use engine::{EdgeView, Emphasis, Frame, LayoutEngine, NodeView, ScreenRect};
pub use geometry::Point;
pub use interaction::{InteractionMode, PointerTarget};
pub use palette::{Color, NodePalette, TypeColors};
pub use scheduler::{AnimationFrameScheduler, FrameScheduler, ManualScheduler, TickLoop};
pub use simulation::{MergeReport, NodePosition, Simulation};
pub use types::{GraphData, GraphNode, GraphRelationship};
pub use viewport::Viewport;
