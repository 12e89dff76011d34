//! Errors raised while loading graph data or configuration from the host page.

use thiserror::Error;

/// Failures reading inputs embedded in the document.
///
/// The layout engine itself has no failure modes; these only cover the
/// handoff from the page to the engine.
#[derive(Error, Debug)]
pub enum LoadError {
	/// No browser window or document is available.
	#[error("no document available")]
	NoDocument,

	/// The element with the given id does not exist.
	#[error("element #{0} not found")]
	MissingElement(&'static str),

	/// The element exists but is not a `<script>`.
	#[error("element #{0} is not a script element")]
	NotAScript(&'static str),

	/// The JSON payload did not match the expected shape.
	#[error("invalid JSON: {0}")]
	Parse(#[from] serde_json::Error),
}
