//! Compile-time configuration for the viewer session.

/// Resource name of the precompiled rendering-engine module, fetched
/// relative to the page location.
pub const ENGINE_RESOURCE: &str = "core.wasm";

/// Linear memory pages (64 KiB each) configured for the engine at
/// instantiation. Fixed for the session; the region is never grown.
pub const ENGINE_INITIAL_PAGES: u32 = 10;

/// Quiet window for collapsing a burst of resize events into a single
/// re-render.
pub const RESIZE_QUIET_WINDOW_MS: u32 = 250;

/// DOM id of the element hosting the layer-selector buttons.
pub const SELECTOR_ID: &str = "layers";
