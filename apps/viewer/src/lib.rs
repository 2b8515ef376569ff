//! # GeoScope Viewer
//!
//! Browser entry point for GeoScope: loads the rendering-engine module,
//! populates the layer selector from its export table, and runs the
//! fetch, validate, marshal, render pipeline on every selection.
//!
//! The host page supplies a full-viewport `<canvas>` and an element with
//! id `layers` to host the selector; everything else is wired here at
//! startup. The session controllers in [`session`] are plain state
//! machines, so they compile and test on any target; only [`app`] and
//! the DOM glue are browser-specific.

pub mod config;
pub mod net;
pub mod session;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod dom;

/// Page entry point: set up diagnostics, then bring the session up.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);

    wasm_bindgen_futures::spawn_local(async {
        if let Err(err) = app::boot().await {
            log::error!("viewer initialization failed: {err}");
        }
    });
}
