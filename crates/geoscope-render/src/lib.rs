//! # GeoScope Render
//!
//! The engine-module boundary: viewport state, canonical layer encoding,
//! and the typed binding through which feature layers are marshaled into
//! the engine's linear memory and rendered.
//!
//! The rasterizer itself lives inside a precompiled, sandboxed module;
//! this crate treats it as an opaque collaborator behind the [`Engine`]
//! trait, so everything up to the actual browser boundary is testable on
//! the host.

pub mod engine;
pub mod marshal;
pub mod viewport;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use engine::{Engine, LoadError, RenderError};
pub use marshal::{encode_layer, upload_and_render};
pub use viewport::Viewport;

#[cfg(target_arch = "wasm32")]
pub use wasm::{load_engine, WasmEngine};
