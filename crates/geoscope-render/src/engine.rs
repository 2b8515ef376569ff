use thiserror::Error;

/// Failure to bring up the engine module.
///
/// Fatal to the session: initialization aborts and nothing is retried.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch engine module `{resource}`: {detail}")]
    Fetch { resource: String, detail: String },
    #[error("failed to instantiate engine module: {0}")]
    Instantiate(String),
    #[error("engine module does not export `{0}`")]
    MissingExport(&'static str),
}

/// Failure while marshaling or rendering one layer.
///
/// Recoverable: surfaced per selector control and never allowed to escape
/// the click-handler boundary.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to encode feature layer: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("engine allocation of {len} bytes failed")]
    AllocationFailed { len: u32 },
    #[error("write of {len} bytes at offset {offset} exceeds engine memory of {capacity} bytes")]
    WriteOutOfBounds { offset: u32, len: u32, capacity: u32 },
    #[error("unable to render feature layer: engine status {0}")]
    EngineRejected(u32),
    #[error("engine call `{name}` failed: {detail}")]
    Invoke { name: &'static str, detail: String },
}

/// Typed call boundary with the rendering engine.
///
/// The engine's exported operations return bare numeric statuses;
/// implementations translate those here, once, so callers never inspect
/// raw codes. Implementations over plain host memory stand in for the
/// real module in tests.
pub trait Engine {
    /// Host-side handle identifying the drawing surface, passed through
    /// to the engine opaquely.
    type Ctx;

    /// Request a call-scoped allocation inside engine linear memory.
    ///
    /// The returned offset is valid for immediate writes and through the
    /// next render call. The engine owns deallocation; no free is ever
    /// issued from this side.
    fn alloc_array_buffer(&self, len: u32, align: u32) -> Result<u32, RenderError>;

    /// Write bytes into engine linear memory.
    ///
    /// Fails with [`RenderError::WriteOutOfBounds`] when the region does
    /// not fit; memory is never grown.
    fn write_bytes(&self, offset: u32, bytes: &[u8]) -> Result<(), RenderError>;

    /// Rasterize the encoded layer at `[offset, offset + len)` onto `ctx`
    /// at the given canvas size.
    fn render_layer(
        &self,
        ctx: &Self::Ctx,
        offset: u32,
        len: u32,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError>;

    /// Resource paths of the layers the engine knows about, in selector
    /// order.
    fn layer_paths(&self) -> Result<Vec<String>, RenderError>;

    /// Forward a pointer click at canvas coordinates.
    fn click(&self, x: f64, y: f64) -> Result<(), RenderError>;

    /// Reset the drawing surface to `width` x `height` of blank pixels.
    fn clear(&self, width: u32, height: u32) -> Result<(), RenderError>;
}
