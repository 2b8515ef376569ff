use serde::{Deserialize, Serialize};

/// Current drawable size of the canvas, in physical pixels.
///
/// Mirrors the canvas backing store. Mutated only by the resize path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}
