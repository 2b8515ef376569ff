//! Layer marshaling: canonical byte encoding plus the alloc, write,
//! render sequence against the engine.

use geoscope_core::FeatureLayer;

use crate::engine::{Engine, RenderError};
use crate::viewport::Viewport;

/// Encode a layer as the UTF-8 bytes of its canonical JSON form.
///
/// Key order is fixed by struct field order: the layer object is
/// `{"name", "features"}` and each feature is `{"name", "coordinates"}`,
/// so the same layer always yields the same bytes.
pub fn encode_layer(layer: &FeatureLayer) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(layer)
}

/// Marshal `layer` into engine memory and invoke the render entry point.
///
/// The allocation is call-scoped: ownership of the byte region returns to
/// the engine's allocator once the render call completes, so no free is
/// issued here.
pub fn upload_and_render<E: Engine>(
    engine: &E,
    ctx: &E::Ctx,
    layer: &FeatureLayer,
    viewport: Viewport,
) -> Result<(), RenderError> {
    let bytes = encode_layer(layer)?;
    let len = bytes.len() as u32;
    let offset = engine.alloc_array_buffer(len, 1)?;
    engine.write_bytes(offset, &bytes)?;
    log::debug!(
        "layer `{}`: {len} bytes at offset {offset}, viewport {}x{}",
        layer.name,
        viewport.width,
        viewport.height,
    );
    engine.render_layer(ctx, offset, len, viewport.width, viewport.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoscope_core::Feature;
    use std::cell::{Cell, RefCell};

    /// Engine stand-in over a plain byte vector with a bump allocator.
    ///
    /// Like the real engine it hands out offsets without checking
    /// remaining capacity; the bounds check lives in `write_bytes`.
    struct MockEngine {
        memory: RefCell<Vec<u8>>,
        next_offset: Cell<u32>,
        render_status: u32,
        rendered: RefCell<Option<(u32, u32, u32, u32)>>,
    }

    impl MockEngine {
        fn with_capacity(capacity: usize) -> Self {
            Self {
                memory: RefCell::new(vec![0; capacity]),
                next_offset: Cell::new(64),
                render_status: 0,
                rendered: RefCell::new(None),
            }
        }
    }

    impl Engine for MockEngine {
        type Ctx = ();

        fn alloc_array_buffer(&self, len: u32, _align: u32) -> Result<u32, RenderError> {
            let offset = self.next_offset.get();
            self.next_offset.set(offset + len);
            Ok(offset)
        }

        fn write_bytes(&self, offset: u32, bytes: &[u8]) -> Result<(), RenderError> {
            let mut memory = self.memory.borrow_mut();
            let capacity = memory.len() as u32;
            let len = bytes.len() as u32;
            if offset + len > capacity {
                return Err(RenderError::WriteOutOfBounds {
                    offset,
                    len,
                    capacity,
                });
            }
            memory[offset as usize..(offset + len) as usize].copy_from_slice(bytes);
            Ok(())
        }

        fn render_layer(
            &self,
            _ctx: &(),
            offset: u32,
            len: u32,
            width: u32,
            height: u32,
        ) -> Result<(), RenderError> {
            self.rendered.borrow_mut().replace((offset, len, width, height));
            if self.render_status == 0 {
                Ok(())
            } else {
                Err(RenderError::EngineRejected(self.render_status))
            }
        }

        fn layer_paths(&self) -> Result<Vec<String>, RenderError> {
            Ok(Vec::new())
        }

        fn click(&self, _x: f64, _y: f64) -> Result<(), RenderError> {
            Ok(())
        }

        fn clear(&self, _width: u32, _height: u32) -> Result<(), RenderError> {
            Ok(())
        }
    }

    fn square_layer() -> FeatureLayer {
        let coordinates = vec![vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]];
        FeatureLayer::new("alpha", vec![Feature::new("A", coordinates)]).unwrap()
    }

    #[test]
    fn test_canonical_encoding_key_order() {
        let bytes = encode_layer(&square_layer()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            r#"{"name":"alpha","features":[{"name":"A","coordinates":[[[[0.0,0.0],[1.0,0.0],[1.0,1.0],[0.0,0.0]]]]}]}"#,
        );
    }

    #[test]
    fn test_encoding_round_trips() {
        let layer = square_layer();
        let bytes = encode_layer(&layer).unwrap();
        let decoded: FeatureLayer = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, layer);
    }

    #[test]
    fn test_upload_writes_encoding_at_allocated_offset() {
        let engine = MockEngine::with_capacity(4096);
        let layer = square_layer();
        let viewport = Viewport::new(1280, 720);

        upload_and_render(&engine, &(), &layer, viewport).unwrap();

        let bytes = encode_layer(&layer).unwrap();
        let len = bytes.len() as u32;
        let (offset, rendered_len, width, height) = engine.rendered.borrow().unwrap();
        assert_eq!(offset, 64);
        assert_eq!(rendered_len, len);
        assert_eq!((width, height), (1280, 720));
        let memory = engine.memory.borrow();
        assert_eq!(&memory[offset as usize..(offset + len) as usize], &bytes[..]);
    }

    #[test]
    fn test_write_past_capacity_fails_without_growth() {
        let engine = MockEngine::with_capacity(80);
        let result = upload_and_render(&engine, &(), &square_layer(), Viewport::new(100, 100));
        assert!(matches!(
            result,
            Err(RenderError::WriteOutOfBounds { capacity: 80, .. })
        ));
        assert!(engine.rendered.borrow().is_none());
        assert_eq!(engine.memory.borrow().len(), 80);
    }

    #[test]
    fn test_nonzero_engine_status_is_rejected() {
        let mut engine = MockEngine::with_capacity(4096);
        engine.render_status = 7;
        let result = upload_and_render(&engine, &(), &square_layer(), Viewport::new(100, 100));
        assert!(matches!(result, Err(RenderError::EngineRejected(7))));
    }
}
