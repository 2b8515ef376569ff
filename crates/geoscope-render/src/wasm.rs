//! Engine module loading and the browser-side [`Engine`] implementation.
//!
//! The engine is a precompiled wasm module instantiated against a linear
//! memory region configured here. Its export table is invoked by name;
//! the canvas context travels through as an opaque JS value.

use js_sys::{Array, Function, Object, Reflect, Uint8Array, WebAssembly};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::engine::{Engine, LoadError, RenderError};

const EXPORT_ALLOC: &str = "allocArrayBuffer";
const EXPORT_RENDER: &str = "renderLayer";
const EXPORT_LAYERS: &str = "getLayers";
const EXPORT_CLICK: &str = "click";
const EXPORT_CLEAR: &str = "clear";

const REQUIRED_EXPORTS: [&str; 5] = [
    EXPORT_ALLOC,
    EXPORT_RENDER,
    EXPORT_LAYERS,
    EXPORT_CLICK,
    EXPORT_CLEAR,
];

/// Handle to the instantiated engine module: its linear memory plus the
/// export table the viewer invokes.
pub struct WasmEngine {
    memory: WebAssembly::Memory,
    exports: Object,
}

/// Fetch and instantiate the engine module against a fresh linear memory
/// of `initial_pages` pages (64 KiB each).
///
/// Memory size is fixed for the session; growth is not configured. Any
/// failure here is fatal and nothing is retried.
pub async fn load_engine(resource: &str, initial_pages: u32) -> Result<WasmEngine, LoadError> {
    let memory = make_memory(initial_pages)
        .map_err(|err| LoadError::Instantiate(describe(&err)))?;
    let imports = make_imports(&memory)
        .map_err(|err| LoadError::Instantiate(describe(&err)))?;

    let window = web_sys::window()
        .ok_or_else(|| LoadError::Instantiate("no window".to_string()))?;
    let response = JsFuture::from(window.fetch_with_str(resource))
        .await
        .map_err(|err| LoadError::Fetch {
            resource: resource.to_string(),
            detail: describe(&err),
        })?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|_| LoadError::Instantiate("fetch did not yield a response".to_string()))?;
    if !response.ok() {
        return Err(LoadError::Fetch {
            resource: resource.to_string(),
            detail: format!("HTTP {}", response.status()),
        });
    }

    let streaming = js_sys::Promise::resolve(&response.into());
    let instantiated = JsFuture::from(WebAssembly::instantiate_streaming(&streaming, &imports))
        .await
        .map_err(|err| LoadError::Instantiate(describe(&err)))?;
    let instance: WebAssembly::Instance = Reflect::get(&instantiated, &"instance".into())
        .map_err(|err| LoadError::Instantiate(describe(&err)))?
        .dyn_into()
        .map_err(|_| LoadError::Instantiate("instantiation yielded no instance".to_string()))?;
    let exports = instance.exports();

    // Prefer the module's own exported memory over the imported region.
    let memory = match Reflect::get(&exports, &"memory".into())
        .ok()
        .and_then(|value| value.dyn_into::<WebAssembly::Memory>().ok())
    {
        Some(exported) => exported,
        None => memory,
    };

    for name in REQUIRED_EXPORTS {
        if lookup_function(&exports, name).is_none() {
            return Err(LoadError::MissingExport(name));
        }
    }

    log::info!("engine module `{resource}` instantiated with {initial_pages} pages");
    Ok(WasmEngine { memory, exports })
}

fn make_memory(initial_pages: u32) -> Result<WebAssembly::Memory, JsValue> {
    let descriptor = Object::new();
    Reflect::set(&descriptor, &"initial".into(), &initial_pages.into())?;
    WebAssembly::Memory::new(&descriptor)
}

fn make_imports(memory: &WebAssembly::Memory) -> Result<Object, JsValue> {
    let env = Object::new();
    Reflect::set(&env, &"memory".into(), memory.as_ref())?;
    Reflect::set(&env, &"__stack_pointer".into(), &0u32.into())?;
    let imports = Object::new();
    Reflect::set(&imports, &"env".into(), &env)?;
    Ok(imports)
}

fn lookup_function(exports: &Object, name: &str) -> Option<Function> {
    Reflect::get(exports, &name.into())
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
}

fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}

impl WasmEngine {
    fn invoke(&self, name: &'static str, args: &[JsValue]) -> Result<JsValue, RenderError> {
        let function = lookup_function(&self.exports, name).ok_or(RenderError::Invoke {
            name,
            detail: "export missing".to_string(),
        })?;
        let list = Array::new();
        for arg in args {
            list.push(arg);
        }
        function
            .apply(&JsValue::NULL, &list)
            .map_err(|err| RenderError::Invoke {
                name,
                detail: describe(&err),
            })
    }

    fn capacity(&self) -> u32 {
        self.memory
            .buffer()
            .unchecked_into::<js_sys::ArrayBuffer>()
            .byte_length()
    }
}

impl Engine for WasmEngine {
    type Ctx = JsValue;

    fn alloc_array_buffer(&self, len: u32, align: u32) -> Result<u32, RenderError> {
        let offset = self.invoke(EXPORT_ALLOC, &[len.into(), align.into()])?;
        match offset.as_f64() {
            Some(offset) if offset >= 0.0 => Ok(offset as u32),
            _ => Err(RenderError::AllocationFailed { len }),
        }
    }

    fn write_bytes(&self, offset: u32, bytes: &[u8]) -> Result<(), RenderError> {
        let len = bytes.len() as u32;
        let capacity = self.capacity();
        if offset.checked_add(len).map_or(true, |end| end > capacity) {
            return Err(RenderError::WriteOutOfBounds {
                offset,
                len,
                capacity,
            });
        }
        let view = Uint8Array::new_with_byte_offset_and_length(&self.memory.buffer(), offset, len);
        view.copy_from(bytes);
        Ok(())
    }

    fn render_layer(
        &self,
        ctx: &JsValue,
        offset: u32,
        len: u32,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let status = self.invoke(
            EXPORT_RENDER,
            &[
                ctx.clone(),
                offset.into(),
                len.into(),
                width.into(),
                height.into(),
            ],
        )?;
        // A missing or zero status is success; anything else is a
        // rejection code from the engine.
        match status.as_f64() {
            None => Ok(()),
            Some(code) if code == 0.0 => Ok(()),
            Some(code) => Err(RenderError::EngineRejected(code as u32)),
        }
    }

    fn layer_paths(&self) -> Result<Vec<String>, RenderError> {
        let value = self.invoke(EXPORT_LAYERS, &[])?;
        let array: Array = value.dyn_into().map_err(|_| RenderError::Invoke {
            name: EXPORT_LAYERS,
            detail: "expected an array of layer paths".to_string(),
        })?;
        Ok(array.iter().filter_map(|entry| entry.as_string()).collect())
    }

    fn click(&self, x: f64, y: f64) -> Result<(), RenderError> {
        self.invoke(EXPORT_CLICK, &[x.into(), y.into()]).map(|_| ())
    }

    fn clear(&self, width: u32, height: u32) -> Result<(), RenderError> {
        self.invoke(EXPORT_CLEAR, &[width.into(), height.into()])
            .map(|_| ())
    }
}
