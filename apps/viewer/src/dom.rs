//! DOM wiring: canvas and selector lookup, button creation, wheel remap,
//! and control painting.
//!
//! Everything here talks to web-sys; the decisions live in
//! [`crate::session`].

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, WheelEvent, Window,
};

use geoscope_render::Viewport;

use crate::config;
use crate::session::ControlState;

/// Fill colors for the three control states.
const FILL_DEFAULT: &str = "transparent";
const FILL_SELECTED: &str = "darkseagreen";
const FILL_FAILED: &str = "lightpink";

/// The page elements the viewer drives: the drawing canvas, its 2D
/// context, and the selector strip.
pub struct Page {
    pub canvas: HtmlCanvasElement,
    pub context: CanvasRenderingContext2d,
    pub selector: HtmlElement,
}

/// Locate the host page's canvas and selector elements.
pub fn find_page(document: &Document) -> Result<Page, JsValue> {
    let canvas: HtmlCanvasElement = document
        .query_selector("body > canvas")?
        .ok_or_else(|| JsValue::from_str("page has no canvas element"))?
        .dyn_into()?;
    let context: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
        .dyn_into()?;
    let selector: HtmlElement = document
        .get_element_by_id(config::SELECTOR_ID)
        .ok_or_else(|| JsValue::from_str("page has no layer-selector element"))?
        .dyn_into()?;
    Ok(Page {
        canvas,
        context,
        selector,
    })
}

/// Append one labeled selector button for a layer path.
pub fn add_layer_button(
    document: &Document,
    selector: &HtmlElement,
    label: &str,
) -> Result<HtmlElement, JsValue> {
    let button: HtmlElement = document.create_element("button")?.dyn_into()?;
    button.append_child(&document.create_text_node(label))?;
    selector.append_child(&button)?;
    Ok(button)
}

/// Remap vertical wheel motion over the selector to horizontal scrolling.
pub fn remap_wheel_to_horizontal(selector: &HtmlElement) {
    let target = selector.clone();
    let callback = Closure::<dyn FnMut(WheelEvent)>::new(move |event: WheelEvent| {
        target.set_scroll_left(target.scroll_left() + event.delta_y() as i32);
        event.prevent_default();
    });
    selector.set_onwheel(Some(callback.as_ref().unchecked_ref()));
    callback.forget();
}

/// Paint one selector control with the fill for its state.
pub fn paint_control(button: &HtmlElement, state: ControlState) {
    let fill = match state {
        ControlState::Default => FILL_DEFAULT,
        ControlState::Selected => FILL_SELECTED,
        ControlState::Failed => FILL_FAILED,
    };
    let _ = button.style().set_property("background", fill);
}

/// The window's current drawable dimensions.
pub fn window_viewport(window: &Window) -> Viewport {
    let width = window
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);
    Viewport::new(width as u32, height as u32)
}

/// Resize the canvas backing store; this also blanks its pixels.
pub fn resize_canvas(canvas: &HtmlCanvasElement, viewport: Viewport) {
    canvas.set_width(viewport.width);
    canvas.set_height(viewport.height);
}
