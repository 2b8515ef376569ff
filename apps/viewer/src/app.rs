//! Browser session: engine bring-up, event wiring, and the per-click
//! render pipeline.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use thiserror::Error;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::MouseEvent;

use geoscope_core::{parse_features, FeatureLayer, ParseOutcome};
use geoscope_render::{load_engine, upload_and_render, Engine, LoadError, RenderError, WasmEngine};

use crate::config;
use crate::dom::{self, Page};
use crate::net;
use crate::session::{Action, ControlUpdate, RequestToken, SelectError, Session, UiEvent};

/// Failure during session bring-up. Fatal: logged and abandoned, never
/// retried.
#[derive(Debug, Error)]
pub enum BootError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("engine query failed: {0}")]
    Engine(#[from] RenderError),
    #[error("page wiring failed: {0}")]
    Page(String),
}

/// Everything the event handlers share, kept alive behind an `Rc` for
/// the lifetime of the page.
pub struct Viewer {
    engine: WasmEngine,
    page: Page,
    session: RefCell<Session>,
    controls: RefCell<HashMap<String, web_sys::HtmlElement>>,
    resize_timer: RefCell<Option<Timeout>>,
}

impl Viewer {
    fn paint(&self, update: &ControlUpdate) {
        if let Some(button) = self.controls.borrow().get(&update.path) {
            dom::paint_control(button, update.state);
        }
    }
}

/// Bring up the whole session: engine module, selector controls, event
/// handlers, and the initial canvas sizing pass.
pub async fn boot() -> Result<(), BootError> {
    let window = web_sys::window().ok_or_else(|| BootError::Page("no window".to_string()))?;
    let document = window
        .document()
        .ok_or_else(|| BootError::Page("no document".to_string()))?;

    let engine = load_engine(config::ENGINE_RESOURCE, config::ENGINE_INITIAL_PAGES).await?;
    let paths = engine.layer_paths()?;
    let page = dom::find_page(&document).map_err(|err| BootError::Page(describe(&err)))?;

    let viewport = dom::window_viewport(&window);
    let viewer = Rc::new(Viewer {
        engine,
        page,
        session: RefCell::new(Session::new(viewport)),
        controls: RefCell::new(HashMap::new()),
        resize_timer: RefCell::new(None),
    });

    dom::remap_wheel_to_horizontal(&viewer.page.selector);

    for path in paths {
        let button = dom::add_layer_button(&document, &viewer.page.selector, &path)
            .map_err(|err| BootError::Page(describe(&err)))?;
        let handler = viewer.clone();
        let click_path = path.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            dispatch(&handler, UiEvent::LayerClicked(click_path.clone()));
        });
        button.set_onclick(Some(callback.as_ref().unchecked_ref()));
        callback.forget();
        viewer.controls.borrow_mut().insert(path, button);
    }

    wire_canvas_clicks(&viewer);
    wire_resize(&viewer, &window);

    // Size the canvas once before any selection exists.
    viewer
        .session
        .borrow_mut()
        .viewport
        .note_resize(viewport.width, viewport.height);
    resize_elapsed(&viewer);
    Ok(())
}

fn wire_canvas_clicks(viewer: &Rc<Viewer>) {
    let handler = viewer.clone();
    let callback = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
        dispatch(
            &handler,
            UiEvent::CanvasClicked {
                x: event.offset_x() as f64,
                y: event.offset_y() as f64,
            },
        );
    });
    viewer
        .page
        .canvas
        .set_onclick(Some(callback.as_ref().unchecked_ref()));
    callback.forget();
}

fn wire_resize(viewer: &Rc<Viewer>, window: &web_sys::Window) {
    let handler = viewer.clone();
    let window_handle = window.clone();
    let callback = Closure::<dyn FnMut()>::new(move || {
        let viewport = dom::window_viewport(&window_handle);
        dispatch(
            &handler,
            UiEvent::ViewportResized {
                width: viewport.width,
                height: viewport.height,
            },
        );
    });
    window.set_onresize(Some(callback.as_ref().unchecked_ref()));
    callback.forget();
}

/// Route one page event through the session controller and execute the
/// resulting action.
fn dispatch(viewer: &Rc<Viewer>, event: UiEvent) {
    let action = viewer.session.borrow_mut().handle(event);
    match action {
        Action::Select { path, token } => {
            spawn_local(select_layer(viewer.clone(), path, token));
        }
        Action::ScheduleResize => schedule_resize(viewer),
        Action::ForwardClick { x, y } => {
            if let Err(err) = viewer.engine.click(x, y) {
                log::warn!("engine click failed: {err}");
            }
        }
    }
}

/// Keep at most one quiet-window timer pending; the newest resize event
/// always restarts it.
fn schedule_resize(viewer: &Rc<Viewer>) {
    let handler = viewer.clone();
    let timer = Timeout::new(config::RESIZE_QUIET_WINDOW_MS, move || {
        resize_elapsed(&handler);
    });
    if let Some(previous) = viewer.resize_timer.borrow_mut().replace(timer) {
        previous.cancel();
    }
}

/// The quiet window elapsed: adopt the recorded dimensions and re-render
/// the selected layer at them, or clear the surface if none is selected.
fn resize_elapsed(viewer: &Rc<Viewer>) {
    viewer.resize_timer.borrow_mut().take();
    let (viewport, selected) = viewer.session.borrow_mut().resize_elapsed();
    dom::resize_canvas(&viewer.page.canvas, viewport);
    match selected {
        Some(path) => dispatch(viewer, UiEvent::LayerClicked(path)),
        None => {
            if let Err(err) = viewer.engine.clear(viewport.width, viewport.height) {
                log::warn!("engine clear failed: {err}");
            }
        }
    }
}

/// One selection attempt: fetch, then (if still current) validate,
/// marshal, and render within a single turn.
async fn select_layer(viewer: Rc<Viewer>, path: String, token: RequestToken) {
    let document = match net::fetch_layer(&path).await {
        Ok(document) => document,
        Err(err) => return finish(&viewer, &path, token, Err(err.into())),
    };
    // The only suspension point is behind us; a newer click may have
    // superseded this attempt while the fetch was in flight.
    if !viewer.session.borrow().selection.is_current(token) {
        log::debug!("{path}: superseded while fetching, discarded");
        return;
    }
    let result = render_document(&viewer, &path, &document);
    finish(&viewer, &path, token, result);
}

/// Validate and render one fetched document.
///
/// Synchronous: nothing here suspends, so the caller's current-token
/// check still holds when the engine is invoked.
fn render_document(
    viewer: &Viewer,
    path: &str,
    document: &serde_json::Value,
) -> Result<bool, SelectError> {
    let features = match parse_features(document)? {
        ParseOutcome::Empty => return Ok(false),
        ParseOutcome::Layer(features) => features,
    };
    let Some(layer) = FeatureLayer::new(path, features) else {
        return Ok(false);
    };
    let viewport = viewer.session.borrow().viewport.viewport();
    viewer
        .page
        .context
        .clear_rect(0.0, 0.0, viewport.width as f64, viewport.height as f64);
    upload_and_render(&viewer.engine, viewer.page.context.as_ref(), &layer, viewport)?;
    Ok(true)
}

/// Apply the outcome of a selection attempt to the session and the
/// selector controls.
fn finish(viewer: &Viewer, path: &str, token: RequestToken, result: Result<bool, SelectError>) {
    match result {
        Ok(true) => {
            let updates = viewer.session.borrow_mut().selection.complete(token, path);
            for update in updates.unwrap_or_default() {
                viewer.paint(&update);
            }
        }
        // A valid document with zero usable features: nothing rendered,
        // nothing transitions.
        Ok(false) => {}
        Err(err) => {
            log::error!("{path}: {err}");
            let update = viewer.session.borrow_mut().selection.fail(token, path);
            if let Some(update) = update {
                viewer.paint(&update);
            }
        }
    }
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
