//! Session-scoped UI state: which layer is selected, which selection
//! attempt is current, and how resize bursts collapse into one re-render.
//!
//! Everything here is plain state-machine logic. DOM callbacks translate
//! into [`UiEvent`]s and the controllers answer with [`Action`]s, so the
//! whole interaction surface is testable with a mock event source.

use thiserror::Error;

use geoscope_core::ParseError;
use geoscope_render::{RenderError, Viewport};

use crate::net::FetchError;

/// Events delivered from the page to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    LayerClicked(String),
    ViewportResized { width: u32, height: u32 },
    CanvasClicked { x: f64, y: f64 },
}

/// What the page must do next in response to an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Run the fetch, validate, render pipeline for `path` under `token`.
    Select { path: String, token: RequestToken },
    /// Restart the quiet-window timer; commit and re-render when it fires.
    ScheduleResize,
    /// Forward the click to the engine.
    ForwardClick { x: f64, y: f64 },
}

/// Visual state of one layer-selector control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Default,
    Selected,
    Failed,
}

/// Identifies one selection attempt; later attempts supersede earlier
/// ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// A control whose visual state changed after a transition.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlUpdate {
    pub path: String,
    pub state: ControlState,
}

/// Any per-control failure: caught at the click-handler boundary, logged,
/// and painted as a failed control. Never escapes to other controls or
/// the session.
#[derive(Debug, Error)]
pub enum SelectError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Tracks the selected layer across concurrent selection attempts.
///
/// Every attempt takes a token from a monotonic counter. A completion
/// carrying a superseded token is discarded outright, success or failure,
/// so the canvas and the highlighted control cannot diverge when fetches
/// resolve out of order.
#[derive(Debug, Default)]
pub struct SelectionController {
    selected: Option<String>,
    latest: u64,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Begin a selection attempt, superseding any attempt still in
    /// flight.
    pub fn begin(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    /// Whether a completion with this token is still the newest attempt.
    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }

    /// Apply a successful render of `path`.
    ///
    /// Returns the control repaints to perform, or `None` when the
    /// completion is stale and must be discarded.
    pub fn complete(&mut self, token: RequestToken, path: &str) -> Option<Vec<ControlUpdate>> {
        if !self.is_current(token) {
            log::debug!("{path}: stale selection discarded");
            return None;
        }
        let mut updates = vec![ControlUpdate {
            path: path.to_string(),
            state: ControlState::Selected,
        }];
        if let Some(previous) = self.selected.replace(path.to_string()) {
            if previous != path {
                updates.push(ControlUpdate {
                    path: previous,
                    state: ControlState::Default,
                });
            }
        }
        Some(updates)
    }

    /// Apply a failed attempt on `path`.
    ///
    /// The selection itself does not transition; the clicked control is
    /// marked failed. Stale failures are discarded like stale successes.
    pub fn fail(&mut self, token: RequestToken, path: &str) -> Option<ControlUpdate> {
        if !self.is_current(token) {
            log::debug!("{path}: stale failure discarded");
            return None;
        }
        Some(ControlUpdate {
            path: path.to_string(),
            state: ControlState::Failed,
        })
    }
}

/// Debounced canvas-size tracking.
///
/// Resize events only record the newest dimensions; the caller keeps at
/// most one quiet-window timer pending and calls [`commit`] when it
/// fires.
///
/// [`commit`]: ViewportController::commit
#[derive(Debug)]
pub struct ViewportController {
    viewport: Viewport,
    pending: Option<Viewport>,
}

impl ViewportController {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            pending: None,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Record a resize event. Only the last burst entry survives.
    pub fn note_resize(&mut self, width: u32, height: u32) {
        self.pending = Some(Viewport::new(width, height));
    }

    /// Adopt the most recently recorded dimensions. Called once per
    /// burst, when the quiet window elapses.
    pub fn commit(&mut self) -> Viewport {
        if let Some(pending) = self.pending.take() {
            self.viewport = pending;
        }
        self.viewport
    }
}

/// The session controller: one per page, shared by every event handler.
#[derive(Debug)]
pub struct Session {
    pub selection: SelectionController,
    pub viewport: ViewportController,
}

impl Session {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            selection: SelectionController::new(),
            viewport: ViewportController::new(viewport),
        }
    }

    /// Dispatch one page event to the owning controller.
    pub fn handle(&mut self, event: UiEvent) -> Action {
        match event {
            UiEvent::LayerClicked(path) => {
                let token = self.selection.begin();
                Action::Select { path, token }
            }
            UiEvent::ViewportResized { width, height } => {
                self.viewport.note_resize(width, height);
                Action::ScheduleResize
            }
            UiEvent::CanvasClicked { x, y } => Action::ForwardClick { x, y },
        }
    }

    /// The resize quiet window elapsed: adopt the recorded dimensions and
    /// name the layer to re-render, if one is selected.
    pub fn resize_elapsed(&mut self) -> (Viewport, Option<String>) {
        let viewport = self.viewport.commit();
        let selected = self.selection.selected().map(String::from);
        (viewport, selected)
    }
}
