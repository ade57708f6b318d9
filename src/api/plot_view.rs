use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::core::{ScreenPoint, ScreenRect, TrackerHit};
use crate::error::{PlotError, PlotResult};
use crate::interaction::{InputEvent, PlotController};
use crate::render::RenderBackend;

use super::invalidation::{InvalidationCoordinator, PassTicket, RedrawState, RedrawWaker};
use super::plot_model::SharedPlotModel;
use super::render_pipeline::{PassOptions, RenderResult};

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

/// Result of asking a view to render.
#[derive(Debug, Clone, PartialEq)]
pub enum PassOutcome {
    /// No pass was due, or another pass is running.
    Idle,
    Rendered(RenderResult),
    /// The pass faulted; the error is also kept by the view and the model.
    Faulted(PlotError),
}

/// Host-side view of a [`PlotModel`](super::PlotModel).
///
/// Every method takes `&self` and is safe to call from any thread. Render
/// passes run on whichever thread calls [`PlotView::render_pending`] or
/// [`PlotView::paint`], normally the toolkit's UI thread, while other threads
/// only record invalidation requests.
pub struct PlotView {
    id: u64,
    model: RwLock<Option<SharedPlotModel>>,
    controller: Mutex<PlotController>,
    coordinator: Arc<InvalidationCoordinator>,
    surface: Mutex<Option<ScreenRect>>,
    tracker: Mutex<Option<TrackerHit>>,
    last_render_error: Mutex<Option<PlotError>>,
}

impl std::fmt::Debug for PlotView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlotView")
            .field("id", &self.id)
            .field("has_model", &self.model.read().is_some())
            .field("surface", &*self.surface.lock())
            .field("state", &self.coordinator.state())
            .finish_non_exhaustive()
    }
}

impl Default for PlotView {
    fn default() -> Self {
        Self::new()
    }
}

impl PlotView {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed),
            model: RwLock::new(None),
            controller: Mutex::new(PlotController::new()),
            coordinator: Arc::new(InvalidationCoordinator::new()),
            surface: Mutex::new(None),
            tracker: Mutex::new(None),
            last_render_error: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Binds `model` to this view, releasing the previous one.
    ///
    /// Fails with [`PlotError::ModelAlreadyAttached`] when `model` is bound to
    /// another view; the current binding is kept in that case.
    pub fn set_model(&self, model: Option<SharedPlotModel>) -> PlotResult<()> {
        if let Some(next) = &model {
            if self
                .model()
                .is_some_and(|current| Arc::ptr_eq(&current, next))
            {
                self.invalidate_plot(true);
                return Ok(());
            }
            next.write().attach_to(self.id)?;
        }

        let previous = std::mem::replace(&mut *self.model.write(), model);
        if let Some(previous) = previous {
            previous.write().detach_from(self.id);
        }
        *self.tracker.lock() = None;
        debug!(view = self.id, "plot model replaced");
        self.invalidate_plot(true);
        Ok(())
    }

    /// Model bound by the host, if any.
    #[must_use]
    pub fn model(&self) -> Option<SharedPlotModel> {
        self.model.read().clone()
    }

    /// Model the next pass renders. Same as [`PlotView::model`]; kept apart
    /// so hosts can read it from any thread without touching the binding.
    #[must_use]
    pub fn actual_model(&self) -> Option<SharedPlotModel> {
        self.model()
    }

    pub fn set_controller(&self, controller: PlotController) {
        *self.controller.lock() = controller;
    }

    /// Runs `f` with exclusive access to the controller.
    pub fn with_controller<T>(&self, f: impl FnOnce(&mut PlotController) -> T) -> T {
        f(&mut self.controller.lock())
    }

    /// Requests a redraw from any thread. Requests collapse while a pass is
    /// pending; requests made during a pass schedule exactly one more.
    pub fn invalidate_plot(&self, update_data: bool) {
        self.coordinator.request_invalidate(update_data);
    }

    /// Shared handle for threads that only invalidate.
    #[must_use]
    pub fn invalidator(&self) -> Arc<InvalidationCoordinator> {
        Arc::clone(&self.coordinator)
    }

    /// Callback run whenever a pass becomes pending. It may be called from
    /// any thread and must only schedule work on the rendering thread.
    pub fn set_redraw_waker(&self, waker: Option<RedrawWaker>) {
        self.coordinator.set_waker(waker);
    }

    #[must_use]
    pub fn redraw_state(&self) -> RedrawState {
        self.coordinator.state()
    }

    /// Connects the view to a drawing surface of the given size.
    pub fn attach_surface(&self, bounds: ScreenRect) {
        let changed = self.surface.lock().replace(bounds) != Some(bounds);
        if changed {
            self.invalidate_plot(false);
        }
    }

    /// Disconnects the surface; later passes render nothing.
    pub fn detach_surface(&self) {
        self.surface.lock().take();
    }

    #[must_use]
    pub fn surface_bounds(&self) -> Option<ScreenRect> {
        *self.surface.lock()
    }

    /// Renders if a pass is pending. Returns [`PassOutcome::Idle`] otherwise.
    pub fn render_pending<B: RenderBackend + ?Sized>(&self, backend: &mut B) -> PassOutcome {
        let Some(ticket) = self.coordinator.begin_pass() else {
            return PassOutcome::Idle;
        };
        self.finish(backend, ticket)
    }

    /// Renders now, for toolkit-initiated repaints. Pending requests are
    /// folded into this pass.
    pub fn paint<B: RenderBackend + ?Sized>(&self, backend: &mut B) -> PassOutcome {
        let Some(ticket) = self.coordinator.begin_forced_pass() else {
            return PassOutcome::Idle;
        };
        self.finish(backend, ticket)
    }

    fn finish<B: RenderBackend + ?Sized>(&self, backend: &mut B, ticket: PassTicket) -> PassOutcome {
        let outcome = self.run_pass(backend, ticket);
        if self.coordinator.finish_pass() {
            debug!(view = self.id, "follow-up pass scheduled");
        }
        outcome
    }

    fn run_pass<B: RenderBackend + ?Sized>(&self, backend: &mut B, ticket: PassTicket) -> PassOutcome {
        let Some(model) = self.model() else {
            return PassOutcome::Rendered(RenderResult::default());
        };
        // A detached surface still runs the update step on a zero-area pass.
        let bounds = self.surface_bounds().unwrap_or_default();
        let options = PassOptions::default()
            .with_update_data(ticket.level.updates_data())
            .with_tracker(self.tracker());

        let result = model.write().render_pass(backend, bounds, &options);
        match result {
            Ok(result) => {
                self.last_render_error.lock().take();
                PassOutcome::Rendered(result)
            }
            Err(err) => {
                warn!(view = self.id, error = %err, "view pass faulted");
                *self.last_render_error.lock() = Some(err.clone());
                PassOutcome::Faulted(err)
            }
        }
    }

    /// Fault of the most recent pass; cleared by the next successful pass.
    #[must_use]
    pub fn last_render_error(&self) -> Option<PlotError> {
        self.last_render_error.lock().clone()
    }

    #[must_use]
    pub fn tracker(&self) -> Option<TrackerHit> {
        self.tracker.lock().clone()
    }

    /// Plot area of the last pass, or an empty rectangle.
    #[must_use]
    pub fn plot_area(&self) -> ScreenRect {
        self.model()
            .map(|model| model.read().plot_area())
            .unwrap_or_default()
    }

    /// Dispatches an input event to the controller.
    ///
    /// The controller lock is held while the bound command runs, so custom
    /// commands must not call back into `handle_input`.
    pub fn handle_input(&self, event: &InputEvent) -> bool {
        let mut controller = self.controller.lock();
        controller.handle(self, event)
    }

    /// Pans every positioned axis by a screen delta.
    pub fn pan_by(&self, dx: f64, dy: f64) {
        let changed = self
            .model()
            .is_some_and(|model| model.write().pan_all(dx, dy));
        if changed {
            self.invalidate_plot(false);
        }
    }

    /// Zooms every positioned axis around `position`.
    pub fn zoom_at(&self, factor: f64, position: ScreenPoint) {
        let changed = self
            .model()
            .is_some_and(|model| model.write().zoom_all_at(factor, position));
        if changed {
            self.invalidate_plot(false);
        }
    }

    /// Zooms around the plot-area center.
    pub fn zoom_by(&self, factor: f64) {
        let area = self.plot_area();
        if area.is_empty() {
            return;
        }
        self.zoom_at(factor, area.center());
    }

    pub fn reset_axes(&self) {
        if let Some(model) = self.model() {
            model.write().reset_all_axes();
            self.invalidate_plot(false);
        }
    }

    /// Shows the tracker at the item nearest to `position`, if any.
    pub fn show_tracker_at(&self, position: ScreenPoint) {
        let hit = self
            .model()
            .and_then(|model| model.read().nearest_hit(position));
        let changed = {
            let mut tracker = self.tracker.lock();
            let changed = *tracker != hit;
            *tracker = hit;
            changed
        };
        if changed {
            self.invalidate_plot(false);
        }
    }

    pub fn hide_tracker(&self) {
        if self.tracker.lock().take().is_some() {
            self.invalidate_plot(false);
        }
    }
}

impl Drop for PlotView {
    fn drop(&mut self) {
        if let Some(model) = self.model.get_mut().take() {
            model.write().detach_from(self.id);
        }
    }
}
