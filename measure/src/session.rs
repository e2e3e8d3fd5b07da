//! The measurement session shared by every measurement tool.
//!
//! A [`Measurement`] owns a selection of at most `K::MAX_SELECTABLE` shapes.
//! Once the selection is full it issues one backend request, tagged with a
//! fresh [`RequestToken`], and parks a pending slot for the reply. The slot is
//! polled from [`Tool::update`] every `poll_interval_ms`:
//!
//! ```text
//!   Idle ──(selection full)──► Waiting{token} ──(reply polled)──► Ready
//!     ▲                            │                                │
//!     └──(selection incomplete)────┴──(timeout)──► Unavailable      │
//!     └─────────────────────────(selection incomplete)──────────────┘
//! ```
//!
//! Changing the selection while waiting drops the slot; a reply that arrives
//! later carries the old token and is discarded. The kind-specific parts
//! (what to draw, what the panel says) live behind [`MeasureKind`].

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use frames::{MeasureRequest, RequestToken, ToolType};
use tracing::{debug, info, warn};

use crate::arrow::{AnnotationGroup, ArrowStyle};
use crate::camera::{ScreenPoint, Viewport, WorldPoint};
use crate::config::MeasureConfig;
use crate::engine::{Action, Tool};
use crate::input::{DragState, EventBus, PointerKind, SubscriptionSet};
use crate::panel::{FloatingPanel, PanelContent, PanelRow, clamp_into_canvas};
use crate::shape::ShapeRef;

/// Where a session is in its request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureState {
    /// Selection incomplete; nothing is shown.
    Idle,
    /// A request is outstanding.
    Waiting { token: RequestToken },
    /// A reply has been rendered.
    Ready,
    /// The backend did not answer before the timeout.
    Unavailable,
}

/// What happened to a reply handed to [`Measurement::handle_response`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseDisposition {
    /// Stored in the pending slot; picked up by the next poll.
    Accepted,
    /// No outstanding request carries this token.
    Stale,
    /// The slot already holds a reply for this token.
    Duplicate,
}

/// The kind-specific half of a measurement.
pub trait MeasureKind: Default + std::fmt::Debug {
    const TOOL: ToolType;
    const MAX_SELECTABLE: usize;
    const TITLE: &'static str;

    type Response: Clone + std::fmt::Debug;

    /// Token the reply echoes back.
    fn token(response: &Self::Response) -> RequestToken;

    /// Take the reply's geometry and values.
    fn accept(&mut self, response: &Self::Response);

    /// World point the leash to the panel starts from.
    fn middle_point(&self) -> Option<WorldPoint>;

    fn panel_rows(&self, decimals: usize) -> Vec<PanelRow>;

    /// Push this kind's arrows into an empty group.
    fn build_annotations(&self, group: &mut AnnotationGroup, panel_center: WorldPoint, config: &MeasureConfig);

    /// Re-aim the leash at a moved panel.
    fn refresh_leash(&self, group: &mut AnnotationGroup, panel_center: WorldPoint);

    /// Forget the accepted reply.
    fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug)]
struct PendingRequest<R> {
    token: RequestToken,
    /// Set on the first frame that sees the request; the timeout runs from here.
    first_seen_ms: Option<f64>,
    response: Option<R>,
}

/// A measurement tool with its selection, pending request, panel and arrows.
#[derive(Debug)]
pub struct Measurement<K: MeasureKind> {
    kind: K,
    config: MeasureConfig,
    selection: Vec<ShapeRef>,
    shift: bool,
    context_enabled: bool,
    subscriptions: SubscriptionSet,
    last_token: RequestToken,
    pending: Option<PendingRequest<K::Response>>,
    last_poll_ms: Option<f64>,
    state: MeasureState,
    panel: FloatingPanel,
    /// Top-left of the panel once placed; cleared when the measurement hides.
    panel_position: Option<ScreenPoint>,
    /// Panel center unprojected into the world, the leash's far end.
    panel_center: Option<WorldPoint>,
    annotations: AnnotationGroup,
    drag: DragState,
}

impl<K: MeasureKind> Measurement<K> {
    #[must_use]
    pub fn new(config: MeasureConfig) -> Self {
        let (width, height) = config.panel_size;
        Self {
            kind: K::default(),
            config,
            selection: Vec::new(),
            shift: false,
            context_enabled: false,
            subscriptions: SubscriptionSet::default(),
            last_token: RequestToken::default(),
            pending: None,
            last_poll_ms: None,
            state: MeasureState::Idle,
            panel: FloatingPanel::new(width, height),
            panel_position: None,
            panel_center: None,
            annotations: AnnotationGroup::new(),
            drag: DragState::Idle,
        }
    }

    /// Offer a backend reply. It is kept only if it answers the outstanding request.
    pub fn handle_response(&mut self, response: K::Response) -> ResponseDisposition {
        let token = K::token(&response);
        let Some(pending) = self.pending.as_mut().filter(|p| p.token == token) else {
            debug!(tool = %K::TOOL, %token, "stale reply discarded");
            return ResponseDisposition::Stale;
        };
        if pending.response.is_some() {
            debug!(tool = %K::TOOL, %token, "duplicate reply discarded");
            return ResponseDisposition::Duplicate;
        }
        pending.response = Some(response);
        ResponseDisposition::Accepted
    }

    // --- Queries ---

    #[must_use]
    pub fn state(&self) -> MeasureState {
        self.state
    }

    #[must_use]
    pub fn kind(&self) -> &K {
        &self.kind
    }

    #[must_use]
    pub fn panel(&self) -> &FloatingPanel {
        &self.panel
    }

    /// Report the panel's measured size.
    pub fn set_panel_size(&mut self, width: f64, height: f64) {
        self.panel.set_size(width, height);
    }

    #[must_use]
    pub fn annotations(&self) -> &AnnotationGroup {
        &self.annotations
    }

    #[must_use]
    pub fn panel_position(&self) -> Option<ScreenPoint> {
        self.panel_position
    }

    #[must_use]
    pub fn panel_center(&self) -> Option<WorldPoint> {
        self.panel_center
    }

    /// Token of the outstanding request, if any.
    #[must_use]
    pub fn pending_token(&self) -> Option<RequestToken> {
        self.pending.as_ref().map(|p| p.token)
    }

    #[must_use]
    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    // --- Readiness ---

    /// Issue a request when the selection is full, otherwise hide everything.
    fn update_measurement(&mut self, actions: &mut Vec<Action>) {
        if self.selection.len() != K::MAX_SELECTABLE {
            self.hide_measurement();
            return;
        }

        self.annotations.dispose();
        self.panel.show(false);
        self.kind.clear();

        self.last_token = self.last_token.next();
        let token = self.last_token;
        self.pending = Some(PendingRequest { token, first_seen_ms: None, response: None });
        self.last_poll_ms = None;
        self.state = MeasureState::Waiting { token };

        let shape_ids = self.selection.iter().map(ShapeRef::canonical_id).collect();
        debug!(tool = %K::TOOL, %token, "measurement request issued");
        actions.push(Action::SendRequest(MeasureRequest {
            token,
            tool_type: K::TOOL,
            shape_ids,
            shift: self.shift,
        }));
    }

    fn hide_measurement(&mut self) {
        self.pending = None;
        self.last_poll_ms = None;
        self.state = MeasureState::Idle;
        self.kind.clear();
        self.annotations.dispose();
        self.panel.show(false);
        self.panel_position = None;
        self.panel_center = None;
        self.drag = DragState::Idle;
    }

    // --- Polling ---

    fn poll(&mut self, view: &dyn Viewport, now_ms: f64, actions: &mut Vec<Action>) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        let first_seen = *pending.first_seen_ms.get_or_insert(now_ms);
        if self.last_poll_ms.is_some_and(|last| now_ms - last < self.config.poll_interval_ms) {
            return;
        }
        self.last_poll_ms = Some(now_ms);

        if let Some(response) = pending.response.take() {
            self.pending = None;
            self.resolve(&response, view);
            actions.push(Action::RenderNeeded);
            return;
        }

        if now_ms - first_seen >= self.config.response_timeout_ms {
            warn!(tool = %K::TOOL, token = %pending.token, elapsed_ms = now_ms - first_seen, "measurement reply timed out");
            self.pending = None;
            self.state = MeasureState::Unavailable;
            self.annotations.dispose();
            self.panel.show(false);
            actions.push(Action::MeasurementUnavailable { tool: K::TOOL });
        }
    }

    fn resolve(&mut self, response: &K::Response, view: &dyn Viewport) {
        self.kind.accept(response);
        self.panel.set_content(PanelContent {
            title: K::TITLE.to_owned(),
            rows: self.kind.panel_rows(self.config.decimals),
        });
        self.panel.show(true);
        self.state = MeasureState::Ready;
        if self.panel_position.is_none() {
            self.panel_position = Some(self.initial_panel_position(view));
        }
        self.place_panel(view);
        info!(tool = %K::TOOL, "measurement ready");
    }

    // --- Panel placement ---

    /// Projected middle point plus the configured offset, kept inside the canvas.
    fn initial_panel_position(&self, view: &dyn Viewport) -> ScreenPoint {
        let canvas = view.canvas_size();
        let anchor = match self.kind.middle_point() {
            Some(middle) => view.world_to_pixel(&middle),
            None => ScreenPoint::new(canvas.width * 0.5, canvas.height * 0.5),
        };
        let rect = self.panel.rect();
        let (dx, dy) = self.config.panel_offset;
        clamp_into_canvas(ScreenPoint::new(anchor.x + dx, anchor.y + dy), rect.width, rect.height, canvas)
    }

    /// Move the panel to its stored position and rebuild the arrows toward it.
    fn place_panel(&mut self, view: &dyn Viewport) {
        let Some(pos) = self.panel_position else {
            return;
        };
        self.panel.relocate(pos.x, pos.y);
        self.panel_center = self.unproject_panel_center(view);
        self.annotations.dispose();
        if let Some(center) = self.panel_center {
            self.kind.build_annotations(&mut self.annotations, center, &self.config);
            self.annotations.set_scale(arrow_scale(view));
        }
    }

    /// NDC depth used to lift the panel center into the world. The anchor
    /// sits at the middle point's depth so the leash stays level with the
    /// feature under either projection.
    fn anchor_depth(&self, view: &dyn Viewport) -> f64 {
        self.kind.middle_point().map_or(0.0, |middle| view.project(&middle).z)
    }

    fn unproject_panel_center(&self, view: &dyn Viewport) -> Option<WorldPoint> {
        let center = self.panel.rect().center();
        view.pixel_to_world(center, self.anchor_depth(view))
    }
}

/// Arrow scale that keeps on-screen cone size constant across zoom.
fn arrow_scale(view: &dyn Viewport) -> f64 {
    let zoom = view.zoom();
    if zoom.is_finite() && zoom > 0.0 { 1.0 / zoom } else { 1.0 }
}

/// Style shared by every leash: no heads, thin, neutral color.
pub(crate) fn leash_style(config: &MeasureConfig) -> ArrowStyle {
    ArrowStyle {
        cone_length: config.cone_length,
        thickness: config.leash_thickness,
        color: config.leash_color,
        start_head: false,
        end_head: false,
    }
}

pub(crate) fn format_value(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}

pub(crate) fn format_point(p: &WorldPoint, decimals: usize) -> String {
    format!("{:.d$}, {:.d$}, {:.d$}", p.x, p.y, p.z, d = decimals)
}

impl<K: MeasureKind> Tool for Measurement<K> {
    fn tool_type(&self) -> ToolType {
        K::TOOL
    }

    fn max_selectable(&self) -> Option<usize> {
        Some(K::MAX_SELECTABLE)
    }

    fn is_context_enabled(&self) -> bool {
        self.context_enabled
    }

    fn enable_context(&mut self, bus: &mut EventBus) {
        if self.context_enabled {
            return;
        }
        for kind in PointerKind::ALL {
            self.subscriptions.push(bus.subscribe(K::TOOL, kind));
        }
        self.context_enabled = true;
        info!(tool = %K::TOOL, "measurement context enabled");
    }

    fn disable_context(&mut self, bus: &mut EventBus) -> Vec<Action> {
        bus.release_all(&mut self.subscriptions);
        self.context_enabled = false;
        let mut actions: Vec<Action> = self.selection.drain(..).map(Action::ClearHighlight).collect();
        self.hide_measurement();
        actions.push(Action::SelectionCleared { tool: K::TOOL });
        info!(tool = %K::TOOL, "measurement context disabled");
        actions
    }

    /// Toggle `shape`. A new shape on a full selection evicts the oldest one
    /// when `is_new_pick` is set and is ignored otherwise.
    fn handle_selection(&mut self, shape: ShapeRef, is_new_pick: bool, shift: bool) -> Vec<Action> {
        let mut actions = Vec::new();
        self.shift = shift;

        if let Some(pos) = self.selection.iter().position(|s| s.key() == shape.key()) {
            actions.push(Action::ClearHighlight(self.selection.remove(pos)));
        } else {
            if self.selection.len() >= K::MAX_SELECTABLE {
                if !is_new_pick {
                    debug!(tool = %K::TOOL, key = shape.key(), "selection full; pick ignored");
                    return actions;
                }
                actions.push(Action::ClearHighlight(self.selection.remove(0)));
            }
            self.selection.push(shape);
        }

        self.update_measurement(&mut actions);
        actions
    }

    fn remove_last_selected(&mut self, force: bool) -> Vec<Action> {
        let mut actions: Vec<Action> = if force {
            self.selection.drain(..).map(Action::ClearHighlight).collect()
        } else {
            self.selection.pop().map(Action::ClearHighlight).into_iter().collect()
        };
        self.update_measurement(&mut actions);
        actions
    }

    fn update(&mut self, view: &dyn Viewport, now_ms: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        self.poll(view, now_ms, &mut actions);
        if self.state != MeasureState::Ready {
            return actions;
        }

        self.panel_center = self.unproject_panel_center(view);
        if let Some(center) = self.panel_center {
            if self.annotations.is_empty() {
                self.kind.build_annotations(&mut self.annotations, center, &self.config);
            } else {
                self.kind.refresh_leash(&mut self.annotations, center);
            }
        }
        self.annotations.set_scale(arrow_scale(view));
        actions
    }

    fn on_pointer(&mut self, kind: PointerKind, pt: ScreenPoint, view: &dyn Viewport) -> Vec<Action> {
        match (kind, self.drag) {
            (PointerKind::Down, _) => {
                if self.panel.is_visible() && self.panel.rect().contains(pt) {
                    self.drag = DragState::DraggingPanel { last_screen: pt };
                }
                Vec::new()
            }
            (PointerKind::Move, DragState::DraggingPanel { last_screen }) => {
                let next = self.panel.dragged_position(pt.x - last_screen.x, pt.y - last_screen.y, view.canvas_size());
                self.drag = DragState::DraggingPanel { last_screen: pt };
                self.panel_position = Some(next);
                if self.state == MeasureState::Ready {
                    self.place_panel(view);
                }
                vec![Action::RenderNeeded]
            }
            (PointerKind::Up, _) => {
                self.drag = DragState::Idle;
                Vec::new()
            }
            (PointerKind::Move, DragState::Idle) => Vec::new(),
        }
    }

    fn selection(&self) -> &[ShapeRef] {
        &self.selection
    }
}
