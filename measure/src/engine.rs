use frames::{MeasureRequest, MeasureResponse, ToolType};
use tracing::{debug, error, info};

use crate::camera::{ScreenPoint, Viewport};
use crate::config::MeasureConfig;
use crate::distance::DistanceMeasurement;
use crate::error::MeasureError;
use crate::input::{EventBus, PointerKind};
use crate::properties::PropertiesMeasurement;
use crate::select::SelectTool;
use crate::session::ResponseDisposition;
use crate::shape::ShapeRef;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Side effects returned from tool handlers for the host to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Remove the highlight from every renderable of this shape.
    ClearHighlight(ShapeRef),
    /// Send this request to the geometry backend.
    SendRequest(MeasureRequest),
    /// The selection tool's set changed; these are the selected sub-shape indices.
    SelectionChanged { indices: Vec<usize> },
    /// A measurement tool dropped its whole selection.
    SelectionCleared { tool: ToolType },
    /// The backend did not answer in time; the measurement is hidden.
    MeasurementUnavailable { tool: ToolType },
    /// Panel or annotations changed outside the regular frame update.
    RenderNeeded,
}

/// Capabilities every interactive tool provides to the dispatcher.
pub trait Tool {
    fn tool_type(&self) -> ToolType;

    /// Maximum selection length, `None` when unbounded.
    fn max_selectable(&self) -> Option<usize>;

    fn is_context_enabled(&self) -> bool;

    /// Start listening for the tool's pointer events.
    fn enable_context(&mut self, bus: &mut EventBus);

    /// Stop listening, release every selection and dispose owned visuals.
    fn disable_context(&mut self, bus: &mut EventBus) -> Vec<Action>;

    /// Apply one pick from the picking subsystem.
    fn handle_selection(&mut self, shape: ShapeRef, is_new_pick: bool, shift: bool) -> Vec<Action>;

    /// Drop the most recent selection, or all of them when `force` is set.
    fn remove_last_selected(&mut self, force: bool) -> Vec<Action>;

    /// Per-frame hook.
    fn update(&mut self, view: &dyn Viewport, now_ms: f64) -> Vec<Action>;

    /// Pointer event the tool subscribed to.
    fn on_pointer(&mut self, kind: PointerKind, pt: ScreenPoint, view: &dyn Viewport) -> Vec<Action>;

    fn selection(&self) -> &[ShapeRef];
}

/// Single-active-tool state machine between the viewer and the tools.
///
/// Holds one instance of each tool. At most one is enabled at a time, and
/// every viewer event is routed to that one, except backend replies, which
/// are routed by the tool tag they carry.
pub struct ToolDispatcher {
    distance: DistanceMeasurement,
    properties: PropertiesMeasurement,
    select: SelectTool,
    enabled: Option<ToolType>,
    bus: EventBus,
    config: MeasureConfig,
}

impl Default for ToolDispatcher {
    fn default() -> Self {
        Self::new(MeasureConfig::default())
    }
}

impl ToolDispatcher {
    #[must_use]
    pub fn new(config: MeasureConfig) -> Self {
        Self {
            distance: DistanceMeasurement::new(config.clone()),
            properties: PropertiesMeasurement::new(config.clone()),
            select: SelectTool::new(),
            enabled: None,
            bus: EventBus::new(),
            config,
        }
    }

    // --- Enablement ---

    /// Switch to `tool`, fully tearing down the previously enabled one first.
    pub fn enable(&mut self, tool: ToolType) -> Vec<Action> {
        let actions = self.disable();
        match tool {
            ToolType::Distance => self.distance.enable_context(&mut self.bus),
            ToolType::Properties => self.properties.enable_context(&mut self.bus),
            ToolType::Select => self.select.enable_context(&mut self.bus),
        }
        self.enabled = Some(tool);
        info!(%tool, "tool enabled");
        actions
    }

    /// Enable a tool by its UI or wire name.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::UnknownTool`] if `name` is not a tool. The
    /// current tool stays enabled in that case.
    pub fn enable_named(&mut self, name: &str) -> Result<Vec<Action>, MeasureError> {
        let tool = name.parse::<ToolType>().map_err(|_| {
            error!(name, "unknown tool type requested");
            MeasureError::UnknownTool(name.to_owned())
        })?;
        Ok(self.enable(tool))
    }

    /// Disable the enabled tool, if any.
    pub fn disable(&mut self) -> Vec<Action> {
        let Some(tool) = self.enabled.take() else {
            return Vec::new();
        };
        let actions = match tool {
            ToolType::Distance => self.distance.disable_context(&mut self.bus),
            ToolType::Properties => self.properties.disable_context(&mut self.bus),
            ToolType::Select => self.select.disable_context(&mut self.bus),
        };
        info!(%tool, "tool disabled");
        actions
    }

    // --- Routing ---

    /// Forward a pick to the enabled tool. Ignored when no tool is enabled.
    pub fn route_selection(&mut self, shape: ShapeRef, is_new_pick: bool, shift: bool) -> Vec<Action> {
        let Some((tool, _)) = self.active() else {
            debug!(key = shape.key(), "pick ignored; no tool enabled");
            return Vec::new();
        };
        tool.handle_selection(shape, is_new_pick, shift)
    }

    /// Deliver a backend reply to the measurement named by its tag.
    pub fn route_response(&mut self, response: MeasureResponse) -> ResponseDisposition {
        match response {
            MeasureResponse::Distance(reply) => self.distance.handle_response(reply),
            MeasureResponse::Properties(reply) => self.properties.handle_response(reply),
        }
    }

    /// Decode a JSON reply and route it.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::Codec`] if the payload cannot be decoded.
    pub fn route_response_json(&mut self, text: &str) -> Result<ResponseDisposition, MeasureError> {
        let response = frames::decode_response(text)?;
        Ok(self.route_response(response))
    }

    /// Route a reply the host has already parsed, such as a `fetch` body
    /// read with `Response.json()`.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::Codec`] if the value is not a known reply.
    pub fn route_response_value(&mut self, value: serde_json::Value) -> Result<ResponseDisposition, MeasureError> {
        let response = frames::decode_response_value(value)?;
        Ok(self.route_response(response))
    }

    /// Per-frame hook; call once per rendered frame.
    pub fn update(&mut self, view: &dyn Viewport, now_ms: f64) -> Vec<Action> {
        match self.active() {
            Some((tool, _)) => tool.update(view, now_ms),
            None => Vec::new(),
        }
    }

    pub fn remove_last_selected(&mut self, force: bool) -> Vec<Action> {
        match self.active() {
            Some((tool, _)) => tool.remove_last_selected(force),
            None => Vec::new(),
        }
    }

    /// Drop the enabled tool's whole selection.
    pub fn reset(&mut self) -> Vec<Action> {
        self.remove_last_selected(true)
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, pt: ScreenPoint, view: &dyn Viewport) -> Vec<Action> {
        self.route_pointer(PointerKind::Down, pt, view)
    }

    pub fn on_pointer_move(&mut self, pt: ScreenPoint, view: &dyn Viewport) -> Vec<Action> {
        self.route_pointer(PointerKind::Move, pt, view)
    }

    pub fn on_pointer_up(&mut self, pt: ScreenPoint, view: &dyn Viewport) -> Vec<Action> {
        self.route_pointer(PointerKind::Up, pt, view)
    }

    fn route_pointer(&mut self, kind: PointerKind, pt: ScreenPoint, view: &dyn Viewport) -> Vec<Action> {
        let Some((tool, bus)) = self.active() else {
            return Vec::new();
        };
        if !bus.wants(tool.tool_type(), kind) {
            return Vec::new();
        }
        tool.on_pointer(kind, pt, view)
    }

    fn active(&mut self) -> Option<(&mut dyn Tool, &mut EventBus)> {
        let tool: &mut dyn Tool = match self.enabled? {
            ToolType::Distance => &mut self.distance,
            ToolType::Properties => &mut self.properties,
            ToolType::Select => &mut self.select,
        };
        Some((tool, &mut self.bus))
    }

    // --- Queries ---

    #[must_use]
    pub fn enabled(&self) -> Option<ToolType> {
        self.enabled
    }

    /// Selection of the enabled tool; empty when none is enabled.
    #[must_use]
    pub fn selection(&self) -> &[ShapeRef] {
        match self.enabled {
            Some(ToolType::Distance) => self.distance.selection(),
            Some(ToolType::Properties) => self.properties.selection(),
            Some(ToolType::Select) => self.select.selection(),
            None => &[],
        }
    }

    #[must_use]
    pub fn distance(&self) -> &DistanceMeasurement {
        &self.distance
    }

    #[must_use]
    pub fn properties(&self) -> &PropertiesMeasurement {
        &self.properties
    }

    /// Mutable access to the distance session, e.g. to report the measured panel size.
    pub fn distance_mut(&mut self) -> &mut DistanceMeasurement {
        &mut self.distance
    }

    pub fn properties_mut(&mut self) -> &mut PropertiesMeasurement {
        &mut self.properties
    }

    #[must_use]
    pub fn select(&self) -> &SelectTool {
        &self.select
    }

    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    #[must_use]
    pub fn config(&self) -> &MeasureConfig {
        &self.config
    }
}
