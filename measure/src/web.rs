//! Browser glue: mirrors the floating panels into DOM elements and wraps the
//! [`ToolDispatcher`] for the host page.
//!
//! This module is the only place that touches `web_sys`. Every fallible DOM
//! call propagates via `Result<_, JsValue>`; the host handles the result.

use frames::ToolType;
use wasm_bindgen::JsValue;
use web_sys::HtmlElement;

use crate::camera::{ScreenPoint, Viewport};
use crate::config::MeasureConfig;
use crate::engine::{Action, ToolDispatcher};
use crate::error::MeasureError;
use crate::panel::{FloatingPanel, PanelContent};
use crate::session::ResponseDisposition;
use crate::shape::ShapeRef;

const TITLE_CLASS: &str = "measure-panel-title";
const ROW_CLASS: &str = "measure-panel-row";

/// Milliseconds since the epoch from the browser clock.
#[must_use]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// One absolutely positioned DOM element showing a [`FloatingPanel`].
pub struct DomPanel {
    element: HtmlElement,
    rendered_rev: Option<u64>,
}

impl DomPanel {
    #[must_use]
    pub fn new(element: HtmlElement) -> Self {
        Self { element, rendered_rev: None }
    }

    /// Bring the element in line with `panel`. Rows are rewritten only when
    /// the content revision changed.
    ///
    /// Returns the element's rendered size while the panel is visible.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a DOM call fails.
    pub fn sync(&mut self, panel: &FloatingPanel) -> Result<Option<(f64, f64)>, JsValue> {
        let style = self.element.style();
        if !panel.is_visible() {
            style.set_property("display", "none")?;
            return Ok(None);
        }

        if self.rendered_rev != Some(panel.content_rev()) {
            self.write_content(panel.content())?;
            self.rendered_rev = Some(panel.content_rev());
        }

        let pos = panel.position();
        style.set_property("display", "block")?;
        style.set_property("left", &format!("{}px", pos.x))?;
        style.set_property("top", &format!("{}px", pos.y))?;

        let rect = self.element.get_bounding_client_rect();
        Ok(Some((rect.width(), rect.height())))
    }

    fn write_content(&self, content: &PanelContent) -> Result<(), JsValue> {
        let document = self
            .element
            .owner_document()
            .ok_or_else(|| JsValue::from_str("panel element is not attached to a document"))?;
        self.element.set_inner_html("");

        let title = document.create_element("div")?;
        title.set_class_name(TITLE_CLASS);
        title.set_text_content(Some(content.title.as_str()));
        self.element.append_child(&title)?;

        for row in &content.rows {
            let line = document.create_element("div")?;
            line.set_class_name(ROW_CLASS);
            line.set_text_content(Some(format!("{}: {}", row.label, row.value).as_str()));
            self.element.append_child(&line)?;
        }
        Ok(())
    }
}

/// The measurement engine as the page sees it. Wraps [`ToolDispatcher`] and
/// owns the panel elements.
pub struct MeasureEngine {
    pub core: ToolDispatcher,
    distance_panel: DomPanel,
    properties_panel: DomPanel,
}

impl MeasureEngine {
    #[must_use]
    pub fn new(config: MeasureConfig, distance_panel: HtmlElement, properties_panel: HtmlElement) -> Self {
        Self {
            core: ToolDispatcher::new(config),
            distance_panel: DomPanel::new(distance_panel),
            properties_panel: DomPanel::new(properties_panel),
        }
    }

    // --- Delegated inputs ---

    /// # Errors
    ///
    /// Returns [`MeasureError::UnknownTool`] for an unknown name.
    pub fn enable_named(&mut self, name: &str) -> Result<Vec<Action>, MeasureError> {
        self.core.enable_named(name)
    }

    pub fn enable(&mut self, tool: ToolType) -> Vec<Action> {
        self.core.enable(tool)
    }

    pub fn disable(&mut self) -> Vec<Action> {
        self.core.disable()
    }

    pub fn route_selection(&mut self, shape: ShapeRef, is_new_pick: bool, shift: bool) -> Vec<Action> {
        self.core.route_selection(shape, is_new_pick, shift)
    }

    /// # Errors
    ///
    /// Returns [`MeasureError::Codec`] if the reply cannot be decoded.
    pub fn route_response_json(&mut self, text: &str) -> Result<ResponseDisposition, MeasureError> {
        self.core.route_response_json(text)
    }

    /// # Errors
    ///
    /// Returns [`MeasureError::Codec`] if the value is not a known reply.
    pub fn route_response_value(&mut self, value: serde_json::Value) -> Result<ResponseDisposition, MeasureError> {
        self.core.route_response_value(value)
    }

    pub fn remove_last_selected(&mut self, force: bool) -> Vec<Action> {
        self.core.remove_last_selected(force)
    }

    pub fn on_pointer_down(&mut self, pt: ScreenPoint, view: &dyn Viewport) -> Vec<Action> {
        self.core.on_pointer_down(pt, view)
    }

    pub fn on_pointer_move(&mut self, pt: ScreenPoint, view: &dyn Viewport) -> Vec<Action> {
        self.core.on_pointer_move(pt, view)
    }

    pub fn on_pointer_up(&mut self, pt: ScreenPoint, view: &dyn Viewport) -> Vec<Action> {
        self.core.on_pointer_up(pt, view)
    }

    // --- Frame ---

    /// Run the per-frame update against the browser clock, then render.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a DOM call fails while rendering.
    pub fn frame(&mut self, view: &dyn Viewport) -> Result<Vec<Action>, JsValue> {
        let actions = self.core.update(view, now_ms());
        self.render()?;
        Ok(actions)
    }

    /// Mirror both panels into the DOM and feed the measured sizes back.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a DOM call fails.
    pub fn render(&mut self) -> Result<(), JsValue> {
        if let Some((width, height)) = self.distance_panel.sync(self.core.distance().panel())? {
            self.core.distance_mut().set_panel_size(width, height);
        }
        if let Some((width, height)) = self.properties_panel.sync(self.core.properties().panel())? {
            self.core.properties_mut().set_panel_size(width, height);
        }
        Ok(())
    }
}
