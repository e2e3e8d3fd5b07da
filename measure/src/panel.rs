//! Floating result panel: visibility, pixel position, size and content rows.
//!
//! The panel is plain state. [`crate::web::DomPanel`] mirrors it into a DOM
//! element each frame and reports the element's measured size back through
//! [`FloatingPanel::set_size`].

#[cfg(test)]
#[path = "panel_test.rs"]
mod panel_test;

use crate::camera::{CanvasSize, ScreenPoint};

/// A screen-space rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PanelRect {
    #[must_use]
    pub fn contains(&self, pt: ScreenPoint) -> bool {
        pt.x >= self.x && pt.x <= self.x + self.width && pt.y >= self.y && pt.y <= self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}

/// One `label: value` line in the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelRow {
    pub label: String,
    pub value: String,
}

impl PanelRow {
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { label: label.into(), value: value.into() }
    }
}

/// Everything the panel displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelContent {
    pub title: String,
    pub rows: Vec<PanelRow>,
}

/// The draggable overlay showing a measurement result.
#[derive(Debug, Clone)]
pub struct FloatingPanel {
    visible: bool,
    position: ScreenPoint,
    width: f64,
    height: f64,
    content: PanelContent,
    content_rev: u64,
}

impl FloatingPanel {
    /// A hidden, empty panel at the canvas origin.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            visible: false,
            position: ScreenPoint::new(0.0, 0.0),
            width,
            height,
            content: PanelContent::default(),
            content_rev: 0,
        }
    }

    pub fn show(&mut self, visible: bool) {
        self.visible = visible;
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Move the top-left corner to `(x, y)` canvas pixels.
    pub fn relocate(&mut self, x: f64, y: f64) {
        self.position = ScreenPoint::new(x, y);
    }

    #[must_use]
    pub fn position(&self) -> ScreenPoint {
        self.position
    }

    #[must_use]
    pub fn rect(&self) -> PanelRect {
        PanelRect { x: self.position.x, y: self.position.y, width: self.width, height: self.height }
    }

    /// Record the size measured by the host. Non-positive values are ignored.
    pub fn set_size(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.width = width;
            self.height = height;
        }
    }

    pub fn set_content(&mut self, content: PanelContent) {
        if self.content != content {
            self.content = content;
            self.content_rev += 1;
        }
    }

    #[must_use]
    pub fn content(&self) -> &PanelContent {
        &self.content
    }

    /// Bumped whenever the content changes, so hosts can skip redundant DOM writes.
    #[must_use]
    pub fn content_rev(&self) -> u64 {
        self.content_rev
    }

    /// Where a drag by `(dx, dy)` would put the panel.
    ///
    /// Each axis is checked on its own: a move that would push the panel past
    /// the canvas edge in the direction of motion leaves that axis unchanged,
    /// while motion back toward the inside is always allowed.
    #[must_use]
    pub fn dragged_position(&self, dx: f64, dy: f64, canvas: CanvasSize) -> ScreenPoint {
        ScreenPoint::new(
            drag_axis(self.position.x, dx, self.width, canvas.width),
            drag_axis(self.position.y, dy, self.height, canvas.height),
        )
    }
}

fn drag_axis(pos: f64, delta: f64, extent: f64, limit: f64) -> f64 {
    let next = pos + delta;
    let blocked = (delta < 0.0 && next < 0.0) || (delta > 0.0 && next + extent > limit);
    if blocked { pos } else { next }
}

/// Clamp a top-left position so a panel of `width` × `height` fits the canvas
/// when it can; oversized panels are pinned to the top-left corner.
#[must_use]
pub fn clamp_into_canvas(pos: ScreenPoint, width: f64, height: f64, canvas: CanvasSize) -> ScreenPoint {
    let max_x = (canvas.width - width).max(0.0);
    let max_y = (canvas.height - height).max(0.0);
    ScreenPoint::new(pos.x.clamp(0.0, max_x), pos.y.clamp(0.0, max_y))
}
