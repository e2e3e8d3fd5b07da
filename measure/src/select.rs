//! Plain object selection: an unbounded toggle set whose sub-shape indices
//! are reported to the host after every change.

#[cfg(test)]
#[path = "select_test.rs"]
mod select_test;

use frames::ToolType;
use tracing::{debug, info};

use crate::camera::{ScreenPoint, Viewport};
use crate::engine::{Action, Tool};
use crate::input::{EventBus, PointerKind};
use crate::shape::ShapeRef;

#[derive(Debug, Default)]
pub struct SelectTool {
    selection: Vec<ShapeRef>,
    context_enabled: bool,
}

impl SelectTool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sub-shape indices of the selection, in selection order. Shapes whose
    /// path carries no index are skipped.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        self.selection
            .iter()
            .filter_map(|shape| {
                let index = shape.index();
                if index.is_none() {
                    debug!(key = shape.key(), "selected shape has no index");
                }
                index
            })
            .collect()
    }

    fn changed(&self) -> Action {
        Action::SelectionChanged { indices: self.indices() }
    }
}

impl Tool for SelectTool {
    fn tool_type(&self) -> ToolType {
        ToolType::Select
    }

    fn max_selectable(&self) -> Option<usize> {
        None
    }

    fn is_context_enabled(&self) -> bool {
        self.context_enabled
    }

    fn enable_context(&mut self, _bus: &mut EventBus) {
        self.context_enabled = true;
        info!(tool = %ToolType::Select, "selection context enabled");
    }

    fn disable_context(&mut self, _bus: &mut EventBus) -> Vec<Action> {
        self.context_enabled = false;
        let mut actions: Vec<Action> = self.selection.drain(..).map(Action::ClearHighlight).collect();
        actions.push(self.changed());
        info!(tool = %ToolType::Select, "selection context disabled");
        actions
    }

    fn handle_selection(&mut self, shape: ShapeRef, _is_new_pick: bool, _shift: bool) -> Vec<Action> {
        let mut actions = Vec::new();
        match self.selection.iter().position(|s| s.key() == shape.key()) {
            Some(pos) => actions.push(Action::ClearHighlight(self.selection.remove(pos))),
            None => self.selection.push(shape),
        }
        actions.push(self.changed());
        actions
    }

    fn remove_last_selected(&mut self, force: bool) -> Vec<Action> {
        let mut actions: Vec<Action> = if force {
            self.selection.drain(..).map(Action::ClearHighlight).collect()
        } else {
            self.selection.pop().map(Action::ClearHighlight).into_iter().collect()
        };
        actions.push(self.changed());
        actions
    }

    fn update(&mut self, _view: &dyn Viewport, _now_ms: f64) -> Vec<Action> {
        Vec::new()
    }

    fn on_pointer(&mut self, _kind: PointerKind, _pt: ScreenPoint, _view: &dyn Viewport) -> Vec<Action> {
        Vec::new()
    }

    fn selection(&self) -> &[ShapeRef] {
        &self.selection
    }
}
