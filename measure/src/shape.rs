//! Picked sub-shape references.
//!
//! The picking subsystem hands every hit to the tools as a [`ShapeRef`]. The
//! path is the stable identity of the pick: two references with the same
//! path are the same selection, whatever else they carry.

use tracing::debug;

#[cfg(test)]
#[path = "shape_test.rs"]
mod shape_test;

/// Separator used inside viewer object paths.
const PATH_SEPARATOR: char = '|';

/// Separator the backend expects in shape ids.
const CANONICAL_SEPARATOR: &str = "/";

/// One picked vertex, edge, face or solid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeRef {
    path: String,
    from_solid: bool,
    renderables: Vec<String>,
}

impl ShapeRef {
    /// A reference whose only renderable is the picked object itself.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self { renderables: vec![path.clone()], path, from_solid: false }
    }

    /// A pick that resolved to a parent solid; `faces` are the renderables
    /// highlighted for it.
    #[must_use]
    pub fn solid(path: impl Into<String>, faces: Vec<String>) -> Self {
        Self { path: path.into(), from_solid: true, renderables: faces }
    }

    /// Stable textual key used for identity comparison.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn is_from_solid(&self) -> bool {
        self.from_solid
    }

    /// The renderables to highlight while selected and to clear on release.
    #[must_use]
    pub fn renderables(&self) -> &[String] {
        &self.renderables
    }

    /// The path in the slash-delimited form the backend understands.
    #[must_use]
    pub fn canonical_id(&self) -> String {
        self.path.replace(PATH_SEPARATOR, CANONICAL_SEPARATOR)
    }

    /// Numeric index of the sub-shape, taken from the digits after the final
    /// `_` of the last path segment (`.../faces/faces_12` → 12).
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        let last = self
            .path
            .rsplit([PATH_SEPARATOR, '/'])
            .next()
            .unwrap_or_default();
        let (_, digits) = last.rsplit_once('_')?;
        match digits.parse() {
            Ok(index) => Some(index),
            Err(err) => {
                debug!(path = %self.path, error = %err, "sub-shape suffix is not an index");
                None
            }
        }
    }
}
