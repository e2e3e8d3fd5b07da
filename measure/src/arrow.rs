//! Annotation arrows: a thick line between two world points with optional
//! cone heads, kept at a constant on-screen size across camera zoom.
//!
//! The arrow stores only geometry. The viewer's renderer reads [`Arrow::line`]
//! and [`Arrow::cones`] every frame and draws them however it likes.
//!
//! GEOMETRY
//! ========
//! A cone of length `h` is centered `h / 2` inside its logical endpoint, so
//! its tip lands exactly on the endpoint. The line stops at the cone center
//! (the "inset point") so it never pokes through the tip. Rescaling changes
//! `h`, which moves both the cones and the inset points, while the logical
//! endpoints stay fixed.

#[cfg(test)]
#[path = "arrow_test.rs"]
mod arrow_test;

use nalgebra::{Unit, Vector3};

use crate::camera::WorldPoint;
use crate::consts::DEGENERATE_EPSILON;

/// Appearance of one arrow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowStyle {
    /// Cone length in world units at scale 1.
    pub cone_length: f64,
    /// Line width in pixels.
    pub thickness: f64,
    /// RGB color.
    pub color: u32,
    pub start_head: bool,
    pub end_head: bool,
}

/// A line segment in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: WorldPoint,
    pub end: WorldPoint,
}

impl Segment {
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// An arrowhead cone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cone {
    /// Geometric center of the cone.
    pub center: WorldPoint,
    /// Unit direction from base to tip.
    pub direction: Unit<Vector3<f64>>,
    /// Current length along `direction`.
    pub length: f64,
}

impl Cone {
    #[must_use]
    pub fn tip(&self) -> WorldPoint {
        self.center + self.direction.into_inner() * (self.length * 0.5)
    }

    #[must_use]
    pub fn base(&self) -> WorldPoint {
        self.center - self.direction.into_inner() * (self.length * 0.5)
    }
}

/// An arrow between two world points.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    start: WorldPoint,
    end: WorldPoint,
    style: ArrowStyle,
    scale: f64,
    line: Segment,
    cones: Vec<Cone>,
}

impl Arrow {
    /// Build an arrow at scale 1.
    #[must_use]
    pub fn new(start: WorldPoint, end: WorldPoint, style: ArrowStyle) -> Self {
        let mut arrow = Self {
            start,
            end,
            style,
            scale: 1.0,
            line: Segment { start, end },
            cones: Vec::new(),
        };
        arrow.rebuild();
        arrow
    }

    /// Multiply the current scale by `factor`.
    ///
    /// `update(s)` followed by `update(1.0 / s)` restores the original cone size.
    pub fn update(&mut self, factor: f64) {
        self.set_scale(self.scale * factor);
    }

    /// Set the absolute scale. Non-positive or non-finite values are ignored.
    pub fn set_scale(&mut self, scale: f64) {
        if !scale.is_finite() || scale <= 0.0 {
            return;
        }
        self.scale = scale;
        self.rebuild();
    }

    /// Move the logical endpoints, keeping style and scale.
    pub fn set_endpoints(&mut self, start: WorldPoint, end: WorldPoint) {
        self.start = start;
        self.end = end;
        self.rebuild();
    }

    #[must_use]
    pub fn start(&self) -> WorldPoint {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> WorldPoint {
        self.end
    }

    #[must_use]
    pub fn style(&self) -> &ArrowStyle {
        &self.style
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Cone length after scaling.
    #[must_use]
    pub fn cone_length(&self) -> f64 {
        self.style.cone_length * self.scale
    }

    /// The drawn line, between the two inset points.
    #[must_use]
    pub fn line(&self) -> &Segment {
        &self.line
    }

    /// Zero, one or two cones depending on the head flags.
    #[must_use]
    pub fn cones(&self) -> &[Cone] {
        &self.cones
    }

    /// How far each headed end of the line is pulled back from its endpoint.
    #[must_use]
    pub fn inset(&self) -> f64 {
        self.cone_length() * 0.5
    }

    fn rebuild(&mut self) {
        self.cones.clear();
        let Some(direction) = Unit::try_new(self.end - self.start, DEGENERATE_EPSILON) else {
            self.line = Segment { start: self.start, end: self.start };
            return;
        };
        let inset = direction.into_inner() * self.inset();
        let mut line = Segment { start: self.start, end: self.end };
        let length = self.cone_length();

        if self.style.start_head {
            line.start = self.start + inset;
            self.cones.push(Cone { center: line.start, direction: -direction, length });
        }
        if self.style.end_head {
            line.end = self.end - inset;
            self.cones.push(Cone { center: line.end, direction, length });
        }
        self.line = line;
    }
}

/// The render group owned by one measurement session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationGroup {
    arrows: Vec<Arrow>,
}

impl AnnotationGroup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, arrow: Arrow) {
        self.arrows.push(arrow);
    }

    /// Drop every arrow.
    pub fn dispose(&mut self) {
        self.arrows.clear();
    }

    /// Apply the same absolute scale to every arrow.
    pub fn set_scale(&mut self, scale: f64) {
        for arrow in &mut self.arrows {
            arrow.set_scale(scale);
        }
    }

    #[must_use]
    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Arrow> {
        self.arrows.get_mut(index)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arrows.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.arrows.len()
    }
}
