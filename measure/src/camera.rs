//! Camera access and world ↔ NDC ↔ pixel conversions.
//!
//! The viewer owns the real camera; measurement tools only read it through
//! the [`Viewport`] trait once per frame. [`Camera`] is a self-contained
//! implementation for hosts that do not already have one (and for tests).
//!
//! Conventions: NDC spans `[-1, 1]` on every axis with +y up; pixels are CSS
//! pixels from the canvas' top-left corner with +y down.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use nalgebra::{Isometry3, Matrix4, Orthographic3, Perspective3, Point3, Vector3};

/// A world-space (or NDC) point.
pub type WorldPoint = Point3<f64>;

/// A point in screen space, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Canvas dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Read-only view of the viewer's camera and canvas.
pub trait Viewport {
    /// Map a world point to normalized device coordinates.
    fn project(&self, world: &WorldPoint) -> WorldPoint;

    /// Map NDC back to world space. `None` when the camera transform is singular.
    fn unproject(&self, ndc: &WorldPoint) -> Option<WorldPoint>;

    /// Current zoom factor (1.0 = unzoomed).
    fn zoom(&self) -> f64;

    fn canvas_size(&self) -> CanvasSize;

    /// NDC x/y to canvas pixels. Depth is dropped.
    fn ndc_to_pixel(&self, ndc: &WorldPoint) -> ScreenPoint {
        let size = self.canvas_size();
        ScreenPoint::new((ndc.x + 1.0) * 0.5 * size.width, (1.0 - ndc.y) * 0.5 * size.height)
    }

    /// Canvas pixels to NDC at the given NDC depth.
    fn pixel_to_ndc(&self, pixel: ScreenPoint, depth: f64) -> WorldPoint {
        let size = self.canvas_size();
        let width = size.width.max(1.0);
        let height = size.height.max(1.0);
        WorldPoint::new(pixel.x / width * 2.0 - 1.0, 1.0 - pixel.y / height * 2.0, depth)
    }

    fn world_to_pixel(&self, world: &WorldPoint) -> ScreenPoint {
        self.ndc_to_pixel(&self.project(world))
    }

    fn pixel_to_world(&self, pixel: ScreenPoint, depth: f64) -> Option<WorldPoint> {
        self.unproject(&self.pixel_to_ndc(pixel, depth))
    }
}

/// Projection model of a [`Camera`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in radians at zoom 1.
        fovy: f64,
        near: f64,
        far: f64,
    },
    Orthographic {
        /// Half the visible height in world units at zoom 1.
        half_height: f64,
        near: f64,
        far: f64,
    },
}

/// A look-at camera with a perspective or orthographic projection.
///
/// Zoom narrows the field of view (perspective) or shrinks the frustum
/// (orthographic), so on-screen sizes scale linearly with `zoom`.
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: WorldPoint,
    pub target: WorldPoint,
    pub up: Vector3<f64>,
    pub projection: Projection,
    pub zoom: f64,
    pub canvas: CanvasSize,
}

impl Camera {
    /// A perspective camera looking from `eye` at `target`, +z up.
    #[must_use]
    pub fn perspective(eye: WorldPoint, target: WorldPoint, fovy: f64, canvas: CanvasSize) -> Self {
        Self {
            eye,
            target,
            up: Vector3::z(),
            projection: Projection::Perspective { fovy, near: 0.1, far: 1000.0 },
            zoom: 1.0,
            canvas,
        }
    }

    /// An orthographic camera looking from `eye` at `target`, +z up.
    #[must_use]
    pub fn orthographic(eye: WorldPoint, target: WorldPoint, half_height: f64, canvas: CanvasSize) -> Self {
        Self {
            eye,
            target,
            up: Vector3::z(),
            projection: Projection::Orthographic { half_height, near: 0.1, far: 1000.0 },
            zoom: 1.0,
            canvas,
        }
    }

    /// World → camera space.
    #[must_use]
    pub fn view_matrix(&self) -> Matrix4<f64> {
        Isometry3::look_at_rh(&self.eye, &self.target, &self.up).to_homogeneous()
    }

    /// Camera space → clip space, with zoom applied.
    #[must_use]
    pub fn projection_matrix(&self) -> Matrix4<f64> {
        let aspect = self.canvas.width.max(1.0) / self.canvas.height.max(1.0);
        let zoom = if self.zoom > 0.0 { self.zoom } else { 1.0 };
        match self.projection {
            Projection::Perspective { fovy, near, far } => {
                let half = (fovy * 0.5).tan() / zoom;
                Perspective3::new(aspect, 2.0 * half.atan(), near, far).to_homogeneous()
            }
            Projection::Orthographic { half_height, near, far } => {
                let top = half_height / zoom;
                let right = top * aspect;
                Orthographic3::new(-right, right, -top, top, near, far).to_homogeneous()
            }
        }
    }

    #[must_use]
    pub fn view_projection(&self) -> Matrix4<f64> {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Viewport for Camera {
    fn project(&self, world: &WorldPoint) -> WorldPoint {
        self.view_projection().transform_point(world)
    }

    fn unproject(&self, ndc: &WorldPoint) -> Option<WorldPoint> {
        self.view_projection().try_inverse().map(|inverse| inverse.transform_point(ndc))
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn canvas_size(&self) -> CanvasSize {
        self.canvas
    }
}
