//! Measurement and selection tools for the browser CAD viewer.
//!
//! This crate is compiled to WebAssembly and runs next to the 3D viewer. It
//! owns the interactive half of measuring: which shapes are picked, which
//! backend request is outstanding, where the result panel sits and which
//! arrows connect it to the model. Geometry itself is computed by the backend;
//! requests and replies travel as [`frames`] messages, and every side effect
//! the host must perform comes back as an [`engine::Action`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::ToolDispatcher`], the [`engine::Tool`] trait and [`engine::Action`] |
//! | [`session`] | Generic measurement session: selection, request token, polling, panel anchoring |
//! | [`distance`] | Distance between two shapes |
//! | [`properties`] | Properties of one shape |
//! | [`select`] | Unbounded object selection |
//! | [`arrow`] | Annotation arrows and their render group |
//! | [`panel`] | Floating result panel state and drag clamping |
//! | [`camera`] | [`camera::Viewport`] seam and a look-at camera |
//! | [`input`] | Pointer kinds, drag gesture and the event bus |
//! | [`shape`] | Picked sub-shape references |
//! | [`config`] | JSON-loadable tunables |
//! | [`web`] | DOM panel mirroring and the page-facing engine |
//! | [`consts`] | Default tunables |

pub mod arrow;
pub mod camera;
pub mod config;
pub mod consts;
pub mod distance;
pub mod engine;
pub mod error;
pub mod input;
pub mod panel;
pub mod properties;
pub mod select;
pub mod session;
pub mod shape;
pub mod web;
