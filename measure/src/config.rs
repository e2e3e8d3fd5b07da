//! Tunables for the measurement tools, loaded from host-provided JSON.
//!
//! Every field has a default from [`crate::consts`], so the host only needs
//! to send the values it wants to change:
//!
//! ```json
//! { "response_timeout_ms": 5000, "cone_length": 0.25 }
//! ```

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::consts;
use crate::error::MeasureError;

/// Configuration shared by all measurement sessions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MeasureConfig {
    /// Interval between checks of a pending reply, in milliseconds.
    pub poll_interval_ms: f64,
    /// Time after which a pending reply is abandoned, in milliseconds.
    pub response_timeout_ms: f64,
    /// Arrowhead cone length in world units at zoom 1.
    pub cone_length: f64,
    pub segment_thickness: f64,
    pub leash_thickness: f64,
    pub segment_color: u32,
    pub leash_color: u32,
    /// Offset of a newly placed panel from its projected anchor, in pixels.
    pub panel_offset: (f64, f64),
    /// Panel size used until the host measures the real one.
    pub panel_size: (f64, f64),
    /// Fractional digits shown in panel values.
    pub decimals: usize,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: consts::POLL_INTERVAL_MS,
            response_timeout_ms: consts::RESPONSE_TIMEOUT_MS,
            cone_length: consts::CONE_LENGTH,
            segment_thickness: consts::SEGMENT_THICKNESS_PX,
            leash_thickness: consts::LEASH_THICKNESS_PX,
            segment_color: consts::SEGMENT_COLOR,
            leash_color: consts::LEASH_COLOR,
            panel_offset: (consts::PANEL_OFFSET_X_PX, consts::PANEL_OFFSET_Y_PX),
            panel_size: (consts::PANEL_DEFAULT_WIDTH_PX, consts::PANEL_DEFAULT_HEIGHT_PX),
            decimals: consts::DISPLAY_DECIMALS,
        }
    }
}

impl MeasureConfig {
    /// Parse and validate a JSON config. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::ConfigParse`] for malformed JSON and
    /// [`MeasureError::InvalidConfig`] for out-of-range values.
    pub fn from_json(text: &str) -> Result<Self, MeasureError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that intervals, lengths and sizes are usable.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), MeasureError> {
        positive("poll_interval_ms", self.poll_interval_ms)?;
        positive("response_timeout_ms", self.response_timeout_ms)?;
        positive("cone_length", self.cone_length)?;
        positive("segment_thickness", self.segment_thickness)?;
        positive("leash_thickness", self.leash_thickness)?;
        positive("panel_size.width", self.panel_size.0)?;
        positive("panel_size.height", self.panel_size.1)?;
        if self.response_timeout_ms < self.poll_interval_ms {
            return Err(MeasureError::InvalidConfig {
                field: "response_timeout_ms",
                reason: "must not be shorter than poll_interval_ms",
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), MeasureError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MeasureError::InvalidConfig { field, reason: "must be a positive finite number" })
    }
}
