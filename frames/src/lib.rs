//! Shared message model and JSON codec for the geometry backend round trip.
//!
//! This crate owns the representation of everything the measurement tools
//! exchange with the external geometry service: the outbound
//! [`MeasureRequest`] and the inbound [`MeasureResponse`], which is tagged by
//! the tool it answers. The only correlation between the two is the
//! [`RequestToken`] the backend echoes back.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned by the codec and by tool-name parsing.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The payload is not valid JSON for the expected message.
    #[error("failed to decode frame: {0}")]
    Decode(#[from] serde_json::Error),
    /// The message could not be serialized.
    #[error("failed to encode frame: {0}")]
    Encode(serde_json::Error),
    /// The tool name does not match any known tool.
    #[error("unknown tool type: {0}")]
    UnknownToolType(String),
}

/// The interactive tools. Measurement tools talk to the backend; `Select`
/// never does but shares the discriminator with them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolType {
    /// Distance between two picked shapes.
    #[serde(rename = "DistanceMeasurement")]
    Distance,
    /// Properties (area, volume, bounding box, ...) of one picked shape.
    #[serde(rename = "PropertiesMeasurement")]
    Properties,
    /// Plain multi-selection without a backend round trip.
    #[serde(rename = "SelectObjects")]
    Select,
}

impl ToolType {
    /// Name used for the `tool_type` tag on the wire.
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Distance => "DistanceMeasurement",
            Self::Properties => "PropertiesMeasurement",
            Self::Select => "SelectObjects",
        }
    }
}

impl fmt::Display for ToolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for ToolType {
    type Err = CodecError;

    /// Accepts short UI names (`distance`, `properties`, `select`) and the wire names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "distance" | "DistanceMeasurement" => Ok(Self::Distance),
            "properties" | "PropertiesMeasurement" => Ok(Self::Properties),
            "select" | "SelectObjects" => Ok(Self::Select),
            other => Err(CodecError::UnknownToolType(other.to_owned())),
        }
    }
}

/// Monotonically increasing id of one backend request, echoed in the reply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestToken(pub u64);

impl RequestToken {
    /// The token following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outbound notification asking the backend to measure the selected shapes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureRequest {
    /// Token the backend must echo in its reply.
    pub token: RequestToken,
    /// Which tool issued the request.
    pub tool_type: ToolType,
    /// Canonical slash-delimited shape paths, in selection order.
    pub shape_ids: Vec<String>,
    /// Shift modifier held during the pick that completed the selection.
    pub shift: bool,
}

/// A world-space point as sent by the backend.
pub type WirePoint = [f64; 3];

/// Axis-aligned bounding box reported for a shape.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: WirePoint,
    pub max: WirePoint,
}

impl BoundingBox {
    /// Extent along each axis.
    #[must_use]
    pub fn size(&self) -> WirePoint {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

/// Backend reply for a distance request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceResponse {
    pub token: RequestToken,
    #[serde(rename = "Distance")]
    pub distance: f64,
    /// Closest point on the first shape.
    pub refpoint1: WirePoint,
    /// Closest point on the second shape.
    pub refpoint2: WirePoint,
    /// Angle between the shapes in degrees, when both are planar or linear.
    #[serde(rename = "Angle", default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
}

/// Backend reply for a properties request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertiesResponse {
    pub token: RequestToken,
    /// Topological type, e.g. `"Face"` or `"Solid"`.
    pub shape_type: String,
    /// Geometric type, e.g. `"Plane"` or `"Cylinder"`.
    pub geom_type: String,
    /// Representative point of the shape (center or centroid).
    pub refpoint: WirePoint,
    #[serde(rename = "bb")]
    pub bounding_box: BoundingBox,
    #[serde(rename = "Volume", default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(rename = "Area", default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(rename = "Length", default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(rename = "Radius", default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

/// Inbound reply, tagged by the tool it answers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool_type")]
pub enum MeasureResponse {
    #[serde(rename = "DistanceMeasurement")]
    Distance(DistanceResponse),
    #[serde(rename = "PropertiesMeasurement")]
    Properties(PropertiesResponse),
}

impl MeasureResponse {
    /// The tool this reply is addressed to.
    #[must_use]
    pub fn tool_type(&self) -> ToolType {
        match self {
            Self::Distance(_) => ToolType::Distance,
            Self::Properties(_) => ToolType::Properties,
        }
    }

    /// The echoed request token.
    #[must_use]
    pub fn token(&self) -> RequestToken {
        match self {
            Self::Distance(r) => r.token,
            Self::Properties(r) => r.token,
        }
    }
}

/// Encode a request as a JSON string.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails.
pub fn encode_request(request: &MeasureRequest) -> Result<String, CodecError> {
    serde_json::to_string(request).map_err(CodecError::Encode)
}

/// Decode a JSON reply from the backend.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed JSON, an unknown `tool_type`
/// tag, or missing required fields.
pub fn decode_response(text: &str) -> Result<MeasureResponse, CodecError> {
    Ok(serde_json::from_str(text)?)
}

/// Decode a reply that has already been parsed into a JSON value.
///
/// # Errors
///
/// Same conditions as [`decode_response`].
pub fn decode_response_value(value: serde_json::Value) -> Result<MeasureResponse, CodecError> {
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
