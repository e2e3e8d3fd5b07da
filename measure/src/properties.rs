//! Geometric properties of a single picked shape.

#[cfg(test)]
#[path = "properties_test.rs"]
mod properties_test;

use frames::{PropertiesResponse, RequestToken, ToolType};

use crate::arrow::{AnnotationGroup, Arrow};
use crate::camera::WorldPoint;
use crate::config::MeasureConfig;
use crate::panel::PanelRow;
use crate::session::{MeasureKind, Measurement, format_point, format_value, leash_style};

pub type PropertiesMeasurement = Measurement<Properties>;

/// Accepted properties reply.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    point: Option<WorldPoint>,
    result: Option<PropertiesResponse>,
}

impl Properties {
    /// Reference point the leash starts from.
    #[must_use]
    pub fn point(&self) -> Option<WorldPoint> {
        self.point
    }

    #[must_use]
    pub fn result(&self) -> Option<&PropertiesResponse> {
        self.result.as_ref()
    }
}

impl MeasureKind for Properties {
    const TOOL: ToolType = ToolType::Properties;
    const MAX_SELECTABLE: usize = 1;
    const TITLE: &'static str = "Properties";

    type Response = PropertiesResponse;

    fn token(response: &PropertiesResponse) -> RequestToken {
        response.token
    }

    fn accept(&mut self, response: &PropertiesResponse) {
        self.point = Some(WorldPoint::from(response.refpoint));
        self.result = Some(response.clone());
    }

    fn middle_point(&self) -> Option<WorldPoint> {
        self.point
    }

    fn panel_rows(&self, decimals: usize) -> Vec<PanelRow> {
        let Some(result) = &self.result else {
            return Vec::new();
        };
        let mut rows = vec![
            PanelRow::new("Shape", result.shape_type.as_str()),
            PanelRow::new("Geometry", result.geom_type.as_str()),
        ];
        let measures = [
            ("Volume", result.volume),
            ("Area", result.area),
            ("Length", result.length),
            ("Radius", result.radius),
        ];
        rows.extend(
            measures
                .into_iter()
                .filter_map(|(label, value)| value.map(|v| PanelRow::new(label, format_value(v, decimals)))),
        );
        rows.push(PanelRow::new("Center", format_point(&WorldPoint::from(result.refpoint), decimals)));
        rows.push(PanelRow::new(
            "BB size",
            format_point(&WorldPoint::from(result.bounding_box.size()), decimals),
        ));
        rows
    }

    fn build_annotations(&self, group: &mut AnnotationGroup, panel_center: WorldPoint, config: &MeasureConfig) {
        if let Some(point) = self.point {
            group.push(Arrow::new(point, panel_center, leash_style(config)));
        }
    }

    fn refresh_leash(&self, group: &mut AnnotationGroup, panel_center: WorldPoint) {
        if let (Some(point), Some(leash)) = (self.point, group.get_mut(0)) {
            leash.set_endpoints(point, panel_center);
        }
    }
}
