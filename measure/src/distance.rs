//! Distance between two picked shapes.
//!
//! The backend returns the two closest reference points and, for pairs of
//! linear or planar shapes, the angle between them. The session draws a
//! double-headed arrow between the points and a leash from their midpoint to
//! the panel.

#[cfg(test)]
#[path = "distance_test.rs"]
mod distance_test;

use frames::{DistanceResponse, RequestToken, ToolType};

use crate::arrow::{AnnotationGroup, Arrow, ArrowStyle};
use crate::camera::WorldPoint;
use crate::config::MeasureConfig;
use crate::panel::PanelRow;
use crate::session::{MeasureKind, Measurement, format_value, leash_style};

/// Index of the leash in the distance annotation group.
const LEASH_INDEX: usize = 1;

/// The distance measurement session.
pub type DistanceMeasurement = Measurement<Distance>;

/// Accepted distance reply and the points derived from it.
#[derive(Debug, Clone, Default)]
pub struct Distance {
    point1: Option<WorldPoint>,
    point2: Option<WorldPoint>,
    middle: Option<WorldPoint>,
    result: Option<DistanceResponse>,
}

impl Distance {
    #[must_use]
    pub fn point1(&self) -> Option<WorldPoint> {
        self.point1
    }

    #[must_use]
    pub fn point2(&self) -> Option<WorldPoint> {
        self.point2
    }

    #[must_use]
    pub fn result(&self) -> Option<&DistanceResponse> {
        self.result.as_ref()
    }
}

impl MeasureKind for Distance {
    const TOOL: ToolType = ToolType::Distance;
    const MAX_SELECTABLE: usize = 2;
    const TITLE: &'static str = "Distance";

    type Response = DistanceResponse;

    fn token(response: &DistanceResponse) -> RequestToken {
        response.token
    }

    fn accept(&mut self, response: &DistanceResponse) {
        let p1 = WorldPoint::from(response.refpoint1);
        let p2 = WorldPoint::from(response.refpoint2);
        self.point1 = Some(p1);
        self.point2 = Some(p2);
        self.middle = Some(nalgebra::center(&p1, &p2));
        self.result = Some(response.clone());
    }

    fn middle_point(&self) -> Option<WorldPoint> {
        self.middle
    }

    fn panel_rows(&self, decimals: usize) -> Vec<PanelRow> {
        let (Some(result), Some(p1), Some(p2)) = (&self.result, self.point1, self.point2) else {
            return Vec::new();
        };
        let delta = p2 - p1;
        let mut rows = vec![
            PanelRow::new("Distance", format_value(result.distance, decimals)),
            PanelRow::new("ΔX", format_value(delta.x.abs(), decimals)),
            PanelRow::new("ΔY", format_value(delta.y.abs(), decimals)),
            PanelRow::new("ΔZ", format_value(delta.z.abs(), decimals)),
        ];
        if let Some(angle) = result.angle {
            rows.push(PanelRow::new("Angle", format!("{}°", format_value(angle, decimals))));
        }
        rows
    }

    fn build_annotations(&self, group: &mut AnnotationGroup, panel_center: WorldPoint, config: &MeasureConfig) {
        let (Some(p1), Some(p2), Some(middle)) = (self.point1, self.point2, self.middle) else {
            return;
        };
        let segment = ArrowStyle {
            cone_length: config.cone_length,
            thickness: config.segment_thickness,
            color: config.segment_color,
            start_head: true,
            end_head: true,
        };
        group.push(Arrow::new(p1, p2, segment));
        group.push(Arrow::new(middle, panel_center, leash_style(config)));
    }

    fn refresh_leash(&self, group: &mut AnnotationGroup, panel_center: WorldPoint) {
        if let (Some(middle), Some(leash)) = (self.middle, group.get_mut(LEASH_INDEX)) {
            leash.set_endpoints(middle, panel_center);
        }
    }
}
