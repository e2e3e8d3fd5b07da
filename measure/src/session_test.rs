#![allow(clippy::float_cmp)]

use frames::{BoundingBox, DistanceResponse, PropertiesResponse};

use super::*;
use crate::camera::{Camera, CanvasSize};
use crate::distance::{Distance, DistanceMeasurement};
use crate::properties::PropertiesMeasurement;

// =============================================================
// Helpers
// =============================================================

const EPSILON: f64 = 1e-6;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Looks along +y; 60 px per world unit, world origin at pixel (400, 300).
fn camera() -> Camera {
    Camera::orthographic(WorldPoint::new(0.0, -10.0, 0.0), WorldPoint::origin(), 5.0, CanvasSize::new(800.0, 600.0))
}

fn face(n: usize) -> ShapeRef {
    ShapeRef::new(format!("body|faces|faces_{n}"))
}

fn distance_reply(token: u64) -> DistanceResponse {
    DistanceResponse {
        token: RequestToken(token),
        distance: 5.0,
        refpoint1: [0.0, 0.0, 0.0],
        refpoint2: [3.0, 0.0, 4.0],
        angle: None,
    }
}

fn properties_reply(token: u64) -> PropertiesResponse {
    PropertiesResponse {
        token: RequestToken(token),
        shape_type: "Face".to_owned(),
        geom_type: "Plane".to_owned(),
        refpoint: [1.0, 0.0, 1.0],
        bounding_box: BoundingBox { min: [0.0, 0.0, 0.0], max: [2.0, 0.0, 2.0] },
        volume: None,
        area: Some(4.0),
        length: None,
        radius: None,
    }
}

fn session() -> DistanceMeasurement {
    DistanceMeasurement::new(MeasureConfig::default())
}

/// A distance session with two faces picked and request 1 outstanding.
fn waiting_session() -> DistanceMeasurement {
    let mut m = session();
    m.handle_selection(face(1), true, false);
    m.handle_selection(face(2), true, false);
    m
}

/// A distance session that has rendered the reply to request 1.
fn ready_session(cam: &Camera) -> DistanceMeasurement {
    let mut m = waiting_session();
    assert_eq!(m.handle_response(distance_reply(1)), ResponseDisposition::Accepted);
    m.update(cam, 0.0);
    assert_eq!(m.state(), MeasureState::Ready);
    m
}

fn requests(actions: &[Action]) -> Vec<&MeasureRequest> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::SendRequest(req) => Some(req),
            _ => None,
        })
        .collect()
}

fn cleared(actions: &[Action]) -> Vec<&str> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::ClearHighlight(shape) => Some(shape.key()),
            _ => None,
        })
        .collect()
}

// =============================================================
// Selection and readiness
// =============================================================

#[test]
fn new_session_is_idle() {
    let m = session();
    assert_eq!(m.state(), MeasureState::Idle);
    assert!(m.selection().is_empty());
    assert_eq!(m.pending_token(), None);
    assert!(!m.panel().is_visible());
}

#[test]
fn incomplete_selection_sends_nothing() {
    let mut m = session();
    let actions = m.handle_selection(face(1), true, false);
    assert!(requests(&actions).is_empty());
    assert_eq!(m.state(), MeasureState::Idle);
    assert_eq!(m.selection().len(), 1);
}

#[test]
fn full_selection_sends_one_tagged_request() {
    let mut m = session();
    m.handle_selection(face(1), true, false);
    let actions = m.handle_selection(face(2), true, true);

    let reqs = requests(&actions);
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].token, RequestToken(1));
    assert_eq!(reqs[0].tool_type, ToolType::Distance);
    assert_eq!(reqs[0].shape_ids, vec!["body/faces/faces_1", "body/faces/faces_2"]);
    assert!(reqs[0].shift);
    assert_eq!(m.state(), MeasureState::Waiting { token: RequestToken(1) });
}

#[test]
fn selecting_same_shape_twice_restores_prior_state() {
    let mut m = session();
    m.handle_selection(face(1), true, false);
    let before: Vec<ShapeRef> = m.selection().to_vec();

    m.handle_selection(face(2), true, false);
    let actions = m.handle_selection(face(2), true, false);

    assert_eq!(m.selection(), before.as_slice());
    assert_eq!(cleared(&actions), vec!["body|faces|faces_2"]);
    assert_eq!(m.state(), MeasureState::Idle);
}

#[test]
fn new_pick_on_full_selection_evicts_oldest() {
    let mut m = waiting_session();
    let actions = m.handle_selection(face(3), true, false);

    assert_eq!(cleared(&actions), vec!["body|faces|faces_1"]);
    let keys: Vec<&str> = m.selection().iter().map(ShapeRef::key).collect();
    assert_eq!(keys, vec!["body|faces|faces_2", "body|faces|faces_3"]);
    assert_eq!(requests(&actions)[0].token, RequestToken(2));
}

#[test]
fn repeated_pick_on_full_selection_is_ignored() {
    let mut m = waiting_session();
    let actions = m.handle_selection(face(3), false, false);
    assert!(actions.is_empty());
    assert_eq!(m.selection().len(), 2);
    assert_eq!(m.pending_token(), Some(RequestToken(1)));
}

#[test]
fn selection_never_exceeds_max() {
    let mut m = session();
    for n in 0..10 {
        m.handle_selection(face(n), n % 2 == 0, false);
        assert!(m.selection().len() <= 2);
    }
}

#[test]
fn remove_last_selected_pops_newest() {
    let mut m = waiting_session();
    let actions = m.remove_last_selected(false);
    assert_eq!(cleared(&actions), vec!["body|faces|faces_2"]);
    assert_eq!(m.state(), MeasureState::Idle);
    assert_eq!(m.pending_token(), None);
}

#[test]
fn remove_last_selected_force_clears_everything() {
    let mut m = waiting_session();
    let actions = m.remove_last_selected(true);
    assert_eq!(cleared(&actions).len(), 2);
    assert!(m.selection().is_empty());
}

#[test]
fn remove_last_selected_on_empty_selection_is_quiet() {
    let mut m = session();
    assert!(m.remove_last_selected(false).is_empty());
}

// =============================================================
// Request token and polling
// =============================================================

#[test]
fn reply_with_current_token_is_accepted() {
    let mut m = waiting_session();
    assert_eq!(m.handle_response(distance_reply(1)), ResponseDisposition::Accepted);
}

#[test]
fn reply_for_superseded_request_is_stale() {
    let mut m = waiting_session();
    m.handle_selection(face(2), true, false);
    m.handle_selection(face(2), true, false);
    assert_eq!(m.pending_token(), Some(RequestToken(2)));

    assert_eq!(m.handle_response(distance_reply(1)), ResponseDisposition::Stale);
    assert_eq!(m.state(), MeasureState::Waiting { token: RequestToken(2) });
}

#[test]
fn reply_without_request_is_stale() {
    let mut m = session();
    assert_eq!(m.handle_response(distance_reply(1)), ResponseDisposition::Stale);
}

#[test]
fn second_reply_for_same_token_is_duplicate() {
    let mut m = waiting_session();
    m.handle_response(distance_reply(1));
    assert_eq!(m.handle_response(distance_reply(1)), ResponseDisposition::Duplicate);
}

#[test]
fn reply_is_rendered_on_next_poll() {
    let cam = camera();
    let mut m = waiting_session();
    m.handle_response(distance_reply(1));

    let actions = m.update(&cam, 0.0);

    assert!(actions.contains(&Action::RenderNeeded));
    assert_eq!(m.state(), MeasureState::Ready);
    assert_eq!(m.pending_token(), None);
    assert!(m.panel().is_visible());
    assert_eq!(m.panel().content().title, "Distance");
    assert_eq!(m.annotations().len(), 2);
}

#[test]
fn slot_is_checked_once_per_poll_interval() {
    let cam = camera();
    let mut m = waiting_session();
    m.update(&cam, 0.0);
    m.handle_response(distance_reply(1));

    m.update(&cam, 50.0);
    assert_eq!(m.state(), MeasureState::Waiting { token: RequestToken(1) });

    m.update(&cam, 100.0);
    assert_eq!(m.state(), MeasureState::Ready);
}

#[test]
fn missing_reply_times_out() {
    let cam = camera();
    let mut m = waiting_session();
    m.update(&cam, 0.0);

    assert!(m.update(&cam, 9_900.0).is_empty());
    let actions = m.update(&cam, 10_000.0);

    assert_eq!(actions, vec![Action::MeasurementUnavailable { tool: ToolType::Distance }]);
    assert_eq!(m.state(), MeasureState::Unavailable);
    assert!(!m.panel().is_visible());
    assert_eq!(m.handle_response(distance_reply(1)), ResponseDisposition::Stale);
}

#[test]
fn timeout_runs_from_first_frame_after_request() {
    let cam = camera();
    let mut m = waiting_session();
    m.update(&cam, 5_000.0);

    m.update(&cam, 14_900.0);
    assert_eq!(m.state(), MeasureState::Waiting { token: RequestToken(1) });

    m.update(&cam, 15_000.0);
    assert_eq!(m.state(), MeasureState::Unavailable);
}

#[test]
fn new_selection_after_timeout_issues_fresh_request() {
    let cam = camera();
    let mut m = waiting_session();
    m.update(&cam, 0.0);
    m.update(&cam, 10_000.0);

    let actions = m.handle_selection(face(3), true, false);
    assert_eq!(requests(&actions)[0].token, RequestToken(2));
    assert_eq!(m.state(), MeasureState::Waiting { token: RequestToken(2) });
}

// =============================================================
// Panel placement and leash
// =============================================================

#[test]
fn first_placement_offsets_from_projected_middle() {
    let cam = camera();
    let m = ready_session(&cam);
    // Middle (1.5, 0, 2) projects to (490, 180); default offset is (+40, -80).
    let pos = m.panel_position().unwrap();
    assert!(approx_eq(pos.x, 530.0));
    assert!(approx_eq(pos.y, 100.0));
    assert_eq!(m.panel().position(), pos);
}

#[test]
fn first_placement_is_clamped_into_canvas() {
    let cam = camera();
    let mut m = waiting_session();
    let mut reply = distance_reply(1);
    reply.refpoint1 = [6.0, 0.0, 4.5];
    reply.refpoint2 = [6.0, 0.0, 4.5];
    m.handle_response(reply);
    m.update(&cam, 0.0);

    let pos = m.panel_position().unwrap();
    assert!(approx_eq(pos.x, 600.0));
    assert!(approx_eq(pos.y, 0.0));
}

#[test]
fn leash_runs_from_middle_to_panel_center() {
    let cam = camera();
    let m = ready_session(&cam);
    let leash = &m.annotations().arrows()[1];

    assert!(approx_eq(leash.start().x, 1.5));
    assert!(approx_eq(leash.start().z, 2.0));
    // Panel center pixel (630, 145) lifts to world x = 230/60, z = 155/60.
    assert!(approx_eq(leash.end().x, 230.0 / 60.0));
    assert!(approx_eq(leash.end().z, 155.0 / 60.0));
    assert_eq!(m.panel_center(), Some(leash.end()));
}

#[test]
fn panel_anchor_sits_at_feature_depth_under_orthographic() {
    let cam = camera();
    let m = ready_session(&cam);
    let center = m.panel_center().unwrap();
    // The reference points lie in the y = 0 plane.
    assert!(approx_eq(center.y, 0.0));
}

#[test]
fn panel_anchor_keeps_middle_depth_under_perspective() {
    let cam = Camera::perspective(
        WorldPoint::new(0.0, -10.0, 0.0),
        WorldPoint::origin(),
        60f64.to_radians(),
        CanvasSize::new(800.0, 600.0),
    );
    let m = ready_session(&cam);
    let center = m.panel_center().unwrap();
    let middle = m.kind().middle_point().unwrap();

    let px = cam.world_to_pixel(&center);
    let rect_center = m.panel().rect().center();
    assert!(approx_eq(px.x, rect_center.x));
    assert!(approx_eq(px.y, rect_center.y));
    assert!(approx_eq(cam.project(&center).z, cam.project(&middle).z));
    assert_eq!(m.annotations().arrows()[1].end(), center);
}

#[test]
fn measurement_segment_spans_reference_points() {
    let cam = camera();
    let m = ready_session(&cam);
    let segment = &m.annotations().arrows()[0];
    assert_eq!(segment.start(), WorldPoint::new(0.0, 0.0, 0.0));
    assert_eq!(segment.end(), WorldPoint::new(3.0, 0.0, 4.0));
    assert_eq!(segment.cones().len(), 2);
}

#[test]
fn arrows_shrink_as_camera_zooms_in() {
    let mut cam = camera();
    let mut m = ready_session(&cam);
    cam.zoom = 2.0;
    m.update(&cam, 16.0);
    for arrow in m.annotations().arrows() {
        assert_eq!(arrow.scale(), 0.5);
    }
}

#[test]
fn leash_follows_camera_changes() {
    let mut cam = camera();
    let mut m = ready_session(&cam);
    let before = m.panel_center().unwrap();
    cam.zoom = 2.0;
    m.update(&cam, 16.0);
    let after = m.panel_center().unwrap();
    assert!(!approx_eq(before.x, after.x));
    assert_eq!(m.annotations().arrows()[1].end(), after);
}

#[test]
fn hiding_resets_panel_position() {
    let cam = camera();
    let mut m = ready_session(&cam);
    m.remove_last_selected(false);
    assert_eq!(m.panel_position(), None);
    assert_eq!(m.panel_center(), None);
    assert!(m.annotations().is_empty());
    assert!(!m.panel().is_visible());
}

#[test]
fn new_request_hides_previous_result_until_reply() {
    let cam = camera();
    let mut m = ready_session(&cam);
    m.handle_selection(face(3), true, false);
    assert!(!m.panel().is_visible());
    assert!(m.annotations().is_empty());
    assert!(m.kind().result().is_none());
}

// =============================================================
// Panel drag
// =============================================================

#[test]
fn drag_moves_panel_by_pointer_delta() {
    let cam = camera();
    let mut m = ready_session(&cam);

    m.on_pointer(PointerKind::Down, ScreenPoint::new(600.0, 120.0), &cam);
    assert!(m.drag_state().is_dragging());
    let actions = m.on_pointer(PointerKind::Move, ScreenPoint::new(580.0, 150.0), &cam);

    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert_eq!(m.panel_position(), Some(ScreenPoint::new(510.0, 130.0)));
    assert_eq!(m.panel().position(), ScreenPoint::new(510.0, 130.0));
}

#[test]
fn drag_reaims_leash_without_new_request() {
    let cam = camera();
    let mut m = ready_session(&cam);
    let before = m.panel_center().unwrap();

    m.on_pointer(PointerKind::Down, ScreenPoint::new(600.0, 120.0), &cam);
    let actions = m.on_pointer(PointerKind::Move, ScreenPoint::new(540.0, 120.0), &cam);

    assert!(requests(&actions).is_empty());
    let after = m.panel_center().unwrap();
    assert!(approx_eq(after.x, before.x - 1.0));
    assert_eq!(m.annotations().arrows()[1].end(), after);
    assert_eq!(m.state(), MeasureState::Ready);
}

#[test]
fn drag_past_canvas_edge_blocks_that_axis() {
    let cam = camera();
    let mut m = ready_session(&cam);

    m.on_pointer(PointerKind::Down, ScreenPoint::new(600.0, 120.0), &cam);
    m.on_pointer(PointerKind::Move, ScreenPoint::new(700.0, 130.0), &cam);

    assert_eq!(m.panel_position(), Some(ScreenPoint::new(530.0, 110.0)));
}

#[test]
fn pointer_down_outside_panel_does_not_drag() {
    let cam = camera();
    let mut m = ready_session(&cam);
    m.on_pointer(PointerKind::Down, ScreenPoint::new(10.0, 10.0), &cam);
    assert!(!m.drag_state().is_dragging());
    assert!(m.on_pointer(PointerKind::Move, ScreenPoint::new(20.0, 20.0), &cam).is_empty());
}

#[test]
fn pointer_up_ends_drag() {
    let cam = camera();
    let mut m = ready_session(&cam);
    m.on_pointer(PointerKind::Down, ScreenPoint::new(600.0, 120.0), &cam);
    m.on_pointer(PointerKind::Up, ScreenPoint::new(600.0, 120.0), &cam);
    assert_eq!(m.drag_state(), DragState::Idle);
}

#[test]
fn hidden_panel_cannot_be_dragged() {
    let cam = camera();
    let mut m = waiting_session();
    m.on_pointer(PointerKind::Down, ScreenPoint::new(0.0, 0.0), &cam);
    assert!(!m.drag_state().is_dragging());
}

// =============================================================
// Context
// =============================================================

#[test]
fn enable_context_subscribes_pointer_events_once() {
    let mut bus = EventBus::new();
    let mut m = session();
    m.enable_context(&mut bus);
    m.enable_context(&mut bus);
    assert!(m.is_context_enabled());
    assert_eq!(bus.len(), 3);
    assert!(bus.wants(ToolType::Distance, PointerKind::Move));
}

#[test]
fn disable_context_releases_everything() {
    let cam = camera();
    let mut bus = EventBus::new();
    let mut m = session();
    m.enable_context(&mut bus);
    m.handle_selection(face(1), true, false);
    m.handle_selection(face(2), true, false);
    m.handle_response(distance_reply(1));
    m.update(&cam, 0.0);

    let actions = m.disable_context(&mut bus);

    assert_eq!(cleared(&actions).len(), 2);
    assert_eq!(actions.last(), Some(&Action::SelectionCleared { tool: ToolType::Distance }));
    assert!(bus.is_empty());
    assert!(!m.is_context_enabled());
    assert!(m.selection().is_empty());
    assert!(!m.panel().is_visible());
    assert!(m.annotations().is_empty());
    assert_eq!(m.state(), MeasureState::Idle);
}

#[test]
fn reply_after_disable_is_stale() {
    let mut bus = EventBus::new();
    let mut m = waiting_session();
    m.disable_context(&mut bus);
    assert_eq!(m.handle_response(distance_reply(1)), ResponseDisposition::Stale);
}

// =============================================================
// Properties session
// =============================================================

#[test]
fn properties_requests_on_single_pick() {
    let mut m = PropertiesMeasurement::new(MeasureConfig::default());
    let actions = m.handle_selection(face(7), true, false);
    let reqs = requests(&actions);
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].tool_type, ToolType::Properties);
    assert_eq!(reqs[0].shape_ids, vec!["body/faces/faces_7"]);
}

#[test]
fn properties_new_pick_replaces_selection() {
    let mut m = PropertiesMeasurement::new(MeasureConfig::default());
    m.handle_selection(face(1), true, false);
    let actions = m.handle_selection(face(2), true, false);
    assert_eq!(cleared(&actions), vec!["body|faces|faces_1"]);
    assert_eq!(m.selection().len(), 1);
    assert_eq!(m.pending_token(), Some(RequestToken(2)));
}

#[test]
fn properties_ready_draws_single_leash() {
    let cam = camera();
    let mut m = PropertiesMeasurement::new(MeasureConfig::default());
    m.handle_selection(face(1), true, false);
    m.handle_response(properties_reply(1));
    m.update(&cam, 0.0);

    assert_eq!(m.state(), MeasureState::Ready);
    assert_eq!(m.annotations().len(), 1);
    let leash = &m.annotations().arrows()[0];
    assert_eq!(leash.start(), WorldPoint::new(1.0, 0.0, 1.0));
    assert!(leash.cones().is_empty());
}

#[test]
fn cleared_kind_has_no_middle_point() {
    let mut kind = Distance::default();
    kind.accept(&distance_reply(1));
    assert!(kind.middle_point().is_some());
    kind.clear();
    assert!(kind.middle_point().is_none());
}
