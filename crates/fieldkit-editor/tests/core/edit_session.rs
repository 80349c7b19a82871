use fieldkit_core::geometry;
use fieldkit_core::GeoPoint;
use fieldkit_editor::{EditSession, EngineError, FieldId, InteractionState, LengthEdit};

fn square() -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(0.0, 0.0),
        GeoPoint::new(0.0, 0.001),
        GeoPoint::new(0.001, 0.001),
        GeoPoint::new(0.001, 0.0),
    ]
}

#[test]
fn test_square_scenario_double_edge_zero() {
    let mut edit = EditSession::new(FieldId::new(), square(), 100);
    let metrics = edit.metrics();
    assert!(metrics.area_m2.abs() > 0.0);
    assert_eq!(metrics.edge_lengths.len(), 4);

    let before = edit.vertices().to_vec();
    let doubled = 2.0 * metrics.edge_lengths[0];
    assert_eq!(
        edit.set_edge_length(0, doubled).unwrap(),
        LengthEdit::Applied { moved: 1 }
    );

    let after = edit.vertices();
    for i in [0, 2, 3] {
        assert_eq!(after[i], before[i], "vertex {} must not move", i);
    }
    assert!((geometry::distance(after[0], after[1]) - doubled).abs() < 1e-6 * doubled);
    assert_eq!(edit.undo_depth(), 1);
}

#[test]
fn test_drag_through_many_positions_is_one_undo_entry() {
    let mut edit = EditSession::new(FieldId::new(), square(), 100);
    edit.begin_vertex_drag(1).unwrap();
    for step in 0..50 {
        let t = step as f64 * 1e-5;
        edit.drag_to(GeoPoint::new(-t, 0.001 + t)).unwrap();
    }
    assert!(edit.end_drag().unwrap());
    assert_eq!(edit.undo_depth(), 1);

    edit.undo().unwrap();
    assert_eq!(edit.vertices(), square().as_slice());
    edit.redo().unwrap();
    let t = 49.0 * 1e-5;
    assert_eq!(edit.vertices()[1], GeoPoint::new(-t, 0.001 + t));
}

#[test]
fn test_insertion_drag_then_undo_removes_vertex() {
    let mut edit = EditSession::new(FieldId::new(), square(), 100);
    edit.begin_edge_drag(1).unwrap();
    assert_eq!(edit.interaction(), InteractionState::EditingEdge(1));
    assert_eq!(edit.vertices().len(), 4);

    edit.drag_to(GeoPoint::new(0.0005, 0.0012)).unwrap();
    edit.drag_to(GeoPoint::new(0.0005, 0.0015)).unwrap();
    assert_eq!(edit.vertices().len(), 5);
    assert_eq!(edit.vertices()[2], GeoPoint::new(0.0005, 0.0015));
    edit.end_drag().unwrap();
    assert_eq!(edit.undo_depth(), 1);

    edit.undo().unwrap();
    assert_eq!(edit.vertices(), square().as_slice());
}

#[test]
fn test_out_of_range_indices_are_rejected() {
    let mut edit = EditSession::new(FieldId::new(), square(), 100);
    assert_eq!(
        edit.begin_vertex_drag(4),
        Err(EngineError::IndexOutOfRange { index: 4, len: 4 })
    );
    assert_eq!(
        edit.begin_edge_drag(7),
        Err(EngineError::IndexOutOfRange { index: 7, len: 4 })
    );
    assert!(edit.remove_vertex(9).is_err());
    assert_eq!(edit.drag_to(GeoPoint::new(0.0, 0.0)), Err(EngineError::NoGesture));
    assert_eq!(edit.end_drag(), Err(EngineError::NoGesture));
    assert_eq!(edit.vertices(), square().as_slice());
}

#[test]
fn test_typed_length_in_feet() {
    let mut edit = EditSession::new(FieldId::new(), square(), 100);
    edit.set_edge_length_text(0, "500 ft").unwrap();
    let v = edit.vertices();
    assert!((geometry::distance(v[0], v[1]) - 152.4).abs() < 1e-6);
}

#[test]
fn test_redo_cleared_by_new_edit() {
    let mut edit = EditSession::new(FieldId::new(), square(), 100);
    edit.set_edge_length(0, 150.0).unwrap();
    edit.undo().unwrap();
    assert!(edit.can_redo());
    edit.set_edge_length(1, 150.0).unwrap();
    assert!(!edit.can_redo());
}
