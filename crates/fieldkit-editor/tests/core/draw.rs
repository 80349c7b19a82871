use fieldkit_core::GeoPoint;
use fieldkit_editor::{DrawState, DrawStateMachine, EngineError, SessionKind};

fn square() -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(0.0, 0.0),
        GeoPoint::new(0.0, 0.001),
        GeoPoint::new(0.001, 0.001),
        GeoPoint::new(0.001, 0.0),
    ]
}

#[test]
fn test_draw_square_and_close() {
    let mut draw = DrawStateMachine::new(100);
    assert_eq!(draw.state(), DrawState::Idle);
    draw.start(SessionKind::Field).unwrap();

    for p in square() {
        draw.add_point(p).unwrap();
    }
    let metrics = draw.metrics();
    assert_eq!(metrics.vertex_count, 4);
    assert!(metrics.closed);
    let first = metrics.edge_lengths[0];
    for length in &metrics.edge_lengths {
        assert!((length - first).abs() < 1e-6);
    }

    let vertices = draw.close().unwrap();
    assert_eq!(vertices, square());
    assert_eq!(draw.state(), DrawState::Closed);
    assert!(!draw.can_undo());
}

#[test]
fn test_close_failure_keeps_drawing() {
    let mut draw = DrawStateMachine::new(100);
    draw.start(SessionKind::Field).unwrap();
    assert_eq!(
        draw.close(),
        Err(EngineError::InsufficientVertices {
            required: 3,
            actual: 0
        })
    );
    draw.add_point(GeoPoint::new(1.0, 1.0)).unwrap();
    assert_eq!(draw.vertices().len(), 1);
    assert_eq!(draw.state(), DrawState::Drawing);
}

#[test]
fn test_restart_after_close() {
    let mut draw = DrawStateMachine::new(100);
    draw.start(SessionKind::DistancePath).unwrap();
    draw.add_point(GeoPoint::new(0.0, 0.0)).unwrap();
    draw.add_point(GeoPoint::new(0.0, 0.01)).unwrap();
    draw.close().unwrap();

    draw.start(SessionKind::Field).unwrap();
    assert!(draw.vertices().is_empty());
    assert_eq!(draw.kind(), SessionKind::Field);
    assert_eq!(draw.metrics().vertex_count, 0);
}

#[test]
fn test_undo_depth_is_bounded() {
    let mut draw = DrawStateMachine::new(2);
    draw.start(SessionKind::Field).unwrap();
    for p in square() {
        draw.add_point(p).unwrap();
    }
    draw.undo().unwrap();
    draw.undo().unwrap();
    assert!(draw.undo().is_err());
    assert_eq!(draw.vertices(), &square()[..2]);
}
