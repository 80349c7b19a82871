use fieldkit_core::GeoPoint;
use fieldkit_editor::{EditSession, FieldId, HistoryError, Snapshot, UndoRedoStack};
use proptest::prelude::*;

fn snapshot(points: &[(f64, f64)]) -> Snapshot {
    points.iter().map(|&(lat, lng)| GeoPoint::new(lat, lng)).collect()
}

#[test]
fn test_undo_redo_manager_creation() {
    let stack: UndoRedoStack<Snapshot> = UndoRedoStack::with_depth(50);
    assert!(!stack.can_undo());
    assert!(!stack.can_redo());
    assert_eq!(stack.undo_depth(), 0);
    assert_eq!(stack.redo_depth(), 0);
}

#[test]
fn test_undo_on_empty_stack() {
    let mut stack = UndoRedoStack::new();
    assert_eq!(stack.undo(snapshot(&[])), Err(HistoryError::NothingToUndo));
    assert_eq!(stack.redo(snapshot(&[])), Err(HistoryError::NothingToRedo));
}

#[test]
fn test_clear_history() {
    let mut stack = UndoRedoStack::new();
    stack.record(snapshot(&[(1.0, 1.0)]));
    stack.record(snapshot(&[(1.0, 1.0), (2.0, 2.0)]));
    let _ = stack.undo(snapshot(&[])).unwrap();
    stack.clear();
    assert!(!stack.can_undo());
    assert!(!stack.can_redo());
}

proptest! {
    /// Walking all the way back and forward again reproduces every state bit for bit.
    #[test]
    fn undo_then_redo_restores_identical_vertices(
        states in prop::collection::vec(
            prop::collection::vec((-80.0f64..80.0, -179.0f64..179.0), 0..8),
            1..12,
        )
    ) {
        let states: Vec<Snapshot> = states.iter().map(|s| snapshot(s)).collect();
        let mut stack = UndoRedoStack::new();
        let mut current = snapshot(&[]);
        for state in &states {
            stack.record(current.clone());
            current = state.clone();
        }
        let last = current.clone();

        for _ in 0..states.len() {
            current = stack.undo(current).unwrap();
        }
        prop_assert!(current.is_empty());
        prop_assert!(!stack.can_undo());

        for expected in &states {
            current = stack.redo(current).unwrap();
            prop_assert_eq!(&current, expected);
        }
        prop_assert_eq!(current, last);
        prop_assert!(!stack.can_redo());
    }
}

#[derive(Debug, Clone)]
enum EditOp {
    MoveVertex { index: usize, dlat: f64, dlng: f64 },
    InsertOnEdge { edge: usize, dlat: f64, dlng: f64 },
    Remove { index: usize },
    SetLength { edge: usize, length_m: f64 },
}

fn edit_op() -> impl Strategy<Value = EditOp> {
    let offset = -0.0005f64..0.0005;
    prop_oneof![
        (0usize..16, offset.clone(), offset.clone())
            .prop_map(|(index, dlat, dlng)| EditOp::MoveVertex { index, dlat, dlng }),
        (0usize..16, offset.clone(), offset)
            .prop_map(|(edge, dlat, dlng)| EditOp::InsertOnEdge { edge, dlat, dlng }),
        (0usize..16).prop_map(|index| EditOp::Remove { index }),
        (0usize..16, 1.0f64..500.0).prop_map(|(edge, length_m)| EditOp::SetLength { edge, length_m }),
    ]
}

/// Applies `op` with indices wrapped to the current vertex count.
fn apply(session: &mut EditSession, op: &EditOp) {
    let n = session.vertices().len();
    match *op {
        EditOp::MoveVertex { index, dlat, dlng } => {
            let index = index % n;
            let p = session.vertices()[index];
            session.begin_vertex_drag(index).unwrap();
            session.drag_to(GeoPoint::new(p.lat + dlat, p.lng + dlng)).unwrap();
            session.end_drag().unwrap();
        }
        EditOp::InsertOnEdge { edge, dlat, dlng } => {
            let edge = edge % n;
            let p = session.vertices()[edge];
            session.begin_edge_drag(edge).unwrap();
            session.drag_to(GeoPoint::new(p.lat + dlat, p.lng + dlng)).unwrap();
            session.end_drag().unwrap();
        }
        EditOp::Remove { index } => {
            // Fails on a triangle, which records nothing.
            let _ = session.remove_vertex(index % n);
        }
        EditOp::SetLength { edge, length_m } => {
            session.set_edge_length(edge % n, length_m).unwrap();
        }
    }
}

proptest! {
    /// Random edits through a session, then a full undo and redo walk,
    /// revisit every recorded outline exactly.
    #[test]
    fn session_edits_undo_and_redo_exactly(ops in prop::collection::vec(edit_op(), 1..24)) {
        let square = snapshot(&[(0.0, 0.0), (0.0, 0.001), (0.001, 0.001), (0.001, 0.0)]);
        let mut session = EditSession::new(FieldId::new(), square.clone(), 100);
        let mut states = vec![square];

        for op in &ops {
            let depth = session.undo_depth();
            apply(&mut session, op);
            if session.undo_depth() > depth {
                states.push(session.vertices().to_vec());
            } else {
                prop_assert_eq!(session.vertices(), states[states.len() - 1].as_slice());
            }
        }

        for expected in states.iter().rev().skip(1) {
            session.undo().unwrap();
            prop_assert_eq!(session.vertices(), expected.as_slice());
        }
        prop_assert!(!session.can_undo());

        for expected in states.iter().skip(1) {
            session.redo().unwrap();
            prop_assert_eq!(session.vertices(), expected.as_slice());
        }
        prop_assert!(!session.can_redo());
    }
}
