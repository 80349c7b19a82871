use fieldkit_core::{GeoPoint, ScreenPoint};
use fieldkit_editor::{
    DrawOutcome, EngineError, EngineEvent, FieldId, FieldPolygon, FieldStyle, LabelKey, LabelOwner,
    MarkerHit, PointerEvent, PointerKind, PolygonInteraction, PolygonRegistry, Projection, Session,
    SessionKind, SessionResolution, SessionTag,
};
use std::rc::Rc;

fn square_at(lat: f64, lng: f64) -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(lat, lng),
        GeoPoint::new(lat, lng + 0.001),
        GeoPoint::new(lat + 0.001, lng + 0.001),
        GeoPoint::new(lat + 0.001, lng),
    ]
}

fn draw(registry: &mut PolygonRegistry, vertices: &[GeoPoint]) -> FieldId {
    registry.start_drawing(SessionKind::Field).unwrap();
    for p in vertices {
        registry.add_point(*p).unwrap();
    }
    match registry.close_drawing().unwrap() {
        DrawOutcome::Field(id) => id,
        other => panic!("expected field, got {:?}", other),
    }
}

/// 1e-5 degrees per pixel with the origin at (0, 0).
fn flat_projection() -> Rc<dyn Projection> {
    Rc::new(|p: GeoPoint| Some(ScreenPoint::new(p.lng * 1e5, -p.lat * 1e5)))
}

#[test]
fn test_new_drawing_finalises_previous_with_three_points() {
    let mut registry = PolygonRegistry::default();
    registry.start_drawing(SessionKind::Field).unwrap();
    for p in &square_at(0.0, 0.0)[..3] {
        registry.add_point(*p).unwrap();
    }

    let resolution = registry.start_drawing(SessionKind::Field).unwrap();
    let SessionResolution::FinalizedPrevious(id) = resolution else {
        panic!("expected finalisation, got {:?}", resolution);
    };
    assert_eq!(registry.field(id).unwrap().vertices.len(), 3);
    assert!(matches!(registry.session(), Session::Drawing(_)));
    assert_eq!(registry.draft_vertices(), Some(&[][..]));
}

#[test]
fn test_new_drawing_discards_previous_with_two_points() {
    let mut registry = PolygonRegistry::default();
    registry.start_drawing(SessionKind::Field).unwrap();
    registry.add_point(GeoPoint::new(0.0, 0.0)).unwrap();
    registry.add_point(GeoPoint::new(0.0, 0.001)).unwrap();

    assert_eq!(
        registry.start_drawing(SessionKind::Field).unwrap(),
        SessionResolution::DiscardedPrevious
    );
    assert!(registry.is_empty());
}

#[test]
fn test_selecting_commits_drawing_and_editing_commits_on_draw() {
    let mut registry = PolygonRegistry::default();
    let a = draw(&mut registry, &square_at(0.0, 0.0));

    registry.start_drawing(SessionKind::DistancePath).unwrap();
    registry.add_point(GeoPoint::new(0.0, 0.0)).unwrap();
    registry.add_point(GeoPoint::new(0.0, 0.01)).unwrap();
    let resolution = registry.select(a).unwrap();
    assert!(matches!(resolution, SessionResolution::MeasuredPrevious(ref path) if path.length_m > 1000.0));
    assert_eq!(registry.len(), 1);

    assert_eq!(
        registry.start_drawing(SessionKind::Field).unwrap(),
        SessionResolution::CommittedEdit(a)
    );
    assert_eq!(registry.selected(), None);
}

#[test]
fn test_close_with_too_few_points_keeps_session() {
    let mut registry = PolygonRegistry::default();
    registry.start_drawing(SessionKind::Field).unwrap();
    registry.add_point(GeoPoint::new(0.0, 0.0)).unwrap();
    assert_eq!(
        registry.close_drawing(),
        Err(EngineError::InsufficientVertices {
            required: 3,
            actual: 1
        })
    );
    assert_eq!(registry.draft_vertices().map(<[GeoPoint]>::len), Some(1));

    registry.cancel_drawing().unwrap();
    assert!(matches!(registry.session(), Session::Idle));
    assert_eq!(registry.labels().labels_for(LabelOwner::Draft).count(), 0);
}

#[test]
fn test_render_order_puts_selection_on_top() {
    let mut registry = PolygonRegistry::default();
    let a = draw(&mut registry, &square_at(0.0, 0.0));
    let b = draw(&mut registry, &square_at(0.01, 0.0));
    let c = draw(&mut registry, &square_at(0.02, 0.0));
    assert_eq!(registry.render_order(), vec![a, b, c]);

    registry.select(a).unwrap();
    assert_eq!(registry.render_order(), vec![b, c, a]);
    assert_eq!(registry.interaction(a), PolygonInteraction::Selected);
    assert_eq!(registry.interaction(b), PolygonInteraction::Viewing);

    registry.toggle_selection(a).unwrap();
    assert_eq!(registry.render_order(), vec![a, b, c]);
}

#[test]
fn test_delete_selected_field() {
    let mut registry = PolygonRegistry::default();
    let a = draw(&mut registry, &square_at(0.0, 0.0));
    registry.select(a).unwrap();
    registry.with_edit_session(|edit| edit.set_edge_length(0, 150.0)).unwrap();

    let removed = registry.delete(a).unwrap();
    assert_eq!(removed.id, a);
    assert!(matches!(registry.session(), Session::Idle));
    assert!(!registry.can_undo());
    assert!(registry.labels().is_empty());
    assert_eq!(registry.delete(a), Err(EngineError::UnknownField(a)));
    assert_eq!(registry.select(a), Err(EngineError::UnknownField(a)));
}

#[test]
fn test_undo_routes_to_active_session() {
    let mut registry = PolygonRegistry::default();
    let a = draw(&mut registry, &square_at(0.0, 0.0));
    registry.select(a).unwrap();
    registry.with_edit_session(|edit| edit.set_edge_length(0, 150.0)).unwrap();
    let edge_label = registry.labels().label(&LabelKey::Edge(LabelOwner::Field(a), 0)).unwrap();
    assert_eq!(edge_label.text, "150 m");

    registry.undo().unwrap();
    assert_eq!(registry.field_vertices(a).unwrap(), square_at(0.0, 0.0).as_slice());
    let edge_label = registry.labels().label(&LabelKey::Edge(LabelOwner::Field(a), 0)).unwrap();
    assert_eq!(edge_label.text, "111 m");

    registry.redo().unwrap();
    let v = registry.field_vertices(a).unwrap();
    assert!((fieldkit_core::geometry::distance(v[0], v[1]) - 150.0).abs() < 1e-6);
    assert!(registry.field_perimeter_m(a).unwrap() > 4.0 * 111.0);
}

#[test]
fn test_pointer_draw_and_close() {
    let mut registry = PolygonRegistry::default();
    registry.start_drawing(SessionKind::Field).unwrap();
    for p in square_at(0.0, 0.0) {
        registry.handle_pointer(PointerEvent::at(PointerKind::Click, p)).unwrap();
    }
    registry
        .handle_pointer(PointerEvent::at(PointerKind::DoubleClick, GeoPoint::new(0.0, 0.0)))
        .unwrap();
    assert_eq!(registry.len(), 1);
    assert!(matches!(registry.session(), Session::Idle));
}

#[test]
fn test_pointer_drag_on_hit_tested_marker() {
    let mut registry = PolygonRegistry::default();
    let a = draw(&mut registry, &square_at(0.0, 0.0));
    registry.camera_idle(flat_projection());

    registry
        .handle_pointer(PointerEvent::at(PointerKind::Click, GeoPoint::new(0.0005, 0.0005)).on_field(a))
        .unwrap();
    assert_eq!(registry.selected(), Some(a));

    // Vertex 2 sits at (100, -100) px.
    assert_eq!(registry.hit_test(ScreenPoint::new(101.0, -99.0)), Some(MarkerHit::Vertex(2)));
    registry
        .handle_pointer(
            PointerEvent::at(PointerKind::DragStart, GeoPoint::new(0.001, 0.001))
                .with_screen(ScreenPoint::new(101.0, -99.0)),
        )
        .unwrap();
    assert_eq!(registry.interaction(a), PolygonInteraction::EditingVertex(2));

    let target = GeoPoint::new(0.002, 0.002);
    for kind in [PointerKind::DragMove, PointerKind::DragMove, PointerKind::DragEnd] {
        registry.handle_pointer(PointerEvent::at(kind, target)).unwrap();
    }
    assert_eq!(registry.interaction(a), PolygonInteraction::Selected);
    assert_eq!(registry.field_vertices(a).unwrap()[2], target);
    assert_eq!(registry.edit_session().unwrap().undo_depth(), 1);

    // A click on the map background commits the edit.
    registry
        .handle_pointer(PointerEvent::at(PointerKind::Click, GeoPoint::new(1.0, 1.0)))
        .unwrap();
    assert_eq!(registry.selected(), None);
    assert_eq!(registry.field(a).unwrap().vertices[2], target);
}

#[test]
fn test_drag_on_map_background_is_ignored() {
    let mut registry = PolygonRegistry::default();
    let a = draw(&mut registry, &square_at(0.0, 0.0));
    registry.select(a).unwrap();
    for kind in [PointerKind::DragStart, PointerKind::DragMove, PointerKind::DragEnd] {
        registry
            .handle_pointer(PointerEvent::at(kind, GeoPoint::new(5.0, 5.0)))
            .unwrap();
    }
    assert_eq!(registry.field_vertices(a).unwrap(), square_at(0.0, 0.0).as_slice());
}

#[test]
fn test_cancel_gesture_restores_outline() {
    let mut registry = PolygonRegistry::default();
    let a = draw(&mut registry, &square_at(0.0, 0.0));
    registry.select(a).unwrap();
    registry
        .handle_pointer(
            PointerEvent::at(PointerKind::DragStart, GeoPoint::new(0.0, 0.0005))
                .with_target(MarkerHit::Midpoint(0)),
        )
        .unwrap();
    registry
        .handle_pointer(PointerEvent::at(PointerKind::DragMove, GeoPoint::new(-0.0003, 0.0005)))
        .unwrap();
    assert_eq!(registry.field_vertices(a).unwrap().len(), 5);
    assert_eq!(registry.undo(), Err(EngineError::GestureInProgress));

    registry.cancel_gesture().unwrap();
    assert_eq!(registry.field_vertices(a).unwrap(), square_at(0.0, 0.0).as_slice());
    assert!(!registry.can_undo());
}

#[test]
fn test_camera_idle_only_moves_labels() {
    let mut registry = PolygonRegistry::default();
    let a = draw(&mut registry, &square_at(0.0, 0.0));
    assert_eq!(registry.labels().visible_labels().count(), 0);

    registry.camera_idle(flat_projection());
    assert_eq!(registry.labels().visible_labels().count(), 5);
    assert_eq!(registry.field_vertices(a).unwrap(), square_at(0.0, 0.0).as_slice());

    registry.camera_idle(Rc::new(|_: GeoPoint| -> Option<ScreenPoint> { None }));
    assert_eq!(registry.labels().visible_labels().count(), 0);
    assert_eq!(registry.labels().len(), 5);
}

#[test]
fn test_load_fields_continues_sequence() {
    let mut stored = FieldPolygon::new("Stored", square_at(0.0, 0.0), FieldStyle::default());
    stored.sequence = 7;
    let broken = FieldPolygon::new("Broken", square_at(0.0, 0.0)[..2].to_vec(), FieldStyle::default());

    let mut registry = PolygonRegistry::default();
    assert_eq!(registry.load_fields(vec![stored.clone(), broken]), 1);
    let created = draw(&mut registry, &square_at(0.01, 0.0));
    assert_eq!(registry.field(created).unwrap().sequence, 8);
    assert_eq!(registry.field(created).unwrap().name, "Field 9");
    assert_eq!(registry.render_order(), vec![stored.id, created]);
}

#[test]
fn test_load_fields_with_maximal_sequence() {
    let mut stored = FieldPolygon::new("Stored", square_at(0.0, 0.0), FieldStyle::default());
    stored.sequence = u64::MAX;

    let mut registry = PolygonRegistry::default();
    assert_eq!(registry.load_fields(vec![stored.clone()]), 1);
    let created = draw(&mut registry, &square_at(0.01, 0.0));
    let field = registry.field(created).unwrap();
    assert_eq!(field.sequence, u64::MAX);
    assert_eq!(field.name, format!("Field {}", u64::MAX));
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_style_and_rename() {
    let mut registry = PolygonRegistry::default();
    let a = draw(&mut registry, &square_at(0.0, 0.0));
    let mut events = registry.subscribe();

    registry.rename(a, "Orchard").unwrap();
    let title = registry.labels().label(&LabelKey::Title(LabelOwner::Field(a))).unwrap();
    assert!(title.text.starts_with("Orchard\n"));

    let style = FieldStyle {
        fill_opacity: 2.0,
        ..FieldStyle::default()
    };
    registry.set_style(a, style).unwrap();
    assert_eq!(registry.field(a).unwrap().style.fill_opacity, 1.0);

    assert_eq!(events.try_recv().unwrap(), EngineEvent::FieldUpdated(a));
    assert_eq!(events.try_recv().unwrap(), EngineEvent::FieldUpdated(a));
    assert!(registry.rename(FieldId::new(), "x").is_err());
}

#[test]
fn test_lifecycle_events() {
    let mut registry = PolygonRegistry::default();
    let mut events = registry.subscribe();
    let a = draw(&mut registry, &square_at(0.0, 0.0));

    let received: Vec<_> = std::iter::from_fn(|| events.try_recv().ok()).collect();
    assert_eq!(
        received,
        vec![
            EngineEvent::SessionStarted(SessionTag::Drawing(SessionKind::Field)),
            EngineEvent::SessionEnded(SessionTag::Drawing(SessionKind::Field)),
            EngineEvent::FieldCreated(a),
        ]
    );

    registry.delete(a).unwrap();
    assert_eq!(events.try_recv().unwrap(), EngineEvent::FieldDeleted(a));
}
