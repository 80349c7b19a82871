use fieldkit_core::{shared, GeoPoint, ScreenPoint, UiDataCallback};
use fieldkit_editor::{attach, MapSurface, PointerEvent, PointerKind, PolygonRegistry, Projection, SessionKind};
use std::collections::HashMap;
use std::rc::Rc;

/// Map host stand-in that records callbacks and lets the test fire them.
#[derive(Default)]
struct FakeMap {
    camera_idle: Vec<UiDataCallback<Rc<dyn Projection>>>,
    pointer: HashMap<PointerKind, Vec<UiDataCallback<PointerEvent>>>,
}

impl FakeMap {
    fn settle_camera(&self) {
        let projection: Rc<dyn Projection> =
            Rc::new(|p: GeoPoint| Some(ScreenPoint::new(p.lng * 1e5, -p.lat * 1e5)));
        for callback in &self.camera_idle {
            callback(projection.clone());
        }
    }

    fn fire(&self, kind: PointerKind, position: GeoPoint) {
        for callback in self.pointer.get(&kind).into_iter().flatten() {
            callback(PointerEvent::at(kind, position));
        }
    }
}

impl MapSurface for FakeMap {
    fn on_camera_idle(&mut self, callback: UiDataCallback<Rc<dyn Projection>>) {
        self.camera_idle.push(callback);
    }

    fn on_pointer_event(&mut self, kind: PointerKind, callback: UiDataCallback<PointerEvent>) {
        self.pointer.entry(kind).or_default().push(callback);
    }
}

#[test]
fn test_attach_registers_every_pointer_kind() {
    let mut map = FakeMap::default();
    attach(&mut map, shared(PolygonRegistry::default()));
    assert_eq!(map.camera_idle.len(), 1);
    for kind in PointerKind::ALL {
        assert_eq!(map.pointer.get(&kind).map(Vec::len), Some(1), "{:?}", kind);
    }
}

#[test]
fn test_attached_registry_draws_from_clicks() {
    let mut map = FakeMap::default();
    let registry = shared(PolygonRegistry::default());
    attach(&mut map, registry.clone());

    registry.borrow_mut().start_drawing(SessionKind::Field).unwrap();
    for p in [
        GeoPoint::new(0.0, 0.0),
        GeoPoint::new(0.0, 0.001),
        GeoPoint::new(0.001, 0.001),
    ] {
        map.fire(PointerKind::Click, p);
    }
    map.fire(PointerKind::DoubleClick, GeoPoint::new(0.001, 0.001));
    map.settle_camera();

    let registry = registry.borrow();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.labels().visible_labels().count(), 4);
}

#[test]
fn test_rejected_events_leave_state_unchanged() {
    let mut map = FakeMap::default();
    let registry = shared(PolygonRegistry::default());
    attach(&mut map, registry.clone());

    registry.borrow_mut().start_drawing(SessionKind::Field).unwrap();
    map.fire(PointerKind::Click, GeoPoint::new(0.0, 0.0));
    // Too few vertices: logged, drawing continues.
    map.fire(PointerKind::DoubleClick, GeoPoint::new(0.0, 0.0));
    assert_eq!(registry.borrow().draft_vertices().map(<[GeoPoint]>::len), Some(1));
}
