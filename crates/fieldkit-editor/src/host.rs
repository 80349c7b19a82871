//! Contracts with the map host.
//!
//! The engine never talks to a map SDK directly. The host supplies a
//! [`Projection`] whenever the camera settles and forwards pointer events;
//! [`attach`] wires both to a shared [`PolygonRegistry`].

use fieldkit_core::{GeoPoint, ScreenPoint, Shared, UiDataCallback};
use std::rc::Rc;

use crate::edit_session::MarkerHit;
use crate::model::FieldId;
use crate::registry::PolygonRegistry;

/// Converts geographic coordinates into host pixels.
///
/// `None` means the point is off-screen or the map is not ready; labels at
/// such points are hidden, never clamped to the viewport edge.
pub trait Projection {
    fn project_to_screen(&self, point: GeoPoint) -> Option<ScreenPoint>;
}

impl<F> Projection for F
where
    F: Fn(GeoPoint) -> Option<ScreenPoint>,
{
    fn project_to_screen(&self, point: GeoPoint) -> Option<ScreenPoint> {
        self(point)
    }
}

/// Pointer event kinds the host forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Click,
    DoubleClick,
    DragStart,
    DragMove,
    DragEnd,
}

impl PointerKind {
    pub const ALL: [PointerKind; 5] = [
        PointerKind::Click,
        PointerKind::DoubleClick,
        PointerKind::DragStart,
        PointerKind::DragMove,
        PointerKind::DragEnd,
    ];
}

/// A pointer event in map coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// Pointer position on the map.
    pub position: GeoPoint,
    /// Pointer position in pixels, used for marker hit-testing when the host
    /// did not resolve `target` itself.
    pub screen: Option<ScreenPoint>,
    /// Edit marker under the pointer, if the host resolved it.
    pub target: Option<MarkerHit>,
    /// Field outline under the pointer.
    pub field: Option<FieldId>,
}

impl PointerEvent {
    /// An event with no screen position or hit information.
    pub fn at(kind: PointerKind, position: GeoPoint) -> Self {
        Self {
            kind,
            position,
            screen: None,
            target: None,
            field: None,
        }
    }

    pub fn with_screen(mut self, screen: ScreenPoint) -> Self {
        self.screen = Some(screen);
        self
    }

    pub fn with_target(mut self, target: MarkerHit) -> Self {
        self.target = Some(target);
        self
    }

    pub fn on_field(mut self, field: FieldId) -> Self {
        self.field = Some(field);
        self
    }
}

/// Callback registration surface implemented by the map host.
pub trait MapSurface {
    /// Called once the camera stops moving, with a projection valid for the
    /// new viewport.
    fn on_camera_idle(&mut self, callback: UiDataCallback<Rc<dyn Projection>>);

    /// Called for every pointer event of `kind`.
    fn on_pointer_event(&mut self, kind: PointerKind, callback: UiDataCallback<PointerEvent>);
}

/// Routes a surface's camera and pointer callbacks into `registry`.
///
/// Engine errors raised by pointer events are logged and otherwise ignored;
/// the registry state is unchanged when an operation fails.
pub fn attach<S>(surface: &mut S, registry: Shared<PolygonRegistry>)
where
    S: MapSurface + ?Sized,
{
    let camera_registry = registry.clone();
    surface.on_camera_idle(Box::new(move |projection| {
        match camera_registry.try_borrow_mut() {
            Ok(mut registry) => registry.camera_idle(projection),
            Err(_) => tracing::warn!("Registry busy, camera idle dropped"),
        }
    }));

    for kind in PointerKind::ALL {
        let pointer_registry = registry.clone();
        surface.on_pointer_event(
            kind,
            Box::new(move |event| match pointer_registry.try_borrow_mut() {
                Ok(mut registry) => {
                    if let Err(e) = registry.handle_pointer(event) {
                        tracing::warn!("{:?} at {} rejected: {}", event.kind, event.position, e);
                    }
                }
                Err(_) => tracing::warn!("Registry busy, {:?} dropped", event.kind),
            }),
        );
    }
}
