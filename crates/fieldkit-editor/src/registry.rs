//! Polygon registry
//!
//! Owns every field, the single active session, the selection and the
//! label overlay. All host input goes through here:
//!
//! - drawing: `start_drawing` / `add_point` / `close_drawing` / `cancel_drawing`
//! - editing: `select` / `with_edit_session` / `deselect`
//! - history: `undo` / `redo`, routed to whichever session is active
//! - pointer events: `handle_pointer`
//!
//! At most one session is active. Starting a new one while another is in
//! progress resolves the old one first (a drawing with enough vertices is
//! finalised, otherwise discarded; an edit is committed) and reports what
//! happened as a [`SessionResolution`].

use fieldkit_core::{GeoPoint, ScreenPoint};
use fieldkit_settings::{Config, LabelSettings};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tokio::sync::broadcast;

use crate::draw::{DrawStateMachine, SessionKind};
use crate::edit_session::{EditSession, MarkerHit};
use crate::error::{EngineError, EngineResult};
use crate::events::{EngineEvent, EventDispatcher, SessionTag};
use crate::host::{PointerEvent, PointerKind, Projection};
use crate::labels::{LabelOwner, OverlayLabelManager};
use crate::metrics::LiveMetrics;
use crate::model::{FieldId, FieldPolygon, FieldStyle, MeasuredPath};

/// Registry behaviour derived from the user configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorOptions {
    pub undo_depth: usize,
    pub hit_tolerance_px: f64,
    pub field_name_prefix: String,
    pub default_style: FieldStyle,
    /// Stroke colour of the selected field.
    pub selected_stroke_color: String,
    pub labels: LabelSettings,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for EditorOptions {
    fn from(config: &Config) -> Self {
        Self {
            undo_depth: config.editor.undo_depth.max(1),
            hit_tolerance_px: config.editor.hit_tolerance_px,
            field_name_prefix: config.editor.field_name_prefix.clone(),
            default_style: FieldStyle::from(&config.style).sanitized(),
            selected_stroke_color: config.style.selected_stroke_color.clone(),
            labels: config.labels.clone(),
        }
    }
}

/// The one active session.
#[derive(Debug, Default)]
pub enum Session {
    #[default]
    Idle,
    Drawing(DrawStateMachine),
    Editing(EditSession),
}

impl Session {
    pub fn tag(&self) -> Option<SessionTag> {
        match self {
            Session::Idle => None,
            Session::Drawing(draw) => Some(SessionTag::Drawing(draw.kind())),
            Session::Editing(edit) => Some(SessionTag::Editing(edit.field_id())),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Session::Idle => "idle",
            Session::Drawing(_) => "drawing",
            Session::Editing(_) => "editing",
        }
    }
}

/// How a session that was still active got resolved when a new one started.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionResolution {
    /// Nothing was active.
    NoConflict,
    /// A drawing had enough vertices and became this field.
    FinalizedPrevious(FieldId),
    /// A distance path had enough vertices and was measured.
    MeasuredPrevious(MeasuredPath),
    /// A drawing had too few vertices and was dropped.
    DiscardedPrevious,
    /// An edit of this field was committed.
    CommittedEdit(FieldId),
}

/// Result of closing a drawing session.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOutcome {
    Field(FieldId),
    Path(MeasuredPath),
}

/// How a field is presented right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonInteraction {
    Viewing,
    Selected,
    EditingVertex(usize),
    EditingEdge(usize),
}

/// Owner of all fields and the active session.
pub struct PolygonRegistry {
    fields: HashMap<FieldId, FieldPolygon>,
    session: Session,
    labels: OverlayLabelManager,
    projection: Option<Rc<dyn Projection>>,
    options: EditorOptions,
    next_sequence: u64,
    events: EventDispatcher,
}

impl PolygonRegistry {
    pub fn new(options: EditorOptions) -> Self {
        Self {
            fields: HashMap::new(),
            session: Session::Idle,
            labels: OverlayLabelManager::new(options.labels.clone()),
            projection: None,
            options,
            next_sequence: 0,
            events: EventDispatcher::default(),
        }
    }

    pub fn with_config(config: &Config) -> Self {
        Self::new(EditorOptions::from(config))
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Subscribe to engine events.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // ========== Drawing ==========

    /// Starts a drawing session, failing if any session is active.
    pub fn try_start_drawing(&mut self, kind: SessionKind) -> EngineResult<()> {
        if !matches!(self.session, Session::Idle) {
            return Err(EngineError::ConcurrentSessionConflict {
                active: self.session.label(),
            });
        }
        self.start_drawing(kind).map(|_| ())
    }

    /// Starts a drawing session, resolving any active session first.
    pub fn start_drawing(&mut self, kind: SessionKind) -> EngineResult<SessionResolution> {
        let resolution = self.resolve_active_session();

        let mut draw = DrawStateMachine::new(self.options.undo_depth);
        draw.start(kind)?;
        let tag = SessionTag::Drawing(kind);
        self.session = Session::Drawing(draw);
        self.sync_draft_labels();
        self.events.publish(EngineEvent::SessionStarted(tag));
        Ok(resolution)
    }

    /// Adds a point to the drawing in progress.
    pub fn add_point(&mut self, point: GeoPoint) -> EngineResult<()> {
        self.drawing_mut()?.add_point(point)?;
        self.sync_draft_labels();
        Ok(())
    }

    /// Closes the drawing in progress into a field or measured path.
    ///
    /// On failure the drawing stays active and unchanged.
    pub fn close_drawing(&mut self) -> EngineResult<DrawOutcome> {
        let draw = self.drawing_mut()?;
        let kind = draw.kind();
        let vertices = draw.close()?;

        self.session = Session::Idle;
        self.labels.remove_owner(LabelOwner::Draft);
        self.events
            .publish(EngineEvent::SessionEnded(SessionTag::Drawing(kind)));
        Ok(self.materialize(kind, vertices))
    }

    /// Abandons the drawing in progress.
    pub fn cancel_drawing(&mut self) -> EngineResult<()> {
        let draw = self.drawing_mut()?;
        let kind = draw.kind();
        draw.cancel();

        self.session = Session::Idle;
        self.labels.remove_owner(LabelOwner::Draft);
        self.events
            .publish(EngineEvent::SessionEnded(SessionTag::Drawing(kind)));
        Ok(())
    }

    /// Vertices of the drawing in progress.
    pub fn draft_vertices(&self) -> Option<&[GeoPoint]> {
        match &self.session {
            Session::Drawing(draw) => Some(draw.vertices()),
            _ => None,
        }
    }

    /// Live metrics of the active drawing or edit.
    pub fn live_metrics(&self) -> Option<LiveMetrics> {
        match &self.session {
            Session::Idle => None,
            Session::Drawing(draw) => Some(draw.metrics()),
            Session::Editing(edit) => Some(edit.metrics()),
        }
    }

    // ========== Selection and editing ==========

    /// Selects a field and opens an edit session on it.
    pub fn select(&mut self, id: FieldId) -> EngineResult<SessionResolution> {
        if !self.fields.contains_key(&id) {
            return Err(EngineError::UnknownField(id));
        }
        if self.selected() == Some(id) {
            return Ok(SessionResolution::NoConflict);
        }

        let resolution = self.resolve_active_session();
        let Some(field) = self.fields.get(&id) else {
            return Err(EngineError::UnknownField(id));
        };
        let edit = EditSession::new(id, field.vertices.clone(), self.options.undo_depth);
        self.session = Session::Editing(edit);
        self.events
            .publish(EngineEvent::SessionStarted(SessionTag::Editing(id)));
        self.events.publish(EngineEvent::SelectionChanged(Some(id)));
        Ok(resolution)
    }

    /// Commits the active edit and clears the selection.
    ///
    /// Returns the field that was selected, if any.
    pub fn deselect(&mut self) -> Option<FieldId> {
        if !matches!(self.session, Session::Editing(_)) {
            return None;
        }
        let Session::Editing(edit) = std::mem::take(&mut self.session) else {
            return None;
        };
        let id = self.commit_edit(edit);
        self.events.publish(EngineEvent::SelectionChanged(None));
        Some(id)
    }

    /// Deselects `id` if it is selected, otherwise selects it.
    pub fn toggle_selection(&mut self, id: FieldId) -> EngineResult<()> {
        if self.selected() == Some(id) {
            self.deselect();
            Ok(())
        } else {
            self.select(id).map(|_| ())
        }
    }

    pub fn selected(&self) -> Option<FieldId> {
        match &self.session {
            Session::Editing(edit) => Some(edit.field_id()),
            _ => None,
        }
    }

    /// Runs an operation on the active edit session, then pushes the edited
    /// vertices to the field and its labels.
    pub fn with_edit_session<R, F>(&mut self, f: F) -> EngineResult<R>
    where
        F: FnOnce(&mut EditSession) -> EngineResult<R>,
    {
        let Session::Editing(edit) = &mut self.session else {
            return Err(EngineError::NoActiveSession { expected: "editing" });
        };
        let result = f(edit);

        if let Some(field) = self.fields.get_mut(&edit.field_id()) {
            if field.vertices.as_slice() != edit.vertices() {
                field.vertices = edit.vertices().to_vec();
                sync_field_labels(&mut self.labels, field);
            }
        }
        result
    }

    /// Read access to the active edit session.
    pub fn edit_session(&self) -> Option<&EditSession> {
        match &self.session {
            Session::Editing(edit) => Some(edit),
            _ => None,
        }
    }

    /// Cancels the drag in progress, restoring the pre-drag outline.
    pub fn cancel_gesture(&mut self) -> EngineResult<()> {
        self.with_edit_session(|edit| edit.cancel_drag())
    }

    /// Marker of the selected field under `screen`, using the last projection.
    pub fn hit_test(&self, screen: ScreenPoint) -> Option<MarkerHit> {
        let edit = self.edit_session()?;
        let projection = self.projection.as_deref()?;
        edit.hit_test(screen, projection, self.options.hit_tolerance_px)
    }

    // ========== History ==========

    /// Undoes the last change of the active session.
    pub fn undo(&mut self) -> EngineResult<()> {
        match &mut self.session {
            Session::Idle => Err(EngineError::NoActiveSession {
                expected: "drawing or editing",
            }),
            Session::Drawing(draw) => {
                draw.undo()?;
                self.sync_draft_labels();
                Ok(())
            }
            Session::Editing(_) => self.with_edit_session(|edit| edit.undo()),
        }
    }

    /// Redoes the last undone change of the active session.
    pub fn redo(&mut self) -> EngineResult<()> {
        match &mut self.session {
            Session::Idle => Err(EngineError::NoActiveSession {
                expected: "drawing or editing",
            }),
            Session::Drawing(draw) => {
                draw.redo()?;
                self.sync_draft_labels();
                Ok(())
            }
            Session::Editing(_) => self.with_edit_session(|edit| edit.redo()),
        }
    }

    pub fn can_undo(&self) -> bool {
        match &self.session {
            Session::Idle => false,
            Session::Drawing(draw) => draw.can_undo(),
            Session::Editing(edit) => edit.can_undo(),
        }
    }

    pub fn can_redo(&self) -> bool {
        match &self.session {
            Session::Idle => false,
            Session::Drawing(draw) => draw.can_redo(),
            Session::Editing(edit) => edit.can_redo(),
        }
    }

    // ========== Field commands ==========

    /// Removes a field, its labels and any edit session on it.
    pub fn delete(&mut self, id: FieldId) -> EngineResult<FieldPolygon> {
        let Some(field) = self.fields.remove(&id) else {
            return Err(EngineError::UnknownField(id));
        };

        if self.selected() == Some(id) {
            self.session = Session::Idle;
            self.events
                .publish(EngineEvent::SessionEnded(SessionTag::Editing(id)));
            self.events.publish(EngineEvent::SelectionChanged(None));
        }
        self.labels.remove_owner(LabelOwner::Field(id));
        tracing::info!("Deleted field {} ({})", id, field.name);
        self.events.publish(EngineEvent::FieldDeleted(id));
        Ok(field)
    }

    pub fn set_style(&mut self, id: FieldId, style: FieldStyle) -> EngineResult<()> {
        let field = self.fields.get_mut(&id).ok_or(EngineError::UnknownField(id))?;
        field.style = style.sanitized();
        field.touch();
        self.events.publish(EngineEvent::FieldUpdated(id));
        Ok(())
    }

    pub fn rename(&mut self, id: FieldId, name: impl Into<String>) -> EngineResult<()> {
        let field = self.fields.get_mut(&id).ok_or(EngineError::UnknownField(id))?;
        field.name = name.into();
        field.touch();
        sync_field_labels(&mut self.labels, field);
        self.events.publish(EngineEvent::FieldUpdated(id));
        Ok(())
    }

    /// Registers fields loaded from a store. Fields with fewer than three
    /// vertices are skipped. Returns the number registered.
    pub fn load_fields(&mut self, fields: Vec<FieldPolygon>) -> usize {
        let mut loaded = 0;
        for field in fields {
            if field.vertices.len() < 3 {
                tracing::warn!(
                    "Skipping field {} with {} vertices",
                    field.id,
                    field.vertices.len()
                );
                continue;
            }
            self.next_sequence = self.next_sequence.max(field.sequence.saturating_add(1));
            sync_field_labels(&mut self.labels, &field);
            self.fields.insert(field.id, field);
            loaded += 1;
        }
        tracing::info!("Loaded {} fields", loaded);
        loaded
    }

    // ========== Presentation ==========

    pub fn field(&self, id: FieldId) -> Option<&FieldPolygon> {
        self.fields.get(&id)
    }

    /// All fields in creation order.
    pub fn fields(&self) -> Vec<&FieldPolygon> {
        let mut fields: Vec<_> = self.fields.values().collect();
        fields.sort_by_key(|field| field.sequence);
        fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_vertices(&self, id: FieldId) -> Option<&[GeoPoint]> {
        self.fields.get(&id).map(|field| field.vertices.as_slice())
    }

    pub fn field_area_m2(&self, id: FieldId) -> Option<f64> {
        self.fields.get(&id).map(FieldPolygon::area_m2)
    }

    pub fn field_perimeter_m(&self, id: FieldId) -> Option<f64> {
        self.fields.get(&id).map(FieldPolygon::perimeter_m)
    }

    /// Paint order, bottom to top: creation order with the selected field last.
    pub fn render_order(&self) -> Vec<FieldId> {
        let selected = self.selected();
        let mut order: Vec<FieldId> = self.fields().iter().map(|field| field.id).collect();
        if let Some(id) = selected {
            order.retain(|other| *other != id);
            order.push(id);
        }
        order
    }

    /// Style to paint `id` with, highlighting the selection.
    pub fn display_style(&self, id: FieldId) -> Option<FieldStyle> {
        let field = self.fields.get(&id)?;
        let mut style = field.style.clone();
        if self.selected() == Some(id) {
            style.stroke_color = self.options.selected_stroke_color.clone();
        }
        Some(style)
    }

    pub fn interaction(&self, id: FieldId) -> PolygonInteraction {
        use crate::edit_session::InteractionState;

        match &self.session {
            Session::Editing(edit) if edit.field_id() == id => match edit.interaction() {
                InteractionState::Selected => PolygonInteraction::Selected,
                InteractionState::EditingVertex(i) => PolygonInteraction::EditingVertex(i),
                InteractionState::EditingEdge(i) => PolygonInteraction::EditingEdge(i),
            },
            _ => PolygonInteraction::Viewing,
        }
    }

    pub fn labels(&self) -> &OverlayLabelManager {
        &self.labels
    }

    // ========== Host input ==========

    /// Camera settled: reproject every label. Vertices are not touched.
    pub fn camera_idle(&mut self, projection: Rc<dyn Projection>) {
        self.labels.reproject(projection.clone());
        self.projection = Some(projection);
    }

    /// Dispatches a host pointer event.
    ///
    /// - click: adds a point while drawing, otherwise toggles the clicked
    ///   field or commits the edit when the map background is clicked
    /// - double-click: closes the drawing
    /// - drag start/move/end on a marker of the selected field: reshapes it
    ///
    /// Drags that start off a marker belong to the map (panning) and are
    /// ignored.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> EngineResult<()> {
        let drawing = matches!(self.session, Session::Drawing(_));
        let editing = matches!(self.session, Session::Editing(_));

        match event.kind {
            PointerKind::Click if drawing => self.add_point(event.position),
            PointerKind::Click => match event.field {
                Some(id) => self.toggle_selection(id),
                None => {
                    self.deselect();
                    Ok(())
                }
            },
            PointerKind::DoubleClick if drawing => self.close_drawing().map(|_| ()),
            PointerKind::DragStart if editing => {
                let target = event
                    .target
                    .or_else(|| event.screen.and_then(|screen| self.hit_test(screen)));
                match target {
                    Some(MarkerHit::Vertex(i)) => self.with_edit_session(|edit| edit.begin_vertex_drag(i)),
                    Some(MarkerHit::Midpoint(i)) => self.with_edit_session(|edit| edit.begin_edge_drag(i)),
                    None => Ok(()),
                }
            }
            PointerKind::DragMove if self.is_dragging() => {
                self.with_edit_session(|edit| edit.drag_to(event.position))
            }
            PointerKind::DragEnd if self.is_dragging() => {
                self.with_edit_session(|edit| edit.end_drag().map(|_| ()))
            }
            PointerKind::DoubleClick
            | PointerKind::DragStart
            | PointerKind::DragMove
            | PointerKind::DragEnd => Ok(()),
        }
    }

    fn is_dragging(&self) -> bool {
        self.edit_session().is_some_and(EditSession::is_dragging)
    }

    // ========== Internals ==========

    fn drawing_mut(&mut self) -> EngineResult<&mut DrawStateMachine> {
        match &mut self.session {
            Session::Drawing(draw) => Ok(draw),
            _ => Err(EngineError::NoActiveSession { expected: "drawing" }),
        }
    }

    fn sync_draft_labels(&mut self) {
        if let Session::Drawing(draw) = &self.session {
            self.labels.sync_owner(
                LabelOwner::Draft,
                draw.vertices(),
                draw.kind().is_closed(),
                None,
            );
        }
    }

    /// Ends whatever session is active so a new one can start.
    fn resolve_active_session(&mut self) -> SessionResolution {
        let resolution = match std::mem::take(&mut self.session) {
            Session::Idle => return SessionResolution::NoConflict,
            Session::Drawing(mut draw) => {
                let kind = draw.kind();
                self.labels.remove_owner(LabelOwner::Draft);
                self.events
                    .publish(EngineEvent::SessionEnded(SessionTag::Drawing(kind)));
                match draw.close() {
                    Ok(vertices) => match self.materialize(kind, vertices) {
                        DrawOutcome::Field(id) => SessionResolution::FinalizedPrevious(id),
                        DrawOutcome::Path(path) => SessionResolution::MeasuredPrevious(path),
                    },
                    Err(_) => {
                        draw.cancel();
                        SessionResolution::DiscardedPrevious
                    }
                }
            }
            Session::Editing(edit) => {
                let id = self.commit_edit(edit);
                self.events.publish(EngineEvent::SelectionChanged(None));
                SessionResolution::CommittedEdit(id)
            }
        };
        tracing::warn!("Resolved active session: {:?}", resolution);
        resolution
    }

    fn commit_edit(&mut self, edit: EditSession) -> FieldId {
        let id = edit.field_id();
        let modified = edit.is_modified();
        let vertices = edit.finish();

        if let Some(field) = self.fields.get_mut(&id) {
            if modified {
                field.set_vertices(vertices);
            } else {
                field.vertices = vertices;
            }
            sync_field_labels(&mut self.labels, field);
        }
        self.events
            .publish(EngineEvent::SessionEnded(SessionTag::Editing(id)));
        if modified {
            self.events.publish(EngineEvent::FieldUpdated(id));
        }
        id
    }

    fn materialize(&mut self, kind: SessionKind, vertices: Vec<GeoPoint>) -> DrawOutcome {
        match kind {
            SessionKind::Field => {
                let sequence = self.next_sequence;
                self.next_sequence = sequence.saturating_add(1);
                let name = format!(
                    "{} {}",
                    self.options.field_name_prefix,
                    sequence.saturating_add(1)
                );
                let mut field = FieldPolygon::new(name, vertices, self.options.default_style.clone());
                field.sequence = sequence;
                let id = field.id;

                tracing::info!(
                    "Created field {} ({}) with {} vertices",
                    id,
                    field.name,
                    field.vertices.len()
                );
                sync_field_labels(&mut self.labels, &field);
                self.fields.insert(id, field);
                self.events.publish(EngineEvent::FieldCreated(id));
                DrawOutcome::Field(id)
            }
            SessionKind::DistancePath => {
                let path = MeasuredPath::new(vertices);
                tracing::info!("Measured path of {:.1} m", path.length_m);
                self.events.publish(EngineEvent::PathMeasured {
                    length_m: path.length_m,
                });
                DrawOutcome::Path(path)
            }
        }
    }
}

impl Default for PolygonRegistry {
    fn default() -> Self {
        Self::new(EditorOptions::default())
    }
}

impl fmt::Debug for PolygonRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolygonRegistry")
            .field("fields", &self.fields.len())
            .field("session", &self.session.tag())
            .field("labels", &self.labels)
            .field("options", &self.options)
            .finish()
    }
}

fn sync_field_labels(labels: &mut OverlayLabelManager, field: &FieldPolygon) {
    labels.sync_owner(
        LabelOwner::Field(field.id),
        &field.vertices,
        true,
        Some(&field.name),
    );
}
