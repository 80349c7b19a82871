//! Edge length and field title labels.
//!
//! Every label has a geographic anchor and, once projected, a screen
//! position. Anchors and text are recomputed by [`OverlayLabelManager::sync_owner`]
//! whenever an outline changes; screen positions are recomputed from the
//! most recent projection, which the host refreshes on camera idle.

use fieldkit_core::geometry;
use fieldkit_core::{format_area_hectares, format_distance, GeoPoint, ScreenPoint};
use fieldkit_settings::LabelSettings;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::host::Projection;
use crate::metrics::LiveMetrics;
use crate::model::FieldId;

/// Outline a label belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LabelOwner {
    Field(FieldId),
    /// The outline of the drawing session in progress.
    Draft,
}

/// Identifies one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LabelKey {
    /// Length label of the edge starting at the given vertex index.
    Edge(LabelOwner, usize),
    /// Name/area label of a field, or the live banner of the draft.
    Title(LabelOwner),
}

impl LabelKey {
    pub fn owner(&self) -> LabelOwner {
        match self {
            LabelKey::Edge(owner, _) | LabelKey::Title(owner) => *owner,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    EdgeLength,
    FieldTitle,
    LiveBanner,
}

/// A positioned text label.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub key: LabelKey,
    pub kind: LabelKind,
    pub anchor: GeoPoint,
    pub text: String,
    /// `None` while the anchor cannot be projected; the label is hidden.
    pub screen: Option<ScreenPoint>,
}

impl Label {
    pub fn is_visible(&self) -> bool {
        self.screen.is_some()
    }
}

/// Keeps labels in step with outlines and the camera.
pub struct OverlayLabelManager {
    labels: BTreeMap<LabelKey, Label>,
    settings: LabelSettings,
    projection: Option<Rc<dyn Projection>>,
}

impl OverlayLabelManager {
    pub fn new(settings: LabelSettings) -> Self {
        Self {
            labels: BTreeMap::new(),
            settings,
            projection: None,
        }
    }

    /// Rebuilds every label of `owner` from its vertices.
    ///
    /// `title` is the field name; the draft shows live area and perimeter
    /// instead. Labels disabled in the settings are not created.
    pub fn sync_owner(&mut self, owner: LabelOwner, vertices: &[GeoPoint], closed: bool, title: Option<&str>) {
        self.remove_owner(owner);

        if self.settings.show_edge_labels {
            for (i, a, b) in geometry::edges(vertices, closed) {
                let key = LabelKey::Edge(owner, i);
                let label = self.make_label(
                    key,
                    LabelKind::EdgeLength,
                    geometry::midpoint(a, b),
                    format_distance(geometry::distance(a, b)),
                );
                self.labels.insert(key, label);
            }
        }

        let Some(center) = geometry::centroid(vertices) else {
            return;
        };
        let title = match owner {
            LabelOwner::Field(_) if self.settings.show_field_labels => {
                let area = geometry::polygon_area(vertices);
                Some((
                    LabelKind::FieldTitle,
                    format!("{}\n{}", title.unwrap_or_default(), format_area_hectares(area)),
                ))
            }
            LabelOwner::Draft if self.settings.show_live_banner && vertices.len() >= 2 => Some((
                LabelKind::LiveBanner,
                LiveMetrics::compute(vertices, closed).to_string(),
            )),
            _ => None,
        };
        if let Some((kind, text)) = title {
            let key = LabelKey::Title(owner);
            let label = self.make_label(key, kind, center, text);
            self.labels.insert(key, label);
        }
    }

    /// Replaces the cached projection and recomputes every screen position.
    ///
    /// Only labels move; anchors and text are untouched.
    pub fn reproject(&mut self, projection: Rc<dyn Projection>) {
        for label in self.labels.values_mut() {
            label.screen = projection.project_to_screen(label.anchor);
        }
        self.projection = Some(projection);
        tracing::debug!(
            "Reprojected {} labels, {} visible",
            self.labels.len(),
            self.visible_labels().count()
        );
    }

    /// Drops every label of `owner`.
    pub fn remove_owner(&mut self, owner: LabelOwner) {
        self.labels.retain(|key, _| key.owner() != owner);
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }

    /// All labels, ordered by owner then edge index.
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.values()
    }

    /// Labels with a screen position.
    pub fn visible_labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.values().filter(|label| label.is_visible())
    }

    /// Labels of one owner.
    pub fn labels_for(&self, owner: LabelOwner) -> impl Iterator<Item = &Label> {
        self.labels.values().filter(move |label| label.key.owner() == owner)
    }

    pub fn label(&self, key: &LabelKey) -> Option<&Label> {
        self.labels.get(key)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn settings(&self) -> &LabelSettings {
        &self.settings
    }

    fn make_label(&self, key: LabelKey, kind: LabelKind, anchor: GeoPoint, text: String) -> Label {
        let screen = self
            .projection
            .as_ref()
            .and_then(|projection| projection.project_to_screen(anchor));
        Label {
            key,
            kind,
            anchor,
            text,
            screen,
        }
    }
}

impl Default for OverlayLabelManager {
    fn default() -> Self {
        Self::new(LabelSettings::default())
    }
}

impl fmt::Debug for OverlayLabelManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayLabelManager")
            .field("labels", &self.labels.len())
            .field("settings", &self.settings)
            .field("projected", &self.projection.is_some())
            .finish()
    }
}
