//! Boundary to the map library: overlay primitives and viewport control.

use std::collections::BTreeMap;

use shared::domain::{AppMode, Bounds, GeoPoint, MarkerId, PolylineId, PopupId};

pub const EXPLORER_ROUTE_COLOR: &str = "#CC0099";
pub const PLANNER_ROUTE_COLOR: &str = "#2196F3";

#[derive(Debug, Clone, PartialEq)]
pub struct DashPattern {
    pub path: String,
    pub scale: f64,
    pub repeat_px: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolylineStyle {
    pub stroke_color: String,
    pub stroke_opacity: f64,
    pub stroke_weight: u32,
    pub dash: Option<DashPattern>,
}

impl PolylineStyle {
    pub fn for_mode(mode: AppMode) -> Self {
        match mode {
            AppMode::Explorer => Self {
                stroke_color: EXPLORER_ROUTE_COLOR.to_string(),
                stroke_opacity: 1.0,
                stroke_weight: 3,
                dash: None,
            },
            AppMode::Planner => Self {
                stroke_color: PLANNER_ROUTE_COLOR.to_string(),
                stroke_opacity: 1.0,
                stroke_weight: 4,
                dash: Some(DashPattern {
                    path: "M 0,-1 0,1".to_string(),
                    scale: 3.0,
                    repeat_px: 15,
                }),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupContent {
    pub title: String,
    pub body: String,
    /// "time • duration" line shown under the description.
    pub schedule: Option<String>,
}

impl PopupContent {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        time: Option<&str>,
        duration: Option<&str>,
    ) -> Self {
        let schedule = time.map(|time| match duration {
            Some(duration) => format!("{time} • {duration}"),
            None => time.to_string(),
        });
        Self {
            title: title.into(),
            body: body.into(),
            schedule,
        }
    }
}

pub trait MapSurface: Send {
    fn create_marker(&mut self, position: GeoPoint, title: &str) -> MarkerId;
    fn remove_marker(&mut self, marker: MarkerId);
    fn create_polyline(&mut self, path: [GeoPoint; 2], style: &PolylineStyle) -> PolylineId;
    fn remove_polyline(&mut self, polyline: PolylineId);
    /// Popups start detached.
    fn create_popup(&mut self, position: GeoPoint, content: &PopupContent) -> PopupId;
    fn set_popup_attached(&mut self, popup: PopupId, attached: bool);
    fn remove_popup(&mut self, popup: PopupId);
    fn fit_viewport(&mut self, bounds: &Bounds);
    fn pan_to(&mut self, point: GeoPoint);
}

impl<T> MapSurface for Box<T>
where
    T: MapSurface + ?Sized,
{
    fn create_marker(&mut self, position: GeoPoint, title: &str) -> MarkerId {
        (**self).create_marker(position, title)
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        (**self).remove_marker(marker)
    }

    fn create_polyline(&mut self, path: [GeoPoint; 2], style: &PolylineStyle) -> PolylineId {
        (**self).create_polyline(path, style)
    }

    fn remove_polyline(&mut self, polyline: PolylineId) {
        (**self).remove_polyline(polyline)
    }

    fn create_popup(&mut self, position: GeoPoint, content: &PopupContent) -> PopupId {
        (**self).create_popup(position, content)
    }

    fn set_popup_attached(&mut self, popup: PopupId, attached: bool) {
        (**self).set_popup_attached(popup, attached)
    }

    fn remove_popup(&mut self, popup: PopupId) {
        (**self).remove_popup(popup)
    }

    fn fit_viewport(&mut self, bounds: &Bounds) {
        (**self).fit_viewport(bounds)
    }

    fn pan_to(&mut self, point: GeoPoint) {
        (**self).pan_to(point)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapCommand {
    CreateMarker {
        marker: MarkerId,
        position: GeoPoint,
        title: String,
    },
    RemoveMarker(MarkerId),
    CreatePolyline {
        polyline: PolylineId,
        path: [GeoPoint; 2],
        style: PolylineStyle,
    },
    RemovePolyline(PolylineId),
    CreatePopup {
        popup: PopupId,
        position: GeoPoint,
        content: PopupContent,
    },
    SetPopupAttached {
        popup: PopupId,
        attached: bool,
    },
    RemovePopup(PopupId),
    FitViewport(Bounds),
    PanTo(GeoPoint),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopupOverlay {
    pub position: GeoPoint,
    pub content: PopupContent,
    pub attached: bool,
}

/// In-memory map that keeps live overlays plus a log of every call.
#[derive(Debug, Default)]
pub struct RecordingMap {
    next_id: u64,
    commands: Vec<MapCommand>,
    markers: BTreeMap<MarkerId, (GeoPoint, String)>,
    polylines: BTreeMap<PolylineId, [GeoPoint; 2]>,
    popups: BTreeMap<PopupId, PopupOverlay>,
    viewport: Option<Bounds>,
    center: Option<GeoPoint>,
}

impl RecordingMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn record(&mut self, command: MapCommand) {
        tracing::trace!(?command, "map command");
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[MapCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<MapCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn polyline_count(&self) -> usize {
        self.polylines.len()
    }

    pub fn popup(&self, popup: PopupId) -> Option<&PopupOverlay> {
        self.popups.get(&popup)
    }

    pub fn popup_count(&self) -> usize {
        self.popups.len()
    }

    pub fn attached_popups(&self) -> Vec<PopupId> {
        self.popups
            .iter()
            .filter(|(_, overlay)| overlay.attached)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn viewport(&self) -> Option<Bounds> {
        self.viewport
    }

    pub fn center(&self) -> Option<GeoPoint> {
        self.center
    }
}

impl MapSurface for RecordingMap {
    fn create_marker(&mut self, position: GeoPoint, title: &str) -> MarkerId {
        let marker = MarkerId(self.allocate());
        self.markers.insert(marker, (position, title.to_string()));
        self.record(MapCommand::CreateMarker {
            marker,
            position,
            title: title.to_string(),
        });
        marker
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        self.markers.remove(&marker);
        self.record(MapCommand::RemoveMarker(marker));
    }

    fn create_polyline(&mut self, path: [GeoPoint; 2], style: &PolylineStyle) -> PolylineId {
        let polyline = PolylineId(self.allocate());
        self.polylines.insert(polyline, path);
        self.record(MapCommand::CreatePolyline {
            polyline,
            path,
            style: style.clone(),
        });
        polyline
    }

    fn remove_polyline(&mut self, polyline: PolylineId) {
        self.polylines.remove(&polyline);
        self.record(MapCommand::RemovePolyline(polyline));
    }

    fn create_popup(&mut self, position: GeoPoint, content: &PopupContent) -> PopupId {
        let popup = PopupId(self.allocate());
        self.popups.insert(
            popup,
            PopupOverlay {
                position,
                content: content.clone(),
                attached: false,
            },
        );
        self.record(MapCommand::CreatePopup {
            popup,
            position,
            content: content.clone(),
        });
        popup
    }

    fn set_popup_attached(&mut self, popup: PopupId, attached: bool) {
        if let Some(overlay) = self.popups.get_mut(&popup) {
            overlay.attached = attached;
        }
        self.record(MapCommand::SetPopupAttached { popup, attached });
    }

    fn remove_popup(&mut self, popup: PopupId) {
        self.popups.remove(&popup);
        self.record(MapCommand::RemovePopup(popup));
    }

    fn fit_viewport(&mut self, bounds: &Bounds) {
        self.viewport = Some(*bounds);
        self.record(MapCommand::FitViewport(*bounds));
    }

    fn pan_to(&mut self, point: GeoPoint) {
        self.center = Some(point);
        self.record(MapCommand::PanTo(point));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planner_routes_are_dashed_and_thicker() {
        let explorer = PolylineStyle::for_mode(AppMode::Explorer);
        let planner = PolylineStyle::for_mode(AppMode::Planner);

        assert_eq!(explorer.stroke_color, EXPLORER_ROUTE_COLOR);
        assert_eq!(explorer.stroke_weight, 3);
        assert!(explorer.dash.is_none());
        assert_eq!(planner.stroke_color, PLANNER_ROUTE_COLOR);
        assert_eq!(planner.stroke_weight, 4);
        assert_eq!(planner.dash.as_ref().map(|dash| dash.repeat_px), Some(15));
    }

    #[test]
    fn popup_schedule_joins_time_and_duration() {
        let content = PopupContent::new("Louvre", "Museum", Some("10:00"), Some("2 hours"));
        assert_eq!(content.schedule.as_deref(), Some("10:00 • 2 hours"));

        let untimed = PopupContent::new("Louvre", "Museum", None, Some("2 hours"));
        assert_eq!(untimed.schedule, None);
    }

    #[test]
    fn recording_map_tracks_live_overlays() {
        let mut map = RecordingMap::new();
        let point = GeoPoint::new(48.85, 2.35);
        let marker = map.create_marker(point, "Paris");
        let popup = map.create_popup(point, &PopupContent::new("Paris", "City", None, None));
        assert_eq!(map.attached_popups(), Vec::<PopupId>::new());

        map.set_popup_attached(popup, true);
        assert_eq!(map.attached_popups(), vec![popup]);

        map.remove_marker(marker);
        map.remove_popup(popup);
        assert_eq!(map.marker_count(), 0);
        assert_eq!(map.popup_count(), 0);
        assert_eq!(map.commands().len(), 5);
    }

    #[test]
    fn boxed_surface_forwards_calls() {
        let mut map: Box<RecordingMap> = Box::new(RecordingMap::new());
        let point = GeoPoint::new(1.0, 2.0);
        map.pan_to(point);
        assert_eq!(map.center(), Some(point));
    }
}
