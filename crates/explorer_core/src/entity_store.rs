//! Records produced by the current query plus the map overlays drawn for them.

use std::sync::Arc;

use map_integration::MapSurface;
use shared::domain::{
    Bounds, ConnectionRecord, GeoPoint, LocationRecord, MarkerId, PolylineId, PopupId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationOverlays {
    pub marker: MarkerId,
    pub popup: PopupId,
}

#[derive(Debug, Clone)]
pub struct StoredLocation {
    pub record: Arc<LocationRecord>,
    pub overlays: Option<LocationOverlays>,
}

#[derive(Debug, Clone)]
pub struct StoredConnection {
    pub record: ConnectionRecord,
    pub polyline: Option<PolylineId>,
}

#[derive(Debug, Default)]
pub struct EntityStore {
    points: Vec<GeoPoint>,
    locations: Vec<StoredLocation>,
    connections: Vec<StoredConnection>,
    bounds: Bounds,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the record and grows the bounds. Returns the record's index.
    pub fn add_location(&mut self, record: LocationRecord) -> (usize, Arc<LocationRecord>) {
        let record = Arc::new(record);
        self.points.push(record.position);
        self.bounds.extend(record.position);
        self.locations.push(StoredLocation {
            record: Arc::clone(&record),
            overlays: None,
        });
        (self.locations.len() - 1, record)
    }

    pub fn add_connection(&mut self, record: ConnectionRecord) -> usize {
        self.points.push(record.start);
        self.points.push(record.end);
        self.bounds.extend(record.start);
        self.bounds.extend(record.end);
        self.connections.push(StoredConnection {
            record,
            polyline: None,
        });
        self.connections.len() - 1
    }

    pub fn set_location_overlays(&mut self, index: usize, overlays: LocationOverlays) {
        if let Some(location) = self.locations.get_mut(index) {
            location.overlays = Some(overlays);
        }
    }

    pub fn set_connection_polyline(&mut self, index: usize, polyline: PolylineId) {
        if let Some(connection) = self.connections.get_mut(index) {
            connection.polyline = Some(polyline);
        }
    }

    /// Drops every record and takes their overlays off the map.
    pub fn reset<M>(&mut self, map: &mut M)
    where
        M: MapSurface + ?Sized,
    {
        for location in self.locations.drain(..) {
            if let Some(overlays) = location.overlays {
                map.remove_marker(overlays.marker);
                map.remove_popup(overlays.popup);
            }
        }
        for connection in self.connections.drain(..) {
            if let Some(polyline) = connection.polyline {
                map.remove_polyline(polyline);
            }
        }
        self.points.clear();
        self.bounds = Bounds::empty();
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn locations(&self) -> &[StoredLocation] {
        &self.locations
    }

    pub fn location(&self, index: usize) -> Option<&StoredLocation> {
        self.locations.get(index)
    }

    pub fn location_records(&self) -> impl Iterator<Item = &Arc<LocationRecord>> {
        self.locations.iter().map(|location| &location.record)
    }

    pub fn connections(&self) -> &[StoredConnection] {
        &self.connections
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty() && self.connections.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/entity_store_tests.rs"]
mod tests;
