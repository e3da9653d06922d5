use super::*;
use map_integration::{PolylineStyle, PopupContent, RecordingMap};
use shared::domain::AppMode;

fn location(name: &str, lat: f64, lng: f64) -> LocationRecord {
    LocationRecord {
        name: name.to_string(),
        description: format!("{name} description"),
        position: GeoPoint::new(lat, lng),
        time: None,
        duration: None,
        sequence: None,
    }
}

fn connection(start: GeoPoint, end: GeoPoint) -> ConnectionRecord {
    ConnectionRecord {
        name: "route".to_string(),
        start,
        end,
        transport_mode: None,
        travel_time: None,
    }
}

#[test]
fn each_add_extends_previous_bounds_by_its_points() {
    let mut store = EntityStore::new();
    let steps = [
        (48.8584, 2.2945),
        (48.8606, 2.3376),
        (48.8530, 2.3499),
        (48.8867, 2.3431),
    ];

    for (lat, lng) in steps {
        let mut expected = *store.bounds();
        expected.extend(GeoPoint::new(lat, lng));
        store.add_location(location("stop", lat, lng));
        assert_eq!(*store.bounds(), expected);
    }

    let start = GeoPoint::new(48.80, 2.20);
    let end = GeoPoint::new(48.90, 2.40);
    let mut expected = *store.bounds();
    expected.extend(start);
    expected.extend(end);
    store.add_connection(connection(start, end));
    assert_eq!(*store.bounds(), expected);
    assert_eq!(store.points().len(), steps.len() + 2);
}

#[test]
fn final_bounds_do_not_depend_on_insertion_order() {
    let points = [
        GeoPoint::new(40.7128, -74.0060),
        GeoPoint::new(40.7580, -73.9855),
        GeoPoint::new(40.6892, -74.0445),
    ];

    let mut forward = EntityStore::new();
    for point in points {
        forward.add_location(location("a", point.lat, point.lng));
    }
    let mut backward = EntityStore::new();
    for point in points.iter().rev() {
        backward.add_location(location("a", point.lat, point.lng));
    }

    assert_eq!(forward.bounds(), backward.bounds());
}

#[test]
fn reset_returns_to_empty_and_removes_overlays() {
    let mut map = RecordingMap::new();
    let mut store = EntityStore::new();

    let (index, record) = store.add_location(location("Louvre", 48.8606, 2.3376));
    let marker = map.create_marker(record.position, &record.name);
    let popup = map.create_popup(
        record.position,
        &PopupContent::new(&record.name, &record.description, None, None),
    );
    store.set_location_overlays(index, LocationOverlays { marker, popup });

    let start = GeoPoint::new(48.8584, 2.2945);
    let end = GeoPoint::new(48.8606, 2.3376);
    let line_index = store.add_connection(connection(start, end));
    let polyline = map.create_polyline([start, end], &PolylineStyle::for_mode(AppMode::Explorer));
    store.set_connection_polyline(line_index, polyline);

    store.reset(&mut map);

    assert!(store.is_empty());
    assert!(store.points().is_empty());
    assert!(store.bounds().is_empty());
    assert_eq!(map.marker_count(), 0);
    assert_eq!(map.popup_count(), 0);
    assert_eq!(map.polyline_count(), 0);
}

#[test]
fn reset_on_fresh_store_is_harmless() {
    let mut map = RecordingMap::new();
    let mut store = EntityStore::new();
    store.reset(&mut map);
    store.reset(&mut map);
    assert!(store.is_empty());
    assert!(map.commands().is_empty());
}
