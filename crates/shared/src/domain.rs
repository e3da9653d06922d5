use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(QueryId);
id_newtype!(MarkerId);
id_newtype!(PolylineId);
id_newtype!(PopupId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppMode {
    #[default]
    Explorer,
    Planner,
}

impl AppMode {
    pub fn is_planner(self) -> bool {
        self == AppMode::Planner
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngRect {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

/// Smallest lat/lng rectangle holding every point passed to [`Bounds::extend`].
///
/// A NaN coordinate poisons the matching edges rather than being skipped, so
/// malformed geometry stays visible downstream.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    rect: Option<LatLngRect>,
}

impl Bounds {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rect.is_none()
    }

    pub fn rect(&self) -> Option<LatLngRect> {
        self.rect
    }

    pub fn extend(&mut self, point: GeoPoint) {
        self.rect = Some(match self.rect {
            None => LatLngRect {
                south: point.lat,
                west: point.lng,
                north: point.lat,
                east: point.lng,
            },
            Some(rect) => LatLngRect {
                south: lower(rect.south, point.lat),
                west: lower(rect.west, point.lng),
                north: upper(rect.north, point.lat),
                east: upper(rect.east, point.lng),
            },
        });
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        self.rect.is_some_and(|rect| {
            point.lat >= rect.south
                && point.lat <= rect.north
                && point.lng >= rect.west
                && point.lng <= rect.east
        })
    }

    pub fn center(&self) -> Option<GeoPoint> {
        self.rect.map(|rect| {
            GeoPoint::new(
                (rect.south + rect.north) / 2.0,
                (rect.west + rect.east) / 2.0,
            )
        })
    }
}

fn lower(current: f64, candidate: f64) -> f64 {
    if current.is_nan() || candidate.is_nan() {
        f64::NAN
    } else {
        current.min(candidate)
    }
}

fn upper(current: f64, candidate: f64) -> f64 {
    if current.is_nan() || candidate.is_nan() {
        f64::NAN
    } else {
        current.max(candidate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub name: String,
    pub description: String,
    pub position: GeoPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
}

impl LocationRecord {
    /// Present and not blank.
    pub fn scheduled_time(&self) -> Option<&str> {
        self.time.as_deref().filter(|time| !time.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub name: String,
    pub start: GeoPoint,
    pub end: GeoPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_time: Option<String>,
}
