//! Applies decoded tool calls to the entity store and the map, one at a time.

use map_integration::{MapSurface, PolylineStyle, PopupContent};
use shared::{
    domain::{AppMode, ConnectionRecord, GeoPoint, LocationRecord},
    error::ToolCallError,
    protocol::{ConnectionCall, FunctionCall, LocationCall, ToolCall},
};
use tracing::{debug, warn};

use crate::{
    entity_store::{EntityStore, LocationOverlays},
    error::SessionError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Location { index: usize },
    Connection { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Applied(Applied),
    /// Known function whose arguments failed validation.
    Rejected,
    /// Function the explorer does not handle.
    Ignored,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReducerCounts {
    pub applied: usize,
    pub rejected: usize,
    pub ignored: usize,
}

#[derive(Debug, Default)]
pub struct ResponseReducer {
    counts: ReducerCounts,
}

impl ResponseReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> ReducerCounts {
        self.counts
    }

    pub fn reset(&mut self) {
        self.counts = ReducerCounts::default();
    }

    /// Decodes a raw call at the boundary and applies it when valid.
    pub fn apply_raw<M>(
        &mut self,
        store: &mut EntityStore,
        map: &mut M,
        mode: AppMode,
        call: &FunctionCall,
    ) -> Disposition
    where
        M: MapSurface + ?Sized,
    {
        match ToolCall::decode(call) {
            Ok(tool_call) => Disposition::Applied(self.apply(store, map, mode, tool_call)),
            Err(ToolCallError::UnknownFunction(name)) => {
                debug!(function = %name, "ignoring unsupported function call");
                self.counts.ignored += 1;
                Disposition::Ignored
            }
            Err(err) => {
                warn!(function = %call.name, error = %err, "rejecting malformed function call");
                self.counts.rejected += 1;
                Disposition::Rejected
            }
        }
    }

    pub fn apply<M>(
        &mut self,
        store: &mut EntityStore,
        map: &mut M,
        mode: AppMode,
        call: ToolCall,
    ) -> Applied
    where
        M: MapSurface + ?Sized,
    {
        self.counts.applied += 1;
        match call {
            ToolCall::Location(location) => Applied::Location {
                index: place_location(store, map, mode, location),
            },
            ToolCall::Connection(connection) => Applied::Connection {
                index: draw_connection(store, map, mode, connection),
            },
        }
    }

    /// End-of-stream check: a query that produced nothing is an error.
    pub fn finish(&self) -> Result<ReducerCounts, SessionError> {
        if self.counts.applied == 0 {
            return Err(SessionError::NoResults);
        }
        Ok(self.counts)
    }
}

fn place_location<M>(
    store: &mut EntityStore,
    map: &mut M,
    mode: AppMode,
    call: LocationCall,
) -> usize
where
    M: MapSurface + ?Sized,
{
    let position = call.position();
    let (index, record) = store.add_location(LocationRecord {
        name: call.name,
        description: call.description,
        position,
        time: call.time,
        duration: call.duration,
        sequence: call.sequence,
    });

    let marker = map.create_marker(position, &record.name);
    map.pan_to(position);
    map.fit_viewport(store.bounds());

    let content = PopupContent::new(
        &record.name,
        &record.description,
        record.scheduled_time(),
        record.duration.as_deref(),
    );
    let popup = map.create_popup(position, &content);
    if !mode.is_planner() {
        map.set_popup_attached(popup, true);
    }
    store.set_location_overlays(index, LocationOverlays { marker, popup });

    debug!(index, name = %record.name, lat = position.lat, lng = position.lng, "placed location");
    index
}

fn draw_connection<M>(
    store: &mut EntityStore,
    map: &mut M,
    mode: AppMode,
    call: ConnectionCall,
) -> usize
where
    M: MapSurface + ?Sized,
{
    let start: GeoPoint = call.start.into();
    let end: GeoPoint = call.end.into();
    let index = store.add_connection(ConnectionRecord {
        name: call.name,
        start,
        end,
        transport_mode: call.transport,
        travel_time: call.travel_time,
    });
    map.fit_viewport(store.bounds());

    let polyline = map.create_polyline([start, end], &PolylineStyle::for_mode(mode));
    store.set_connection_polyline(index, polyline);

    debug!(index, "drew connection");
    index
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
