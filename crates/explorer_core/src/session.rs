//! The explicitly-owned session: one query at a time, driven by user input
//! and stream events.

use futures::StreamExt;
use map_integration::MapSurface;
use shared::{
    domain::{AppMode, QueryId},
    error::SurfacedError,
    protocol::FunctionCall,
};
use tracing::{debug, info, warn};

use crate::{
    entity_store::EntityStore,
    error::{SessionError, TransportError},
    export::render_day_plan,
    generative::{GenerationRequest, GenerativeClient},
    itinerary::Itinerary,
    prompts::DEFAULT_TEMPERATURE,
    reducer::{Disposition, ReducerCounts, ResponseReducer},
    view::{render_cards, render_timeline, CardDeck, TimelineRow, ViewSynchronizer},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Streaming(QueryId),
}

/// Handed out by [`Session::submit`]; the host sends `request` to a model and
/// reports events back under `query_id`.
#[derive(Debug, Clone)]
pub struct QueryTicket {
    pub query_id: QueryId,
    pub request: GenerationRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOutcome {
    pub query_id: QueryId,
    pub locations: usize,
    pub connections: usize,
    pub rejected_calls: usize,
    pub ignored_calls: usize,
    pub itinerary_len: usize,
    pub timeline_visible: bool,
}

pub struct Session<M> {
    map: M,
    mode: AppMode,
    phase: Phase,
    last_query: QueryId,
    store: EntityStore,
    reducer: ResponseReducer,
    itinerary: Itinerary,
    view: ViewSynchronizer,
    timeline_visible: bool,
    surfaced_error: Option<SurfacedError>,
    temperature: f32,
}

impl<M> Session<M>
where
    M: MapSurface,
{
    pub fn new(map: M) -> Self {
        Self {
            map,
            mode: AppMode::default(),
            phase: Phase::Idle,
            last_query: QueryId(0),
            store: EntityStore::new(),
            reducer: ResponseReducer::new(),
            itinerary: Itinerary::default(),
            view: ViewSynchronizer::new(),
            timeline_visible: false,
            surfaced_error: None,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_mode(mut self, mode: AppMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Starts a new query. Any previous results are cleared from the store
    /// and the map, and a stream still in flight becomes stale.
    pub fn submit(&mut self, prompt: &str) -> Result<QueryTicket, SessionError> {
        if prompt.trim().is_empty() {
            return Err(SessionError::EmptyPrompt);
        }
        if let Phase::Streaming(previous) = self.phase {
            info!(query_id = %previous, "superseding running query");
        }
        self.clear_results();
        self.last_query = QueryId(self.last_query.0 + 1);
        let query_id = self.last_query;
        self.phase = Phase::Streaming(query_id);
        info!(query_id = %query_id, mode = ?self.mode, "query submitted");
        Ok(QueryTicket {
            query_id,
            request: GenerationRequest::for_query(prompt, self.mode, self.temperature),
        })
    }

    /// Applies one streamed call. Calls tagged with anything but the running
    /// query are dropped.
    pub fn apply_event(
        &mut self,
        query_id: QueryId,
        call: &FunctionCall,
    ) -> Result<Disposition, SessionError> {
        self.ensure_current(query_id)?;
        Ok(self
            .reducer
            .apply_raw(&mut self.store, &mut self.map, self.mode, call))
    }

    /// Ends the running query with the stream's final status.
    pub fn finish(
        &mut self,
        query_id: QueryId,
        result: Result<(), TransportError>,
    ) -> Result<QueryOutcome, SessionError> {
        self.ensure_current(query_id)?;
        self.phase = Phase::Idle;

        if let Err(err) = result {
            return Err(self.fail(query_id, SessionError::Transport(err)));
        }
        let counts = match self.reducer.finish() {
            Ok(counts) => counts,
            Err(err) => return Err(self.fail(query_id, err)),
        };

        if self.mode.is_planner() {
            self.itinerary = Itinerary::rebuild(self.store.location_records());
            if !self.itinerary.is_empty() {
                self.timeline_visible = true;
                self.map.fit_viewport(self.store.bounds());
            }
        }
        self.view.sync_popups(&self.store, self.mode, &mut self.map);

        let outcome = self.outcome(query_id, counts);
        info!(
            query_id = %query_id,
            locations = outcome.locations,
            connections = outcome.connections,
            rejected = outcome.rejected_calls,
            itinerary = outcome.itinerary_len,
            "query finished"
        );
        Ok(outcome)
    }

    /// Drives one query end to end against `client`.
    pub async fn run_query<C>(
        &mut self,
        client: &C,
        prompt: &str,
    ) -> Result<QueryOutcome, SessionError>
    where
        C: GenerativeClient + ?Sized,
    {
        let ticket = self.submit(prompt)?;
        let query_id = ticket.query_id;
        let mut stream = match client.stream_function_calls(ticket.request).await {
            Ok(stream) => stream,
            Err(err) => return self.finish(query_id, Err(err)),
        };

        let mut result = Ok(());
        while let Some(item) = stream.next().await {
            match item {
                Ok(call) => {
                    self.apply_event(query_id, &call)?;
                }
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }
        self.finish(query_id, result)
    }

    /// Only allowed while idle. Leaving planner mode closes the timeline and
    /// drops the itinerary.
    pub fn set_mode(&mut self, mode: AppMode) -> Result<(), SessionError> {
        if matches!(self.phase, Phase::Streaming(_)) {
            return Err(SessionError::ModeLocked);
        }
        if mode == self.mode {
            return Ok(());
        }
        if !mode.is_planner() {
            self.itinerary.clear();
            if self.timeline_visible {
                self.timeline_visible = false;
                self.map.fit_viewport(self.store.bounds());
            }
        }
        self.mode = mode;
        self.view.sync_popups(&self.store, self.mode, &mut self.map);
        info!(mode = ?mode, "mode changed");
        Ok(())
    }

    /// Clears results and abandons any running query.
    pub fn reset(&mut self) {
        if let Phase::Streaming(query_id) = self.phase {
            debug!(query_id = %query_id, "abandoning running query");
        }
        self.clear_results();
        self.phase = Phase::Idle;
    }

    pub fn cards(&self) -> CardDeck {
        if !self.carousel_visible() {
            return CardDeck::default();
        }
        render_cards(
            self.store.location_records().map(|record| record.as_ref()),
            self.view.active_index(),
            self.mode,
        )
    }

    pub fn timeline(&self) -> Vec<TimelineRow> {
        render_timeline(&self.itinerary)
    }

    pub fn carousel_visible(&self) -> bool {
        self.phase == Phase::Idle && self.store.location_count() > 0
    }

    /// Activates a card and pans to its location.
    pub fn set_active(&mut self, index: usize) -> bool {
        self.view
            .focus(index, &self.store, self.mode, &mut self.map)
    }

    pub fn navigate(&mut self, direction: isize) -> bool {
        self.view
            .navigate(direction, &self.store, self.mode, &mut self.map)
    }

    /// Activates the card behind a timeline row.
    pub fn select_timeline_entry(&mut self, row: usize) -> bool {
        let Some(index) = self
            .itinerary
            .entries()
            .get(row)
            .map(|entry| entry.location_index)
        else {
            return false;
        };
        self.set_active(index)
    }

    /// Needs a non-empty itinerary. Refits the viewport.
    pub fn open_timeline(&mut self) -> bool {
        if self.itinerary.is_empty() {
            return false;
        }
        self.timeline_visible = true;
        self.map.fit_viewport(self.store.bounds());
        true
    }

    pub fn close_timeline(&mut self) {
        self.timeline_visible = false;
        self.map.fit_viewport(self.store.bounds());
    }

    pub fn export_day_plan(&self) -> Option<String> {
        render_day_plan(self.itinerary.records())
    }

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn itinerary(&self) -> &Itinerary {
        &self.itinerary
    }

    pub fn active_index(&self) -> usize {
        self.view.active_index()
    }

    pub fn timeline_visible(&self) -> bool {
        self.timeline_visible
    }

    pub fn surfaced_error(&self) -> Option<&SurfacedError> {
        self.surfaced_error.as_ref()
    }

    pub fn counts(&self) -> ReducerCounts {
        self.reducer.counts()
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    fn ensure_current(&self, query_id: QueryId) -> Result<(), SessionError> {
        if self.phase == Phase::Streaming(query_id) {
            return Ok(());
        }
        debug!(query_id = %query_id, phase = ?self.phase, "dropping event for stale query");
        Err(SessionError::StaleQuery(query_id))
    }

    fn fail(&mut self, query_id: QueryId, err: SessionError) -> SessionError {
        if let Some(surfaced) = err.surfaced() {
            warn!(query_id = %query_id, code = ?surfaced.code, error = %surfaced.message, "query failed");
            self.surfaced_error = Some(surfaced);
        }
        err
    }

    fn clear_results(&mut self) {
        self.store.reset(&mut self.map);
        self.reducer.reset();
        self.itinerary.clear();
        self.view.reset();
        self.timeline_visible = false;
        self.surfaced_error = None;
    }

    fn outcome(&self, query_id: QueryId, counts: ReducerCounts) -> QueryOutcome {
        QueryOutcome {
            query_id,
            locations: self.store.location_count(),
            connections: self.store.connection_count(),
            rejected_calls: counts.rejected,
            ignored_calls: counts.ignored,
            itinerary_len: self.itinerary.len(),
            timeline_visible: self.timeline_visible,
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
