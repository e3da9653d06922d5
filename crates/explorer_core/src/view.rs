//! Derived UI state: cards, carousel dots, timeline rows, popup visibility.

use map_integration::MapSurface;
use shared::domain::{AppMode, LocationRecord};

use crate::{entity_store::EntityStore, itinerary::Itinerary, placeholder::PlaceholderImage};

pub const FLEXIBLE_TIME_LABEL: &str = "Flexible";

#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub index: usize,
    pub title: String,
    pub description: String,
    pub image: PlaceholderImage,
    pub active: bool,
    pub planner: bool,
    pub sequence_badge: Option<u32>,
    pub time_badge: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselDot {
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardDeck {
    pub cards: Vec<CardView>,
    pub dots: Vec<CarouselDot>,
}

impl CardDeck {
    pub fn is_visible(&self) -> bool {
        !self.cards.is_empty()
    }

    pub fn active_card(&self) -> Option<&CardView> {
        self.cards.iter().find(|card| card.active)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineRow {
    pub location_index: usize,
    pub time_label: String,
    pub title: String,
    pub description: String,
    pub duration: Option<String>,
}

pub fn render_cards<'a, I>(locations: I, active_index: usize, mode: AppMode) -> CardDeck
where
    I: IntoIterator<Item = &'a LocationRecord>,
{
    let planner = mode.is_planner();
    let cards: Vec<CardView> = locations
        .into_iter()
        .enumerate()
        .map(|(index, location)| CardView {
            index,
            title: location.name.clone(),
            description: location.description.clone(),
            image: PlaceholderImage::for_name(&location.name),
            active: index == active_index,
            planner,
            sequence_badge: location.sequence.filter(|_| planner),
            time_badge: location
                .scheduled_time()
                .filter(|_| planner)
                .map(str::to_string),
            duration: location.duration.clone().filter(|_| planner),
        })
        .collect();
    let dots = cards
        .iter()
        .map(|card| CarouselDot {
            active: card.active,
        })
        .collect();
    CardDeck { cards, dots }
}

pub fn render_timeline(itinerary: &Itinerary) -> Vec<TimelineRow> {
    itinerary
        .entries()
        .iter()
        .map(|entry| TimelineRow {
            location_index: entry.location_index,
            time_label: entry
                .location
                .scheduled_time()
                .unwrap_or(FLEXIBLE_TIME_LABEL)
                .to_string(),
            title: entry.location.name.clone(),
            description: entry.location.description.clone(),
            duration: entry.location.duration.clone(),
        })
        .collect()
}

/// Owns the active card pointer and keeps the map's popups in line with it.
#[derive(Debug, Default)]
pub struct ViewSynchronizer {
    active_index: usize,
}

impl ViewSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn reset(&mut self) {
        self.active_index = 0;
    }

    /// Out-of-range indices leave everything untouched and return false.
    pub fn set_active<M>(
        &mut self,
        index: usize,
        store: &EntityStore,
        mode: AppMode,
        map: &mut M,
    ) -> bool
    where
        M: MapSurface + ?Sized,
    {
        if index >= store.location_count() {
            return false;
        }
        self.active_index = index;
        self.sync_popups(store, mode, map);
        true
    }

    /// Moves by `direction` cards without wrapping, panning to the new card.
    pub fn navigate<M>(
        &mut self,
        direction: isize,
        store: &EntityStore,
        mode: AppMode,
        map: &mut M,
    ) -> bool
    where
        M: MapSurface + ?Sized,
    {
        let Some(target) = self.active_index.checked_add_signed(direction) else {
            return false;
        };
        self.focus(target, store, mode, map)
    }

    /// Activates a card and centers the map on it.
    pub fn focus<M>(&mut self, index: usize, store: &EntityStore, mode: AppMode, map: &mut M) -> bool
    where
        M: MapSurface + ?Sized,
    {
        if !self.set_active(index, store, mode, map) {
            return false;
        }
        if let Some(location) = store.location(index) {
            map.pan_to(location.record.position);
        }
        true
    }

    /// Planner mode shows only the active popup; explorer mode shows all.
    pub fn sync_popups<M>(&self, store: &EntityStore, mode: AppMode, map: &mut M)
    where
        M: MapSurface + ?Sized,
    {
        for (index, location) in store.locations().iter().enumerate() {
            if let Some(overlays) = location.overlays {
                let attached = !mode.is_planner() || index == self.active_index;
                map.set_popup_attached(overlays.popup, attached);
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
