use std::{cmp::Ordering, sync::Arc};

use shared::domain::LocationRecord;

/// A timed location, pointing back at its slot in the entity store.
#[derive(Debug, Clone, PartialEq)]
pub struct ItineraryEntry {
    pub location_index: usize,
    pub location: Arc<LocationRecord>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Itinerary {
    entries: Vec<ItineraryEntry>,
}

impl Itinerary {
    /// Keeps locations with a non-blank time, ordered by sequence (missing
    /// last) and then by time. Equal keys keep arrival order.
    pub fn rebuild<'a, I>(locations: I) -> Self
    where
        I: IntoIterator<Item = &'a Arc<LocationRecord>>,
    {
        let mut entries: Vec<ItineraryEntry> = locations
            .into_iter()
            .enumerate()
            .filter(|(_, location)| location.scheduled_time().is_some())
            .map(|(location_index, location)| ItineraryEntry {
                location_index,
                location: Arc::clone(location),
            })
            .collect();
        entries.sort_by(|a, b| compare_stops(&a.location, &b.location));
        Self { entries }
    }

    pub fn entries(&self) -> &[ItineraryEntry] {
        &self.entries
    }

    pub fn records(&self) -> impl Iterator<Item = &LocationRecord> {
        self.entries.iter().map(|entry| entry.location.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn compare_stops(a: &LocationRecord, b: &LocationRecord) -> Ordering {
    let by_sequence = match (a.sequence, b.sequence) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_sequence.then_with(|| {
        a.time
            .as_deref()
            .unwrap_or_default()
            .cmp(b.time.as_deref().unwrap_or_default())
    })
}

#[cfg(test)]
#[path = "tests/itinerary_tests.rs"]
mod tests;
