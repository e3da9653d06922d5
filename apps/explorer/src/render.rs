//! Plain-text rendering of the session for the terminal.

use std::fmt::Write as _;

use explorer_core::{
    view::{CardDeck, TimelineRow},
    QueryOutcome,
};
use map_integration::RecordingMap;
use shared::{domain::Bounds, error::SurfacedError};

pub fn outcome(outcome: &QueryOutcome) -> String {
    let mut line = format!(
        "{} location(s), {} route(s)",
        outcome.locations, outcome.connections
    );
    if outcome.rejected_calls > 0 {
        let _ = write!(line, ", {} malformed call(s) skipped", outcome.rejected_calls);
    }
    if outcome.itinerary_len > 0 {
        let _ = write!(line, ", {} stop(s) in the day plan", outcome.itinerary_len);
    }
    line
}

pub fn cards(deck: &CardDeck) -> String {
    let mut out = String::new();
    for card in &deck.cards {
        let marker = if card.active { '>' } else { ' ' };
        let _ = write!(out, "{marker} [{}] ", card.index + 1);
        if let Some(sequence) = card.sequence_badge {
            let _ = write!(out, "#{sequence} ");
        }
        let _ = write!(out, "{}", card.title);
        if let Some(time) = &card.time_badge {
            let _ = write!(out, " @ {time}");
        }
        out.push('\n');
        let _ = writeln!(out, "      {}", card.description);
        if let Some(duration) = &card.duration {
            let _ = writeln!(out, "      {duration}");
        }
    }
    if !deck.dots.is_empty() {
        let dots: String = deck
            .dots
            .iter()
            .map(|dot| if dot.active { '●' } else { '○' })
            .collect();
        let _ = writeln!(out, "  {dots}");
    }
    out
}

pub fn timeline(rows: &[TimelineRow]) -> String {
    let mut out = String::from("Day plan\n");
    for (position, row) in rows.iter().enumerate() {
        let _ = write!(out, "  {}. {:>8}  {}", position + 1, row.time_label, row.title);
        if let Some(duration) = &row.duration {
            let _ = write!(out, " ({duration})");
        }
        out.push('\n');
    }
    out
}

pub fn viewport(map: &RecordingMap) -> String {
    let center = map
        .center()
        .map(|point| format!("{:.4}, {:.4}", point.lat, point.lng))
        .unwrap_or_else(|| "-".to_string());
    format!("map centered on {center}; showing {}", bounds(map.viewport()))
}

fn bounds(bounds: Option<Bounds>) -> String {
    match bounds.and_then(|bounds| bounds.rect()) {
        Some(rect) => format!(
            "[{:.4}, {:.4}] to [{:.4}, {:.4}]",
            rect.south, rect.west, rect.north, rect.east
        ),
        None => "the whole world".to_string(),
    }
}

pub fn error(error: &SurfacedError) -> String {
    format!("error: {}", error.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use explorer_core::view::{CardView, CarouselDot};
    use explorer_core::placeholder::PlaceholderImage;
    use shared::domain::QueryId;

    fn card(index: usize, active: bool, planner: bool) -> CardView {
        CardView {
            index,
            title: format!("Stop {index}"),
            description: "worth a look".to_string(),
            image: PlaceholderImage::for_name("Stop"),
            active,
            planner,
            sequence_badge: planner.then_some(index as u32 + 1),
            time_badge: planner.then(|| "09:00".to_string()),
            duration: planner.then(|| "1 hour".to_string()),
        }
    }

    #[test]
    fn active_card_is_marked_and_dots_follow() {
        let deck = CardDeck {
            cards: vec![card(0, false, false), card(1, true, false)],
            dots: vec![CarouselDot { active: false }, CarouselDot { active: true }],
        };

        let text = cards(&deck);

        assert!(text.contains("  [1] Stop 0"));
        assert!(text.contains("> [2] Stop 1"));
        assert!(text.contains("○●"));
    }

    #[test]
    fn planner_cards_show_badges() {
        let deck = CardDeck {
            cards: vec![card(0, true, true)],
            dots: vec![CarouselDot { active: true }],
        };
        assert!(cards(&deck).contains("> [1] #1 Stop 0 @ 09:00"));
    }

    #[test]
    fn timeline_rows_are_numbered() {
        let rows = vec![TimelineRow {
            location_index: 3,
            time_label: "Flexible".to_string(),
            title: "Park".to_string(),
            description: "green".to_string(),
            duration: Some("2 hours".to_string()),
        }];
        assert_eq!(timeline(&rows), "Day plan\n  1. Flexible  Park (2 hours)\n");
    }

    #[test]
    fn outcome_mentions_skipped_calls_only_when_present() {
        let mut summary = QueryOutcome {
            query_id: QueryId(1),
            locations: 2,
            connections: 1,
            rejected_calls: 0,
            ignored_calls: 0,
            itinerary_len: 0,
            timeline_visible: false,
        };
        assert_eq!(outcome(&summary), "2 location(s), 1 route(s)");

        summary.rejected_calls = 1;
        summary.itinerary_len = 2;
        assert_eq!(
            outcome(&summary),
            "2 location(s), 1 route(s), 1 malformed call(s) skipped, 2 stop(s) in the day plan"
        );
    }

    #[test]
    fn empty_map_shows_the_world() {
        assert_eq!(
            viewport(&RecordingMap::new()),
            "map centered on -; showing the whole world"
        );
    }
}
