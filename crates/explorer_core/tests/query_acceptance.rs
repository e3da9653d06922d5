use explorer_core::{export::DAY_PLAN_HEADER, ScriptedClient, Session};
use map_integration::{RecordingMap, PLANNER_ROUTE_COLOR};
use serde_json::json;
use shared::{
    domain::{AppMode, GeoPoint},
    protocol::FunctionCall,
};

#[tokio::test]
async fn explorer_single_location_acceptance() {
    let client = ScriptedClient::new([FunctionCall::new(
        "location",
        json!({
            "name": "Eiffel Tower",
            "description": "Iconic tower",
            "lat": "48.8584",
            "lng": "2.2945"
        }),
    )]);
    let mut session = Session::new(RecordingMap::new());

    let outcome = session
        .run_query(&client, "famous towers in Paris")
        .await
        .expect("query");

    assert_eq!(outcome.locations, 1);
    assert_eq!(session.store().location_count(), 1);
    assert!(session
        .store()
        .bounds()
        .contains(GeoPoint::new(48.8584, 2.2945)));
    let deck = session.cards();
    assert_eq!(deck.cards.len(), 1);
    assert_eq!(deck.cards[0].title, "Eiffel Tower");
    assert!(session.itinerary().is_empty());
    assert!(!session.timeline_visible());
}

#[tokio::test]
async fn planner_two_stops_and_route_acceptance() {
    let client = ScriptedClient::new([
        FunctionCall::new(
            "location",
            json!({
                "name": "Second stop", "description": "Lunch",
                "lat": "48.8606", "lng": "2.3376",
                "time": "11:00", "duration": "1 hour", "sequence": 2
            }),
        ),
        FunctionCall::new(
            "location",
            json!({
                "name": "First stop", "description": "Coffee",
                "lat": "48.8584", "lng": "2.2945",
                "time": "09:00", "duration": "30 minutes", "sequence": 1
            }),
        ),
        FunctionCall::new(
            "line",
            json!({
                "name": "Metro",
                "start": {"lat": "48.8584", "lng": "2.2945"},
                "end": {"lat": "48.8606", "lng": "2.3376"},
                "transport": "public transit",
                "travelTime": "20 minutes"
            }),
        ),
    ]);
    let mut session = Session::new(RecordingMap::new()).with_mode(AppMode::Planner);

    let outcome = session.run_query(&client, "Paris").await.expect("query");

    assert_eq!(outcome.itinerary_len, 2);
    assert!(session.timeline_visible());
    assert_eq!(session.store().connection_count(), 1);
    assert_eq!(session.map().polyline_count(), 1);
    let order: Vec<Option<u32>> = session
        .itinerary()
        .records()
        .map(|record| record.sequence)
        .collect();
    assert_eq!(order, vec![Some(1), Some(2)]);

    let cards = session.cards();
    assert_eq!(cards.cards[0].sequence_badge, Some(2));
    assert_eq!(cards.cards[0].time_badge.as_deref(), Some("11:00"));

    let plan = session.export_day_plan().expect("plan");
    assert!(plan.starts_with(DAY_PLAN_HEADER));
    let first = plan.find("## 1. First stop").expect("first section");
    let second = plan.find("## 2. Second stop").expect("second section");
    assert!(first < second);
    assert!(plan.contains("Duration: 30 minutes"));

    let dashed = session.map().commands().iter().any(|command| {
        matches!(
            command,
            map_integration::MapCommand::CreatePolyline { style, .. }
                if style.stroke_color == PLANNER_ROUTE_COLOR && style.dash.is_some()
        )
    });
    assert!(dashed);
}

#[tokio::test]
async fn bundled_demo_script_replays_as_a_day_plan() {
    let script = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/paris-day.jsonl");
    let client = ScriptedClient::from_file(&script).await.expect("demo script");
    let mut session = Session::new(RecordingMap::new()).with_mode(AppMode::Planner);

    let outcome = session.run_query(&client, "Paris").await.expect("replay");

    assert_eq!(outcome.locations, 4);
    assert_eq!(outcome.connections, 3);
    assert_eq!(outcome.rejected_calls, 0);
    assert_eq!(session.timeline().len(), 4);
    assert_eq!(session.timeline()[3].title, "Eiffel Tower");
}
