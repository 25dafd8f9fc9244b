//! Replay a short reading session and print the insight report

fn main() {
    let json = r#"{
        "session_id": "demo-session",
        "started_at": "2024-03-02T09:00:00Z",
        "viewport_height": 800,
        "blocks": [
            { "text": "Generations of heritage, wisdom and tradition shaped the old town", "top": 0, "height": 300 },
            { "text": "Today its innovation and technology point to the future", "top": 400, "height": 300 },
            { "text": "Community festivals keep the culture and spirit alive", "top": 1200, "height": 300 },
            { "text": "Dreams and hope carry the pride of a city", "top": 1700, "height": 300 }
        ],
        "events": [
            { "event_type": "scroll", "at_ms": 2500, "scroll_y": 900 },
            { "event_type": "scroll", "at_ms": 5000, "scroll_y": 1600 },
            { "event_type": "scroll", "at_ms": 8000, "scroll_y": 0 },
            { "event_type": "scroll", "at_ms": 10000, "scroll_y": 0 }
        ]
    }"#;

    match reading_insight::session_to_report(json.to_string()) {
        Ok(report) => print!("{report}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
