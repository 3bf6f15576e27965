//! End-to-end classification over realistic journal sequences.

use std::sync::Arc;

use chrono::Utc;
use presence_core::{
    classify, should_publish, Ambient, ConnectionSettings, Context, JournalEvent, MemoryConfig,
    PresenceDescriptor, PresencePlugin, PublishOutcome, RecordingClient,
};
use serde_json::{json, Value};

/// (system, station, entry) as the host would deliver them.
fn landing_trip() -> Vec<(Option<&'static str>, Option<&'static str>, Value)> {
    vec![
        (Some("Sol"), Some("Galileo"), json!({"event": "StartUp"})),
        (Some("Sol"), Some("Galileo"), json!({"event": "Music", "MusicTrack": "Starport"})),
        (
            Some("Sol"),
            None,
            json!({"event": "Undocked", "StationName": "Galileo", "StationType": "Orbis"}),
        ),
        (Some("Sol"), None, json!({"event": "StartJump", "JumpType": "Supercruise"})),
        (Some("Sol"), None, json!({"event": "SupercruiseEntry", "StarSystem": "Sol"})),
        (Some("Sol"), None, json!({"event": "ApproachBody", "Body": "Mars"})),
        (Some("Sol"), None, json!({"event": "SupercruiseExit", "Body": "Mars"})),
        (Some("Sol"), None, json!({"event": "Touchdown", "PlayerControlled": true})),
        (Some("Sol"), None, json!({"event": "LaunchSRV"})),
        (Some("Sol"), None, json!({"event": "Liftoff", "PlayerControlled": false})),
        (Some("Sol"), None, json!({"event": "DockSRV"})),
        (Some("Sol"), None, json!({"event": "Liftoff", "PlayerControlled": true})),
        (Some("Sol"), None, json!({"event": "LeaveBody", "Body": "Mars"})),
    ]
}

fn replay(events: &[(Option<&str>, Option<&str>, Value)]) -> Vec<(String, String)> {
    let mut descriptor = PresenceDescriptor::connecting(Utc::now());
    let mut context = Context::default();
    let mut published = Vec::new();

    for (system, station, entry) in events {
        let Ok(event) = JournalEvent::from_entry(entry) else {
            continue;
        };
        let (next, next_context) =
            classify(&descriptor, &context, &event, &Ambient::new(*system, *station));
        context = next_context;
        if should_publish(&descriptor, &next) {
            published.push((next.state.clone(), next.details.clone()));
            descriptor = next;
        }
    }

    published
}

#[test]
fn landing_trip_produces_expected_presence_sequence() {
    let published = replay(&landing_trip());
    let details: Vec<&str> = published.iter().map(|(_, details)| details.as_str()).collect();

    assert_eq!(
        details,
        vec![
            "Docked at Galileo",
            "Flying in normal space",
            "Preparing for supercruise",
            "Supercruising",
            "Approaching Mars",
            "Flying in normal space",
            "Landed on Mars",
            "In SRV on Mars",
            "In SRV on Mars, ship in orbit",
            "Landed on Mars",
            "Flying around Mars",
            "Supercruising",
        ]
    );
    assert_eq!(published[0].0, "In system Sol");
    assert_eq!(published[2].0, "Jumping");
}

#[test]
fn carrier_jump_sequence_follows_the_carrier() {
    let events = vec![
        (
            Some("Sol"),
            Some("K7Q-BQL"),
            json!({"event": "Docked", "StationName": "K7Q-BQL", "StationType": "FleetCarrier"}),
        ),
        (
            Some("Sol"),
            Some("K7Q-BQL"),
            json!({"event": "CarrierJumpRequest", "SystemName": "Colonia", "Body": "Colonia"}),
        ),
        (Some("Sol"), Some("K7Q-BQL"), json!({"event": "CarrierJumpCancelled"})),
        (
            Some("Sol"),
            Some("K7Q-BQL"),
            json!({"event": "CarrierJumpRequest", "SystemName": "Colonia"}),
        ),
        (
            Some("Sol"),
            Some("K7Q-BQL"),
            json!({"event": "CarrierJump", "StarSystem": "Colonia", "StationType": "FleetCarrier"}),
        ),
        (Some("Colonia"), Some("K7Q-BQL"), json!({"event": "CarrierStats", "CrewCount": 4})),
        (
            Some("Colonia"),
            Some("K7Q-BQL"),
            json!({"event": "CarrierBankTransfer", "Deposit": 1000000}),
        ),
        (Some("Colonia"), None, json!({"event": "Undocked", "StationType": "FleetCarrier"})),
    ];
    let published = replay(&events);

    assert_eq!(
        published,
        vec![
            ("In system Sol".to_string(), "Docked at Fleet Carrier K7Q-BQL".to_string()),
            ("Fleet Carrier preparing jump".to_string(), "To Colonia".to_string()),
            ("In system Sol".to_string(), "Docked at Fleet Carrier".to_string()),
            ("Fleet Carrier preparing jump".to_string(), "To Colonia".to_string()),
            ("In system Colonia".to_string(), "Fleet Carrier arrived".to_string()),
            ("In system Colonia".to_string(), "Managing Fleet Carrier (4 crew)".to_string()),
            ("In system Colonia".to_string(), "Managing Fleet Carrier finances".to_string()),
            ("In system Colonia".to_string(), "Flying near Fleet Carrier".to_string()),
        ]
    );
}

#[test]
fn on_foot_sequence_tracks_body_from_disembark() {
    let events = vec![
        (
            Some("HIP 22460"),
            None,
            json!({"event": "Disembark", "OnPlanet": true, "Body": "HIP 22460 A 1"}),
        ),
        (Some("HIP 22460"), None, json!({"event": "ApproachSettlement", "Name": "Bolden Outpost"})),
        (Some("HIP 22460"), None, json!({"event": "FactionKillBond", "Reward": 5000})),
        (Some("HIP 22460"), None, json!({"event": "Embark", "OnPlanet": true})),
    ];
    let published = replay(&events);
    let details: Vec<&str> = published.iter().map(|(_, details)| details.as_str()).collect();

    assert_eq!(
        details,
        vec![
            "On foot at HIP 22460 A 1",
            "Approaching Bolden Outpost",
            "Ground combat in HIP 22460",
            "Boarding ship at HIP 22460 A 1",
        ]
    );
}

#[test]
fn plugin_keeps_tracking_across_malformed_entries() {
    let mut plugin = PresencePlugin::new(
        Arc::new(RecordingClient::new()),
        Arc::new(MemoryConfig::new()),
        ConnectionSettings::default(),
    );

    let outcomes: Vec<Option<PublishOutcome>> = vec![
        plugin.journal_entry(Some("Sol"), None, &json!({"event": "ApproachBody", "Body": "Moon"})),
        plugin.journal_entry(Some("Sol"), None, &json!({"event": "Liftoff"})),
        plugin.journal_entry(
            Some("Sol"),
            None,
            &json!({"event": "Liftoff", "PlayerControlled": true}),
        ),
    ];

    assert_eq!(
        outcomes,
        vec![Some(PublishOutcome::Skipped), None, Some(PublishOutcome::Skipped)]
    );
    assert_eq!(plugin.descriptor().details, "Flying around Moon");
}
