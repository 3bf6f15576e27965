//! One-shot classification of a journal entry read from stdin.

use std::io::{self, Read};

use chrono::Utc;
use presence_core::{
    classify, classify_cqc, Ambient, Context, GameMode, JournalEvent, PresenceDescriptor,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
struct Classified {
    state: String,
    details: String,
    current_body: String,
    current_landing_pad: String,
}

/// `cqc` selects the CQC classifier with the given game editions.
pub fn run(
    system: Option<&str>,
    station: Option<&str>,
    cqc: Option<GameMode>,
) -> Result<(), String> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| format!("Failed to read stdin: {}", e))?;

    if input.trim().is_empty() {
        return Err("No journal entry on stdin".to_string());
    }

    let entry: Value =
        serde_json::from_str(&input).map_err(|e| format!("Failed to parse entry: {}", e))?;
    let classified = classify_entry(&entry, system, station, cqc)?;

    let output = serde_json::to_string_pretty(&classified)
        .map_err(|e| format!("Failed to serialize descriptor: {}", e))?;
    println!("{}", output);
    Ok(())
}

fn classify_entry(
    entry: &Value,
    system: Option<&str>,
    station: Option<&str>,
    cqc: Option<GameMode>,
) -> Result<Classified, String> {
    let event = JournalEvent::from_entry(entry).map_err(String::from)?;
    let initial = PresenceDescriptor::connecting(Utc::now());

    let (descriptor, context) = match cqc {
        Some(mode) => (classify_cqc(&initial, &event, mode), Context::default()),
        None => classify(
            &initial,
            &Context::default(),
            &event,
            &Ambient::new(system, station),
        ),
    };

    Ok(Classified {
        state: descriptor.state,
        details: descriptor.details,
        current_body: context.current_body,
        current_landing_pad: context.current_landing_pad,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn docked_at_carrier() {
        let classified = classify_entry(
            &json!({"event": "Docked", "StationType": "FleetCarrier"}),
            Some("Sol"),
            Some("Abraham Lincoln"),
            None,
        )
        .unwrap();
        assert_eq!(classified.state, "In system Sol");
        assert_eq!(classified.details, "Docked at Fleet Carrier Abraham Lincoln");
    }

    #[test]
    fn approach_body_reports_context() {
        let classified = classify_entry(
            &json!({"event": "ApproachBody", "Body": "Titan"}),
            Some("Sol"),
            None,
            None,
        )
        .unwrap();
        assert_eq!(classified.current_body, "Titan");
        assert_eq!(classified.current_landing_pad, "2");
    }

    #[test]
    fn malformed_entry_is_an_error() {
        assert!(classify_entry(&json!({"event": "CarrierJump"}), None, None, None).is_err());
    }

    #[test]
    fn cqc_lobby() {
        let mode = GameMode {
            horizons: false,
            odyssey: true,
        };
        let classified =
            classify_entry(&json!({"event": "LoadGame"}), None, None, Some(mode)).unwrap();
        assert_eq!(classified.state, "Playing CQC in Odyssey");
        assert_eq!(classified.details, "In lobby/queue");
    }
}
