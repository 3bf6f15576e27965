//! Journal event vocabulary.
//!
//! The host hands every journal line over as a JSON object with an `event`
//! tag and PascalCase fields. Recognized kinds deserialize into a variant of
//! [`JournalEvent`]; anything else becomes [`JournalEvent::Unknown`].
//! A recognized kind missing one of its required fields fails to parse and
//! is dropped by the caller.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{PresenceError, Result};

/// `StationType` value reported for player-owned carriers.
pub const FLEET_CARRIER: &str = "FleetCarrier";

/// `JumpType` value for a jump to another system.
pub const HYPERSPACE: &str = "Hyperspace";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all_fields = "PascalCase")]
pub enum JournalEvent {
    // Session and location
    StartUp,
    LoadGame,
    Location {
        #[serde(default)]
        star_system: Option<String>,
    },
    StartJump {
        jump_type: String,
        #[serde(default)]
        star_system: Option<String>,
    },
    SupercruiseEntry,
    SupercruiseExit,
    #[serde(rename = "FSDJump")]
    FsdJump,
    Docked {
        #[serde(default)]
        station_name: Option<String>,
        #[serde(default)]
        station_type: Option<String>,
    },
    Undocked {
        #[serde(default)]
        station_type: Option<String>,
    },
    ShutDown,
    DockingGranted {
        #[serde(deserialize_with = "string_or_number")]
        landing_pad: String,
    },
    Music {
        #[serde(default)]
        music_track: Option<String>,
    },

    // Planetary surface
    ApproachBody {
        body: String,
    },
    Touchdown {
        player_controlled: bool,
    },
    Liftoff {
        player_controlled: bool,
    },
    LeaveBody,
    #[serde(rename = "LaunchSRV")]
    LaunchSrv,
    #[serde(rename = "DockSRV")]
    DockSrv,

    // On foot
    Disembark {
        #[serde(default)]
        on_planet: Option<bool>,
        #[serde(default)]
        on_station: Option<bool>,
        #[serde(default)]
        body: Option<String>,
    },
    Embark {
        #[serde(default)]
        taxi: Option<bool>,
        #[serde(default)]
        on_planet: Option<bool>,
    },
    FactionKillBond,
    ApproachConflictZone,
    ConflictZone {
        #[serde(default)]
        side: Option<String>,
    },
    ApproachSettlement {
        name: String,
    },
    SettlementApproached {
        name: String,
    },

    // Fleet carrier
    CarrierJumpRequest {
        system_name: String,
    },
    CarrierJumpCancelled,
    CarrierJump {
        star_system: String,
    },
    CarrierStats {
        #[serde(default)]
        crew_count: Option<i64>,
    },
    CarrierBankTransfer,
    CarrierDecommission,

    #[serde(other)]
    Unknown,
}

impl JournalEvent {
    /// Parses a host-supplied journal entry.
    pub fn from_entry(entry: &Value) -> Result<Self> {
        JournalEvent::deserialize(entry).map_err(|source| PresenceError::MalformedEvent { source })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, JournalEvent::Unknown)
    }
}

/// Accepts `"7"` and `7` alike; the journal reports pads as integers.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(value),
        Value::Number(value) => Ok(value.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// Where the host believes the commander is when an event arrives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ambient {
    pub system: Option<String>,
    pub station: Option<String>,
}

impl Ambient {
    pub fn new(system: Option<&str>, station: Option<&str>) -> Self {
        Self {
            system: system.map(str::to_string),
            station: station.map(str::to_string),
        }
    }
}

/// Game editions active for the session, read from the host's state bag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameMode {
    pub horizons: bool,
    pub odyssey: bool,
}

impl GameMode {
    /// Missing or non-boolean flags read as `false`.
    pub fn from_state(state: &Value) -> Self {
        let flag = |key: &str| state.get(key).and_then(Value::as_bool).unwrap_or(false);
        Self {
            horizons: flag("Horizons"),
            odyssey: flag("Odyssey"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_tagged_events_with_pascal_case_fields() {
        let event = JournalEvent::from_entry(&json!({
            "timestamp": "2024-05-01T12:00:00Z",
            "event": "StartJump",
            "JumpType": "Hyperspace",
            "StarSystem": "Achenar",
            "SystemAddress": 164098653
        }))
        .unwrap();

        assert_eq!(
            event,
            JournalEvent::StartJump {
                jump_type: "Hyperspace".to_string(),
                star_system: Some("Achenar".to_string()),
            }
        );
    }

    #[test]
    fn acronym_events_keep_journal_spelling() {
        let fsd = JournalEvent::from_entry(&json!({"event": "FSDJump", "StarSystem": "Sol"}));
        let srv = JournalEvent::from_entry(&json!({"event": "LaunchSRV"}));
        assert_eq!(fsd.unwrap(), JournalEvent::FsdJump);
        assert_eq!(srv.unwrap(), JournalEvent::LaunchSrv);
    }

    #[test]
    fn unrecognized_event_is_unknown() {
        let event = JournalEvent::from_entry(&json!({"event": "Scan", "BodyName": "Earth"}));
        assert!(event.unwrap().is_unknown());
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let err = JournalEvent::from_entry(&json!({"event": "ApproachBody"})).unwrap_err();
        assert!(matches!(err, PresenceError::MalformedEvent { .. }));
    }

    #[test]
    fn missing_event_tag_is_malformed() {
        assert!(JournalEvent::from_entry(&json!({"StarSystem": "Sol"})).is_err());
    }

    #[test]
    fn landing_pad_accepts_numbers_and_strings() {
        let numeric =
            JournalEvent::from_entry(&json!({"event": "DockingGranted", "LandingPad": 14}));
        let text =
            JournalEvent::from_entry(&json!({"event": "DockingGranted", "LandingPad": "7"}));
        assert_eq!(
            numeric.unwrap(),
            JournalEvent::DockingGranted {
                landing_pad: "14".to_string()
            }
        );
        assert_eq!(
            text.unwrap(),
            JournalEvent::DockingGranted {
                landing_pad: "7".to_string()
            }
        );
    }

    #[test]
    fn game_mode_reads_flags_leniently() {
        let mode = GameMode::from_state(&json!({"Horizons": true, "Odyssey": "yes"}));
        assert_eq!(
            mode,
            GameMode {
                horizons: true,
                odyssey: false
            }
        );
        assert_eq!(GameMode::from_state(&Value::Null), GameMode::default());
    }
}
