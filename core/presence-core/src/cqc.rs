//! Close Quarters Combat (CQC) classification.
//!
//! CQC matches run in a separate game mode with their own journal. Only the
//! lobby and the arena map are worth showing, so this path ignores the
//! regular [`Context`](crate::types::Context) entirely.

use crate::event::{GameMode, JournalEvent};
use crate::types::PresenceDescriptor;

const CQC_MENU_TRACK: &str = "CQCMenu";
const LOBBY: &str = "In lobby/queue";

/// Arena maps, keyed by the system the CQC instance reports.
const ARENAS: &[(&str, &str)] = &[
    ("Bleae Aewsy GA-Y d1-14", "Asteria Point"),
    ("Eta Cephei", "Cluster Compound"),
    ("Theta Ursae Majoris", "Elevate"),
    ("Boepp SU-E d12-818", "Ice Field"),
];

pub fn classify_cqc(
    descriptor: &PresenceDescriptor,
    event: &JournalEvent,
    mode: GameMode,
) -> PresenceDescriptor {
    let mut next = descriptor.clone();

    match event {
        JournalEvent::LoadGame | JournalEvent::StartUp => {
            next.state = playing_state(mode);
            next.details = LOBBY.to_string();
        }
        JournalEvent::Music { music_track } if music_track.as_deref() == Some(CQC_MENU_TRACK) => {
            next.state = playing_state(mode);
            next.details = LOBBY.to_string();
        }
        JournalEvent::Location {
            star_system: Some(system),
        } => {
            next.state = playing_state(mode);
            next.details = arena_name(system).unwrap_or_default().to_string();
        }
        _ => {}
    }

    next
}

pub fn arena_name(system: &str) -> Option<&'static str> {
    ARENAS
        .iter()
        .find(|(arena_system, _)| *arena_system == system)
        .map(|(_, name)| *name)
}

fn playing_state(mode: GameMode) -> String {
    if mode.horizons {
        "Playing CQC in Horizons".to_string()
    } else if mode.odyssey {
        "Playing CQC in Odyssey".to_string()
    } else {
        "Playing CQC".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn event(entry: serde_json::Value) -> JournalEvent {
        JournalEvent::from_entry(&entry).unwrap()
    }

    #[test]
    fn load_game_enters_lobby_with_edition() {
        let before = PresenceDescriptor::connecting(Utc::now());
        let next = classify_cqc(
            &before,
            &event(json!({"event": "LoadGame"})),
            GameMode {
                horizons: false,
                odyssey: true,
            },
        );
        assert_eq!(next.state, "Playing CQC in Odyssey");
        assert_eq!(next.details, "In lobby/queue");
    }

    #[test]
    fn location_names_the_arena() {
        let before = PresenceDescriptor::connecting(Utc::now());
        let mode = GameMode {
            horizons: true,
            odyssey: false,
        };
        let known = classify_cqc(
            &before,
            &event(json!({"event": "Location", "StarSystem": "Eta Cephei"})),
            mode,
        );
        let unknown = classify_cqc(
            &before,
            &event(json!({"event": "Location", "StarSystem": "Sol"})),
            mode,
        );

        assert_eq!(known.state, "Playing CQC in Horizons");
        assert_eq!(known.details, "Cluster Compound");
        assert_eq!(unknown.details, "");
    }

    #[test]
    fn location_without_system_and_other_music_are_ignored() {
        let before = PresenceDescriptor::connecting(Utc::now());
        let mode = GameMode::default();
        let location = classify_cqc(&before, &event(json!({"event": "Location"})), mode);
        let music = classify_cqc(
            &before,
            &event(json!({"event": "Music", "MusicTrack": "MainMenu"})),
            mode,
        );
        assert_eq!(location, before);
        assert_eq!(music, before);
    }

    #[test]
    fn cqc_menu_music_without_edition() {
        let before = PresenceDescriptor::connecting(Utc::now());
        let next = classify_cqc(
            &before,
            &event(json!({"event": "Music", "MusicTrack": "CQCMenu"})),
            GameMode::default(),
        );
        assert_eq!(next.state, "Playing CQC");
    }
}
