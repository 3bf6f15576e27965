//! Journal event → presence descriptor classification.
//!
//! ## Mapping
//!
//! ```text
//! StartUp / Location          → "In system {system}" + docked/flying
//! StartJump                   → "Jumping" + hyperspace target or supercruise prep
//! SupercruiseEntry / FSDJump  → "In system {system}" + "Supercruising"
//! Docked / Undocked           → "In system {system}" + fleet-carrier-aware details
//! ShutDown / Music(MainMenu)  → "Connecting CMDR Interface"
//! ApproachBody                → writes context.current_body
//! Touchdown / Liftoff / SRV   → details phrased with context.current_body
//! Disembark / Embark          → on-foot details; planet disembark writes the body
//! Ground combat / settlements → details only
//! Carrier*                    → carrier management text
//! DockingGranted              → writes context.current_landing_pad only
//! ```
//!
//! Classification is pure: it never touches the network and always returns
//! a complete descriptor, falling back to generic phrasing when an optional
//! field is absent.

use crate::event::{Ambient, JournalEvent, FLEET_CARRIER, HYPERSPACE};
use crate::types::{Context, PresenceDescriptor, CONNECTING_STATE};

const MAIN_MENU_TRACK: &str = "MainMenu";
const UNKNOWN_SYSTEM: &str = "Unknown";

const FLYING: &str = "Flying in normal space";
const SUPERCRUISING: &str = "Supercruising";

/// Computes the descriptor and context that follow `event`.
///
/// Unrecognized events return both inputs unchanged.
pub fn classify(
    descriptor: &PresenceDescriptor,
    context: &Context,
    event: &JournalEvent,
    ambient: &Ambient,
) -> (PresenceDescriptor, Context) {
    let mut next = descriptor.clone();
    let mut context = context.clone();

    match event {
        JournalEvent::StartUp | JournalEvent::Location { .. } => {
            next.state = in_system(ambient);
            next.details = match ambient.station.as_deref() {
                Some(station) => format!("Docked at {}", station),
                None => FLYING.to_string(),
            };
        }

        JournalEvent::StartJump {
            jump_type,
            star_system,
        } => {
            next.state = "Jumping".to_string();
            next.details = if jump_type == HYPERSPACE {
                match star_system {
                    Some(target) => format!("Jumping to system {}", target),
                    None => "Jumping to another system".to_string(),
                }
            } else {
                "Preparing for supercruise".to_string()
            };
        }

        JournalEvent::SupercruiseEntry | JournalEvent::FsdJump => {
            next.state = in_system(ambient);
            next.details = SUPERCRUISING.to_string();
        }

        JournalEvent::SupercruiseExit => {
            next.state = in_system(ambient);
            next.details = FLYING.to_string();
        }

        JournalEvent::Docked {
            station_name,
            station_type,
        } => {
            let station = ambient.station.as_deref().or(station_name.as_deref());
            let carrier = is_fleet_carrier(station_type.as_deref());
            next.state = in_system(ambient);
            next.details = match (carrier, station) {
                (true, Some(station)) => format!("Docked at Fleet Carrier {}", station),
                (true, None) => "Docked at Fleet Carrier".to_string(),
                (false, Some(station)) => format!("Docked at {}", station),
                (false, None) => "Docked".to_string(),
            };
        }

        JournalEvent::Undocked { station_type } => {
            next.state = in_system(ambient);
            next.details = if is_fleet_carrier(station_type.as_deref()) {
                "Flying near Fleet Carrier".to_string()
            } else {
                FLYING.to_string()
            };
        }

        JournalEvent::ShutDown => {
            next.state = CONNECTING_STATE.to_string();
            next.details = String::new();
        }

        JournalEvent::Music { music_track } => {
            if music_track.as_deref() == Some(MAIN_MENU_TRACK) {
                next.state = CONNECTING_STATE.to_string();
                next.details = String::new();
            }
        }

        JournalEvent::DockingGranted { landing_pad } => {
            context.current_landing_pad = landing_pad.clone();
        }

        JournalEvent::ApproachBody { body } => {
            context.current_body = body.clone();
            next.details = format!("Approaching {}", body);
        }

        JournalEvent::Touchdown { player_controlled } => {
            if *player_controlled {
                next.details = format!("Landed on {}", context.current_body);
            }
        }

        JournalEvent::Liftoff { player_controlled } => {
            next.details = if *player_controlled {
                format!("Flying around {}", context.current_body)
            } else {
                format!("In SRV on {}, ship in orbit", context.current_body)
            };
        }

        JournalEvent::LeaveBody => {
            next.details = SUPERCRUISING.to_string();
        }

        JournalEvent::LaunchSrv => {
            next.details = format!("In SRV on {}", context.current_body);
        }

        JournalEvent::DockSrv => {
            next.details = format!("Landed on {}", context.current_body);
        }

        JournalEvent::Disembark {
            on_planet,
            on_station,
            body,
        } => {
            if on_planet.unwrap_or(false) {
                if let Some(body) = body {
                    context.current_body = body.clone();
                }
                next.details = format!("On foot at {}", context.current_body);
            } else if on_station.unwrap_or(false) {
                next.details = match ambient.station.as_deref() {
                    Some(station) => format!("On foot at {}", station),
                    None => "On foot at a station".to_string(),
                };
            }
        }

        JournalEvent::Embark { taxi, on_planet } => {
            if taxi.unwrap_or(false) {
                next.details = "Traveling via Apex Taxi".to_string();
            } else if on_planet.unwrap_or(false) {
                next.details = format!("Boarding ship at {}", context.current_body);
            }
        }

        JournalEvent::FactionKillBond => {
            next.details = format!("Ground combat in {}", system_name(ambient));
        }

        JournalEvent::ApproachConflictZone => {
            next.details = "Approaching conflict zone".to_string();
        }

        JournalEvent::ConflictZone { side } => {
            next.details = format!("Combat ({})", side.as_deref().unwrap_or(""));
        }

        JournalEvent::ApproachSettlement { name } => {
            next.details = format!("Approaching {}", name);
        }

        JournalEvent::SettlementApproached { name } => {
            next.details = format!("At {}", name);
        }

        JournalEvent::CarrierJumpRequest { system_name } => {
            next.state = "Fleet Carrier preparing jump".to_string();
            next.details = format!("To {}", system_name);
        }

        JournalEvent::CarrierJumpCancelled => {
            next.state = in_system(ambient);
            next.details = "Docked at Fleet Carrier".to_string();
        }

        // The carrier's destination is authoritative; the ambient system still
        // reflects where the commander was before the jump.
        JournalEvent::CarrierJump { star_system } => {
            next.state = format!("In system {}", star_system);
            next.details = "Fleet Carrier arrived".to_string();
        }

        JournalEvent::CarrierStats { crew_count } => {
            next.details = match crew_count {
                Some(count) if *count > 0 => format!("Managing Fleet Carrier ({} crew)", count),
                _ => "Managing Fleet Carrier".to_string(),
            };
        }

        JournalEvent::CarrierBankTransfer => {
            next.details = "Managing Fleet Carrier finances".to_string();
        }

        JournalEvent::CarrierDecommission => {
            next.state = in_system(ambient);
            next.details = "Decommissioning Fleet Carrier".to_string();
        }

        JournalEvent::LoadGame | JournalEvent::Unknown => {}
    }

    (next, context)
}

fn system_name(ambient: &Ambient) -> &str {
    ambient.system.as_deref().unwrap_or(UNKNOWN_SYSTEM)
}

fn in_system(ambient: &Ambient) -> String {
    format!("In system {}", system_name(ambient))
}

fn is_fleet_carrier(station_type: Option<&str>) -> bool {
    station_type == Some(FLEET_CARRIER)
}
