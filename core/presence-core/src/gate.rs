//! Change gate between classification and publishing.
//!
//! Most journal events leave the visible text untouched; re-sending identical
//! text only burns the presence service's rate limit.

use crate::types::PresenceDescriptor;

/// True when the visible `(state, details)` pair differs.
pub fn should_publish(old: &PresenceDescriptor, new: &PresenceDescriptor) -> bool {
    !old.same_text(new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn identical_text_is_blocked() {
        let now = Utc::now();
        let old = PresenceDescriptor::new("In system Sol", "Supercruising", now);
        let new = PresenceDescriptor::new(
            "In system Sol",
            "Supercruising",
            now + Duration::minutes(5),
        );
        assert!(!should_publish(&old, &new));
    }

    #[test]
    fn either_line_changing_passes() {
        let now = Utc::now();
        let old = PresenceDescriptor::new("In system Sol", "Supercruising", now);
        let details = PresenceDescriptor::new("In system Sol", "Flying in normal space", now);
        let state = PresenceDescriptor::new("Jumping", "Supercruising", now);
        assert!(should_publish(&old, &details));
        assert!(should_publish(&old, &state));
    }
}
