use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthOutcome, AuthStatus, NavigationSignal};

/// Every state change in the system produces an Event.
/// Front-ends render them; a notification layer may subscribe to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Device probe finished for a new session.
    AuthProbed {
        biometric_available: bool,
        at: DateTime<Utc>,
    },
    AuthSucceeded {
        attempt: u32,
        navigation: NavigationSignal,
        at: DateTime<Utc>,
    },
    /// `outcome` is `None` when the authenticator itself errored.
    AuthFailed {
        attempt: u32,
        outcome: Option<AuthOutcome>,
        message: String,
        retryable: bool,
        at: DateTime<Utc>,
    },
    AuthSnapshot {
        status: AuthStatus,
        biometric_available: bool,
        error_message: Option<String>,
        prompt: String,
        button_label: String,
        busy: bool,
        navigation: NavigationSignal,
        at: DateTime<Utc>,
    },
    DoseConsumed {
        medication_id: String,
        remaining_supply: Option<u32>,
        underflow: bool,
        at: DateTime<Utc>,
    },
    /// Supply reached the refill threshold.
    RefillDue {
        medication_id: String,
        medication_name: String,
        current_supply: u32,
        refill_threshold: u32,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let ev = Event::DoseConsumed {
            medication_id: "m1".into(),
            remaining_supply: Some(4),
            underflow: false,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "DoseConsumed");
        assert_eq!(json["remaining_supply"], 4);
    }
}
