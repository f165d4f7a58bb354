use serde::{Deserialize, Serialize};

/// Result reported by the platform authenticator for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthOutcome {
    Success,
    UserCancelled,
    Failure,
    /// Too many failed attempts on the current method.
    LockedOut,
    NotAvailable,
}

impl AuthOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, AuthOutcome::Success)
    }

    /// Message shown under the unlock button. `None` for success.
    pub fn failure_message(self) -> Option<&'static str> {
        match self {
            AuthOutcome::Success => None,
            AuthOutcome::Failure => Some("Authentication failed. Please try again."),
            AuthOutcome::UserCancelled => Some("Authentication cancelled."),
            AuthOutcome::LockedOut => {
                Some("Too many attempts. Biometrics locked out, use your PIN instead.")
            }
            AuthOutcome::NotAvailable => {
                Some("Biometric authentication unavailable. Use your PIN instead.")
            }
        }
    }

    /// Whether biometrics may be offered again after this outcome.
    pub fn allows_biometric_retry(self) -> bool {
        !matches!(self, AuthOutcome::LockedOut)
    }
}

/// `LockedOut` message when the PIN path itself was exhausted.
pub const PIN_LOCKED_OUT_MESSAGE: &str = "Too many incorrect PINs. Please try again later.";

/// Message used when the authenticator itself errors out.
pub const UNEXPECTED_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Gate lifecycle.
///
/// ```text
/// Idle -> Checking -> Succeeded
///            |  ^
///            v  |
///           Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    Idle,
    Checking,
    Succeeded,
    Failed,
}

impl AuthStatus {
    pub fn can_begin(self) -> bool {
        matches!(self, AuthStatus::Idle | AuthStatus::Failed)
    }
}

/// Biometric modality reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiometricKind {
    Fingerprint,
    FacialRecognition,
    Iris,
}

/// Signal handed to navigation once the gate settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationSignal {
    Proceed,
    Stay,
}

/// Everything the authenticator needs to show its prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRequest {
    pub prompt: String,
    pub fallback_label: String,
    pub cancel_label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_messages_are_distinct() {
        let msgs: Vec<&str> = [
            AuthOutcome::Failure,
            AuthOutcome::UserCancelled,
            AuthOutcome::LockedOut,
            AuthOutcome::NotAvailable,
        ]
        .iter()
        .filter_map(|o| o.failure_message())
        .collect();
        assert_eq!(msgs.len(), 4);
        for (i, a) in msgs.iter().enumerate() {
            for b in &msgs[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(AuthOutcome::Success.failure_message(), None);
    }

    #[test]
    fn lockout_points_to_pin() {
        let msg = AuthOutcome::LockedOut.failure_message().unwrap();
        assert!(msg.contains("PIN"));
        assert!(!AuthOutcome::LockedOut.allows_biometric_retry());
        assert!(AuthOutcome::Failure.allows_biometric_retry());
        assert!(AuthOutcome::NotAvailable.allows_biometric_retry());
    }

    #[test]
    fn only_idle_and_failed_can_begin() {
        assert!(AuthStatus::Idle.can_begin());
        assert!(AuthStatus::Failed.can_begin());
        assert!(!AuthStatus::Checking.can_begin());
        assert!(!AuthStatus::Succeeded.can_begin());
    }
}
