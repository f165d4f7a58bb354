//! PIN fallback authenticator.

use std::sync::atomic::{AtomicU32, Ordering};

use sha2::{Digest, Sha256};
use tracing::warn;

use super::{AuthOutcome, AuthRequest, Authenticator};
use crate::error::{CollaboratorError, ValidationError};

/// Where the PIN comes from: a terminal, a keypad widget, a test script.
pub trait PinSource: Send + Sync {
    /// Show `request.prompt` and collect a PIN. `Ok(None)` means the user
    /// cancelled.
    fn read_pin(&self, request: &AuthRequest) -> Result<Option<String>, CollaboratorError>;
}

/// Check PIN shape: 4 to 8 ASCII digits.
///
/// # Errors
/// `InvalidValue` for anything else.
pub fn validate_pin(pin: &str) -> Result<(), ValidationError> {
    if (4..=8).contains(&pin.len()) && pin.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: "pin".into(),
            message: "PIN must be 4 to 8 digits".into(),
        })
    }
}

/// Lowercase hex SHA-256 of the PIN.
pub fn hash_pin(pin: &str) -> String {
    hex::encode(Sha256::digest(pin.as_bytes()))
}

/// Compares entered PINs against a stored hash and reports a lockout after
/// `max_attempts` wrong entries.
pub struct PinAuthenticator<S> {
    expected_sha256: Option<String>,
    max_attempts: u32,
    failures: AtomicU32,
    source: S,
}

impl<S: PinSource> PinAuthenticator<S> {
    pub fn new(expected_sha256: Option<String>, max_attempts: u32, source: S) -> Self {
        Self {
            expected_sha256: expected_sha256.map(|h| h.to_ascii_lowercase()),
            max_attempts: max_attempts.max(1),
            failures: AtomicU32::new(0),
            source,
        }
    }

    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    fn check(&self, request: &AuthRequest) -> Result<AuthOutcome, CollaboratorError> {
        let Some(expected) = self.expected_sha256.as_deref() else {
            return Ok(AuthOutcome::NotAvailable);
        };
        if self.failures() >= self.max_attempts {
            return Ok(AuthOutcome::LockedOut);
        }
        let Some(pin) = self.source.read_pin(request)? else {
            return Ok(AuthOutcome::UserCancelled);
        };
        if hash_pin(pin.trim()) == expected {
            self.failures.store(0, Ordering::SeqCst);
            return Ok(AuthOutcome::Success);
        }
        let failures = self.failures.fetch_add(1, Ordering::SeqCst) + 1;
        warn!(failures, max = self.max_attempts, "wrong PIN");
        if failures >= self.max_attempts {
            Ok(AuthOutcome::LockedOut)
        } else {
            Ok(AuthOutcome::Failure)
        }
    }
}

impl<S: PinSource> Authenticator for PinAuthenticator<S> {
    async fn attempt(&self, request: &AuthRequest) -> Result<AuthOutcome, CollaboratorError> {
        self.check(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Scripted(Mutex<Vec<Option<String>>>);

    impl Scripted {
        fn new(entries: &[Option<&str>]) -> Self {
            let mut v: Vec<Option<String>> = entries.iter().map(|e| e.map(String::from)).collect();
            v.reverse();
            Self(Mutex::new(v))
        }
    }

    impl PinSource for Scripted {
        fn read_pin(&self, _request: &AuthRequest) -> Result<Option<String>, CollaboratorError> {
            self.0
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| CollaboratorError::new("pin source", "script exhausted"))
        }
    }

    fn request() -> AuthRequest {
        AuthRequest {
            prompt: "Enter your PIN".into(),
            fallback_label: "Use PIN".into(),
            cancel_label: "Cancel".into(),
        }
    }

    #[test]
    fn hash_is_stable_hex() {
        let h = hash_pin("1234");
        assert_eq!(h.len(), 64);
        assert_eq!(h, hash_pin("1234"));
        assert_ne!(h, hash_pin("4321"));
    }

    #[test]
    fn validate_pin_shape() {
        assert!(validate_pin("1234").is_ok());
        assert!(validate_pin("12345678").is_ok());
        assert!(validate_pin("123").is_err());
        assert!(validate_pin("123456789").is_err());
        assert!(validate_pin("12a4").is_err());
    }

    #[tokio::test]
    async fn correct_pin_succeeds() {
        let auth = PinAuthenticator::new(Some(hash_pin("2468")), 3, Scripted::new(&[Some("2468")]));
        assert_eq!(auth.attempt(&request()).await.unwrap(), AuthOutcome::Success);
    }

    #[tokio::test]
    async fn wrong_pins_lock_out() {
        let auth = PinAuthenticator::new(
            Some(hash_pin("2468")),
            2,
            Scripted::new(&[Some("0000"), Some("1111")]),
        );
        assert_eq!(auth.attempt(&request()).await.unwrap(), AuthOutcome::Failure);
        assert_eq!(auth.attempt(&request()).await.unwrap(), AuthOutcome::LockedOut);
        // Locked without reading again.
        assert_eq!(auth.attempt(&request()).await.unwrap(), AuthOutcome::LockedOut);
        assert_eq!(auth.failures(), 2);
    }

    #[tokio::test]
    async fn cancel_and_missing_pin() {
        let auth = PinAuthenticator::new(Some(hash_pin("2468")), 3, Scripted::new(&[None]));
        assert_eq!(auth.attempt(&request()).await.unwrap(), AuthOutcome::UserCancelled);

        let auth = PinAuthenticator::new(None, 3, Scripted::new(&[]));
        assert_eq!(auth.attempt(&request()).await.unwrap(), AuthOutcome::NotAvailable);
    }

    #[tokio::test]
    async fn source_errors_propagate() {
        let auth = PinAuthenticator::new(Some(hash_pin("2468")), 3, Scripted::new(&[]));
        assert!(auth.attempt(&request()).await.is_err());
    }
}
