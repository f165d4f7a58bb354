//! Authentication gate state machine.
//!
//! One gate lives for one visit to the lock screen. It is created on entry,
//! probed once for biometric capability, and dropped on navigation away.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Checking -> (Succeeded | Failed)
//! Failed -> Checking                         (retry)
//! ```
//!
//! `Succeeded` is terminal. Everything a lock screen renders (prompt text,
//! button label, disabled state, navigation) is derived from the gate's
//! fields rather than tracked separately.
//!
//! ## Usage
//!
//! ```ignore
//! let mut gate = AuthGate::new(AuthLabels::default());
//! gate.probe(&device).await;
//! gate.authenticate(&authenticator).await;
//! if gate.navigation() == NavigationSignal::Proceed { /* ... */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::collaborators::{Authenticator, DeviceCapability};
use super::outcome::{PIN_LOCKED_OUT_MESSAGE, UNEXPECTED_FAILURE_MESSAGE};
use super::{AuthOutcome, AuthRequest, AuthStatus, BiometricKind, NavigationSignal};
use crate::events::Event;

const PIN_PROMPT: &str = "Enter your PIN to access your medications";

/// Labels passed to the platform prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthLabels {
    pub fallback_label: String,
    pub cancel_label: String,
}

impl Default for AuthLabels {
    fn default() -> Self {
        Self {
            fallback_label: "Use PIN".into(),
            cancel_label: "Cancel".into(),
        }
    }
}

/// What the device capability probe found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub has_hardware: bool,
    pub is_enrolled: bool,
    pub kinds: Vec<BiometricKind>,
}

impl ProbeReport {
    pub fn biometric_available(&self) -> bool {
        self.has_hardware && self.is_enrolled
    }
}

/// Per-entry authentication session.
#[derive(Debug, Clone, Serialize)]
pub struct AuthGate {
    biometric_available: bool,
    kinds: Vec<BiometricKind>,
    status: AuthStatus,
    error_message: Option<String>,
    last_outcome: Option<AuthOutcome>,
    /// Set once the platform reports a lockout; biometrics stay off for
    /// the rest of the session.
    biometric_locked_out: bool,
    attempts: u32,
    labels: AuthLabels,
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new(AuthLabels::default())
    }
}

impl AuthGate {
    pub fn new(labels: AuthLabels) -> Self {
        Self {
            biometric_available: false,
            kinds: Vec::new(),
            status: AuthStatus::Idle,
            error_message: None,
            last_outcome: None,
            biometric_locked_out: false,
            attempts: 0,
            labels,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> AuthStatus {
        self.status
    }

    pub fn biometric_available(&self) -> bool {
        self.biometric_available
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn last_outcome(&self) -> Option<AuthOutcome> {
        self.last_outcome
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The unlock control is disabled while an attempt is in flight.
    pub fn is_busy(&self) -> bool {
        self.status == AuthStatus::Checking
    }

    /// Biometrics are off the table: none on the device, or locked out.
    pub fn requires_pin_fallback(&self) -> bool {
        !self.biometric_available || self.biometric_locked_out
    }

    fn offers_biometrics(&self) -> bool {
        !self.requires_pin_fallback()
    }

    pub fn prompt_text(&self) -> String {
        if !self.offers_biometrics() {
            return PIN_PROMPT.to_string();
        }
        let face = self.kinds.contains(&BiometricKind::FacialRecognition);
        let finger = self.kinds.contains(&BiometricKind::Fingerprint);
        let method = match (face, finger) {
            (true, false) => "Face ID",
            (false, true) => "Touch ID",
            _ => "Face ID/Touch ID",
        };
        format!("Use {method} to access your medications")
    }

    pub fn instruction_text(&self) -> &'static str {
        if self.offers_biometrics() {
            "Use Face ID/Touch ID or PIN to access your medications"
        } else {
            PIN_PROMPT
        }
    }

    pub fn button_label(&self) -> &'static str {
        if self.is_busy() {
            "Verifying..."
        } else if self.offers_biometrics() {
            "Authenticate"
        } else {
            "Enter PIN"
        }
    }

    pub fn navigation(&self) -> NavigationSignal {
        if self.status == AuthStatus::Succeeded {
            NavigationSignal::Proceed
        } else {
            NavigationSignal::Stay
        }
    }

    pub fn snapshot(&self) -> Event {
        Event::AuthSnapshot {
            status: self.status,
            biometric_available: self.biometric_available,
            error_message: self.error_message.clone(),
            prompt: self.prompt_text(),
            button_label: self.button_label().to_string(),
            busy: self.is_busy(),
            navigation: self.navigation(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Record the capability probe. Only meaningful before the first attempt.
    pub fn apply_probe(&mut self, report: ProbeReport) -> Option<Event> {
        if self.status != AuthStatus::Idle {
            debug!(status = ?self.status, "ignoring probe after session start");
            return None;
        }
        self.biometric_available = report.biometric_available();
        self.kinds = report.kinds;
        Some(Event::AuthProbed {
            biometric_available: self.biometric_available,
            at: Utc::now(),
        })
    }

    /// Ask the device what it supports.
    ///
    /// Any probe error leaves biometrics unavailable so the session falls
    /// back to PIN rather than granting anything.
    pub async fn probe<C: DeviceCapability>(&mut self, capability: &C) -> Option<Event> {
        let has_hardware = capability.has_biometric_hardware().await;
        let is_enrolled = capability.is_biometric_enrolled().await;
        let report = match (has_hardware, is_enrolled) {
            (Ok(has_hardware), Ok(is_enrolled)) => {
                let kinds = if has_hardware && is_enrolled {
                    capability
                        .supported_biometric_kinds()
                        .await
                        .unwrap_or_else(|e| {
                            warn!(error = %e, "biometric kind lookup failed");
                            Vec::new()
                        })
                } else {
                    Vec::new()
                };
                ProbeReport {
                    has_hardware,
                    is_enrolled,
                    kinds,
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "capability probe failed, falling back to PIN");
                ProbeReport::default()
            }
        };
        self.apply_probe(report)
    }

    /// Start an attempt.
    ///
    /// Returns the prompt request to hand to the authenticator, or `None`
    /// when an attempt is already in flight or the session already
    /// succeeded. A `None` means the authenticator must not be called.
    pub fn begin_authentication(&mut self) -> Option<AuthRequest> {
        if !self.status.can_begin() {
            debug!(status = ?self.status, "begin_authentication ignored");
            return None;
        }
        self.status = AuthStatus::Checking;
        self.error_message = None;
        self.attempts += 1;
        info!(attempt = self.attempts, "authentication started");
        Some(AuthRequest {
            prompt: self.prompt_text(),
            fallback_label: self.labels.fallback_label.clone(),
            cancel_label: self.labels.cancel_label.clone(),
        })
    }

    /// Fold the authenticator's answer into the gate. Ignored unless checking.
    pub fn resolve(&mut self, outcome: AuthOutcome) -> Option<Event> {
        if self.status != AuthStatus::Checking {
            debug!(?outcome, status = ?self.status, "stale outcome ignored");
            return None;
        }
        self.last_outcome = Some(outcome);

        match outcome.failure_message() {
            None => {
                self.status = AuthStatus::Succeeded;
                self.error_message = None;
                info!(attempt = self.attempts, "authentication succeeded");
                Some(Event::AuthSucceeded {
                    attempt: self.attempts,
                    navigation: self.navigation(),
                    at: Utc::now(),
                })
            }
            Some(message) => {
                let mut message = message;
                if outcome == AuthOutcome::LockedOut {
                    // Locked out while already on the PIN path.
                    if self.requires_pin_fallback() {
                        message = PIN_LOCKED_OUT_MESSAGE;
                    }
                    self.biometric_locked_out = true;
                }
                Some(self.fail(Some(outcome), message))
            }
        }
    }

    /// User backed out of an in-flight attempt.
    pub fn cancel(&mut self) -> Option<Event> {
        self.resolve(AuthOutcome::UserCancelled)
    }

    /// Run one full attempt against the authenticator.
    ///
    /// Returns `None` without contacting the authenticator when an attempt
    /// cannot begin.
    pub async fn authenticate<A: Authenticator>(&mut self, authenticator: &A) -> Option<Event> {
        let request = self.begin_authentication()?;
        match authenticator.attempt(&request).await {
            Ok(outcome) => self.resolve(outcome),
            Err(e) => {
                warn!(error = %e, "authenticator error");
                Some(self.fail(None, UNEXPECTED_FAILURE_MESSAGE))
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn fail(&mut self, outcome: Option<AuthOutcome>, message: &str) -> Event {
        self.status = AuthStatus::Failed;
        self.error_message = Some(message.to_string());
        self.last_outcome = outcome;
        info!(attempt = self.attempts, ?outcome, "authentication failed");
        Event::AuthFailed {
            attempt: self.attempts,
            outcome,
            message: message.to_string(),
            retryable: outcome.map_or(true, AuthOutcome::allows_biometric_retry),
            at: Utc::now(),
        }
    }
}
