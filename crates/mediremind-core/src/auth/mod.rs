//! Lock-screen authentication.
//!
//! [`AuthGate`] decides whether the user may proceed to their medication
//! data. The device probe and the prompt itself are external collaborators
//! behind [`DeviceCapability`] and [`Authenticator`].

mod collaborators;
mod gate;
mod outcome;
mod pin;

pub use collaborators::{Authenticator, DeviceCapability, NoBiometrics};
pub use gate::{AuthGate, AuthLabels, ProbeReport};
pub use outcome::{
    AuthOutcome, AuthRequest, AuthStatus, BiometricKind, NavigationSignal,
    PIN_LOCKED_OUT_MESSAGE, UNEXPECTED_FAILURE_MESSAGE,
};
pub use pin::{hash_pin, validate_pin, PinAuthenticator, PinSource};
