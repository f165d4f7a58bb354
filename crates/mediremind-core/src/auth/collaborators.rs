use std::future::Future;

use super::{AuthOutcome, AuthRequest, BiometricKind};
use crate::error::CollaboratorError;

/// Device capability probe. Consulted once per session.
pub trait DeviceCapability: Send + Sync {
    fn has_biometric_hardware(&self) -> impl Future<Output = Result<bool, CollaboratorError>> + Send;

    fn is_biometric_enrolled(&self) -> impl Future<Output = Result<bool, CollaboratorError>> + Send;

    fn supported_biometric_kinds(
        &self,
    ) -> impl Future<Output = Result<Vec<BiometricKind>, CollaboratorError>> + Send;
}

/// The single point of contact with platform security hardware.
///
/// Implementations show the prompt, wait for the user, and report how it
/// went. A user cancel must come back as `UserCancelled`, not hang.
pub trait Authenticator: Send + Sync {
    fn attempt(
        &self,
        request: &AuthRequest,
    ) -> impl Future<Output = Result<AuthOutcome, CollaboratorError>> + Send;
}

/// Device without any biometric hardware. PIN only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBiometrics;

impl DeviceCapability for NoBiometrics {
    async fn has_biometric_hardware(&self) -> Result<bool, CollaboratorError> {
        Ok(false)
    }

    async fn is_biometric_enrolled(&self) -> Result<bool, CollaboratorError> {
        Ok(false)
    }

    async fn supported_biometric_kinds(&self) -> Result<Vec<BiometricKind>, CollaboratorError> {
        Ok(Vec::new())
    }
}
