//! # Native Collaborator
//!
//! The facade never talks to sensors itself. A platform-specific backend
//! (Swift over LocalAuthentication, Kotlin over BiometricPrompt, or the
//! in-memory [`SimulatedBackend`](crate::simulated::SimulatedBackend))
//! answers three questions:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    BiometricBackend Trait                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  • probe_support()                 - sensor present? enrolled? usable?  │
//! │  • default_authentication_type()   - what would a prompt use right now? │
//! │  • present_prompt(request)         - show the modal prompt, one result  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures come back as [`NativeFailure`] in the platform's own vocabulary;
//! the facade normalizes them.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::native::NativeFailure;
use crate::prompt::PromptRequest;
use crate::types::{AuthenticationType, BiometryType};

/// Result type returned by native collaborators
pub type NativeResult<T> = std::result::Result<T, NativeFailure>;

/// Host operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// iOS (and macOS) LocalAuthentication
    Ios,
    /// Android BiometricPrompt / FingerprintManager
    Android,
}

impl Platform {
    /// Platform of the current build target
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Platform::Android
        } else {
            Platform::Ios
        }
    }

    /// Wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform biometric framework as seen by the facade
#[async_trait]
pub trait BiometricBackend: Send + Sync {
    /// Which platform this backend speaks for
    fn platform(&self) -> Platform;

    /// Query sensor and enrollment state. Must not show any UI.
    async fn probe_support(&self) -> NativeResult<BiometryType>;

    /// The method a prompt issued now would use, without issuing it.
    async fn default_authentication_type(
        &self,
        password_fallback: bool,
    ) -> NativeResult<AuthenticationType>;

    /// Show one modal prompt and report its single terminal outcome.
    async fn present_prompt(&self, request: &PromptRequest) -> NativeResult<AuthenticationType>;
}
