//! # Biometric Identification
//!
//! A cross-platform biometric authentication contract for mobile hosts.
//! Checks whether the device can authenticate biometrically, reports which
//! method a challenge would use, and runs the challenge. Matching, secure
//! hardware and dialog rendering stay in the operating system; this crate
//! shapes the calling contract around them.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      BIOMETRIC IDENTIFICATION                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Swift / Kotlin / TypeScript                                            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  ffi (feature "ffi")    biometrics_call(method, json)           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Biometrics facade                                              │   │
//! │  │  is_supported │ get_authenticate_type │ authenticate            │   │
//! │  └──────┬──────────────────────┬───────────────────────────────────┘   │
//! │         │                      │                                        │
//! │  ┌──────▼──────┐  ┌────────────▼────┐  ┌─────────────────────────┐     │
//! │  │   prompt    │  │     native      │  │        backend          │     │
//! │  │ - defaults  │  │ - LAError names │  │ - BiometricBackend      │     │
//! │  │ - platform  │  │ - Android codes │  │ - SimulatedBackend      │     │
//! │  │   filtering │  │ - normalization │  │ - host callbacks (ffi)  │     │
//! │  └─────────────┘  └─────────────────┘  └─────────────────────────┘     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use biometric_identification::{Biometrics, SimulatedBackend, SimulatedDevice};
//!
//! let backend = Arc::new(SimulatedBackend::new(SimulatedDevice::iphone_face_id()));
//! let biometrics = Biometrics::new(backend);
//! let kind = biometrics.is_supported(None).await?;
//! ```
//!
//! ## Platform Support
//!
//! | Platform | Native framework | Collaborator |
//! |----------|------------------|--------------|
//! | iOS | LocalAuthentication | Swift callbacks via C FFI |
//! | Android | BiometricPrompt | Kotlin callbacks via C FFI |
//! | Desktop | none | `SimulatedBackend` |

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod backend;
pub mod error;
pub mod facade;
pub mod native;
pub mod prompt;
pub mod simulated;
pub mod types;

#[cfg(feature = "ffi")]
pub mod ffi;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use backend::{BiometricBackend, NativeResult, Platform};
pub use error::{BiometricError, Error, ErrorCode, Result};
pub use facade::{BiometricResult, Biometrics};
pub use native::{NativeCode, NativeFailure};
pub use prompt::{Color, PromptDefaults, PromptRequest, PromptStyle};
pub use simulated::{SimulatedBackend, SimulatedDevice, UserAction};
pub use types::{
    AuthenticateConfig, AuthenticateSuccess, AuthenticationType, BiometryType,
    GetAuthenticateTypeConfig, IsSupportedConfig,
};

use serde::{Deserialize, Serialize};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for a [`Biometrics`] facade
///
/// Deserializes from camelCase JSON; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BiometricsConfig {
    /// `unifiedErrors` applied when a call passes no options
    pub unified_errors: bool,
    /// Presentation values for fields a call leaves unset
    pub prompt_defaults: PromptDefaults,
}

impl BiometricsConfig {
    /// Parse from JSON, treating an empty string as the defaults
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of this crate
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Returns build information for debugging
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        #[cfg(target_os = "ios")]
        target: "ios",
        #[cfg(target_os = "android")]
        target: "android",
        #[cfg(target_os = "macos")]
        target: "macos",
        #[cfg(target_os = "linux")]
        target: "linux",
        #[cfg(target_os = "windows")]
        target: "windows",
        #[cfg(not(any(
            target_os = "ios",
            target_os = "android",
            target_os = "macos",
            target_os = "linux",
            target_os = "windows"
        )))]
        target: "unknown",
        profile: if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        },
    }
}

/// Build information for debugging
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Crate version
    pub version: &'static str,
    /// Target OS
    pub target: &'static str,
    /// Build profile (debug/release)
    pub profile: &'static str,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_build_info() {
        let info = build_info();
        assert_eq!(info.version, version());
    }

    #[test]
    fn test_config_from_json() {
        let config = BiometricsConfig::from_json(
            r##"{"unifiedErrors":true,"promptDefaults":{"title":"Verify","imageColor":"#00ff00"}}"##,
        )
        .unwrap();
        assert!(config.unified_errors);
        assert_eq!(config.prompt_defaults.title, "Verify");
        assert_eq!(config.prompt_defaults.image_color.to_string(), "#00ff00");
        assert_eq!(config.prompt_defaults.cancel_text, prompt::DEFAULT_CANCEL_TEXT);

        assert_eq!(BiometricsConfig::from_json("  ").unwrap(), BiometricsConfig::default());
        assert!(matches!(
            BiometricsConfig::from_json("{not json"),
            Err(Error::DeserializationError(_))
        ));
    }
}
