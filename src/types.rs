//! # Request and Response Shapes
//!
//! Value objects exchanged across the facade. None of them is persisted or
//! mutated after construction. Field names serialize in camelCase so the JSON
//! matches the JavaScript contract of the host framework.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of biometric sensor the device offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BiometryType {
    /// Face recognition
    FaceID,
    /// Fingerprint sensor (iOS)
    TouchID,
    /// Fingerprint sensor (Android)
    Fingerprint,
}

impl BiometryType {
    /// Wire string of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FaceID => "FaceID",
            Self::TouchID => "TouchID",
            Self::Fingerprint => "Fingerprint",
        }
    }

    /// Parse a wire string
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "FaceID" => Some(Self::FaceID),
            "TouchID" => Some(Self::TouchID),
            "Fingerprint" => Some(Self::Fingerprint),
            _ => None,
        }
    }
}

impl fmt::Display for BiometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which method satisfies (or would satisfy) a challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthenticationType {
    /// The biometric sensor
    AuthenticationTypeBiometrics,
    /// The device passcode/password fallback
    AuthenticationTypePassword,
}

impl AuthenticationType {
    /// Wire string of this type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationTypeBiometrics => "AuthenticationTypeBiometrics",
            Self::AuthenticationTypePassword => "AuthenticationTypePassword",
        }
    }
}

/// Options for `is_supported`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsSupportedConfig {
    /// Return unified error messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unified_errors: Option<bool>,
}

/// Options for `get_authenticate_type`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAuthenticateTypeConfig {
    /// **iOS only** - allow the device passcode. Defaults to false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_fallback: Option<bool>,
}

/// Options for `authenticate`.
///
/// One structure serves every platform. Fields marked for a single platform
/// have no effect elsewhere and are never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateConfig {
    /// Return unified error messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unified_errors: Option<bool>,
    /// **Android only** - title of the confirmation dialog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// **Android only** - color of the fingerprint image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_color: Option<String>,
    /// **Android only** - color of the fingerprint image after a failed attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_error_color: Option<String>,
    /// **Android only** - text next to the fingerprint image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_description: Option<String>,
    /// **Android only** - text next to the fingerprint image after a failed attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_error_description: Option<String>,
    /// **Android only** - cancel button text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_text: Option<String>,
    /// **iOS only** - fallback button label. An empty string hides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_label: Option<String>,
    /// **iOS only** - allow the device passcode. Defaults to false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_fallback: Option<bool>,
}

/// Result of a successful challenge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateSuccess {
    /// The method that satisfied the challenge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<AuthenticationType>,
}

impl AuthenticateSuccess {
    /// Success through the given method
    pub fn with(auth_type: AuthenticationType) -> Self {
        Self {
            auth_type: Some(auth_type),
        }
    }
}
