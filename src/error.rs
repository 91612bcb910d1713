//! # Error Handling
//!
//! Two layers of errors live here.
//!
//! ## Operation Failures
//!
//! Every failed facade operation produces a [`BiometricError`]: a tagged
//! value with a fixed `name`, a human-readable `message`, a machine-checkable
//! [`ErrorCode`] and free-form `details`. Callers branch on `code`, never on
//! the message text.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR CODES                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  is_supported / get_authenticate_type        authenticate               │
//! │  ──────────────────────────────────          ────────────               │
//! │  NOT_SUPPORTED                               (all four on the left)     │
//! │  NOT_AVAILABLE                               AUTHENTICATION_FAILED      │
//! │  NOT_PRESENT                                 USER_CANCELED              │
//! │  NOT_ENROLLED                                SYSTEM_CANCELED            │
//! │                                              TIMEOUT                    │
//! │                                              LOCKOUT                    │
//! │                                              LOCKOUT_PERMANENT          │
//! │                                              PROCESSING_ERROR           │
//! │                                              USER_FALLBACK              │
//! │                                              UNKNOWN_ERROR              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The support-check codes are a strict subset of the authentication codes.
//! Both are one flat [`ErrorCode`] enum; [`ErrorCode::is_support_code`]
//! marks the subset.
//!
//! ## Binding Failures
//!
//! Failures of the binding layer itself (state not initialized, no native
//! collaborator installed, malformed JSON) are [`Error`]. Across the FFI
//! boundary both become an integer code plus a message:
//!
//! ```text
//!  Result<T, Error>  ──────►  ErrorCode + Message  ──────►  reject(Promise)
//!                              (integer + string)          (JavaScript)
//!
//!  Err(Error::Biometric(USER_CANCELED))  →  { code: 305, message: "{...}" }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for binding-layer operations
pub type Result<T> = std::result::Result<T, Error>;

/// The fixed `name` tag carried by every [`BiometricError`]
pub const ERROR_NAME: &str = "TouchIDError";

// ============================================================================
// ERROR CODE TAXONOMY
// ============================================================================

/// Machine-checkable failure code.
///
/// Serialized as the upper snake case strings of the JavaScript contract
/// (`"NOT_ENROLLED"`, `"USER_CANCELED"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The platform has no biometric capability at all
    NotSupported,
    /// Capability exists but is temporarily unusable (locked out, disabled)
    NotAvailable,
    /// No biometric hardware on this device
    NotPresent,
    /// Hardware present but nothing enrolled
    NotEnrolled,
    /// The sensor read did not match an enrolled template
    AuthenticationFailed,
    /// The user dismissed the prompt
    UserCanceled,
    /// The platform interrupted the prompt
    SystemCanceled,
    /// The prompt timed out
    Timeout,
    /// Temporary throttle after repeated failures
    Lockout,
    /// Throttle that only a credential re-entry resets
    LockoutPermanent,
    /// The native layer could not process the request
    ProcessingError,
    /// The user chose the fallback path while it was not auto-selected
    UserFallback,
    /// Anything the native layer reported that has no better mapping
    UnknownError,
}

impl ErrorCode {
    /// Every code, in ordinal order
    pub const ALL: [ErrorCode; 13] = [
        ErrorCode::NotSupported,
        ErrorCode::NotAvailable,
        ErrorCode::NotPresent,
        ErrorCode::NotEnrolled,
        ErrorCode::AuthenticationFailed,
        ErrorCode::UserCanceled,
        ErrorCode::SystemCanceled,
        ErrorCode::Timeout,
        ErrorCode::Lockout,
        ErrorCode::LockoutPermanent,
        ErrorCode::ProcessingError,
        ErrorCode::UserFallback,
        ErrorCode::UnknownError,
    ];

    /// The codes `is_supported` and `get_authenticate_type` may fail with
    pub const SUPPORT_CODES: [ErrorCode; 4] = [
        ErrorCode::NotSupported,
        ErrorCode::NotAvailable,
        ErrorCode::NotPresent,
        ErrorCode::NotEnrolled,
    ];

    /// Wire string of this code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotSupported => "NOT_SUPPORTED",
            Self::NotAvailable => "NOT_AVAILABLE",
            Self::NotPresent => "NOT_PRESENT",
            Self::NotEnrolled => "NOT_ENROLLED",
            Self::AuthenticationFailed => "AUTHENTICATION_FAILED",
            Self::UserCanceled => "USER_CANCELED",
            Self::SystemCanceled => "SYSTEM_CANCELED",
            Self::Timeout => "TIMEOUT",
            Self::Lockout => "LOCKOUT",
            Self::LockoutPermanent => "LOCKOUT_PERMANENT",
            Self::ProcessingError => "PROCESSING_ERROR",
            Self::UserFallback => "USER_FALLBACK",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Parse a wire string
    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == code)
    }

    /// Whether this code belongs to the support-check subset
    pub fn is_support_code(&self) -> bool {
        Self::SUPPORT_CODES.contains(self)
    }

    /// Collapse a code into the support-check subset.
    ///
    /// Anything outside the subset means the capability cannot be used right
    /// now, which is `NOT_AVAILABLE`.
    pub fn narrow_to_support(self) -> Self {
        if self.is_support_code() {
            self
        } else {
            Self::NotAvailable
        }
    }

    /// Position in [`ErrorCode::ALL`]
    pub fn ordinal(&self) -> i32 {
        match self {
            Self::NotSupported => 0,
            Self::NotAvailable => 1,
            Self::NotPresent => 2,
            Self::NotEnrolled => 3,
            Self::AuthenticationFailed => 4,
            Self::UserCanceled => 5,
            Self::SystemCanceled => 6,
            Self::Timeout => 7,
            Self::Lockout => 8,
            Self::LockoutPermanent => 9,
            Self::ProcessingError => 10,
            Self::UserFallback => 11,
            Self::UnknownError => 12,
        }
    }

    /// Unified human-readable description, used when `unifiedErrors` is set
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotSupported => "Biometric authentication is not supported on this platform",
            Self::NotAvailable => "Biometric authentication is currently unavailable",
            Self::NotPresent => "No biometric hardware is present on this device",
            Self::NotEnrolled => "No biometrics are enrolled on this device",
            Self::AuthenticationFailed => "Authentication was not successful",
            Self::UserCanceled => "Authentication was canceled by the user",
            Self::SystemCanceled => "Authentication was canceled by the system",
            Self::Timeout => "Authentication timed out",
            Self::Lockout => "Too many attempts; biometric authentication is temporarily locked",
            Self::LockoutPermanent => {
                "Too many attempts; enter the device credential to unlock biometrics"
            }
            Self::ProcessingError => "The biometric request could not be processed",
            Self::UserFallback => "The user chose to use the fallback credential",
            Self::UnknownError => "An unknown biometric error occurred",
        }
    }

    /// Whether trying again later can succeed without the user changing
    /// device settings
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed
                | Self::UserCanceled
                | Self::SystemCanceled
                | Self::Timeout
                | Self::Lockout
                | Self::UserFallback
        )
    }

    /// Whether the user must act in device settings (enroll, re-enter
    /// credential) before biometrics work again
    pub fn requires_user_action(&self) -> bool {
        matches!(self, Self::NotEnrolled | Self::LockoutPermanent)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TAGGED OPERATION FAILURE
// ============================================================================

/// Failure value returned by the facade operations.
///
/// Serializes as `{ "name": "TouchIDError", "message", "code", "details" }`.
/// Deserialization rejects any other `name`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireBiometricError", try_from = "WireBiometricError")]
#[error("{code}: {message}")]
pub struct BiometricError {
    /// Human-readable message
    pub message: String,
    /// Code from the closed taxonomy
    pub code: ErrorCode,
    /// Free-form diagnostics
    pub details: String,
}

impl BiometricError {
    /// Create an error with an explicit message
    pub fn new(code: ErrorCode, message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            details: details.into(),
        }
    }

    /// Create an error carrying the unified description of `code`
    pub fn unified(code: ErrorCode, details: impl Into<String>) -> Self {
        Self::new(code, code.description(), details)
    }

    /// The fixed name tag
    pub fn name(&self) -> &'static str {
        ERROR_NAME
    }

    /// Narrow into the support-check subset, keeping the original code in
    /// `details` when it changes. With `unified` set the message follows the
    /// narrowed code.
    pub fn into_support_error(self, unified: bool) -> Self {
        if self.code.is_support_code() {
            return self;
        }
        let narrowed = self.code.narrow_to_support();
        let details = if self.details.is_empty() {
            self.code.as_str().to_string()
        } else {
            format!("{}: {}", self.code, self.details)
        };
        let message = if unified {
            narrowed.description().to_string()
        } else {
            self.message
        };
        Self {
            message,
            code: narrowed,
            details,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct WireBiometricError {
    name: String,
    message: String,
    code: ErrorCode,
    #[serde(default)]
    details: String,
}

impl From<BiometricError> for WireBiometricError {
    fn from(err: BiometricError) -> Self {
        Self {
            name: ERROR_NAME.to_string(),
            message: err.message,
            code: err.code,
            details: err.details,
        }
    }
}

impl TryFrom<WireBiometricError> for BiometricError {
    type Error = String;

    fn try_from(wire: WireBiometricError) -> std::result::Result<Self, Self::Error> {
        if wire.name != ERROR_NAME {
            return Err(format!("unexpected error name: {}", wire.name));
        }
        Ok(Self {
            message: wire.message,
            code: wire.code,
            details: wire.details,
        })
    }
}

// ============================================================================
// BINDING-LAYER ERRORS
// ============================================================================

/// Main error type for the binding layer
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Lifecycle Errors (100-199)
    // ========================================================================
    /// Global state has not been initialized
    #[error("Biometrics have not been initialized. Call biometrics_init() first.")]
    NotInitialized,

    /// Global state was already initialized
    #[error("Biometrics have already been initialized.")]
    AlreadyInitialized,

    /// No native collaborator has been installed
    #[error("No native biometric backend is registered.")]
    NoBackend,

    // ========================================================================
    // Argument Errors (200-299)
    // ========================================================================
    /// Arguments could not be understood
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// Method name not routed by the dispatcher
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    // ========================================================================
    // Biometric Errors (300-399)
    // ========================================================================
    /// A facade operation failed
    #[error(transparent)]
    Biometric(#[from] BiometricError),

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================
    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the error code for FFI
    ///
    /// Error codes are organized by category:
    /// - 100-199: Lifecycle
    /// - 200-299: Arguments
    /// - 300-399: Biometric (300 + [`ErrorCode::ordinal`])
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            Error::NotInitialized => 100,
            Error::AlreadyInitialized => 101,
            Error::NoBackend => 102,

            Error::InvalidArguments(_) => 200,
            Error::SerializationError(_) => 201,
            Error::DeserializationError(_) => 202,
            Error::UnknownMethod(_) => 204,

            Error::Biometric(e) => 300 + e.code.ordinal(),

            Error::Internal(_) => 900,
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Biometric(e) => e.code.is_recoverable(),
            _ => false,
        }
    }

    /// Check if this error requires user action
    pub fn requires_user_action(&self) -> bool {
        match self {
            Error::Biometric(e) => e.code.requires_user_action(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            Error::DeserializationError(err.to_string())
        } else {
            Error::SerializationError(err.to_string())
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_codes_are_subset_of_all() {
        for code in ErrorCode::SUPPORT_CODES {
            assert!(ErrorCode::ALL.contains(&code));
            assert!(code.is_support_code());
        }
        let extra = ErrorCode::ALL
            .iter()
            .filter(|c| !c.is_support_code())
            .count();
        assert_eq!(extra, 9);
    }

    #[test]
    fn test_code_strings() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::parse(code.as_str()), Some(code));
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
        assert_eq!(ErrorCode::parse("PASSCODE_NOT_SET"), None);
    }

    #[test]
    fn test_ordinals_follow_all() {
        for (i, code) in ErrorCode::ALL.iter().enumerate() {
            assert_eq!(code.ordinal(), i as i32);
        }
    }

    #[test]
    fn test_narrow_to_support() {
        assert_eq!(ErrorCode::NotPresent.narrow_to_support(), ErrorCode::NotPresent);
        assert_eq!(ErrorCode::Lockout.narrow_to_support(), ErrorCode::NotAvailable);
        assert_eq!(ErrorCode::UnknownError.narrow_to_support(), ErrorCode::NotAvailable);
    }

    #[test]
    fn test_into_support_error_keeps_original_code() {
        let err = BiometricError::unified(ErrorCode::LockoutPermanent, "sensor disabled");
        let narrowed = err.into_support_error(true);
        assert_eq!(narrowed.code, ErrorCode::NotAvailable);
        assert_eq!(narrowed.message, ErrorCode::NotAvailable.description());
        assert_eq!(narrowed.details, "LOCKOUT_PERMANENT: sensor disabled");

        let raw = BiometricError::new(ErrorCode::Lockout, "Too many attempts", "BIOMETRIC_ERROR_7");
        let narrowed = raw.into_support_error(false);
        assert_eq!(narrowed.code, ErrorCode::NotAvailable);
        assert_eq!(narrowed.message, "Too many attempts");

        let untouched =
            BiometricError::unified(ErrorCode::NotEnrolled, "").into_support_error(true);
        assert_eq!(untouched.code, ErrorCode::NotEnrolled);
        assert!(untouched.details.is_empty());
    }

    #[test]
    fn test_biometric_error_wire_shape() {
        let err = BiometricError::new(ErrorCode::UserCanceled, "canceled", "LAErrorUserCancel");
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["name"], "TouchIDError");
        assert_eq!(value["code"], "USER_CANCELED");
        assert_eq!(value["message"], "canceled");
        assert_eq!(value["details"], "LAErrorUserCancel");

        let parsed: BiometricError = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, err);
    }

    #[test]
    fn test_biometric_error_rejects_foreign_name() {
        let json = r#"{"name":"OtherError","message":"x","code":"TIMEOUT","details":""}"#;
        assert!(serde_json::from_str::<BiometricError>(json).is_err());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::NotInitialized.code(), 100);
        assert_eq!(Error::NoBackend.code(), 102);
        assert_eq!(Error::InvalidArguments("x".into()).code(), 200);
        assert_eq!(Error::UnknownMethod("x".into()).code(), 204);
        let cancel = BiometricError::unified(ErrorCode::UserCanceled, "");
        assert_eq!(Error::from(cancel).code(), 305);
        assert_eq!(Error::Internal("x".into()).code(), 900);
    }

    #[test]
    fn test_recoverable_errors() {
        let timeout: Error = BiometricError::unified(ErrorCode::Timeout, "").into();
        assert!(timeout.is_recoverable());
        let missing: Error = BiometricError::unified(ErrorCode::NotPresent, "").into();
        assert!(!missing.is_recoverable());
        let permanent: Error = BiometricError::unified(ErrorCode::LockoutPermanent, "").into();
        assert!(permanent.requires_user_action());
        assert!(!Error::NotInitialized.is_recoverable());
    }
}
