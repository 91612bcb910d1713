//! # Native Failure Vocabulary
//!
//! Native collaborators report failures in their own platform's terms:
//! LocalAuthentication error names on Apple platforms, BiometricPrompt
//! integer codes on Android. This module maps both onto [`ErrorCode`].
//!
//! ```text
//!  LAErrorUserCancel ─────┐
//!                         ├──► ErrorCode::UserCanceled ──► BiometricError
//!  Android 10 ────────────┘          (closed taxonomy)
//! ```
//!
//! With `unifiedErrors` the message becomes the unified description and the
//! native message moves to `details`. Without it the native message is kept
//! and `details` names the native code. `code` is the same either way.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BiometricError, ErrorCode};

/// BiometricPrompt error codes reported by Android hosts
pub mod android {
    /// Hardware unavailable
    pub const HW_UNAVAILABLE: i32 = 1;
    /// Sensor could not process the image
    pub const UNABLE_TO_PROCESS: i32 = 2;
    /// Prompt timed out
    pub const TIMEOUT: i32 = 3;
    /// Not enough storage to complete the operation
    pub const NO_SPACE: i32 = 4;
    /// Canceled by the platform
    pub const CANCELED: i32 = 5;
    /// Too many attempts, temporary
    pub const LOCKOUT: i32 = 7;
    /// Vendor specific failure
    pub const VENDOR: i32 = 8;
    /// Too many attempts, credential required
    pub const LOCKOUT_PERMANENT: i32 = 9;
    /// User canceled
    pub const USER_CANCELED: i32 = 10;
    /// Nothing enrolled
    pub const NO_BIOMETRICS: i32 = 11;
    /// No hardware
    pub const HW_NOT_PRESENT: i32 = 12;
    /// Negative (cancel) button pressed
    pub const NEGATIVE_BUTTON: i32 = 13;
    /// No device credential set up
    pub const NO_DEVICE_CREDENTIAL: i32 = 14;
    /// Sensor disabled pending a security update
    pub const SECURITY_UPDATE_REQUIRED: i32 = 15;
    /// User chose the fallback path
    pub const USER_FALLBACK: i32 = 16;
    /// Host-defined: the sensor read did not match
    pub const AUTHENTICATION_FAILED: i32 = 1001;
    /// Host-defined: the OS version lacks a biometric API
    pub const NOT_SUPPORTED: i32 = 1002;
}

/// LocalAuthentication error names reported by Apple hosts
pub mod apple {
    /// The user failed to provide valid credentials
    pub const AUTHENTICATION_FAILED: &str = "LAErrorAuthenticationFailed";
    /// The user tapped cancel
    pub const USER_CANCEL: &str = "LAErrorUserCancel";
    /// The user tapped the fallback button
    pub const USER_FALLBACK: &str = "LAErrorUserFallback";
    /// The system canceled, e.g. another app came to the foreground
    pub const SYSTEM_CANCEL: &str = "LAErrorSystemCancel";
    /// The app invalidated the context
    pub const APP_CANCEL: &str = "LAErrorAppCancel";
    /// No device passcode
    pub const PASSCODE_NOT_SET: &str = "LAErrorPasscodeNotSet";
    /// Touch ID unavailable
    pub const TOUCH_ID_NOT_AVAILABLE: &str = "LAErrorTouchIDNotAvailable";
    /// Touch ID has no enrolled fingers
    pub const TOUCH_ID_NOT_ENROLLED: &str = "LAErrorTouchIDNotEnrolled";
    /// Touch ID locked out
    pub const TOUCH_ID_LOCKOUT: &str = "LAErrorTouchIDLockout";
    /// Biometry unavailable
    pub const BIOMETRY_NOT_AVAILABLE: &str = "LAErrorBiometryNotAvailable";
    /// Biometry has no enrolled identities
    pub const BIOMETRY_NOT_ENROLLED: &str = "LAErrorBiometryNotEnrolled";
    /// Biometry locked out
    pub const BIOMETRY_LOCKOUT: &str = "LAErrorBiometryLockout";
    /// The context was already invalidated
    pub const INVALID_CONTEXT: &str = "LAErrorInvalidContext";
    /// UI could not be displayed
    pub const NOT_INTERACTIVE: &str = "LAErrorNotInteractive";
    /// Host-defined: LocalAuthentication missing from this OS version
    pub const NOT_SUPPORTED: &str = "RCTTouchIDNotSupported";
    /// Host-defined: anything else
    pub const UNKNOWN: &str = "RCTTouchIDUnknownError";
}

/// A native failure code in the reporting platform's vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "platform", content = "code", rename_all = "camelCase")]
pub enum NativeCode {
    /// LocalAuthentication error name
    Apple(String),
    /// BiometricPrompt error code
    Android(i32),
    /// Already in the unified taxonomy
    Unified(ErrorCode),
}

impl NativeCode {
    /// Map onto the unified taxonomy
    pub fn to_error_code(&self) -> ErrorCode {
        match self {
            NativeCode::Apple(name) => apple_code(name),
            NativeCode::Android(code) => android_code(*code),
            NativeCode::Unified(code) => *code,
        }
    }
}

impl fmt::Display for NativeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeCode::Apple(name) => f.write_str(name),
            NativeCode::Android(code) => write!(f, "BIOMETRIC_ERROR_{}", code),
            NativeCode::Unified(code) => f.write_str(code.as_str()),
        }
    }
}

fn apple_code(name: &str) -> ErrorCode {
    match name {
        apple::AUTHENTICATION_FAILED => ErrorCode::AuthenticationFailed,
        apple::USER_CANCEL => ErrorCode::UserCanceled,
        apple::USER_FALLBACK => ErrorCode::UserFallback,
        apple::SYSTEM_CANCEL | apple::APP_CANCEL => ErrorCode::SystemCanceled,
        apple::PASSCODE_NOT_SET => ErrorCode::NotEnrolled,
        apple::TOUCH_ID_NOT_AVAILABLE | apple::BIOMETRY_NOT_AVAILABLE => ErrorCode::NotAvailable,
        apple::NOT_INTERACTIVE => ErrorCode::NotAvailable,
        apple::TOUCH_ID_NOT_ENROLLED | apple::BIOMETRY_NOT_ENROLLED => ErrorCode::NotEnrolled,
        apple::TOUCH_ID_LOCKOUT | apple::BIOMETRY_LOCKOUT => ErrorCode::Lockout,
        apple::INVALID_CONTEXT => ErrorCode::ProcessingError,
        apple::NOT_SUPPORTED => ErrorCode::NotSupported,
        _ => ErrorCode::UnknownError,
    }
}

fn android_code(code: i32) -> ErrorCode {
    match code {
        android::HW_UNAVAILABLE => ErrorCode::NotAvailable,
        android::UNABLE_TO_PROCESS => ErrorCode::ProcessingError,
        android::TIMEOUT => ErrorCode::Timeout,
        android::CANCELED => ErrorCode::SystemCanceled,
        android::LOCKOUT => ErrorCode::Lockout,
        android::LOCKOUT_PERMANENT => ErrorCode::LockoutPermanent,
        android::USER_CANCELED | android::NEGATIVE_BUTTON => ErrorCode::UserCanceled,
        android::NO_BIOMETRICS | android::NO_DEVICE_CREDENTIAL => ErrorCode::NotEnrolled,
        android::HW_NOT_PRESENT => ErrorCode::NotPresent,
        android::SECURITY_UPDATE_REQUIRED => ErrorCode::NotAvailable,
        android::USER_FALLBACK => ErrorCode::UserFallback,
        android::AUTHENTICATION_FAILED => ErrorCode::AuthenticationFailed,
        android::NOT_SUPPORTED => ErrorCode::NotSupported,
        _ => ErrorCode::UnknownError,
    }
}

/// A failure as reported by the native collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeFailure {
    /// Platform code
    pub code: NativeCode,
    /// Platform message
    #[serde(default)]
    pub message: String,
    /// Extra diagnostics from the platform
    #[serde(default)]
    pub details: String,
}

impl NativeFailure {
    /// Failure reported with a LocalAuthentication error name
    pub fn apple(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: NativeCode::Apple(name.into()),
            message: message.into(),
            details: String::new(),
        }
    }

    /// Failure reported with a BiometricPrompt code
    pub fn android(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: NativeCode::Android(code),
            message: message.into(),
            details: String::new(),
        }
    }

    /// Failure already expressed in the unified taxonomy
    pub fn unified(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: NativeCode::Unified(code),
            message: message.into(),
            details: String::new(),
        }
    }

    /// Attach diagnostics
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    /// Convert to the tagged facade error
    pub fn normalize(self, unified_errors: bool) -> BiometricError {
        let code = self.code.to_error_code();
        if unified_errors {
            let details = join_non_empty(&self.message, &self.details);
            BiometricError::unified(code, details)
        } else {
            let message = if self.message.is_empty() {
                code.description().to_string()
            } else {
                self.message
            };
            let details = join_non_empty(&self.code.to_string(), &self.details);
            BiometricError::new(code, message, details)
        }
    }
}

fn join_non_empty(first: &str, second: &str) -> String {
    match (first.is_empty(), second.is_empty()) {
        (true, _) => second.to_string(),
        (false, true) => first.to_string(),
        (false, false) => format!("{}: {}", first, second),
    }
}
