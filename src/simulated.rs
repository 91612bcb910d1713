//! # Simulated Device
//!
//! An in-memory [`BiometricBackend`] modelling one device: which platform it
//! runs, whether it has a sensor, whether anything is enrolled, and how the
//! user will respond to upcoming prompts. Used by tests, the demos, and
//! desktop builds that have no native host.
//!
//! ## Lockout Model
//!
//! ```text
//!   NoMatch × lockout_threshold
//!   ─────────────────────────────►  Temporary  ──(next prompt)──► LOCKOUT
//!                                      │                          (no UI)
//!          lockouts == permanent_after │
//!                                      ▼
//!                                  Permanent  ──(next prompt)──► LOCKOUT_PERMANENT
//!
//!   passcode fallback success ──► Unlocked, counters cleared
//! ```
//!
//! Failures are reported in the platform's native vocabulary so that the
//! facade's normalization runs exactly as it does against a real host.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::backend::{BiometricBackend, NativeResult, Platform};
use crate::error::ErrorCode;
use crate::native::{android, apple, NativeFailure};
use crate::prompt::PromptRequest;
use crate::types::{AuthenticationType, BiometryType};

/// What the user does when the next prompt appears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserAction {
    /// Presents an enrolled biometric
    Match,
    /// Presents a biometric that does not match
    NoMatch,
    /// Dismisses the prompt
    Cancel,
    /// The OS interrupts the prompt
    SystemCancel,
    /// Nobody answers
    Timeout,
    /// Taps the fallback button and, if offered, enters the passcode
    ChooseFallback,
}

/// Static description of a simulated device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulatedDevice {
    /// Host platform
    pub platform: Platform,
    /// Whether the OS offers a biometric API at all
    pub capability: bool,
    /// Sensor hardware, if any
    pub sensor: Option<BiometryType>,
    /// Whether a biometric is enrolled
    pub enrolled: bool,
    /// Whether a device passcode is set
    pub passcode_set: bool,
    /// Consecutive failed reads that trigger a temporary lockout
    pub lockout_threshold: u32,
    /// Temporary lockouts after which the lockout becomes permanent
    pub permanent_lockout_after: u32,
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self {
            platform: Platform::Ios,
            capability: true,
            sensor: Some(BiometryType::TouchID),
            enrolled: true,
            passcode_set: true,
            lockout_threshold: 5,
            permanent_lockout_after: 5,
        }
    }
}

impl SimulatedDevice {
    /// Stock device for `platform`: Touch ID on iOS, fingerprint on Android
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Ios => Self::iphone_touch_id(),
            Platform::Android => Self::android_fingerprint(),
        }
    }

    /// iPhone with enrolled Face ID
    pub fn iphone_face_id() -> Self {
        Self {
            sensor: Some(BiometryType::FaceID),
            ..Self::default()
        }
    }

    /// iPhone with enrolled Touch ID
    pub fn iphone_touch_id() -> Self {
        Self::default()
    }

    /// Android phone with an enrolled fingerprint
    pub fn android_fingerprint() -> Self {
        Self {
            platform: Platform::Android,
            sensor: Some(BiometryType::Fingerprint),
            ..Self::default()
        }
    }

    /// Device with no biometric hardware
    pub fn without_sensor(platform: Platform) -> Self {
        Self {
            platform,
            sensor: None,
            enrolled: false,
            ..Self::default()
        }
    }
}

/// Lockout state of the simulated sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// Reads accepted
    Unlocked,
    /// Reads refused until the platform timer expires
    Temporary,
    /// Reads refused until the device credential is entered
    Permanent,
}

#[derive(Debug)]
struct DeviceState {
    script: VecDeque<UserAction>,
    failed_reads: u32,
    lockouts: u32,
    lock: LockState,
    prompts_shown: u32,
}

/// In-memory native collaborator
pub struct SimulatedBackend {
    device: SimulatedDevice,
    state: Mutex<DeviceState>,
}

impl SimulatedBackend {
    /// Create a backend for `device` with an empty script
    pub fn new(device: SimulatedDevice) -> Self {
        Self {
            device,
            state: Mutex::new(DeviceState {
                script: VecDeque::new(),
                failed_reads: 0,
                lockouts: 0,
                lock: LockState::Unlocked,
                prompts_shown: 0,
            }),
        }
    }

    /// Queue the user's responses to upcoming prompts
    pub fn with_script(self, actions: impl IntoIterator<Item = UserAction>) -> Self {
        self.push_actions(actions);
        self
    }

    /// Append responses to the script
    pub fn push_actions(&self, actions: impl IntoIterator<Item = UserAction>) {
        self.state.lock().script.extend(actions);
    }

    /// The simulated device
    pub fn device(&self) -> &SimulatedDevice {
        &self.device
    }

    /// Number of prompts actually shown
    pub fn prompts_shown(&self) -> u32 {
        self.state.lock().prompts_shown
    }

    /// Consecutive failed reads since the last success or lockout
    pub fn failed_reads(&self) -> u32 {
        self.state.lock().failed_reads
    }

    /// Current lockout state
    pub fn lock_state(&self) -> LockState {
        self.state.lock().lock
    }

    /// The platform lockout timer expired
    pub fn clear_temporary_lockout(&self) {
        let mut state = self.state.lock();
        if state.lock == LockState::Temporary {
            state.lock = LockState::Unlocked;
        }
    }

    fn failure(&self, code: ErrorCode, message: &str) -> NativeFailure {
        match self.device.platform {
            Platform::Ios => match apple_name(code) {
                Some(name) => NativeFailure::apple(name, message),
                None => NativeFailure::unified(code, message),
            },
            Platform::Android => match android_number(code) {
                Some(number) => NativeFailure::android(number, message),
                None => NativeFailure::unified(code, message),
            },
        }
    }

    /// Hardware/enrollment checks shared by every operation
    fn check_hardware(&self) -> NativeResult<BiometryType> {
        if !self.device.capability {
            return Err(self.failure(
                ErrorCode::NotSupported,
                "Biometric authentication is not supported on this OS version",
            ));
        }
        let sensor = self.device.sensor.ok_or_else(|| {
            self.failure(ErrorCode::NotPresent, "No biometric hardware found")
        })?;
        if !self.device.enrolled {
            return Err(self.failure(ErrorCode::NotEnrolled, "No biometrics enrolled"));
        }
        Ok(sensor)
    }

    fn lockout_failure(&self, lock: LockState) -> Option<NativeFailure> {
        match lock {
            LockState::Unlocked => None,
            LockState::Temporary => Some(self.failure(
                ErrorCode::Lockout,
                "Too many attempts. Try again later.",
            )),
            LockState::Permanent => Some(self.failure(
                ErrorCode::LockoutPermanent,
                "Too many attempts. Biometric sensor disabled.",
            )),
        }
    }

    fn passcode_allowed(&self, password_fallback: bool) -> bool {
        self.device.platform == Platform::Ios && password_fallback && self.device.passcode_set
    }
}

#[async_trait]
impl BiometricBackend for SimulatedBackend {
    fn platform(&self) -> Platform {
        self.device.platform
    }

    async fn probe_support(&self) -> NativeResult<BiometryType> {
        let sensor = self.check_hardware()?;
        let lock = self.state.lock().lock;
        match self.lockout_failure(lock) {
            Some(failure) => Err(failure),
            None => Ok(sensor),
        }
    }

    async fn default_authentication_type(
        &self,
        password_fallback: bool,
    ) -> NativeResult<AuthenticationType> {
        match self.probe_support().await {
            Ok(_) => Ok(AuthenticationType::AuthenticationTypeBiometrics),
            Err(_) if self.passcode_allowed(password_fallback) => {
                Ok(AuthenticationType::AuthenticationTypePassword)
            }
            Err(failure) => Err(failure),
        }
    }

    async fn present_prompt(&self, request: &PromptRequest) -> NativeResult<AuthenticationType> {
        let passcode_allowed = self.passcode_allowed(request.password_fallback);
        if !passcode_allowed {
            self.check_hardware()?;
        }

        let mut state = self.state.lock();
        if !passcode_allowed {
            if let Some(failure) = self.lockout_failure(state.lock) {
                tracing::debug!("Simulated sensor locked, no prompt shown");
                return Err(failure);
            }
        }

        state.prompts_shown += 1;
        let action = state.script.pop_front().unwrap_or(UserAction::Cancel);
        tracing::debug!("Simulated prompt #{} answered with {:?}", state.prompts_shown, action);

        let sensor_usable = state.lock == LockState::Unlocked && self.check_hardware().is_ok();

        match action {
            UserAction::Match if sensor_usable => {
                state.failed_reads = 0;
                Ok(AuthenticationType::AuthenticationTypeBiometrics)
            }
            UserAction::Match | UserAction::ChooseFallback if passcode_allowed => {
                state.failed_reads = 0;
                state.lockouts = 0;
                state.lock = LockState::Unlocked;
                Ok(AuthenticationType::AuthenticationTypePassword)
            }
            UserAction::Match => Err(self.failure(ErrorCode::NotAvailable, "Sensor unavailable")),
            // Passcode entry while the sensor is locked; nothing was read.
            UserAction::NoMatch if !sensor_usable => {
                Err(self.failure(ErrorCode::AuthenticationFailed, "Passcode not accepted"))
            }
            UserAction::NoMatch => {
                state.failed_reads += 1;
                if state.failed_reads >= self.device.lockout_threshold {
                    state.failed_reads = 0;
                    state.lockouts += 1;
                    state.lock = if state.lockouts >= self.device.permanent_lockout_after {
                        LockState::Permanent
                    } else {
                        LockState::Temporary
                    };
                    tracing::debug!("Simulated sensor now {:?}", state.lock);
                }
                Err(self.failure(ErrorCode::AuthenticationFailed, "Biometric not recognized"))
            }
            UserAction::Cancel => Err(self.failure(ErrorCode::UserCanceled, "Canceled by user")),
            UserAction::SystemCancel => {
                Err(self.failure(ErrorCode::SystemCanceled, "Canceled by system"))
            }
            UserAction::Timeout => Err(self.failure(ErrorCode::Timeout, "Prompt timed out")),
            UserAction::ChooseFallback => {
                Err(self.failure(ErrorCode::UserFallback, "User chose the fallback"))
            }
        }
    }
}

fn apple_name(code: ErrorCode) -> Option<&'static str> {
    match code {
        ErrorCode::NotSupported => Some(apple::NOT_SUPPORTED),
        ErrorCode::NotAvailable => Some(apple::BIOMETRY_NOT_AVAILABLE),
        ErrorCode::NotEnrolled => Some(apple::BIOMETRY_NOT_ENROLLED),
        ErrorCode::AuthenticationFailed => Some(apple::AUTHENTICATION_FAILED),
        ErrorCode::UserCanceled => Some(apple::USER_CANCEL),
        ErrorCode::SystemCanceled => Some(apple::SYSTEM_CANCEL),
        ErrorCode::Lockout => Some(apple::BIOMETRY_LOCKOUT),
        ErrorCode::UserFallback => Some(apple::USER_FALLBACK),
        ErrorCode::UnknownError => Some(apple::UNKNOWN),
        _ => None,
    }
}

fn android_number(code: ErrorCode) -> Option<i32> {
    match code {
        ErrorCode::NotSupported => Some(android::NOT_SUPPORTED),
        ErrorCode::NotAvailable => Some(android::HW_UNAVAILABLE),
        ErrorCode::NotPresent => Some(android::HW_NOT_PRESENT),
        ErrorCode::NotEnrolled => Some(android::NO_BIOMETRICS),
        ErrorCode::AuthenticationFailed => Some(android::AUTHENTICATION_FAILED),
        ErrorCode::UserCanceled => Some(android::USER_CANCELED),
        ErrorCode::SystemCanceled => Some(android::CANCELED),
        ErrorCode::Timeout => Some(android::TIMEOUT),
        ErrorCode::Lockout => Some(android::LOCKOUT),
        ErrorCode::LockoutPermanent => Some(android::LOCKOUT_PERMANENT),
        ErrorCode::ProcessingError => Some(android::UNABLE_TO_PROCESS),
        ErrorCode::UserFallback => Some(android::USER_FALLBACK),
        ErrorCode::UnknownError => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::NativeCode;
    use crate::prompt::PromptDefaults;
    use crate::types::AuthenticateConfig;

    fn request(platform: Platform, password_fallback: bool) -> PromptRequest {
        let config = AuthenticateConfig {
            password_fallback: Some(password_fallback),
            ..Default::default()
        };
        PromptRequest::resolve(platform, Some("test"), &config, &PromptDefaults::default())
    }

    #[tokio::test]
    async fn test_probe_reports_in_native_vocabulary() {
        let phone = SimulatedBackend::new(SimulatedDevice::without_sensor(Platform::Android));
        let failure = phone.probe_support().await.unwrap_err();
        assert_eq!(failure.code, NativeCode::Android(android::HW_NOT_PRESENT));

        let ios = SimulatedBackend::new(SimulatedDevice {
            enrolled: false,
            ..SimulatedDevice::iphone_face_id()
        });
        let failure = ios.probe_support().await.unwrap_err();
        assert_eq!(failure.code, NativeCode::Apple(apple::BIOMETRY_NOT_ENROLLED.into()));

        let missing = SimulatedBackend::new(SimulatedDevice::without_sensor(Platform::Ios));
        let failure = missing.probe_support().await.unwrap_err();
        assert_eq!(failure.code, NativeCode::Unified(ErrorCode::NotPresent));
    }

    #[tokio::test]
    async fn test_lockout_after_threshold() {
        let backend = SimulatedBackend::new(SimulatedDevice::android_fingerprint())
            .with_script([UserAction::NoMatch; 5]);
        let req = request(Platform::Android, false);

        for _ in 0..5 {
            let failure = backend.present_prompt(&req).await.unwrap_err();
            assert_eq!(failure.code.to_error_code(), ErrorCode::AuthenticationFailed);
        }
        assert_eq!(backend.lock_state(), LockState::Temporary);
        assert_eq!(backend.prompts_shown(), 5);

        let failure = backend.present_prompt(&req).await.unwrap_err();
        assert_eq!(failure.code.to_error_code(), ErrorCode::Lockout);
        assert_eq!(backend.prompts_shown(), 5);

        backend.clear_temporary_lockout();
        backend.push_actions([UserAction::Match]);
        assert_eq!(
            backend.present_prompt(&req).await.unwrap(),
            AuthenticationType::AuthenticationTypeBiometrics
        );
    }

    #[tokio::test]
    async fn test_permanent_lockout() {
        let backend = SimulatedBackend::new(SimulatedDevice {
            lockout_threshold: 1,
            permanent_lockout_after: 2,
            ..SimulatedDevice::android_fingerprint()
        })
        .with_script([UserAction::NoMatch, UserAction::NoMatch]);
        let req = request(Platform::Android, false);

        backend.present_prompt(&req).await.unwrap_err();
        backend.clear_temporary_lockout();
        backend.present_prompt(&req).await.unwrap_err();
        assert_eq!(backend.lock_state(), LockState::Permanent);

        backend.clear_temporary_lockout();
        let failure = backend.present_prompt(&req).await.unwrap_err();
        assert_eq!(failure.code.to_error_code(), ErrorCode::LockoutPermanent);
    }

    #[tokio::test]
    async fn test_passcode_fallback_clears_lockout() {
        let backend = SimulatedBackend::new(SimulatedDevice {
            lockout_threshold: 1,
            ..SimulatedDevice::iphone_touch_id()
        })
        .with_script([UserAction::NoMatch, UserAction::ChooseFallback]);

        backend.present_prompt(&request(Platform::Ios, false)).await.unwrap_err();
        assert_eq!(backend.lock_state(), LockState::Temporary);

        let auth = backend.present_prompt(&request(Platform::Ios, true)).await.unwrap();
        assert_eq!(auth, AuthenticationType::AuthenticationTypePassword);
        assert_eq!(backend.lock_state(), LockState::Unlocked);
    }

    #[tokio::test]
    async fn test_locked_sensor_does_not_count_reads() {
        let backend = SimulatedBackend::new(SimulatedDevice {
            lockout_threshold: 2,
            permanent_lockout_after: 1,
            ..SimulatedDevice::iphone_touch_id()
        })
        .with_script([UserAction::NoMatch; 4]);

        let req = request(Platform::Ios, false);
        backend.present_prompt(&req).await.unwrap_err();
        backend.present_prompt(&req).await.unwrap_err();
        assert_eq!(backend.lock_state(), LockState::Permanent);
        assert_eq!(backend.failed_reads(), 0);

        let req = request(Platform::Ios, true);
        for _ in 0..2 {
            let failure = backend.present_prompt(&req).await.unwrap_err();
            assert_eq!(failure.code.to_error_code(), ErrorCode::AuthenticationFailed);
        }
        assert_eq!(backend.failed_reads(), 0);
        assert_eq!(backend.lock_state(), LockState::Permanent);
        assert_eq!(backend.prompts_shown(), 4);
    }

    #[tokio::test]
    async fn test_default_type_with_passcode() {
        let backend = SimulatedBackend::new(SimulatedDevice {
            enrolled: false,
            ..SimulatedDevice::iphone_face_id()
        });
        assert_eq!(
            backend.default_authentication_type(true).await.unwrap(),
            AuthenticationType::AuthenticationTypePassword
        );
        assert!(backend.default_authentication_type(false).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_script_cancels() {
        let backend = SimulatedBackend::new(SimulatedDevice::iphone_face_id());
        let failure = backend.present_prompt(&request(Platform::Ios, false)).await.unwrap_err();
        assert_eq!(failure.code, NativeCode::Apple(apple::USER_CANCEL.into()));
    }

    #[test]
    fn test_for_platform() {
        let ios = SimulatedDevice::for_platform(Platform::Ios);
        assert_eq!(ios.platform, Platform::Ios);
        assert_eq!(ios.sensor, Some(BiometryType::TouchID));

        let android = SimulatedDevice::for_platform(Platform::Android);
        assert_eq!(android.platform, Platform::Android);
        assert_eq!(android.sensor, Some(BiometryType::Fingerprint));
    }

    #[test]
    fn test_device_json_defaults() {
        let device: SimulatedDevice =
            serde_json::from_str(r#"{"platform":"android","sensor":"Fingerprint"}"#).unwrap();
        assert_eq!(device.platform, Platform::Android);
        assert_eq!(device.sensor, Some(BiometryType::Fingerprint));
        assert!(device.enrolled);
        assert_eq!(device.lockout_threshold, 5);
    }
}
