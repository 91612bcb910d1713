//! # Biometric Authentication Facade
//!
//! Uniform request/response contract over a platform's biometric framework.
//!
//! ## Operation Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         FACADE OPERATIONS                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  is_supported(config)                                                  │
//! │     └─► backend.probe_support() ──► BiometryType | support error       │
//! │                                                                         │
//! │  get_authenticate_type(config)                                         │
//! │     └─► backend.default_authentication_type() ──► AuthenticationType   │
//! │                                                    | support error      │
//! │                                                                         │
//! │  authenticate(reason, config)                                          │
//! │     ├─► reject if another prompt is in flight (PROCESSING_ERROR)       │
//! │     ├─► PromptRequest::resolve(platform, reason, config, defaults)     │
//! │     └─► backend.present_prompt() ──► AuthenticateSuccess | any error   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The facade keeps no session state besides the in-flight flag. Timeouts and
//! retries belong to the native collaborator or the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::backend::{BiometricBackend, Platform};
use crate::error::{BiometricError, ErrorCode};
use crate::prompt::PromptRequest;
use crate::types::{
    AuthenticateConfig, AuthenticateSuccess, AuthenticationType, BiometryType,
    GetAuthenticateTypeConfig, IsSupportedConfig,
};
use crate::BiometricsConfig;

/// Result of a facade operation
pub type BiometricResult<T> = std::result::Result<T, BiometricError>;

/// Details attached when an overlapping `authenticate` is rejected
pub const ALREADY_IN_PROGRESS: &str = "authentication already in progress";

/// The biometric authentication facade
pub struct Biometrics {
    backend: Arc<dyn BiometricBackend>,
    config: BiometricsConfig,
    in_flight: AtomicBool,
}

impl Biometrics {
    /// Create a facade over `backend` with default configuration
    pub fn new(backend: Arc<dyn BiometricBackend>) -> Self {
        Self::with_config(backend, BiometricsConfig::default())
    }

    /// Create a facade over `backend`
    pub fn with_config(backend: Arc<dyn BiometricBackend>, config: BiometricsConfig) -> Self {
        Self {
            backend,
            config,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Platform of the underlying backend
    pub fn platform(&self) -> Platform {
        self.backend.platform()
    }

    /// Active configuration
    pub fn config(&self) -> &BiometricsConfig {
        &self.config
    }

    /// Whether an `authenticate` call is pending
    pub fn is_authenticating(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn unified(&self, requested: Option<bool>) -> bool {
        requested.unwrap_or(self.config.unified_errors)
    }

    /// Check whether the device has a usable, enrolled biometric sensor.
    ///
    /// Fails only with `NOT_SUPPORTED`, `NOT_AVAILABLE`, `NOT_PRESENT` or
    /// `NOT_ENROLLED`. Never shows UI.
    pub async fn is_supported(
        &self,
        config: Option<IsSupportedConfig>,
    ) -> BiometricResult<BiometryType> {
        let unified = self.unified(config.and_then(|c| c.unified_errors));
        tracing::debug!("is_supported on {}", self.platform());

        match self.backend.probe_support().await {
            Ok(kind) => {
                tracing::debug!("Biometry available: {}", kind);
                Ok(kind)
            }
            Err(failure) => {
                let err = failure.normalize(unified).into_support_error(unified);
                tracing::warn!("Biometry not supported: {} ({})", err.code, err.details);
                Err(err)
            }
        }
    }

    /// Report which method a challenge issued now would use.
    ///
    /// `passwordFallback` only has an effect on iOS. Fails with the same
    /// codes as [`Biometrics::is_supported`].
    pub async fn get_authenticate_type(
        &self,
        config: Option<GetAuthenticateTypeConfig>,
    ) -> BiometricResult<AuthenticationType> {
        let requested = config.and_then(|c| c.password_fallback);
        if requested.is_some() && self.platform() == Platform::Android {
            tracing::debug!("Ignoring passwordFallback on android");
        }
        let password_fallback = self.platform() == Platform::Ios && requested.unwrap_or(false);

        self.backend
            .default_authentication_type(password_fallback)
            .await
            .map_err(|failure| {
                let unified = self.config.unified_errors;
                let err = failure.normalize(unified).into_support_error(unified);
                tracing::warn!("Cannot determine authentication type: {}", err.code);
                err
            })
    }

    /// Show the native prompt and wait for its single terminal outcome.
    ///
    /// Only one prompt may be pending per facade: an overlapping call fails
    /// immediately with `PROCESSING_ERROR` and the pending call continues.
    pub async fn authenticate(
        &self,
        reason: Option<&str>,
        config: Option<AuthenticateConfig>,
    ) -> BiometricResult<AuthenticateSuccess> {
        let config = config.unwrap_or_default();
        let unified = self.unified(config.unified_errors);

        let _guard = match InFlightGuard::acquire(&self.in_flight) {
            Some(guard) => guard,
            None => {
                tracing::warn!("Rejecting authenticate: another prompt is pending");
                let err = if unified {
                    BiometricError::unified(ErrorCode::ProcessingError, ALREADY_IN_PROGRESS)
                } else {
                    BiometricError::new(
                        ErrorCode::ProcessingError,
                        "Another authentication prompt is already active",
                        ALREADY_IN_PROGRESS,
                    )
                };
                return Err(err);
            }
        };

        let request = PromptRequest::resolve(
            self.platform(),
            reason,
            &config,
            &self.config.prompt_defaults,
        );
        tracing::debug!(
            "authenticate on {} (passwordFallback: {})",
            self.platform(),
            request.password_fallback
        );

        match self.backend.present_prompt(&request).await {
            Ok(auth_type) => {
                tracing::info!("Authentication succeeded via {}", auth_type.as_str());
                Ok(AuthenticateSuccess::with(auth_type))
            }
            Err(failure) => {
                let err = failure.normalize(unified);
                tracing::warn!("Authentication failed: {} ({})", err.code, err.details);
                Err(err)
            }
        }
    }
}

/// Clears the in-flight flag when the pending call finishes or is dropped
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NativeResult;
    use crate::native::NativeFailure;
    use crate::simulated::{SimulatedBackend, SimulatedDevice, UserAction};
    use async_trait::async_trait;
    use tokio::sync::{oneshot, Mutex as AsyncMutex};

    fn facade(device: SimulatedDevice, script: &[UserAction]) -> (Biometrics, Arc<SimulatedBackend>) {
        let backend = Arc::new(SimulatedBackend::new(device).with_script(script.iter().copied()));
        (Biometrics::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn test_no_sensor_is_not_present() {
        for platform in [Platform::Ios, Platform::Android] {
            let (biometrics, _) = facade(SimulatedDevice::without_sensor(platform), &[]);
            let err = biometrics.is_supported(None).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::NotPresent);
            assert_eq!(err.name(), "TouchIDError");
        }
    }

    #[tokio::test]
    async fn test_enrolled_face_is_face_id() {
        let (biometrics, backend) = facade(SimulatedDevice::iphone_face_id(), &[]);
        assert_eq!(biometrics.is_supported(None).await.unwrap(), BiometryType::FaceID);
        assert_eq!(backend.prompts_shown(), 0);
    }

    #[tokio::test]
    async fn test_support_errors_stay_in_subset() {
        let devices = [
            SimulatedDevice {
                capability: false,
                ..SimulatedDevice::android_fingerprint()
            },
            SimulatedDevice {
                enrolled: false,
                ..SimulatedDevice::iphone_touch_id()
            },
            SimulatedDevice::without_sensor(Platform::Android),
        ];
        for device in devices {
            let (biometrics, _) = facade(device, &[]);
            let err = biometrics.is_supported(None).await.unwrap_err();
            assert!(err.code.is_support_code(), "{:?}", err.code);
        }
    }

    #[tokio::test]
    async fn test_locked_out_sensor_is_not_available() {
        let device = SimulatedDevice {
            lockout_threshold: 1,
            ..SimulatedDevice::android_fingerprint()
        };
        let (biometrics, _) = facade(device, &[UserAction::NoMatch]);
        biometrics.authenticate(None, None).await.unwrap_err();

        let err = biometrics
            .is_supported(Some(IsSupportedConfig {
                unified_errors: Some(true),
            }))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAvailable);
        assert_eq!(err.message, ErrorCode::NotAvailable.description());
        assert!(err.details.starts_with("LOCKOUT"));
    }

    #[tokio::test]
    async fn test_user_cancel() {
        let (biometrics, _) = facade(SimulatedDevice::iphone_face_id(), &[UserAction::Cancel]);
        let err = biometrics.authenticate(Some("Sign in"), None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserCanceled);
        assert_eq!(err.details, "LAErrorUserCancel");
    }

    #[tokio::test]
    async fn test_fingerprint_match() {
        let (biometrics, _) = facade(SimulatedDevice::android_fingerprint(), &[UserAction::Match]);
        let success = biometrics.authenticate(Some("Pay"), None).await.unwrap();
        assert_eq!(
            serde_json::to_value(success).unwrap(),
            serde_json::json!({ "authType": "AuthenticationTypeBiometrics" })
        );
    }

    #[tokio::test]
    async fn test_five_failures_then_lockout_without_prompt() {
        let (biometrics, backend) =
            facade(SimulatedDevice::android_fingerprint(), &[UserAction::NoMatch; 5]);

        for _ in 0..5 {
            let err = biometrics.authenticate(None, None).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::AuthenticationFailed);
        }
        let shown = backend.prompts_shown();

        let err = biometrics.authenticate(None, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Lockout);
        assert_eq!(backend.prompts_shown(), shown);
    }

    #[tokio::test]
    async fn test_fallback_never_reports_biometrics() {
        // Fallback not requested: the user's choice surfaces as USER_FALLBACK.
        let (biometrics, _) =
            facade(SimulatedDevice::iphone_touch_id(), &[UserAction::ChooseFallback]);
        let err = biometrics.authenticate(Some("Sign in"), None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserFallback);

        let (biometrics, _) =
            facade(SimulatedDevice::android_fingerprint(), &[UserAction::ChooseFallback]);
        let err = biometrics.authenticate(None, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserFallback);

        // Fallback requested on iOS: the passcode satisfies the challenge.
        let (biometrics, _) =
            facade(SimulatedDevice::iphone_touch_id(), &[UserAction::ChooseFallback]);
        let config = AuthenticateConfig {
            password_fallback: Some(true),
            ..Default::default()
        };
        let success = biometrics.authenticate(Some("Sign in"), Some(config)).await.unwrap();
        assert_eq!(
            success.auth_type,
            Some(AuthenticationType::AuthenticationTypePassword)
        );
    }

    #[tokio::test]
    async fn test_authenticate_codes_cover_support_codes() {
        let devices = [
            SimulatedDevice {
                capability: false,
                ..SimulatedDevice::android_fingerprint()
            },
            SimulatedDevice::without_sensor(Platform::Android),
            SimulatedDevice {
                enrolled: false,
                ..SimulatedDevice::android_fingerprint()
            },
        ];
        for device in devices {
            let (biometrics, _) = facade(device, &[]);
            let support = biometrics.is_supported(None).await.unwrap_err();
            let auth = biometrics.authenticate(None, None).await.unwrap_err();
            assert_eq!(support.code, auth.code);
        }
    }

    #[tokio::test]
    async fn test_get_authenticate_type() {
        let (biometrics, _) = facade(SimulatedDevice::iphone_face_id(), &[]);
        assert_eq!(
            biometrics.get_authenticate_type(None).await.unwrap(),
            AuthenticationType::AuthenticationTypeBiometrics
        );

        let unenrolled = SimulatedDevice {
            enrolled: false,
            ..SimulatedDevice::iphone_face_id()
        };
        let (biometrics, _) = facade(unenrolled.clone(), &[]);
        let with_fallback = GetAuthenticateTypeConfig {
            password_fallback: Some(true),
        };
        assert_eq!(
            biometrics.get_authenticate_type(Some(with_fallback.clone())).await.unwrap(),
            AuthenticationType::AuthenticationTypePassword
        );
        let err = biometrics.get_authenticate_type(None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotEnrolled);

        // passwordFallback is iOS only
        let android = SimulatedDevice {
            enrolled: false,
            ..SimulatedDevice::android_fingerprint()
        };
        let (biometrics, _) = facade(android, &[]);
        let err = biometrics
            .get_authenticate_type(Some(with_fallback))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotEnrolled);
    }

    #[tokio::test]
    async fn test_unified_errors_default_from_config() {
        let backend = Arc::new(
            SimulatedBackend::new(SimulatedDevice::iphone_face_id())
                .with_script([UserAction::Timeout, UserAction::Timeout]),
        );
        let config = BiometricsConfig {
            unified_errors: true,
            ..Default::default()
        };
        let biometrics = Biometrics::with_config(backend, config);

        let err = biometrics.authenticate(None, None).await.unwrap_err();
        assert_eq!(err.message, ErrorCode::Timeout.description());

        let raw = AuthenticateConfig {
            unified_errors: Some(false),
            ..Default::default()
        };
        let err = biometrics.authenticate(None, Some(raw)).await.unwrap_err();
        assert_eq!(err.message, "Prompt timed out");
    }

    /// Backend whose prompt stays open until the test releases it
    struct HeldPrompt {
        opened: AsyncMutex<Option<oneshot::Sender<()>>>,
        release: AsyncMutex<Option<oneshot::Receiver<()>>>,
    }

    #[async_trait]
    impl BiometricBackend for HeldPrompt {
        fn platform(&self) -> Platform {
            Platform::Android
        }

        async fn probe_support(&self) -> NativeResult<BiometryType> {
            Ok(BiometryType::Fingerprint)
        }

        async fn default_authentication_type(&self, _: bool) -> NativeResult<AuthenticationType> {
            Ok(AuthenticationType::AuthenticationTypeBiometrics)
        }

        async fn present_prompt(&self, _: &PromptRequest) -> NativeResult<AuthenticationType> {
            if let Some(opened) = self.opened.lock().await.take() {
                let _ = opened.send(());
            }
            let release = self.release.lock().await.take();
            match release {
                Some(rx) => {
                    rx.await.map_err(|_| {
                        NativeFailure::unified(ErrorCode::SystemCanceled, "released")
                    })?;
                    Ok(AuthenticationType::AuthenticationTypeBiometrics)
                }
                None => Err(NativeFailure::unified(ErrorCode::UnknownError, "reused")),
            }
        }
    }

    #[tokio::test]
    async fn test_overlapping_authenticate_is_rejected() {
        let (opened_tx, opened_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        let biometrics = Arc::new(Biometrics::new(Arc::new(HeldPrompt {
            opened: AsyncMutex::new(Some(opened_tx)),
            release: AsyncMutex::new(Some(release_rx)),
        })));

        let pending = {
            let biometrics = biometrics.clone();
            tokio::spawn(async move { biometrics.authenticate(Some("first"), None).await })
        };
        opened_rx.await.unwrap();
        assert!(biometrics.is_authenticating());

        let err = biometrics.authenticate(Some("second"), None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ProcessingError);
        assert_eq!(err.details, ALREADY_IN_PROGRESS);

        release_tx.send(()).unwrap();
        let success = pending.await.unwrap().unwrap();
        assert_eq!(
            success.auth_type,
            Some(AuthenticationType::AuthenticationTypeBiometrics)
        );
        assert!(!biometrics.is_authenticating());
    }
}
