//! # Shared FFI State
//!
//! Global runtime and facade shared between `c_api.rs` and `dispatcher.rs`.

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::backend::BiometricBackend;
use crate::error::{Error, Result};
use crate::facade::Biometrics;
use crate::BiometricsConfig;

// ============================================================================
// RUNTIME
// ============================================================================

/// Global async runtime for FFI calls
static RUNTIME: OnceCell<Runtime> = OnceCell::new();

/// Global state
static STATE: OnceCell<Arc<RwLock<FfiState>>> = OnceCell::new();

/// FFI state holding the facade
pub(crate) struct FfiState {
    pub config: BiometricsConfig,
    pub biometrics: Option<Arc<Biometrics>>,
}

impl FfiState {
    pub fn new(config: BiometricsConfig) -> Self {
        Self {
            config,
            biometrics: None,
        }
    }

    /// Replace the native collaborator. A pending prompt keeps the facade it
    /// started on.
    pub fn install(&mut self, backend: Arc<dyn BiometricBackend>) {
        tracing::info!("Installing {} biometric backend", backend.platform());
        self.biometrics = Some(Arc::new(Biometrics::with_config(
            backend,
            self.config.clone(),
        )));
    }
}

pub(crate) fn get_runtime() -> Result<&'static Runtime> {
    RUNTIME.get_or_try_init(|| {
        Runtime::new().map_err(|e| Error::Internal(format!("Failed to create Tokio runtime: {}", e)))
    })
}

pub(crate) fn get_state() -> Result<Arc<RwLock<FfiState>>> {
    STATE.get().cloned().ok_or(Error::NotInitialized)
}

pub(crate) fn init_state(state: FfiState) -> Result<()> {
    STATE
        .set(Arc::new(RwLock::new(state)))
        .map_err(|_| Error::AlreadyInitialized)
}

/// The installed facade
pub(crate) fn get_biometrics() -> Result<Arc<Biometrics>> {
    let state = get_state()?;
    let state = state.read();
    state.biometrics.clone().ok_or(Error::NoBackend)
}
