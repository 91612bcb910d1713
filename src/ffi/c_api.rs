//! # C API
//!
//! C-compatible FFI functions for iOS and Android hosts.
//!
//! All functions follow the naming convention: `biometrics_<action>`

use std::ffi::CString;
use std::os::raw::c_char;
use std::sync::Arc;

use super::native_bridge::{FfiNativeCallbacks, NativeBridge};
use super::state::{get_runtime, get_state, init_state, FfiState};
use super::types::*;
use crate::backend::Platform;
use crate::error::Error;
use crate::simulated::{SimulatedBackend, SimulatedDevice};
use crate::BiometricsConfig;

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize the biometrics binding
///
/// Must be called before any other functions.
///
/// # Arguments
/// * `config_json` - `BiometricsConfig` as JSON (null for defaults)
///
/// # Returns
/// FfiResult with success/error status
///
/// # Safety
/// `config_json` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn biometrics_init(config_json: *const c_char) -> FfiResult {
    let config = match cstr_to_string(config_json) {
        Some(json) => match BiometricsConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => return FfiResult::err(e.code(), e.to_string()),
        },
        None => BiometricsConfig::default(),
    };

    if let Err(e) = get_runtime() {
        return FfiResult::err(e.code(), e.to_string());
    }

    if let Err(e) = init_state(FfiState::new(config)) {
        return FfiResult::err(e.code(), e.to_string());
    }

    tracing::info!("Biometrics FFI initialized");
    FfiResult::ok_empty()
}

/// Register the host's native biometric callbacks
///
/// Replaces any previously installed backend.
///
/// # Safety
/// See [`NativeBridge::new`]: every callback must remain valid for the life
/// of the process and accept calls from any thread.
#[no_mangle]
pub unsafe extern "C" fn biometrics_register_native(callbacks: FfiNativeCallbacks) -> FfiResult {
    let state = match get_state() {
        Ok(s) => s,
        Err(e) => return FfiResult::err(e.code(), e.to_string()),
    };
    let bridge = NativeBridge::new(callbacks);
    state.write().install(Arc::new(bridge));
    FfiResult::ok_empty()
}

/// Install the in-memory simulated device
///
/// # Arguments
/// * `device_json` - `SimulatedDevice` as JSON (null for the stock device of
///   the build target's platform)
///
/// # Safety
/// `device_json` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn biometrics_use_simulated(device_json: *const c_char) -> FfiResult {
    let device = match cstr_to_string(device_json) {
        Some(json) => match serde_json::from_str::<SimulatedDevice>(&json) {
            Ok(device) => device,
            Err(e) => {
                let e = Error::InvalidArguments(format!("Invalid device: {}", e));
                return FfiResult::err(e.code(), e.to_string());
            }
        },
        None => SimulatedDevice::for_platform(Platform::current()),
    };

    let state = match get_state() {
        Ok(s) => s,
        Err(e) => return FfiResult::err(e.code(), e.to_string()),
    };
    state.write().install(Arc::new(SimulatedBackend::new(device)));
    FfiResult::ok_empty()
}

/// Remove the installed backend
#[no_mangle]
pub extern "C" fn biometrics_shutdown() -> FfiResult {
    if let Ok(state) = get_state() {
        state.write().biometrics = None;
        tracing::info!("Biometrics backend removed");
    }
    FfiResult::ok_empty()
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Call a facade method by name
///
/// # Arguments
/// * `method` - e.g. `biometrics_authenticate`
/// * `args` - JSON arguments (null for none)
///
/// # Safety
/// Both pointers must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn biometrics_call(method: *const c_char, args: *const c_char) -> FfiResult {
    let method = match cstr_to_string(method) {
        Some(m) => m,
        None => {
            let e = Error::InvalidArguments("Invalid method name".to_string());
            return FfiResult::err(e.code(), e.to_string());
        }
    };
    let args = cstr_to_string(args).unwrap_or_default();

    FfiResult::from_dispatch(super::dispatch(&method, &args))
}

/// Get the crate version
#[no_mangle]
pub extern "C" fn biometrics_version() -> *mut c_char {
    CString::new(crate::version()).unwrap_or_default().into_raw()
}
