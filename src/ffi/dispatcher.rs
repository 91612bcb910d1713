//! # FFI Dispatcher
//!
//! JSON-RPC style dispatcher that routes method names to the facade.
//! Called from `biometrics_call(method, args)` in c_api.rs.
//!
//! | Method | Args | Result |
//! |--------|------|--------|
//! | `biometrics_is_supported` | `IsSupportedConfig` | `"FaceID"` |
//! | `biometrics_get_authenticate_type` | `GetAuthenticateTypeConfig` | `"AuthenticationTypeBiometrics"` |
//! | `biometrics_authenticate` | `{ "reason"?, "config"? }` | `{ "authType": ... }` |
//! | `biometrics_version` | none | `{ "version": ... }` |
//!
//! Empty args or `null` mean "no options".
//!
//! Returns `Ok(json_string)` on success, `Err((error_code, message))` on
//! failure. Biometric failures put the serialized `BiometricError` in the
//! message.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::state::{get_biometrics, get_runtime};
use crate::error::{BiometricError, Error};
use crate::facade::Biometrics;
use crate::types::{AuthenticateConfig, GetAuthenticateTypeConfig, IsSupportedConfig};

/// Dispatcher result: JSON on success, `(code, message)` on failure
pub type DResult = Result<String, (i32, String)>;

// ============================================================================
// HELPERS
// ============================================================================

fn err(e: Error) -> (i32, String) {
    (e.code(), e.to_string())
}

fn biometric_err(e: BiometricError) -> (i32, String) {
    let code = Error::Biometric(e.clone()).code();
    match serde_json::to_string(&e) {
        Ok(json) => (code, json),
        Err(_) => (code, e.to_string()),
    }
}

fn parse_args<T: DeserializeOwned + Default>(args: &str) -> Result<T, (i32, String)> {
    let trimmed = args.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(T::default());
    }
    serde_json::from_str(trimmed)
        .map_err(|e| err(Error::InvalidArguments(format!("Invalid JSON: {}", e))))
}

fn ok_json<T: Serialize>(value: &T) -> DResult {
    serde_json::to_string(value).map_err(|e| err(e.into()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AuthenticateArgs {
    reason: Option<String>,
    config: Option<AuthenticateConfig>,
}

// ============================================================================
// MAIN DISPATCHER
// ============================================================================

/// Route a call to the globally installed facade, blocking on the FFI runtime
pub fn dispatch(method: &str, args: &str) -> DResult {
    let biometrics = get_biometrics().map_err(err)?;
    let runtime = get_runtime().map_err(err)?;
    runtime.block_on(dispatch_to(&biometrics, method, args))
}

/// Route a call to `biometrics`
pub async fn dispatch_to(biometrics: &Biometrics, method: &str, args: &str) -> DResult {
    tracing::debug!("dispatch {}", method);
    match method {
        "biometrics_is_supported" => {
            let config: IsSupportedConfig = parse_args(args)?;
            let kind = biometrics
                .is_supported(Some(config))
                .await
                .map_err(biometric_err)?;
            ok_json(&kind)
        }
        "biometrics_get_authenticate_type" => {
            let config: GetAuthenticateTypeConfig = parse_args(args)?;
            let auth_type = biometrics
                .get_authenticate_type(Some(config))
                .await
                .map_err(biometric_err)?;
            ok_json(&auth_type)
        }
        "biometrics_authenticate" => {
            let AuthenticateArgs { reason, config } = parse_args(args)?;
            let success = biometrics
                .authenticate(reason.as_deref(), config)
                .await
                .map_err(biometric_err)?;
            ok_json(&success)
        }
        "biometrics_version" => ok_json(&serde_json::json!({ "version": crate::version() })),
        _ => Err(err(Error::UnknownMethod(method.to_string()))),
    }
}
