//! # Native Callback Bridge
//!
//! Lets a Swift or Kotlin host act as the [`BiometricBackend`]. The host
//! registers a table of C callbacks once; each facade request becomes one
//! callback invocation exchanging JSON.
//!
//! ```text
//!  request JSON ──► callback(context, args) ──► reply JSON
//!
//!  probe_support                  args: {}
//!                                 reply: {"ok":"FaceID"} | {"error":NativeFailure}
//!  default_authentication_type    args: {"passwordFallback":bool}
//!                                 reply: {"ok":"AuthenticationTypePassword"} | ...
//!  present_prompt                 args: PromptRequest
//!                                 reply: {"ok":"AuthenticationTypeBiometrics"} | ...
//! ```
//!
//! Replies are allocated by the host and released through `free_string`.
//! Callbacks run on a Tokio blocking-pool thread and may block until the
//! prompt is dismissed.

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::backend::{BiometricBackend, NativeResult, Platform};
use crate::error::ErrorCode;
use crate::native::NativeFailure;
use crate::prompt::PromptRequest;
use crate::types::{AuthenticationType, BiometryType};

/// Host callback: takes the opaque context and a JSON argument string,
/// returns a host-allocated JSON reply.
pub type NativeCallback = extern "C" fn(context: *mut c_void, args: *const c_char) -> *mut c_char;

/// Callback table registered by the host
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FfiNativeCallbacks {
    /// Opaque pointer handed back on every call
    pub context: *mut c_void,
    /// 0 = iOS, 1 = Android
    pub platform: i32,
    /// Query sensor and enrollment state
    pub probe_support: NativeCallback,
    /// Report the method a prompt would use now
    pub default_authentication_type: NativeCallback,
    /// Show the prompt and block until it resolves
    pub present_prompt: NativeCallback,
    /// Release a reply string returned by any callback
    pub free_string: extern "C" fn(ptr: *mut c_char),
}

impl FfiNativeCallbacks {
    fn platform(&self) -> Platform {
        match self.platform {
            1 => Platform::Android,
            _ => Platform::Ios,
        }
    }
}

/// The callback table, shareable across runtime threads.
struct HostCallbacks(FfiNativeCallbacks);

// SAFETY: the host guarantees its callbacks and context may be used from any
// thread, which is part of the registration contract.
unsafe impl Send for HostCallbacks {}
unsafe impl Sync for HostCallbacks {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum NativeReply<T> {
    Ok(T),
    Error(NativeFailure),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DefaultTypeArgs {
    password_fallback: bool,
}

#[derive(Clone, Copy, Debug)]
enum Operation {
    Probe,
    DefaultType,
    Prompt,
}

impl HostCallbacks {
    fn invoke<T: DeserializeOwned>(&self, op: Operation, args: &str) -> NativeResult<T> {
        let callback = match op {
            Operation::Probe => self.0.probe_support,
            Operation::DefaultType => self.0.default_authentication_type,
            Operation::Prompt => self.0.present_prompt,
        };
        let args = CString::new(args)
            .map_err(|e| bridge_failure(ErrorCode::ProcessingError, format!("{:?}: {}", op, e)))?;

        let reply_ptr = callback(self.0.context, args.as_ptr());
        if reply_ptr.is_null() {
            return Err(bridge_failure(
                ErrorCode::UnknownError,
                format!("{:?}: native callback returned null", op),
            ));
        }

        // SAFETY: non-null replies are NUL-terminated strings owned by the
        // host until handed back through free_string.
        let reply = unsafe { CStr::from_ptr(reply_ptr) }
            .to_string_lossy()
            .into_owned();
        (self.0.free_string)(reply_ptr);

        match serde_json::from_str::<NativeReply<T>>(&reply) {
            Ok(NativeReply::Ok(value)) => Ok(value),
            Ok(NativeReply::Error(failure)) => Err(failure),
            Err(e) => {
                tracing::warn!("Malformed reply from native {:?}: {}", op, e);
                Err(bridge_failure(
                    ErrorCode::UnknownError,
                    format!("malformed native reply: {}", e),
                ))
            }
        }
    }
}

fn bridge_failure(code: ErrorCode, details: String) -> NativeFailure {
    NativeFailure::unified(code, code.description()).with_details(details)
}

/// [`BiometricBackend`] backed by host callbacks
pub struct NativeBridge {
    host: Arc<HostCallbacks>,
    platform: Platform,
}

impl NativeBridge {
    /// Wrap a host callback table.
    ///
    /// # Safety
    /// Every callback must stay valid for the lifetime of the bridge, accept
    /// calls from any thread, and return either null or a NUL-terminated
    /// string that `free_string` releases.
    pub unsafe fn new(callbacks: FfiNativeCallbacks) -> Self {
        Self {
            platform: callbacks.platform(),
            host: Arc::new(HostCallbacks(callbacks)),
        }
    }

    async fn call<T>(&self, op: Operation, args: String) -> NativeResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let host = self.host.clone();
        tokio::task::spawn_blocking(move || host.invoke::<T>(op, &args))
            .await
            .map_err(|e| bridge_failure(ErrorCode::UnknownError, format!("{:?}: {}", op, e)))?
    }
}

#[async_trait]
impl BiometricBackend for NativeBridge {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn probe_support(&self) -> NativeResult<BiometryType> {
        self.call(Operation::Probe, "{}".to_string()).await
    }

    async fn default_authentication_type(
        &self,
        password_fallback: bool,
    ) -> NativeResult<AuthenticationType> {
        let args = serde_json::to_string(&DefaultTypeArgs { password_fallback })
            .map_err(|e| bridge_failure(ErrorCode::ProcessingError, e.to_string()))?;
        self.call(Operation::DefaultType, args).await
    }

    async fn present_prompt(&self, request: &PromptRequest) -> NativeResult<AuthenticationType> {
        let args = serde_json::to_string(request)
            .map_err(|e| bridge_failure(ErrorCode::ProcessingError, e.to_string()))?;
        self.call(Operation::Prompt, args).await
    }
}
