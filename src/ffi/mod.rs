//! # FFI Bindings
//!
//! Foreign Function Interface bindings for iOS and Android hosts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         FFI ARCHITECTURE                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  TypeScript (app)                                                       │
//! │         │  biometrics_call("biometrics_authenticate", json)             │
//! │         ▼                                                               │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  c_api.rs → dispatcher.rs → Biometrics facade                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │         │  FfiNativeCallbacks (registered once)                         │
//! │         ▼                                                               │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Swift: LAContext          Kotlin: BiometricPrompt              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Every entry point returns an `FfiResult`. A failed biometric operation
//! carries code `300 + ordinal` and the serialized `BiometricError` as its
//! message, so the host can reject its promise with the tagged value as-is.

mod types;

mod state;

mod native_bridge;

mod dispatcher;

mod c_api;

pub use c_api::*;
pub use dispatcher::{dispatch, dispatch_to, DResult};
pub use native_bridge::{FfiNativeCallbacks, NativeBridge, NativeCallback};
pub use types::*;
