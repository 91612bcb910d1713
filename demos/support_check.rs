//! # Support Check Example
//!
//! Probes several simulated devices and prints what each one reports.
//!
//! ## Run
//!
//! ```bash
//! cargo run --example support_check
//! ```

use std::sync::Arc;

use biometric_identification::{
    Biometrics, GetAuthenticateTypeConfig, IsSupportedConfig, Platform, SimulatedBackend,
    SimulatedDevice,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "biometric_identification=info".into()),
        )
        .init();

    println!("=== Biometric Identification: Support Check Example ===\n");

    let devices = [
        ("iPhone (Face ID)", SimulatedDevice::iphone_face_id()),
        ("iPhone (Touch ID)", SimulatedDevice::iphone_touch_id()),
        ("Android (fingerprint)", SimulatedDevice::android_fingerprint()),
        ("Android (no sensor)", SimulatedDevice::without_sensor(Platform::Android)),
        ("iPhone (nothing enrolled)", SimulatedDevice {
            enrolled: false,
            ..SimulatedDevice::iphone_face_id()
        }),
    ];

    for (step, (label, device)) in devices.into_iter().enumerate() {
        println!("Step {}: {}", step + 1, label);
        let biometrics = Biometrics::new(Arc::new(SimulatedBackend::new(device)));

        match biometrics.is_supported(None).await {
            Ok(kind) => println!("  Supported: {}", kind),
            Err(e) => println!("  Not supported: {} ({})", e.code, e.message),
        }

        let unified = IsSupportedConfig {
            unified_errors: Some(true),
        };
        if let Err(e) = biometrics.is_supported(Some(unified)).await {
            println!("  Unified message: {}", e.message);
        }

        let fallback = GetAuthenticateTypeConfig {
            password_fallback: Some(true),
        };
        match biometrics.get_authenticate_type(Some(fallback)).await {
            Ok(auth_type) => println!("  Would authenticate with: {}", auth_type.as_str()),
            Err(e) => println!("  No authentication method: {}", e.code),
        }
        println!();
    }

    println!("=== Example Complete ===");
}
