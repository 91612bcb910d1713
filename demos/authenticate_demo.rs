//! # Authenticate Example
//!
//! Walks through prompt outcomes on a simulated iPhone and Android phone.
//!
//! ## Run
//!
//! ```bash
//! cargo run --example authenticate_demo
//! ```

use std::sync::Arc;

use biometric_identification::{
    AuthenticateConfig, Biometrics, PromptRequest, SimulatedBackend, SimulatedDevice, UserAction,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "biometric_identification=info".into()),
        )
        .init();

    println!("=== Biometric Identification: Authenticate Example ===\n");

    // Step 1: A successful Face ID read
    println!("Step 1: Face ID match...");
    let iphone = Biometrics::new(Arc::new(
        SimulatedBackend::new(SimulatedDevice::iphone_face_id()).with_script([UserAction::Match]),
    ));
    match iphone.authenticate(Some("Unlock your vault"), None).await {
        Ok(success) => println!("  Authenticated: {:?}", success.auth_type),
        Err(e) => println!("  [FAILED] {}", e),
    }
    println!();

    // Step 2: The user falls back to the passcode
    println!("Step 2: Passcode fallback...");
    let iphone = Biometrics::new(Arc::new(
        SimulatedBackend::new(SimulatedDevice::iphone_touch_id())
            .with_script([UserAction::ChooseFallback]),
    ));
    let config = AuthenticateConfig {
        password_fallback: Some(true),
        fallback_label: Some("Use Passcode".to_string()),
        ..Default::default()
    };
    match iphone.authenticate(Some("Confirm payment"), Some(config)).await {
        Ok(success) => println!("  Authenticated: {:?}", success.auth_type),
        Err(e) => println!("  [FAILED] {}", e),
    }
    println!();

    // Step 3: Android prompt styling and a cancel
    println!("Step 3: Android prompt, user cancels...");
    let config = AuthenticateConfig {
        title: Some("Verify it's you".to_string()),
        image_color: Some("#00aa55".to_string()),
        cancel_text: Some("Not now".to_string()),
        ..Default::default()
    };
    let backend = SimulatedBackend::new(SimulatedDevice::android_fingerprint())
        .with_script([UserAction::Cancel]);
    let request = PromptRequest::resolve(
        backend.device().platform,
        Some("Sign in"),
        &config,
        &Default::default(),
    );
    println!("  Prompt sent to host: {:?}", request.style);

    let android = Biometrics::new(Arc::new(backend));
    match android.authenticate(Some("Sign in"), Some(config)).await {
        Ok(success) => println!("  Authenticated: {:?}", success.auth_type),
        Err(e) => {
            println!("  Rejected with {} ({})", e.code, e.name());
            println!("  Message: {}", e.message);
            println!("  Details: {}", e.details);
        }
    }
    println!();

    println!("=== Example Complete ===");
}
