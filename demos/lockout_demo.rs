//! # Lockout Example
//!
//! Repeated failed reads lock the simulated sensor. The next request is
//! refused without showing a prompt.
//!
//! ## Run
//!
//! ```bash
//! cargo run --example lockout_demo
//! ```

use std::sync::Arc;

use biometric_identification::simulated::LockState;
use biometric_identification::{
    AuthenticateConfig, Biometrics, SimulatedBackend, SimulatedDevice, UserAction,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "biometric_identification=info".into()),
        )
        .init();

    println!("=== Biometric Identification: Lockout Example ===\n");

    let device = SimulatedDevice::iphone_touch_id();
    let threshold = device.lockout_threshold;
    let backend = Arc::new(
        SimulatedBackend::new(device).with_script(vec![UserAction::NoMatch; threshold as usize]),
    );
    let biometrics = Biometrics::new(backend.clone());

    // Step 1: Burn through the allowed attempts
    println!("Step 1: {} failed reads...", threshold);
    for attempt in 1..=threshold {
        match biometrics.authenticate(Some("Unlock"), None).await {
            Ok(_) => println!("  Attempt {}: unexpectedly matched", attempt),
            Err(e) => println!("  Attempt {}: {}", attempt, e.code),
        }
    }
    println!("  Sensor state: {:?}", backend.lock_state());
    println!();

    // Step 2: The sensor is locked, no prompt appears
    println!("Step 2: Requesting again...");
    let shown = backend.prompts_shown();
    match biometrics.authenticate(Some("Unlock"), None).await {
        Ok(_) => println!("  [FAILED] expected a lockout"),
        Err(e) => println!("  Rejected: {} ({})", e.code, e.message),
    }
    if backend.prompts_shown() == shown {
        println!("  [OK] No prompt was shown");
    }
    println!();

    // Step 3: The passcode clears the lockout
    println!("Step 3: Unlocking with the passcode...");
    backend.push_actions([UserAction::ChooseFallback]);
    let config = AuthenticateConfig {
        password_fallback: Some(true),
        ..Default::default()
    };
    match biometrics.authenticate(Some("Unlock"), Some(config)).await {
        Ok(success) => println!("  Authenticated: {:?}", success.auth_type),
        Err(e) => println!("  [FAILED] {}", e),
    }
    if backend.lock_state() == LockState::Unlocked {
        println!("  [OK] Sensor unlocked");
    }
    println!();

    println!("=== Example Complete ===");
}
