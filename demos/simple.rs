use action_nonce::{NonceManager, SingleUseGuard, random_salt};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // Server-side secret for the digest
    let secret = b"my-secret-key";
    let manager = Arc::new(NonceManager::with_secret(secret)?);
    println!("Config: {}", manager.config().summary());

    // Issue a token for "delete post 7" on behalf of user 42
    let salt = random_salt();
    let token = manager.create("delete-post", 42, 7, &salt)?;
    println!("Generated token: {token}");

    // Stateless check: valid until it expires
    if manager.validate(token.as_str(), "delete-post", 42, 7, &salt) {
        println!("✅ Token accepted");
    }

    // Another user presenting the same token is rejected
    if !manager.validate(token.as_str(), "delete-post", 43, 7, &salt) {
        println!("✅ Token rejected for a different user");
    }

    // Single-use: the second presentation is a replay
    let guard = SingleUseGuard::new(Arc::clone(&manager));
    for attempt in 1..=2 {
        let accepted = guard
            .consume(token.as_str(), "delete-post", 42, 7, &salt)
            .await?;
        println!(
            "Attempt {attempt}: {}",
            if accepted { "✅ consumed" } else { "❌ replay rejected" }
        );
    }

    Ok(())
}
