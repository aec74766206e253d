//! Cancellable SMS wait.
//!
//! Shows how to use `await_sms_cancellable` so another task can stop the
//! polling loop early.
//!
//! # Running
//!
//! ```bash
//! SMS_LEASE_USERNAME=u SMS_LEASE_PASSWORD=p cargo run --example with_cancellation
//! ```

use sms_lease::{CancellationToken, ClientConfig, SmsLeaseClient, SmsOutcome};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let username = env::var("SMS_LEASE_USERNAME")
        .expect("SMS_LEASE_USERNAME environment variable must be set");
    let password = env::var("SMS_LEASE_PASSWORD")
        .expect("SMS_LEASE_PASSWORD environment variable must be set");

    let config = ClientConfig::builder()
        .username(username)
        .password(password)
        .build();
    let mut client = SmsLeaseClient::from_config(config)?;

    let mobile = client.acquire_number(None, None).await?;
    println!("Leased number: {}", mobile.with_country_prefix());

    // Cancel the wait after 30 seconds.
    let cancel_token = CancellationToken::new();
    let token_clone = cancel_token.clone();
    let cancel_handle = tokio::spawn(async move {
        println!("\nWaiting up to 30s before cancelling...");
        tokio::time::sleep(Duration::from_secs(30)).await;
        println!("Cancelling...");
        token_clone.cancel();
    });

    match client.await_sms_cancellable(None, None, cancel_token).await? {
        SmsOutcome::Received(text) => {
            cancel_handle.abort();
            println!("SMS received: {text}");
        }
        SmsOutcome::Cancelled { elapsed, polls } => {
            println!(
                "Cancelled after {:.1}s ({polls} polls); releasing the number",
                elapsed.as_secs_f64()
            );
            client.release(None, None).await?;
        }
        SmsOutcome::TimedOut { elapsed, polls } => {
            println!(
                "Timed out after {:.1}s ({polls} polls); number already released",
                elapsed.as_secs_f64()
            );
        }
    }

    Ok(())
}
