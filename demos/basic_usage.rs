//! Basic lease lifecycle: login, check the account, lease a number, wait
//! for the verification code.
//!
//! # Running
//!
//! ```bash
//! SMS_LEASE_USERNAME=u SMS_LEASE_PASSWORD=p cargo run --example basic_usage
//! ```

use sms_lease::{ClientConfig, SmsLeaseClient, SmsLeaseError};
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
        .poll_interval(Duration::from_secs(5))
        .max_wait(Duration::from_secs(180))
        .build();
    let mut client = SmsLeaseClient::from_config(config)?;

    let info = client.account_info().await?;
    println!("Balance: {}", info.balance);
    println!("MaxHold: {}", info.max_hold);

    let mobile = client.acquire_number(None, None).await?;
    println!("Leased number: {}", mobile.with_country_prefix());

    println!("Waiting for verification code...");
    match client.numeric_code(None, None).await {
        Ok(code) => println!("Verification code: {code}"),
        Err(SmsLeaseError::NoSms { elapsed, polls }) => {
            println!(
                "No SMS after {:.0}s ({polls} polls); number was released",
                elapsed.as_secs_f64()
            );
        }
        Err(e) => {
            // Give the number back before bailing out.
            let _ = client.release(None, None).await;
            return Err(e.into());
        }
    }

    Ok(())
}
