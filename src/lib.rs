//! # SMS Lease
//!
//! Client for a disposable-mobile-number rental service: authenticate,
//! lease a number, poll for the inbound verification SMS, extract the
//! numerical code, and return the number to the pool.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sms_lease::{ClientConfig, SmsLeaseClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .username("your_username")
//!         .password("your_password")
//!         .item_id(1042)
//!         .build();
//!
//!     let mut client = SmsLeaseClient::from_config(config)?;
//!
//!     let mobile = client.acquire_number(None, None).await?;
//!     println!("leased: {}", mobile.with_country_prefix());
//!
//!     let code = client.numeric_code(None, None).await?;
//!     println!("verification code: {}", code);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! SmsLeaseClient<T>        lease lifecycle, token cache, polling loop
//!         │
//!         ▼
//!     Transport            trait: one GET per action, raw text back
//!         │
//!         ▼
//!   ApiResponse            status|payload split, code → message table
//! ```
//!
//! The poll loop retries only on the provider's "SMS not yet received"
//! status; every other non-success status aborts immediately. Timing goes
//! through a pluggable [`Clock`], so tests run without real delays.
//!
//! ## Features
//!
//! - `tracing` - tracing instrumentation with OpenTelemetry support
//!   (enabled by default)

pub mod client;
pub mod clock;
pub mod config;
pub mod errors;
pub mod progress;
pub mod response;
pub mod transport;
pub mod types;

// Re-export commonly used types at the crate root
pub use client::SmsLeaseClient;
pub use clock::{Clock, TokioClock};
pub use config::{ClientConfig, ClientConfigBuilder, ConfigStore, MemoryConfig};
pub use errors::{ApiCode, ApiError, SmsLeaseError};
pub use progress::{NoopProgress, ProgressObserver};
pub use response::ApiResponse;
pub use transport::{
    Action, DEFAULT_ENDPOINT, DEFAULT_USER_AGENT, HttpTransport, HttpTransportBuilder, Transport,
    TransportError,
};
pub use types::{AccountInfo, COUNTRY_PREFIX, Mobile, SmsCode, SmsOutcome};

// Re-exported so callers don't need a direct tokio-util dependency for
// cancellable waits.
pub use tokio_util::sync::CancellationToken;
