//! Core types for the number-lease lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

/// Country prefix the provider's numbers belong to.
pub const COUNTRY_PREFIX: &str = "+86";

// =============================================================================
// Mobile
// =============================================================================

/// A leased mobile number, as issued by the provider (national digits only,
/// e.g. "13800001234").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mobile(String);

impl Mobile {
    /// Create a new Mobile from the raw provider payload.
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Get the raw national number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Format the number with the `+86` country prefix.
    pub fn with_country_prefix(&self) -> String {
        format!("{}{}", COUNTRY_PREFIX, self.0)
    }
}

impl Display for Mobile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Mobile {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Mobile {
    fn from(number: String) -> Self {
        Self(number)
    }
}

impl From<&str> for Mobile {
    fn from(number: &str) -> Self {
        Self(number.to_string())
    }
}

// =============================================================================
// SmsCode (OTP)
// =============================================================================

/// Numerical verification code extracted from an SMS body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsCode(pub String);

impl SmsCode {
    /// Create a new SmsCode.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SmsCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SmsCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for SmsCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl From<&str> for SmsCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

// =============================================================================
// SmsOutcome
// =============================================================================

/// Outcome of waiting for an inbound SMS.
///
/// Timing out is a designed recovery path (the number is released and the
/// caller decides what to do next), so it is reported as an outcome rather
/// than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmsOutcome {
    /// The SMS arrived; carries the full message body.
    Received(String),
    /// The configured maximum wait elapsed without a message.
    TimedOut {
        /// Wall-clock time spent polling.
        elapsed: Duration,
        /// Number of poll attempts made.
        polls: u32,
    },
    /// A caller-supplied cancellation token fired between poll attempts.
    Cancelled {
        /// Wall-clock time spent polling before cancellation.
        elapsed: Duration,
        /// Number of poll attempts made.
        polls: u32,
    },
}

impl SmsOutcome {
    /// True if an SMS body was received.
    pub fn is_received(&self) -> bool {
        matches!(self, Self::Received(_))
    }

    /// Consume the outcome, returning the SMS body if one arrived.
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Received(text) => Some(text),
            Self::TimedOut { .. } | Self::Cancelled { .. } => None,
        }
    }
}

// =============================================================================
// AccountInfo
// =============================================================================

/// Account snapshot returned by `getaccountinfo` with `format=1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountInfo {
    /// Remaining account balance.
    pub balance: f64,
    /// Provider-side account status flag.
    pub status: u32,
    /// Account level.
    pub user_level: u32,
    /// Maximum number of numbers the account may hold at once.
    pub max_hold: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mobile_country_prefix() {
        let mobile = Mobile::new("13800001234");
        assert_eq!(mobile.as_str(), "13800001234");
        assert_eq!(mobile.with_country_prefix(), "+8613800001234");
    }

    #[test]
    fn test_sms_code() {
        let code = SmsCode::new("482917");
        assert_eq!(code.as_str(), "482917");
        assert_eq!(code.to_string(), "482917");
    }

    #[test]
    fn test_outcome_into_text() {
        let received = SmsOutcome::Received("hello".to_string());
        assert!(received.is_received());
        assert_eq!(received.into_text().as_deref(), Some("hello"));

        let timed_out = SmsOutcome::TimedOut {
            elapsed: Duration::from_secs(180),
            polls: 36,
        };
        assert!(!timed_out.is_received());
        assert_eq!(timed_out.into_text(), None);
    }

    #[test]
    fn test_account_info_deserialize() {
        let json = r#"{"Balance": 12.5, "Status": 1, "UserLevel": 3, "MaxHold": 20}"#;
        let info: AccountInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.balance, 12.5);
        assert_eq!(info.status, 1);
        assert_eq!(info.user_level, 3);
        assert_eq!(info.max_hold, 20);
    }
}
