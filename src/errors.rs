//! Error taxonomy and the provider's status-code table.

use crate::transport::TransportError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::time::Duration;
use thiserror::Error;

/// Status codes returned by the rental service API.
///
/// The code/message table is part of the wire contract and is reproduced
/// verbatim; the provider documents its messages in Chinese.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCode {
    // === Token / parameter errors (1001-1012) ===
    /// 1001: token parameter missing.
    TokenMissing,
    /// 1002: action parameter missing.
    ActionMissing,
    /// 1003: action parameter invalid.
    ActionInvalid,
    /// 1004: token expired.
    TokenExpired,
    /// 1005: wrong username or password.
    BadCredentials,
    /// 1006: username parameter missing.
    UsernameMissing,
    /// 1007: password parameter missing.
    PasswordMissing,
    /// 1008: insufficient account balance.
    InsufficientBalance,
    /// 1009: account disabled.
    AccountDisabled,
    /// 1010: bad parameter.
    BadParameter,
    /// 1011: account pending review.
    AccountPendingReview,
    /// 1012: concurrent login limit reached.
    LoginLimitReached,

    // === Item / mobile errors (2001-2010) ===
    /// 2001: itemid parameter missing.
    ItemIdMissing,
    /// 2002: item does not exist.
    ItemNotFound,
    /// 2003: item not enabled.
    ItemDisabled,
    /// 2004: no numbers currently available.
    NoNumbers,
    /// 2005: held-number limit reached.
    HoldLimitReached,
    /// 2006: mobile parameter missing.
    MobileMissing,
    /// 2007: number already released.
    MobileReleased,
    /// 2008: number offline.
    MobileOffline,
    /// 2009: send content missing.
    ContentMissing,
    /// 2010: number currently in use.
    MobileInUse,

    // === SMS / channel errors (3001-3008) ===
    /// 3001: SMS not yet received. The only code the poll loop retries on.
    SmsPending,
    /// 3002: queued for sending.
    SendQueued,
    /// 3003: sending in progress.
    Sending,
    /// 3004: send failed.
    SendFailed,
    /// 3005: order does not exist.
    OrderNotFound,
    /// 3006: dedicated channel does not exist.
    ChannelNotFound,
    /// 3007: dedicated channel not enabled.
    ChannelDisabled,
    /// 3008: dedicated channel password does not match the item.
    ChannelPasswordMismatch,

    // === System errors (9001-9003) ===
    /// 9001: system error.
    SystemError,
    /// 9002: system exception.
    SystemException,
    /// 9003: system busy.
    SystemBusy,

    /// Unrecognized status tag from the service.
    Unknown { raw: String },
}

impl ApiCode {
    /// Returns the numeric code as it appears on the wire.
    pub fn code(&self) -> &str {
        match self {
            Self::TokenMissing => "1001",
            Self::ActionMissing => "1002",
            Self::ActionInvalid => "1003",
            Self::TokenExpired => "1004",
            Self::BadCredentials => "1005",
            Self::UsernameMissing => "1006",
            Self::PasswordMissing => "1007",
            Self::InsufficientBalance => "1008",
            Self::AccountDisabled => "1009",
            Self::BadParameter => "1010",
            Self::AccountPendingReview => "1011",
            Self::LoginLimitReached => "1012",
            Self::ItemIdMissing => "2001",
            Self::ItemNotFound => "2002",
            Self::ItemDisabled => "2003",
            Self::NoNumbers => "2004",
            Self::HoldLimitReached => "2005",
            Self::MobileMissing => "2006",
            Self::MobileReleased => "2007",
            Self::MobileOffline => "2008",
            Self::ContentMissing => "2009",
            Self::MobileInUse => "2010",
            Self::SmsPending => "3001",
            Self::SendQueued => "3002",
            Self::Sending => "3003",
            Self::SendFailed => "3004",
            Self::OrderNotFound => "3005",
            Self::ChannelNotFound => "3006",
            Self::ChannelDisabled => "3007",
            Self::ChannelPasswordMismatch => "3008",
            Self::SystemError => "9001",
            Self::SystemException => "9002",
            Self::SystemBusy => "9003",
            Self::Unknown { raw } => raw.as_str(),
        }
    }

    /// Returns the provider's documented message for this code.
    pub fn message(&self) -> &str {
        match self {
            Self::TokenMissing => "参数 token 不能为空",
            Self::ActionMissing => "参数 action 不能为空",
            Self::ActionInvalid => "参数 action 错误",
            Self::TokenExpired => "token 失效",
            Self::BadCredentials => "用户名或密码错误",
            Self::UsernameMissing => "用户名不能为空",
            Self::PasswordMissing => "密码不能为空",
            Self::InsufficientBalance => "账户余额不足",
            Self::AccountDisabled => "账户被禁用",
            Self::BadParameter => "参数错误",
            Self::AccountPendingReview => "账户待审核",
            Self::LoginLimitReached => "登录数达到上限",
            Self::ItemIdMissing => "参数 itemid 不能为空",
            Self::ItemNotFound => "项目不存在",
            Self::ItemDisabled => "项目未启用",
            Self::NoNumbers => "暂时没有可用的号码",
            Self::HoldLimitReached => "获取号码数量已达到上限",
            Self::MobileMissing => "参数 mobile 不能为空",
            Self::MobileReleased => "号码已被释放",
            Self::MobileOffline => "号码已离线",
            Self::ContentMissing => "发送内容不能为空",
            Self::MobileInUse => "号码正在使用中",
            Self::SmsPending => "尚未收到短信",
            Self::SendQueued => "等待发送",
            Self::Sending => "正在发送",
            Self::SendFailed => "发送失败",
            Self::OrderNotFound => "订单不存在",
            Self::ChannelNotFound => "专属通道不存在",
            Self::ChannelDisabled => "专属通道未启用",
            Self::ChannelPasswordMismatch => "专属通道密码与项目不匹配",
            Self::SystemError => "系统错误",
            Self::SystemException => "系统异常",
            Self::SystemBusy => "系统繁忙",
            Self::Unknown { .. } => "Unknown",
        }
    }

    /// Parse a status tag from the wire.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "1001" => Self::TokenMissing,
            "1002" => Self::ActionMissing,
            "1003" => Self::ActionInvalid,
            "1004" => Self::TokenExpired,
            "1005" => Self::BadCredentials,
            "1006" => Self::UsernameMissing,
            "1007" => Self::PasswordMissing,
            "1008" => Self::InsufficientBalance,
            "1009" => Self::AccountDisabled,
            "1010" => Self::BadParameter,
            "1011" => Self::AccountPendingReview,
            "1012" => Self::LoginLimitReached,
            "2001" => Self::ItemIdMissing,
            "2002" => Self::ItemNotFound,
            "2003" => Self::ItemDisabled,
            "2004" => Self::NoNumbers,
            "2005" => Self::HoldLimitReached,
            "2006" => Self::MobileMissing,
            "2007" => Self::MobileReleased,
            "2008" => Self::MobileOffline,
            "2009" => Self::ContentMissing,
            "2010" => Self::MobileInUse,
            "3001" => Self::SmsPending,
            "3002" => Self::SendQueued,
            "3003" => Self::Sending,
            "3004" => Self::SendFailed,
            "3005" => Self::OrderNotFound,
            "3006" => Self::ChannelNotFound,
            "3007" => Self::ChannelDisabled,
            "3008" => Self::ChannelPasswordMismatch,
            "9001" => Self::SystemError,
            "9002" => Self::SystemException,
            "9003" => Self::SystemBusy,
            _ => Self::Unknown {
                raw: raw.to_string(),
            },
        }
    }

    /// True only for code 3001, the "SMS not yet arrived" signal the poll
    /// loop retries on. Every other code is fatal inside the loop.
    pub fn is_sms_pending(&self) -> bool {
        matches!(self, Self::SmsPending)
    }
}

impl Display for ApiCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for ApiCode {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for ApiCode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_raw(&s))
    }
}

/// Non-success status reported by the rental service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("service error #{code}: {message}")]
pub struct ApiError {
    /// Status code from the service.
    pub code: ApiCode,
    /// Resolved human-readable message.
    pub message: String,
}

impl ApiError {
    /// Create a service error from a parsed code.
    pub fn new(code: ApiCode) -> Self {
        let message = code.message().to_string();
        Self { code, message }
    }

    /// Parse a service error from a raw status tag.
    pub fn from_raw(raw: &str) -> Self {
        Self::new(ApiCode::from_raw(raw))
    }
}

/// Errors produced by the lease client.
#[derive(Debug, Error)]
pub enum SmsLeaseError {
    /// Neither a token nor a username/password pair is configured.
    #[error("no token or username/password configured")]
    Configuration,

    /// The login call was rejected by the service.
    #[error("login rejected: {0}")]
    Authentication(#[source] ApiError),

    /// The service reported a non-success status outside the tolerated paths.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// An operation required a leased number but none is held.
    #[error("no mobile number is currently leased")]
    NoLease,

    /// Polling exhausted the maximum wait without a message.
    #[error("no SMS received after {:.1}s ({polls} polls)", elapsed.as_secs_f64())]
    NoSms {
        /// Wall-clock time spent polling.
        elapsed: Duration,
        /// Number of poll attempts made.
        polls: u32,
    },

    /// An SMS arrived but contained no digit run to extract.
    #[error("no numerical code found in SMS text: {text:?}")]
    Extraction {
        /// The message body that failed extraction.
        text: String,
    },

    /// Failed to decode a JSON payload from the service.
    #[error("failed to decode response payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// Transport-level failure, surfaced unchanged. Never retried.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Convenience alias for client operations.
pub type Result<T> = std::result::Result<T, SmsLeaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for raw in [
            "1001", "1002", "1003", "1004", "1005", "1006", "1007", "1008", "1009", "1010",
            "1011", "1012", "2001", "2002", "2003", "2004", "2005", "2006", "2007", "2008",
            "2009", "2010", "3001", "3002", "3003", "3004", "3005", "3006", "3007", "3008",
            "9001", "9002", "9003",
        ] {
            let code = ApiCode::from_raw(raw);
            assert!(!matches!(code, ApiCode::Unknown { .. }), "{raw} unmapped");
            assert_eq!(code.code(), raw);
        }
    }

    #[test]
    fn test_unknown_code() {
        let code = ApiCode::from_raw("4242");
        assert_eq!(
            code,
            ApiCode::Unknown {
                raw: "4242".to_string()
            }
        );
        assert_eq!(code.code(), "4242");
        assert_eq!(code.message(), "Unknown");
    }

    #[test]
    fn test_only_3001_is_pending() {
        assert!(ApiCode::SmsPending.is_sms_pending());
        // Codes that might look transient are still fatal inside the loop.
        assert!(!ApiCode::SendQueued.is_sms_pending());
        assert!(!ApiCode::Sending.is_sms_pending());
        assert!(!ApiCode::SystemBusy.is_sms_pending());
    }

    #[test]
    fn test_api_error_display() {
        let error = ApiError::from_raw("1004");
        assert_eq!(error.code, ApiCode::TokenExpired);
        assert_eq!(error.to_string(), "service error #1004: token 失效");
    }

    #[test]
    fn test_code_serde() {
        let json = serde_json::to_string(&ApiCode::NoNumbers).unwrap();
        assert_eq!(json, r#""2004""#);

        let code: ApiCode = serde_json::from_str(r#""3001""#).unwrap();
        assert_eq!(code, ApiCode::SmsPending);
    }
}
