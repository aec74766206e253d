//! Parsing of the service's pipe-delimited responses.

use crate::errors::ApiError;

/// Tag the service uses for successful responses.
const SUCCESS_TAG: &str = "success";

/// A service response, parsed at the transport boundary.
///
/// The wire format is `status|payload`: the first field is either the
/// literal `success` or a numeric status code, and everything after the
/// first delimiter is the payload. A response with no delimiter carries an
/// empty payload; it is only a success if the whole body is the success tag.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Success(String),
    Error(ApiError),
}

impl ApiResponse {
    /// Parse a raw response body.
    pub fn from_text(text: &str) -> Self {
        let (tag, payload) = match text.split_once('|') {
            Some((tag, payload)) => (tag, payload),
            None => (text, ""),
        };

        let tag = tag.trim();
        if tag == SUCCESS_TAG {
            Self::Success(payload.to_string())
        } else {
            Self::Error(ApiError::from_raw(tag))
        }
    }

    /// Convert the response into a Result for ergonomic error handling.
    pub fn into_result(self) -> Result<String, ApiError> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Error(e) => Err(e),
        }
    }

    /// Check if the response is successful without consuming it.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ApiCode;

    #[test]
    fn test_success_with_payload() {
        let response = ApiResponse::from_text("success|13800001234");
        assert_eq!(response, ApiResponse::Success("13800001234".to_string()));
    }

    #[test]
    fn test_success_empty_payload() {
        let response = ApiResponse::from_text("success|");
        assert_eq!(response, ApiResponse::Success(String::new()));
    }

    #[test]
    fn test_success_without_delimiter() {
        let response = ApiResponse::from_text("success");
        assert_eq!(response, ApiResponse::Success(String::new()));
    }

    #[test]
    fn test_payload_keeps_later_delimiters() {
        let response = ApiResponse::from_text("success|a|b|c");
        assert_eq!(response, ApiResponse::Success("a|b|c".to_string()));
    }

    #[test]
    fn test_error_code() {
        let response = ApiResponse::from_text("2004");
        match response {
            ApiResponse::Error(error) => {
                assert_eq!(error.code, ApiCode::NoNumbers);
                assert_eq!(error.message, "暂时没有可用的号码");
            }
            ApiResponse::Success(_) => panic!("expected error"),
        }
    }

    #[test]
    fn test_error_code_with_payload() {
        let response = ApiResponse::from_text("3001|whatever");
        match response {
            ApiResponse::Error(error) => assert!(error.code.is_sms_pending()),
            ApiResponse::Success(_) => panic!("expected error"),
        }
    }

    #[test]
    fn test_trailing_newline_tolerated() {
        let response = ApiResponse::from_text("3001\r\n");
        assert!(!response.is_success());
    }

    /// Every documented code resolves to its exact message.
    #[test]
    fn test_full_message_table() {
        let table = [
            ("1001", "参数 token 不能为空"),
            ("1002", "参数 action 不能为空"),
            ("1003", "参数 action 错误"),
            ("1004", "token 失效"),
            ("1005", "用户名或密码错误"),
            ("1006", "用户名不能为空"),
            ("1007", "密码不能为空"),
            ("1008", "账户余额不足"),
            ("1009", "账户被禁用"),
            ("1010", "参数错误"),
            ("1011", "账户待审核"),
            ("1012", "登录数达到上限"),
            ("2001", "参数 itemid 不能为空"),
            ("2002", "项目不存在"),
            ("2003", "项目未启用"),
            ("2004", "暂时没有可用的号码"),
            ("2005", "获取号码数量已达到上限"),
            ("2006", "参数 mobile 不能为空"),
            ("2007", "号码已被释放"),
            ("2008", "号码已离线"),
            ("2009", "发送内容不能为空"),
            ("2010", "号码正在使用中"),
            ("3001", "尚未收到短信"),
            ("3002", "等待发送"),
            ("3003", "正在发送"),
            ("3004", "发送失败"),
            ("3005", "订单不存在"),
            ("3006", "专属通道不存在"),
            ("3007", "专属通道未启用"),
            ("3008", "专属通道密码与项目不匹配"),
            ("9001", "系统错误"),
            ("9002", "系统异常"),
            ("9003", "系统繁忙"),
        ];

        for (raw, message) in table {
            match ApiResponse::from_text(raw) {
                ApiResponse::Error(error) => {
                    assert_eq!(error.code.code(), raw);
                    assert_eq!(error.message, message, "message mismatch for {raw}");
                }
                ApiResponse::Success(_) => panic!("{raw} parsed as success"),
            }
        }
    }

    #[test]
    fn test_unknown_code_generic_message() {
        match ApiResponse::from_text("5555") {
            ApiResponse::Error(error) => {
                assert_eq!(error.code.code(), "5555");
                assert_eq!(error.message, "Unknown");
            }
            ApiResponse::Success(_) => panic!("expected error"),
        }
    }
}
