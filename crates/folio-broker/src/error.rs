//! 브로커 에러 타입.

use thiserror::Error;

/// 브로커 API 관련 에러.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    NetworkError(String),

    /// API 에러 응답 (4xx/5xx)
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 인증/권한 에러
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 폴백에 필요한 자격증명 미설정 (설정 오류)
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 토큰 문서 저장소 에러
    #[error(transparent)]
    Store(#[from] folio_core::StoreError),
}

/// 브로커 작업을 위한 Result 타입.
pub type BrokerResult<T> = Result<T, BrokerError>;

impl From<reqwest::Error> for BrokerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BrokerError::Timeout(err.to_string())
        } else {
            BrokerError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BrokerError {
    fn from(err: serde_json::Error) -> Self {
        BrokerError::ParseError(err.to_string())
    }
}
