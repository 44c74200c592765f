//! 에러 타입 정의.

use std::fmt;

/// Collector 에러 타입
#[derive(Debug)]
pub enum CollectorError {
    /// 브로커 API 에러 (자격증명 갱신, 조회; 토큰 문서 저장소 포함)
    Broker(folio_broker::BrokerError),
    /// 설정 에러
    Config(String),
    /// 스냅샷 업로드 에러
    Upload(String),
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broker(e) => write!(f, "Broker error: {}", e),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Upload(msg) => write!(f, "Upload error: {}", msg),
        }
    }
}

impl std::error::Error for CollectorError {}

impl From<folio_broker::BrokerError> for CollectorError {
    fn from(err: folio_broker::BrokerError) -> Self {
        Self::Broker(err)
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
