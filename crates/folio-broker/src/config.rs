//! Robinhood API 설정.
//!
//! 토큰 교환에는 고정 client_id가 사용되고, 일부 계정은 device_token이
//! 추가로 필요합니다. 환경 변수로 주입된 access/refresh 토큰 쌍은
//! 저장된 토큰 교환이 실패했을 때의 폴백 경로로만 쓰입니다.

use serde::{Deserialize, Serialize};

/// 기본 REST API 주소.
pub const DEFAULT_API_BASE_URL: &str = "https://api.robinhood.com";

/// Robinhood 웹 클라이언트의 공개 OAuth client_id.
pub const DEFAULT_CLIENT_ID: &str = "c82SH0WZOsabOXGP2sxqcj34FxkvfnWRZBKlBjFS";

/// Robinhood API 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// REST API 기본 URL
    pub api_base_url: String,
    /// OAuth client_id
    pub client_id: String,
    /// 기기 토큰 (일부 계정의 토큰 교환에 필요)
    pub device_token: Option<String>,
    /// 환경 변수로 주입된 access 토큰 (폴백용)
    pub access_token_override: Option<String>,
    /// 환경 변수로 주입된 refresh 토큰 (폴백용)
    pub refresh_token_override: Option<String>,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            device_token: None,
            access_token_override: None,
            refresh_token_override: None,
            timeout_secs: 30,
        }
    }
}

impl BrokerConfig {
    /// 환경 변수에서 설정 생성.
    ///
    /// # 환경 변수
    /// - `ROBINHOOD_API_URL`: API 기본 URL (기본값: 공식 엔드포인트)
    /// - `ROBINHOOD_CLIENT_ID`: OAuth client_id (기본값: 공개 웹 클라이언트 ID)
    /// - `ROBINHOOD_DEVICE_TOKEN`: 기기 토큰
    /// - `ROBINHOOD_ACCESS_TOKEN` / `ROBINHOOD_REFRESH_TOKEN`: 폴백 토큰 쌍
    pub fn from_env() -> Self {
        Self {
            api_base_url: std::env::var("ROBINHOOD_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            client_id: std::env::var("ROBINHOOD_CLIENT_ID")
                .unwrap_or_else(|_| DEFAULT_CLIENT_ID.to_string()),
            device_token: std::env::var("ROBINHOOD_DEVICE_TOKEN").ok(),
            access_token_override: std::env::var("ROBINHOOD_ACCESS_TOKEN").ok(),
            refresh_token_override: std::env::var("ROBINHOOD_REFRESH_TOKEN").ok(),
            timeout_secs: 30,
        }
    }

    /// API 기본 URL 설정.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// 폴백 토큰 쌍 설정.
    pub fn with_token_overrides(
        mut self,
        access_token: Option<String>,
        refresh_token: Option<String>,
    ) -> Self {
        self.access_token_override = access_token;
        self.refresh_token_override = refresh_token;
        self
    }

    /// 기기 토큰 설정.
    pub fn with_device_token(mut self, device_token: impl Into<String>) -> Self {
        self.device_token = Some(device_token.into());
        self
    }
}
