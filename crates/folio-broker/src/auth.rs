//! Robinhood OAuth 토큰 수명 주기 모듈.
//!
//! 처리 기능:
//! - refresh 토큰을 새 토큰 쌍으로 교환 (POST /oauth2/token/)
//! - 교환된 토큰 쌍의 문서 저장소 영속화
//! - 폴백 체인: 저장된 refresh 토큰 → 환경 변수로 주입된 토큰
//!
//! 프로세스가 재시작돼도 마지막으로 교환에 성공한 쌍이 `tokens` 문서에
//! 남아 있으므로 폴백 경로 없이 다음 사이클을 이어갈 수 있습니다.

use crate::config::BrokerConfig;
use crate::error::{BrokerError, BrokerResult};
use async_trait::async_trait;
use folio_core::DocumentStore;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// 토큰 쌍이 영속화되는 문서 이름.
const TOKEN_DOCUMENT: &str = "tokens";

/// bearer + refresh 토큰 쌍.
///
/// 첫 교환이 성공하기 전에는 두 필드 모두 비어 있을 수 있습니다.
/// 사이클이 성공적으로 끝난 뒤에는 항상 두 필드가 채워져 있습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// API 요청에 사용하는 bearer 토큰
    pub access_token: Option<String>,
    /// 다음 교환에 사용하는 refresh 토큰
    pub refresh_token: Option<String>,
}

impl TokenPair {
    /// 두 필드가 모두 채워진 쌍 생성.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }
}

/// 토큰 교환 응답.
///
/// 두 필드 중 하나라도 빠지면 역직렬화가 실패하고 교환 실패로 처리됩니다.
#[derive(Debug, Clone, Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
    refresh_token: String,
}

/// 토큰 교환 협력자 인터페이스.
///
/// refresh 토큰을 새 쌍으로 바꿔 오는 외부 API 호출을 추상화합니다.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// refresh 토큰을 새 토큰 쌍으로 교환.
    async fn exchange(&self, refresh_token: &str) -> BrokerResult<TokenPair>;
}

/// Robinhood 토큰 교환 클라이언트.
pub struct RobinhoodTokenExchange {
    config: BrokerConfig,
    client: Client,
}

impl RobinhoodTokenExchange {
    /// 새로운 교환 클라이언트 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `BrokerError::NetworkError`를 반환합니다.
    pub fn new(config: BrokerConfig) -> BrokerResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BrokerError::NetworkError(format!("HTTP client 생성 실패: {}", e)))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl TokenExchange for RobinhoodTokenExchange {
    async fn exchange(&self, refresh_token: &str) -> BrokerResult<TokenPair> {
        let url = format!("{}/oauth2/token/", self.config.api_base_url);

        #[derive(Serialize)]
        struct TokenRequest<'a> {
            client_id: &'a str,
            grant_type: &'static str,
            refresh_token: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            device_token: Option<&'a str>,
        }

        let request_body = TokenRequest {
            client_id: &self.config.client_id,
            grant_type: "refresh_token",
            refresh_token,
            device_token: self.config.device_token.as_deref(),
        };

        info!("Requesting new access token...");

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| BrokerError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BrokerError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Token exchange failed: {} - {}", status, body);
            return Err(BrokerError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let token_resp: TokenExchangeResponse = serde_json::from_str(&body).map_err(|e| {
            BrokerError::ParseError(format!("Failed to parse token response: {}", e))
        })?;

        info!("Access token obtained");

        Ok(TokenPair::new(
            token_resp.access_token,
            token_resp.refresh_token,
        ))
    }
}

/// 환경 변수로 주입된 폴백 토큰.
#[derive(Debug, Clone, Default)]
pub struct TokenOverrides {
    /// access 토큰 폴백
    pub access_token: Option<String>,
    /// refresh 토큰 폴백
    pub refresh_token: Option<String>,
}

impl TokenOverrides {
    /// 브로커 설정에서 폴백 토큰 추출.
    pub fn from_config(config: &BrokerConfig) -> Self {
        Self {
            access_token: config.access_token_override.clone(),
            refresh_token: config.refresh_token_override.clone(),
        }
    }
}

/// 사이클마다 유효한 bearer 토큰을 공급하는 소스.
///
/// 스케줄러가 의존하는 인터페이스입니다.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// 현재 유효한 토큰 쌍 반환, 필요시 갱신.
    async fn ensure_fresh_tokens(&self) -> BrokerResult<TokenPair>;
}

/// 토큰 쌍의 수명 주기를 관리하는 자격증명 관리자.
///
/// 영속화는 전적으로 `DocumentStore`를 거치고, 사이클 사이의 메모리 내
/// 정본(canonical) 토큰 쌍은 이 타입이 소유합니다.
pub struct CredentialManager {
    store: Arc<DocumentStore>,
    exchange: Arc<dyn TokenExchange>,
    overrides: TokenOverrides,
    current: RwLock<Option<TokenPair>>,
}

impl CredentialManager {
    /// 새로운 자격증명 관리자 생성.
    pub fn new(
        store: Arc<DocumentStore>,
        exchange: Arc<dyn TokenExchange>,
        overrides: TokenOverrides,
    ) -> Self {
        Self {
            store,
            exchange,
            overrides,
            current: RwLock::new(None),
        }
    }

    /// 현재 메모리에 올라와 있는 토큰 쌍 반환 (갱신 없이).
    pub async fn current_tokens(&self) -> Option<TokenPair> {
        let current = self.current.read().await;
        current.clone()
    }

    /// 교환에 성공한 쌍을 영속화하고 메모리 정본으로 채택.
    async fn adopt(&self, pair: TokenPair) -> BrokerResult<TokenPair> {
        self.store.save(TOKEN_DOCUMENT, &pair).await?;
        let mut current = self.current.write().await;
        *current = Some(pair.clone());
        Ok(pair)
    }
}

#[async_trait]
impl CredentialSource for CredentialManager {
    /// 이번 사이클에 쓸 유효한 토큰 쌍을 확보.
    ///
    /// 1. `tokens` 문서에서 저장된 쌍을 로드
    /// 2. 1차: 저장된 refresh 토큰으로 교환 시도
    /// 3. 폴백: 환경 변수 토큰을 채택한 뒤 그 refresh 토큰으로 재교환.
    ///    refresh 폴백이 없으면 교환 시도 없이 설정 오류.
    /// 4. 교환에 성공한 쌍은 반환 전에 영속화
    ///
    /// 한 호출 안에서의 재시도는 1차 → 폴백이 전부이며, 그다음 기회는
    /// 다음 예약 사이클입니다.
    async fn ensure_fresh_tokens(&self) -> BrokerResult<TokenPair> {
        let stored: TokenPair = self.store.load(TOKEN_DOCUMENT, TokenPair::default()).await?;

        // 1차: 저장된 refresh 토큰
        if let Some(refresh_token) = stored.refresh_token.as_deref() {
            match self.exchange.exchange(refresh_token).await {
                Ok(pair) => return self.adopt(pair).await,
                Err(e) => {
                    warn!("저장된 refresh 토큰 교환 실패, 환경 변수 토큰으로 폴백: {}", e);
                }
            }
        } else {
            info!("저장된 refresh 토큰 없음, 환경 변수 토큰 사용");
        }

        // 폴백: 환경 변수로 주입된 토큰 쌍
        let refresh_token = self.overrides.refresh_token.clone().ok_or_else(|| {
            BrokerError::MissingCredentials(
                "ROBINHOOD_REFRESH_TOKEN 환경변수가 설정되지 않았습니다".to_string(),
            )
        })?;

        // 주입된 쌍을 먼저 채택하고, 그 refresh 토큰으로 재교환
        {
            let mut current = self.current.write().await;
            *current = Some(TokenPair {
                access_token: self.overrides.access_token.clone(),
                refresh_token: Some(refresh_token.clone()),
            });
        }

        let pair = self.exchange.exchange(&refresh_token).await?;
        self.adopt(pair).await
    }
}

// =============================================================================
// 테스트
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// 프로그래밍 가능한 교환 결과를 돌려주는 테스트 더블.
    struct FakeExchange {
        responses: Mutex<VecDeque<BrokerResult<TokenPair>>>,
        calls: AtomicUsize,
        refresh_tokens_seen: Mutex<Vec<String>>,
    }

    impl FakeExchange {
        fn new(responses: Vec<BrokerResult<TokenPair>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
                refresh_tokens_seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn refresh_tokens_seen(&self) -> Vec<String> {
            self.refresh_tokens_seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TokenExchange for FakeExchange {
        async fn exchange(&self, refresh_token: &str) -> BrokerResult<TokenPair> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.refresh_tokens_seen
                .lock()
                .unwrap()
                .push(refresh_token.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(BrokerError::NetworkError("no scripted response".to_string()))
                })
        }
    }

    fn manager(
        dir: &std::path::Path,
        exchange: Arc<FakeExchange>,
        overrides: TokenOverrides,
    ) -> (Arc<DocumentStore>, CredentialManager) {
        let store = Arc::new(DocumentStore::new(dir));
        let manager = CredentialManager::new(Arc::clone(&store), exchange, overrides);
        (store, manager)
    }

    #[tokio::test]
    async fn test_primary_exchange_persists_new_pair() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(DocumentStore::new(dir.path()));
        store
            .save("tokens", &TokenPair::new("old-access", "old-refresh"))
            .await
            .unwrap();

        let exchange = FakeExchange::new(vec![Ok(TokenPair::new("new-access", "new-refresh"))]);
        let manager = CredentialManager::new(
            Arc::clone(&store),
            exchange.clone(),
            TokenOverrides::default(),
        );

        let pair = manager.ensure_fresh_tokens().await.unwrap();
        assert_eq!(pair, TokenPair::new("new-access", "new-refresh"));
        assert_eq!(exchange.refresh_tokens_seen(), vec!["old-refresh"]);

        let persisted: TokenPair = store.load("tokens", TokenPair::default()).await.unwrap();
        assert_eq!(persisted, pair);
    }

    #[tokio::test]
    async fn test_second_call_uses_persisted_pair_not_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let exchange = FakeExchange::new(vec![
            Ok(TokenPair::new("access-1", "refresh-1")),
            Ok(TokenPair::new("access-2", "refresh-2")),
        ]);
        let overrides = TokenOverrides {
            access_token: None,
            refresh_token: Some("env-refresh".to_string()),
        };
        let (_store, manager) = manager(dir.path(), exchange.clone(), overrides);

        // 첫 호출: 저장된 토큰이 없으므로 환경 변수 refresh 사용
        let first = manager.ensure_fresh_tokens().await.unwrap();
        assert_eq!(first, TokenPair::new("access-1", "refresh-1"));

        // 두 번째 호출: 영속화된 refresh-1을 사용해야 한다
        let second = manager.ensure_fresh_tokens().await.unwrap();
        assert_eq!(second, TokenPair::new("access-2", "refresh-2"));
        assert_eq!(
            exchange.refresh_tokens_seen(),
            vec!["env-refresh", "refresh-1"]
        );
    }

    #[tokio::test]
    async fn test_missing_refresh_override_is_config_error_without_exchange() {
        let dir = tempfile::tempdir().unwrap();
        let exchange = FakeExchange::new(vec![]);
        let (_store, manager) = manager(dir.path(), exchange.clone(), TokenOverrides::default());

        let result = manager.ensure_fresh_tokens().await;
        assert!(matches!(result, Err(BrokerError::MissingCredentials(_))));
        assert_eq!(exchange.calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_primary_falls_back_to_override() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(DocumentStore::new(dir.path()));
        store
            .save("tokens", &TokenPair::new("stale-access", "stale-refresh"))
            .await
            .unwrap();

        let exchange = FakeExchange::new(vec![
            Err(BrokerError::ApiError {
                status: 401,
                message: "invalid_grant".to_string(),
            }),
            Ok(TokenPair::new("fallback-access", "fallback-refresh")),
        ]);
        let overrides = TokenOverrides {
            access_token: Some("env-access".to_string()),
            refresh_token: Some("env-refresh".to_string()),
        };
        let manager = CredentialManager::new(Arc::clone(&store), exchange.clone(), overrides);

        let pair = manager.ensure_fresh_tokens().await.unwrap();
        assert_eq!(pair, TokenPair::new("fallback-access", "fallback-refresh"));
        assert_eq!(
            exchange.refresh_tokens_seen(),
            vec!["stale-refresh", "env-refresh"]
        );

        let persisted: TokenPair = store.load("tokens", TokenPair::default()).await.unwrap();
        assert_eq!(persisted, pair);
    }

    #[tokio::test]
    async fn test_fallback_exchange_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let exchange = FakeExchange::new(vec![Err(BrokerError::NetworkError(
            "connection refused".to_string(),
        ))]);
        let overrides = TokenOverrides {
            access_token: None,
            refresh_token: Some("env-refresh".to_string()),
        };
        let (store, manager) = manager(dir.path(), exchange.clone(), overrides);

        let result = manager.ensure_fresh_tokens().await;
        assert!(matches!(result, Err(BrokerError::NetworkError(_))));
        assert_eq!(exchange.calls(), 1);

        // 실패한 폴백 쌍은 영속화되지 않는다
        let persisted: TokenPair = store.load("tokens", TokenPair::default()).await.unwrap();
        assert_eq!(persisted, TokenPair::default());
    }

    #[tokio::test]
    async fn test_end_to_end_example_from_empty_store() {
        // 저장소 비어 있음, 폴백 R1, 교환은 R1 → {B1, R2}
        let dir = tempfile::tempdir().unwrap();
        let exchange = FakeExchange::new(vec![Ok(TokenPair::new("B1", "R2"))]);
        let overrides = TokenOverrides {
            access_token: None,
            refresh_token: Some("R1".to_string()),
        };
        let (store, manager) = manager(dir.path(), exchange.clone(), overrides);

        let pair = manager.ensure_fresh_tokens().await.unwrap();
        assert_eq!(pair, TokenPair::new("B1", "R2"));
        assert_eq!(exchange.refresh_tokens_seen(), vec!["R1"]);

        let persisted: TokenPair = store.load("tokens", TokenPair::default()).await.unwrap();
        assert_eq!(persisted, TokenPair::new("B1", "R2"));
    }

    #[tokio::test]
    async fn test_exchange_client_parses_token_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth2/token/")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "grant_type": "refresh_token",
                "refresh_token": "R1",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"B1","refresh_token":"R2","expires_in":86400}"#)
            .create_async()
            .await;

        let config = BrokerConfig::default().with_api_base_url(server.url());
        let exchange = RobinhoodTokenExchange::new(config).unwrap();

        let pair = exchange.exchange("R1").await.unwrap();
        assert_eq!(pair, TokenPair::new("B1", "R2"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_exchange_client_malformed_response_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth2/token/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"B1"}"#)
            .create_async()
            .await;

        let config = BrokerConfig::default().with_api_base_url(server.url());
        let exchange = RobinhoodTokenExchange::new(config).unwrap();

        let result = exchange.exchange("R1").await;
        assert!(matches!(result, Err(BrokerError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_exchange_client_error_status_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth2/token/")
            .with_status(401)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;

        let config = BrokerConfig::default().with_api_base_url(server.url());
        let exchange = RobinhoodTokenExchange::new(config).unwrap();

        let result = exchange.exchange("R1").await;
        match result {
            Err(BrokerError::ApiError { status, .. }) => assert_eq!(status, 401),
            other => panic!("expected ApiError, got {:?}", other),
        }
    }
}
