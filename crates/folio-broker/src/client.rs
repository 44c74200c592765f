//! Robinhood REST API 클라이언트.
//!
//! 이 모듈은 포트폴리오 스냅샷 합성에 필요한 조회 API를 제공합니다.
//!
//! # 지원 기능
//!
//! - 주식/옵션 포지션 조회 (0이 아닌 수량만)
//! - 주식/옵션 시세 조회
//! - 옵션 계약 메타데이터 조회
//!
//! 모든 수치 필드는 문자열로 내려오므로 Decimal 변환 헬퍼를 거칩니다.
//! bearer 토큰은 사이클마다 자격증명 관리자가 공급한 것을 인자로 받습니다.

use crate::config::BrokerConfig;
use crate::error::{BrokerError, BrokerResult};
use chrono::{DateTime, Utc};
use folio_core::{OptionContract, OptionPosition, OptionQuote, StockPosition, StockQuote};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error};

/// Robinhood REST API 클라이언트.
pub struct RobinhoodClient {
    config: BrokerConfig,
    client: Client,
}

impl RobinhoodClient {
    /// 새로운 클라이언트 생성.
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

    // ========================================
    // Position APIs (포지션 조회)
    // ========================================

    /// 주식 포지션 조회 (수량이 0이 아닌 것만).
    pub async fn get_stock_positions(&self, bearer: &str) -> BrokerResult<Vec<StockPosition>> {
        let url = format!("{}/positions/?nonzero=true", self.config.api_base_url);
        let raw: Vec<RawStockPosition> = self.get_results(bearer, &url, "stock positions").await?;
        Ok(raw.into_iter().map(RawStockPosition::to_position).collect())
    }

    /// 옵션 포지션 조회 (수량이 0이 아닌 것만).
    pub async fn get_option_positions(&self, bearer: &str) -> BrokerResult<Vec<OptionPosition>> {
        let url = format!(
            "{}/options/positions/?nonzero=True",
            self.config.api_base_url
        );
        let raw: Vec<RawOptionPosition> = self.get_results(bearer, &url, "option positions").await?;
        Ok(raw.into_iter().map(RawOptionPosition::to_position).collect())
    }

    // ========================================
    // Market Data APIs (시세 조회)
    // ========================================

    /// 주식 시세 조회.
    ///
    /// 입력이 비어 있으면 요청 없이 빈 벡터를 반환합니다.
    pub async fn get_stock_quotes(
        &self,
        bearer: &str,
        instrument_urls: &[String],
    ) -> BrokerResult<Vec<StockQuote>> {
        if instrument_urls.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!(
            "{}/marketdata/quotes/?instruments={}",
            self.config.api_base_url,
            instrument_urls.join(",")
        );
        let raw: Vec<RawStockQuote> = self.get_results(bearer, &url, "stock quotes").await?;
        Ok(raw.into_iter().map(RawStockQuote::to_quote).collect())
    }

    /// 옵션 시세 조회.
    ///
    /// 입력이 비어 있으면 요청 없이 빈 벡터를 반환합니다.
    pub async fn get_option_quotes(
        &self,
        bearer: &str,
        option_urls: &[String],
    ) -> BrokerResult<Vec<OptionQuote>> {
        if option_urls.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!(
            "{}/marketdata/options/?instruments={}",
            self.config.api_base_url,
            option_urls.join(",")
        );
        let raw: Vec<RawOptionQuote> = self.get_results(bearer, &url, "option quotes").await?;
        Ok(raw.into_iter().map(RawOptionQuote::to_quote).collect())
    }

    /// 옵션 계약 메타데이터 조회.
    ///
    /// 입력이 비어 있으면 요청 없이 빈 벡터를 반환합니다.
    pub async fn get_option_contracts(
        &self,
        bearer: &str,
        ids: &[String],
    ) -> BrokerResult<Vec<OptionContract>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!(
            "{}/options/instruments/?ids={}",
            self.config.api_base_url,
            ids.join(",")
        );
        let raw: Vec<RawOptionContract> = self.get_results(bearer, &url, "option contracts").await?;
        Ok(raw.into_iter().map(RawOptionContract::to_contract).collect())
    }

    /// 공통 조회 처리: 요청 → 상태 확인 → `results` 배열 파싱.
    async fn get_results<T: DeserializeOwned>(
        &self,
        bearer: &str,
        url: &str,
        context: &str,
    ) -> BrokerResult<Vec<T>> {
        let response = self
            .client
            .get(url)
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(|e| BrokerError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BrokerError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("{} inquiry failed: {} - {}", context, status, body);
            return Err(BrokerError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        debug!("{} response: {}", context, body);

        let page: ResultsPage<T> = serde_json::from_str(&body).map_err(|e| {
            BrokerError::ParseError(format!("Failed to parse {} response: {}", context, e))
        })?;
        Ok(page.results)
    }
}

/// 옵션 계약 URL에서 계약 ID 추출.
///
/// `.../options/instruments/<id>/` 형식을 기대합니다.
pub fn extract_contract_id(option_url: &str) -> BrokerResult<String> {
    const MARKER: &str = "instruments/";

    let start = option_url
        .find(MARKER)
        .map(|index| index + MARKER.len())
        .ok_or_else(|| invalid_option_url(option_url))?;
    let rest = &option_url[start..];
    let end = rest.find('/').ok_or_else(|| invalid_option_url(option_url))?;

    if end == 0 {
        return Err(invalid_option_url(option_url));
    }
    Ok(rest[..end].to_string())
}

fn invalid_option_url(option_url: &str) -> BrokerError {
    BrokerError::ParseError(format!(
        "Could not extract option id from option url: {}",
        option_url
    ))
}

// ========================================
// 응답 타입
// ========================================

/// 목록 응답 래퍼.
#[derive(Debug, Deserialize)]
struct ResultsPage<T> {
    results: Vec<T>,
}

/// 주식 포지션 원본 레코드.
#[derive(Debug, Clone, Deserialize)]
struct RawStockPosition {
    account: String,
    #[serde(deserialize_with = "deserialize_decimal")]
    quantity: Decimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    average_buy_price: Decimal,
    instrument: String,
}

impl RawStockPosition {
    /// 도메인 레코드로 변환.
    fn to_position(self) -> StockPosition {
        StockPosition {
            account: self.account,
            quantity: self.quantity,
            average_buy_price: self.average_buy_price,
            instrument: self.instrument,
        }
    }
}

/// 옵션 포지션 원본 레코드.
#[derive(Debug, Clone, Deserialize)]
struct RawOptionPosition {
    account: String,
    #[serde(deserialize_with = "deserialize_decimal")]
    average_price: Decimal,
    chain_id: String,
    chain_symbol: String,
    id: String,
    option: String,
    #[serde(deserialize_with = "deserialize_decimal")]
    quantity: Decimal,
    #[serde(rename = "type")]
    position_type: String,
}

impl RawOptionPosition {
    fn to_position(self) -> OptionPosition {
        OptionPosition {
            account: self.account,
            average_price: self.average_price,
            chain_id: self.chain_id,
            chain_symbol: self.chain_symbol,
            id: self.id,
            option: self.option,
            quantity: self.quantity,
            position_type: self.position_type,
        }
    }
}

/// 주식 시세 원본 레코드.
#[derive(Debug, Clone, Deserialize)]
struct RawStockQuote {
    #[serde(deserialize_with = "deserialize_decimal")]
    last_trade_price: Decimal,
    #[serde(default, deserialize_with = "deserialize_decimal_opt")]
    last_extended_hours_trade_price: Option<Decimal>,
    symbol: String,
    updated_at: DateTime<Utc>,
    instrument: String,
}

impl RawStockQuote {
    fn to_quote(self) -> StockQuote {
        StockQuote {
            last_trade_price: self.last_trade_price,
            last_extended_hours_trade_price: self.last_extended_hours_trade_price,
            symbol: self.symbol,
            updated_at: self.updated_at,
            instrument: self.instrument,
        }
    }
}

/// 옵션 시세 원본 레코드.
#[derive(Debug, Clone, Deserialize)]
struct RawOptionQuote {
    #[serde(deserialize_with = "deserialize_decimal")]
    adjusted_mark_price: Decimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    break_even_price: Decimal,
    instrument: String,
}

impl RawOptionQuote {
    fn to_quote(self) -> OptionQuote {
        OptionQuote {
            adjusted_mark_price: self.adjusted_mark_price,
            break_even_price: self.break_even_price,
            instrument: self.instrument,
        }
    }
}

/// 옵션 계약 원본 레코드.
#[derive(Debug, Clone, Deserialize)]
struct RawOptionContract {
    chain_id: String,
    chain_symbol: String,
    expiration_date: chrono::NaiveDate,
    id: String,
    #[serde(deserialize_with = "deserialize_decimal")]
    strike_price: Decimal,
    #[serde(rename = "type")]
    contract_type: String,
    url: String,
}

impl RawOptionContract {
    fn to_contract(self) -> OptionContract {
        OptionContract {
            chain_id: self.chain_id,
            chain_symbol: self.chain_symbol,
            expiration_date: self.expiration_date,
            id: self.id,
            strike_price: self.strike_price,
            contract_type: self.contract_type,
            url: self.url,
        }
    }
}

/// 문자열로 내려오는 수치 필드를 Decimal로 역직렬화.
fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = String::deserialize(deserializer)?;
    if s.is_empty() || s == "-" {
        return Ok(Decimal::ZERO);
    }
    s.parse::<Decimal>()
        .map_err(|_| serde::de::Error::custom(format!("Invalid decimal: {}", s)))
}

/// null 가능 수치 필드용 변형.
fn deserialize_decimal_opt<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(s) if s.is_empty() || s == "-" => Ok(None),
        Some(s) => s
            .parse::<Decimal>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("Invalid decimal: {}", s))),
    }
}

// =============================================================================
// 테스트
// =============================================================================
