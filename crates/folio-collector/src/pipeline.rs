//! 스냅샷 수집/업로드 파이프라인.
//!
//! 한 사이클의 작업 순서:
//!
//! 1. 주식/옵션 포지션 조회 (동시)
//! 2. 포지션이 참조하는 시세와 옵션 계약 메타데이터 조회 (동시)
//! 3. 포트폴리오 스냅샷 합성
//! 4. 업로드 엔드포인트로 POST
//!
//! 시세/메타데이터 조회는 서로 독립적이고 부작용이 없으므로 업로드 전에
//! 합류하기만 하면 됩니다.

use crate::error::{CollectorError, Result};
use crate::stats::SyncStats;
use async_trait::async_trait;
use folio_broker::{extract_contract_id, RobinhoodClient};
use folio_core::{MarketDataSection, MetadataSection, PortfolioSnapshot, PositionSection};
use std::time::Instant;
use tracing::info;

/// 사이클마다 스케줄러가 구동하는 파이프라인 인터페이스.
#[async_trait]
pub trait Pipeline: Send + Sync {
    /// 이번 사이클의 bearer 토큰으로 한 번 실행.
    async fn run(&self, bearer: &str) -> Result<SyncStats>;
}

/// 포트폴리오 스냅샷 파이프라인.
pub struct SnapshotPipeline {
    broker: RobinhoodClient,
    http: reqwest::Client,
    upload_endpoint: String,
}

impl SnapshotPipeline {
    /// 새로운 파이프라인 생성.
    pub fn new(broker: RobinhoodClient, upload_endpoint: impl Into<String>) -> Self {
        Self {
            broker,
            http: reqwest::Client::new(),
            upload_endpoint: upload_endpoint.into(),
        }
    }

    /// 합성된 스냅샷을 업로드 엔드포인트로 전송.
    ///
    /// 사이클의 bearer 토큰은 업로드 요청에도 그대로 실립니다.
    async fn upload(&self, bearer: &str, snapshot: &PortfolioSnapshot) -> Result<()> {
        let response = self
            .http
            .post(&self.upload_endpoint)
            .bearer_auth(bearer)
            .json(snapshot)
            .send()
            .await
            .map_err(|e| CollectorError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollectorError::Upload(format!(
                "upload rejected: {} - {}",
                status, body
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Pipeline for SnapshotPipeline {
    async fn run(&self, bearer: &str) -> Result<SyncStats> {
        let started = Instant::now();

        info!("포지션 조회 시작");
        let (stocks, options) = tokio::try_join!(
            self.broker.get_stock_positions(bearer),
            self.broker.get_option_positions(bearer),
        )?;
        info!(stocks = stocks.len(), options = options.len(), "포지션 조회 완료");

        let stock_urls: Vec<String> = stocks.iter().map(|p| p.instrument.clone()).collect();
        let option_urls: Vec<String> = options.iter().map(|p| p.option.clone()).collect();
        let contract_ids = options
            .iter()
            .map(|p| extract_contract_id(&p.option))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        info!("시세/계약 메타데이터 조회 시작");
        let (stock_quotes, option_quotes, contracts) = tokio::try_join!(
            self.broker.get_stock_quotes(bearer, &stock_urls),
            self.broker.get_option_quotes(bearer, &option_urls),
            self.broker.get_option_contracts(bearer, &contract_ids),
        )?;

        let snapshot = PortfolioSnapshot {
            positions: PositionSection { stocks, options },
            market_data: MarketDataSection {
                stocks: stock_quotes,
                options: option_quotes,
            },
            metadata: MetadataSection { options: contracts },
        };

        info!(records = snapshot.record_count(), "스냅샷 업로드 시작");
        self.upload(bearer, &snapshot).await?;
        info!("스냅샷 업로드 완료");

        Ok(SyncStats {
            stock_positions: snapshot.positions.stocks.len(),
            option_positions: snapshot.positions.options.len(),
            stock_quotes: snapshot.market_data.stocks.len(),
            option_quotes: snapshot.market_data.options.len(),
            option_contracts: snapshot.metadata.options.len(),
            elapsed: started.elapsed(),
        })
    }
}
