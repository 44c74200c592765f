//! 고정 주기 동기화 스케줄러.
//!
//! 시작 시 한 사이클을 즉시 실행하고, 이후 사이클 완료 시점부터 고정
//! 간격으로 반복합니다. 사이클은 순차적으로만 실행되므로 파이프라인이
//! 간격보다 오래 걸려도 겹치지 않습니다. 다음 틱은 지연될 뿐 건너뛰지
//! 않습니다.
//!
//! 사이클 내부에서 발생한 어떤 에러도 사이클 경계에서 잡혀 로그로만
//! 남습니다. 한 사이클의 실패가 타이머를 죽이는 일은 없으며, 재시도
//! 기회는 항상 다음 예약 틱입니다.

use crate::error::{CollectorError, Result};
use crate::pipeline::Pipeline;
use crate::stats::SyncStats;
use folio_broker::CredentialSource;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// 자격증명 갱신과 파이프라인 실행을 주기적으로 구동하는 스케줄러.
///
/// 타이머와 사이클 수명은 이 타입이 소유하고, 도메인 데이터는 소유하지
/// 않습니다. 협력자들은 생성 시점에 주입됩니다.
pub struct SyncScheduler {
    credentials: Arc<dyn CredentialSource>,
    pipeline: Arc<dyn Pipeline>,
    interval: Duration,
}

impl SyncScheduler {
    /// 새로운 스케줄러 생성.
    pub fn new(
        credentials: Arc<dyn CredentialSource>,
        pipeline: Arc<dyn Pipeline>,
        interval: Duration,
    ) -> Self {
        Self {
            credentials,
            pipeline,
            interval,
        }
    }

    /// 한 사이클 실행: 자격증명 갱신 → 파이프라인.
    ///
    /// 에러를 그대로 전파하므로 단발 실행(CLI `run-once`)에 적합합니다.
    pub async fn run_once(&self) -> Result<SyncStats> {
        let tokens = self
            .credentials
            .ensure_fresh_tokens()
            .await
            .map_err(CollectorError::Broker)?;
        let bearer = tokens.access_token.ok_or_else(|| {
            CollectorError::Config("갱신된 토큰 쌍에 access 토큰이 없습니다".to_string())
        })?;

        self.pipeline.run(&bearer).await
    }

    /// 데몬 루프: 즉시 한 사이클, 이후 완료 시점부터 `interval` 간격.
    ///
    /// 종료는 외부(프로세스 시그널)에서만 일어납니다.
    pub async fn run(&self) {
        loop {
            info!("=== 동기화 사이클 시작 ===");
            match self.run_once().await {
                Ok(stats) => stats.log_summary("스냅샷 동기화"),
                Err(e) => error!("동기화 사이클 실패: {}", e),
            }
            info!(
                "=== 사이클 종료, 다음 실행: {}초 후 ===",
                self.interval.as_secs()
            );
            tokio::time::sleep(self.interval).await;
        }
    }
}

// =============================================================================
// 테스트
// =============================================================================
