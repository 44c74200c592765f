//! 사이클 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 한 동기화 사이클의 수집 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStats {
    /// 주식 포지션 수
    pub stock_positions: usize,
    /// 옵션 포지션 수
    pub option_positions: usize,
    /// 주식 시세 수
    pub stock_quotes: usize,
    /// 옵션 시세 수
    pub option_quotes: usize,
    /// 옵션 계약 메타데이터 수
    pub option_contracts: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SyncStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 업로드된 총 레코드 수
    pub fn total_records(&self) -> usize {
        self.stock_positions
            + self.option_positions
            + self.stock_quotes
            + self.option_quotes
            + self.option_contracts
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            stock_positions = self.stock_positions,
            option_positions = self.option_positions,
            stock_quotes = self.stock_quotes,
            option_quotes = self.option_quotes,
            option_contracts = self.option_contracts,
            total = self.total_records(),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "동기화 완료"
        );
    }
}
