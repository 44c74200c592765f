//! 업로드용 포트폴리오 스냅샷.
//!
//! 한 사이클 동안 조회한 포지션/시세/계약 메타데이터를 하나의 문서로
//! 합성합니다. 업로드 엔드포인트가 기대하는 형태 그대로 직렬화됩니다.

use crate::domain::{OptionContract, OptionPosition, OptionQuote, StockPosition, StockQuote};
use serde::{Deserialize, Serialize};

/// 포지션 섹션 (주식 + 옵션).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionSection {
    pub stocks: Vec<StockPosition>,
    pub options: Vec<OptionPosition>,
}

/// 시세 섹션 (주식 + 옵션).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketDataSection {
    pub stocks: Vec<StockQuote>,
    pub options: Vec<OptionQuote>,
}

/// 메타데이터 섹션 (옵션 계약).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataSection {
    pub options: Vec<OptionContract>,
}

/// 한 사이클의 합성 스냅샷.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    /// 보유 포지션
    pub positions: PositionSection,
    /// 포지션별 시세
    pub market_data: MarketDataSection,
    /// 옵션 계약 메타데이터
    pub metadata: MetadataSection,
}

impl PortfolioSnapshot {
    /// 스냅샷에 포함된 전체 레코드 수 반환.
    pub fn record_count(&self) -> usize {
        self.positions.stocks.len()
            + self.positions.options.len()
            + self.market_data.stocks.len()
            + self.market_data.options.len()
            + self.metadata.options.len()
    }

    /// 보유 포지션이 하나도 없는지 확인.
    pub fn is_empty(&self) -> bool {
        self.positions.stocks.is_empty() && self.positions.options.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_top_level_keys() {
        let snapshot = PortfolioSnapshot::default();
        let json = serde_json::to_value(&snapshot).unwrap();

        // 업로드 엔드포인트 계약: positions / marketData / metadata
        assert!(json.get("positions").is_some());
        assert!(json.get("marketData").is_some());
        assert!(json.get("metadata").is_some());
        assert!(json.get("market_data").is_none());
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = PortfolioSnapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.record_count(), 0);
    }
}
