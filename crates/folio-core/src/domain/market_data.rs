//! 시세 데이터 타입.
//!
//! - `StockQuote` - 주식 실시간 시세
//! - `OptionQuote` - 옵션 시세

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 주식 시세.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuote {
    /// 정규장 최종 체결가
    pub last_trade_price: Decimal,
    /// 시간외 최종 체결가 (정규장 중에는 없음)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_extended_hours_trade_price: Option<Decimal>,
    /// 심볼
    pub symbol: String,
    /// 시세 갱신 시각
    pub updated_at: DateTime<Utc>,
    /// 종목(instrument) URL
    pub instrument: String,
}

/// 옵션 시세.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionQuote {
    /// 조정 마크 가격
    pub adjusted_mark_price: Decimal,
    /// 손익분기 가격
    pub break_even_price: Decimal,
    /// 옵션 계약 URL
    pub instrument: String,
}
