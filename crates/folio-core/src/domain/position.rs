//! 계좌 포지션 레코드.
//!
//! 이 모듈은 증권사 계좌에서 조회한 보유 내역 타입을 정의합니다:
//! - `StockPosition` - 주식 보유 내역
//! - `OptionPosition` - 옵션 보유 내역

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 주식 보유 내역.
///
/// 업로드 페이로드에서는 camelCase 필드명으로 직렬화됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPosition {
    /// 계좌 URL
    pub account: String,
    /// 보유 수량
    pub quantity: Decimal,
    /// 평균 매수 단가
    pub average_buy_price: Decimal,
    /// 종목(instrument) URL
    pub instrument: String,
}

/// 옵션 보유 내역.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionPosition {
    /// 계좌 URL
    pub account: String,
    /// 평균 체결 단가
    pub average_price: Decimal,
    /// 옵션 체인 ID
    pub chain_id: String,
    /// 기초자산 심볼
    pub chain_symbol: String,
    /// 포지션 ID
    pub id: String,
    /// 옵션 계약 URL
    pub option: String,
    /// 보유 수량 (계약 수)
    pub quantity: Decimal,
    /// 포지션 방향 ("long" | "short")
    #[serde(rename = "type")]
    pub position_type: String,
}
