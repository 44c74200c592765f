//! 옵션 계약 메타데이터.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 옵션 계약 메타데이터.
///
/// 옵션 포지션이 참조하는 계약의 정적 속성(만기, 행사가 등)입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionContract {
    /// 옵션 체인 ID
    pub chain_id: String,
    /// 기초자산 심볼
    pub chain_symbol: String,
    /// 만기일
    pub expiration_date: NaiveDate,
    /// 계약 ID
    pub id: String,
    /// 행사가
    pub strike_price: Decimal,
    /// 계약 유형 ("call" | "put")
    #[serde(rename = "type")]
    pub contract_type: String,
    /// 계약 URL
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_contract_round_trip() {
        let contract = OptionContract {
            chain_id: "chain-1".to_string(),
            chain_symbol: "SPY".to_string(),
            expiration_date: NaiveDate::from_ymd_opt(2026, 9, 18).unwrap(),
            id: "contract-1".to_string(),
            strike_price: dec!(450),
            contract_type: "call".to_string(),
            url: "https://api.example.com/options/instruments/contract-1/".to_string(),
        };

        let json = serde_json::to_string(&contract).unwrap();
        let back: OptionContract = serde_json::from_str(&json).unwrap();
        assert_eq!(back, contract);
        assert!(json.contains("\"expirationDate\":\"2026-09-18\""));
    }
}
