//! Robinhood 연결 및 자격증명 수명 주기 처리.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - `BrokerConfig`: 환경 변수 기반 API 설정
//! - `CredentialManager`: 토큰 쌍 갱신 및 영속화 (1차 저장 토큰 → 환경 변수 폴백)
//! - `RobinhoodClient`: 포지션/시세/옵션 계약 조회 REST 클라이언트
//! - 에러 처리

pub mod auth;
pub mod client;
pub mod config;
pub mod error;

pub use auth::{
    CredentialManager, CredentialSource, RobinhoodTokenExchange, TokenExchange, TokenOverrides,
    TokenPair,
};
pub use client::{extract_contract_id, RobinhoodClient};
pub use config::BrokerConfig;
pub use error::*;
