//! Scheduled portfolio snapshot collector for FolioSync.
//!
//! 이 crate는 주기적으로 포트폴리오 스냅샷을 수집/업로드하는 바이너리를 제공합니다:
//! - 자격증명 갱신 (저장 토큰 → 환경 변수 폴백)
//! - 포지션/시세/옵션 계약 조회 및 스냅샷 합성
//! - 업로드 엔드포인트로 전송
//! - 사이클 실패에도 죽지 않는 고정 주기 스케줄러

pub mod config;
pub mod error;
pub mod pipeline;
pub mod scheduler;
pub mod stats;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use pipeline::{Pipeline, SnapshotPipeline};
pub use scheduler::SyncScheduler;
pub use stats::SyncStats;
