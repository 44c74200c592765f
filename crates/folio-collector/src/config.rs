//! 환경변수 기반 설정 모듈.

use crate::Result;
use folio_broker::BrokerConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 스냅샷 업로드 엔드포인트
    pub upload_endpoint: String,
    /// 문서 저장소 디렉터리
    pub data_dir: PathBuf,
    /// 브로커 API 설정
    pub broker: BrokerConfig,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
}

/// 데몬 모드 설정
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 동기화 사이클 주기 (분 단위)
    pub interval_minutes: u64,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let upload_endpoint = std::env::var("UPLOAD_ENDPOINT").map_err(|_| {
            crate::error::CollectorError::Config(
                "UPLOAD_ENDPOINT 환경변수가 설정되지 않았습니다".to_string(),
            )
        })?;

        Ok(Self {
            upload_endpoint,
            data_dir: std::env::var("FOLIO_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            broker: BrokerConfig::from_env(),
            daemon: DaemonConfig {
                interval_minutes: env_var_parse("SYNC_INTERVAL_MINUTES", 10),
            },
        })
    }
}

impl DaemonConfig {
    /// 동기화 사이클 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daemon_interval() {
        let daemon = DaemonConfig {
            interval_minutes: 10,
        };
        assert_eq!(daemon.interval(), Duration::from_secs(600));
    }
}
