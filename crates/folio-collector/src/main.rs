//! FolioSync 포트폴리오 수집 데몬 CLI.

use clap::{Parser, Subcommand};
use folio_broker::{
    CredentialManager, RobinhoodClient, RobinhoodTokenExchange, TokenOverrides,
};
use folio_collector::{CollectorConfig, SnapshotPipeline, SyncScheduler};
use folio_core::DocumentStore;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio-collector")]
#[command(about = "FolioSync Portfolio Snapshot Collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 한 사이클만 실행 (토큰 갱신 → 스냅샷 업로드)
    RunOnce,

    /// 데몬 모드: 주기적으로 동기화 사이클 실행
    Daemon,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "folio_collector={},folio_broker={},folio_core={}",
                    cli.log_level, cli.log_level, cli.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("FolioSync Collector 시작");

    // 설정 로드
    let config = CollectorConfig::from_env()?;
    tracing::debug!(
        upload_endpoint = %config.upload_endpoint,
        data_dir = %config.data_dir.display(),
        "설정 로드 완료"
    );

    // 구성 요소 초기화
    let store = Arc::new(DocumentStore::new(&config.data_dir));
    let exchange = Arc::new(RobinhoodTokenExchange::new(config.broker.clone())?);
    let credentials = Arc::new(CredentialManager::new(
        store,
        exchange,
        TokenOverrides::from_config(&config.broker),
    ));
    let client = RobinhoodClient::new(config.broker.clone())?;
    let pipeline = Arc::new(SnapshotPipeline::new(client, config.upload_endpoint.clone()));
    let scheduler = SyncScheduler::new(credentials, pipeline, config.daemon.interval());

    // 명령 실행
    match cli.command {
        Commands::RunOnce => {
            let stats = scheduler.run_once().await?;
            stats.log_summary("스냅샷 동기화");
        }
        Commands::Daemon => {
            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}분) ===",
                config.daemon.interval_minutes
            );
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("종료 신호 수신, 데몬 종료 중...");
                }
                _ = scheduler.run() => {}
            }
        }
    }

    tracing::info!("FolioSync Collector 종료");

    Ok(())
}
