//! 이름 기반 영속 JSON 문서 저장소.
//!
//! OAuth 토큰처럼 프로세스 재시작 후에도 살아남아야 하는 상태를
//! `<이름>.json` 파일로 유지합니다.
//!
//! # 동작 방식
//!
//! 1. `load` 호출 시 해당 이름의 파일 확인
//! 2. 파일이 없으면 기본값을 기록한 뒤 그대로 반환 (최초 초기화)
//! 3. 같은 이름에 대한 load/save는 전부 직렬화, 다른 이름끼리는 병렬 진행
//!
//! 타이머 주기와 수동 트리거가 겹쳐도 같은 문서에 대한
//! read-modify-write가 끼어들지 못하도록 이름별 락이 전체 호출 지점에
//! 걸쳐 보장됩니다.

use crate::error::{StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// 이름별 JSON 문서를 관리하는 저장소.
///
/// 문서 이름은 저장 위치(`<dir>/<이름>.json`)와 1:1로 대응합니다.
/// 락 맵은 문서 이름마다 지연 생성되며 제거되지 않습니다.
/// 실제 운용되는 문서 집합이 작고 고정적이기 때문입니다.
pub struct DocumentStore {
    dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl DocumentStore {
    /// 지정한 디렉터리를 기반으로 새 저장소 생성.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// 문서를 로드하고, 없으면 기본값을 기록 후 반환.
    ///
    /// 파일 부재는 오류가 아니며 `default`가 그 자리에서 영속화됩니다.
    /// 그 외 저장소 계층의 실패(권한, 디스크, 손상된 JSON)는 구분된
    /// `StoreError`로 호출자에게 그대로 전달되고, 같은 `load` 호출
    /// 안에서 초기화를 재시도하지 않습니다.
    pub async fn load<T>(&self, name: &str, default: T) -> StoreResult<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let lock = self.lock_for(name);
        let _guard = lock.lock().await;

        let path = self.document_path(name);
        match tokio::fs::read(&path).await {
            Ok(body) => serde_json::from_slice(&body).map_err(|e| StoreError::Corrupt {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(name = name, "문서 없음, 기본값으로 초기화");
                let body = serde_json::to_vec(&default)
                    .map_err(|e| StoreError::Serialize(e.to_string()))?;
                tokio::fs::write(&path, body)
                    .await
                    .map_err(|e| StoreError::Write {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    })?;
                Ok(default)
            }
            Err(e) => Err(StoreError::Read {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// 문서를 덮어쓰기 저장.
    ///
    /// `load`와 같은 이름별 상호 배제에 참여합니다.
    pub async fn save<T>(&self, name: &str, value: &T) -> StoreResult<()>
    where
        T: Serialize,
    {
        let lock = self.lock_for(name);
        let _guard = lock.lock().await;

        let path = self.document_path(name);
        let body = serde_json::to_vec(value).map_err(|e| StoreError::Serialize(e.to_string()))?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| StoreError::Write {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }

    /// 이름에서 결정적으로 파생되는 저장 경로 반환.
    fn document_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    /// 해당 이름의 락 반환 (없으면 생성).
    fn lock_for(&self, name: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().expect("document lock map poisoned");
        Arc::clone(
            locks
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }
}

// =============================================================================
// 테스트
// =============================================================================
