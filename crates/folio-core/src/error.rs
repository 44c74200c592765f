//! 문서 저장소 오류 타입.

use thiserror::Error;

/// 문서 저장소 관련 오류.
///
/// 문서가 존재하지 않는 경우는 오류가 아니라 기본값 초기화 경로이므로
/// 변형(variant)으로 표현하지 않습니다.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 문서 읽기 오류 (파일 없음 제외)
    #[error("Could not read document at {path}: {message}")]
    Read { path: String, message: String },

    /// 문서 쓰기 오류
    #[error("Could not write document at {path}: {message}")]
    Write { path: String, message: String },

    /// 기존 문서의 내용이 손상됨 (JSON 파싱 실패)
    #[error("Corrupt document at {path}: {message}")]
    Corrupt { path: String, message: String },

    /// 값 직렬화 오류
    #[error("Serialization error: {0}")]
    Serialize(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
