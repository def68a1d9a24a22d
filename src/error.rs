//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//! Rust에서는 예외(exception) 대신 `Result<T, E>` 타입으로 에러를 처리합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 모든 에러 종류를 하나의 타입으로 통합
//! - `is_fatal()`: 워크플로를 멈춰야 하는 에러인지 분류
//!
//! ## 에러 분류
//! | 종류 | 치명적? | 처리 방식 |
//! |------|---------|-----------|
//! | `FetchFailure` | 예 | 워크플로 시작 중단 |
//! | `TransformFailure` / `CritiqueFailure` | 아니오 | 실패 표식(marker)으로 변환되어 사람에게 표시 |
//! | `StorageUnavailable` | 아니오 | 로그만 남기고 메모리 상태로 계속 진행 |
//! | `SearchFailure` | 아니오 | 빈 검색 결과 반환 |

use thiserror::Error; // thiserror: 커스텀 에러 타입을 쉽게 만들어주는 매크로 크레이트

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 각 모듈은 `Result<T, AppError>`를 반환하고,
/// 호출하는 쪽(워크플로, CLI)이 `is_fatal()`로 계속 진행할지 결정합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 원문을 가져오지 못함: 워크플로를 시작할 수 없습니다.
    #[error("Fetch failed: {0}")]
    FetchFailure(String),

    /// 작가(writer) 모델 호출 실패 (초안 생성 또는 피드백 반영)
    #[error("Transform failed: {0}")]
    TransformFailure(String),

    /// 리뷰어(reviewer) 모델 호출 실패
    #[error("Critique failed: {0}")]
    CritiqueFailure(String),

    /// 저장소에 접근할 수 없음
    /// #[from]: sqlx::Error → AppError::StorageUnavailable 자동 변환.
    /// sqlx 함수 결과에 `?`를 쓰면 이 variant로 바뀝니다.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),

    /// 마이그레이션 실행 실패 (시작 시점에만 발생)
    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// 유사도 검색(임베딩) 실패
    #[error("Search failed: {0}")]
    SearchFailure(String),

    /// HTTP 전송 계층 오류 (연결 실패, 타임아웃, 본문 파싱 실패 등)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 외부 API가 성공이 아닌 상태 코드를 돌려줌
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// 파일 입출력 오류 (캐시 읽기/쓰기)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// DB나 API 응답에 예상하지 못한 값이 들어 있음
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl AppError {
    /// 이 에러가 워크플로 진행을 막아야 하는지 여부.
    ///
    /// 원문 가져오기 실패와 시작 시 마이그레이션 실패만 치명적입니다.
    /// 나머지는 "저장소 때문에 창작 루프를 멈추지 않는다"는 정책에 따라
    /// 로그를 남기고 계속 진행합니다.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::FetchFailure(_) | AppError::Migration(_))
    }

    /// 로그 필드로 쓰는 짧은 에러 코드
    pub fn code(&self) -> &'static str {
        match self {
            AppError::FetchFailure(_) => "fetch_failure",
            AppError::TransformFailure(_) => "transform_failure",
            AppError::CritiqueFailure(_) => "critique_failure",
            AppError::StorageUnavailable(_) => "storage_unavailable",
            AppError::Migration(_) => "migration_failure",
            AppError::SearchFailure(_) => "search_failure",
            AppError::Http(_) => "http_error",
            AppError::Api { .. } => "api_error",
            AppError::Io(_) => "io_error",
            AppError::InvalidData(_) => "invalid_data",
        }
    }
}
