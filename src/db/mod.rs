//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! `store` 모듈의 `VersionStore`가 이 모듈의 함수를 호출합니다.
//!
//! 각 하위 모듈:
//! - `versions`: 챕터 버전 upsert / 조회 쿼리
//! - `search`: 의미 검색용 임베딩 BLOB 인코딩과 후보 조회

pub mod search;
pub mod versions;

// 하위 모듈의 모든 공개 함수를 재공개(re-export)하여
// `crate::db::list_versions`처럼 바로 접근할 수 있게 합니다.
pub use search::*;
pub use versions::*;

use crate::error::AppError;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// SQLite 연결 풀을 열고 마이그레이션을 실행합니다.
///
/// 워크플로는 단일 스레드로 순차 실행되므로 연결 몇 개면 충분합니다.
pub async fn connect(database_url: &str) -> Result<SqlitePool, AppError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect(database_url)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// 테스트용 인메모리 DB.
/// `sqlite::memory:`는 연결마다 별개의 DB이므로 연결을 하나로 고정합니다.
#[cfg(test)]
pub async fn connect_in_memory() -> Result<SqlitePool, AppError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
