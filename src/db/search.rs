//! # 임베딩 저장/조회 모듈
//!
//! 의미 검색(semantic search)에 필요한 임베딩 벡터를 다룹니다.
//!
//! ## 저장 형식
//! 임베딩은 `chapter_versions.embedding` BLOB 컬럼에
//! little-endian `f32` 배열로 저장됩니다 (차원 수 × 4바이트).
//!
//! ## 주의사항
//! SQLite에는 벡터 거리 함수가 없으므로, 이 모듈은 후보 행들을 모두 읽어오기만 하고
//! 거리 계산과 정렬은 `store` 모듈이 Rust 코드로 수행합니다.
//! 챕터 하나의 버전 수는 수십 개 수준이라 전체 스캔으로 충분합니다.

use crate::error::AppError;
use crate::models::VersionStatus;
use sqlx::SqlitePool;

/// 임베딩이 있는 버전 한 행
#[derive(Debug, Clone)]
pub struct EmbeddedVersion {
    pub version_number: i64,
    pub status: VersionStatus,
    pub content: String,
    pub embedding: Vec<f32>,
}

/// `f32` 벡터 → BLOB 바이트
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// BLOB 바이트 → `f32` 벡터. 길이가 4의 배수가 아니면 손상된 값입니다.
pub fn bytes_to_embedding(bytes: &[u8]) -> Result<Vec<f32>, AppError> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::InvalidData(format!(
            "embedding blob length {} is not a multiple of 4",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// 챕터에서 임베딩이 저장된 버전들을 모두 가져옵니다.
///
/// 임베딩 계산에 실패해 `embedding IS NULL`인 행은 검색 대상에서 빠집니다.
/// 손상된 BLOB은 경고 로그만 남기고 건너뜁니다.
pub async fn list_embedded_versions(
    pool: &SqlitePool,
    chapter_id: &str,
) -> Result<Vec<EmbeddedVersion>, AppError> {
    // query_as::<_, (..)>: 결과를 튜플로 매핑합니다
    let rows: Vec<(i64, String, String, Vec<u8>)> = sqlx::query_as(
        r#"
        SELECT version_number, status, content, embedding
        FROM chapter_versions
        WHERE chapter_id = ? AND embedding IS NOT NULL
        ORDER BY version_number ASC
        "#,
    )
    .bind(chapter_id)
    .fetch_all(pool)
    .await?;

    let mut versions = Vec::with_capacity(rows.len());
    for (version_number, status, content, blob) in rows {
        let embedding = match bytes_to_embedding(&blob) {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!(chapter_id, version_number, error = %e, "Skipping corrupt embedding");
                continue;
            }
        };
        versions.push(EmbeddedVersion {
            version_number,
            status: status.parse()?,
            content,
            embedding,
        });
    }

    Ok(versions)
}

/// 같은 키에 같은 내용으로 이미 저장된 임베딩 BLOB을 찾습니다.
///
/// 승인처럼 내용은 그대로 두고 상태만 바꾸는 저장이나, 시작할 때마다 다시 저장하는
/// 원문(version 0)은 이 값을 재사용해 임베딩 API를 다시 부르지 않습니다.
pub async fn find_embedding(
    pool: &SqlitePool,
    chapter_id: &str,
    version_number: i64,
    content: &str,
) -> Result<Option<Vec<u8>>, AppError> {
    let blob = sqlx::query_scalar::<_, Vec<u8>>(
        r#"
        SELECT embedding
        FROM chapter_versions
        WHERE chapter_id = ? AND version_number = ? AND content = ? AND embedding IS NOT NULL
        "#,
    )
    .bind(chapter_id)
    .bind(version_number)
    .bind(content)
    .fetch_optional(pool)
    .await?;

    Ok(blob)
}
