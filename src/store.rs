//! # 버전 저장소 (Version Store)
//!
//! 챕터 버전 원장에 대한 단일 진입점입니다. `db` 모듈의 쿼리 함수와
//! `Embedder` 포트를 묶어, 워크플로가 쓰는 다섯 가지 연산을 제공합니다.
//!
//! | 연산 | 설명 |
//! |------|------|
//! | `put` | `(chapter_id, version_number)` 키로 upsert. 임베딩도 함께 저장 |
//! | `get_latest` | version_number가 가장 큰 버전 |
//! | `get_all` | 모든 버전을 오름차순으로 |
//! | `get_approved` | 승인본 텍스트. 여러 개면 이상(anomaly) 로그 후 가장 낮은 번호 |
//! | `semantic_search` | 질의와 가까운 버전 순으로 최대 `top_k`개. 실패해도 빈 결과 |
//!
//! ## 의존성 주입
//! 연결 풀과 임베딩 기능은 전역 객체가 아니라 생성자에서 받습니다.
//! `open()`으로 열고 종료 시 `close()`로 닫습니다.

use std::cmp::Ordering;
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::db;
use crate::error::AppError;
use crate::models::{ChapterVersion, SearchHit, VersionStatus};
use crate::services::embedding::{cosine_distance, Embedder};
use crate::services::text;

#[derive(Clone)]
pub struct VersionStore {
    pool: SqlitePool,
    embedder: Arc<dyn Embedder>,
}

impl VersionStore {
    /// DB를 열고(마이그레이션 포함) 저장소를 만듭니다.
    pub async fn open(database_url: &str, embedder: Arc<dyn Embedder>) -> Result<Self, AppError> {
        let pool = db::connect(database_url).await?;
        Ok(Self::from_pool(pool, embedder))
    }

    pub fn from_pool(pool: SqlitePool, embedder: Arc<dyn Embedder>) -> Self {
        Self { pool, embedder }
    }

    /// 연결 풀을 닫습니다. 이후 호출은 모두 `StorageUnavailable`입니다.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// 버전을 저장합니다 (같은 키면 덮어쓰기).
    ///
    /// 같은 키에 같은 내용의 임베딩이 이미 있으면 다시 계산하지 않습니다.
    /// 임베딩 계산이 실패하면 경고만 남기고 임베딩 없이 저장합니다.
    /// 그 버전은 의미 검색 대상에서만 빠집니다.
    pub async fn put(
        &self,
        chapter_id: &str,
        version_number: i64,
        status: VersionStatus,
        content: &str,
    ) -> Result<(), AppError> {
        tracing::info!(chapter_id, version_number, status = %status, "Saving version");

        // 내용이 바뀌지 않았으면 저장된 임베딩을 그대로 씁니다.
        let stored = db::find_embedding(&self.pool, chapter_id, version_number, content).await?;
        let embedding = match stored {
            Some(blob) => Some(blob),
            None => self.embed_for_storage(chapter_id, version_number, content).await,
        };

        db::upsert_version(
            &self.pool,
            chapter_id,
            version_number,
            status,
            content,
            text::count_words(content) as i64,
            text::count_chars(content) as i64,
            embedding.as_deref(),
        )
        .await
    }

    async fn embed_for_storage(
        &self,
        chapter_id: &str,
        version_number: i64,
        content: &str,
    ) -> Option<Vec<u8>> {
        match self.embedder.embed(content).await {
            Ok(vector) => Some(db::embedding_to_bytes(&vector)),
            Err(e) => {
                tracing::warn!(
                    chapter_id,
                    version_number,
                    error = %e,
                    "Embedding failed; version will not be searchable"
                );
                None
            }
        }
    }

    /// 가장 최신(번호가 가장 큰) 버전. 버전이 없으면 `None`.
    pub async fn get_latest(&self, chapter_id: &str) -> Result<Option<ChapterVersion>, AppError> {
        db::get_latest_version(&self.pool, chapter_id).await
    }

    /// 모든 버전을 version_number 오름차순으로.
    pub async fn get_all(&self, chapter_id: &str) -> Result<Vec<ChapterVersion>, AppError> {
        db::list_versions(&self.pool, chapter_id).await
    }

    /// 승인본 텍스트.
    ///
    /// 승인본은 챕터당 하나여야 하지만 저장소가 강제하지는 않습니다.
    /// 여러 개가 발견되면 경고를 남기고 가장 낮은 version_number의 텍스트를 돌려줍니다.
    pub async fn get_approved(&self, chapter_id: &str) -> Result<Option<String>, AppError> {
        let approved =
            db::list_versions_with_status(&self.pool, chapter_id, VersionStatus::Approved).await?;

        if approved.len() > 1 {
            let versions: Vec<i64> = approved.iter().map(|v| v.version_number).collect();
            tracing::warn!(
                chapter_id,
                ?versions,
                "Multiple approved versions found; returning the lowest version"
            );
        }

        Ok(approved.into_iter().next().map(|v| v.text))
    }

    /// 질의와 의미가 가까운 버전을 최대 `top_k`개 찾습니다.
    ///
    /// 거리 오름차순(유사도 내림차순)으로 정렬하며, 같은 거리면 낮은 번호가 먼저입니다.
    /// 임베딩이나 DB가 실패하면 에러 대신 빈 결과를 돌려줍니다.
    pub async fn semantic_search(
        &self,
        chapter_id: &str,
        query_text: &str,
        top_k: usize,
    ) -> Vec<SearchHit> {
        match self.rank(chapter_id, query_text, top_k).await {
            Ok(hits) => {
                tracing::info!(chapter_id, hits = hits.len(), "Semantic search complete");
                hits
            }
            Err(e) => {
                tracing::warn!(chapter_id, code = e.code(), error = %e, "Semantic search unavailable");
                Vec::new()
            }
        }
    }

    async fn rank(
        &self,
        chapter_id: &str,
        query_text: &str,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, AppError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let candidates = db::list_embedded_versions(&self.pool, chapter_id).await?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let query = self
            .embedder
            .embed(query_text)
            .await
            .map_err(|e| AppError::SearchFailure(e.to_string()))?;

        let mut hits: Vec<SearchHit> = candidates
            .into_iter()
            .filter_map(|candidate| {
                let distance = cosine_distance(&query, &candidate.embedding);
                // 차원이 다른 (다른 모델로 만든) 임베딩은 비교할 수 없습니다.
                if distance == f32::MAX {
                    return None;
                }
                Some(SearchHit {
                    text: candidate.content,
                    status: candidate.status,
                    version_number: candidate.version_number,
                    similarity: 1.0 - distance,
                    distance,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then(a.version_number.cmp(&b.version_number))
        });
        hits.truncate(top_k);

        Ok(hits)
    }
}
