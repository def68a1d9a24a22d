use crate::error::AppError;
use crate::models::{ChapterVersion, ChapterVersionRow, VersionStatus};
use sqlx::SqlitePool;

const VERSION_COLUMNS: &str = "chapter_id, version_number, status, content, word_count, \
                               char_count, created_at, updated_at";

/// `(chapter_id, version_number)` 키로 버전을 덮어쓰거나 새로 넣습니다.
/// 같은 키를 다시 저장하면 행 수는 늘지 않고 내용만 바뀝니다.
/// `created_at`은 처음 저장한 시각을 유지합니다.
#[allow(clippy::too_many_arguments)]
pub async fn upsert_version(
    pool: &SqlitePool,
    chapter_id: &str,
    version_number: i64,
    status: VersionStatus,
    content: &str,
    word_count: i64,
    char_count: i64,
    embedding: Option<&[u8]>,
) -> Result<(), AppError> {
    let now = chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string();

    sqlx::query(
        r#"
        INSERT INTO chapter_versions
            (chapter_id, version_number, status, content, word_count, char_count, embedding, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (chapter_id, version_number) DO UPDATE SET
            status     = excluded.status,
            content    = excluded.content,
            word_count = excluded.word_count,
            char_count = excluded.char_count,
            embedding  = excluded.embedding,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(chapter_id)
    .bind(version_number)
    .bind(status.as_str())
    .bind(content)
    .bind(word_count)
    .bind(char_count)
    .bind(embedding)
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(())
}

/// 챕터의 모든 버전을 version_number 오름차순으로 조회합니다.
pub async fn list_versions(
    pool: &SqlitePool,
    chapter_id: &str,
) -> Result<Vec<ChapterVersion>, AppError> {
    let rows = sqlx::query_as::<_, ChapterVersionRow>(&format!(
        "SELECT {VERSION_COLUMNS} FROM chapter_versions \
         WHERE chapter_id = ? ORDER BY version_number ASC"
    ))
    .bind(chapter_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ChapterVersion::try_from).collect()
}

/// version_number가 가장 큰 버전. 버전이 하나도 없으면 None.
pub async fn get_latest_version(
    pool: &SqlitePool,
    chapter_id: &str,
) -> Result<Option<ChapterVersion>, AppError> {
    let row = sqlx::query_as::<_, ChapterVersionRow>(&format!(
        "SELECT {VERSION_COLUMNS} FROM chapter_versions \
         WHERE chapter_id = ? ORDER BY version_number DESC LIMIT 1"
    ))
    .bind(chapter_id)
    .fetch_optional(pool)
    .await?;

    row.map(ChapterVersion::try_from).transpose()
}

/// 특정 상태의 버전들을 version_number 오름차순으로 조회합니다.
/// 승인본 조회에서 "가장 낮은 번호 우선" 규칙을 이 정렬이 보장합니다.
pub async fn list_versions_with_status(
    pool: &SqlitePool,
    chapter_id: &str,
    status: VersionStatus,
) -> Result<Vec<ChapterVersion>, AppError> {
    let rows = sqlx::query_as::<_, ChapterVersionRow>(&format!(
        "SELECT {VERSION_COLUMNS} FROM chapter_versions \
         WHERE chapter_id = ? AND status = ? ORDER BY version_number ASC"
    ))
    .bind(chapter_id)
    .bind(status.as_str())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ChapterVersion::try_from).collect()
}
