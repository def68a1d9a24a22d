//! # 챕터 버전 모델
//!
//! 버전 원장(ledger)에 저장되는 한 시점의 챕터 스냅샷과 그 상태를 정의합니다.
//!
//! ## 상태 흐름
//! ```text
//! original ──▶ ai_draft ──▶ human_edited_draft ──▶ approved
//!                 │                  ▲   │
//!                 └──────────────────┘   └─(반복 수정)
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// 버전의 생애주기 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionStatus {
    /// 가공하지 않은 원문 (항상 version 0)
    Original,
    /// AI 작가가 만든 초안
    AiDraft,
    /// 사람의 피드백을 반영해 다시 쓴 초안
    HumanEditedDraft,
    /// 최종 승인본
    Approved,
}

impl VersionStatus {
    /// DB의 `status` 컬럼에 저장되는 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionStatus::Original => "original",
            VersionStatus::AiDraft => "ai_draft",
            VersionStatus::HumanEditedDraft => "human_edited_draft",
            VersionStatus::Approved => "approved",
        }
    }
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "original" => Ok(VersionStatus::Original),
            "ai_draft" => Ok(VersionStatus::AiDraft),
            "human_edited_draft" => Ok(VersionStatus::HumanEditedDraft),
            "approved" => Ok(VersionStatus::Approved),
            other => Err(AppError::InvalidData(format!(
                "unknown version status: {other}"
            ))),
        }
    }
}

/// `chapter_versions` 테이블 한 행을 그대로 읽어온 형태.
/// status는 문자열로 받아서 `ChapterVersion`으로 변환할 때 검증합니다.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChapterVersionRow {
    pub chapter_id: String,
    pub version_number: i64,
    pub status: String,
    pub content: String,
    pub word_count: i64,
    pub char_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// 한 챕터의 한 시점 스냅샷.
/// `(chapter_id, version_number)`가 저장 키입니다.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterVersion {
    pub chapter_id: String,
    pub version_number: i64,
    pub status: VersionStatus,
    pub text: String,
    pub word_count: i64,
    pub char_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<ChapterVersionRow> for ChapterVersion {
    type Error = AppError;

    fn try_from(row: ChapterVersionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            status: row.status.parse()?,
            chapter_id: row.chapter_id,
            version_number: row.version_number,
            text: row.content,
            word_count: row.word_count,
            char_count: row.char_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// 의미 검색 결과 한 건
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub text: String,
    pub status: VersionStatus,
    pub version_number: i64,
    /// 코사인 유사도 (1 - distance). 클수록 가깝습니다.
    pub similarity: f32,
    /// 코사인 거리. 작을수록 가깝습니다.
    pub distance: f32,
}
