/// 작가가 초안을 만들지 못했을 때 사람에게 보이는 표식
pub const WRITER_FAILED_MARKER: &str = "--- AI WRITER FAILED ---";
/// 리뷰어가 비평을 만들지 못했을 때의 표식
pub const REVIEWER_FAILED_MARKER: &str = "--- AI REVIEWER FAILED ---";
/// 피드백 반영 중 작가가 실패했을 때의 표식
pub const REFINEMENT_FAILED_MARKER: &str = "--- AI WRITER FAILED ON REFINEMENT ---";

/// 생성 모델 호출 결과. 실패도 값으로 돌려받습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    Generated(String),
    Failed {
        /// 사람에게 그대로 보여줄 표식 문자열
        marker: &'static str,
        reason: String,
    },
}

impl Generation {
    pub fn failed(marker: &'static str, reason: impl Into<String>) -> Self {
        Generation::Failed {
            marker,
            reason: reason.into(),
        }
    }

    /// 화면에 보여줄 텍스트: 성공이면 생성된 텍스트, 실패면 표식
    pub fn display_text(&self) -> &str {
        match self {
            Generation::Generated(text) => text,
            Generation::Failed { marker, .. } => marker,
        }
    }
}
