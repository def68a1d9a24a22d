//! # 사람의 결정(Decision) 모델
//!
//! 초안과 AI 리뷰를 본 편집자가 내리는 결정을 표현합니다.
//!
//! ## 편집자 명령 해석
//! | 입력 | 결정 |
//! |------|------|
//! | `approve` | 승인 |
//! | `retry` / `discard` | 이번 초안 폐기 |
//! | `defer` / `later` | 승인 없이 보류 |
//! | 그 외 텍스트 | 그 텍스트를 피드백으로 다시 쓰기 |
//! | 빈 입력 | 거부: 다시 물어봅니다 |

/// 다시 쓰기(refine)에 쓰이는 편집자 피드백
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    /// 편집자의 창작 지시 (비어 있지 않음)
    pub direction: String,
    /// AI 리뷰 자체에 대한 편집자의 이견 (선택)
    pub review_concern: Option<String>,
}

impl Feedback {
    /// 빈 지시는 피드백이 될 수 없습니다.
    pub fn new(direction: &str, review_concern: Option<&str>) -> Option<Self> {
        let direction = direction.trim();
        if direction.is_empty() {
            return None;
        }
        Some(Self {
            direction: direction.to_string(),
            review_concern: review_concern
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        })
    }

    /// 작가 모델에게 보낼 하나의 지시문으로 합칩니다.
    pub fn combined(&self) -> String {
        let mut combined = format!("Editor's creative direction: '{}'.", self.direction);
        if let Some(concern) = &self.review_concern {
            combined.push_str(&format!(
                " Also, please address this meta-concern about the review: '{concern}'."
            ));
        }
        combined
    }
}

/// 사람 결정 경계(boundary)에서 돌아오는 값
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Refine(Feedback),
    Discard,
    Defer,
}

impl Decision {
    /// 편집자 명령 한 줄을 결정으로 해석합니다.
    /// 빈 입력은 `None`: 호출하는 쪽이 다시 물어봐야 합니다.
    pub fn from_command(command: &str, review_concern: Option<&str>) -> Option<Self> {
        let trimmed = command.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" => None,
            "approve" => Some(Decision::Approve),
            "retry" | "discard" => Some(Decision::Discard),
            "defer" | "later" => Some(Decision::Defer),
            _ => Feedback::new(trimmed, review_concern).map(Decision::Refine),
        }
    }
}
