//! # AI 작가 / 리뷰어
//!
//! 워크플로가 쓰는 세 가지 생성 기능을 `Reviser` 포트로 묶습니다.
//!
//! | 메서드 | 역할 | 실패 표식 |
//! |--------|------|-----------|
//! | `rewrite` | 원문을 현대적인 문체로 다시 쓰기 | `--- AI WRITER FAILED ---` |
//! | `critique` | 원문과 초안을 비교한 구조화된 리뷰 | `--- AI REVIEWER FAILED ---` |
//! | `refine` | 편집자 피드백을 반영해 초안 다시 쓰기 | `--- AI WRITER FAILED ON REFINEMENT ---` |
//!
//! 모든 메서드는 에러를 던지지 않고 `Generation` 값을 돌려줍니다.
//! 실패는 `Generation::Failed`에 표식과 원인을 담아 사람에게 그대로 보여줍니다.

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{
    Generation, REFINEMENT_FAILED_MARKER, REVIEWER_FAILED_MARKER, WRITER_FAILED_MARKER,
};
use crate::services::gemini::GeminiClient;

#[async_trait]
pub trait Reviser: Send + Sync {
    async fn rewrite(&self, text: &str) -> Generation;
    async fn critique(&self, original_text: &str, candidate_text: &str) -> Generation;
    async fn refine(&self, draft_text: &str, feedback: &str) -> Generation;
}

/// Gemini 생성 모델을 쓰는 `Reviser`
pub struct GeminiReviser {
    client: GeminiClient,
}

impl GeminiReviser {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    /// 생성 호출 결과를 `Generation`으로 바꿉니다. 실패는 여기서 로그로 남깁니다.
    fn settle(
        result: Result<String, AppError>,
        marker: &'static str,
        wrap: fn(String) -> AppError,
    ) -> Generation {
        match result {
            Ok(text) => Generation::Generated(text),
            Err(e) => {
                let err = wrap(e.to_string());
                tracing::error!(code = err.code(), error = %err, "Generation call failed");
                Generation::failed(marker, err.to_string())
            }
        }
    }
}

#[async_trait]
impl Reviser for GeminiReviser {
    async fn rewrite(&self, text: &str) -> Generation {
        tracing::info!(model = self.client.model(), "Sending text to AI writer");
        let result = self.client.generate(&writer_prompt(text)).await;
        Self::settle(result, WRITER_FAILED_MARKER, AppError::TransformFailure)
    }

    async fn critique(&self, original_text: &str, candidate_text: &str) -> Generation {
        tracing::info!(model = self.client.model(), "Sending texts to AI reviewer");
        let result = self
            .client
            .generate(&reviewer_prompt(original_text, candidate_text))
            .await;
        Self::settle(result, REVIEWER_FAILED_MARKER, AppError::CritiqueFailure)
    }

    async fn refine(&self, draft_text: &str, feedback: &str) -> Generation {
        tracing::info!(model = self.client.model(), "Re-spinning chapter with human feedback");
        let result = self
            .client
            .generate(&refinement_prompt(draft_text, feedback))
            .await;
        Self::settle(result, REFINEMENT_FAILED_MARKER, AppError::TransformFailure)
    }
}

pub fn writer_prompt(original_text: &str) -> String {
    format!(
        "You are an AI Writing Assistant tasked with modernizing classic literature.\n\
         Your goal is to rewrite the following chapter in a more contemporary, engaging, \
         and slightly more descriptive style.\n\
         Preserve all key plot points, character interactions, and the overall atmosphere. \
         Do not add new plot elements.\n\n\
         Here is the original chapter to rewrite:\n---\n{original_text}\n---\n\
         Please provide only the rewritten chapter text as your response."
    )
}

pub fn reviewer_prompt(original_text: &str, candidate_text: &str) -> String {
    format!(
        "You are an AI Quality Assurance Editor. Your task is to review a rewritten chapter \
         against the original.\n\
         Your review should be concise and structured in three parts:\n\
         1. **Overall Match:** A single sentence stating how well the rewritten version \
         matches the tone and plot of the original.\n\
         2. **Key Improvement:** Point out one specific thing the writer did well.\n\
         3. **Suggestion for Change:** Suggest one specific improvement.\n\n\
         **Original Chapter:**\n---\n{original_text}\n---\n\n\
         **Rewritten Chapter:**\n---\n{candidate_text}\n---\n\
         Please provide only the structured review as your response."
    )
}

pub fn refinement_prompt(previous_draft: &str, feedback: &str) -> String {
    format!(
        "You are an AI Writing Assistant. Your previous draft of a chapter has been reviewed \
         by a human editor.\n\
         Your task is to rewrite the draft, carefully incorporating all of the following \
         feedback.\n\n\
         **Previous Draft to be revised:**\n---\n{previous_draft}\n---\n\n\
         **Human Editor's Instructions for this revision:**\n---\n{feedback}\n---\n\n\
         Please provide only the new, fully refined chapter text as your response."
    )
}
