//! # Gemini HTTP 클라이언트
//!
//! Google Gemini REST API의 두 엔드포인트만 사용합니다:
//! - `models/{model}:generateContent`: 초안 작성, 리뷰, 다시 쓰기
//! - `models/{model}:embedContent`: 의미 검색용 임베딩
//!
//! 재시도는 하지 않습니다. 실패는 호출한 쪽이 실패 표식이나 빈 검색 결과로 바꿉니다.

use crate::error::AppError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

/// 생성 요청 하나에 허용하는 최대 시간
const REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
    embedding_model: String,
}

// ── 응답 본문 구조 ──
// 필요한 필드만 선언하고 나머지는 serde가 무시합니다.

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize, Serialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize, Serialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        embedding_model: impl Into<String>,
    ) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            embedding_model: embedding_model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// 프롬프트 하나를 보내고 첫 번째 후보의 텍스트를 돌려받습니다.
    /// 후보가 없거나 텍스트가 비어 있으면 `InvalidData` 에러입니다.
    pub async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response: GenerateResponse = self.post_json(&url, &body).await?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AppError::InvalidData(
                "Gemini returned no candidate text".to_string(),
            ));
        }
        Ok(text)
    }

    /// 텍스트 하나의 임베딩 벡터를 계산합니다.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        let url = format!(
            "{}/v1beta/models/{}:embedContent",
            self.base_url, self.embedding_model
        );
        let body = json!({
            "model": format!("models/{}", self.embedding_model),
            "content": { "parts": [{ "text": text }] }
        });

        let response: EmbedResponse = self.post_json(&url, &body).await?;
        if response.embedding.values.is_empty() {
            return Err(AppError::InvalidData(
                "Gemini returned an empty embedding".to_string(),
            ));
        }
        Ok(response.embedding.values)
    }

    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T, AppError> {
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(AppError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}
