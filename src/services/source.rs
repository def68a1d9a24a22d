//! # 원문 챕터 가져오기
//!
//! 워크플로의 version 0(원문)을 공급하는 `TextSource` 포트와 웹 구현입니다.
//!
//! ## `WebSource` 동작 순서
//! 1. 캐시 디렉토리에 같은 URL의 파일이 있으면 그것을 사용
//! 2. 없으면 HTTP GET으로 페이지를 받아 본문 컨테이너(CSS 선택자)만 추출
//! 3. 페이지 번호 표식(`span.pagenum`)과 script/style을 제거하고 공백을 정리
//! 4. 결과를 캐시에 다시 저장 (실패해도 경고만 남김)
//!
//! 어느 단계든 본문을 얻지 못하면 `FetchFailure`: 워크플로가 시작되지 않습니다.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;
use crate::services::{cache, text};

/// 페이지 로딩 제한 시간
const FETCH_TIMEOUT_SECS: u64 = 60;

#[async_trait]
pub trait TextSource: Send + Sync {
    /// 원문 텍스트를 가져옵니다. 실패는 `AppError::FetchFailure`입니다.
    async fn fetch_original(&self) -> Result<String, AppError>;

    /// 로그에 남길 원문 식별자 (URL 등)
    fn identifier(&self) -> &str;
}

pub struct WebSource {
    http: Client,
    url: String,
    selector: String,
    cache_dir: PathBuf,
}

impl WebSource {
    pub fn new(
        url: impl Into<String>,
        selector: impl Into<String>,
        cache_dir: impl Into<PathBuf>,
    ) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
            selector: selector.into(),
            cache_dir: cache_dir.into(),
        })
    }

    async fn download(&self) -> Result<String, AppError> {
        tracing::info!(url = %self.url, selector = %self.selector, "Fetching chapter content");
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::FetchFailure(format!("request to {} failed: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::FetchFailure(format!(
                "{} responded with {status}",
                self.url
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::FetchFailure(format!("failed to read body: {e}")))?;
        clean_html(&html, &self.selector)
    }
}

#[async_trait]
impl TextSource for WebSource {
    async fn fetch_original(&self) -> Result<String, AppError> {
        match cache::read_cached(&self.cache_dir, &self.url).await {
            Ok(Some(cached)) if !cached.trim().is_empty() => {
                tracing::info!(url = %self.url, "Using cached chapter content");
                return Ok(cached);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Could not read chapter cache, fetching instead"),
        }

        let content = self.download().await?;

        if let Err(e) = cache::write_cached(&self.cache_dir, &self.url, &content).await {
            tracing::warn!(error = %e, "Could not update chapter cache");
        }
        Ok(content)
    }

    fn identifier(&self) -> &str {
        &self.url
    }
}

/// HTML에서 선택자에 맞는 첫 번째 요소의 텍스트만 뽑아 공백을 정리합니다.
///
/// 페이지 번호(`span.pagenum`), `script`, `style` 안의 텍스트는 버립니다.
pub fn clean_html(html: &str, selector: &str) -> Result<String, AppError> {
    let selector = Selector::parse(selector)
        .map_err(|e| AppError::FetchFailure(format!("invalid content selector: {e}")))?;
    let document = Html::parse_document(html);

    let container = document
        .select(&selector)
        .next()
        .ok_or_else(|| AppError::FetchFailure("content container not found".to_string()))?;

    let pieces: Vec<&str> = container
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let skipped = node.ancestors().any(|ancestor| {
                ancestor.value().as_element().is_some_and(|el| {
                    matches!(el.name(), "script" | "style")
                        || (el.name() == "span" && el.classes().any(|c| c == "pagenum"))
                })
            });
            if skipped {
                return None;
            }
            let trimmed = text.trim();
            (!trimmed.is_empty()).then_some(trimmed)
        })
        .collect();

    let cleaned = text::collapse_whitespace(&pieces.join(" "));
    if cleaned.is_empty() {
        return Err(AppError::FetchFailure(
            "content container has no text".to_string(),
        ));
    }
    Ok(cleaned)
}
