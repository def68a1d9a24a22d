//! # bookflow 진입점
//!
//! 원문 챕터를 AI 작가가 다시 쓰고, AI 리뷰어가 비평하고, 사람 편집자가
//! 승인 · 피드백 · 폐기 · 보류를 결정하는 터미널 애플리케이션입니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. 설정 로딩 + 명령줄 인자로 덮어쓰기
//! 4. Gemini 클라이언트와 임베딩 제공자 준비
//! 5. 버전 저장소(SQLite) 열기 (마이그레이션 포함)
//! 6. 원문 가져오기 및 챕터 세션 시작
//! 7. 메인 메뉴 실행
//! 8. 종료 시 저장소 닫기

// ── 모듈 선언 ──
mod cli;
mod config;
mod db;
mod error;
mod models;
mod services;
mod store;
mod workflow;

use std::sync::Arc;

use anyhow::Result; // anyhow::Result: 어떤 에러 타입이든 담을 수 있는 범용 Result 타입
use clap::Parser;
use config::{Config, EmbeddingProvider};
use services::agents::GeminiReviser;
use services::embedding::{Embedder, GeminiEmbedder, LexicalEmbedder};
use services::gemini::GeminiClient;
use services::source::WebSource;
use store::VersionStore;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt}; // 로깅 초기화 유틸리티
use workflow::RevisionWorkflow;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // RUST_LOG가 없으면 우리 크레이트는 info, sqlx는 warn 레벨
    // 로그는 stderr로 보내서 stdout의 초안/리뷰 출력과 섞이지 않게 합니다.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookflow=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // ── 3단계: 설정 로딩 ──
    let args = cli::Args::parse();
    let mut config = Config::from_env()
        .map_err(|e| anyhow::anyhow!("GEMINI_API_KEY must be set: {e}"))?;
    args.apply(&mut config);
    tracing::info!(
        chapter_id = %config.chapter_id,
        model = %config.gemini_model,
        "Starting bookflow"
    );

    // ── 4단계: 모델 클라이언트 ──
    // GeminiClient는 내부 reqwest::Client를 공유하므로 clone이 저렴합니다.
    let gemini = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_base_url.clone(),
        config.gemini_model.clone(),
        config.embedding_model.clone(),
    )?;
    let embedder: Arc<dyn Embedder> = match config.embedding_provider {
        EmbeddingProvider::Gemini => Arc::new(GeminiEmbedder::new(gemini.clone())),
        EmbeddingProvider::Local => {
            tracing::info!("Using local lexical embeddings");
            Arc::new(LexicalEmbedder::default())
        }
    };

    // ── 5단계: 버전 저장소 ──
    // 데이터베이스 파일이 들어갈 디렉토리가 없으면 만들어 둡니다.
    if let Some(dir) = sqlite_parent_dir(&config.database_url) {
        tokio::fs::create_dir_all(dir).await?;
    }
    let store = VersionStore::open(&config.database_url, embedder).await?;

    // ── 6단계: 원문 가져오기 + 세션 시작 ──
    // 원문을 가져오지 못하면 시작할 수 없으므로 여기서 종료합니다.
    let workflow = RevisionWorkflow::new(store.clone(), Arc::new(GeminiReviser::new(gemini)));
    let source = WebSource::new(&config.url, &config.content_selector, &config.cache_dir)?;
    let mut session = match workflow.initialize(&config.chapter_id, &source).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(code = e.code(), fatal = e.is_fatal(), error = %e, "Could not start the workflow");
            store.close().await;
            return Err(e.into());
        }
    };

    // ── 7단계: 메인 메뉴 ──
    let mut console = cli::Console::new(BufReader::new(tokio::io::stdin()));
    cli::run_menu(&workflow, &mut session, &mut console, config.search_top_k).await;

    // ── 8단계: 정리 ──
    store.close().await;
    tracing::info!("Goodbye");
    Ok(())
}

/// `sqlite:data/bookflow.db?mode=rwc` → `data`
fn sqlite_parent_dir(database_url: &str) -> Option<&str> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next()?;
    if path.starts_with(":memory:") {
        return None;
    }
    let (dir, _) = path.rsplit_once('/')?;
    (!dir.is_empty()).then_some(dir)
}
