//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `GEMINI_API_KEY`: Gemini API 키 (필수)
//! - `DATABASE_URL`: SQLite 데이터베이스 경로
//! - `URL` / `CONTENT_SELECTOR`: 원문 챕터 주소와 본문 CSS 선택자
//! - `CHAPTER_ID`: 버전 원장에서 챕터를 구분하는 식별자
//! - `CACHE_DIR`: 가져온 원문을 저장하는 캐시 디렉토리
//! - `GEMINI_MODEL` / `GEMINI_BASE_URL` / `EMBEDDING_MODEL`: 모델 설정
//! - `EMBEDDING_PROVIDER`: `gemini` 또는 `local`
//! - `SEARCH_TOP_K`: 의미 검색 결과 개수

use std::env;

/// 임베딩을 계산할 제공자
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// Gemini `embedContent` API
    Gemini,
    /// 네트워크 없이 동작하는 결정적(deterministic) 어휘 해시 임베딩
    Local,
}

impl EmbeddingProvider {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "local" => EmbeddingProvider::Local,
            _ => EmbeddingProvider::Gemini,
        }
    }
}

#[derive(Debug, Clone)]
/// 애플리케이션 전체 설정을 담는 구조체
///
/// 시작 시 환경변수에서 한 번 읽어온 후, 명령줄 인자로 일부를 덮어씁니다.
pub struct Config {
    /// Gemini API 키
    pub gemini_api_key: String,
    /// SQLite 데이터베이스 URL (예: "sqlite:data/bookflow.db?mode=rwc")
    pub database_url: String,
    /// 원문 챕터 URL
    pub url: String,
    /// 원문 페이지에서 본문을 감싸는 요소의 CSS 선택자
    pub content_selector: String,
    /// 챕터 식별자
    pub chapter_id: String,
    /// 원문 캐시 디렉토리
    pub cache_dir: String,
    /// 생성 모델 이름
    pub gemini_model: String,
    /// Gemini API 기본 주소 (테스트/프록시용으로 바꿀 수 있음)
    pub gemini_base_url: String,
    /// 임베딩 모델 이름
    pub embedding_model: String,
    pub embedding_provider: EmbeddingProvider,
    /// 의미 검색 기본 결과 개수
    pub search_top_k: usize,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `GEMINI_API_KEY`는 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 기본값이 있습니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            gemini_api_key: env::var("GEMINI_API_KEY")?, // 필수: 없으면 에러
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:data/bookflow.db?mode=rwc".to_string()),
            url: env::var("URL").unwrap_or_else(|_| {
                "https://en.wikisource.org/wiki/The_Gates_of_Morning/Book_1/Chapter_1".to_string()
            }),
            content_selector: env::var("CONTENT_SELECTOR")
                .unwrap_or_else(|_| "div.mw-parser-output.ws-page-container".to_string()),
            chapter_id: env::var("CHAPTER_ID")
                .unwrap_or_else(|_| "gates_of_morning_ch1".to_string()),
            cache_dir: env::var("CACHE_DIR").unwrap_or_else(|_| "cache".to_string()),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            embedding_model: env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "text-embedding-004".to_string()),
            embedding_provider: EmbeddingProvider::parse(
                &env::var("EMBEDDING_PROVIDER").unwrap_or_default(),
            ),
            // 파싱 실패 시 기본값 3
            search_top_k: env::var("SEARCH_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|k: &usize| *k > 0)
                .unwrap_or(3),
        })
    }
}
