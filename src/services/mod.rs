//! # 외부 기능 서비스 모듈
//!
//! 네트워크, 파일, 모델 호출처럼 워크플로 바깥과 맞닿은 기능을 모아둔 모듈입니다.
//! - `gemini`: Gemini REST API 클라이언트 (생성 / 임베딩)
//! - `agents`: 작가 · 리뷰어 역할 (`Reviser` 포트)
//! - `embedding`: 임베딩 포트와 구현, 코사인 거리
//! - `source`: 원문 챕터 가져오기 (`TextSource` 포트)
//! - `cache`: 원문 캐시 파일 I/O
//! - `text`: 단어 수 · 미리보기 같은 텍스트 유틸리티

pub mod agents;
pub mod cache;
pub mod embedding;
pub mod gemini;
pub mod source;
pub mod text;
