//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! 각 하위 모듈은 특정 도메인의 데이터 타입을 담당합니다:
//! - `version`: 챕터 버전(ChapterVersion), 상태(VersionStatus), 검색 결과(SearchHit)
//! - `decision`: 편집자의 결정(Decision)과 피드백(Feedback)
//! - `generation`: 생성 모델 호출 결과(Generation)와 실패 표식
//!
//! `pub use X::*;`는 하위 모듈의 모든 공개 항목을
//! 이 모듈에서 바로 접근할 수 있게 재공개(re-export)합니다.
//! 예: `crate::models::version::VersionStatus` 대신 `crate::models::VersionStatus`로 접근 가능

pub mod decision;
pub mod generation;
pub mod version;

pub use decision::*;
pub use generation::*;
pub use version::*;
