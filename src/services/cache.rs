//! # 원문 캐시 파일 I/O 서비스
//!
//! 한 번 가져온 원문 챕터를 디스크에 저장해 두고, 다음 실행 때는 네트워크 대신
//! 캐시 파일을 읽습니다.
//!
//! 이 모듈의 함수들:
//! - `cache_file_name()`: URL로부터 안전한 캐시 파일 이름 생성
//! - `read_cached()`: 캐시 파일이 있으면 내용을 반환
//! - `write_cached()`: 내용을 캐시 파일로 저장

use crate::error::AppError;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
// tokio::fs: 비동기 파일 시스템 모듈
use tokio::fs;

/// 파일 이름에 쓰는 slug의 최대 길이 (일부 파일 시스템의 이름 길이 제한 대응)
const MAX_SLUG_LEN: usize = 200;

/// URL로부터 캐시 파일 이름을 만듭니다.
///
/// 프로토콜(`http://`, `https://`)을 떼고 slug로 바꿉니다.
/// slug가 너무 길면 잘라내고, 잘린 이름끼리 충돌하지 않도록
/// 원래 URL의 SHA-256 앞 12자리를 붙입니다.
///
/// # 예시
/// ```text
/// "https://en.wikisource.org/wiki/The_Gates_of_Morning/Book_1/Chapter_1"
///   → "en-wikisource-org-wiki-the-gates-of-morning-book-1-chapter-1.txt"
/// ```
pub fn cache_file_name(url: &str) -> String {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let slug = slug::slugify(without_scheme);

    if slug.len() <= MAX_SLUG_LEN {
        return format!("{slug}.txt");
    }

    let digest = Sha256::digest(url.as_bytes());
    let suffix: String = digest.iter().take(6).map(|b| format!("{b:02x}")).collect();
    // slug는 ASCII만 포함하므로 바이트 인덱스로 잘라도 안전합니다.
    format!("{}-{suffix}.txt", &slug[..MAX_SLUG_LEN])
}

fn cache_path(cache_dir: &Path, url: &str) -> PathBuf {
    cache_dir.join(cache_file_name(url))
}

/// 캐시된 원문을 읽습니다.
///
/// # 반환값
/// - `Ok(Some(String))`: 캐시 파일 내용
/// - `Ok(None)`: 캐시 파일이 없음
/// - `Err(AppError::Io)`: 파일은 있지만 읽을 수 없음
pub async fn read_cached(cache_dir: &Path, url: &str) -> Result<Option<String>, AppError> {
    let path = cache_path(cache_dir, url);
    match fs::read_to_string(&path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// 원문을 캐시 파일로 저장합니다.
///
/// 캐시 디렉토리가 없으면 자동으로 생성하고, 파일이 있으면 덮어씁니다.
pub async fn write_cached(cache_dir: &Path, url: &str, content: &str) -> Result<(), AppError> {
    fs::create_dir_all(cache_dir).await?;
    fs::write(cache_path(cache_dir, url), content).await?;
    Ok(())
}
