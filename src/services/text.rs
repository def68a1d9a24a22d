//! # 텍스트 통계 / 미리보기 유틸리티
//!
//! - `count_words()`: 텍스트의 단어 수 계산
//! - `count_chars()`: 텍스트의 문자 수 계산
//! - `snippet()`: 표나 검색 결과에 보여줄 앞부분 미리보기
//! - `collapse_whitespace()`: 연속 공백을 하나로 합치기

/// 텍스트의 단어 수를 계산합니다.
///
/// 공백(스페이스, 탭, 줄바꿈)으로 분리하여 단어를 셉니다.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// 텍스트의 문자 수를 계산합니다.
///
/// 유니코드 문자 단위로 셉니다.
/// `.len()`은 바이트 수를 반환하므로 ASCII가 아닌 문자에는 부적합합니다.
pub fn count_chars(text: &str) -> usize {
    text.chars().count()
}

/// 앞에서부터 최대 `max_chars`개의 문자를 잘라 미리보기를 만듭니다.
/// 잘린 경우에만 끝에 `...`을 붙입니다.
///
/// 바이트 인덱스로 자르면 멀티바이트 문자 중간에서 패닉이 나므로
/// `char_indices()`로 문자 경계를 찾습니다.
pub fn snippet(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// 모든 공백 덩어리를 스페이스 하나로 바꾸고 양끝 공백을 제거합니다.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_words_and_unicode_chars() {
        assert_eq!(count_words("  the gates\tof\nmorning "), 4);
        assert_eq!(count_chars("café"), 4);
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        assert_eq!(snippet("héllo wörld", 5), "héllo...");
        assert_eq!(snippet("short", 10), "short");
        assert_eq!(snippet("exact", 5), "exact");
    }

    #[test]
    fn collapses_runs_of_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\n b\t c  "), "a b c");
    }
}
