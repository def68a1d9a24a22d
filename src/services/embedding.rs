//! # 임베딩 서비스
//!
//! 텍스트를 벡터로 바꾸는 `Embedder` 포트와 두 가지 구현을 제공합니다.
//! - `GeminiEmbedder`: Gemini `embedContent` API 호출
//! - `LexicalEmbedder`: 네트워크 없이 단어를 해시해 고정 차원에 누적하는 결정적 임베딩.
//!   같은 텍스트는 항상 같은 벡터가 되고, 단어를 많이 공유할수록 가까워집니다.

use async_trait::async_trait;

use crate::error::AppError;
use crate::services::gemini::GeminiClient;

/// 텍스트 → 벡터 변환 기능
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError>;
}

pub struct GeminiEmbedder {
    client: GeminiClient,
}

impl GeminiEmbedder {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        self.client
            .embed(text)
            .await
            .map_err(|e| AppError::SearchFailure(format!("embedding request failed: {e}")))
    }
}

/// 해시된 bag-of-words 임베딩
pub struct LexicalEmbedder {
    dimensions: usize,
}

impl LexicalEmbedder {
    pub const DEFAULT_DIMENSIONS: usize = 256;

    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimensions];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            let bucket = (fnv1a(token.as_bytes()) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for LexicalEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIMENSIONS)
    }
}

#[async_trait]
impl Embedder for LexicalEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        Ok(self.embed_sync(text))
    }
}

/// 64비트 FNV-1a 해시.
///
/// 저장된 임베딩과 나중에 계산한 질의 임베딩이 같은 차원 버킷을 써야 하므로
/// 실행마다 값이 같은 해시가 필요합니다. `std::collections::hash_map::DefaultHasher`는
/// 알고리즘이 Rust 버전 사이에 바뀔 수 있어 DB에 남는 값에는 쓸 수 없습니다.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

/// 코사인 거리 = 1 - 코사인 유사도.
/// 차원이 다르거나 영벡터가 섞이면 비교할 수 없으므로 `f32::MAX`입니다.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::MAX;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return f32::MAX;
    }

    1.0 - (dot / (mag_a * mag_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_distance_basics() {
        assert!(cosine_distance(&[1.0, 0.0], &[2.0, 0.0]).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_distance(&[1.0], &[1.0, 0.0]), f32::MAX);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), f32::MAX);
    }

    #[test]
    fn lexical_embedding_is_deterministic_and_normalized() {
        let embedder = LexicalEmbedder::default();
        let a = embedder.embed_sync("The morning room was bright.");
        let b = embedder.embed_sync("the MORNING room was bright");
        assert_eq!(a, b);
        let norm = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn shared_words_are_closer_than_unrelated_text() {
        let embedder = LexicalEmbedder::default();
        let query = embedder.embed_sync("description of the morning room");
        let related = embedder.embed_sync("sunlight filled the morning room");
        let unrelated = embedder.embed_sync("storm waves broke over reef");
        assert!(cosine_distance(&query, &related) < cosine_distance(&query, &unrelated));
    }

    #[tokio::test]
    async fn empty_text_embeds_to_zero_vector() {
        let embedder = LexicalEmbedder::new(8);
        let vector = embedder.embed("  ...  ").await.unwrap();
        assert_eq!(vector, vec![0.0; 8]);
    }
}
