use crate::error::EmbeddingError;

/// Cosine similarity in [-1, 1].
///
/// A zero-norm side yields 0. Comparing vectors of different length is a data-integrity bug
/// upstream and panics; boundary code that cannot guarantee lengths should use
/// [`try_cosine_similarity`].
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    assert_eq!(
        a.len(),
        b.len(),
        "cosine_similarity called with vectors of different length"
    );

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

pub fn try_cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, EmbeddingError> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(cosine_similarity(a, b))
}

/// Map a raw cosine value from [-1, 1] onto [0, 1].
pub fn rescale_unit(similarity: f64) -> f64 {
    (similarity + 1.0) / 2.0
}

/// Element-wise arithmetic mean. `None` for an empty input or ragged lengths.
pub fn mean_pool(vectors: &[Vec<f32>]) -> Option<Vec<f32>> {
    let first = vectors.first()?;
    let dimension = first.len();
    if vectors.iter().any(|v| v.len() != dimension) {
        tracing::warn!(dimension, "mean_pool called with ragged vectors");
        return None;
    }

    let mut sum = vec![0.0f64; dimension];
    for vector in vectors {
        for (acc, value) in sum.iter_mut().zip(vector.iter()) {
            *acc += f64::from(*value);
        }
    }

    let count = vectors.len() as f64;
    Some(sum.into_iter().map(|v| (v / count) as f32).collect())
}

/// L2-normalize in place; zero vectors stay zero.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}
