use bioblock_common::{BioBlockError, Result};
use ndarray::ArrayView1;

/// Squared Euclidean distance (L2²). Lower is more similar.
pub fn squared_l2(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(BioBlockError::vector_store(format!(
            "Embedding dimension mismatch: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let diff = &ArrayView1::from(a) - &ArrayView1::from(b);
    Ok(diff.dot(&diff))
}

/// Bounded similarity from a distance: `1 / (1 + d)`, in (0, 1] for d >= 0.
///
/// A negative or non-finite distance is a store anomaly and is rejected.
pub fn score_from_distance(distance: f32) -> Result<f64> {
    if !distance.is_finite() || distance < 0.0 {
        return Err(BioBlockError::vector_store(format!(
            "Store returned invalid distance {}",
            distance
        )));
    }
    Ok(1.0 / (1.0 + f64::from(distance)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_l2() {
        assert_eq!(squared_l2(&[0.0, 0.0], &[3.0, 4.0]).unwrap(), 25.0);
        assert_eq!(squared_l2(&[1.0, 2.0], &[1.0, 2.0]).unwrap(), 0.0);
        assert!(squared_l2(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_score_at_zero_is_one() {
        assert_eq!(score_from_distance(0.0).unwrap(), 1.0);
    }

    #[test]
    fn test_score_bounded_and_decreasing() {
        let distances = [0.0f32, 0.001, 0.5, 1.0, 2.0, 10.0, 1e6, f32::MAX];
        let scores: Vec<f64> = distances
            .iter()
            .map(|d| score_from_distance(*d).unwrap())
            .collect();

        for (d, s) in distances.iter().zip(&scores) {
            assert!(*s > 0.0 && *s <= 1.0, "score({}) = {}", d, s);
            assert!((s - 1.0 / (1.0 + f64::from(*d))).abs() < 1e-12);
        }
        for pair in scores.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }

    #[test]
    fn test_negative_distance_rejected() {
        assert!(score_from_distance(-0.1).is_err());
        assert!(score_from_distance(f32::NAN).is_err());
    }

    #[test]
    fn test_infinite_distance_rejected() {
        // f32 overflow on large unnormalized vectors
        let far = squared_l2(&[0.0], &[1e20]).unwrap();
        assert!(far.is_infinite());
        assert!(score_from_distance(far).is_err());
        assert!(score_from_distance(f32::INFINITY).is_err());
    }
}
