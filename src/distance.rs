use ndarray::ArrayView1;
use num_traits::Float;

use crate::error::{KMeansError, Result};

pub trait Distance<T> {
    fn euclidean_distance(&self, other: &T) -> Result<f64>;
}

impl<'a, 'b> Distance<ArrayView1<'b, f64>> for ArrayView1<'a, f64> {
    fn euclidean_distance(&self, other: &ArrayView1<'b, f64>) -> Result<f64> {
        euclidean_view(self.view(), other.view())
    }
}

/// Straight-line distance between two points of equal dimensionality.
///
/// NaN and infinite components are not special-cased and propagate into the result.
pub fn euclidean<T: Float>(us: &[T], them: &[T]) -> Result<T> {
    euclidean_view(ArrayView1::from(us), ArrayView1::from(them))
}

pub fn euclidean_view<T: Float>(us: ArrayView1<T>, them: ArrayView1<T>) -> Result<T> {
    if us.len() != them.len() {
        return Err(KMeansError::DimensionMismatch {
            expected: us.len(),
            found: them.len(),
        });
    }
    Ok(squared_euclidean_unchecked(us, them).sqrt())
}

/// Sum of squared component differences. Callers guarantee equal lengths.
pub(crate) fn squared_euclidean_unchecked<T: Float>(us: ArrayView1<T>, them: ArrayView1<T>) -> T {
    us.iter()
        .zip(them.iter())
        .map(|(&a, &b)| {
            let diff = a - b;
            diff * diff
        })
        .fold(T::zero(), |acc, sq| acc + sq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn three_four_five() {
        assert_abs_diff_eq!(euclidean(&[0.0, 0.0], &[3.0, 4.0]).unwrap(), 5.0);
    }

    #[test]
    fn identical_points_are_zero_apart() {
        assert_eq!(euclidean(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap(), 0.0);
    }

    #[test]
    fn mismatched_lengths_fail() {
        let err = euclidean(&[1.0f32, 2.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            KMeansError::DimensionMismatch {
                expected: 2,
                found: 3
            }
        ));
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn nan_propagates() {
        assert!(euclidean(&[f64::NAN, 0.0], &[0.0, 0.0]).unwrap().is_nan());
    }

    #[test]
    fn trait_agrees_with_free_function() {
        let a = array![1.0, -1.0];
        let b = array![4.0, 3.0];
        assert_abs_diff_eq!(a.view().euclidean_distance(&b.view()).unwrap(), 5.0);
        assert_abs_diff_eq!(
            a.view().euclidean_distance(&b.view()).unwrap(),
            euclidean(a.as_slice().unwrap(), b.as_slice().unwrap()).unwrap()
        );
    }
}
