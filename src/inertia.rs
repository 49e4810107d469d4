use crate::centroid::Centroid;
use crate::dataset::DataSet;
use crate::distance::squared_euclidean_unchecked;

/// Within-cluster sum of squared distances.
pub fn calculate_inertia(dataset: &DataSet, centroids: &[Centroid], labels: &[usize]) -> f64 {
    labels
        .iter()
        .enumerate()
        .map(|(row, &cluster)| {
            squared_euclidean_unchecked(dataset.sample(row), centroids[cluster].view())
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn sums_squared_distances_to_own_centroid() {
        let ds = DataSet::new(array![[0.0, 0.0], [0.0, 2.0], [10.0, 10.0]]);
        let centroids = vec![
            Centroid::new(0, array![0.0, 1.0]),
            Centroid::new(1, array![10.0, 10.0]),
        ];
        assert_abs_diff_eq!(calculate_inertia(&ds, &centroids, &[0, 0, 1]), 2.0);
    }
}
