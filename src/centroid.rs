use ndarray::{Array1, ArrayView1};
use rand::rngs::StdRng;
use rand::Rng;
use rayon::prelude::*;

use crate::dataset::DataSet;
use crate::error::{KMeansError, Result};

/// Representative point of one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct Centroid {
    pub cluster: usize,
    pub values: Array1<f64>,
}

impl Centroid {
    pub fn new(cluster: usize, values: Array1<f64>) -> Self {
        Self { cluster, values }
    }

    pub fn view(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    pub fn dim(&self) -> usize {
        self.values.len()
    }
}

/// What happens to a centroid whose cluster received no samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyClusterPolicy {
    /// Keep the previous centroid unchanged.
    RetainPrevious,
    /// Move the centroid onto a sample drawn from the run's seeded rng.
    #[default]
    RandomSample,
    /// Abort with `KMeansError::EmptyCluster`.
    Fail,
}

/// Running per-feature sum for one cluster.
#[derive(Debug, Clone)]
struct MeanAccumulator {
    sum: Array1<f64>,
    count: usize,
}

impl MeanAccumulator {
    fn new(dim: usize) -> Self {
        Self {
            sum: Array1::zeros(dim),
            count: 0,
        }
    }

    fn update_centroid(&mut self, data_point: ArrayView1<f64>) {
        self.sum += &data_point;
        self.count += 1;
    }

    fn finalize_centroid(self) -> Option<Array1<f64>> {
        if self.count == 0 {
            return None;
        }
        Some(self.sum / self.count as f64)
    }
}

/// Feature-by-feature mean of the samples labelled with each cluster id.
/// Clusters without members yield `None`.
pub fn mean_by_cluster(
    dataset: &DataSet,
    labels: &[usize],
    k: usize,
    parallel: bool,
) -> Vec<Option<Array1<f64>>> {
    let accumulate = |cluster: usize| {
        let mut acc = MeanAccumulator::new(dataset.num_features());
        for (row, _) in labels.iter().enumerate().filter(|(_, &l)| l == cluster) {
            acc.update_centroid(dataset.sample(row));
        }
        acc.finalize_centroid()
    };

    if parallel {
        (0..k).into_par_iter().map(accumulate).collect()
    } else {
        (0..k).map(accumulate).collect()
    }
}

/// Centroids produced by one update step.
#[derive(Debug, Clone)]
pub struct Recomputed {
    pub centroids: Vec<Centroid>,
    /// Empty clusters whose centroid the policy moved
    pub relocated: Vec<usize>,
}

/// Replaces every centroid with the mean of its members, applying `policy` to
/// clusters that ended up empty.
pub fn recompute_centroids(
    dataset: &DataSet,
    labels: &[usize],
    previous: &[Centroid],
    policy: EmptyClusterPolicy,
    rng: &mut StdRng,
    iteration: usize,
    parallel: bool,
) -> Result<Recomputed> {
    let means = mean_by_cluster(dataset, labels, previous.len(), parallel);

    let mut centroids = Vec::with_capacity(previous.len());
    let mut relocated = Vec::new();
    for (cluster, mean) in means.into_iter().enumerate() {
        let values = match mean {
            Some(values) => values,
            None => {
                log::warn!("cluster {} is empty in iteration {}", cluster, iteration);
                match policy {
                    EmptyClusterPolicy::RetainPrevious => previous[cluster].values.clone(),
                    EmptyClusterPolicy::RandomSample => {
                        let row = rng.gen_range(0..dataset.num_samples());
                        let values = dataset.sample(row).to_owned();
                        if values != previous[cluster].values {
                            relocated.push(cluster);
                        }
                        values
                    }
                    EmptyClusterPolicy::Fail => {
                        return Err(KMeansError::EmptyCluster { cluster, iteration })
                    }
                }
            }
        };
        centroids.push(Centroid::new(cluster, values));
    }

    Ok(Recomputed {
        centroids,
        relocated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;

    fn dataset() -> DataSet {
        DataSet::new(array![[0.0, 0.0], [2.0, 4.0], [10.0, 10.0]])
    }

    #[test]
    fn means_follow_labels() {
        let means = mean_by_cluster(&dataset(), &[0, 0, 1], 2, false);
        assert_eq!(means[0], Some(array![1.0, 2.0]));
        assert_eq!(means[1], Some(array![10.0, 10.0]));
    }

    #[test]
    fn parallel_means_match_sequential() {
        let ds = dataset();
        let labels = [1, 0, 1];
        assert_eq!(
            mean_by_cluster(&ds, &labels, 3, true),
            mean_by_cluster(&ds, &labels, 3, false)
        );
    }

    #[test]
    fn empty_cluster_keeps_previous_centroid() {
        let previous = vec![
            Centroid::new(0, array![0.0, 0.0]),
            Centroid::new(1, array![-5.0, -5.0]),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let recomputed = recompute_centroids(
            &dataset(),
            &[0, 0, 0],
            &previous,
            EmptyClusterPolicy::RetainPrevious,
            &mut rng,
            1,
            false,
        )
        .unwrap();
        assert_eq!(recomputed.centroids[0].values, array![4.0, 14.0 / 3.0]);
        assert_eq!(recomputed.centroids[1], previous[1]);
        assert!(recomputed.relocated.is_empty());
    }

    #[test]
    fn empty_cluster_random_sample_is_seeded() {
        let previous = vec![
            Centroid::new(0, array![0.0, 0.0]),
            Centroid::new(1, array![-5.0, -5.0]),
        ];
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            recompute_centroids(
                &dataset(),
                &[0, 0, 0],
                &previous,
                EmptyClusterPolicy::RandomSample,
                &mut rng,
                1,
                false,
            )
            .unwrap()
            .centroids
        };
        let first = run(3);
        assert_eq!(first, run(3));
        let ds = dataset();
        assert!(ds.data().rows().into_iter().any(|r| r == first[1].values));
    }

    #[test]
    fn empty_cluster_can_fail() {
        let previous = vec![
            Centroid::new(0, array![0.0, 0.0]),
            Centroid::new(1, array![-5.0, -5.0]),
        ];
        let mut rng = StdRng::seed_from_u64(0);
        let err = recompute_centroids(
            &dataset(),
            &[0, 0, 0],
            &previous,
            EmptyClusterPolicy::Fail,
            &mut rng,
            4,
            true,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            KMeansError::EmptyCluster {
                cluster: 1,
                iteration: 4
            }
        ));
    }
}
