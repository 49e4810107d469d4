use itertools::Itertools;
use ndarray::{Array1, Array2, Zip};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::Rng;
use rayon::prelude::*;

use crate::centroid::Centroid;
use crate::dataset::DataSet;
use crate::distance::squared_euclidean_unchecked;
use crate::error::{KMeansError, Result};

/// Produces the starting centroids for a run.
///
/// Any `Fn(&DataSet, usize, &mut StdRng) -> Result<Vec<Centroid>>` closure is an
/// initializer, so callers can swap in their own seeding without touching the
/// clustering loop.
pub trait CentroidInitializer {
    fn initialize(&self, dataset: &DataSet, k: usize, rng: &mut StdRng) -> Result<Vec<Centroid>>;
}

impl<F> CentroidInitializer for F
where
    F: Fn(&DataSet, usize, &mut StdRng) -> Result<Vec<Centroid>>,
{
    fn initialize(&self, dataset: &DataSet, k: usize, rng: &mut StdRng) -> Result<Vec<Centroid>> {
        self(dataset, k, rng)
    }
}

fn check_request(dataset: &DataSet, k: usize) -> Result<()> {
    if k == 0 {
        return Err(KMeansError::invalid("k must be at least 1"));
    }
    if dataset.is_empty() {
        return Err(KMeansError::invalid("cannot initialize centroids for an empty dataset"));
    }
    Ok(())
}

/// Each coordinate drawn uniformly from the closed [min, max] range that
/// feature spans in the dataset. A constant feature yields that constant.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomRange;

impl CentroidInitializer for RandomRange {
    fn initialize(&self, dataset: &DataSet, k: usize, rng: &mut StdRng) -> Result<Vec<Centroid>> {
        create_random_centroids(dataset, k, rng)
    }
}

pub fn create_random_centroids(
    dataset: &DataSet,
    k: usize,
    rng: &mut StdRng,
) -> Result<Vec<Centroid>> {
    check_request(dataset, k)?;
    let mins = dataset.feature_min();
    let maxs = dataset.feature_max();

    let unit = Array2::random_using(
        (k, dataset.num_features()),
        Uniform::new_inclusive(0.0, 1.0),
        rng,
    );

    Ok(unit
        .rows()
        .into_iter()
        .enumerate()
        .map(|(cluster, u)| {
            let values = Zip::from(&u)
                .and(&mins)
                .and(&maxs)
                .map_collect(|&u, &lo, &hi| (lo + u * (hi - lo)).max(lo).min(hi));
            Centroid::new(cluster, values)
        })
        .collect_vec())
}

/// k-means++ seeding: the first centroid is a uniformly chosen sample, each
/// following one is a sample drawn with probability proportional to its
/// squared distance from the nearest centroid chosen so far.
///
/// `parallel` spreads the distance updates over the rayon pool; the draws are
/// the same either way.
#[derive(Debug, Clone, Copy)]
pub struct KMeansPlusPlus {
    pub parallel: bool,
}

impl KMeansPlusPlus {
    pub fn new(parallel: bool) -> Self {
        Self { parallel }
    }
}

impl Default for KMeansPlusPlus {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CentroidInitializer for KMeansPlusPlus {
    fn initialize(&self, dataset: &DataSet, k: usize, rng: &mut StdRng) -> Result<Vec<Centroid>> {
        kmeans_plusplus(dataset, k, rng, self.parallel)
    }
}

pub fn kmeans_plusplus(
    dataset: &DataSet,
    k: usize,
    rng: &mut StdRng,
    parallel: bool,
) -> Result<Vec<Centroid>> {
    check_request(dataset, k)?;
    let n = dataset.num_samples();

    let first_idx = rng.gen_range(0..n);
    let mut centroids = vec![Centroid::new(0, dataset.sample(first_idx).to_owned())];

    let mut min_distances = vec![f64::MAX; n];

    for cluster in 1..k {
        let last: Array1<f64> = centroids[cluster - 1].values.clone();
        let update = |(idx, min_dist): (usize, &mut f64)| {
            let distance = squared_euclidean_unchecked(dataset.sample(idx), last.view());
            *min_dist = min_dist.min(distance);
        };
        if parallel {
            min_distances.par_iter_mut().enumerate().for_each(update);
        } else {
            min_distances.iter_mut().enumerate().for_each(update);
        }

        // All weights zero means every sample already sits on a centroid
        let next_idx = match WeightedIndex::new(&min_distances) {
            Ok(dist) => dist.sample(rng),
            Err(_) => rng.gen_range(0..n),
        };
        centroids.push(Centroid::new(cluster, dataset.sample(next_idx).to_owned()));
    }

    Ok(centroids)
}

/// Caller-chosen starting coordinates, for reproducible runs.
#[derive(Debug, Clone, Default)]
pub struct Fixed(pub Vec<Vec<f64>>);

impl CentroidInitializer for Fixed {
    fn initialize(&self, dataset: &DataSet, k: usize, _rng: &mut StdRng) -> Result<Vec<Centroid>> {
        check_request(dataset, k)?;
        if self.0.len() != k {
            return Err(KMeansError::invalid(format!(
                "{} fixed centroids supplied for k = {}",
                self.0.len(),
                k
            )));
        }
        Ok(self
            .0
            .iter()
            .enumerate()
            .map(|(cluster, values)| Centroid::new(cluster, Array1::from(values.clone())))
            .collect())
    }
}
