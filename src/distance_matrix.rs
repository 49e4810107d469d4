use std::cmp::Ordering;

use itertools::Itertools;
use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;

use crate::centroid::Centroid;
use crate::dataset::DataSet;
use crate::distance::Distance;
use crate::error::Result;

/// Distances from every sample (rows) to every centroid (columns).
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    distances: Array2<f64>,
}

impl DistanceMatrix {
    /// Rebuilt from scratch on every call.
    pub fn compute(dataset: &DataSet, centroids: &[Centroid], parallel: bool) -> Result<Self> {
        let n = dataset.num_samples();
        let k = centroids.len();

        let row_distances = |row: usize| -> Result<Vec<f64>> {
            let sample = dataset.sample(row);
            centroids
                .iter()
                .map(|c| sample.euclidean_distance(&c.view()))
                .collect()
        };

        let rows: Vec<Vec<f64>> = if parallel {
            (0..n).into_par_iter().map(row_distances).collect::<Result<_>>()?
        } else {
            (0..n).map(row_distances).collect::<Result<_>>()?
        };

        let mut distances = Array2::zeros((n, k));
        for (mut target, source) in distances.rows_mut().into_iter().zip(rows) {
            target.assign(&ArrayView1::from(&source));
        }
        Ok(Self { distances })
    }

    pub fn get(&self, sample: usize, cluster: usize) -> f64 {
        self.distances[[sample, cluster]]
    }

    pub fn shape(&self) -> (usize, usize) {
        self.distances.dim()
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.distances
    }

    /// Index of the closest centroid for each sample. Ties go to the lowest
    /// cluster id, and a NaN distance never beats a number.
    pub fn nearest(&self) -> Vec<usize> {
        self.distances
            .rows()
            .into_iter()
            .map(|row| row.iter().position_min_by(|a, b| compare_distance(a, b)).unwrap_or(0))
            .collect()
    }
}

fn compare_distance(a: &f64, b: &f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
    }
}
