use std::collections::HashSet;
use std::fmt;

use itertools::Itertools;
use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::error::{KMeansError, Result};

/// Identifies a sample. Datasets built from raw rows are indexed by position,
/// datasets loaded with an id column carry the ids as keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SampleId {
    Position(usize),
    Key(String),
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleId::Position(pos) => write!(f, "{}", pos),
            SampleId::Key(key) => write!(f, "{}", key),
        }
    }
}

impl From<usize> for SampleId {
    fn from(pos: usize) -> Self {
        SampleId::Position(pos)
    }
}

impl From<&str> for SampleId {
    fn from(key: &str) -> Self {
        SampleId::Key(key.to_string())
    }
}

impl From<String> for SampleId {
    fn from(key: String) -> Self {
        SampleId::Key(key)
    }
}

/// A table of samples (rows) by named features (columns).
#[derive(Debug, Clone)]
pub struct DataSet {
    data: Array2<f64>,
    index: Vec<SampleId>,
    features: Vec<String>,
    labels: Option<Vec<String>>,
}

impl DataSet {
    pub fn new(data: Array2<f64>) -> Self {
        let index = (0..data.nrows()).map(SampleId::Position).collect();
        let features = (0..data.ncols()).map(|i| i.to_string()).collect();
        Self {
            data,
            index,
            features,
            labels: None,
        }
    }

    /// Builds a dataset from row vectors; every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let ncols = rows.first().map_or(0, |r| r.len());
        if let Some(bad) = rows.iter().find(|r| r.len() != ncols) {
            return Err(KMeansError::DimensionMismatch {
                expected: ncols,
                found: bad.len(),
            });
        }
        let nrows = rows.len();
        let flat = rows.into_iter().flatten().collect_vec();
        let data = Array2::from_shape_vec((nrows, ncols), flat)
            .map_err(|e| KMeansError::invalid(e.to_string()))?;
        Ok(Self::new(data))
    }

    pub fn with_index<I, S>(mut self, index: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<SampleId>,
    {
        let index = index.into_iter().map(Into::into).collect_vec();
        if index.len() != self.num_samples() {
            return Err(KMeansError::invalid(format!(
                "index has {} entries for {} samples",
                index.len(),
                self.num_samples()
            )));
        }
        if let Some(dup) = first_duplicate(&index) {
            return Err(KMeansError::invalid(format!("duplicate sample id {}", dup)));
        }
        self.index = index;
        Ok(self)
    }

    pub fn with_feature_names<I, S>(mut self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names.into_iter().map(Into::into).collect_vec();
        if names.len() != self.num_features() {
            return Err(KMeansError::invalid(format!(
                "{} feature names for {} features",
                names.len(),
                self.num_features()
            )));
        }
        self.features = names;
        Ok(self)
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels = labels.into_iter().map(Into::into).collect_vec();
        if labels.len() != self.num_samples() {
            return Err(KMeansError::invalid(format!(
                "{} labels for {} samples",
                labels.len(),
                self.num_samples()
            )));
        }
        self.labels = Some(labels);
        Ok(self)
    }

    pub fn num_samples(&self) -> usize {
        self.data.nrows()
    }

    pub fn num_features(&self) -> usize {
        self.data.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.num_samples() == 0
    }

    /// Feature names in column order.
    pub fn feature_list(&self) -> &[String] {
        &self.features
    }

    pub fn index(&self) -> &[SampleId] {
        &self.index
    }

    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref()
    }

    /// The underlying samples x features table.
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn sample(&self, row: usize) -> ArrayView1<'_, f64> {
        self.data.row(row)
    }

    /// Reduces every feature column to a single value.
    pub fn reduce_features<F>(&self, f: F) -> Array1<f64>
    where
        F: Fn(ArrayView1<f64>) -> f64,
    {
        self.data.map_axis(Axis(0), f)
    }

    /// Reduces every sample row to a single value.
    pub fn reduce_rows<F>(&self, f: F) -> Array1<f64>
    where
        F: Fn(ArrayView1<f64>) -> f64,
    {
        self.data.map_axis(Axis(1), f)
    }

    pub fn feature_min(&self) -> Array1<f64> {
        self.reduce_features(|col| col.iter().copied().fold(f64::INFINITY, f64::min))
    }

    pub fn feature_max(&self) -> Array1<f64> {
        self.reduce_features(|col| col.iter().copied().fold(f64::NEG_INFINITY, f64::max))
    }
}

fn first_duplicate(index: &[SampleId]) -> Option<&SampleId> {
    let mut seen = HashSet::with_capacity(index.len());
    index.iter().find(|id| !seen.insert(*id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn ragged_rows_are_rejected() {
        let err = DataSet::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(
            err,
            KMeansError::DimensionMismatch {
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn default_index_and_features_are_positional() {
        let ds = DataSet::new(array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(ds.index(), &[SampleId::Position(0), SampleId::Position(1)]);
        assert_eq!(ds.feature_list(), &["0", "1", "2"]);
        assert!(ds.labels().is_none());
    }

    #[test]
    fn reductions_follow_axes() {
        let ds = DataSet::new(array![[1.0, 8.0], [3.0, -2.0], [2.0, 5.0]]);
        assert_eq!(ds.feature_min(), array![1.0, -2.0]);
        assert_eq!(ds.feature_max(), array![3.0, 8.0]);
        assert_eq!(ds.reduce_rows(|row| row.sum()), array![9.0, 1.0, 7.0]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let ds = DataSet::new(array![[1.0], [2.0]]);
        let err = ds.with_index(["a", "a"]).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn metadata_lengths_are_checked() {
        let ds = DataSet::new(array![[1.0, 2.0], [3.0, 4.0]]);
        assert!(ds.clone().with_feature_names(["x"]).is_err());
        assert!(ds.clone().with_labels(["a", "b", "c"]).is_err());
        let ds = ds
            .with_index(["V01", "V02"])
            .unwrap()
            .with_feature_names(["x", "y"])
            .unwrap();
        assert_eq!(ds.index()[1], SampleId::Key("V02".into()));
        assert_eq!(ds.feature_list(), &["x", "y"]);
    }
}
