use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use crate::algorithm::Clustering;
use crate::dataset::DataSet;
use crate::error::Result;

#[derive(Debug, Clone, Serialize)]
pub struct CentroidReport {
    pub cluster: usize,
    pub size: usize,
    /// Coordinates keyed by feature name, in dataset column order
    pub values: IndexMap<String, f64>,
}

/// Summary of a finished run, written alongside the assignment.
#[derive(Debug, Clone, Serialize)]
pub struct ClusteringReport {
    pub k: usize,
    pub samples: usize,
    pub iterations: usize,
    pub inertia: f64,
    pub centroids: Vec<CentroidReport>,
}

impl ClusteringReport {
    pub fn new(dataset: &DataSet, clustering: &Clustering) -> Self {
        let k = clustering.centroids.len();
        let sizes = clustering.assignment.cluster_sizes(k);
        let centroids = clustering
            .centroids
            .iter()
            .map(|c| CentroidReport {
                cluster: c.cluster,
                size: sizes[c.cluster],
                values: dataset
                    .feature_list()
                    .iter()
                    .cloned()
                    .zip(c.values.iter().copied())
                    .collect(),
            })
            .collect();

        Self {
            k,
            samples: dataset.num_samples(),
            iterations: clustering.iterations,
            inertia: clustering.inertia,
            centroids,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{KMeans, KMeansConfig};
    use crate::initialization::Fixed;
    use ndarray::array;

    #[test]
    fn report_names_features_and_sizes() {
        let ds = DataSet::new(array![[0.0, 0.0], [0.0, 2.0], [9.0, 9.0]])
            .with_feature_names(["x", "y"])
            .unwrap();
        let clustering = KMeans::new(KMeansConfig::new(2))
            .with_initializer(Fixed(vec![vec![0.0, 0.0], vec![9.0, 9.0]]))
            .fit(&ds)
            .unwrap();
        let report = ClusteringReport::new(&ds, &clustering);
        assert_eq!(report.samples, 3);
        assert_eq!(report.centroids[0].size, 2);
        assert_eq!(report.centroids[0].values["y"], 1.0);

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["k"], 2);
        assert_eq!(json["centroids"][1]["values"]["x"], 9.0);
    }
}
