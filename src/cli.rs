use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use crate::algorithm::{KMeans, KMeansConfig};
use crate::centroid::EmptyClusterPolicy;
use crate::initialization::{KMeansPlusPlus, RandomRange};
use crate::load::CsvOptions;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitMethod {
    /// Uniform within each feature's observed range
    Random,
    /// k-means++ seeding
    #[value(name = "kmeans++")]
    KMeansPlusPlus,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyCluster {
    /// Keep the previous centroid
    Retain,
    /// Move the centroid onto a random sample
    RandomSample,
    /// Stop with an error
    Fail,
}

impl From<EmptyCluster> for EmptyClusterPolicy {
    fn from(value: EmptyCluster) -> Self {
        match value {
            EmptyCluster::Retain => EmptyClusterPolicy::RetainPrevious,
            EmptyCluster::RandomSample => EmptyClusterPolicy::RandomSample,
            EmptyCluster::Fail => EmptyClusterPolicy::Fail,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "pml-kmeans")]
#[command(about = "k-means clustering of tabular data")]
#[command(version)]
pub struct Cli {
    /// Input CSV
    #[arg(short, long, help_heading = "I/O")]
    pub input: PathBuf,

    /// Output assignment CSV (default stdout)
    #[arg(short, long, help_heading = "I/O")]
    pub output: Option<PathBuf>,

    /// JSON summary of centroids and cluster sizes
    #[arg(long, help_heading = "I/O")]
    pub report: Option<PathBuf>,

    /// First column is not a sample id
    #[arg(long, default_value_t = false, help_heading = "I/O")]
    pub no_ids: bool,

    /// First row is data, not column names
    #[arg(long, default_value_t = false, help_heading = "I/O")]
    pub no_header: bool,

    /// Last column is a class label and is not clustered
    #[arg(long, default_value_t = false, help_heading = "I/O")]
    pub labels: bool,

    /// Field delimiter
    #[arg(long, default_value_t = ',', help_heading = "I/O")]
    pub delimiter: char,

    /// Number of clusters
    #[arg(short, default_value_t = 2, help_heading = "Clustering")]
    pub k: usize,

    /// Iterations allowed before reporting non-convergence
    #[arg(long, default_value_t = 300, help_heading = "Clustering")]
    pub max_iters: usize,

    /// Random seed (default from entropy)
    #[arg(long, help_heading = "Clustering")]
    pub seed: Option<u64>,

    /// Centroid initialization
    #[arg(long, value_enum, default_value_t = InitMethod::Random, help_heading = "Clustering")]
    pub init: InitMethod,

    /// Handling of clusters that receive no samples
    #[arg(long, value_enum, default_value_t = EmptyCluster::RandomSample, help_heading = "Clustering")]
    pub empty_cluster: EmptyCluster,

    /// Single-threaded distance and centroid computation
    #[arg(long, default_value_t = false, help_heading = "Clustering")]
    pub sequential: bool,

    /// Verbose logging
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

impl Cli {
    /// Validate command line arguments
    pub fn validate(&self) -> bool {
        let mut is_ok = true;

        is_ok &= validate_file(&self.input, "--input");

        if self.k < 1 {
            log::error!("-k must be at least 1");
            is_ok = false;
        }

        if self.max_iters < 1 {
            log::error!("--max-iters must be at least 1");
            is_ok = false;
        }

        if !self.delimiter.is_ascii() {
            log::error!("--delimiter must be a single ascii character");
            is_ok = false;
        }

        if self.seed.is_none() {
            log::warn!("no --seed given, results will not be reproducible");
        }

        is_ok
    }

    pub fn csv_options(&self) -> CsvOptions {
        CsvOptions {
            has_ids: !self.no_ids,
            has_header: !self.no_header,
            has_labels: self.labels,
            delimiter: self.delimiter as u8,
        }
    }

    pub fn config(&self) -> KMeansConfig {
        let mut config = KMeansConfig::new(self.k)
            .with_max_iters(self.max_iters)
            .with_empty_cluster(self.empty_cluster.into())
            .with_parallel(!self.sequential);
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }

    pub fn build_kmeans(&self) -> KMeans {
        let kmeans = KMeans::new(self.config());
        match self.init {
            InitMethod::Random => kmeans.with_initializer(RandomRange),
            InitMethod::KMeansPlusPlus => {
                kmeans.with_initializer(KMeansPlusPlus::new(!self.sequential))
            }
        }
    }
}

/// Helper function to validate a file's existence and type
fn validate_file(path: &Path, label: &str) -> bool {
    if !path.exists() {
        log::error!("{} does not exist", label);
        return false;
    }
    if !path.is_file() {
        log::error!("{} is not a file", label);
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["pml-kmeans", "--input", "data.csv"]).unwrap();
        assert_eq!(cli.k, 2);
        assert_eq!(cli.init, InitMethod::Random);
        let options = cli.csv_options();
        assert!(options.has_ids && options.has_header && !options.has_labels);
        let config = cli.config();
        assert_eq!(config.max_iters, 300);
        assert_eq!(config.empty_cluster, EmptyClusterPolicy::RandomSample);
        assert!(config.parallel);
        assert!(config.seed.is_none());
    }

    #[test]
    fn clustering_flags() {
        let cli = Cli::try_parse_from([
            "pml-kmeans",
            "-i",
            "data.csv",
            "-k",
            "4",
            "--seed",
            "17",
            "--init",
            "kmeans++",
            "--empty-cluster",
            "retain",
            "--sequential",
            "--no-ids",
            "--delimiter",
            ";",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.k, 4);
        assert_eq!(config.seed, Some(17));
        assert_eq!(config.empty_cluster, EmptyClusterPolicy::RetainPrevious);
        assert!(!config.parallel);
        assert_eq!(cli.init, InitMethod::KMeansPlusPlus);
        assert_eq!(cli.csv_options().delimiter, b';');
        assert!(!cli.csv_options().has_ids);
    }

    #[test]
    fn missing_input_fails_validation() {
        let cli = Cli::try_parse_from(["pml-kmeans", "-i", "/definitely/not/here.csv"]).unwrap();
        assert!(!cli.validate());
    }
}
