//! k-means clustering over a small tabular dataset type.
//!
//! Samples are assigned to the nearest of `k` centroids by Euclidean distance and
//! centroids are moved to the mean of their samples until no sample changes
//! cluster. Initialization is pluggable through [`CentroidInitializer`].

pub mod algorithm;
pub mod assignment;
pub mod centroid;
pub mod cli;
pub mod dataset;
pub mod distance;
pub mod distance_matrix;
pub mod error;
pub mod inertia;
pub mod initialization;
pub mod load;
pub mod logger;
pub mod report;

pub use self::{
    algorithm::{kmeans, kmeans_with, Clustering, KMeans, KMeansConfig, KMeansRun, RunState},
    assignment::ClusterAssignment,
    centroid::{Centroid, EmptyClusterPolicy},
    dataset::{DataSet, SampleId},
    distance::euclidean,
    distance_matrix::DistanceMatrix,
    error::{KMeansError, Result},
    initialization::{CentroidInitializer, Fixed, KMeansPlusPlus, RandomRange},
};
