use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::assignment::ClusterAssignment;
use crate::centroid::{recompute_centroids, Centroid, EmptyClusterPolicy};
use crate::dataset::DataSet;
use crate::distance_matrix::DistanceMatrix;
use crate::error::{KMeansError, Result};
use crate::inertia::calculate_inertia;
use crate::initialization::{CentroidInitializer, RandomRange};

/// Settings for a clustering run.
#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Number of clusters
    pub k: usize,

    /// Iterations allowed before giving up with `NonConvergence`
    pub max_iters: usize,

    /// Seed for initialization and empty-cluster handling; `None` draws from entropy
    pub seed: Option<u64>,

    pub empty_cluster: EmptyClusterPolicy,

    /// Spread the distance matrix and centroid means over the rayon pool
    pub parallel: bool,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 2,
            max_iters: 300,
            seed: None,
            empty_cluster: EmptyClusterPolicy::default(),
            parallel: true,
        }
    }
}

impl KMeansConfig {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_empty_cluster(mut self, policy: EmptyClusterPolicy) -> Self {
        self.empty_cluster = policy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Where a run stands after its latest iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Converged,
}

/// Outcome of a converged run.
#[derive(Debug, Clone)]
pub struct Clustering {
    pub assignment: ClusterAssignment,
    pub centroids: Vec<Centroid>,
    pub iterations: usize,
    pub inertia: f64,
}

/// A single k-means run, advanced one iteration at a time.
pub struct KMeansRun<'a> {
    dataset: &'a DataSet,
    config: KMeansConfig,
    rng: StdRng,
    centroids: Vec<Centroid>,
    labels: Option<Vec<usize>>,
    assignment: Option<ClusterAssignment>,
    iteration: usize,
    state: RunState,
}

impl<'a> KMeansRun<'a> {
    pub fn new(
        dataset: &'a DataSet,
        config: KMeansConfig,
        initializer: &dyn CentroidInitializer,
    ) -> Result<Self> {
        validate(dataset, config.k)?;
        let mut rng = config.rng();
        let centroids = initializer.initialize(dataset, config.k, &mut rng)?;
        Self::from_centroids(dataset, config, centroids, rng)
    }

    /// Starts from explicit centroids; the rng only feeds the empty-cluster policy.
    pub fn with_centroids(
        dataset: &'a DataSet,
        config: KMeansConfig,
        centroids: Vec<Centroid>,
    ) -> Result<Self> {
        validate(dataset, config.k)?;
        let rng = config.rng();
        Self::from_centroids(dataset, config, centroids, rng)
    }

    fn from_centroids(
        dataset: &'a DataSet,
        config: KMeansConfig,
        centroids: Vec<Centroid>,
        rng: StdRng,
    ) -> Result<Self> {
        if centroids.len() != config.k {
            return Err(KMeansError::invalid(format!(
                "initializer produced {} centroids for k = {}",
                centroids.len(),
                config.k
            )));
        }
        if let Some(bad) = centroids.iter().find(|c| c.dim() != dataset.num_features()) {
            return Err(KMeansError::DimensionMismatch {
                expected: dataset.num_features(),
                found: bad.dim(),
            });
        }
        // Cluster ids follow position regardless of what the initializer tagged
        let centroids = centroids
            .into_iter()
            .enumerate()
            .map(|(cluster, c)| Centroid::new(cluster, c.values))
            .collect();

        Ok(Self {
            dataset,
            config,
            rng,
            centroids,
            labels: None,
            assignment: None,
            iteration: 0,
            state: RunState::Running,
        })
    }

    /// Assign, recompute centroids, compare with the previous assignment.
    ///
    /// The run converges once no sample changes cluster. If the empty-cluster
    /// policy moved a centroid this iteration, the run also requires that the
    /// moved centroid would not take any sample on the next pass.
    pub fn step(&mut self) -> Result<RunState> {
        self.iteration += 1;
        let parallel = self.config.parallel;

        let distances = DistanceMatrix::compute(self.dataset, &self.centroids, parallel)?;
        let labels = distances.nearest();

        let recomputed = recompute_centroids(
            self.dataset,
            &labels,
            &self.centroids,
            self.config.empty_cluster,
            &mut self.rng,
            self.iteration,
            parallel,
        )?;
        self.centroids = recomputed.centroids;

        let assignment = ClusterAssignment::new(self.dataset.index(), &labels);
        let changed = match &self.assignment {
            Some(previous) => assignment.changed_from(previous),
            None => assignment.len(),
        };
        log::debug!(
            "iteration {}: {} samples changed cluster",
            self.iteration,
            changed
        );

        let settled = changed == 0
            && (recomputed.relocated.is_empty() || self.keeps_labels(&labels)?);
        self.state = if self.assignment.is_some() && settled {
            RunState::Converged
        } else {
            RunState::Running
        };
        self.labels = Some(labels);
        self.assignment = Some(assignment);
        Ok(self.state)
    }

    /// Whether the current centroids would reproduce `labels`. A relocated
    /// centroid that only ties with a lower cluster id never takes a sample.
    fn keeps_labels(&self, labels: &[usize]) -> Result<bool> {
        let next = DistanceMatrix::compute(self.dataset, &self.centroids, self.config.parallel)?;
        Ok(next.nearest() == labels)
    }

    /// Steps until the assignment stops changing or `max_iters` is spent.
    pub fn run(&mut self) -> Result<()> {
        while self.state == RunState::Running {
            if self.iteration >= self.config.max_iters {
                log::warn!("no convergence after {} iterations", self.iteration);
                return Err(KMeansError::NonConvergence {
                    iterations: self.iteration,
                });
            }
            self.step()?;
        }
        log::info!("Converged after {} iterations", self.iteration);
        Ok(())
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn centroids(&self) -> &[Centroid] {
        &self.centroids
    }

    /// Labels from the latest iteration, `None` before the first step.
    pub fn labels(&self) -> Option<&[usize]> {
        self.labels.as_deref()
    }

    pub fn assignment(&self) -> Option<&ClusterAssignment> {
        self.assignment.as_ref()
    }

    pub fn into_clustering(self) -> Result<Clustering> {
        let (labels, assignment) = self
            .labels
            .zip(self.assignment)
            .ok_or_else(|| KMeansError::invalid("run has not completed an iteration"))?;
        let inertia = calculate_inertia(self.dataset, &self.centroids, &labels);
        Ok(Clustering {
            assignment,
            centroids: self.centroids,
            iterations: self.iteration,
            inertia,
        })
    }
}

fn validate(dataset: &DataSet, k: usize) -> Result<()> {
    if dataset.is_empty() {
        return Err(KMeansError::invalid("dataset has no samples"));
    }
    if k == 0 {
        return Err(KMeansError::invalid("k must be at least 1"));
    }
    if k > dataset.num_samples() {
        return Err(KMeansError::invalid(format!(
            "k = {} exceeds the {} samples in the dataset",
            k,
            dataset.num_samples()
        )));
    }
    Ok(())
}

/// k-means clusterer with a pluggable centroid initializer.
pub struct KMeans {
    config: KMeansConfig,
    initializer: Box<dyn CentroidInitializer>,
}

impl KMeans {
    pub fn new(config: KMeansConfig) -> Self {
        Self {
            config,
            initializer: Box::new(RandomRange),
        }
    }

    pub fn with_initializer(mut self, initializer: impl CentroidInitializer + 'static) -> Self {
        self.initializer = Box::new(initializer);
        self
    }

    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }

    pub fn fit(&self, dataset: &DataSet) -> Result<Clustering> {
        log::info!(
            "Starting KMeans with k = {} on {} samples x {} features",
            self.config.k,
            dataset.num_samples(),
            dataset.num_features()
        );
        let mut run = KMeansRun::new(dataset, self.config.clone(), self.initializer.as_ref())?;
        run.run()?;
        let clustering = run.into_clustering()?;
        log::info!("Finished KMeans - Inertia: {}", clustering.inertia);
        Ok(clustering)
    }
}

/// Clusters `dataset` into `k` groups from random starting centroids.
pub fn kmeans(dataset: &DataSet, k: usize) -> Result<ClusterAssignment> {
    Ok(KMeans::new(KMeansConfig::new(k)).fit(dataset)?.assignment)
}

/// As [`kmeans`], with a caller-supplied centroid initializer.
pub fn kmeans_with(
    dataset: &DataSet,
    k: usize,
    initializer: impl CentroidInitializer + 'static,
) -> Result<ClusterAssignment> {
    Ok(KMeans::new(KMeansConfig::new(k))
        .with_initializer(initializer)
        .fit(dataset)?
        .assignment)
}
