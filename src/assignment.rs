use indexmap::IndexMap;

use crate::dataset::SampleId;

/// Which cluster each sample belongs to, in dataset order.
///
/// Two assignments compare equal when every sample id maps to the same cluster,
/// regardless of the order the samples were inserted in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterAssignment {
    clusters: IndexMap<SampleId, usize>,
}

impl ClusterAssignment {
    pub fn new(index: &[SampleId], labels: &[usize]) -> Self {
        Self {
            clusters: index.iter().cloned().zip(labels.iter().copied()).collect(),
        }
    }

    pub fn get(&self, id: &SampleId) -> Option<usize> {
        self.clusters.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SampleId, usize)> {
        self.clusters.iter().map(|(id, &c)| (id, c))
    }

    /// Cluster ids in insertion order.
    pub fn labels(&self) -> Vec<usize> {
        self.clusters.values().copied().collect()
    }

    pub fn cluster_sizes(&self, k: usize) -> Vec<usize> {
        let mut sizes = vec![0; k];
        for &c in self.clusters.values() {
            if c < k {
                sizes[c] += 1;
            }
        }
        sizes
    }

    /// Number of samples whose cluster differs from `other`, counting samples
    /// missing on either side as changed.
    pub fn changed_from(&self, other: &ClusterAssignment) -> usize {
        let differing = self
            .clusters
            .iter()
            .filter(|(id, &c)| other.get(id) != Some(c))
            .count();
        let missing = other
            .clusters
            .keys()
            .filter(|id| !self.clusters.contains_key(*id))
            .count();
        differing + missing
    }
}

impl<'a> IntoIterator for &'a ClusterAssignment {
    type Item = (&'a SampleId, &'a usize);
    type IntoIter = indexmap::map::Iter<'a, SampleId, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.clusters.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(keys: &[&str]) -> Vec<SampleId> {
        keys.iter().map(|&k| SampleId::from(k)).collect()
    }

    #[test]
    fn equality_ignores_order() {
        let a = ClusterAssignment::new(&ids(&["a", "b", "c"]), &[0, 1, 1]);
        let b = ClusterAssignment::new(&ids(&["c", "a", "b"]), &[1, 0, 1]);
        assert_eq!(a, b);
        assert_eq!(a.changed_from(&b), 0);
    }

    #[test]
    fn counts_changes() {
        let a = ClusterAssignment::new(&ids(&["a", "b", "c"]), &[0, 1, 1]);
        let b = ClusterAssignment::new(&ids(&["a", "b", "d"]), &[0, 0, 1]);
        assert_ne!(a, b);
        // b moved, c missing from b, d missing from a
        assert_eq!(a.changed_from(&b), 3);
    }

    #[test]
    fn sizes_and_lookup() {
        let a = ClusterAssignment::new(&ids(&["a", "b", "c"]), &[0, 2, 0]);
        assert_eq!(a.cluster_sizes(3), vec![2, 0, 1]);
        assert_eq!(a.get(&SampleId::from("b")), Some(2));
        assert_eq!(a.labels(), vec![0, 2, 0]);
    }
}
