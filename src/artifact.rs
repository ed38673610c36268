//! Process-lifetime artifact cache keyed by path

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use polars::prelude::DataFrame;
use tracing::{debug, info};

use crate::cluster::{load_cluster_summary, ClusterSummary};
use crate::data::load_employee_data;
use crate::error::DashboardError;
use crate::evaluation::{load_evaluation, EvaluationBundle};

/// Loads each path at most once until it is invalidated.
///
/// Failed loads are not cached, so a corrected file is picked up on the next
/// request. Edits to an already cached file are not.
#[derive(Debug)]
pub struct ArtifactCache<T> {
    entries: HashMap<PathBuf, Arc<T>>,
}

impl<T> Default for ArtifactCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> ArtifactCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load<F>(&mut self, path: &Path, load: F) -> Result<Arc<T>, DashboardError>
    where
        F: FnOnce(&Path) -> Result<T, DashboardError>,
    {
        if let Some(hit) = self.entries.get(path) {
            return Ok(Arc::clone(hit));
        }

        let value = Arc::new(load(path)?);
        debug!(path = %path.display(), "cached artifact");
        self.entries.insert(path.to_path_buf(), Arc::clone(&value));
        Ok(value)
    }

    /// Drop one entry. Returns whether it was cached.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The three artifact kinds the dashboard reads
#[derive(Debug, Default)]
pub struct Artifacts {
    employees: ArtifactCache<DataFrame>,
    evaluations: ArtifactCache<EvaluationBundle>,
    clusters: ArtifactCache<ClusterSummary>,
}

impl Artifacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn employees(&mut self, path: &Path) -> Result<Arc<DataFrame>, DashboardError> {
        self.employees.get_or_load(path, load_employee_data)
    }

    pub fn evaluation(&mut self, path: &Path) -> Result<Arc<EvaluationBundle>, DashboardError> {
        self.evaluations.get_or_load(path, load_evaluation)
    }

    /// Cluster summary as stored, before relabeling
    pub fn clusters(&mut self, path: &Path) -> Result<Arc<ClusterSummary>, DashboardError> {
        self.clusters.get_or_load(path, load_cluster_summary)
    }

    pub fn invalidate(&mut self, path: &Path) -> bool {
        // Bitwise or: every cache must drop the path
        self.employees.invalidate(path)
            | self.evaluations.invalidate(path)
            | self.clusters.invalidate(path)
    }

    pub fn clear(&mut self) {
        self.employees.clear();
        self.evaluations.clear();
        self.clusters.clear();
        info!("artifact cache cleared");
    }

    pub fn cached(&self) -> usize {
        self.employees.len() + self.evaluations.len() + self.clusters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_loads_once_per_path() {
        let calls = Cell::new(0);
        let mut cache = ArtifactCache::new();
        let load = |_: &Path| {
            calls.set(calls.get() + 1);
            Ok(42)
        };

        let first = cache.get_or_load(Path::new("a.csv"), load).unwrap();
        let second = cache.get_or_load(Path::new("a.csv"), load).unwrap();
        assert_eq!((*first, *second), (42, 42));
        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));

        cache.get_or_load(Path::new("b.csv"), load).unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let mut cache: ArtifactCache<u32> = ArtifactCache::new();
        let path = Path::new("gone.csv");

        let err = cache
            .get_or_load(path, |p| {
                Err(DashboardError::ArtifactNotFound {
                    path: p.to_path_buf(),
                })
            })
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(!cache.contains(path));

        assert_eq!(*cache.get_or_load(path, |_| Ok(7)).unwrap(), 7);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let mut cache = ArtifactCache::new();
        cache.get_or_load(Path::new("a"), |_| Ok(1)).unwrap();
        cache.get_or_load(Path::new("b"), |_| Ok(2)).unwrap();

        assert!(cache.invalidate(Path::new("a")));
        assert!(!cache.invalidate(Path::new("a")));
        assert_eq!(*cache.get_or_load(Path::new("a"), |_| Ok(10)).unwrap(), 10);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_artifacts_reload_after_clear() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Age,Attrition").unwrap();
        writeln!(file, "30,Yes").unwrap();
        file.flush().unwrap();

        let mut artifacts = Artifacts::new();
        assert_eq!(artifacts.employees(file.path()).unwrap().height(), 1);

        writeln!(file, "40,No").unwrap();
        file.flush().unwrap();
        assert_eq!(artifacts.employees(file.path()).unwrap().height(), 1);
        assert_eq!(artifacts.cached(), 1);

        artifacts.clear();
        assert_eq!(artifacts.employees(file.path()).unwrap().height(), 2);
    }

    #[test]
    fn test_invalidate_reloads_only_that_path() {
        let mut first = NamedTempFile::new().unwrap();
        let mut second = NamedTempFile::new().unwrap();
        for file in [&mut first, &mut second] {
            writeln!(file, "Age,Attrition").unwrap();
            writeln!(file, "30,Yes").unwrap();
            file.flush().unwrap();
        }

        let mut artifacts = Artifacts::new();
        artifacts.employees(first.path()).unwrap();
        artifacts.employees(second.path()).unwrap();

        for file in [&mut first, &mut second] {
            writeln!(file, "40,No").unwrap();
            file.flush().unwrap();
        }

        assert!(artifacts.invalidate(first.path()));
        assert!(!artifacts.invalidate(first.path()));
        assert_eq!(artifacts.cached(), 1);

        assert_eq!(artifacts.employees(first.path()).unwrap().height(), 2);
        assert_eq!(artifacts.employees(second.path()).unwrap().height(), 1);
    }
}
