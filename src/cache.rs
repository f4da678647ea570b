// Process-wide dataset cache
// The CSV is read from disk once; every later request shares the same table

use crate::dataset::Dataset;
use crate::error::DatasetResult;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

/// Memoizes the first successful load. Failed loads are not cached, so a
/// later call may retry.
#[derive(Debug, Default)]
pub struct DatasetCache {
    cell: OnceLock<Arc<Dataset>>,
    load_lock: Mutex<()>,
}

impl DatasetCache {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
            load_lock: Mutex::new(()),
        }
    }

    /// Return the cached dataset, loading it from `path` on first use
    pub fn get_or_load(&self, path: &Path) -> DatasetResult<Arc<Dataset>> {
        if let Some(dataset) = self.cell.get() {
            return Ok(Arc::clone(dataset));
        }

        // Serialize loaders so concurrent first calls read the file once
        let _guard = self
            .load_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(dataset) = self.cell.get() {
            return Ok(Arc::clone(dataset));
        }

        tracing::info!("Loading dataset from {}", path.display());
        let dataset = Arc::new(Dataset::load(path)?);
        let (rows, cols) = dataset.shape();
        tracing::info!("Loaded {} records, {} columns", rows, cols);

        Ok(Arc::clone(self.cell.get_or_init(|| dataset)))
    }

    pub fn get(&self) -> Option<Arc<Dataset>> {
        self.cell.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

static DATASET: DatasetCache = DatasetCache::new();

/// Shared accessor used by both front ends
pub fn load_data(path: &Path) -> DatasetResult<Arc<Dataset>> {
    DATASET.get_or_load(path)
}

/// Resolve a data path: as given, then relative to the crate directory where
/// the bundled dataset lives
pub fn resolve_data_path(path: &Path) -> PathBuf {
    if path.is_absolute() || path.exists() {
        return path.to_path_buf();
    }

    let bundled = Path::new(env!("CARGO_MANIFEST_DIR")).join(path);
    if bundled.exists() {
        tracing::debug!("Using bundled dataset at {}", bundled.display());
        return bundled;
    }

    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::SAMPLE_CSV;

    fn write_sample(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "healthcare_eda_{}_{}.csv",
            name,
            std::process::id()
        ));
        std::fs::write(&path, SAMPLE_CSV).unwrap();
        path
    }

    #[test]
    fn test_cache_loads_once() {
        let path = write_sample("once");
        let cache = DatasetCache::new();

        let first = cache.get_or_load(&path).unwrap();

        // Removing the file proves the second call never touches disk
        std::fs::remove_file(&path).unwrap();
        let second = cache.get_or_load(&path).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.shape(), (6, 10));
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let path = std::env::temp_dir().join(format!(
            "healthcare_eda_missing_{}.csv",
            std::process::id()
        ));
        let cache = DatasetCache::new();

        assert!(cache.get_or_load(&path).is_err());
        assert!(!cache.is_loaded());

        std::fs::write(&path, SAMPLE_CSV).unwrap();
        let loaded = cache.get_or_load(&path).unwrap();
        assert_eq!(loaded.shape().0, 6);
        assert!(cache.get().is_some());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_resolve_bundled_dataset() {
        let resolved = resolve_data_path(Path::new("healthcare_dataset.csv"));
        assert!(resolved.exists());
    }
}
