//! Process-wide dataset holder.
//!
//! The table is read at most once per process: the first successful
//! [`DatasetStore::load`] populates it, concurrent first calls wait on the same
//! initialisation, and every later call (with any preview size) reuses it.
//! After loading the table is immutable and handed out as `Arc<Table>`.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::data::preprocess::preprocess;
use crate::domain::{DatasetConfig, Table};
use crate::error::AppError;
use crate::io::ingest::read_table;

pub const NOT_LOADED: &str = "Dataset is not loaded.";
pub const FILE_MISSING: &str = "File does not exist.";

#[derive(Debug)]
pub struct DatasetStore {
    config: DatasetConfig,
    table: OnceCell<Arc<Table>>,
}

impl DatasetStore {
    pub fn new(config: DatasetConfig) -> Self {
        Self {
            config,
            table: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.table.initialized()
    }

    /// Return the dataset, reading and preprocessing it on first use.
    ///
    /// The source file must exist on every call, even once loaded.
    pub async fn load(&self) -> Result<Arc<Table>, AppError> {
        if !self.config.path.exists() {
            return Err(AppError::precondition(FILE_MISSING));
        }

        let table = self
            .table
            .get_or_try_init(|| async {
                let config = self.config.clone();
                tracing::info!(path = %config.path.display(), "Loading the full dataset into memory.");
                let table = tokio::task::spawn_blocking(move || load_table(&config))
                    .await
                    .map_err(|e| AppError::failed(format!("Dataset loader task failed: {e}")))??;
                tracing::info!(
                    rows = table.n_rows(),
                    columns = table.n_columns(),
                    "dataset loaded"
                );
                Ok::<_, AppError>(Arc::new(table))
            })
            .await?;

        Ok(Arc::clone(table))
    }

    /// Return the dataset if it has been loaded.
    pub fn get(&self) -> Result<Arc<Table>, AppError> {
        self.table
            .get()
            .cloned()
            .ok_or_else(|| AppError::precondition(NOT_LOADED))
    }
}

/// Read and preprocess the configured file (blocking).
pub fn load_table(config: &DatasetConfig) -> Result<Table, AppError> {
    let raw = read_table(config)?;
    Ok(preprocess(raw, &config.date_column, &config.date_format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;

    fn fixture() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Date,Time,Global_active_power").unwrap();
        writeln!(file, "1/1/2020,00:00:00,1.0").unwrap();
        writeln!(file, "not-a-date,00:01:00,2.0").unwrap();
        writeln!(file, "2/1/2020,00:00:00,?").unwrap();
        file.flush().unwrap();
        file
    }

    fn store_for(path: &std::path::Path) -> DatasetStore {
        DatasetStore::new(DatasetConfig {
            path: path.to_path_buf(),
            ..DatasetConfig::default()
        })
    }

    #[tokio::test]
    async fn get_before_load_is_a_precondition_error() {
        let file = fixture();
        let store = store_for(file.path());
        let err = store.get().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert_eq!(err.message(), NOT_LOADED);
    }

    #[tokio::test]
    async fn load_is_idempotent() {
        let file = fixture();
        let store = store_for(file.path());
        let first = store.load().await.unwrap();
        assert_eq!(first.n_rows(), 2);

        let second = store.load().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &store.get().unwrap()));
    }

    #[tokio::test]
    async fn concurrent_first_loads_share_one_table() {
        let file = fixture();
        let store = store_for(file.path());
        let (a, b) = tokio::join!(store.load(), store.load());
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(Arc::ptr_eq(&a, &b));
        assert!(store.is_loaded());
    }

    #[tokio::test]
    async fn missing_file_is_a_precondition_error() {
        let store = store_for(std::path::Path::new("/definitely/not/here.csv"));
        let err = store.load().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert_eq!(err.message(), FILE_MISSING);
        assert!(!store.is_loaded());
    }
}
