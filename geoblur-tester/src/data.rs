//! Loads the catalog and config from disk, falling back to the bundled data.
use geoblur_game::{CatalogError, ConfigError, CountryCatalog, DataLoader, GameConfig};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataFileError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Default)]
pub struct FileDataLoader {
    pub catalog_path: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
}

impl FileDataLoader {
    pub const fn new(catalog_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Self {
        Self {
            catalog_path,
            config_path,
        }
    }
}

fn read(path: &Path) -> Result<String, DataFileError> {
    fs::read_to_string(path).map_err(|source| DataFileError::Read {
        path: path.display().to_string(),
        source,
    })
}

impl DataLoader for FileDataLoader {
    type Error = DataFileError;

    fn load_countries(&self) -> Result<CountryCatalog, Self::Error> {
        let catalog = match &self.catalog_path {
            Some(path) => CountryCatalog::from_json(&read(path)?)?,
            None => CountryCatalog::bundled()?,
        };
        Ok(catalog)
    }

    fn load_config(&self) -> Result<GameConfig, Self::Error> {
        let config = match &self.config_path {
            Some(path) => GameConfig::from_json(&read(path)?)?,
            None => GameConfig::default(),
        };
        Ok(config)
    }
}
