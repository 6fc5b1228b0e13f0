//! Directory-backed `GameStorage`: one `<key>.json` file per key.
use geoblur_game::GameStorage;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        self.root.join(format!("{file}.json"))
    }
}

impl GameStorage for FileStorage {
    type Error = io::Error;

    fn load(&self, key: &str) -> Result<Option<String>, Self::Error> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), Self::Error> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.path_for(key), blob)
    }
}
