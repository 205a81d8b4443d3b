use std::path::{Path, PathBuf};

use joyrun_common::ModelFormat;
use tracing::debug;

use crate::{AssetError, ModelData};

/// Where model bytes come from.
pub trait ModelSource: Send {
    fn fetch(&self, url: &str, format: ModelFormat) -> Result<ModelData, AssetError>;
}

/// Resolves model URLs as paths under a root directory.
#[derive(Debug, Clone)]
pub struct DirModelSource {
    root: PathBuf,
}

impl DirModelSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, url: &str) -> PathBuf {
        self.root.join(url.trim_start_matches('/'))
    }
}

impl ModelSource for DirModelSource {
    fn fetch(&self, url: &str, format: ModelFormat) -> Result<ModelData, AssetError> {
        let path = self.resolve(url);
        let bytes = std::fs::read(&path).map_err(|source| AssetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), bytes = bytes.len(), "Read model file");
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(url)
            .to_string();
        ModelData::decode(&bytes, format, &name)
    }
}
