//! Reading named files relative to a build workspace using `tokio::fs`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{StepError, StepResult};
use crate::parsing::{ParameterFile, ParameterFileFormat};

/// Resolves file names against a fixed workspace root.
#[derive(Debug, Clone)]
pub struct WorkspaceReader {
    root: PathBuf,
}

impl WorkspaceReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the raw bytes of `name`. Absolute names are used as given.
    pub async fn read(&self, name: impl AsRef<Path>) -> StepResult<Vec<u8>> {
        let path = self.root.join(name.as_ref());
        fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StepError::FileNotFound(path.clone()),
            _ => StepError::Io {
                path: path.clone(),
                source: e,
            },
        })
    }

    /// Read a parameter file, rejecting unsupported extensions before touching the disk.
    pub async fn load_parameter_file(&self, name: &str) -> StepResult<ParameterFile> {
        ParameterFileFormat::from_path(name)?;
        let content = self.read(name).await?;
        Ok(ParameterFile::new(name, content))
    }
}
