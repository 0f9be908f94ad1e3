/// File storage service - keeps uploaded media on disk, one directory per user
use crate::error::{Result, ServerError};
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, File};
use tunebox_core::UserId;

#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Initialize the storage root
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }

    /// Store uploaded bytes under the owner's directory
    pub async fn store(&self, owner: &UserId, filename: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(owner, filename)?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&path, data).await?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "Stored upload");
        Ok(path)
    }

    /// Resolve `<base>/<owner>/<filename>`
    ///
    /// Both parts must be a single plain path component.
    pub fn path_for(&self, owner: &UserId, filename: &str) -> Result<PathBuf> {
        let owner_dir = single_component(owner.as_str())?;
        let file = single_component(filename)?;
        Ok(self.base_path.join(owner_dir).join(file))
    }

    /// Open a stored file for reading
    pub async fn open(&self, owner: &UserId, filename: &str) -> Result<File> {
        let path = self.path_for(owner, filename)?;
        match File::open(&path).await {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ServerError::NotFound("File not found".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a stored file
    ///
    /// Returns `false` when there was nothing to delete.
    pub async fn delete(&self, owner: &UserId, filename: &str) -> Result<bool> {
        let path = self.path_for(owner, filename)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn single_component(name: &str) -> Result<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == name => Ok(name),
        _ => Err(ServerError::BadRequest(format!("Invalid path segment: {name:?}"))),
    }
}
