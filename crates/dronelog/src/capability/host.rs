use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use super::{Camera, LocationProvider, Permission};
use crate::error::{Capability, Error, Result};
use crate::record::Location;

/// Extension used when the imported file has none.
const DEFAULT_PHOTO_EXTENSION: &str = "jpg";

/// A camera that "captures" by importing an existing photo file.
///
/// The photo is copied into the photos directory under the BLAKE3 hash of its
/// bytes, so importing the same picture twice yields the same reference.
#[derive(Debug, Clone)]
pub struct PhotoImportCamera {
    enabled: bool,
    photos_dir: PathBuf,
    source: Option<PathBuf>,
}

impl PhotoImportCamera {
    /// Create a camera that stores photos in `photos_dir`.
    #[must_use]
    pub fn new(enabled: bool, photos_dir: impl Into<PathBuf>) -> Self {
        Self {
            enabled,
            photos_dir: photos_dir.into(),
            source: None,
        }
    }

    /// Set the photo file the next capture imports.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Directory imported photos are written to.
    #[must_use]
    pub fn photos_dir(&self) -> &Path {
        &self.photos_dir
    }

    async fn import(&self, source: &Path) -> Result<PathBuf> {
        let bytes = tokio::fs::read(source).await.map_err(|e| {
            Error::unavailable(
                Capability::Camera,
                format!("cannot read {}: {e}", source.display()),
            )
        })?;

        let extension = source
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or_else(|| DEFAULT_PHOTO_EXTENSION.to_string(), str::to_lowercase);
        let name = format!("{}.{extension}", blake3::hash(&bytes).to_hex());

        tokio::fs::create_dir_all(&self.photos_dir)
            .await
            .map_err(|source| Error::DirectoryCreate {
                path: self.photos_dir.clone(),
                source,
            })?;

        let target = self.photos_dir.join(name);
        if tokio::fs::try_exists(&target).await? {
            debug!("Photo already imported at {}", target.display());
        } else {
            tokio::fs::write(&target, &bytes).await?;
            info!("Imported photo {} to {}", source.display(), target.display());
        }

        Ok(tokio::fs::canonicalize(&target).await?)
    }
}

#[async_trait]
impl Camera for PhotoImportCamera {
    async fn request_permission(&self) -> Permission {
        Permission::from(self.enabled)
    }

    async fn capture(&self) -> Result<String> {
        if !self.enabled {
            return Err(Error::CapabilityDenied {
                capability: Capability::Camera,
            });
        }
        let Some(source) = &self.source else {
            return Err(Error::unavailable(Capability::Camera, "no photo to import"));
        };

        let path = self.import(source).await?;
        Ok(format!("file://{}", path.display()))
    }
}

/// A location provider reporting a known position.
///
/// Used where the host has no positioning hardware: the position comes from
/// configuration or the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation {
    enabled: bool,
    position: Option<Location>,
}

impl FixedLocation {
    /// Create a provider for `position`; `None` means no fix.
    #[must_use]
    pub fn new(enabled: bool, position: Option<Location>) -> Self {
        Self { enabled, position }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn request_permission(&self) -> Permission {
        Permission::from(self.enabled)
    }

    async fn current_position(&self) -> Result<Location> {
        if !self.enabled {
            return Err(Error::CapabilityDenied {
                capability: Capability::Location,
            });
        }
        self.position
            .ok_or_else(|| Error::unavailable(Capability::Location, "no position fix"))
    }
}
