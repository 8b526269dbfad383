//! Form state for creating an observation.
//!
//! [`NewObservation`] owns everything the creation surface needs: the text
//! being typed, the attached photo and position, the permission results and
//! the last message shown to the user.

use tracing::{debug, warn};

use crate::capability::{Camera, LocationProvider, Permission};
use crate::error::{Capability, Error, Result};
use crate::kv::KeyValueStore;
use crate::log_store::ObservationLog;
use crate::record::{Location, ObservationRecord};

/// In-progress observation being composed by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewObservation {
    description: String,
    image_uri: Option<String>,
    location: Option<Location>,
    message: Option<String>,
    camera_permission: Option<Permission>,
    location_permission: Option<Permission>,
}

impl NewObservation {
    /// Create an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask both capabilities for access and remember the answers.
    pub async fn request_permissions(
        &mut self,
        camera: &dyn Camera,
        locator: &dyn LocationProvider,
    ) {
        let camera_permission = camera.request_permission().await;
        let location_permission = locator.request_permission().await;
        debug!(?camera_permission, ?location_permission, "Permissions requested");
        self.camera_permission = Some(camera_permission);
        self.location_permission = Some(location_permission);
    }

    /// Replace the description text.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// The description as typed, untrimmed.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The attached photo reference.
    #[must_use]
    pub fn image_uri(&self) -> Option<&str> {
        self.image_uri.as_deref()
    }

    /// The attached position.
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// The last message for the user.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Camera permission, `None` until requested.
    #[must_use]
    pub fn camera_permission(&self) -> Option<Permission> {
        self.camera_permission
    }

    /// Location permission, `None` until requested.
    #[must_use]
    pub fn location_permission(&self) -> Option<Permission> {
        self.location_permission
    }

    /// Drop the attached photo so a new one can be taken.
    pub fn discard_picture(&mut self) {
        self.image_uri = None;
    }

    /// Take a photo and attach it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityDenied`] without calling the camera if access
    /// was not granted, or the camera's own error if capture fails. The form
    /// keeps its previous photo either way.
    pub async fn take_picture(&mut self, camera: &dyn Camera) -> Result<()> {
        if !self.camera_permission.is_some_and(Permission::is_granted) {
            self.message = Some("No camera access.".to_string());
            return Err(Error::CapabilityDenied {
                capability: Capability::Camera,
            });
        }

        match camera.capture().await {
            Ok(uri) => {
                debug!(uri = %uri, "Picture attached");
                self.image_uri = Some(uri);
                self.message = Some("Picture taken!".to_string());
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Picture capture failed");
                self.message = Some("Could not take picture. Try again.".to_string());
                Err(e)
            }
        }
    }

    /// Look up the current position and attach it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityDenied`] without calling the provider if
    /// access was not granted, or the provider's error if positioning fails.
    pub async fn fetch_location(&mut self, locator: &dyn LocationProvider) -> Result<()> {
        if !self.location_permission.is_some_and(Permission::is_granted) {
            self.message = Some("No location access.".to_string());
            return Err(Error::CapabilityDenied {
                capability: Capability::Location,
            });
        }

        match locator.current_position().await {
            Ok(location) if !location.is_valid() => {
                warn!(%location, "Location provider returned an invalid position");
                self.message =
                    Some("Could not get location. Make sure GPS is turned on.".to_string());
                Err(Error::unavailable(
                    Capability::Location,
                    format!("invalid position ({location})"),
                ))
            }
            Ok(location) => {
                debug!(%location, "Location attached");
                self.location = Some(location);
                self.message = Some("Location found!".to_string());
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Location lookup failed");
                self.message =
                    Some("Could not get location. Make sure GPS is turned on.".to_string());
                Err(e)
            }
        }
    }

    /// Build the record this form would save.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyObservation`] if the trimmed description is empty
    /// and neither a photo nor a location is attached.
    pub fn build_record(&self) -> Result<ObservationRecord> {
        let record =
            ObservationRecord::new(&self.description, self.image_uri.clone(), self.location);
        if record.has_content() {
            Ok(record)
        } else {
            Err(Error::EmptyObservation)
        }
    }

    /// Validate, append to the log and reset the form.
    ///
    /// Permissions survive the reset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyObservation`] or the log's append error. The form
    /// is left as it was so the user can retry.
    pub async fn save<S: KeyValueStore>(
        &mut self,
        log: &ObservationLog<S>,
    ) -> Result<ObservationRecord> {
        let record = match self.build_record() {
            Ok(record) => record,
            Err(e) => {
                self.message = Some(
                    "Add at least a description, a picture or a location.".to_string(),
                );
                return Err(e);
            }
        };

        if let Err(e) = log.append(record.clone()).await {
            warn!(error = %e, "Saving observation failed");
            self.message = Some("Error saving observation. Try again.".to_string());
            return Err(e);
        }

        self.description.clear();
        self.image_uri = None;
        self.location = None;
        self.message = Some("Observation saved!".to_string());
        Ok(record)
    }
}
