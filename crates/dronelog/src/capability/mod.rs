//! Host capabilities consumed while creating an observation.
//!
//! The journal never talks to camera or positioning hardware directly. It
//! requests permission and then asks for a photo reference or a position
//! through these traits; the host decides how to deliver them.

mod host;

use async_trait::async_trait;

use crate::error::Result;
use crate::record::Location;

pub use host::{FixedLocation, PhotoImportCamera};

/// Outcome of a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// The user allowed access.
    Granted,
    /// The user refused access.
    Denied,
}

impl Permission {
    /// Check if access was allowed.
    #[must_use]
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

impl From<bool> for Permission {
    fn from(granted: bool) -> Self {
        if granted {
            Self::Granted
        } else {
            Self::Denied
        }
    }
}

/// A source of photos.
#[async_trait]
pub trait Camera: Send + Sync {
    /// Ask the user for camera access.
    async fn request_permission(&self) -> Permission;

    /// Capture a photo and return an opaque local reference to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityUnavailable`](crate::Error::CapabilityUnavailable)
    /// if no photo could be taken.
    async fn capture(&self) -> Result<String>;
}

/// A source of the device's current position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Ask the user for location access.
    async fn request_permission(&self) -> Permission;

    /// Get the current position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityUnavailable`](crate::Error::CapabilityUnavailable)
    /// if positioning is switched off or has no fix.
    async fn current_position(&self) -> Result<Location>;
}
