//! Error types for the choreography core.
//!
//! Almost every failure in the scene is absorbed locally with a fallback
//! (lost hand tracking, missing photos, a degenerate rig matrix). The errors
//! here cover the few operations a host can actually get wrong: feeding photo
//! content that does not decode, and addressing particles that do not exist.

use crate::particle::{ParticleId, ParticleKind};
use crate::photos::PhotoHandle;

/// Errors that can occur while ingesting photo content.
#[derive(Debug, thiserror::Error)]
pub enum PhotoError {
    /// The uploaded bytes are not a decodable image.
    #[error("Failed to decode photo: {0}")]
    Decode(#[from] image::ImageError),
    /// Failed to read the photo file from disk.
    #[error("Failed to read photo file: {0}")]
    Io(#[from] std::io::Error),
    /// The image decoded to zero pixels.
    #[error("Photo has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
    /// The handle does not refer to a stored photo.
    #[error("Unknown photo handle {0:?}")]
    UnknownHandle(PhotoHandle),
    /// Another PHOTO particle already shows this photo.
    #[error("Photo {handle:?} is already attached to particle {owner}")]
    AlreadyAttached { handle: PhotoHandle, owner: ParticleId },
}

/// Errors surfaced by [`Scene`](crate::Scene) operations.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Photo ingestion failed.
    #[error("Photo error: {0}")]
    Photo(#[from] PhotoError),
    /// No particle with this id is registered.
    #[error("No particle with id {0}")]
    UnknownParticle(ParticleId),
    /// Only PHOTO particles may be removed at runtime.
    #[error("Particle {id} is a {kind:?} and cannot be removed")]
    NotRemovable { id: ParticleId, kind: ParticleKind },
    /// Configuration could not be parsed.
    #[error("Invalid scene configuration: {0}")]
    Config(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SceneError::UnknownParticle(ParticleId::new(7));
        assert_eq!(err.to_string(), "No particle with id #7");

        let err = SceneError::NotRemovable {
            id: ParticleId::new(3),
            kind: ParticleKind::Leaf,
        };
        assert!(err.to_string().contains("Leaf"));

        let err = PhotoError::Empty { width: 0, height: 4 };
        assert_eq!(err.to_string(), "Photo has no pixels (0x4)");

        let err = PhotoError::AlreadyAttached {
            handle: PhotoHandle::new(2),
            owner: ParticleId::new(5),
        };
        assert!(err.to_string().ends_with("particle #5"));
    }

    #[test]
    fn test_photo_error_converts_into_scene_error() {
        let err: SceneError = PhotoError::UnknownHandle(PhotoHandle::new(1)).into();
        assert!(matches!(err, SceneError::Photo(PhotoError::UnknownHandle(_))));
    }
}
