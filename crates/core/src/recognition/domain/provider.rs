use thiserror::Error;

use crate::shared::face_box::FaceBox;

/// Failure modes of the remote recognition provider, tagged so callers
/// branch on kind instead of matching message strings.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("recognition service unavailable: {0}")]
    Unavailable(String),
    #[error("collection already exists: {0}")]
    AlreadyExists(String),
    #[error("no such collection: {0}")]
    NotFound(String),
    #[error("invalid collection name: {0}")]
    InvalidName(String),
}

/// A candidate identity returned by a collection search, with the
/// provider's similarity score in percent.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceMatch {
    pub person: String,
    pub similarity: f32,
}

/// A face the provider stored during enrollment: its internal id plus
/// the person identifier it was filed under.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexedFace {
    pub face_id: String,
    pub person: String,
}

/// Capability surface of the external face detection/matching service.
///
/// Implementations are stateless clients; all face data lives on the
/// provider side. Injected at construction time so tests substitute a
/// fake.
pub trait RecognitionProvider: Send + Sync {
    /// Detects faces in a PNG/JPEG image. An empty list is a valid
    /// result, not an error.
    fn detect_faces(&self, image: &[u8]) -> Result<Vec<FaceBox>, ProviderError>;

    /// Searches `collection` for faces similar to the (single-face)
    /// image, returning matches at or above `threshold` percent,
    /// best first.
    fn search_by_image(
        &self,
        image: &[u8],
        collection: &str,
        threshold: f32,
    ) -> Result<Vec<FaceMatch>, ProviderError>;

    fn create_collection(&self, name: &str) -> Result<(), ProviderError>;

    fn delete_collection(&self, name: &str) -> Result<(), ProviderError>;

    fn list_collections(&self) -> Result<Vec<String>, ProviderError>;

    /// Enrolls the faces found in `image` into `collection` under the
    /// `person` identifier. An empty list means no face was detected.
    fn index_face(
        &self,
        image: &[u8],
        collection: &str,
        person: &str,
    ) -> Result<Vec<IndexedFace>, ProviderError>;
}
