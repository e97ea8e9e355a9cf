use std::fmt;
use std::sync::Arc;

use log::warn;

use crate::recognition::domain::provider::{ProviderError, RecognitionProvider};

/// Manages named face collections on the recognition provider.
///
/// Registry operations fold provider errors into outcome enums rather
/// than propagating them: the caller always gets a reportable result
/// per request, even when the provider is down.
pub struct CollectionRegistry {
    provider: Arc<dyn RecognitionProvider>,
}

#[derive(Debug, PartialEq)]
pub enum CreateOutcome {
    Created(String),
    AlreadyExists(String),
    InvalidName(String),
    Failed(String),
}

#[derive(Debug, PartialEq)]
pub enum DeleteOutcome {
    Deleted(String),
    NotFound(String),
    Failed(String),
}

#[derive(Debug, PartialEq)]
pub struct CollectionListing {
    pub count: usize,
    pub names: Vec<String>,
}

/// Result of enrolling one reference image for one person.
#[derive(Debug, PartialEq)]
pub enum EnrollOutcome {
    Registered { person: String, face_id: String },
    NoFaceFound { person: String },
    InvalidName(String),
    RejectedUpload(String),
    Failed(String),
}

impl fmt::Display for CreateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created(name) => write!(f, "Collection {name} has been created"),
            Self::AlreadyExists(name) => write!(f, "Collection {name} already exists"),
            Self::InvalidName(name) => {
                write!(f, "Collection name {name} is invalid. Ensure the name has no spaces")
            }
            Self::Failed(message) => write!(f, "Collection could not be created: {message}"),
        }
    }
}

impl fmt::Display for DeleteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deleted(name) => write!(f, "Collection {name} has been deleted"),
            Self::NotFound(name) => write!(f, "Collection {name} does not exist"),
            Self::Failed(message) => write!(f, "Collection could not be deleted: {message}"),
        }
    }
}

impl fmt::Display for EnrollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registered { person, face_id } => {
                write!(f, "{person} has been registered (face {face_id})")
            }
            Self::NoFaceFound { person } => write!(f, "No faces found in {person}'s image"),
            Self::InvalidName(name) => {
                write!(f, "Collection name {name} is invalid. Ensure the name has no spaces")
            }
            Self::RejectedUpload(message) => write!(f, "Image rejected: {message}"),
            Self::Failed(message) => write!(f, "Face could not be registered: {message}"),
        }
    }
}

fn has_whitespace(name: &str) -> bool {
    name.chars().any(char::is_whitespace)
}

impl CollectionRegistry {
    pub fn new(provider: Arc<dyn RecognitionProvider>) -> Self {
        Self { provider }
    }

    /// Creates a collection. Names containing whitespace are rejected
    /// before the provider is contacted.
    pub fn create(&self, name: &str) -> CreateOutcome {
        if name.is_empty() || has_whitespace(name) {
            return CreateOutcome::InvalidName(name.to_string());
        }
        match self.provider.create_collection(name) {
            Ok(()) => CreateOutcome::Created(name.to_string()),
            Err(ProviderError::AlreadyExists(_)) => CreateOutcome::AlreadyExists(name.to_string()),
            Err(ProviderError::InvalidName(_)) => CreateOutcome::InvalidName(name.to_string()),
            Err(e) => {
                warn!("create collection {name} failed: {e}");
                CreateOutcome::Failed(e.to_string())
            }
        }
    }

    pub fn delete(&self, name: &str) -> DeleteOutcome {
        match self.provider.delete_collection(name) {
            Ok(()) => DeleteOutcome::Deleted(name.to_string()),
            Err(ProviderError::NotFound(_)) => DeleteOutcome::NotFound(name.to_string()),
            Err(e) => {
                warn!("delete collection {name} failed: {e}");
                DeleteOutcome::Failed(e.to_string())
            }
        }
    }

    pub fn list(&self) -> Result<CollectionListing, ProviderError> {
        let names = self.provider.list_collections()?;
        Ok(CollectionListing {
            count: names.len(),
            names,
        })
    }

    /// Indexes one reference image of `person` into `collection`.
    ///
    /// An image in which the provider detects no face yields
    /// `NoFaceFound` rather than an error, so a batch over several
    /// images can keep going and report per-image results.
    pub fn enroll(&self, collection: &str, person: &str, image: &[u8]) -> EnrollOutcome {
        if collection.is_empty() || has_whitespace(collection) {
            return EnrollOutcome::InvalidName(collection.to_string());
        }
        match self.provider.index_face(image, collection, person) {
            Ok(records) => match records.into_iter().next() {
                Some(record) => EnrollOutcome::Registered {
                    person: record.person,
                    face_id: record.face_id,
                },
                None => EnrollOutcome::NoFaceFound {
                    person: person.to_string(),
                },
            },
            Err(ProviderError::InvalidName(_)) => EnrollOutcome::InvalidName(collection.to_string()),
            Err(e) => {
                warn!("enroll {person} into {collection} failed: {e}");
                EnrollOutcome::Failed(e.to_string())
            }
        }
    }
}
