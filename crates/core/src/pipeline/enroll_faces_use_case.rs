use std::path::{Path, PathBuf};

use log::info;

use crate::collection::registry::{CollectionRegistry, EnrollOutcome};
use crate::pipeline::validate_upload;
use crate::shared::frame::Frame;

/// What happened to one reference image during an enrollment batch.
pub struct EnrollReport {
    pub path: PathBuf,
    pub outcome: EnrollOutcome,
}

/// Enrolls a person into a collection from one or more reference
/// images (typically several poses of the same face).
///
/// Each image is handled independently; a bad file or a provider
/// failure is reported for that image and the batch keeps going.
pub struct EnrollFacesUseCase {
    registry: CollectionRegistry,
}

impl EnrollFacesUseCase {
    pub fn new(registry: CollectionRegistry) -> Self {
        Self { registry }
    }

    pub fn execute(&self, collection: &str, person: &str, images: &[PathBuf]) -> Vec<EnrollReport> {
        images
            .iter()
            .map(|path| EnrollReport {
                path: path.clone(),
                outcome: self.enroll_one(collection, person, path),
            })
            .collect()
    }

    fn enroll_one(&self, collection: &str, person: &str, path: &Path) -> EnrollOutcome {
        if let Err(e) = validate_upload(path) {
            return EnrollOutcome::RejectedUpload(e.to_string());
        }

        // Decode and re-encode so the provider always receives PNG,
        // whatever container the reference image arrived in.
        let image = match image::open(path) {
            Ok(image) => image.to_rgb8(),
            Err(e) => return EnrollOutcome::Failed(format!("{}: {e}", path.display())),
        };
        let png = match Frame::from_image(image, 0).encode_png() {
            Ok(bytes) => bytes,
            Err(e) => return EnrollOutcome::Failed(format!("{}: {e}", path.display())),
        };

        let outcome = self.registry.enroll(collection, person, &png);
        info!("{}: {outcome}", path.display());
        outcome
    }
}
