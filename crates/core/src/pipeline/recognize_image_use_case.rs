use std::fs;
use std::path::Path;

use log::info;

use crate::annotate::annotator::FrameAnnotator;
use crate::pipeline::validate_upload;
use crate::recognition::domain::outcome::RecognitionOutcome;
use crate::shared::frame::Frame;

/// Single-image recognition pipeline: read, annotate, write the
/// annotated copy, report who was found.
pub struct RecognizeImageUseCase {
    annotator: FrameAnnotator,
}

impl RecognizeImageUseCase {
    pub fn new(annotator: FrameAnnotator) -> Self {
        Self { annotator }
    }

    pub fn execute(
        &self,
        input_path: &Path,
        output_path: &Path,
        collection: &str,
    ) -> Result<Vec<RecognitionOutcome>, Box<dyn std::error::Error>> {
        validate_upload(input_path)?;

        let image = image::open(input_path)?.to_rgb8();
        let frame = Frame::from_image(image, 0);

        let annotated = self.annotator.annotate(&frame, collection);
        info!(
            "{}: {} face(s) processed",
            input_path.display(),
            annotated.outcomes.len()
        );

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        annotated.frame.to_image().save(output_path)?;

        Ok(annotated.outcomes)
    }
}
