use std::sync::Arc;

use log::{debug, warn};

use crate::annotate::overlay::{self, LabelFont};
use crate::recognition::domain::outcome::RecognitionOutcome;
use crate::recognition::domain::provider::RecognitionProvider;
use crate::shared::frame::Frame;

/// A frame and the per-face recognition results produced while
/// annotating it, in detection order.
pub struct AnnotatedFrame {
    pub frame: Frame,
    pub outcomes: Vec<RecognitionOutcome>,
}

/// Runs the per-frame recognition pass: detect faces, identify each one
/// against a collection, draw boxes and labels.
///
/// Annotation never fails. Provider errors degrade to an unannotated
/// face (or an unannotated frame when whole-frame detection fails) so a
/// live stream keeps flowing through provider hiccups.
pub struct FrameAnnotator {
    provider: Arc<dyn RecognitionProvider>,
    match_threshold: f32,
    font: Option<LabelFont>,
}

impl FrameAnnotator {
    pub fn new(
        provider: Arc<dyn RecognitionProvider>,
        match_threshold: f32,
        font: Option<LabelFont>,
    ) -> Self {
        Self {
            provider,
            match_threshold,
            font,
        }
    }

    pub fn font(&self) -> Option<&LabelFont> {
        self.font.as_ref()
    }

    pub fn annotate(&self, frame: &Frame, collection: &str) -> AnnotatedFrame {
        let png = match frame.encode_png() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("frame {} could not be encoded: {e}", frame.index());
                return AnnotatedFrame {
                    frame: frame.clone(),
                    outcomes: Vec::new(),
                };
            }
        };

        let boxes = match self.provider.detect_faces(&png) {
            Ok(boxes) => boxes,
            Err(e) => {
                warn!("face detection failed on frame {}: {e}", frame.index());
                Vec::new()
            }
        };
        if boxes.is_empty() {
            return AnnotatedFrame {
                frame: frame.clone(),
                outcomes: Vec::new(),
            };
        }
        debug!("frame {}: {} face(s) detected", frame.index(), boxes.len());

        let mut image = frame.to_image();
        let mut outcomes = Vec::with_capacity(boxes.len());
        for face_box in &boxes {
            let rect = face_box.to_pixel_rect(frame.width(), frame.height());
            if rect.is_empty() {
                outcomes.push(RecognitionOutcome::NoFaceData);
                continue;
            }

            let outcome = self.identify(&frame.crop(&rect), collection);
            if let Some(label) = outcome.label() {
                overlay::draw_box(&mut image, &rect);
                if let Some(font) = &self.font {
                    overlay::draw_label(&mut image, font, &rect, label);
                }
            }
            outcomes.push(outcome);
        }

        AnnotatedFrame {
            frame: Frame::from_image(image, frame.index()),
            outcomes,
        }
    }

    /// Identifies a single cropped face region. The crop is re-checked
    /// for a face first: a crop the provider finds no face in carries
    /// too little signal to search with, and searching it would error.
    fn identify(&self, crop: &Frame, collection: &str) -> RecognitionOutcome {
        let png = match crop.encode_png() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("face crop could not be encoded: {e}");
                return RecognitionOutcome::NoFaceData;
            }
        };

        match self.provider.detect_faces(&png) {
            Ok(found) if found.is_empty() => return RecognitionOutcome::NoFaceData,
            Ok(_) => {}
            Err(e) => {
                warn!("face re-check failed: {e}");
                return RecognitionOutcome::NoFaceData;
            }
        }

        match self
            .provider
            .search_by_image(&png, collection, self.match_threshold)
        {
            Ok(matches) => match matches.into_iter().next() {
                Some(m) => {
                    debug!("matched {} at {:.1}%", m.person, m.similarity);
                    RecognitionOutcome::Identified(m.person)
                }
                None => RecognitionOutcome::Unrecognized,
            },
            Err(e) => {
                warn!("face search failed: {e}");
                RecognitionOutcome::NoFaceData
            }
        }
    }
}
