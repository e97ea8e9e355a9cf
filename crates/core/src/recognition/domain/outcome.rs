use crate::shared::constants::UNRECOGNIZED_LABEL;

/// Per-face recognition result for one annotated frame.
///
/// Created per frame and consumed immediately; there is exactly one
/// outcome per detected face box, in provider detection order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// Matched an enrolled identity at or above the configured threshold.
    Identified(String),
    /// A face was confirmed in the crop but no collection match was found.
    Unrecognized,
    /// The crop contained no detectable face, or the provider failed for
    /// this face. Not annotated on the output image.
    NoFaceData,
}

impl RecognitionOutcome {
    /// Overlay text for this face, or `None` when nothing is drawn.
    pub fn label(&self) -> Option<&str> {
        match self {
            RecognitionOutcome::Identified(name) => Some(name),
            RecognitionOutcome::Unrecognized => Some(UNRECOGNIZED_LABEL),
            RecognitionOutcome::NoFaceData => None,
        }
    }
}

/// Display strings for the "last recognized" snapshot: identified names
/// and the not-recognized marker, skipping faces with no usable data.
pub fn display_names(outcomes: &[RecognitionOutcome]) -> Vec<String> {
    outcomes
        .iter()
        .filter_map(|o| o.label().map(str::to_string))
        .collect()
}
