/// Minimum provider similarity (percent) for a match to count as identified.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 70.0;

/// Run the full detect + match cycle on every Nth live frame.
pub const DEFAULT_SAMPLE_INTERVAL: usize = 5;

pub const UPLOAD_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Label text drawn for faces the provider detected but could not match.
pub const UNRECOGNIZED_LABEL: &str = "Not recognized";

pub const LABEL_FONT_NAME: &str = "DejaVuSans.ttf";
pub const LABEL_FONT_URL: &str =
    "https://github.com/rollcall-vision/rollcall/releases/download/v0.1.0/DejaVuSans.ttf";
