pub mod annotator;
pub mod overlay;
