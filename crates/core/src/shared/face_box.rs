use serde::Deserialize;

/// A detected face location, normalized to `[0, 1]` relative to the
/// image dimensions, as reported by the recognition provider.
///
/// The provider may return coordinates slightly outside the unit square
/// for faces at the frame edge; conversion to pixel space clamps them.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct FaceBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// A pixel-space rectangle, always within the bounds of the image it was
/// derived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceBox {
    /// Scales the normalized box by the image dimensions and clamps the
    /// result so the rect never reaches outside the image.
    pub fn to_pixel_rect(&self, image_width: u32, image_height: u32) -> PixelRect {
        let x = scale_clamped(self.left, image_width);
        let y = scale_clamped(self.top, image_height);
        let width = scale_clamped(self.width, image_width).min(image_width - x.min(image_width));
        let height =
            scale_clamped(self.height, image_height).min(image_height - y.min(image_height));
        PixelRect {
            x,
            y,
            width,
            height,
        }
    }
}

impl PixelRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

fn scale_clamped(normalized: f32, dimension: u32) -> u32 {
    (normalized.max(0.0) * dimension as f32).min(dimension as f32) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn face_box(left: f32, top: f32, width: f32, height: f32) -> FaceBox {
        FaceBox {
            left,
            top,
            width,
            height,
        }
    }

    #[test]
    fn test_to_pixel_rect_scales_by_dimensions() {
        let rect = face_box(0.25, 0.5, 0.5, 0.25).to_pixel_rect(400, 200);
        assert_eq!(rect.x, 100);
        assert_eq!(rect.y, 100);
        assert_eq!(rect.width, 200);
        assert_eq!(rect.height, 50);
    }

    #[test]
    fn test_to_pixel_rect_clamps_negative_origin() {
        // Edge-of-frame detection: provider reports a slightly negative left.
        let rect = face_box(-0.05, -0.1, 0.3, 0.3).to_pixel_rect(100, 100);
        assert_eq!(rect.x, 0);
        assert_eq!(rect.y, 0);
        assert_eq!(rect.width, 30);
        assert_eq!(rect.height, 30);
    }

    #[test]
    fn test_to_pixel_rect_clamps_overflow_to_image_bounds() {
        // Box extends past the right/bottom edge.
        let rect = face_box(0.8, 0.9, 0.5, 0.5).to_pixel_rect(100, 100);
        assert_eq!(rect.x, 80);
        assert_eq!(rect.y, 90);
        assert_eq!(rect.width, 20);
        assert_eq!(rect.height, 10);
    }

    #[test]
    fn test_to_pixel_rect_full_frame() {
        let rect = face_box(0.0, 0.0, 1.0, 1.0).to_pixel_rect(640, 480);
        assert_eq!(
            rect,
            PixelRect {
                x: 0,
                y: 0,
                width: 640,
                height: 480
            }
        );
    }

    #[rstest]
    #[case::zero_width(face_box(0.5, 0.5, 0.0, 0.2), true)]
    #[case::zero_height(face_box(0.5, 0.5, 0.2, 0.0), true)]
    #[case::origin_on_far_edge(face_box(1.0, 0.5, 0.2, 0.2), true)]
    #[case::normal(face_box(0.1, 0.1, 0.2, 0.2), false)]
    fn test_degenerate_boxes_yield_empty_rects(#[case] b: FaceBox, #[case] empty: bool) {
        assert_eq!(b.to_pixel_rect(100, 100).is_empty(), empty);
    }

    #[test]
    fn test_tiny_box_rounds_down_to_empty() {
        // Sub-pixel box in a small image truncates to zero width.
        let rect = face_box(0.5, 0.5, 0.004, 0.004).to_pixel_rect(100, 100);
        assert!(rect.is_empty());
    }
}
