use ab_glyph::{FontVec, InvalidFont, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use crate::shared::face_box::PixelRect;

/// Bounding box color, a saturated green.
pub const BOX_COLOR: Rgb<u8> = Rgb([0x00, 0xd4, 0x00]);
pub const LABEL_COLOR: Rgb<u8> = Rgb([0xff, 0x00, 0x00]);

pub const BOX_THICKNESS: u32 = 4;
/// Label baseline offset above the box's top edge, in pixels.
pub const LABEL_OFFSET: i32 = 25;
pub const LABEL_SCALE: f32 = 24.0;

/// A loaded TrueType font for on-frame labels.
pub struct LabelFont {
    font: FontVec,
}

impl LabelFont {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, InvalidFont> {
        Ok(Self {
            font: FontVec::try_from_vec(bytes)?,
        })
    }
}

/// Draws a hollow rectangle around `rect`, thickened inward so the
/// outline never spills outside the image.
pub fn draw_box(image: &mut RgbImage, rect: &PixelRect) {
    for inset in 0..BOX_THICKNESS {
        let width = rect.width.saturating_sub(2 * inset);
        let height = rect.height.saturating_sub(2 * inset);
        if width == 0 || height == 0 {
            break;
        }
        draw_hollow_rect_mut(
            image,
            Rect::at((rect.x + inset) as i32, (rect.y + inset) as i32).of_size(width, height),
            BOX_COLOR,
        );
    }
}

/// Draws `text` just above the top-left corner of `rect`, clamped so a
/// box near the top edge still gets a visible label.
pub fn draw_label(image: &mut RgbImage, font: &LabelFont, rect: &PixelRect, text: &str) {
    let y = (rect.y as i32 - LABEL_OFFSET).max(0);
    draw_text_mut(
        image,
        LABEL_COLOR,
        rect.x as i32,
        y,
        PxScale::from(LABEL_SCALE),
        &font.font,
        text,
    );
}

/// Draws a status line in the top-left corner of the frame.
pub fn draw_caption(image: &mut RgbImage, font: &LabelFont, text: &str) {
    draw_text_mut(
        image,
        LABEL_COLOR,
        10,
        10,
        PxScale::from(LABEL_SCALE),
        &font.font,
        text,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_box_colors_border_pixels() {
        let mut image = RgbImage::new(20, 20);
        let rect = PixelRect {
            x: 2,
            y: 2,
            width: 10,
            height: 10,
        };
        draw_box(&mut image, &rect);

        // Outline corners across the 4px thickness.
        assert_eq!(image.get_pixel(2, 2), &BOX_COLOR);
        assert_eq!(image.get_pixel(5, 5), &BOX_COLOR);
        // Interior stays untouched.
        assert_eq!(image.get_pixel(7, 7), &Rgb([0, 0, 0]));
        // Pixels outside the rect stay untouched.
        assert_eq!(image.get_pixel(1, 1), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_draw_box_tolerates_degenerate_rect() {
        let mut image = RgbImage::new(10, 10);
        let before = image.clone();
        draw_box(
            &mut image,
            &PixelRect {
                x: 5,
                y: 5,
                width: 0,
                height: 3,
            },
        );
        assert_eq!(image, before);
    }

    #[test]
    fn test_draw_box_thinner_than_thickness() {
        // A 3px-wide box cannot take 4 nested outlines; it must not panic.
        let mut image = RgbImage::new(10, 10);
        draw_box(
            &mut image,
            &PixelRect {
                x: 1,
                y: 1,
                width: 3,
                height: 3,
            },
        );
        assert_eq!(image.get_pixel(1, 1), &BOX_COLOR);
    }

    #[test]
    fn test_invalid_font_bytes_rejected() {
        assert!(LabelFont::from_bytes(vec![0u8; 16]).is_err());
    }
}
