use std::io::Cursor;

use image::{ImageFormat, RgbImage};

use crate::shared::face_box::PixelRect;

/// A single video/image frame: contiguous RGB24 bytes in row-major order.
///
/// Decoding and encoding happen at I/O boundaries; the pipeline passes
/// frames around as plain pixel buffers tagged with a capture index.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * 3,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    pub fn from_image(image: RgbImage, index: usize) -> Self {
        let (width, height) = image.dimensions();
        Self {
            data: image.into_raw(),
            width,
            height,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Copies the pixel buffer into an [`RgbImage`] for drawing.
    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_raw(self.width, self.height, self.data.clone())
            .expect("Frame data length must match dimensions")
    }

    /// Extracts the sub-frame covered by `rect`. The rect must already be
    /// clamped to the frame bounds (see [`crate::shared::face_box::FaceBox::to_pixel_rect`]).
    pub fn crop(&self, rect: &PixelRect) -> Frame {
        let w = rect.width.min(self.width.saturating_sub(rect.x)) as usize;
        let h = rect.height.min(self.height.saturating_sub(rect.y)) as usize;
        let stride = self.width as usize * 3;

        let mut data = Vec::with_capacity(w * h * 3);
        for row in 0..h {
            let start = (rect.y as usize + row) * stride + rect.x as usize * 3;
            data.extend_from_slice(&self.data[start..start + w * 3]);
        }
        Frame::new(data, w as u32, h as u32, self.index)
    }

    /// Serializes the frame as PNG, the wire format the provider expects.
    pub fn encode_png(&self) -> Result<Vec<u8>, image::ImageError> {
        self.encode(ImageFormat::Png)
    }

    /// Serializes the frame as JPEG for live stream output.
    pub fn encode_jpeg(&self) -> Result<Vec<u8>, image::ImageError> {
        self.encode(ImageFormat::Jpeg)
    }

    fn encode(&self, format: ImageFormat) -> Result<Vec<u8>, image::ImageError> {
        let image = self.to_image();
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, format)?;
        Ok(buffer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(w: u32, h: u32, rgb: [u8; 3]) -> Frame {
        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for _ in 0..(w * h) {
            data.extend_from_slice(&rgb);
        }
        Frame::new(data, w, h, 0)
    }

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2
        let frame = Frame::new(data.clone(), 2, 2, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 3")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 0);
    }

    #[test]
    fn test_image_roundtrip_preserves_pixels() {
        let frame = solid_frame(4, 3, [50, 100, 200]);
        let image = frame.to_image();
        assert_eq!(image.dimensions(), (4, 3));
        assert_eq!(image.get_pixel(0, 0).0, [50, 100, 200]);

        let back = Frame::from_image(image, 7);
        assert_eq!(back.index(), 7);
        assert_eq!(back.data(), frame.data());
    }

    #[test]
    fn test_crop_extracts_region() {
        // 4x4 frame: left half red, right half blue
        let mut data = Vec::new();
        for _row in 0..4 {
            for col in 0..4 {
                if col < 2 {
                    data.extend_from_slice(&[255, 0, 0]);
                } else {
                    data.extend_from_slice(&[0, 0, 255]);
                }
            }
        }
        let frame = Frame::new(data, 4, 4, 0);

        let crop = frame.crop(&PixelRect {
            x: 2,
            y: 0,
            width: 2,
            height: 4,
        });
        assert_eq!(crop.width(), 2);
        assert_eq!(crop.height(), 4);
        assert!(crop.data().chunks(3).all(|p| p == [0, 0, 255]));
    }

    #[test]
    fn test_crop_preserves_frame_index() {
        let frame = Frame::new(vec![0u8; 4 * 4 * 3], 4, 4, 9);
        let crop = frame.crop(&PixelRect {
            x: 1,
            y: 1,
            width: 2,
            height: 2,
        });
        assert_eq!(crop.index(), 9);
    }

    #[test]
    fn test_crop_clamps_oversized_rect() {
        let frame = solid_frame(4, 4, [1, 2, 3]);
        let crop = frame.crop(&PixelRect {
            x: 3,
            y: 3,
            width: 10,
            height: 10,
        });
        assert_eq!(crop.width(), 1);
        assert_eq!(crop.height(), 1);
    }

    #[test]
    fn test_encode_png_roundtrip() {
        let frame = solid_frame(8, 6, [10, 20, 30]);
        let bytes = frame.encode_png().unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (8, 6));
        assert_eq!(decoded.get_pixel(3, 3).0, [10, 20, 30]);
    }

    #[test]
    fn test_encode_jpeg_produces_jpeg_magic() {
        let frame = solid_frame(8, 6, [128, 128, 128]);
        let bytes = frame.encode_jpeg().unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
