use std::path::Path;

use crate::shared::frame::Frame;
use crate::stream::domain::frame_source::FrameSource;

/// Decodes frames from a video file or capture device via ffmpeg-next
/// (libavformat + libavcodec), converting each to RGB24.
pub struct FfmpegFrameSource {
    input_ctx: Option<ffmpeg_next::format::context::Input>,
    decoder: Option<ffmpeg_next::decoder::Video>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    video_stream_index: usize,
    width: u32,
    height: u32,
    frame_index: usize,
    flushing: bool,
}

// Safety: FfmpegFrameSource is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegFrameSource {}

impl FfmpegFrameSource {
    pub fn open(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;
        let video_stream_index = stream.index();

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;
        let width = decoder.width();
        let height = decoder.height();

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        Ok(Self {
            input_ctx: Some(ictx),
            decoder: Some(decoder),
            scaler: Some(scaler),
            video_stream_index,
            width,
            height,
            frame_index: 0,
            flushing: false,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn try_receive(&mut self) -> Option<Frame> {
        let decoder = self.decoder.as_mut()?;
        let scaler = self.scaler.as_mut()?;

        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if decoder.receive_frame(&mut decoded).is_err() {
            return None;
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        if let Err(e) = scaler.run(&decoded, &mut rgb_frame) {
            log::warn!("frame conversion failed: {e}");
            return None;
        }

        let pixels = extract_rgb_pixels(&rgb_frame, self.width, self.height);
        let frame = Frame::new(pixels, self.width, self.height, self.frame_index);
        self.frame_index += 1;
        Some(frame)
    }
}

impl FrameSource for FfmpegFrameSource {
    fn read(&mut self) -> Option<Frame> {
        self.input_ctx.as_ref()?;

        if let Some(frame) = self.try_receive() {
            return Some(frame);
        }
        if self.flushing {
            return None;
        }

        loop {
            let next_packet = self
                .input_ctx
                .as_mut()
                .and_then(|ictx| ictx.packets().next());
            let Some((stream, packet)) = next_packet else {
                if let Some(decoder) = self.decoder.as_mut() {
                    let _ = decoder.send_eof();
                }
                self.flushing = true;
                return self.try_receive();
            };

            if stream.index() != self.video_stream_index {
                continue;
            }

            let Some(decoder) = self.decoder.as_mut() else {
                return None;
            };
            if decoder.send_packet(&packet).is_err() {
                continue;
            }

            if let Some(frame) = self.try_receive() {
                return Some(frame);
            }
        }
    }

    fn close(&mut self) {
        self.decoder = None;
        self.scaler = None;
        self.input_ctx = None;
    }
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer,
/// stripping any row padding (stride > width * 3).
fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}
