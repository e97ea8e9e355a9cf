use std::sync::{Arc, Mutex};

use log::{info, warn};

use crate::annotate::annotator::FrameAnnotator;
use crate::annotate::overlay;
use crate::recognition::domain::outcome::display_names;
use crate::shared::frame::Frame;
use crate::stream::domain::frame_source::FrameSource;
use crate::stream::stream_stats::StreamStats;

/// Shared, cheaply clonable view of who was most recently recognized on
/// a live stream. Readers poll it from another thread while the stream
/// runs.
#[derive(Clone, Default)]
pub struct RecognizedSnapshot {
    names: Arc<Mutex<Vec<String>>>,
}

impl RecognizedSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<String> {
        self.names.lock().map(|n| n.clone()).unwrap_or_default()
    }

    fn update(&self, names: Vec<String>) {
        if let Ok(mut current) = self.names.lock() {
            *current = names;
        }
    }
}

/// Wraps a JPEG frame as one part of a `multipart/x-mixed-replace`
/// MJPEG stream.
pub fn mjpeg_part(jpeg: &[u8]) -> Vec<u8> {
    let mut part = Vec::with_capacity(jpeg.len() + 64);
    part.extend_from_slice(b"--frame\r\nContent-Type: image/jpeg\r\n\r\n");
    part.extend_from_slice(jpeg);
    part.extend_from_slice(b"\r\n");
    part
}

/// Drives a live stream: pulls frames from a source, runs the full
/// recognition pass on every Nth frame, and yields each frame as JPEG.
///
/// Intermediate frames skip the provider round-trips entirely and carry
/// a caption with the most recent recognition results, so the stream
/// stays smooth while detection lags behind at its own cadence.
pub struct LiveStreamController {
    source: Box<dyn FrameSource>,
    annotator: FrameAnnotator,
    collection: String,
    sample_interval: usize,
    frame_count: usize,
    last_names: Vec<String>,
    snapshot: RecognizedSnapshot,
    stats: StreamStats,
}

impl LiveStreamController {
    pub fn new(
        source: Box<dyn FrameSource>,
        annotator: FrameAnnotator,
        collection: impl Into<String>,
        sample_interval: usize,
    ) -> Self {
        Self {
            source,
            annotator,
            collection: collection.into(),
            sample_interval: sample_interval.max(1),
            frame_count: 0,
            last_names: Vec::new(),
            snapshot: RecognizedSnapshot::new(),
            stats: StreamStats::new(),
        }
    }

    /// Handle for polling recognition results while the stream runs.
    pub fn snapshot(&self) -> RecognizedSnapshot {
        self.snapshot.clone()
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    fn process(&mut self, frame: Frame) -> Frame {
        let sampled = self.frame_count % self.sample_interval == 0;
        self.frame_count += 1;

        if sampled {
            let started = std::time::Instant::now();
            let annotated = self.annotator.annotate(&frame, &self.collection);
            self.stats
                .timing("sample", started.elapsed().as_secs_f64() * 1000.0);
            // Replace, never merge: an empty pass means whoever was in
            // frame has left, and the caption and snapshot must say so.
            let names = display_names(&annotated.outcomes);
            if !names.is_empty() {
                info!("frame {}: recognized {:?}", frame.index(), names);
            }
            self.snapshot.update(names.clone());
            self.last_names = names;
            return annotated.frame;
        }

        if self.last_names.is_empty() {
            return frame;
        }
        match self.annotator.font() {
            Some(font) => {
                let mut image = frame.to_image();
                let caption = format!("Last recognized: {}", self.last_names.join(", "));
                overlay::draw_caption(&mut image, font, &caption);
                Frame::from_image(image, frame.index())
            }
            None => frame,
        }
    }
}

impl Iterator for LiveStreamController {
    /// JPEG bytes for one output frame.
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(frame) = self.source.read() else {
                self.source.close();
                return None;
            };
            let processed = self.process(frame);
            match processed.encode_jpeg() {
                Ok(jpeg) => {
                    self.stats.frame_emitted();
                    return Some(jpeg);
                }
                Err(e) => {
                    // Drop the frame and keep streaming.
                    warn!("frame {} could not be encoded: {e}", processed.index());
                }
            }
        }
    }
}
