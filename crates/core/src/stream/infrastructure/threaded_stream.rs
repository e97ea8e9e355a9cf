use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver};
use log::debug;

use crate::shared::frame::Frame;
use crate::stream::domain::frame_source::FrameSource;

/// Queue depth between the capture thread and the consumer. Large
/// enough to ride out recognition latency spikes, small enough that a
/// slow consumer sees recent frames rather than a growing backlog.
const FRAME_QUEUE_DEPTH: usize = 8;

/// Runs a [`FrameSource`] on its own thread so capture keeps pace while
/// the consumer stalls on provider round-trips.
///
/// Frames flow through a bounded channel; the capture thread blocks
/// when the queue is full and exits when the source runs dry or the
/// consumer closes.
pub struct ThreadedStream {
    receiver: Option<Receiver<Frame>>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadedStream {
    pub fn spawn(mut source: Box<dyn FrameSource>) -> Self {
        let (sender, receiver) = bounded::<Frame>(FRAME_QUEUE_DEPTH);

        let worker = thread::spawn(move || {
            while let Some(frame) = source.read() {
                if sender.send(frame).is_err() {
                    // Consumer hung up.
                    break;
                }
            }
            source.close();
            debug!("capture thread finished");
        });

        Self {
            receiver: Some(receiver),
            worker: Some(worker),
        }
    }

    fn join_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

impl FrameSource for ThreadedStream {
    fn read(&mut self) -> Option<Frame> {
        let frame = self.receiver.as_ref()?.recv().ok();
        if frame.is_none() {
            self.join_worker();
        }
        frame
    }

    fn close(&mut self) {
        // Dropping the receiver makes the worker's next send fail.
        self.receiver = None;
        self.join_worker();
    }
}

impl Drop for ThreadedStream {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct CountingSource {
        remaining: usize,
        next_index: usize,
        closed: Arc<AtomicBool>,
    }

    impl CountingSource {
        fn new(count: usize) -> (Self, Arc<AtomicBool>) {
            let closed = Arc::new(AtomicBool::new(false));
            (
                Self {
                    remaining: count,
                    next_index: 0,
                    closed: closed.clone(),
                },
                closed,
            )
        }
    }

    impl FrameSource for CountingSource {
        fn read(&mut self) -> Option<Frame> {
            if self.remaining == 0 {
                return None;
            }
            self.remaining -= 1;
            let frame = Frame::new(vec![0u8; 4 * 4 * 3], 4, 4, self.next_index);
            self.next_index += 1;
            Some(frame)
        }

        fn close(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_delivers_all_frames_in_order() {
        let (source, _) = CountingSource::new(20);
        let mut stream = ThreadedStream::spawn(Box::new(source));

        let mut indices = Vec::new();
        while let Some(frame) = stream.read() {
            indices.push(frame.index());
        }
        assert_eq!(indices, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_worker_closes_exhausted_source() {
        let (source, closed) = CountingSource::new(3);
        let mut stream = ThreadedStream::spawn(Box::new(source));
        while stream.read().is_some() {}
        assert!(closed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_close_stops_worker_midstream() {
        // More frames than the queue holds, so the worker is still
        // producing when the consumer hangs up.
        let (source, closed) = CountingSource::new(1000);
        let mut stream = ThreadedStream::spawn(Box::new(source));
        stream.read().unwrap();
        stream.close();
        assert!(closed.load(Ordering::SeqCst));
        assert!(stream.read().is_none());
    }

    #[test]
    fn test_drop_joins_worker() {
        let (source, closed) = CountingSource::new(1000);
        {
            let mut stream = ThreadedStream::spawn(Box::new(source));
            stream.read().unwrap();
        }
        assert!(closed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_empty_source_yields_nothing() {
        let (source, _) = CountingSource::new(0);
        let mut stream = ThreadedStream::spawn(Box::new(source));
        assert!(stream.read().is_none());
    }
}
