use crate::shared::frame::Frame;

/// Pull-based supplier of live frames (camera, video file, or a test
/// fixture).
///
/// `read` blocks until the next frame is available and returns `None`
/// once the source is exhausted or closed. Implementations release
/// capture resources in `close`; dropping without closing must not
/// leak.
pub trait FrameSource: Send {
    fn read(&mut self) -> Option<Frame>;

    fn close(&mut self);
}
