pub mod controller;
pub mod frame_source;
