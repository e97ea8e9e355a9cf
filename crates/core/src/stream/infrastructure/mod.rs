pub mod ffmpeg_source;
pub mod threaded_stream;
