pub mod domain;
pub mod infrastructure;
pub mod stream_stats;
