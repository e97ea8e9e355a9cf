//! Core library for attendance-style face recognition.
//!
//! All computer vision (detection, matching) is delegated to a remote
//! recognition provider behind the [`recognition::domain::provider::RecognitionProvider`]
//! trait. This crate supplies the frame annotation pipeline, the live
//! stream controller with its sampling policy, and collection management.

pub mod annotate;
pub mod collection;
pub mod pipeline;
pub mod recognition;
pub mod shared;
pub mod stream;
