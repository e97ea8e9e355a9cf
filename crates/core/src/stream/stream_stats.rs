use std::collections::HashMap;
use std::time::Instant;

/// Tracks per-stage timing for a live stream session and formats an
/// end-of-stream summary.
pub struct StreamStats {
    timings: HashMap<String, Vec<f64>>,
    start_time: Instant,
    frames: usize,
}

impl StreamStats {
    pub fn new() -> Self {
        Self {
            timings: HashMap::new(),
            start_time: Instant::now(),
            frames: 0,
        }
    }

    pub fn frame_emitted(&mut self) {
        self.frames += 1;
    }

    /// Record how long a named stage took for one frame.
    pub fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.frames == 0 && self.timings.is_empty() {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = Vec::new();
        lines.push(format!(
            "Stream summary ({} frames, {elapsed_s:.1}s total):",
            self.frames
        ));

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len() as f64;
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms"
            ));
        }

        if self.frames > 0 && elapsed_s > 0.0 {
            let fps = self.frames as f64 / elapsed_s;
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }
}

impl Default for StreamStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_timing_records_values() {
        let mut stats = StreamStats::new();
        stats.timing("sample", 20.0);
        stats.timing("sample", 30.0);
        stats.timing("encode", 5.0);

        let sample = stats.timings_for("sample").unwrap();
        assert_eq!(sample.len(), 2);
        assert_relative_eq!(sample[0], 20.0);
        assert_relative_eq!(sample.iter().sum::<f64>() / sample.len() as f64, 25.0);

        let encode = stats.timings_for("encode").unwrap();
        assert_eq!(encode.len(), 1);
    }

    #[test]
    fn test_summary_includes_stages_and_frames() {
        let mut stats = StreamStats::new();
        stats.frame_emitted();
        stats.frame_emitted();
        stats.timing("sample", 25.0);

        let summary = stats.summary_string().unwrap();
        assert!(summary.contains("Stream summary (2 frames"));
        assert!(summary.contains("sample"));
        assert!(summary.contains("avg   25.0ms"));
    }

    #[test]
    fn test_summary_includes_fps() {
        let mut stats = StreamStats::new();
        for _ in 0..10 {
            stats.frame_emitted();
        }
        assert!(stats.summary_string().unwrap().contains("fps"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(StreamStats::new().summary_string().is_none());
    }
}
