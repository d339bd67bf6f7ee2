use std::time::{Duration, Instant};

/// Running counters for the frame loop.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct LoopStats {
    /// Calls to `try_acquire_latest_frame`.
    pub polls: u64,
    /// Polls that returned a frame.
    pub frames: u64,
    /// Polls that returned "no frame ready".
    pub stale_polls: u64,
    /// Draw calls issued.
    pub draws: u64,
}

/// Measures delivered frames per second over a reporting window.
#[derive(Debug, Clone)]
pub struct ThroughputMeter {
    window: Duration,
    window_start: Instant,
    frames_at_start: u64,
    draws_at_start: u64,
}

/// One closed reporting window.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Throughput {
    pub sensor_fps: f32,
    pub draw_fps: f32,
}

impl ThroughputMeter {
    pub fn new(window: Duration) -> Self {
        Self::starting_at(window, Instant::now())
    }

    fn starting_at(window: Duration, now: Instant) -> Self {
        Self {
            window,
            window_start: now,
            frames_at_start: 0,
            draws_at_start: 0,
        }
    }

    /// Returns a report when the current window has elapsed, then starts a new one.
    pub fn sample(&mut self, stats: &LoopStats) -> Option<Throughput> {
        self.sample_at(stats, Instant::now())
    }

    fn sample_at(&mut self, stats: &LoopStats, now: Instant) -> Option<Throughput> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }

        let secs = elapsed.as_secs_f32().max(f32::EPSILON);
        let report = Throughput {
            sensor_fps: (stats.frames - self.frames_at_start) as f32 / secs,
            draw_fps: (stats.draws - self.draws_at_start) as f32 / secs,
        };

        self.window_start = now;
        self.frames_at_start = stats.frames;
        self.draws_at_start = stats.draws;
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn no_report_before_window_closes() {
        let t0 = Instant::now();
        let mut meter = ThroughputMeter::starting_at(Duration::from_secs(5), t0);
        let stats = LoopStats { frames: 10, ..LoopStats::default() };
        assert!(meter.sample_at(&stats, t0 + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn rates_cover_only_the_closed_window() {
        let t0 = Instant::now();
        let mut meter = ThroughputMeter::starting_at(Duration::from_secs(2), t0);

        let stats = LoopStats { frames: 60, draws: 120, ..LoopStats::default() };
        let first = meter.sample_at(&stats, t0 + Duration::from_secs(2)).unwrap();
        assert_relative_eq!(first.sensor_fps, 30.0, epsilon = 1e-3);
        assert_relative_eq!(first.draw_fps, 60.0, epsilon = 1e-3);

        let stats = LoopStats { frames: 80, draws: 240, ..LoopStats::default() };
        let second = meter.sample_at(&stats, t0 + Duration::from_secs(4)).unwrap();
        assert_relative_eq!(second.sensor_fps, 10.0, epsilon = 1e-3);
        assert_relative_eq!(second.draw_fps, 60.0, epsilon = 1e-3);
    }
}
