/// Performance measurement utilities
/// Frame stages can be timed and reported through `tracing`
pub mod profiling;

pub use profiling::{CounterSnapshot, FunctionCounters, FUNCTION_COUNTERS};

use std::time::{Duration, Instant};

pub struct PerfTimer {
    name: &'static str,
    start: Instant,
}

impl PerfTimer {
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for PerfTimer {
    fn drop(&mut self) {
        let elapsed = self.elapsed();
        tracing::trace!(target: "splat_engine::perf", stage = self.name, micros = elapsed.as_micros() as u64, "timed");
    }
}

/// Rolling frame-time accumulator for the viewer's once-per-second report
#[derive(Debug, Default)]
pub struct FrameStats {
    pub frames: u32,
    pub render_us: f64,
    pub present_us: f64,
}

impl FrameStats {
    pub fn record(&mut self, render: Duration, present: Duration) {
        self.frames += 1;
        self.render_us += render.as_secs_f64() * 1e6;
        self.present_us += present.as_secs_f64() * 1e6;
    }

    /// Mean (render, present) time per frame in microseconds
    pub fn averages(&self) -> (f64, f64) {
        if self.frames == 0 {
            return (0.0, 0.0);
        }
        let n = self.frames as f64;
        (self.render_us / n, self.present_us / n)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Macro for easy performance measurement
#[macro_export]
macro_rules! perf_scope {
    ($name:expr) => {
        let _timer = $crate::perf::PerfTimer::new($name);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_stats_average() {
        let mut stats = FrameStats::default();
        assert_eq!(stats.averages(), (0.0, 0.0));
        stats.record(Duration::from_micros(100), Duration::from_micros(10));
        stats.record(Duration::from_micros(300), Duration::from_micros(30));
        let (render, present) = stats.averages();
        assert!((render - 200.0).abs() < 1e-6);
        assert!((present - 20.0).abs() < 1e-6);
        stats.reset();
        assert_eq!(stats.frames, 0);
    }
}
