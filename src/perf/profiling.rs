/// Instrumentation for the splat pipeline
/// Function call counting plus optional hardware performance counters
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for pipeline tracking
pub struct FunctionCounters {
    // Frame counters
    pub render_calls: AtomicU64,
    pub framebuffer_clear_calls: AtomicU64,
    pub splats_projected: AtomicU64,

    // Pixel counters
    pub pixels_tested: AtomicU64,
    pub depth_test_passed: AtomicU64,
    pub depth_test_failed: AtomicU64,
}

impl FunctionCounters {
    pub const fn new() -> Self {
        Self {
            render_calls: AtomicU64::new(0),
            framebuffer_clear_calls: AtomicU64::new(0),
            splats_projected: AtomicU64::new(0),
            pixels_tested: AtomicU64::new(0),
            depth_test_passed: AtomicU64::new(0),
            depth_test_failed: AtomicU64::new(0),
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.render_calls.store(0, Ordering::Relaxed);
        self.framebuffer_clear_calls.store(0, Ordering::Relaxed);
        self.splats_projected.store(0, Ordering::Relaxed);
        self.pixels_tested.store(0, Ordering::Relaxed);
        self.depth_test_passed.store(0, Ordering::Relaxed);
        self.depth_test_failed.store(0, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            render_calls: self.render_calls.load(Ordering::Relaxed),
            framebuffer_clear_calls: self.framebuffer_clear_calls.load(Ordering::Relaxed),
            splats_projected: self.splats_projected.load(Ordering::Relaxed),
            pixels_tested: self.pixels_tested.load(Ordering::Relaxed),
            depth_test_passed: self.depth_test_passed.load(Ordering::Relaxed),
            depth_test_failed: self.depth_test_failed.load(Ordering::Relaxed),
        }
    }
}

impl Default for FunctionCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of counter values at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub render_calls: u64,
    pub framebuffer_clear_calls: u64,
    pub splats_projected: u64,
    pub pixels_tested: u64,
    pub depth_test_passed: u64,
    pub depth_test_failed: u64,
}

impl CounterSnapshot {
    /// Fraction of tested footprint pixels that won the depth test
    pub fn depth_pass_rate(&self) -> Option<f64> {
        (self.pixels_tested > 0).then(|| self.depth_test_passed as f64 / self.pixels_tested as f64)
    }

    /// Print formatted report
    pub fn print_report(&self) {
        println!("\n=== Performance Counters Report ===");
        println!("\nFrame Operations:");
        println!("  render calls:               {:12}", self.render_calls);
        println!("  framebuffer clear calls:    {:12}", self.framebuffer_clear_calls);
        println!("  splats projected:           {:12}", self.splats_projected);

        println!("\nPixel Operations:");
        println!("  footprint pixels tested:    {:12}", self.pixels_tested);
        println!("  depth test passed:          {:12}", self.depth_test_passed);
        println!("  depth test failed:          {:12}", self.depth_test_failed);
        if let Some(rate) = self.depth_pass_rate() {
            println!("  depth test pass rate:       {:11.2}%", rate * 100.0);
        }

        println!();
    }
}

/// Global function counters instance
pub static FUNCTION_COUNTERS: FunctionCounters = FunctionCounters::new();

/// Macro for incrementing a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_call {
    ($counter:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
    };
}

/// Macro for adding to a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_add {
    ($counter:expr, $value:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add($value, std::sync::atomic::Ordering::Relaxed);
        }
    };
}

/// Hardware performance counter wrapper for benchmarking
#[cfg(feature = "profiling")]
pub mod hardware {
    use perf_event::{events::Hardware, Builder, Counter};

    pub struct PerfCounters {
        pub cpu_cycles: Option<Counter>,
        pub instructions: Option<Counter>,
        pub cache_misses: Option<Counter>,
    }

    impl PerfCounters {
        pub fn new() -> Self {
            Self {
                cpu_cycles: Builder::new().kind(Hardware::CPU_CYCLES).build().ok(),
                instructions: Builder::new().kind(Hardware::INSTRUCTIONS).build().ok(),
                cache_misses: Builder::new().kind(Hardware::CACHE_MISSES).build().ok(),
            }
        }

        fn each(&mut self) -> impl Iterator<Item = &mut Counter> {
            [&mut self.cpu_cycles, &mut self.instructions, &mut self.cache_misses]
                .into_iter()
                .filter_map(Option::as_mut)
        }

        pub fn enable_all(&mut self) {
            for c in self.each() {
                let _ = c.enable();
            }
        }

        pub fn disable_all(&mut self) {
            for c in self.each() {
                let _ = c.disable();
            }
        }

        pub fn reset_all(&mut self) {
            for c in self.each() {
                let _ = c.reset();
            }
        }

        /// Count hardware events over a single call of `f`
        pub fn measure<R>(&mut self, f: impl FnOnce() -> R) -> (R, PerfSnapshot) {
            self.reset_all();
            self.enable_all();
            let result = f();
            self.disable_all();
            (result, self.read_all())
        }

        pub fn read_all(&mut self) -> PerfSnapshot {
            let read = |c: &mut Option<Counter>| c.as_mut().and_then(|c| c.read().ok()).unwrap_or(0);
            PerfSnapshot {
                cpu_cycles: read(&mut self.cpu_cycles),
                instructions: read(&mut self.instructions),
                cache_misses: read(&mut self.cache_misses),
            }
        }
    }

    impl Default for PerfCounters {
        fn default() -> Self {
            Self::new()
        }
    }

    #[derive(Debug, Clone, Copy)]
    pub struct PerfSnapshot {
        pub cpu_cycles: u64,
        pub instructions: u64,
        pub cache_misses: u64,
    }

    impl PerfSnapshot {
        pub fn print_report(&self) {
            println!("\n=== Hardware Performance Counters ===");
            println!("CPU Cycles:            {:16}", self.cpu_cycles);
            println!("Instructions:          {:16}", self.instructions);
            if self.cpu_cycles > 0 {
                let ipc = self.instructions as f64 / self.cpu_cycles as f64;
                println!("IPC (Instructions/Cycle): {:13.3}", ipc);
            }
            println!("Cache Misses:          {:16}", self.cache_misses);
            println!();
        }
    }
}
