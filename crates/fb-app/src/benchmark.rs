use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use arc_swap::ArcSwap;
use fb_core::config::{CharsetMode, ColorMode, DisplayConfig};
use fb_core::traits::{CancelSource, PixelSource};
use fb_render::fps::CaptureStats;
use fb_render::sink::CountingSink;

use crate::capture::CaptureLoop;

/// Frames rendered by a benchmark run.
pub const BENCH_FRAMES: u64 = 100;

/// Config du benchmark : 80×24, TrueColor, Simple, cadence libre.
///
/// Device, région et format viennent de `base`.
#[must_use]
pub fn benchmark_config(base: &DisplayConfig) -> DisplayConfig {
    DisplayConfig {
        output_width: 80,
        output_height: 24,
        color_mode: ColorMode::TrueColor,
        charset: CharsetMode::Simple,
        target_fps: 0,
        continuous: true,
        ..base.clone()
    }
}

/// Autorise exactement `n` itérations puis demande l'arrêt.
#[derive(Debug)]
pub struct FrameBudget {
    remaining: u64,
}

impl FrameBudget {
    /// Budget of `n` iterations.
    #[must_use]
    pub fn new(n: u64) -> Self {
        Self { remaining: n }
    }
}

impl CancelSource for FrameBudget {
    fn quit_requested(&mut self) -> bool {
        if self.remaining == 0 {
            return true;
        }
        self.remaining -= 1;
        false
    }
}

/// Benchmark result.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BenchReport {
    /// Loop statistics.
    pub stats: CaptureStats,
    /// Frame bytes per iteration, averaged.
    pub bytes_per_frame: f64,
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Itérations : {}", self.stats.frames)?;
        writeln!(f, "Durée      : {:.3} s", self.stats.elapsed.as_secs_f64())?;
        writeln!(f, "Débit      : {:.1} fps", self.stats.avg_fps())?;
        writeln!(f, "Par frame  : {:.3} ms", self.stats.ms_per_frame())?;
        write!(f, "Taille     : {:.0} octets/frame", self.bytes_per_frame)
    }
}

/// Rend [`BENCH_FRAMES`] frames dans un sink comptant, sans cadence.
///
/// # Errors
/// Propagates the source open error or a fatal render error.
///
/// # Example
/// ```
/// use fb_app::benchmark::{run_benchmark, BENCH_FRAMES};
/// use fb_core::config::DisplayConfig;
/// use fb_source::memory::MemorySource;
///
/// let report = run_benchmark(&DisplayConfig::default(), |_| Ok(MemorySource::solid(64, 48, (9, 9, 9)))).unwrap();
/// assert_eq!(report.stats.frames, BENCH_FRAMES);
/// ```
pub fn run_benchmark<S, O>(base: &DisplayConfig, open: O) -> Result<BenchReport>
where
    S: PixelSource,
    O: FnOnce(&DisplayConfig) -> Result<S>,
{
    let config = Arc::new(ArcSwap::from_pointee(benchmark_config(base)));
    let mut sink = CountingSink::new();
    let mut budget = FrameBudget::new(BENCH_FRAMES);
    let mut capture = CaptureLoop::new(config);
    let stats = capture.run(open, &mut sink, &mut budget)?;
    let bytes_per_frame = if stats.frames == 0 {
        0.0
    } else {
        sink.bytes as f64 / stats.frames as f64
    };
    Ok(BenchReport {
        stats,
        bytes_per_frame,
    })
}
