use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Compteur FPS par fenêtre glissante. Zéro allocation après init.
///
/// # Example
/// ```
/// use fb_render::fps::FpsCounter;
/// use std::time::{Duration, Instant};
/// let mut counter = FpsCounter::new(8);
/// let t0 = Instant::now();
/// counter.record(t0);
/// counter.record(t0 + Duration::from_millis(100));
/// assert!((counter.fps() - 10.0).abs() < 1e-6);
/// ```
pub struct FpsCounter {
    /// Instants des N dernières frames.
    stamps: VecDeque<Instant>,
    window: usize,
    fps: f64,
    last_frame: Duration,
}

impl FpsCounter {
    /// Create a counter averaging over the last `window` frames (min 2).
    #[must_use]
    pub fn new(window: usize) -> Self {
        let window = window.max(2);
        Self {
            stamps: VecDeque::with_capacity(window + 1),
            window,
            fps: 0.0,
            last_frame: Duration::ZERO,
        }
    }

    /// Appeler une fois par frame, après la présentation.
    pub fn tick(&mut self) {
        self.record(Instant::now());
    }

    /// Record a frame completed at `now`.
    pub fn record(&mut self, now: Instant) {
        if let Some(&last) = self.stamps.back() {
            self.last_frame = now.saturating_duration_since(last);
        }
        self.stamps.push_back(now);
        if self.stamps.len() > self.window {
            self.stamps.pop_front();
        }
        if let (Some(&first), true) = (self.stamps.front(), self.stamps.len() >= 2) {
            let secs = now.saturating_duration_since(first).as_secs_f64();
            if secs > 0.0 {
                self.fps = (self.stamps.len() - 1) as f64 / secs;
            }
        }
    }

    /// FPS moyen sur la fenêtre.
    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Interval between the last two frames.
    #[must_use]
    pub fn last_frame(&self) -> Duration {
        self.last_frame
    }
}

/// Bilan d'une session de capture.
///
/// # Example
/// ```
/// use fb_render::fps::CaptureStats;
/// use std::time::Duration;
/// let stats = CaptureStats { frames: 50, elapsed: Duration::from_secs(5), ..Default::default() };
/// assert!((stats.avg_fps() - 10.0).abs() < 1e-9);
/// assert!((stats.ms_per_frame() - 100.0).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CaptureStats {
    /// Frames rendered and presented.
    pub frames: u64,
    /// Frames skipped on a transient render error.
    pub skipped: u64,
    /// Wall time between the first render and the stop.
    pub elapsed: Duration,
    /// Bytes written to the sink.
    pub bytes: u64,
}

impl CaptureStats {
    /// Mean frame rate, 0 when nothing ran.
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }

    /// Mean wall time per frame in milliseconds, 0 when nothing ran.
    #[must_use]
    pub fn ms_per_frame(&self) -> f64 {
        if self.frames == 0 {
            0.0
        } else {
            self.elapsed.as_secs_f64() * 1000.0 / self.frames as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_counter_reports_zero() {
        let counter = FpsCounter::new(60);
        assert!(counter.fps().abs() < f64::EPSILON);
        assert_eq!(counter.last_frame(), Duration::ZERO);
    }

    #[test]
    fn window_drops_old_frames() {
        let mut counter = FpsCounter::new(3);
        let t0 = Instant::now();
        // deux frames lentes puis trois rapides
        counter.record(t0);
        counter.record(t0 + Duration::from_secs(1));
        counter.record(t0 + Duration::from_millis(1050));
        counter.record(t0 + Duration::from_millis(1100));
        assert!((counter.fps() - 20.0).abs() < 1e-6, "{}", counter.fps());
        assert_eq!(counter.last_frame(), Duration::from_millis(50));
    }

    #[test]
    fn empty_stats() {
        let stats = CaptureStats::default();
        assert!(stats.avg_fps().abs() < f64::EPSILON);
        assert!(stats.ms_per_frame().abs() < f64::EPSILON);
    }
}
