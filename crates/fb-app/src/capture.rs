use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use arc_swap::ArcSwap;
use fb_core::config::DisplayConfig;
use fb_core::traits::{CancelSource, FrameSink, PixelSource};
use fb_render::fps::{CaptureStats, FpsCounter};

/// Consecutive `InvalidRegion` failures tolerated before the loop stops.
pub const MAX_REGION_FAILURES: u32 = 100;

/// Frames between two debug FPS lines.
const FPS_LOG_INTERVAL: u64 = 100;

/// État de la boucle de capture. `Stopped` est terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureState {
    /// Built, not started.
    Idle,
    /// Rendering frames.
    Running,
    /// Finished, for any reason.
    Stopped,
}

/// Boucle de capture : rendu, présentation, cadence, annulation.
///
/// La config est relue au début de chaque itération, un hot-reload prend
/// donc effet à la frame suivante. La source est fermée sur tous les
/// chemins de sortie.
pub struct CaptureLoop {
    config: Arc<ArcSwap<DisplayConfig>>,
    state: CaptureState,
    stats: CaptureStats,
}

impl CaptureLoop {
    /// New loop in [`CaptureState::Idle`], reading the shared config.
    #[must_use]
    pub fn new(config: Arc<ArcSwap<DisplayConfig>>) -> Self {
        Self {
            config,
            state: CaptureState::Idle,
            stats: CaptureStats::default(),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Statistics so far, final once [`CaptureState::Stopped`].
    #[must_use]
    pub fn stats(&self) -> CaptureStats {
        self.stats
    }

    /// Open the source and run until cancelled, completed or failed.
    ///
    /// `open` receives the config current at start. An open failure moves
    /// the loop straight to `Stopped` without rendering.
    ///
    /// # Errors
    /// - the error from `open`;
    /// - any render error other than `InvalidRegion`, or `InvalidRegion`
    ///   repeated [`MAX_REGION_FAILURES`] times in a row;
    /// - a sink write error.
    pub fn run<S, O, K, C>(&mut self, open: O, sink: &mut K, cancel: &mut C) -> Result<CaptureStats>
    where
        S: PixelSource,
        O: FnOnce(&DisplayConfig) -> Result<S>,
        K: FrameSink + ?Sized,
        C: CancelSource + ?Sized,
    {
        if self.state != CaptureState::Idle {
            bail!("Boucle de capture déjà lancée ({:?})", self.state);
        }

        let initial = self.config.load_full();
        let mut source = match open(&initial) {
            Ok(source) => source,
            Err(e) => {
                self.state = CaptureState::Stopped;
                log::error!("Ouverture de la source impossible : {e:#}");
                return Err(e);
            }
        };

        self.state = CaptureState::Running;
        log::debug!(
            "Capture : Idle → Running ({}×{} px → {}×{} car.)",
            source.width(),
            source.height(),
            initial.output_width,
            initial.output_height
        );

        let started = Instant::now();
        let outcome = self.drive(&source, sink, cancel);
        source.close();
        self.stats.elapsed = started.elapsed();
        self.state = CaptureState::Stopped;

        let stats = self.stats;
        match &outcome {
            Ok(()) => log::debug!(
                "Capture : Running → Stopped, {} frames en {:.2}s ({:.1} fps)",
                stats.frames,
                stats.elapsed.as_secs_f64(),
                stats.avg_fps()
            ),
            Err(e) => log::error!(
                "Capture interrompue après {} frames : {e:#}",
                stats.frames
            ),
        }
        outcome.map(|()| stats)
    }

    fn drive<S, K, C>(&mut self, source: &S, sink: &mut K, cancel: &mut C) -> Result<()>
    where
        S: PixelSource,
        K: FrameSink + ?Sized,
        C: CancelSource + ?Sized,
    {
        let mut fps = FpsCounter::new(30);
        let mut region_failures = 0u32;

        loop {
            if cancel.quit_requested() {
                log::debug!("Arrêt demandé");
                return Ok(());
            }

            let iteration = Instant::now();
            let config = self.config.load_full();

            match fb_ascii::render(source, &config) {
                Ok(frame) => {
                    if region_failures > 0 {
                        log::debug!("Région de nouveau valide après {region_failures} échecs");
                        region_failures = 0;
                    }
                    sink.present(&frame).context("Écriture du frame impossible")?;
                    self.stats.frames += 1;
                    self.stats.bytes += frame.byte_len() as u64;
                    fps.tick();
                    if self.stats.frames % FPS_LOG_INTERVAL == 0 {
                        log::debug!(
                            "{} frames, {:.1} fps, dernière {:.1} ms",
                            self.stats.frames,
                            fps.fps(),
                            fps.last_frame().as_secs_f64() * 1000.0
                        );
                    }
                }
                Err(e) if e.is_transient() => {
                    region_failures += 1;
                    if region_failures >= MAX_REGION_FAILURES {
                        return Err(e).context(format!(
                            "{region_failures} échecs de région consécutifs"
                        ));
                    }
                    if region_failures == 1 {
                        log::warn!("{e}, frame ignoré");
                    }
                    self.stats.skipped += 1;
                }
                Err(e) => return Err(e.into()),
            }

            if !config.continuous {
                log::debug!("Mode frame unique, arrêt");
                return Ok(());
            }

            if let Some(period) = config.frame_period() {
                let pause = period.saturating_sub(iteration.elapsed());
                if !pause.is_zero() {
                    std::thread::sleep(pause);
                }
            }
        }
    }
}

/// Lance la boucle sur un thread dédié `fb-capture`. L'appelant joint le
/// handle pour récupérer les statistiques ou l'erreur.
///
/// # Errors
/// Returns an error if the thread cannot be spawned.
pub fn spawn_capture<S, O, K, C>(
    config: Arc<ArcSwap<DisplayConfig>>,
    open: O,
    mut sink: K,
    mut cancel: C,
) -> std::io::Result<JoinHandle<Result<CaptureStats>>>
where
    S: PixelSource + 'static,
    O: FnOnce(&DisplayConfig) -> Result<S> + Send + 'static,
    K: FrameSink + Send + 'static,
    C: CancelSource + Send + 'static,
{
    std::thread::Builder::new()
        .name("fb-capture".into())
        .spawn(move || {
            let mut capture = CaptureLoop::new(config);
            capture.run(open, &mut sink, &mut cancel)
        })
}

