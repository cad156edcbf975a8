use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use fb_core::traits::CancelSource;

/// Touches de sortie : `q`, `Q`, `Esc`, `Ctrl+C` (raw mode).
///
/// Le poll utilise un timeout nul et ne bloque jamais la boucle. Les
/// autres événements en attente sont consommés et ignorés.
#[derive(Debug, Default)]
pub struct KeyboardCancel;

impl KeyboardCancel {
    fn is_quit_key(key: &KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        match key.code {
            KeyCode::Char('q' | 'Q') | KeyCode::Esc => true,
            KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
            _ => false,
        }
    }
}

impl CancelSource for KeyboardCancel {
    fn quit_requested(&mut self) -> bool {
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => return false,
                Err(e) => {
                    log::debug!("Poll clavier impossible : {e}");
                    return false;
                }
            }
            match event::read() {
                Ok(Event::Key(key)) if Self::is_quit_key(&key) => return true,
                Ok(_) => {}
                Err(e) => {
                    log::debug!("Lecture clavier impossible : {e}");
                    return false;
                }
            }
        }
    }
}

/// Drapeau levé par une interruption OS (SIGINT/SIGTERM via `ctrlc`).
#[derive(Debug, Clone)]
pub struct SignalCancel {
    flag: Arc<AtomicBool>,
}

impl SignalCancel {
    /// Install the process-wide interrupt handler.
    ///
    /// # Errors
    /// Fails if a handler is already installed for this process.
    pub fn install() -> Result<Self> {
        let flag = Arc::new(AtomicBool::new(false));
        let handler_flag = Arc::clone(&flag);
        ctrlc::set_handler(move || {
            handler_flag.store(true, Ordering::SeqCst);
        })
        .context("Impossible d'installer le handler d'interruption")?;
        Ok(Self { flag })
    }

    /// Wrap an existing flag, without touching signal handlers.
    #[must_use]
    pub fn from_flag(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }
}

impl CancelSource for SignalCancel {
    fn quit_requested(&mut self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Commandes envoyées au worker de capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureCommand {
    /// Stop before the next render.
    Stop,
}

/// Demande d'arrêt explicite via un canal `flume`.
///
/// La déconnexion de tous les émetteurs ne déclenche pas l'arrêt.
#[derive(Debug)]
pub struct ChannelCancel {
    rx: flume::Receiver<CaptureCommand>,
    stopped: bool,
}

/// Create a stop channel: keep the sender, hand the receiver to the loop.
///
/// # Example
/// ```
/// use fb_app::cancel::{stop_channel, CaptureCommand};
/// use fb_core::traits::CancelSource;
/// let (tx, mut cancel) = stop_channel();
/// assert!(!cancel.quit_requested());
/// tx.send(CaptureCommand::Stop).unwrap();
/// assert!(cancel.quit_requested());
/// ```
#[must_use]
pub fn stop_channel() -> (flume::Sender<CaptureCommand>, ChannelCancel) {
    let (tx, rx) = flume::unbounded();
    (tx, ChannelCancel { rx, stopped: false })
}

impl CancelSource for ChannelCancel {
    fn quit_requested(&mut self) -> bool {
        while !self.stopped {
            match self.rx.try_recv() {
                Ok(CaptureCommand::Stop) => self.stopped = true,
                Err(_) => break,
            }
        }
        self.stopped
    }
}

/// Composite : arrêt dès qu'un membre le demande. Collant.
#[derive(Default)]
pub struct AnyCancel {
    sources: Vec<Box<dyn CancelSource + Send>>,
    tripped: bool,
}

impl AnyCancel {
    /// Empty composite, never requests a quit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member.
    #[must_use]
    pub fn with(mut self, source: impl CancelSource + Send + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }
}

impl CancelSource for AnyCancel {
    fn quit_requested(&mut self) -> bool {
        if !self.tripped {
            self.tripped = self.sources.iter_mut().any(|s| s.quit_requested());
        }
        self.tripped
    }
}
