use std::io::{self, Write};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::style::ResetColor;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};

/// Vrai tant qu'un guard tient le terminal (lu par le panic hook).
static TERMINAL_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Passe le terminal en mode capture et le restaure au drop.
///
/// Raw mode, écran alternatif et curseur masqué. La restauration a lieu
/// au drop, sur `restore`, ou depuis le panic hook.
pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    /// Enter raw mode and the alternate screen, hide the cursor.
    ///
    /// # Errors
    /// Returns an error when stdout is not a terminal.
    pub fn enter() -> io::Result<Self> {
        install_panic_hook();
        enable_raw_mode()?;
        TERMINAL_ACTIVE.store(true, Ordering::SeqCst);
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            restore_terminal();
            return Err(e);
        }
        log::debug!("Terminal en mode capture");
        Ok(Self { active: true })
    }

    /// Restore the terminal now; the drop becomes a no-op.
    ///
    /// # Errors
    /// Returns the first error hit while restoring.
    pub fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        TERMINAL_ACTIVE.store(false, Ordering::SeqCst);
        let mut out = io::stdout();
        execute!(out, ResetColor, Show, LeaveAlternateScreen)?;
        disable_raw_mode()?;
        out.flush()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            restore_terminal();
        }
    }
}

fn restore_terminal() {
    TERMINAL_ACTIVE.store(false, Ordering::SeqCst);
    let _ = execute!(io::stdout(), ResetColor, Show, LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

/// Restaure le terminal avant d'afficher le message de panic.
fn install_panic_hook() {
    static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);
    if HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if TERMINAL_ACTIVE.load(Ordering::SeqCst) {
            restore_terminal();
        }
        previous(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_round_trip_when_tty() {
        // Sans TTY (CI), l'entrée échoue proprement.
        match TerminalGuard::enter() {
            Ok(mut guard) => {
                assert!(TERMINAL_ACTIVE.load(Ordering::SeqCst));
                guard.restore().unwrap();
                assert!(!TERMINAL_ACTIVE.load(Ordering::SeqCst));
                drop(guard);
            }
            Err(e) => eprintln!("pas de TTY : {e}"),
        }
    }

    #[test]
    fn panic_hook_installs_once() {
        install_panic_hook();
        install_panic_hook();
    }
}
