use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use fb_app::capture::CaptureLoop;
use fb_core::config::DisplayConfig;
use fb_core::traits::CancelSource;
use fb_render::sink::CountingSink;
use fb_source::memory::MemorySource;
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Garde les messages de niveau `info` ou plus grave.
struct Recorder {
    loud: Mutex<Vec<String>>,
}

impl Log for Recorder {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if record.level() <= Level::Info {
            self.loud
                .lock()
                .unwrap()
                .push(format!("{}: {}", record.level(), record.args()));
        }
    }

    fn flush(&self) {}
}

static RECORDER: Recorder = Recorder {
    loud: Mutex::new(Vec::new()),
};

struct AfterFrames(u32);

impl CancelSource for AfterFrames {
    fn quit_requested(&mut self) -> bool {
        if self.0 == 0 {
            return true;
        }
        self.0 -= 1;
        false
    }
}

// Le terminal est en mode raw pendant la capture : un message sur stderr
// y casserait l'affichage, même avec --verbose.
#[test]
fn running_capture_stays_below_info() {
    log::set_logger(&RECORDER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let config = Arc::new(ArcSwap::from_pointee(DisplayConfig {
        output_width: 8,
        output_height: 4,
        target_fps: 0,
        ..Default::default()
    }));
    let mut capture = CaptureLoop::new(config);
    let mut sink = CountingSink::new();

    let stats = capture
        .run(
            |_| Ok(MemorySource::solid(32, 16, (40, 80, 120))),
            &mut sink,
            &mut AfterFrames(3),
        )
        .unwrap();

    assert_eq!(stats.frames, 3);
    let loud = RECORDER.loud.lock().unwrap();
    assert!(loud.is_empty(), "{loud:?}");
}
