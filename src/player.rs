//! Live playback: pumps the process-wide venue into the audio backend.

use bk_audio::{AudioOutput, CpalOutput};
use bk_engine::Venue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Drives `Venue::instance()` through the default audio device on a
/// background thread until stopped.
pub struct Player {
    stop_signal: Arc<AtomicBool>,
    failed: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Player {
    /// Start pumping samples. Queue pieces on `Venue::instance()` before
    /// or after starting; an empty queue just plays silence.
    pub fn start() -> Self {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let failed = Arc::new(AtomicBool::new(false));

        let stop = stop_signal.clone();
        let fail = failed.clone();
        let thread = std::thread::spawn(move || {
            audio_thread(stop, fail);
        });

        Self {
            stop_signal,
            failed,
            thread: Some(thread),
        }
    }

    /// Stop the pump and wait for the audio thread to exit.
    pub fn stop(&mut self) {
        self.stop_signal.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    /// False once the audio device could not be opened.
    pub fn is_running(&self) -> bool {
        self.thread.is_some() && !self.failed.load(Ordering::Relaxed)
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
    }
}

fn audio_thread(stop_signal: Arc<AtomicBool>, failed: Arc<AtomicBool>) {
    let Ok((mut output, consumer)) = CpalOutput::new() else {
        failed.store(true, Ordering::Relaxed);
        return;
    };
    let sample_rate = output.sample_rate();
    let time_delta = 1.0 / sample_rate as f64;

    if output.build_stream(consumer).is_err() {
        failed.store(true, Ordering::Relaxed);
        return;
    }
    let _ = output.start();

    let venue = Venue::instance();
    let mut global_time = 0.0;
    while !stop_signal.load(Ordering::Relaxed) {
        output.write_spin(venue.get_sample(0, global_time, time_delta));
        global_time += time_delta;
    }
}
