//! Playback scheduling: the program queue, the clock, and the
//! audio-callback entry point.
//!
//! Two threads cooperate here. The application (producer) queues pieces
//! and flips flags; the audio callback (consumer) pulls one sample per
//! tick through `get_sample`. The queue lock is held only to append,
//! pop, or step the head piece. The completion callback runs on the
//! consumer thread with no lock held, so it may queue the next piece
//! itself. Chaining pieces from the callback is the only race-free way
//! to do it: `clear_queue` followed by `queue_music` on the producer
//! may flush the freshly queued piece.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use bk_ir::InstrumentMap;
use bk_mml::MmlError;

use crate::maestro::Maestro;

/// Invoked from the consumer thread when the queue flushes or runs dry.
pub type CompletionCallback = Arc<dyn Fn() + Send + Sync>;

/// The playback scheduler.
pub struct Venue {
    state: Mutex<VenueState>,
    stop_requested: AtomicBool,
    looping: AtomicBool,
    on_finished: Mutex<Option<CompletionCallback>>,
}

/// Consumer-side state: the program queue and the piece clock.
struct VenueState {
    program: VecDeque<Maestro>,
    /// Seconds into the head piece; `None` restarts at zero next tick.
    clock: Option<f64>,
}

impl Venue {
    /// A venue of its own, for offline rendering or tests.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(VenueState {
                program: VecDeque::new(),
                clock: None,
            }),
            stop_requested: AtomicBool::new(false),
            looping: AtomicBool::new(false),
            on_finished: Mutex::new(None),
        }
    }

    /// The process-wide venue, created on first access. Host audio
    /// callbacks are usually static functions, so playback state must
    /// be reachable without threading a handle through them.
    pub fn instance() -> &'static Venue {
        static INSTANCE: OnceLock<Venue> = OnceLock::new();
        INSTANCE.get_or_init(Venue::new)
    }

    // --- Producer API ---

    /// Compile the given voices and append the piece to the program.
    pub fn queue_music<S: AsRef<str>>(&self, music: &[S]) -> Result<(), MmlError> {
        self.queue_piece(Maestro::from_mml(music)?);
        Ok(())
    }

    /// Same, against a custom instrument map.
    pub fn queue_music_with<S: AsRef<str>>(
        &self,
        music: &[S],
        instruments: &InstrumentMap,
    ) -> Result<(), MmlError> {
        self.queue_piece(Maestro::from_mml_with(music, instruments)?);
        Ok(())
    }

    /// Append an already-compiled piece to the program.
    pub fn queue_piece(&self, piece: Maestro) {
        self.state.lock().unwrap().program.push_back(piece);
    }

    /// Request that the whole program be dropped. Honoured on the next
    /// consumer tick; until then the current piece may still sound.
    pub fn clear_queue(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Flip whether the head piece restarts on completion instead of
    /// being popped.
    pub fn toggle_loop(&self) {
        self.looping.fetch_xor(true, Ordering::AcqRel);
    }

    /// Whether the head piece currently restarts on completion.
    pub fn looping(&self) -> bool {
        self.looping.load(Ordering::Acquire)
    }

    /// Install the completion callback. It fires on the consumer thread
    /// when a flush completes and when the program runs dry, and may
    /// call `queue_music` and `toggle_loop` itself.
    pub fn set_completion_callback(&self, callback: impl Fn() + Send + Sync + 'static) {
        *self.on_finished.lock().unwrap() = Some(Arc::new(callback));
    }

    // --- Consumer API ---

    /// Produce the next sample. `channel` other than 0 yields silence.
    /// `global_time` is ignored: the venue keeps its own clock, driven
    /// by `time_delta`.
    pub fn get_sample(&self, channel: i32, _global_time: f64, time_delta: f64) -> f64 {
        if channel != 0 {
            return 0.0;
        }

        if self.stop_requested.swap(false, Ordering::AcqRel) {
            {
                let mut state = self.state.lock().unwrap();
                state.program.clear();
                state.clock = None;
            }
            self.notify_finished();
        }

        {
            let mut guard = self.state.lock().unwrap();
            let state = &mut *guard;
            if state.program.is_empty() {
                return 0.0;
            }
            if state.program.front().is_some_and(Maestro::finished) {
                if self.looping.load(Ordering::Acquire) {
                    if let Some(head) = state.program.front_mut() {
                        head.rewind();
                    }
                } else {
                    state.program.pop_front();
                }
                state.clock = None;
            }
            if let Some(head) = state.program.front_mut() {
                let time = state.clock.map_or(0.0, |clock| clock + time_delta);
                state.clock = Some(time);
                return head.play(time);
            }
        }

        // The program just ran dry: give the application one chance to
        // refill it before going quiet.
        self.notify_finished();

        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        if let Some(head) = state.program.front_mut() {
            let time = state.clock.map_or(0.0, |clock| clock + time_delta);
            state.clock = Some(time);
            return head.play(time);
        }
        0.0
    }

    /// Invoke the completion callback, if set, with no locks held.
    fn notify_finished(&self) {
        let callback = self.on_finished.lock().unwrap().clone();
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl Default for Venue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    const DT: f64 = 1.0 / 44100.0;

    fn short_piece() -> Maestro {
        Maestro::from_mml(&["T120 L16 C"]).unwrap()
    }

    #[test]
    fn empty_venue_is_silent() {
        let venue = Venue::new();
        assert_eq!(venue.get_sample(0, 0.0, DT), 0.0);
    }

    #[test]
    fn nonzero_channels_are_silent() {
        let venue = Venue::new();
        venue.queue_piece(short_piece());
        assert_eq!(venue.get_sample(1, 0.0, DT), 0.0);
        assert_eq!(venue.get_sample(-1, 0.0, DT), 0.0);
        // Channel 0 still plays from the start afterwards
        let mut piece = short_piece();
        assert_eq!(venue.get_sample(0, 0.0, DT), piece.play(0.0));
    }

    #[test]
    fn clock_starts_at_zero_and_steps_by_delta() {
        let venue = Venue::new();
        venue.queue_piece(short_piece());

        let mut piece = short_piece();
        assert_eq!(venue.get_sample(0, 99.0, DT), piece.play(0.0));
        assert_eq!(venue.get_sample(0, 99.0, DT), piece.play(DT));
        assert_eq!(venue.get_sample(0, 99.0, DT), piece.play(2.0 * DT));
    }

    #[test]
    fn finished_piece_is_popped_and_the_next_plays() {
        let venue = Venue::new();
        // The first piece peaks at 0.5, the second at full volume, so
        // any sample above 0.6 proves the pop happened.
        venue.queue_piece(short_piece());
        venue.queue_piece(Maestro::from_mml(&["V100 T120 L16 C"]).unwrap());

        let mut quiet_peak = 0.0f64;
        let mut loud_peak = 0.0f64;
        let mut time = 0.0;
        while time < 0.4 {
            let sample = venue.get_sample(0, 0.0, DT).abs();
            // A sixteenth at T120 is 0.125 s plus the release tail
            if time < 0.1 {
                quiet_peak = quiet_peak.max(sample);
            } else {
                loud_peak = loud_peak.max(sample);
            }
            time += DT;
        }
        assert!(quiet_peak <= 0.5, "first piece peaked at {}", quiet_peak);
        assert!(loud_peak > 0.6, "second piece never played: peak {}", loud_peak);
    }

    #[test]
    fn looping_replays_the_head() {
        let venue = Venue::new();
        venue.toggle_loop();
        assert!(venue.looping());
        venue.queue_piece(short_piece());

        // Run well past the piece's length; it must keep producing sound
        let mut nonzero_after_end = 0;
        let mut time = 0.0;
        for _ in 0..(44100 / 2) {
            let sample = venue.get_sample(0, 0.0, DT);
            if time > 0.2 && sample != 0.0 {
                nonzero_after_end += 1;
            }
            time += DT;
        }
        assert!(nonzero_after_end > 0, "looping piece went silent");
    }

    #[test]
    fn toggle_loop_twice_restores_popping() {
        let venue = Venue::new();
        venue.toggle_loop();
        venue.toggle_loop();
        assert!(!venue.looping());
    }

    #[test]
    fn clear_queue_takes_effect_next_tick_and_fires_once() {
        let venue = Arc::new(Venue::new());
        let flushes = Arc::new(AtomicUsize::new(0));
        let counter = flushes.clone();
        venue.set_completion_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        venue.queue_piece(short_piece());
        venue.get_sample(0, 0.0, DT);
        venue.clear_queue();

        assert_eq!(venue.get_sample(0, 0.0, DT), 0.0);
        assert_eq!(flushes.load(Ordering::SeqCst), 1);

        // Later ticks stay silent without further callbacks
        venue.get_sample(0, 0.0, DT);
        venue.get_sample(0, 0.0, DT);
        assert_eq!(flushes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn exhaustion_fires_the_callback_once() {
        let venue = Arc::new(Venue::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        venue.set_completion_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        venue.queue_piece(short_piece());
        let mut time = 0.0;
        while time < 0.5 {
            venue.get_sample(0, 0.0, DT);
            time += DT;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callback_may_requeue_for_seamless_chaining() {
        let venue = Arc::new(Venue::new());
        let chained = Arc::new(AtomicUsize::new(0));

        let handle = venue.clone();
        let counter = chained.clone();
        venue.set_completion_callback(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                handle.queue_piece(short_piece());
            }
        });

        venue.queue_piece(short_piece());
        let mut time = 0.0;
        let mut heard_after_first = false;
        while time < 0.5 {
            let sample = venue.get_sample(0, 0.0, DT);
            if chained.load(Ordering::SeqCst) == 1 && sample != 0.0 {
                heard_after_first = true;
            }
            time += DT;
        }
        assert!(heard_after_first, "requeued piece never sounded");
        assert_eq!(chained.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn queue_music_compiles_and_plays() {
        let venue = Venue::new();
        venue.queue_music(&["T120 L4 C"]).unwrap();
        let mut heard = false;
        for _ in 0..1000 {
            if venue.get_sample(0, 0.0, DT) != 0.0 {
                heard = true;
                break;
            }
        }
        assert!(heard);
    }

    #[test]
    fn queue_music_rejects_bad_mml() {
        let venue = Venue::new();
        assert!(venue.queue_music(&["T9999"]).is_err());
        assert_eq!(venue.get_sample(0, 0.0, DT), 0.0);
    }

    #[test]
    fn instance_returns_the_same_venue() {
        let a = Venue::instance() as *const Venue;
        let b = Venue::instance() as *const Venue;
        assert_eq!(a, b);
    }
}
