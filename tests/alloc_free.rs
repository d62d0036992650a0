//! Allocation-free render path tests.
//!
//! These verify that `Venue::get_sample` does not touch the heap during
//! the realtime phase. Pieces are compiled and queued up front; the
//! sample loop then runs under `assert_no_alloc`, which aborts the test
//! on any allocation in debug builds.

use assert_no_alloc::{assert_no_alloc, AllocDisabler};

#[cfg(debug_assertions)]
#[global_allocator]
static A: AllocDisabler = AllocDisabler;

use busker::{Maestro, Venue};

const DT: f64 = 1.0 / 44100.0;

#[test]
fn steady_state_render_is_alloc_free() {
    let venue = Venue::new();
    // Sixteen bars of eighths: far longer than the drive below
    let line = "T120 L8 C D E F G A B > C < ".repeat(16);
    venue.queue_piece(Maestro::from_mml(&[&line]).unwrap());

    assert_no_alloc(|| {
        let mut time = 0.0;
        for _ in 0..44100 {
            venue.get_sample(0, time, DT);
            time += DT;
        }
    });
}

#[test]
fn looping_render_is_alloc_free() {
    let venue = Venue::new();
    venue.toggle_loop();
    // A short piece that wraps many times during the drive
    venue.queue_piece(Maestro::from_mml(&["T240 L16 C E G > C", "T240 L4 < C"]).unwrap());

    assert_no_alloc(|| {
        let mut time = 0.0;
        for _ in 0..44100 * 2 {
            venue.get_sample(0, time, DT);
            time += DT;
        }
    });
}

#[test]
fn chords_render_alloc_free() {
    let venue = Venue::new();
    let line = "L2 C,E,G C,F,A C,E,G ".repeat(8);
    venue.queue_piece(Maestro::from_mml(&[&line]).unwrap());

    assert_no_alloc(|| {
        let mut time = 0.0;
        for _ in 0..44100 {
            venue.get_sample(0, time, DT);
            time += DT;
        }
    });
}
