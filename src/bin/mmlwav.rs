//! mmlwav — renders Music Macro Language text files to WAV.
//!
//! Usage:
//!   mmlwav <input.mml> <output.wav>
//!
//! Input is line-oriented, one voice per line. Empty lines and lines
//! starting with '/' are comments.

use busker::Maestro;
use std::{env, fs, process};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: mmlwav <input.mml> <output.wav>");
        process::exit(1);
    }

    let text = fs::read_to_string(&args[1]).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", args[1], e);
        process::exit(2);
    });

    let voices: Vec<&str> = text
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with('/'))
        .collect();
    if voices.is_empty() {
        eprintln!("{} contains no voices", args[1]);
        process::exit(2);
    }

    let piece = Maestro::from_mml(&voices).unwrap_or_else(|e| {
        eprintln!("Failed to parse {}: {}", args[1], e);
        process::exit(3);
    });

    let sample_rate: u32 = 44100;
    println!("Voices:  {} ({} lines; voices with no notes are dropped)", piece.voices(), voices.len());

    let samples = busker::render_piece(piece, sample_rate);
    println!("Samples: {}", samples.len());
    println!("Length:  {:.3} s", samples.len() as f64 / sample_rate as f64);

    let wav = busker::samples_to_wav(&samples, sample_rate);
    fs::write(&args[2], &wav).unwrap_or_else(|e| {
        eprintln!("Failed to write {}: {}", args[2], e);
        process::exit(4);
    });

    println!("Done.");
}
