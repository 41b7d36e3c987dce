//! hand_chords — interactive entry point.

use std::io::{self, Write};
use std::time::Duration;

use chord_engine::ChordTable;
use hand_chords::app::{run, AppConfig};

fn main() {
    env_logger::init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Hand Chords — gesture-driven MIDI chord player        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("  Mode: Keyboard simulation — held keys stand in for raised fingers");
    println!();

    let cfg = if std::env::args().any(|a| a == "--quick") {
        println!("  Quick-start: D major scale, piano, 2.0 s sustain\n");
        AppConfig::default()
    } else {
        configure_interactively()
    };

    println!();
    println!("  Opening HUD window…");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn configure_interactively() -> AppConfig {
    let semitones: i8 = {
        let s = read_line("  Transpose semitones, -48..48 (default 0): ")
            .trim().parse().unwrap_or(0);
        s.clamp(-48, 48)
    };

    // A bad transposition is a startup error, not a mid-performance one.
    let table = match ChordTable::d_major_transposed(semitones) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let sustain_secs: f32 = {
        let s: f32 = read_line("  Sustain seconds (default 2.0): ")
            .trim().parse().unwrap_or(2.0);
        s.clamp(0.1, 30.0)
    };

    let channel: u8 = read_line("  MIDI channel 0-15 (default 0): ")
        .trim().parse::<u8>().unwrap_or(0).min(15);

    AppConfig {
        table,
        sustain: Duration::from_secs_f32(sustain_secs),
        channel,
        ..AppConfig::default()
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
