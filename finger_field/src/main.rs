//! finger_field — interactive entry point.

use finger_field::app::{run, AppConfig};
use std::io::{self, Write};

fn main() {
    // info+ unless RUST_LOG overrides
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Finger Field — Fingertip-Steered Particle Cloud       ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Mouse simulation  (use --features leap for hardware)");
    println!();

    let cfg = if std::env::args().any(|a| a == "--quick") {
        println!("  Quick-start: 5000 particles, random seed\n");
        AppConfig::default()
    } else {
        configure_interactively()
    };

    println!();
    println!("  Opening window…  (Q / Esc to quit)");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn configure_interactively() -> AppConfig {
    let defaults = AppConfig::default();

    let particle_count: usize = read_line("  Particles (default 5000): ")
        .trim().parse().unwrap_or(defaults.particle_count).clamp(1, 200_000);

    let seed: Option<u64> = read_line("  Seed (blank = random): ").trim().parse().ok();

    let model_delay_ms: u64 = read_line("  Simulated model load ms (default 600): ")
        .trim().parse().unwrap_or(defaults.model_delay_ms).min(60_000);

    let capture_fps: f64 = read_line("  Camera fps (default 30): ")
        .trim().parse().unwrap_or(defaults.capture_fps).clamp(1.0, 240.0);

    AppConfig {
        particle_count,
        seed,
        model_delay_ms,
        capture_fps,
        ..defaults
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
