//! Snake Arcade entry point
//!
//! Runs one attract-mode game in the terminal: the autopilot steers, the
//! board is redrawn on every change, and the final score goes to the local
//! leaderboard.

use std::path::PathBuf;
use std::sync::mpsc;

use snake_arcade::engine::{Command, Engine};
use snake_arcade::feedback::{LogCuePlayer, SettingsFeedback, UiCue};
use snake_arcade::highscores::{HighScores, format_date};
use snake_arcade::persistence::Storage;
use snake_arcade::platform;
use snake_arcade::runtime::GameLoop;
use snake_arcade::scheduler::DeadlineScheduler;
use snake_arcade::settings::Settings;
use snake_arcade::sim::GamePhase;
use snake_arcade::snapshot::Snapshot;
use snake_arcade::tuning::Tuning;

const TUNING_ENV: &str = "SNAKE_TUNING";
const SEED_ENV: &str = "SNAKE_SEED";
const PLAYER_ENV: &str = "SNAKE_PLAYER";

fn main() {
    env_logger::init();
    log::info!("Snake Arcade starting...");

    let storage = Storage::from_env();
    let mut settings = Settings::load(&storage);
    if let Ok(name) = std::env::var(PLAYER_ENV) {
        settings.set_player_name(&name);
        settings.save(&storage);
        log::info!("Playing as {}", settings.display_name());
    }
    let mut scores = HighScores::load(&storage);
    let tuning = load_tuning();
    let seed = std::env::var(SEED_ENV)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(platform::clock_seed);
    log::info!("Seed {}", seed);

    let feedback = SettingsFeedback::new(LogCuePlayer, &settings);
    let mut engine = Engine::new(tuning, seed, scores.best, DeadlineScheduler::new(), feedback);

    // Boards come back to this thread; steering goes out as commands
    let (board_tx, board_rx) = mpsc::channel::<Snapshot>();
    engine.subscribe(Box::new(move |snap| {
        let _ = board_tx.send(snap.clone());
    }));

    let game = match GameLoop::spawn(engine) {
        Ok(game) => game,
        Err(e) => {
            log::error!("Failed to start game loop: {}", e);
            return;
        }
    };
    game.send(Command::Cue(UiCue::GameStart));

    let mut last = None;
    for snap in board_rx.iter() {
        print!("\x1b[H\x1b[2J{}", snap);
        if snap.phase == GamePhase::GameOver {
            last = Some(snap);
            break;
        }
        if let Some(direction) = snap.autopilot() {
            if direction != snap.direction {
                game.send(Command::ChangeDirection(direction));
            }
        }
    }

    let final_board = game.shutdown().or(last);
    let Some(final_board) = final_board else {
        log::error!("Game ended without a final board");
        return;
    };

    println!(
        "GAME OVER  score {}  time {:.1}s",
        final_board.score,
        final_board.elapsed_ms as f64 / 1000.0
    );
    record(&mut scores, &settings, final_board.score);
    scores.save(&storage);
    print_leaderboard(&scores);
}

/// Tuning from `SNAKE_TUNING`, falling back to the built-in curve
fn load_tuning() -> Tuning {
    let Some(path) = std::env::var_os(TUNING_ENV).map(PathBuf::from) else {
        return Tuning::default();
    };
    match Tuning::load(&path) {
        Ok(tuning) => {
            log::info!("Loaded tuning from {}", path.display());
            tuning
        }
        Err(e) => {
            log::warn!("Ignoring tuning {}: {}", path.display(), e);
            Tuning::default()
        }
    }
}

fn record(scores: &mut HighScores, settings: &Settings, score: u64) {
    if scores.record_best(score) {
        println!("NEW HIGH SCORE!");
    }
    if !settings.has_player_name() {
        log::info!("No player name set; leaderboard unchanged");
        return;
    }
    let name = settings.display_name();
    match scores.submit(name, score, platform::now_ms()) {
        Some(rank) => println!("{} placed #{}", name, rank),
        None => {
            if let Some(entry) = scores.entry_for(name) {
                println!("{}'s best is still {}", name, entry.score);
            }
        }
    }
}

fn print_leaderboard(scores: &HighScores) {
    if scores.is_empty() {
        return;
    }
    let now = platform::now_ms();
    if let Some(top) = scores.top_score() {
        println!("\nTOP SCORE {}", top);
    }
    println!("\n  # PLAYER               SCORE  WHEN");
    for (i, entry) in scores.entries.iter().enumerate() {
        println!(
            "{:>3} {:<20} {:>6}  {}",
            i + 1,
            entry.player,
            entry.score,
            format_date(entry.timestamp, now)
        );
    }
}
