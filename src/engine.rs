//! Game engine: commands, tick scheduling and observation around the
//! deterministic simulation.
//!
//! The engine is the only owner of [`GameState`]. Commands and ticks both
//! take `&mut self`, so whoever hosts the engine serializes them and no tick
//! can observe a half-applied command.

use std::time::Duration;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::feedback::{FeedbackEvent, FeedbackSink, UiCue};
use crate::scheduler::{TickScheduler, TickTicket, VirtualScheduler};
use crate::sim::{self, Direction, GameEvent, GamePhase, GameState, TickReport};
use crate::snapshot::Snapshot;
use crate::tuning::Tuning;

/// Callback receiving a snapshot after every visible change
pub type Observer = Box<dyn FnMut(&Snapshot) + Send>;

/// Commands accepted from presentation/input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Resume,
    Reset,
    ChangeDirection(Direction),
    /// Play a UI acknowledgement through the engine's feedback sink
    Cue(UiCue),
}

/// Tick-driven Snake engine
pub struct Engine<S, F> {
    state: GameState,
    tuning: Tuning,
    rng: Pcg32,
    scheduler: S,
    feedback: F,
    /// Ticket of the live arm; None while ticks must not arrive
    armed: Option<TickTicket>,
    next_ticket: TickTicket,
    observers: Vec<Observer>,
}

impl<S: TickScheduler, F: FeedbackSink> Engine<S, F> {
    /// Create an engine with a fresh run already started
    pub fn new(tuning: Tuning, seed: u64, high_score: u64, scheduler: S, feedback: F) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let state = GameState::new(&tuning, high_score, &mut rng);
        let mut engine = Self {
            state,
            tuning,
            rng,
            scheduler,
            feedback,
            armed: None,
            next_ticket: TickTicket::first(),
            observers: Vec::new(),
        };
        log::info!("Engine created with seed {}", seed);
        engine.start();
        engine
    }

    // === Commands ===

    /// Enter Playing and (re)arm ticks at the current interval
    pub fn start(&mut self) {
        self.state.phase = GamePhase::Playing;
        self.state.elapsed = Duration::ZERO;
        self.arm();
        log::info!(
            "Game started, tick every {}ms",
            self.state.speed.interval.as_millis()
        );
        self.publish();
    }

    pub fn pause(&mut self) {
        if self.state.phase != GamePhase::Playing {
            return;
        }
        self.disarm();
        self.state.phase = GamePhase::Paused;
        log::info!("Paused");
        self.publish();
    }

    pub fn resume(&mut self) {
        if self.state.phase != GamePhase::Paused {
            return;
        }
        self.state.phase = GamePhase::Playing;
        self.arm();
        log::info!("Resumed");
        self.publish();
    }

    /// Throw away the run and start a fresh one; the high score survives
    pub fn reset(&mut self) {
        // Invalidate in-flight ticks before touching state
        self.disarm();
        self.state.reset(&self.tuning, &mut self.rng);
        self.arm();
        log::info!("Reset (high score {})", self.state.high_score);
        self.publish();
    }

    /// Turn unless it is a reversal. Takes effect on the next tick.
    pub fn change_direction(&mut self, direction: Direction) {
        let before = self.state.direction;
        if !self.state.steer(direction) {
            log::debug!("Ignored reversal {} -> {}", before.as_str(), direction.as_str());
            return;
        }
        if before != direction {
            self.publish();
        }
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::Reset => self.reset(),
            Command::ChangeDirection(direction) => self.change_direction(direction),
            Command::Cue(cue) => self.feedback.notify(FeedbackEvent::Ui(cue)),
        }
    }

    // === Ticks ===

    /// Deliver a scheduled tick. Tickets from a cancelled or replaced arm
    /// are dropped. Returns whether a simulation step ran.
    pub fn on_tick(&mut self, ticket: TickTicket) -> bool {
        if self.armed != Some(ticket) {
            log::trace!("Dropped stale tick {}", ticket.generation());
            return false;
        }

        let report = sim::tick(&mut self.state, &self.tuning, &mut self.rng);
        self.dispatch(&report);
        self.publish();
        true
    }

    fn dispatch(&mut self, report: &TickReport) {
        for event in &report.events {
            match event {
                GameEvent::Ate { at } => {
                    log::debug!("Ate at ({}, {}), score {}", at.x, at.y, self.state.score);
                    self.feedback.notify(FeedbackEvent::Eaten);
                }
                GameEvent::NewHighScore(score) => {
                    log::debug!("New high score {}", score);
                }
                GameEvent::FoodReplenished { count } => {
                    log::debug!("Placed {} food", count);
                }
                GameEvent::SpeedUp { .. } => {
                    // Full cancel + re-arm at the new cadence
                    self.arm();
                }
                GameEvent::GameOver { .. } => {
                    self.disarm();
                    self.feedback.notify(FeedbackEvent::GameOver);
                }
            }
        }
    }

    fn arm(&mut self) {
        let ticket = self.next_ticket;
        self.next_ticket = ticket.next();
        self.scheduler.cancel();
        self.scheduler.schedule(self.state.speed.interval, ticket);
        self.armed = Some(ticket);
    }

    fn disarm(&mut self) {
        self.scheduler.cancel();
        self.armed = None;
    }

    // === Observation ===

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::of(&self.state)
    }

    /// Push a snapshot to `observer` now and after every change
    pub fn subscribe(&mut self, mut observer: Observer) {
        observer(&self.snapshot());
        self.observers.push(observer);
    }

    fn publish(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for observer in &mut self.observers {
            observer(&snapshot);
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Ticket the scheduler is currently armed with
    pub fn armed_ticket(&self) -> Option<TickTicket> {
        self.armed
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

impl<F: FeedbackSink> Engine<VirtualScheduler, F> {
    /// Run virtual time forward by `by`, delivering every tick that falls
    /// due. Returns the number of simulation steps.
    pub fn advance(&mut self, by: Duration) -> usize {
        let until = self.scheduler.now() + by;
        let mut steps = 0;
        while let Some(ticket) = self.scheduler.pop_due(until) {
            if self.on_tick(ticket) {
                steps += 1;
            }
        }
        self.scheduler.set_now(until);
        steps
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::feedback::NullFeedback;
    use crate::sim::{Position, Snake};

    const MS: Duration = Duration::from_millis(1);

    type Recorded = Rc<RefCell<Vec<FeedbackEvent>>>;

    fn engine(high_score: u64) -> Engine<VirtualScheduler, NullFeedback> {
        Engine::new(Tuning::default(), 1, high_score, VirtualScheduler::new(), NullFeedback)
    }

    fn recording_engine(
        tuning: Tuning,
    ) -> (Engine<VirtualScheduler, impl FnMut(FeedbackEvent)>, Recorded) {
        let events: Recorded = Rc::default();
        let sink_events = events.clone();
        let engine = Engine::new(
            tuning,
            2,
            0,
            VirtualScheduler::new(),
            move |e: FeedbackEvent| sink_events.borrow_mut().push(e),
        );
        (engine, events)
    }

    #[test]
    fn test_new_engine_is_playing_and_armed() {
        let engine = engine(0);
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert!(engine.scheduler().is_armed());
        assert_eq!(engine.scheduler().interval(), Some(200 * MS));
    }

    #[test]
    fn test_ticks_move_snake() {
        let mut engine = engine(0);
        assert_eq!(engine.advance(199 * MS), 0);
        assert_eq!(engine.advance(MS), 1);
        assert_eq!(engine.state().snake.head(), Position::new(11, 10));
        assert_eq!(engine.advance(400 * MS), 2);
        assert_eq!(engine.state().time_ticks, 3);
    }

    #[test]
    fn test_reversal_is_ignored() {
        let mut engine = engine(0);
        engine.change_direction(Direction::Left);
        assert_eq!(engine.state().direction, Direction::Right);
        engine.change_direction(Direction::Down);
        assert_eq!(engine.state().direction, Direction::Down);
        engine.change_direction(Direction::Up);
        assert_eq!(engine.state().direction, Direction::Down);
    }

    #[test]
    fn test_pause_stops_ticks_and_resume_continues() {
        let mut engine = engine(0);
        engine.advance(200 * MS);
        let head = engine.state().snake.head();

        engine.pause();
        assert_eq!(engine.phase(), GamePhase::Paused);
        assert!(!engine.scheduler().is_armed());
        assert_eq!(engine.advance(Duration::from_secs(5)), 0);
        assert_eq!(engine.state().snake.head(), head);

        // Pausing twice or resuming while playing changes nothing
        engine.pause();
        assert_eq!(engine.phase(), GamePhase::Paused);

        engine.resume();
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert_eq!(engine.advance(200 * MS), 1);
        engine.resume();
        assert_eq!(engine.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_resume_keeps_ramped_interval() {
        let tuning = Tuning {
            first_speed_up_ms: 200,
            ..Tuning::default()
        };
        let mut engine = Engine::new(tuning, 3, 0, VirtualScheduler::new(), NullFeedback);
        engine.advance(200 * MS);
        assert_eq!(engine.scheduler().interval(), Some(150 * MS));

        engine.pause();
        engine.resume();
        assert_eq!(engine.scheduler().interval(), Some(150 * MS));
    }

    #[test]
    fn test_left_wall_game_over_stops_ticks() {
        let (mut engine, events) = recording_engine(Tuning::default());
        engine.change_direction(Direction::Up);
        engine.advance(200 * MS);
        engine.change_direction(Direction::Left);

        // Head at (10, 9): ten ticks to x = 0, the eleventh leaves the grid
        engine.advance(2_000 * MS);
        assert_eq!(engine.state().snake.head().x, 0);
        assert_eq!(engine.phase(), GamePhase::Playing);

        assert_eq!(engine.advance(200 * MS), 1);
        assert_eq!(engine.phase(), GamePhase::GameOver);
        assert!(!engine.scheduler().is_armed());
        assert_eq!(engine.armed_ticket(), None);
        assert_eq!(events.borrow().last(), Some(&FeedbackEvent::GameOver));

        assert_eq!(engine.advance(Duration::from_secs(10)), 0);
    }

    #[test]
    fn test_speed_threshold_changes_cadence_cleanly() {
        let tuning = Tuning {
            first_speed_up_ms: 1_000,
            ..Tuning::default()
        };
        let mut engine = Engine::new(tuning, 4, 0, VirtualScheduler::new(), NullFeedback);

        assert_eq!(engine.advance(1_300 * MS), 7);

        let times: Vec<Duration> = engine.scheduler().fired().iter().map(|t| t.at).collect();
        assert_eq!(
            times,
            vec![
                200 * MS,
                400 * MS,
                600 * MS,
                800 * MS,
                1_000 * MS,
                1_150 * MS,
                1_300 * MS
            ]
        );
        let fired = engine.scheduler().fired();
        assert_ne!(fired[4].ticket, fired[5].ticket);
        assert_eq!(fired[5].interval, 150 * MS);
        assert_eq!(engine.state().elapsed, 1_300 * MS);
    }

    #[test]
    fn test_reset_from_game_over() {
        let mut engine = engine(250);
        // Straight into the right wall
        engine.advance(Duration::from_secs(3));
        assert_eq!(engine.phase(), GamePhase::GameOver);

        engine.reset();

        let state = engine.state();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.snake, Snake::starting());
        assert_eq!(state.direction, Direction::Right);
        assert_eq!(state.score, 0);
        assert_eq!(state.high_score, 250);
        assert_eq!(state.elapsed, Duration::ZERO);
        assert_eq!(state.speed.step, 0);
        assert!(!state.foods.is_empty());
        assert!(engine.scheduler().is_armed());
        assert_eq!(engine.advance(200 * MS), 1);
    }

    #[test]
    fn test_stale_tick_after_reset_is_dropped() {
        let mut engine = engine(0);
        let old = engine.armed_ticket().unwrap();
        engine.reset();

        let before = engine.state().snake.clone();
        assert!(!engine.on_tick(old));
        assert_eq!(engine.state().snake, before);
        assert_eq!(engine.state().time_ticks, 0);
    }

    #[test]
    fn test_start_rearms() {
        let mut engine = engine(0);
        let first = engine.armed_ticket();
        engine.advance(100 * MS);
        engine.start();
        assert_ne!(engine.armed_ticket(), first);
        // Full interval from the restart, not from the old arm
        assert_eq!(engine.scheduler().next_due(), Some(300 * MS));
    }

    #[test]
    fn test_eating_fires_feedback_and_raises_high_score() {
        let (mut engine, events) = recording_engine(Tuning::default());
        // Keep ticking until something is eaten or the run ends
        let mut ate = false;
        for _ in 0..200 {
            let dir = sim::choose_direction(engine.state());
            engine.change_direction(dir);
            engine.advance(200 * MS);
            if engine.state().score > 0 {
                ate = true;
                break;
            }
        }
        assert!(ate);
        assert_eq!(events.borrow().first(), Some(&FeedbackEvent::Eaten));
        assert_eq!(engine.state().high_score, engine.state().score);
    }

    #[test]
    fn test_cue_command_reaches_feedback() {
        let (mut engine, events) = recording_engine(Tuning::default());
        engine.apply(Command::Cue(UiCue::Check));
        assert_eq!(*events.borrow(), vec![FeedbackEvent::Ui(UiCue::Check)]);
    }

    #[test]
    fn test_observers_see_every_change() {
        let mut engine = engine(0);
        let seen: Arc<Mutex<Vec<Snapshot>>> = Arc::default();
        let sink = seen.clone();
        engine.subscribe(Box::new(move |snap| {
            if let Ok(mut seen) = sink.lock() {
                seen.push(snap.clone());
            }
        }));

        engine.advance(200 * MS);
        engine.change_direction(Direction::Down);
        engine.change_direction(Direction::Up); // ignored, no snapshot
        engine.pause();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[1].head(), Some(Position::new(11, 10)));
        assert_eq!(seen[2].direction, Direction::Down);
        assert_eq!(seen[3].phase, GamePhase::Paused);
    }
}
