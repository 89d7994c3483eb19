//! Sound and haptic feedback
//!
//! The engine only announces named events through a [`FeedbackSink`]; what
//! they sound or feel like is decided here, gated by the player's settings.
//! Sinks are fire-and-forget and must never block a tick.

use crate::settings::Settings;

/// UI acknowledgement cues fired by menus and buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCue {
    /// Toggle (pause/resume)
    Check,
    /// Confirm / continue
    Forward,
    /// Back / exit
    Backward,
    /// New run started
    GameStart,
}

/// Named feedback event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackEvent {
    /// Snake ate a food item
    Eaten,
    /// Run ended
    GameOver,
    /// Interface acknowledgement
    Ui(UiCue),
}

impl FeedbackEvent {
    /// Name of the sound effect asset for this event
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackEvent::Eaten => "eaten",
            FeedbackEvent::GameOver => "game-over",
            FeedbackEvent::Ui(UiCue::Check) => "check",
            FeedbackEvent::Ui(UiCue::Forward) => "forward",
            FeedbackEvent::Ui(UiCue::Backward) => "backward",
            FeedbackEvent::Ui(UiCue::GameStart) => "game-start",
        }
    }

    /// Haptic pattern, if this event buzzes at all
    pub fn haptic(&self) -> Option<Haptic> {
        match self {
            FeedbackEvent::Eaten => Some(Haptic::Success),
            FeedbackEvent::GameOver => Some(Haptic::Error),
            FeedbackEvent::Ui(_) => None,
        }
    }
}

/// Notification-style haptic patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Haptic {
    Success,
    Error,
}

/// Receiver of named feedback events
pub trait FeedbackSink {
    fn notify(&mut self, event: FeedbackEvent);
}

impl<F: FnMut(FeedbackEvent)> FeedbackSink for F {
    fn notify(&mut self, event: FeedbackEvent) {
        self(event)
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFeedback;

impl FeedbackSink for NullFeedback {
    fn notify(&mut self, _event: FeedbackEvent) {}
}

/// Output device for cues
pub trait CuePlayer {
    /// Play a one-shot effect at `volume` (0.0 - 1.0)
    fn play_effect(&mut self, name: &'static str, volume: f32);
    fn buzz(&mut self, haptic: Haptic);
}

/// Player that only logs, for hosts without audio
#[derive(Debug, Clone, Copy, Default)]
pub struct LogCuePlayer;

impl CuePlayer for LogCuePlayer {
    fn play_effect(&mut self, name: &'static str, volume: f32) {
        log::debug!("♪ {} (volume {:.2})", name, volume);
    }

    fn buzz(&mut self, haptic: Haptic) {
        log::debug!("haptic {:?}", haptic);
    }
}

/// Routes events to a [`CuePlayer`] according to the player's settings
#[derive(Debug, Clone)]
pub struct SettingsFeedback<P> {
    player: P,
    sound_enabled: bool,
    vibration_enabled: bool,
    sfx_volume: f32,
}

impl<P: CuePlayer> SettingsFeedback<P> {
    pub fn new(player: P, settings: &Settings) -> Self {
        let mut feedback = Self {
            player,
            sound_enabled: true,
            vibration_enabled: true,
            sfx_volume: 1.0,
        };
        feedback.apply_settings(settings);
        feedback
    }

    /// Pick up changed preferences
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.sound_enabled = settings.sound_enabled;
        self.vibration_enabled = settings.vibration_enabled;
        self.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
    }

    pub fn player(&self) -> &P {
        &self.player
    }
}

impl<P: CuePlayer> FeedbackSink for SettingsFeedback<P> {
    fn notify(&mut self, event: FeedbackEvent) {
        if self.sound_enabled && self.sfx_volume > 0.0 {
            self.player.play_effect(event.as_str(), self.sfx_volume);
        }
        if self.vibration_enabled {
            if let Some(haptic) = event.haptic() {
                self.player.buzz(haptic);
            }
        }
    }
}
