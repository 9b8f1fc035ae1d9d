use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::CardCount;

/// Sound cues emitted by the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEvent {
    Flip,
    Match,
    Mismatch,
    GameOver,
}

/// Presentation side of the game: renderer, audio and display surface.
///
/// All callbacks are fire-and-forget and are invoked after the engine state
/// has already been mutated, so implementations may read the engine freely
/// once control returns.
pub trait GameObserver {
    fn on_card_face_changed(&mut self, _index: CardCount, _face_up: bool) {}

    fn on_sound(&mut self, _event: SoundEvent) {}

    fn on_matches_changed(&mut self, _current: CardCount, _total: CardCount) {}

    fn on_turns_changed(&mut self, _turns: u32) {}

    fn on_score_changed(&mut self, _score: u32) {}

    fn on_victory(&mut self) {}
}

impl GameObserver for () {}

impl<T: GameObserver + ?Sized> GameObserver for &mut T {
    fn on_card_face_changed(&mut self, index: CardCount, face_up: bool) {
        (**self).on_card_face_changed(index, face_up)
    }

    fn on_sound(&mut self, event: SoundEvent) {
        (**self).on_sound(event)
    }

    fn on_matches_changed(&mut self, current: CardCount, total: CardCount) {
        (**self).on_matches_changed(current, total)
    }

    fn on_turns_changed(&mut self, turns: u32) {
        (**self).on_turns_changed(turns)
    }

    fn on_score_changed(&mut self, score: u32) {
        (**self).on_score_changed(score)
    }

    fn on_victory(&mut self) {
        (**self).on_victory()
    }
}

/// Observer callbacks captured as values.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    CardFaceChanged { index: CardCount, face_up: bool },
    Sound(SoundEvent),
    MatchesChanged { current: CardCount, total: CardCount },
    TurnsChanged(u32),
    ScoreChanged(u32),
    Victory,
}

/// Collects every callback in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordingObserver {
    events: Vec<GameEvent>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn take(&mut self) -> Vec<GameEvent> {
        core::mem::take(&mut self.events)
    }

    pub fn count(&self, event: GameEvent) -> usize {
        self.events.iter().filter(|&&seen| seen == event).count()
    }
}

impl GameObserver for RecordingObserver {
    fn on_card_face_changed(&mut self, index: CardCount, face_up: bool) {
        self.events
            .push(GameEvent::CardFaceChanged { index, face_up });
    }

    fn on_sound(&mut self, event: SoundEvent) {
        self.events.push(GameEvent::Sound(event));
    }

    fn on_matches_changed(&mut self, current: CardCount, total: CardCount) {
        self.events
            .push(GameEvent::MatchesChanged { current, total });
    }

    fn on_turns_changed(&mut self, turns: u32) {
        self.events.push(GameEvent::TurnsChanged(turns));
    }

    fn on_score_changed(&mut self, score: u32) {
        self.events.push(GameEvent::ScoreChanged(score));
    }

    fn on_victory(&mut self) {
        self.events.push(GameEvent::Victory);
    }
}
