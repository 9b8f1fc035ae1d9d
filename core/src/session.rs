use serde::{Deserialize, Serialize};

use crate::*;

/// Aggregate counters shown on the scoreboard.
///
/// Mutators only change state, pushing the values to a [`GameObserver`] is a
/// separate step done by the engine (see [`Session::publish`]).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    current_matches: CardCount,
    total_matches: CardCount,
    turns_taken: u32,
    score: u32,
    /// Not persisted, restarts from zero on load.
    #[serde(skip)]
    mismatches: u32,
}

impl Session {
    pub fn new(config: GameConfig, rules: &ScoreRules) -> Self {
        let mut session = Self::default();
        session.set_game_parameters(config, rules);
        session
    }

    /// Counters exactly as they were saved.
    pub fn from_counters(
        current_matches: CardCount,
        total_matches: CardCount,
        turns_taken: u32,
        score: u32,
    ) -> Self {
        Self {
            current_matches,
            total_matches,
            turns_taken,
            score,
            mismatches: 0,
        }
    }

    /// Resets the counters for a fresh board.
    pub fn set_game_parameters(&mut self, config: GameConfig, rules: &ScoreRules) {
        self.current_matches = 0;
        self.total_matches = config.total_pairs();
        self.turns_taken = 0;
        self.mismatches = 0;
        self.score = rules.score_for(0);
    }

    pub fn current_matches(&self) -> CardCount {
        self.current_matches
    }

    pub fn total_matches(&self) -> CardCount {
        self.total_matches
    }

    pub fn turns_taken(&self) -> u32 {
        self.turns_taken
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn mismatches(&self) -> u32 {
        self.mismatches
    }

    pub fn is_complete(&self) -> bool {
        self.current_matches >= self.total_matches
    }

    pub fn record_turn(&mut self) -> u32 {
        self.turns_taken = self.turns_taken.saturating_add(1);
        self.turns_taken
    }

    pub fn record_match(&mut self) -> CardCount {
        self.current_matches = self
            .current_matches
            .saturating_add(1)
            .min(self.total_matches);
        self.current_matches
    }

    pub fn record_mismatch(&mut self) -> u32 {
        self.mismatches = self.mismatches.saturating_add(1);
        self.mismatches
    }

    /// Recomputes the score from the turns taken, returns whether it changed.
    pub fn update_score(&mut self, rules: &ScoreRules) -> bool {
        let score = rules.score_for(self.turns_taken);
        let changed = score != self.score;
        self.score = score;
        changed
    }

    /// Pushes every displayed value.
    pub fn publish(&self, observer: &mut impl GameObserver) {
        observer.on_matches_changed(self.current_matches, self.total_matches);
        observer.on_turns_changed(self.turns_taken);
        observer.on_score_changed(self.score);
    }
}
