use alloc::collections::VecDeque;
use core::ops::BitOr;
use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Idle -> AwaitingPair (first card of a pair queued)
/// - AwaitingPair -> Resolving (pair complete, resolution scheduled)
/// - Resolving -> Idle | AwaitingPair (drain finished)
/// - Resolving -> Completed (last pair matched)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    #[default]
    Idle,
    AwaitingPair,
    Resolving,
    Completed,
}

impl EngineState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Outcome of a flip request or notification
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Matched, already face-up, already queued, or the game is over
    Ignored,
    /// First card of a pair is waiting for its partner
    Queued,
    /// A pair is complete and counted as a turn
    PairQueued,
}

impl FlipOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Outcome of a resolution cycle
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResolveOutcome {
    NoChange,
    Mismatched,
    Matched,
    Won,
}

impl ResolveOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Merges outcomes of the pairs drained in one cycle
impl BitOr for ResolveOutcome {
    type Output = ResolveOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use ResolveOutcome::*;
        match (self, rhs) {
            (Won, _) | (_, Won) => Won,
            (Matched, _) | (_, Matched) => Matched,
            (Mismatched, _) | (_, Mismatched) => Mismatched,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// Flip queue and match resolver for one board.
///
/// The engine is the single owner of the board, the pending flips and the
/// session counters, all mutation goes through it. Presentation is reached
/// through the [`GameObserver`], the reveal delay through the [`Scheduler`].
#[derive(Debug)]
pub struct MatchEngine<O, S> {
    board: Board,
    queue: VecDeque<CardCount>,
    session: Session,
    rules: ScoreRules,
    state: EngineState,
    /// Resolutions scheduled for a board that has since been replaced.
    stale_resolutions: usize,
    observer: O,
    scheduler: S,
}

impl<O: GameObserver, S: Scheduler> MatchEngine<O, S> {
    /// Starts a fresh game: game parameters first, then the shuffled cards.
    pub fn new(
        config: GameConfig,
        generator: impl DeckGenerator,
        observer: O,
        scheduler: S,
    ) -> Result<Self> {
        let rules = ScoreRules::default();
        let board = Board::new(config, generator.generate(config))?;
        let mut engine = Self {
            board,
            queue: VecDeque::new(),
            session: Session::new(config, &rules),
            rules,
            state: EngineState::Idle,
            stale_resolutions: 0,
            observer,
            scheduler,
        };
        engine.session.publish(&mut engine.observer);
        Ok(engine)
    }

    /// Rebuilds the exact board a save captured.
    pub fn restore(saved: &SavedSession, observer: O, scheduler: S) -> Result<Self> {
        let (board, session) = saved.rebuild()?;
        let state = if session.is_complete() {
            EngineState::Completed
        } else {
            EngineState::Idle
        };
        let mut engine = Self {
            board,
            queue: VecDeque::new(),
            session,
            rules: ScoreRules::default(),
            state,
            stale_resolutions: 0,
            observer,
            scheduler,
        };
        engine.announce_board();
        Ok(engine)
    }

    /// Replaces the score formula, the current score is recomputed.
    pub fn with_score_rules(mut self, rules: ScoreRules) -> Self {
        self.rules = rules;
        if self.session.update_score(&self.rules) {
            self.observer.on_score_changed(self.session.score());
        }
        self
    }

    /// Throws the current board away and deals a new one.
    ///
    /// Nothing changes when the generator does not produce a full deck.
    pub fn start_new(&mut self, config: GameConfig, generator: impl DeckGenerator) -> Result<()> {
        let board = Board::new(config, generator.generate(config))?;
        self.set_game_parameters(config);
        self.replace_board(board);
        Ok(())
    }

    /// Swaps in a saved board, the current one is kept if the save is invalid.
    pub fn load(&mut self, saved: &SavedSession) -> Result<()> {
        let (board, session) = saved.rebuild()?;
        self.session = session;
        self.replace_board(board);
        self.announce_board();
        Ok(())
    }

    fn set_game_parameters(&mut self, config: GameConfig) {
        self.session.set_game_parameters(config, &self.rules);
        self.session.publish(&mut self.observer);
    }

    fn replace_board(&mut self, board: Board) {
        if self.state == EngineState::Resolving {
            self.stale_resolutions += 1;
        }
        self.board = board;
        self.queue.clear();
        self.state = if self.session.is_complete() {
            EngineState::Completed
        } else {
            EngineState::Idle
        };
        log::debug!(
            "New {}x{} board, state {:?}",
            self.board.config().rows(),
            self.board.config().columns(),
            self.state
        );
    }

    fn announce_board(&mut self) {
        for (index, card) in (0..).zip(self.board.iter()) {
            if card.is_face_up() {
                self.observer.on_card_face_changed(index, true);
            }
        }
        self.session.publish(&mut self.observer);
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_completed(&self) -> bool {
        self.state.is_finished()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn score_rules(&self) -> &ScoreRules {
        &self.rules
    }

    /// Positions waiting for resolution, oldest first.
    pub fn queued(&self) -> impl Iterator<Item = CardCount> + '_ {
        self.queue.iter().copied()
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn snapshot(&self) -> SavedSession {
        SavedSession::capture(&self.board, &self.session)
    }

    /// Player input on a card: turns it face-up and notifies the queue.
    pub fn request_flip(&mut self, index: CardCount) -> Result<FlipOutcome> {
        let card = self.board.card_mut(index)?;
        if self.state.is_finished() || !card.is_flippable() {
            log::trace!("Ignoring flip request on card {}", index);
            return Ok(FlipOutcome::Ignored);
        }

        card.flip();
        self.observer.on_card_face_changed(index, true);
        self.observer.on_sound(SoundEvent::Flip);
        self.notify_flipped(index)
    }

    /// Flip notification from a card that just turned face-up.
    pub fn notify_flipped(&mut self, index: CardCount) -> Result<FlipOutcome> {
        let card = self.board.card(index)?;

        if self.state.is_finished() {
            log::warn!("Game already completed, ignoring flip of card {}", index);
            return Ok(FlipOutcome::Ignored);
        }
        if card.is_matched() || self.queue.contains(&index) {
            log::trace!("Card {} already matched or queued", index);
            return Ok(FlipOutcome::Ignored);
        }

        self.queue.push_back(index);
        log::trace!("Queued card {}, {} pending", index, self.queue.len());

        if self.queue.len() % 2 == 1 {
            if self.state == EngineState::Idle {
                self.state = EngineState::AwaitingPair;
            }
            return Ok(FlipOutcome::Queued);
        }

        let turns = self.session.record_turn();
        self.observer.on_turns_changed(turns);

        if self.state != EngineState::Resolving {
            self.state = EngineState::Resolving;
            self.scheduler.schedule(RESOLVE_DELAY);
            log::debug!("Pair complete, resolving in {:?}", RESOLVE_DELAY);
        }
        Ok(FlipOutcome::PairQueued)
    }

    /// Deferred resolution: compares queued cards two at a time.
    pub fn resolve_pending(&mut self) -> ResolveOutcome {
        if self.stale_resolutions > 0 {
            self.stale_resolutions -= 1;
            log::debug!("Dropping resolution scheduled for a replaced board");
            return ResolveOutcome::NoChange;
        }
        if self.state != EngineState::Resolving {
            return ResolveOutcome::NoChange;
        }

        let mut outcome = ResolveOutcome::NoChange;
        while self.queue.len() >= 2 {
            let (Some(first), Some(second)) = (self.queue.pop_front(), self.queue.pop_front())
            else {
                break;
            };
            outcome = outcome | self.resolve_pair(first, second);
            if self.session.is_complete() {
                outcome = ResolveOutcome::Won;
                break;
            }
        }

        if self.session.update_score(&self.rules) {
            self.observer.on_score_changed(self.session.score());
        }

        if outcome == ResolveOutcome::Won {
            self.queue.clear();
            self.state = EngineState::Completed;
            log::debug!(
                "Board completed in {} turns, score {}",
                self.session.turns_taken(),
                self.session.score()
            );
            self.observer.on_sound(SoundEvent::GameOver);
            self.observer.on_victory();
        } else if self.queue.is_empty() {
            self.state = EngineState::Idle;
        } else {
            self.state = EngineState::AwaitingPair;
        }
        outcome
    }

    fn resolve_pair(&mut self, first: CardCount, second: CardCount) -> ResolveOutcome {
        let ids = (
            self.board.card(first).map(Card::id),
            self.board.card(second).map(Card::id),
        );
        let (Ok(first_id), Ok(second_id)) = ids else {
            log::warn!("Queued cards {} and {} are not on the board", first, second);
            return ResolveOutcome::NoChange;
        };

        if first_id == second_id {
            for index in [first, second] {
                if let Ok(card) = self.board.card_mut(index) {
                    card.set_matched();
                    if card.reveal() {
                        self.observer.on_card_face_changed(index, true);
                    }
                }
            }
            let current = self.session.record_match();
            log::debug!("Cards {} and {} match, {} found", first, second, current);
            self.observer
                .on_matches_changed(current, self.session.total_matches());
            self.observer.on_sound(SoundEvent::Match);
            ResolveOutcome::Matched
        } else {
            for index in [first, second] {
                if let Ok(card) = self.board.card_mut(index) {
                    if card.is_face_up() && card.flip() {
                        self.observer.on_card_face_changed(index, false);
                    }
                }
            }
            self.session.record_mismatch();
            log::debug!("Cards {} and {} do not match", first, second);
            self.observer.on_sound(SoundEvent::Mismatch);
            ResolveOutcome::Mismatched
        }
    }
}

impl<O: GameObserver> MatchEngine<O, TickScheduler> {
    /// Advances the reveal timer and runs every resolution that became due.
    pub fn tick(&mut self, elapsed: Duration) -> ResolveOutcome {
        let due = self.scheduler.advance(elapsed);
        (0..due)
            .map(|_| self.resolve_pending())
            .fold(ResolveOutcome::NoChange, BitOr::bitor)
    }

    pub fn next_resolution_in(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    type TestEngine = MatchEngine<RecordingObserver, ManualScheduler>;

    fn engine(rows: Dim, columns: Dim, ids: &[CardId]) -> TestEngine {
        let config = GameConfig::new(rows, columns).unwrap();
        MatchEngine::new(
            config,
            FixedDeck::new(ids),
            RecordingObserver::new(),
            ManualScheduler::new(),
        )
        .unwrap()
    }

    #[test]
    fn new_game_publishes_initial_counters() {
        let engine = engine(2, 2, &[0, 1, 0, 1]);

        assert_eq!(
            engine.observer().events(),
            &[
                GameEvent::MatchesChanged { current: 0, total: 2 },
                GameEvent::TurnsChanged(0),
                GameEvent::ScoreChanged(5000),
            ]
        );
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn pair_schedules_one_resolution() {
        let mut engine = engine(2, 2, &[0, 1, 0, 1]);

        assert_eq!(engine.request_flip(0), Ok(FlipOutcome::Queued));
        assert_eq!(engine.state(), EngineState::AwaitingPair);
        assert!(engine.scheduler().requests().is_empty());

        assert_eq!(engine.request_flip(1), Ok(FlipOutcome::PairQueued));
        assert_eq!(engine.state(), EngineState::Resolving);
        assert_eq!(engine.scheduler().requests(), &[RESOLVE_DELAY]);
        assert_eq!(engine.session().turns_taken(), 1);
    }

    #[test]
    fn duplicate_notification_is_ignored() {
        let mut engine = engine(2, 2, &[0, 1, 0, 1]);

        engine.request_flip(0).unwrap();
        assert_eq!(engine.notify_flipped(0), Ok(FlipOutcome::Ignored));
        assert_eq!(engine.request_flip(0), Ok(FlipOutcome::Ignored));
        assert!(!FlipOutcome::Ignored.has_update());
        assert!(FlipOutcome::Queued.has_update());

        assert_eq!(engine.queued().collect::<Vec<_>>(), vec![0]);
        assert_eq!(engine.session().turns_taken(), 0);
    }

    #[test]
    fn mismatch_flips_both_back() {
        let mut engine = engine(2, 2, &[0, 1, 0, 1]);
        engine.request_flip(0).unwrap();
        engine.request_flip(1).unwrap();
        engine.observer_mut().take();

        assert_eq!(engine.resolve_pending(), ResolveOutcome::Mismatched);

        assert!(!engine.board().card(0).unwrap().is_face_up());
        assert!(!engine.board().card(1).unwrap().is_face_up());
        assert_eq!(engine.session().current_matches(), 0);
        assert_eq!(engine.session().mismatches(), 1);
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(
            engine.observer().events(),
            &[
                GameEvent::CardFaceChanged { index: 0, face_up: false },
                GameEvent::CardFaceChanged { index: 1, face_up: false },
                GameEvent::Sound(SoundEvent::Mismatch),
                GameEvent::ScoreChanged(4950),
            ]
        );
    }

    #[test]
    fn match_marks_both_cards() {
        let mut engine = engine(2, 2, &[0, 1, 0, 1]);
        engine.request_flip(0).unwrap();
        engine.request_flip(2).unwrap();

        assert_eq!(engine.resolve_pending(), ResolveOutcome::Matched);

        for index in [0, 2] {
            let card = engine.board().card(index).unwrap();
            assert!(card.is_matched());
            assert!(card.is_face_up());
        }
        assert_eq!(engine.session().current_matches(), 1);
        assert_eq!(engine.request_flip(0), Ok(FlipOutcome::Ignored));
        assert_eq!(engine.notify_flipped(2), Ok(FlipOutcome::Ignored));
    }

    #[test]
    fn flips_during_resolution_are_drained_together() {
        let mut engine = engine(2, 3, &[0, 1, 2, 0, 1, 2]);
        engine.request_flip(0).unwrap();
        engine.request_flip(1).unwrap();
        assert_eq!(engine.request_flip(3), Ok(FlipOutcome::Queued));
        assert_eq!(engine.state(), EngineState::Resolving);
        assert_eq!(engine.request_flip(4), Ok(FlipOutcome::PairQueued));

        assert_eq!(engine.session().turns_taken(), 2);
        assert_eq!(engine.scheduler().requests().len(), 1);

        assert_eq!(engine.resolve_pending(), ResolveOutcome::Mismatched);
        assert_eq!(engine.queued().count(), 0);
        assert_eq!(engine.session().current_matches(), 0);
        assert_eq!(engine.session().score(), 4900);
    }

    #[test]
    fn odd_leftover_waits_for_partner() {
        let mut engine = engine(2, 3, &[0, 1, 2, 0, 1, 2]);
        engine.request_flip(0).unwrap();
        engine.request_flip(3).unwrap();
        engine.request_flip(1).unwrap();

        assert_eq!(engine.resolve_pending(), ResolveOutcome::Matched);
        assert_eq!(engine.state(), EngineState::AwaitingPair);
        assert_eq!(engine.queued().collect::<Vec<_>>(), vec![1]);

        assert_eq!(engine.request_flip(4), Ok(FlipOutcome::PairQueued));
        assert_eq!(engine.scheduler().requests().len(), 2);
        assert_eq!(engine.resolve_pending(), ResolveOutcome::Matched);
    }

    #[test]
    fn resolve_without_pending_pair_is_noop() {
        let mut engine = engine(2, 2, &[0, 1, 0, 1]);
        engine.request_flip(0).unwrap();

        assert_eq!(engine.resolve_pending(), ResolveOutcome::NoChange);
        assert_eq!(engine.state(), EngineState::AwaitingPair);
    }

    #[test]
    fn victory_fires_once_and_locks_the_board() {
        let mut engine = engine(2, 2, &[0, 0, 1, 1]);
        for index in 0..4 {
            engine.request_flip(index).unwrap();
        }

        assert_eq!(engine.resolve_pending(), ResolveOutcome::Won);
        assert_eq!(engine.state(), EngineState::Completed);
        assert_eq!(engine.resolve_pending(), ResolveOutcome::NoChange);
        assert_eq!(engine.notify_flipped(1), Ok(FlipOutcome::Ignored));

        assert_eq!(engine.observer().count(GameEvent::Victory), 1);
        assert_eq!(
            engine.observer().count(GameEvent::Sound(SoundEvent::GameOver)),
            1
        );
        assert_eq!(engine.session().score(), 4900);
    }

    #[test]
    fn invalid_index_is_an_error() {
        let mut engine = engine(2, 2, &[0, 1, 0, 1]);

        assert_eq!(engine.request_flip(9), Err(GameError::InvalidCardIndex(9)));
        assert_eq!(engine.notify_flipped(4), Err(GameError::InvalidCardIndex(4)));
    }

    #[test]
    fn restart_drops_the_stale_resolution() {
        let mut engine = engine(2, 2, &[0, 1, 0, 1]);
        engine.request_flip(0).unwrap();
        engine.request_flip(1).unwrap();

        let config = GameConfig::new(2, 3).unwrap();
        engine
            .start_new(config, FixedDeck::new(&[0, 0, 1, 1, 2, 2]))
            .unwrap();
        assert_eq!(engine.session().total_matches(), 3);
        assert_eq!(engine.state(), EngineState::Idle);

        engine.request_flip(0).unwrap();
        engine.request_flip(1).unwrap();
        assert_eq!(engine.resolve_pending(), ResolveOutcome::NoChange);
        assert_eq!(engine.resolve_pending(), ResolveOutcome::Matched);
    }

    #[test]
    fn failed_restart_keeps_the_board() {
        let mut engine = engine(2, 2, &[0, 1, 0, 1]);
        engine.request_flip(0).unwrap();

        let config = GameConfig::new(2, 3).unwrap();
        assert_eq!(
            engine.start_new(config, FixedDeck::new(&[0, 0])),
            Err(GameError::InvalidBoardShape)
        );
        assert_eq!(engine.board().len(), 4);
        assert_eq!(engine.queued().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn unpaired_deck_is_not_dealt() {
        let config = GameConfig::new(2, 2).unwrap();
        let dealt = MatchEngine::new(
            config,
            FixedDeck::new(&[0, 1, 2, 3]),
            RecordingObserver::new(),
            ManualScheduler::new(),
        );
        assert_eq!(dealt.err(), Some(GameError::UnpairedDeck { id: 2, count: 1 }));

        let mut engine = engine(2, 2, &[0, 1, 0, 1]);
        engine.request_flip(0).unwrap();
        let events = engine.observer().events().len();

        let config = GameConfig::new(2, 3).unwrap();
        assert_eq!(
            engine.start_new(config, FixedDeck::new(&[0, 0, 1, 2, 2, 2])),
            Err(GameError::UnpairedDeck { id: 1, count: 1 })
        );
        assert_eq!(engine.board().len(), 4);
        assert_eq!(engine.session().total_matches(), 2);
        assert_eq!(engine.queued().collect::<Vec<_>>(), vec![0]);
        assert_eq!(engine.observer().events().len(), events);
    }

    #[test]
    fn custom_score_rules() {
        let engine = engine(2, 2, &[0, 1, 0, 1]).with_score_rules(ScoreRules::new(100, 10));

        assert_eq!(engine.session().score(), 100);
        assert_eq!(engine.score_rules().turn_penalty, 10);
    }

    #[test]
    fn tick_resolves_after_the_delay() {
        let config = GameConfig::new(2, 2).unwrap();
        let mut engine = MatchEngine::new(
            config,
            FixedDeck::new(&[0, 1, 1, 0]),
            (),
            TickScheduler::new(),
        )
        .unwrap();
        engine.request_flip(0).unwrap();
        engine.request_flip(3).unwrap();

        assert_eq!(engine.tick(Duration::from_millis(499)), ResolveOutcome::NoChange);
        assert_eq!(engine.next_resolution_in(), Some(Duration::from_millis(1)));
        assert_eq!(engine.tick(Duration::from_millis(1)), ResolveOutcome::Matched);
        assert_eq!(engine.next_resolution_in(), None);
    }
}
