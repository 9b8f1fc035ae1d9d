use std::fmt::Write;

use memora_core::*;

/// Text display and audio cues on stdout.
#[derive(Debug, Default)]
pub struct TerminalObserver {
    bell: bool,
}

impl TerminalObserver {
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }
}

impl GameObserver for TerminalObserver {
    fn on_card_face_changed(&mut self, index: CardCount, face_up: bool) {
        log::trace!("Card {} face up: {}", index, face_up);
    }

    fn on_sound(&mut self, event: SoundEvent) {
        log::debug!("Sound {:?}", event);
        if self.bell && matches!(event, SoundEvent::Mismatch | SoundEvent::GameOver) {
            print!("\x07");
        }
    }

    fn on_matches_changed(&mut self, current: CardCount, total: CardCount) {
        println!("Matches: {current}/{total}");
    }

    fn on_turns_changed(&mut self, turns: u32) {
        println!("Turns: {turns}");
    }

    fn on_score_changed(&mut self, score: u32) {
        println!("Score: {score}");
    }

    fn on_victory(&mut self) {
        println!("Victory! You Won!");
    }
}

/// Grid with 1-based row and column labels, face-down cards shown as `#`.
pub fn render_board(board: &Board) -> String {
    let (_, columns) = board.size();
    let mut out = String::from("   ");
    for col in 1..=columns {
        let _ = write!(out, "{col:>4}");
    }
    out.push('\n');

    for (row, cards) in (1..).zip(board.rows()) {
        let _ = write!(out, "{row:>3}");
        for card in cards {
            if card.is_face_up() {
                let _ = write!(out, "{:>4}", card.id());
            } else {
                out.push_str("   #");
            }
        }
        out.push('\n');
    }
    out
}
