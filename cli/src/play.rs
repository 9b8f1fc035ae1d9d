use std::io::{self, BufRead, Write};
use std::thread;

use anyhow::Result;
use memora_core::*;

use crate::store::JsonFileStore;
use crate::terminal::{TerminalObserver, render_board};

pub type Engine = MatchEngine<TerminalObserver, TickScheduler>;

#[derive(Debug, PartialEq)]
enum Input {
    Flip(CardCount),
    Save,
    Quit,
}

/// Parses `row col` (1-based), `s` or `q`.
fn parse_input(line: &str, config: GameConfig) -> Result<Input, String> {
    let mut words = line.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some("q" | "quit"), None, None) => Ok(Input::Quit),
        (Some("s" | "save"), None, None) => Ok(Input::Save),
        (Some(row), Some(col), None) => {
            let parse = |value: &str| {
                value
                    .parse::<Dim>()
                    .ok()
                    .and_then(|value| value.checked_sub(1))
                    .ok_or_else(|| format!("`{value}` is not a position"))
            };
            let pos = (parse(row)?, parse(col)?);
            config
                .index_of(pos)
                .map(Input::Flip)
                .ok_or_else(|| {
                    format!(
                        "rows go from 1 to {}, columns from 1 to {}",
                        config.rows(),
                        config.columns()
                    )
                })
        }
        _ => Err("enter `row col`, `s` to save or `q` to quit".to_owned()),
    }
}

fn save(engine: &Engine, store: &mut JsonFileStore) -> Result<()> {
    engine.snapshot().save(store);
    store.flush()
}

/// Runs until the board is cleared or the player quits, autosaving after every turn.
pub fn run(engine: &mut Engine, store: &mut JsonFileStore) -> Result<()> {
    let config = engine.board().config();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !engine.is_completed() {
        print!("{}> ", render_board(engine.board()));
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        match parse_input(&line?, config) {
            Ok(Input::Quit) => break,
            Ok(Input::Save) => {
                save(engine, store)?;
                println!("Saved to {}", store.path().display());
            }
            Ok(Input::Flip(index)) => match engine.request_flip(index)? {
                FlipOutcome::Ignored => println!("That card is already showing."),
                FlipOutcome::Queued => {}
                FlipOutcome::PairQueued => {
                    print!("{}", render_board(engine.board()));
                    io::stdout().flush()?;
                    while let Some(due) = engine.next_resolution_in() {
                        thread::sleep(due);
                        engine.tick(due);
                    }
                    if !engine.is_completed() {
                        save(engine, store)?;
                    }
                }
            },
            Err(message) => println!("{message}"),
        }
    }

    if engine.is_completed() {
        print!("{}", render_board(engine.board()));
        clear_save(store);
        store.flush()?;
    } else {
        save(engine, store)?;
        println!("Progress saved to {}", store.path().display());
    }
    Ok(())
}
