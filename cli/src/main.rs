use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use memora_core::*;

use crate::store::JsonFileStore;
use crate::terminal::TerminalObserver;

mod play;
mod store;
mod terminal;

/// Memory matching card game: flip two cards at a time and find every pair.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,

    /// File the game is saved to
    #[arg(long, global = true, default_value = "memora-save.json")]
    save_file: PathBuf,

    /// Ring the terminal bell on mismatches and victory
    #[arg(long, global = true)]
    bell: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deal a fresh board
    New(NewArgs),
    /// Resume the saved game
    Continue,
    /// Delete the saved game
    Clear,
}

#[derive(Args, Debug, Default)]
struct NewArgs {
    /// Board preset: easy (2x2), medium (3x4) or hard (5x6)
    #[arg(short, long, value_parser = parse_difficulty, default_value = "medium")]
    difficulty: Difficulty,

    /// Custom number of rows, overrides the preset
    #[arg(long, requires = "columns")]
    rows: Option<Dim>,

    /// Custom number of columns, overrides the preset
    #[arg(long, requires = "rows")]
    columns: Option<Dim>,

    /// Seed for the shuffle, random when omitted
    #[arg(long)]
    seed: Option<u64>,
}

impl NewArgs {
    fn config(&self) -> Result<GameConfig> {
        match (self.rows, self.columns) {
            (Some(rows), Some(columns)) => {
                GameConfig::new(rows, columns).context("cannot deal that board")
            }
            _ => Ok(self.difficulty.config()),
        }
    }

    fn generator(&self) -> RandomDeckGenerator {
        match self.seed {
            Some(seed) => RandomDeckGenerator::new(seed),
            None => RandomDeckGenerator::from_entropy(),
        }
    }
}

fn parse_difficulty(value: &str) -> std::result::Result<Difficulty, String> {
    Difficulty::from_name(value).ok_or_else(|| format!("unknown difficulty `{value}`"))
}

fn new_game(args: &NewArgs, bell: bool, store: &mut JsonFileStore) -> Result<()> {
    let config = args.config()?;
    let generator = args.generator();
    log::info!("Dealing {}x{} board, seed {}", config.rows(), config.columns(), generator.seed());

    let mut engine = MatchEngine::new(
        config,
        generator,
        TerminalObserver::new(bell),
        TickScheduler::new(),
    )?;
    play::run(&mut engine, store)
}

fn continue_game(bell: bool, store: &mut JsonFileStore) -> Result<bool> {
    let saved = SavedSession::load(&*store)
        .with_context(|| format!("cannot resume from {}", store.path().display()))?;
    let Some(saved) = saved else {
        return Ok(false);
    };

    let mut engine = MatchEngine::restore(&saved, TerminalObserver::new(bell), TickScheduler::new())?;
    play::run(&mut engine, store)?;
    Ok(true)
}

/// Removes the save, `false` when there was nothing to remove.
fn clear_game(store: &mut JsonFileStore) -> Result<bool> {
    if !store.has_key(keys::ROWS) {
        log::debug!("Nothing to clear in {}", store.path().display());
        return Ok(false);
    }
    clear_save(store);
    store.flush()?;
    Ok(true)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbosity.log_level_filter())
        .format_timestamp(None)
        .init();

    let mut store = JsonFileStore::open(&cli.save_file)?;

    match &cli.command {
        Some(Command::New(args)) => new_game(args, cli.bell, &mut store),
        Some(Command::Continue) => {
            if !continue_game(cli.bell, &mut store)? {
                println!("No saved game found.");
            }
            Ok(())
        }
        Some(Command::Clear) => {
            if clear_game(&mut store)? {
                println!("Saved game deleted.");
            } else {
                println!("No saved game found.");
            }
            Ok(())
        }
        None => {
            if continue_game(cli.bell, &mut store)? {
                Ok(())
            } else {
                new_game(&NewArgs::default(), cli.bell, &mut store)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn clear_without_a_save_is_not_an_error() {
        let dir = std::env::temp_dir().join(format!("memora-{}-clear", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("save.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(!clear_game(&mut store).unwrap());

        store.set_int("Volume", 7);
        let engine = MatchEngine::new(
            Difficulty::Easy.config(),
            RandomDeckGenerator::new(3),
            (),
            ManualScheduler::new(),
        )
        .unwrap();
        engine.snapshot().save(&mut store);
        assert!(clear_game(&mut store).unwrap());

        let reopened = JsonFileStore::open(&path).unwrap();
        assert!(!reopened.has_key(keys::ROWS));
        assert_eq!(reopened.get_int("Volume"), Some(7));
        assert!(!clear_game(&mut JsonFileStore::open(&path).unwrap()).unwrap());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn custom_dimensions_override_the_preset() {
        let args = NewArgs {
            rows: Some(2),
            columns: Some(3),
            ..NewArgs::default()
        };
        assert_eq!(args.config().unwrap().size(), (2, 3));
        assert_eq!(NewArgs::default().config().unwrap(), Difficulty::Medium.config());

        let odd = NewArgs {
            rows: Some(3),
            columns: Some(3),
            ..NewArgs::default()
        };
        assert!(odd.config().is_err());
    }
}
