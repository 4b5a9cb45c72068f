/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io::{self, BufRead},
    ops::ControlFlow,
    time::Instant,
};

use anyhow::{bail, Context, Result};

use crate::{
    AiSetting, Cli, CompactState, EngineCommand, Evaluator, Game, Move, Position, SearchConfig,
    SearchResult, Square, BENCHMARK_PLACEMENTS,
};

/// Default depth at which to run the benchmark searches.
const BENCH_DEPTH: usize = 3;

/// An interactive shell around a [`Game`].
///
/// Reads [`EngineCommand`]s line by line and prints responses to stdout.
/// Diagnostics go through `tracing`, which the binary routes to stderr.
#[derive(Debug, Default)]
pub struct Engine {
    /// The game being played.
    game: Game,
}

impl Engine {
    /// Constructs a new [`Engine`] on the standard start position.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs an [`Engine`] configured by the binary's startup options.
    ///
    /// Fails if `cli.placement` is given but malformed.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut engine = Self::new();
        engine.game.set_config(SearchConfig::with_depth(cli.depth));

        if let Some(placement) = &cli.placement {
            if !engine.game.load_placement(placement) {
                bail!("Invalid starting placement {placement:?}");
            }
        }

        engine.set_ai(cli.ai);
        engine.let_ai_reply();
        Ok(engine)
    }

    /// Returns a string of the engine's name and current version.
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// The game this engine drives.
    #[inline(always)]
    pub const fn game(&self) -> &Game {
        &self.game
    }

    /// Execute the main loop, reading commands from `stdin` until `exit` or end of input.
    pub fn run(&mut self) -> Result<()> {
        tracing::info!("{} ready", self.name());

        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line.context("Failed to read a line from stdin")?;
            if self.execute_line(&line).is_break() {
                break;
            }
        }

        Ok(())
    }

    /// Parses and executes one line of input.
    ///
    /// Errors are reported and swallowed so the shell keeps running.
    /// Returns [`ControlFlow::Break`] once the engine should stop.
    pub fn execute_line(&mut self, line: &str) -> ControlFlow<()> {
        let line = line.trim();
        if line.is_empty() {
            return ControlFlow::Continue(());
        }

        match line.parse::<EngineCommand>() {
            Ok(cmd) => match self.execute(cmd) {
                Ok(flow) => flow,
                Err(e) => {
                    eprintln!("Error: {e:#}");
                    ControlFlow::Continue(())
                }
            },
            Err(e) => {
                eprintln!("{e}");
                ControlFlow::Continue(())
            }
        }
    }

    /// Execute a single [`EngineCommand`].
    pub fn execute(&mut self, cmd: EngineCommand) -> Result<ControlFlow<()>> {
        match cmd {
            EngineCommand::Ai { setting } => {
                self.set_ai(setting);
                self.let_ai_reply();
            }

            EngineCommand::Bench { depth } => self.bench(depth.unwrap_or(BENCH_DEPTH)),

            EngineCommand::Display => println!("{}", self.game),

            EngineCommand::Eval { pretty } => self.eval(pretty),

            EngineCommand::Exit => return Ok(ControlFlow::Break(())),

            EngineCommand::Flip => self.game.toggle_side_to_move(),

            EngineCommand::Go { depth, full_width } => {
                let config = SearchConfig {
                    depth: depth.unwrap_or(self.game.config().depth),
                    full_width,
                };
                let res = self.game.choose_move_with(self.game.side_to_move(), config);
                print_bestmove(&res);
            }

            EngineCommand::Load { placement } => {
                if !self.game.load_placement(&placement.join(" ")) {
                    bail!("Board cleared: placement was rejected");
                }
            }

            EngineCommand::Moves { square } => self.moves(square),

            EngineCommand::Perft { depth } => {
                let timer = Instant::now();
                let nodes = self.game.perft(depth);
                let elapsed = timer.elapsed();
                println!("{nodes}");
                tracing::info!(
                    "perft({depth}) = {nodes} in {}ms",
                    elapsed.as_millis()
                );
            }

            EngineCommand::Play { mv } => {
                self.play(&mv)?;
                self.let_ai_reply();
            }

            EngineCommand::Setstate { state } => {
                self.game.deserialize(&state)?;
            }

            EngineCommand::Startpos => {
                self.game.load_startpos();
                self.let_ai_reply();
            }

            EngineCommand::State => println!("{}", self.game.serialize()),
        }

        Ok(ControlFlow::Continue(()))
    }

    /// Applies the human's move, given as two squares.
    fn play(&mut self, mv: &str) -> Result<Move> {
        let (from, to) = Move::parse_squares(mv)?;
        let mv = self.game.make_move(from.index(), to.index())?;
        println!("played {mv}");
        Ok(mv)
    }

    /// Sets which color the automated opponent plays.
    fn set_ai(&mut self, setting: AiSetting) {
        match (setting, setting.color()) {
            (_, Some(color)) => self.game.enable_ai_for(color),
            (AiSetting::Off, None) => self.game.disable_ai(),
            (_, None) => self.game.enable_ai(),
        }
    }

    /// If it is the automated opponent's turn, let it play.
    fn let_ai_reply(&mut self) {
        if self.game.is_ai_turn() {
            let res = self.game.play_ai_move();
            print_bestmove(&res);
        }
    }

    /// Executes the `moves` command.
    fn moves(&self, square: Option<Square>) {
        let moves: Vec<String> = match square {
            Some(square) => self
                .game
                .moves_from(square.index())
                .into_iter()
                .map(|to| format!("{square}{to}"))
                .collect(),
            None => self
                .game
                .pseudo_legal_moves()
                .into_iter()
                .map(|mv| mv.to_string())
                .collect(),
        };

        if moves.is_empty() {
            println!("(none)");
        } else {
            println!("{}", moves.join(", "));
        }
    }

    /// Executes the `eval` command.
    fn eval(&self, pretty: bool) {
        let state = CompactState::from(self.game.position());
        let evaluator = Evaluator::new(&state, self.game.side_to_move());
        if pretty {
            println!("{evaluator}");
        }

        println!("{}", crate::evaluate(&state));
    }

    /// Executes the `bench` command: a fixed-depth search on each benchmark placement.
    ///
    /// The current game is left untouched.
    fn bench(&self, depth: usize) {
        let timer = Instant::now();
        let config = SearchConfig::with_depth(depth);
        let num_tests = BENCHMARK_PLACEMENTS.len();
        let mut nodes = 0;

        for (i, placement) in BENCHMARK_PLACEMENTS.into_iter().enumerate() {
            println!("Benchmark position {}/{}: {placement}", i + 1, num_tests);
            let position = match Position::from_placement(placement) {
                Ok(position) => position,
                Err(e) => {
                    tracing::warn!("Skipping benchmark placement {placement:?}: {e:#}");
                    continue;
                }
            };

            let res = Game::new(position).choose_move_with(self.game.side_to_move(), config);
            nodes += res.nodes;
        }

        let elapsed = timer.elapsed();
        let nps = (nodes as f64 / elapsed.as_secs_f64().max(f64::EPSILON)) as u64;
        println!("{nodes} nodes {nps} nps");
    }
}

/// Prints a search's chosen move, or `(none)` when there was nothing to play.
fn print_bestmove(res: &SearchResult) {
    match res.bestmove {
        Some(mv) => println!("bestmove {mv} score {}", res.score),
        None => println!("bestmove (none)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{initial_state, Color, Piece};

    fn run(engine: &mut Engine, lines: &[&str]) {
        for line in lines {
            assert!(engine.execute_line(line).is_continue(), "{line:?} stopped the engine");
        }
    }

    #[test]
    fn test_play_and_state() {
        let mut engine = Engine::new();
        run(&mut engine, &["play e2e4", "play e7e5", "play zz"]);
        assert_eq!(engine.game().piece_at(Square::E4), Some(Piece::WHITE_PAWN));
        assert_eq!(engine.game().piece_at(Square::E5), Some(Piece::BLACK_PAWN));
        assert_eq!(engine.game().side_to_move(), Color::White);
    }

    #[test]
    fn test_ai_replies_to_play() {
        let mut engine = Engine::new();
        run(&mut engine, &["ai black", "play e2e4"]);
        assert_eq!(engine.game().side_to_move(), Color::White);
        assert_ne!(engine.game().serialize(), initial_state());
    }

    #[test]
    fn test_ai_on_resumes_last_color() {
        let mut engine = Engine::new();
        run(&mut engine, &["ai on"]);
        assert_eq!(engine.game().ai_color(), Some(Color::Black));

        run(&mut engine, &["ai white", "ai off"]);
        assert_eq!(engine.game().ai_color(), None);
        assert_eq!(engine.game().preferred_ai_color(), Color::White);

        run(&mut engine, &["ai on"]);
        assert_eq!(engine.game().ai_color(), Some(Color::White));
    }

    #[test]
    fn test_load_and_setstate() {
        let mut engine = Engine::new();
        run(&mut engine, &["load 8/8/8/8"]);
        assert!(engine.game().occupied().is_empty());

        run(&mut engine, &["load 4k3/8/8/8/8/8/8/4K3 w - - 0 1"]);
        assert_eq!(engine.game().occupied().population(), 2);

        run(&mut engine, &["setstate short"]);
        assert_eq!(engine.game().occupied().population(), 2);

        let state = initial_state();
        run(&mut engine, &[&format!("setstate {state}")]);
        assert_eq!(engine.game().serialize(), state);
    }

    #[test]
    fn test_exit_breaks() {
        let mut engine = Engine::new();
        assert!(engine.execute_line("exit").is_break());
        assert!(engine.execute_line("   ").is_continue());
        assert!(engine.execute_line("nonsense").is_continue());
    }

    #[test]
    fn test_from_cli() {
        let cli = <Cli as clap::Parser>::try_parse_from([
            "magpie",
            "--placement",
            "4k3/8/8/3q4/8/8/3R4/4K3",
            "--depth",
            "1",
        ])
        .unwrap();
        let engine = Engine::from_cli(&cli).unwrap();
        assert_eq!(engine.game().config().depth, 1);
        assert_eq!(engine.game().ai_color(), None);
        assert_eq!(engine.game().occupied().population(), 4);

        let cli = <Cli as clap::Parser>::try_parse_from(["magpie", "-p", "8/8"]).unwrap();
        assert!(Engine::from_cli(&cli).is_err());
    }
}
