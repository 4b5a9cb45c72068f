/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use clap::{Parser, ValueEnum};

use crate::{Color, Square, DEFAULT_SEARCH_DEPTH};

/// Startup options for the engine binary.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Search depth used by the automated opponent and `go`.
    #[arg(short, long, default_value_t = DEFAULT_SEARCH_DEPTH)]
    pub depth: usize,

    /// Piece placement to start from, instead of the standard start position.
    #[arg(short, long)]
    pub placement: Option<String>,

    /// Which color the automated opponent plays.
    #[arg(short, long, value_enum, default_value_t = AiSetting::Off)]
    pub ai: AiSetting,

    /// Engine commands to execute before reading from stdin, one per argument.
    #[arg(trailing_var_arg = true)]
    pub commands: Vec<String>,
}

/// Which side, if any, the automated opponent plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AiSetting {
    White,
    Black,
    /// Resume with whichever color the opponent last played (Black at first).
    On,
    Off,
}

impl AiSetting {
    /// The color explicitly chosen, if any.
    #[inline(always)]
    pub const fn color(&self) -> Option<Color> {
        match self {
            Self::White => Some(Color::White),
            Self::Black => Some(Color::Black),
            Self::On | Self::Off => None,
        }
    }
}

/// A command to be sent to the engine.
#[derive(Debug, Clone, Parser)]
#[command(
    multicall = true,
    about,
    rename_all = "lower",
    override_usage("<ENGINE COMMAND>")
)]
pub enum EngineCommand {
    /// Choose which color the automated opponent plays, or turn it off.
    Ai { setting: AiSetting },

    /// Run fixed-depth searches over a set of placements and report the total node count.
    Bench {
        /// Override the default benchmark depth.
        #[arg(short, long, required = false)]
        depth: Option<usize>,
    },

    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Print the material evaluation of the current position. Positive favors White.
    Eval {
        /// If set, each piece's contribution will be printed as well.
        #[arg(short, long, default_value = "false")]
        pretty: bool,
    },

    /// Quit the engine.
    #[command(alias = "quit")]
    Exit,

    /// Flips the side-to-move. Equivalent to passing.
    Flip,

    /// Search for the best move for the side to move, without playing it.
    Go {
        /// Override the configured search depth.
        #[arg(short, long, required = false)]
        depth: Option<usize>,

        /// Search every node, without alpha-beta cutoffs.
        #[arg(short, long, default_value = "false")]
        full_width: bool,
    },

    /// Replace the board with a FEN piece placement. Any further FEN fields are ignored.
    Load {
        #[arg(required = true)]
        placement: Vec<String>,
    },

    /// Shows all moves of the side to move, or the destinations of one piece.
    Moves { square: Option<Square> },

    /// Performs a perft on the current position at the supplied depth, printing total node count.
    Perft { depth: usize },

    /// Apply a move given as two squares, like `e2e4`, if it is allowed.
    ///
    /// If the automated opponent is enabled, it replies right away.
    Play { mv: String },

    /// Replace the board with a 64-symbol compact state.
    Setstate { state: String },

    /// Reset to the standard start position, White to move.
    Startpos,

    /// Print the board as a 64-symbol compact state.
    State,
}

impl FromStr for EngineCommand {
    type Err = clap::Error;
    /// Attempt to parse an [`EngineCommand`] from a string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse_from(s.split_ascii_whitespace())
    }
}
