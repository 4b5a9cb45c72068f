/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Board representation, attack tables, and move generation.
pub mod board;

/// Command-line and shell command definitions.
mod cli;

/// Code related to the engine's functionality, such as user input handling.
mod engine;

/// Material evaluation of positions.
mod eval;

/// The game a host drives: side to move, automated opponent, and the host capability trait.
mod game;

/// Centipawn scores.
mod score;

/// Main engine logic; all search related code.
mod search;

/// Misc utility functions, constants, and types.
mod utils;

pub use board::*;
pub use cli::*;
pub use engine::*;
pub use eval::*;
pub use game::*;
pub use score::*;
pub use search::*;
pub use utils::*;
