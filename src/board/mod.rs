/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Precomputed attack tables: leapers at compile time, sliders through magic lookups.
mod attacks;

/// A set of squares stored in a `u64`.
mod bitboard;

/// Pseudo-legal destination generation.
mod movegen;

/// Packed moves and move lists.
mod moves;

/// Pieces, piece kinds, and colors.
mod piece;

/// Bitboard-based piece placement.
mod position;

/// Pseudo-random numbers for the magic search.
mod prng;

/// Squares, files, and ranks.
mod square;

/// The 64-cell working state used by the search.
mod state;

/// Board-related constants.
mod utils;

pub use attacks::*;
pub use bitboard::*;
pub use movegen::*;
pub use moves::*;
pub use piece::*;
pub use position::*;
pub use prng::*;
pub use square::*;
pub use state::*;
pub use utils::*;
