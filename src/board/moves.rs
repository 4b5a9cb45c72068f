/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::{bail, Context, Result};

use super::{PieceKind, Square};

/// Most destinations any single piece can have: a Queen in the middle of an empty board.
pub const MAX_DESTINATIONS: usize = 27;

/// Destination squares of one piece, in generation order.
pub type Destinations = arrayvec::ArrayVec<Square, MAX_DESTINATIONS>;

/// Every move available to one side.
///
/// Arbitrary placements can hold more pieces than a real game, so this list is not capped.
pub type MoveList = Vec<Move>;

/// A piece moving from one [`Square`] to another.
///
/// Captures are not flagged: whatever stood on the destination is simply replaced.
/// Internally packed into a `u16`:
/// ```text
/// 0kkk_tttt_ttff_ffff
/// ```
/// where `f` is the source square, `t` the destination and `k` the moving [`PieceKind`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Move(u16);

impl Move {
    /// Mask for the source ("from") bits.
    const SRC_MASK: u16 = 0b0000_0000_0011_1111;
    /// Mask for the destination ("to") bits.
    const DST_MASK: u16 = 0b0000_1111_1100_0000;
    /// Start index of destination bits.
    const DST_BITS: u16 = 6;
    /// Start index of the piece kind bits.
    const KND_BITS: u16 = 12;

    /// Creates a new [`Move`] of a `kind` piece from `from` to `to`.
    ///
    /// # Example
    /// ```
    /// # use magpie::{Move, PieceKind, Square};
    /// let e2e4 = Move::new(Square::E2, Square::E4, PieceKind::Pawn);
    /// assert_eq!(e2e4.from(), Square::E2);
    /// assert_eq!(e2e4.to(), Square::E4);
    /// assert_eq!(e2e4.kind(), PieceKind::Pawn);
    /// assert_eq!(e2e4.to_string(), "e2e4");
    /// ```
    #[inline(always)]
    pub const fn new(from: Square, to: Square, kind: PieceKind) -> Self {
        Self(
            (kind.bits() as u16) << Self::KND_BITS
                | (to.inner() as u16) << Self::DST_BITS
                | from.inner() as u16,
        )
    }

    /// Fetches the source (or "from") part of this [`Move`].
    #[inline(always)]
    pub const fn from(&self) -> Square {
        Square::from_index_unchecked((self.0 & Self::SRC_MASK) as usize)
    }

    /// Fetches the destination (or "to") part of this [`Move`].
    #[inline(always)]
    pub const fn to(&self) -> Square {
        Square::from_index_unchecked(((self.0 & Self::DST_MASK) >> Self::DST_BITS) as usize)
    }

    /// Fetches the [`PieceKind`] that makes this [`Move`].
    #[inline(always)]
    pub const fn kind(&self) -> PieceKind {
        PieceKind::from_bits_unchecked((self.0 >> Self::KND_BITS) as u8)
    }

    /// Splits a coordinate string like `e2e4` into its two squares.
    ///
    /// # Example
    /// ```
    /// # use magpie::{Move, Square};
    /// assert_eq!(Move::parse_squares("g1f3").unwrap(), (Square::G1, Square::F3));
    /// assert!(Move::parse_squares("g1").is_err());
    /// ```
    pub fn parse_squares(uci: &str) -> Result<(Square, Square)> {
        let uci = uci.trim();
        if uci.len() != 4 || !uci.is_ascii() {
            bail!("Move must be given as two squares, like \"e2e4\". Got {uci:?}");
        }
        let from = Square::from_uci(&uci[0..2]).context("Invalid source square")?;
        let to = Square::from_uci(&uci[2..4]).context("Invalid destination square")?;
        Ok((from, to))
    }

    /// Converts this [`Move`] to coordinate notation, like `e2e4`.
    #[inline(always)]
    pub fn to_uci(&self) -> String {
        format!("{}{}", self.from(), self.to())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.to_uci(), self.kind().name())
    }
}
