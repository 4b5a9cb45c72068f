/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut},
    str::FromStr,
};

use anyhow::{bail, Context, Result};

use super::{
    destinations, Color, Move, MoveList, Occupancy, Piece, Position, Square, EMPTY_SYMBOL,
};

/// A 64-cell mailbox copy of a board, used as the search's private working state.
///
/// Cells are in square-index order (`a1`, `b1`, ..., `h8`). Each cell holds an explicit
/// `(color, kind)` [`Piece`] or nothing.
///
/// Serialized, this is a 64-character string: [`EMPTY_SYMBOL`] for an empty cell and a FEN letter
/// otherwise (uppercase for White).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompactState([Option<Piece>; Square::COUNT]);

impl CompactState {
    /// A state with every cell empty.
    #[inline(always)]
    pub const fn new() -> Self {
        Self([None; Square::COUNT])
    }

    /// Fetches the [`Piece`] in the cell for `square`, if any.
    #[inline(always)]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.0[square.index()]
    }

    /// The [`Occupancy`] of this state, for the move generator.
    pub fn occupancy(&self) -> Occupancy {
        let mut occupancy = Occupancy::default();
        for (square, piece) in self.iter() {
            occupancy.set(square, piece.color());
        }
        occupancy
    }

    /// Iterates over every occupied cell, from `a1` to `h8`.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| cell.map(|piece| (Square::from_index_unchecked(i), piece)))
    }

    /// Every pseudo-legal move for `color`.
    ///
    /// Source squares are scanned from `a1` to `h8`, and each piece's destinations keep
    /// the move generator's order. The search explores moves in exactly this order.
    pub fn pseudo_legal_moves(&self, color: Color) -> MoveList {
        let occupancy = self.occupancy();
        let mut moves = MoveList::new();
        for (square, piece) in self.iter().filter(|(_, piece)| piece.color() == color) {
            moves.extend(
                destinations(piece, square, &occupancy)
                    .into_iter()
                    .map(|to| Move::new(square, to, piece.kind())),
            );
        }
        moves
    }

    /// Moves the piece on `mv.from()` onto `mv.to()`, returning whatever was captured.
    ///
    /// Pass the result to [`CompactState::undo`] to restore the state.
    #[inline(always)]
    pub fn apply(&mut self, mv: Move) -> Option<Piece> {
        let moving = self.0[mv.from()].take();
        std::mem::replace(&mut self.0[mv.to()], moving)
    }

    /// Reverts [`CompactState::apply`], putting `captured` back on `mv.to()`.
    #[inline(always)]
    pub fn undo(&mut self, mv: Move, captured: Option<Piece>) {
        self.0[mv.from()] = std::mem::replace(&mut self.0[mv.to()], captured);
    }

    /// Rebuilds a [`Position`] from this state.
    pub fn to_position(&self) -> Position {
        let mut position = Position::new();
        for (square, piece) in self.iter() {
            position.place(piece, square);
        }
        position
    }

    /// Counts the leaf nodes of the pseudo-legal move tree, `depth` plies deep, with `color` moving first.
    ///
    /// # Example
    /// ```
    /// # use magpie::{Color, CompactState, Position};
    /// let mut state = CompactState::from(&Position::default());
    /// assert_eq!(state.perft(2, Color::White), 400);
    /// ```
    pub fn perft(&mut self, depth: usize, color: Color) -> u64 {
        if depth == 0 {
            return 1;
        }

        let moves = self.pseudo_legal_moves(color);
        if depth == 1 {
            return moves.len() as u64;
        }

        let mut nodes = 0;
        for mv in moves {
            let captured = self.apply(mv);
            nodes += self.perft(depth - 1, color.opponent());
            self.undo(mv, captured);
        }
        nodes
    }
}

impl Default for CompactState {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl From<&Position> for CompactState {
    fn from(position: &Position) -> Self {
        let mut cells = [None; Square::COUNT];
        for (square, piece) in position.iter() {
            cells[square] = Some(piece);
        }
        Self(cells)
    }
}

impl FromStr for CompactState {
    type Err = anyhow::Error;
    /// Parses a 64-character state string.
    ///
    /// # Example
    /// ```
    /// # use magpie::{CompactState, Piece, Square};
    /// let mut s = "0".repeat(64);
    /// s.replace_range(4..5, "K");
    /// let state: CompactState = s.parse().unwrap();
    /// assert_eq!(state.piece_at(Square::E1), Some(Piece::WHITE_KING));
    /// assert!("0".repeat(63).parse::<CompactState>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let len = s.chars().count();
        if len != Square::COUNT {
            bail!(
                "Compact state must be exactly {} symbols long. Got {len}",
                Square::COUNT
            );
        }

        let mut cells = [None; Square::COUNT];
        for (i, c) in s.chars().enumerate() {
            if c != EMPTY_SYMBOL {
                let piece = Piece::from_uci(c)
                    .with_context(|| format!("Invalid symbol at cell {i} of compact state"))?;
                cells[i] = Some(piece);
            }
        }
        Ok(Self(cells))
    }
}

impl Index<Square> for CompactState {
    type Output = Option<Piece>;
    #[inline(always)]
    fn index(&self, index: Square) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<Square> for CompactState {
    #[inline(always)]
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl fmt::Display for CompactState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols: String = self
            .0
            .iter()
            .map(|cell| cell.map_or(EMPTY_SYMBOL, |piece| piece.to_uci()))
            .collect();
        write!(f, "{symbols}")
    }
}

impl fmt::Debug for CompactState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompactState({self})")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::board::{FEN_KIWIPETE, START_PLACEMENT};

    const START_STATE: &str =
        "RNBQKBNRPPPPPPPP00000000000000000000000000000000pppppppprnbqkbnr";

    #[test]
    fn test_start_state_string() {
        let state = CompactState::from(&Position::default());
        assert_eq!(state.to_string(), START_STATE);
        assert_eq!(START_STATE.parse::<CompactState>().unwrap(), state);
        assert_eq!(state.to_position().to_placement(), START_PLACEMENT);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!("".parse::<CompactState>().is_err());
        assert!(format!("{START_STATE}0").parse::<CompactState>().is_err());
        assert!(START_STATE.replacen('0', "x", 1).parse::<CompactState>().is_err());
    }

    #[test]
    fn test_apply_undo_restores_state() {
        let position = Position::from_fen(FEN_KIWIPETE).unwrap();
        let original = CompactState::from(&position);

        for color in Color::all() {
            let mut state = original;
            for mv in state.pseudo_legal_moves(color) {
                let captured = state.apply(mv);
                assert_eq!(state.piece_at(mv.from()), None);
                assert_eq!(state.piece_at(mv.to()).map(|p| p.kind()), Some(mv.kind()));
                state.undo(mv, captured);
                assert_eq!(state, original, "{mv:?} was not undone");
            }
        }
    }

    #[test]
    fn test_moves_match_position() {
        let position = Position::from_fen(FEN_KIWIPETE).unwrap();
        let state = CompactState::from(&position);
        for color in Color::all() {
            assert_eq!(
                state.pseudo_legal_moves(color),
                position.pseudo_legal_moves(color),
                "{color:?}"
            );
        }
        assert_eq!(state.occupancy(), position.occupancy());
    }
}
