/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks,
    Bitboard, Color, Destinations, Piece, PieceKind, Rank, Square,
};

/// Which squares each side occupies.
///
/// This is the only view of a board the move generator needs, so both [`super::Position`]
/// and [`super::CompactState`] can produce one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Occupancy {
    colors: [Bitboard; Color::COUNT],
}

impl Occupancy {
    /// Creates a new [`Occupancy`] from each side's pieces.
    #[inline(always)]
    pub const fn new(white: Bitboard, black: Bitboard) -> Self {
        Self {
            colors: [white, black],
        }
    }

    /// Squares occupied by `color`.
    #[inline(always)]
    pub const fn color(&self, color: Color) -> Bitboard {
        self.colors[color.index()]
    }

    /// Squares occupied by either side.
    #[inline(always)]
    pub const fn all(&self) -> Bitboard {
        self.colors[0].or(self.colors[1])
    }

    /// Marks `square` as held by `color`.
    #[inline(always)]
    pub fn set(&mut self, square: Square, color: Color) {
        self.colors[color.index()].set(square);
    }
}

/// Computes the pseudo-legal destinations of `piece` standing on `square`.
///
/// Checks are ignored. Destinations holding a friendly piece are excluded, enemy pieces are capturable.
///
/// Pawns list their single push, then their double push, then the capture toward the a-file,
/// then the capture toward the h-file. All other pieces list their destinations in ascending square order.
///
/// # Example
/// ```
/// # use magpie::*;
/// let occupancy = Occupancy::new(Bitboard::from_square(Square::E2), Bitboard::EMPTY_BOARD);
/// let moves = destinations(Piece::WHITE_PAWN, Square::E2, &occupancy);
/// assert_eq!(moves.as_slice(), &[Square::E3, Square::E4]);
/// ```
pub fn destinations(piece: Piece, square: Square, occupancy: &Occupancy) -> Destinations {
    let (color, kind) = piece.parts();
    let friendly = occupancy.color(color);
    let blockers = occupancy.all();

    let reachable = match kind {
        PieceKind::Pawn => return pawn_destinations(color, square, occupancy),
        PieceKind::Knight => knight_attacks(square),
        PieceKind::Bishop => bishop_attacks(square, blockers),
        PieceKind::Rook => rook_attacks(square, blockers),
        PieceKind::Queen => queen_attacks(square, blockers),
        PieceKind::King => king_attacks(square),
    };

    (reachable & !friendly).into_iter().collect()
}

fn pawn_destinations(color: Color, square: Square, occupancy: &Occupancy) -> Destinations {
    let mut moves = Destinations::new();
    let empty = !occupancy.all();
    let enemies = occupancy.color(color.opponent());

    if let Some(single) = square.forward_by(color, 1).filter(|&sq| empty.contains(sq)) {
        moves.push(single);

        if square.rank() == Rank::second(color) {
            if let Some(double) = square.forward_by(color, 2).filter(|&sq| empty.contains(sq)) {
                moves.push(double);
            }
        }
    }

    // Ascending order puts the capture toward the a-file first.
    moves.extend(pawn_attacks(square, color) & enemies);

    moves
}
