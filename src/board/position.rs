/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::Index,
    str::FromStr,
};

use anyhow::{bail, Result};

use super::{
    destinations, Bitboard, Color, Destinations, File, Move, MoveList, Occupancy, Piece,
    PieceKind, Rank, Square, START_PLACEMENT,
};

/// All pieces and their locations on a chess board.
///
/// Holds one [`Bitboard`] per colored piece, plus per-color and whole-board aggregates.
/// The aggregates are recomputed from the twelve piece masks after every mutation,
/// so the two color masks are always disjoint and `occupied` is always their union.
///
/// Has no knowledge of side to move, castling rights, en passant or move counters.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Squares holding each kind of piece, per color.
    pieces: [[Bitboard; PieceKind::COUNT]; Color::COUNT],

    /// All squares occupied by a specific color.
    colors: [Bitboard; Color::COUNT],

    /// All occupied squares.
    occupied: Bitboard,
}

impl Position {
    /// Creates a new, empty [`Position`] containing no pieces.
    ///
    /// # Example
    /// ```
    /// # use magpie::Position;
    /// let position = Position::new();
    /// assert_eq!(position.to_placement(), "8/8/8/8/8/8/8/8");
    /// ```
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            pieces: [[Bitboard::EMPTY_BOARD; PieceKind::COUNT]; Color::COUNT],
            colors: [Bitboard::EMPTY_BOARD; Color::COUNT],
            occupied: Bitboard::EMPTY_BOARD,
        }
    }

    /// Parses the piece-placement field of a FEN string.
    ///
    /// The placement must contain exactly eight `/`-separated ranks, listed from rank 8 down to rank 1.
    /// Each rank holds piece letters (uppercase for White) and digits counting empty squares.
    /// Only the number of ranks is checked. A short rank leaves the rest of it empty,
    /// pieces beyond the h-file are dropped, and an unknown letter leaves its square empty.
    ///
    /// # Example
    /// ```
    /// # use magpie::{Position, Piece, Square};
    /// let position = Position::from_placement("4k3/8/8/8/8/8/4P3/4K3").unwrap();
    /// assert_eq!(position.piece_at(Square::E2), Some(Piece::WHITE_PAWN));
    /// assert_eq!(position.piece_at(Square::E8), Some(Piece::BLACK_KING));
    /// assert!(Position::from_placement("8/8/8/8/8/8/8").is_err());
    /// ```
    pub fn from_placement(placement: &str) -> Result<Self> {
        let ranks: Vec<&str> = placement.trim().split('/').collect();
        if ranks.len() != 8 {
            bail!(
                "Placement must have 8 ranks separated by '/'. Got {} in {placement:?}",
                ranks.len()
            );
        }

        let mut position = Self::new();

        // The first rank listed is rank 8, so walk them in reverse.
        for (rank, pieces) in Rank::iter().zip(ranks.into_iter().rev()) {
            let mut file = 0u32;

            for c in pieces.chars() {
                if let Some(empty) = c.to_digit(10) {
                    file += empty;
                    continue;
                }

                // Anything past the h-file is dropped.
                if file >= 8 {
                    break;
                }

                match Piece::from_uci(c) {
                    Ok(piece) => position.set(Square::new(File(file as u8), rank), piece),
                    Err(e) => tracing::warn!("Skipping a square in rank {rank} of {placement:?}: {e}"),
                }
                file += 1;
            }
        }

        position.refresh();
        Ok(position)
    }

    /// Parses a FEN string, using only its piece-placement field.
    ///
    /// Active color, castling rights, en passant and move counters may be present but are ignored.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let Some(placement) = fen.split_whitespace().next() else {
            bail!("FEN string is empty");
        };
        Self::from_placement(placement)
    }

    /// Generates the FEN piece-placement field for this [`Position`].
    ///
    /// # Example
    /// ```
    /// # use magpie::Position;
    /// let position = Position::default();
    /// assert_eq!(position.to_placement(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR");
    /// ```
    pub fn to_placement(&self) -> String {
        let mut placements: [String; 8] = Default::default();

        for rank in Rank::iter() {
            let mut empty_spaces = 0;
            for file in File::iter() {
                if let Some(piece) = self.piece_at(Square::new(file, rank)) {
                    if empty_spaces != 0 {
                        placements[rank.index()] += &empty_spaces.to_string();
                        empty_spaces = 0;
                    }
                    placements[rank.index()].push(piece.to_uci());
                } else {
                    empty_spaces += 1;
                }
            }

            if empty_spaces != 0 {
                placements[rank.index()] += &empty_spaces.to_string();
            }
        }
        placements.reverse();

        placements.join("/")
    }

    /// Re-derives the color and occupancy masks from the per-piece masks.
    fn refresh(&mut self) {
        for color in Color::all() {
            self.colors[color] = self.pieces[color]
                .iter()
                .fold(Bitboard::EMPTY_BOARD, |acc, &bb| acc | bb);
        }
        self.occupied = self.colors[Color::White] | self.colors[Color::Black];
    }

    /// Sets a bit in one piece mask, without touching the aggregates.
    #[inline(always)]
    fn set(&mut self, square: Square, piece: Piece) {
        let (color, kind) = piece.parts();
        self.pieces[color][kind].set(square);
    }

    /// Places `piece` on `square`, replacing whatever was there.
    ///
    /// Returns the replaced piece, if any.
    ///
    /// # Example
    /// ```
    /// # use magpie::{Position, Piece, Square};
    /// let mut position = Position::new();
    /// position.place(Piece::WHITE_KNIGHT, Square::C4);
    /// assert_eq!(position.to_placement(), "8/8/8/8/2N5/8/8/8");
    /// ```
    pub fn place(&mut self, piece: Piece, square: Square) -> Option<Piece> {
        let replaced = self.clear_square(square);
        self.set(square, piece);
        self.refresh();
        replaced
    }

    /// Takes the [`Piece`] from a given [`Square`], if there is one present.
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        let taken = self.clear_square(square);
        self.refresh();
        taken
    }

    /// Clears `square` from the piece masks, returning the piece that stood there.
    fn clear_square(&mut self, square: Square) -> Option<Piece> {
        let piece = self.piece_at(square)?;
        let (color, kind) = piece.parts();
        self.pieces[color][kind].clear(square);
        Some(piece)
    }

    /// Removes every piece from the board.
    #[inline(always)]
    pub fn clear_all(&mut self) {
        *self = Self::new();
    }

    /// Moves the piece on `mv.from()` onto `mv.to()`, overwriting anything there.
    ///
    /// Returns the captured piece, if any. Does nothing if `mv.from()` is empty.
    ///
    /// # Example
    /// ```
    /// # use magpie::{Move, PieceKind, Position, Square};
    /// let mut position = Position::default();
    /// let captured = position.make_move(Move::new(Square::E2, Square::E4, PieceKind::Pawn));
    /// assert!(captured.is_none());
    /// assert_eq!(position.to_placement(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR");
    /// ```
    pub fn make_move(&mut self, mv: Move) -> Option<Piece> {
        let piece = self.clear_square(mv.from())?;
        let captured = self.clear_square(mv.to());
        self.set(mv.to(), piece);
        self.refresh();
        captured
    }

    /// Fetches the [`Piece`] at the provided [`Square`], if there is one.
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        let color = if self.colors[Color::White].contains(square) {
            Color::White
        } else if self.colors[Color::Black].contains(square) {
            Color::Black
        } else {
            return None;
        };

        PieceKind::all()
            .into_iter()
            .find(|&kind| self.pieces[color][kind].contains(square))
            .map(|kind| Piece::new(color, kind))
    }

    /// Fetches the [`Bitboard`] of `color`'s pieces of `kind`.
    #[inline(always)]
    pub const fn piece_parts(&self, color: Color, kind: PieceKind) -> Bitboard {
        self.pieces[color.index()][kind.index()]
    }

    /// Fetches the [`Bitboard`] of all squares holding `piece`.
    #[inline(always)]
    pub const fn piece(&self, piece: Piece) -> Bitboard {
        self.piece_parts(piece.color(), piece.kind())
    }

    /// Fetches the [`Bitboard`] of every piece of `color`.
    #[inline(always)]
    pub const fn color(&self, color: Color) -> Bitboard {
        self.colors[color.index()]
    }

    /// Fetches the [`Bitboard`] of every occupied square.
    #[inline(always)]
    pub const fn occupied(&self) -> Bitboard {
        self.occupied
    }

    /// The [`Occupancy`] view the move generator works on.
    #[inline(always)]
    pub const fn occupancy(&self) -> Occupancy {
        Occupancy::new(self.colors[0], self.colors[1])
    }

    /// Pseudo-legal destinations of whatever piece is on `square`, or none if it is empty.
    ///
    /// # Example
    /// ```
    /// # use magpie::{Position, Square};
    /// let position = Position::default();
    /// assert_eq!(position.moves_from(Square::E2).as_slice(), &[Square::E3, Square::E4]);
    /// assert!(position.moves_from(Square::E4).is_empty());
    /// ```
    pub fn moves_from(&self, square: Square) -> Destinations {
        match self.piece_at(square) {
            Some(piece) => destinations(piece, square, &self.occupancy()),
            None => Destinations::new(),
        }
    }

    /// Every pseudo-legal move for `color`, by ascending source square.
    pub fn pseudo_legal_moves(&self, color: Color) -> MoveList {
        let occupancy = self.occupancy();
        let mut moves = MoveList::new();
        for square in self.color(color) {
            let Some(piece) = self.piece_at(square) else {
                continue;
            };
            moves.extend(
                destinations(piece, square, &occupancy)
                    .into_iter()
                    .map(|to| Move::new(square, to, piece.kind())),
            );
        }
        moves
    }

    /// An iterator over every `(Square, Piece)` pair, from `a1` to `h8`.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.occupied
            .into_iter()
            .filter_map(|square| self.piece_at(square).map(|piece| (square, piece)))
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;
    /// Wrapper for [`Position::from_fen`].
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl Default for Position {
    /// The standard starting position.
    fn default() -> Self {
        let mut position = Self::new();
        for (rank, back_rank) in [(Rank::ONE, Color::White), (Rank::EIGHT, Color::Black)] {
            let pawns = Rank::second(back_rank);
            for (file, kind) in File::iter().zip(BACK_RANK) {
                position.set(Square::new(file, rank), Piece::new(back_rank, kind));
                position.set(Square::new(file, pawns), Piece::new(back_rank, PieceKind::Pawn));
            }
        }
        position.refresh();
        debug_assert_eq!(position.to_placement(), START_PLACEMENT);
        position
    }
}

/// Piece kinds of the back rank, from the a-file to the h-file.
const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

impl Index<Color> for Position {
    type Output = Bitboard;
    #[inline(always)]
    fn index(&self, index: Color) -> &Self::Output {
        &self.colors[index]
    }
}

impl Index<Piece> for Position {
    type Output = Bitboard;
    #[inline(always)]
    fn index(&self, index: Piece) -> &Self::Output {
        &self.pieces[index.color()][index.kind()]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut board = String::with_capacity(198);

        for rank in Rank::iter().rev() {
            board += &format!("{rank}| ");

            for file in File::iter() {
                let occupant = match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => piece.to_uci(),
                    None => '.',
                };
                board.push(occupant);
                board.push(' ');
            }

            board += "\n"
        }
        board += " +";
        for _ in File::iter() {
            board += "--";
        }
        board += "\n   ";
        for file in File::iter() {
            board += &format!("{file} ");
        }

        write!(f, "{board}")
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({:?})", self.to_placement())
    }
}
