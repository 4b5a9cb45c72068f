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

use super::{Bitboard, Color};

/// One of the 64 squares, stored as its index `rank * 8 + file`.
///
/// `a1` is `0`, `h1` is `7` and `h8` is `63`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Square(pub(crate) u8);

/// Declares a named constant for every square.
macro_rules! square_consts {
    ($($name:ident = $index:literal),* $(,)?) => {
        impl Square {
            $(pub const $name: Self = Self($index);)*
        }
    };
}

square_consts!(
    A1 = 0, B1 = 1, C1 = 2, D1 = 3, E1 = 4, F1 = 5, G1 = 6, H1 = 7,
    A2 = 8, B2 = 9, C2 = 10, D2 = 11, E2 = 12, F2 = 13, G2 = 14, H2 = 15,
    A3 = 16, B3 = 17, C3 = 18, D3 = 19, E3 = 20, F3 = 21, G3 = 22, H3 = 23,
    A4 = 24, B4 = 25, C4 = 26, D4 = 27, E4 = 28, F4 = 29, G4 = 30, H4 = 31,
    A5 = 32, B5 = 33, C5 = 34, D5 = 35, E5 = 36, F5 = 37, G5 = 38, H5 = 39,
    A6 = 40, B6 = 41, C6 = 42, D6 = 43, E6 = 44, F6 = 45, G6 = 46, H6 = 47,
    A7 = 48, B7 = 49, C7 = 50, D7 = 51, E7 = 52, F7 = 53, G7 = 54, H7 = 55,
    A8 = 56, B8 = 57, C8 = 58, D8 = 59, E8 = 60, F8 = 61, G8 = 62, H8 = 63,
);

impl Square {
    pub const COUNT: usize = 64;

    const FILE_MASK: u8 = 0b0000_0111;

    /// All squares in index order, `a1` first.
    ///
    /// # Example
    /// ```
    /// # use magpie::Square;
    /// let squares: Vec<Square> = Square::iter().collect();
    /// assert_eq!(squares.len(), 64);
    /// assert_eq!(squares[0], Square::A1);
    /// assert_eq!(squares[63], Square::H8);
    /// ```
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }

    #[inline(always)]
    pub const fn new(file: File, rank: Rank) -> Self {
        Self(rank.0 << 3 | file.0)
    }

    /// The square at `index`, or an error if `index` is not in `[0, 64)`.
    ///
    /// # Example
    /// ```
    /// # use magpie::Square;
    /// assert_eq!(Square::from_index(26).unwrap(), Square::C4);
    /// assert!(Square::from_index(64).is_err());
    /// ```
    #[inline(always)]
    pub fn from_index(index: usize) -> Result<Self> {
        if index >= Self::COUNT {
            bail!("Square index out of range: expected 0 through 63, got {index}");
        }
        Ok(Self(index as u8))
    }

    /// Like [`Square::from_index`], for indices already known to be in range.
    #[inline(always)]
    pub const fn from_index_unchecked(index: usize) -> Self {
        debug_assert!(index < Self::COUNT);
        Self(index as u8)
    }

    #[inline(always)]
    pub const fn inner(&self) -> u8 {
        self.0
    }

    /// The index as a [`usize`], for table lookups.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub const fn file(&self) -> File {
        File(self.0 & Self::FILE_MASK)
    }

    #[inline(always)]
    pub const fn rank(&self) -> Rank {
        Rank(self.0 >> 3)
    }

    /// Shorthand for [`Bitboard::from_square`].
    #[inline(always)]
    pub const fn bitboard(&self) -> Bitboard {
        Bitboard::from_square(*self)
    }

    /// The square `file_delta` files and `rank_delta` ranks away, unless that falls off the board.
    ///
    /// # Example
    /// ```
    /// # use magpie::Square;
    /// assert_eq!(Square::C4.offset(1, 1), Some(Square::D5));
    /// assert_eq!(Square::C4.offset(-1, -1), Some(Square::B3));
    /// assert_eq!(Square::A1.offset(-1, -1), None);
    /// ```
    #[inline(always)]
    pub const fn offset(&self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        let Some(file) = self.file().offset(file_delta) else {
            return None;
        };

        let Some(rank) = self.rank().offset(rank_delta) else {
            return None;
        };

        Some(Self::new(file, rank))
    }

    /// The square `n` ranks ahead from `color`'s point of view, if there is one.
    ///
    /// # Example
    /// ```
    /// # use magpie::{Square, Color};
    /// assert_eq!(Square::C4.forward_by(Color::White, 1), Some(Square::C5));
    /// assert_eq!(Square::C4.forward_by(Color::Black, 2), Some(Square::C2));
    /// assert_eq!(Square::C8.forward_by(Color::White, 1), None);
    /// ```
    #[inline(always)]
    pub const fn forward_by(&self, color: Color, n: u8) -> Option<Self> {
        self.offset(0, n as i8 * color.negation_multiplier())
    }

    /// Parses a coordinate like `e4`. The file letter may be uppercase.
    ///
    /// # Example
    /// ```
    /// # use magpie::Square;
    /// assert_eq!(Square::from_uci("c4").unwrap(), Square::C4);
    /// assert!(Square::from_uci("z0").is_err());
    /// ```
    #[inline(always)]
    pub fn from_uci(square: &str) -> Result<Self> {
        let chars: Vec<char> = square.chars().collect();
        let [file, rank] = chars[..] else {
            bail!("Expected a square such as \"e4\", got {square:?}");
        };

        let file = File::from_char(file).with_context(|| format!("Bad square {square:?}"))?;
        let rank = Rank::from_char(rank).with_context(|| format!("Bad square {square:?}"))?;
        Ok(Self::new(file, rank))
    }

    /// Coordinate form, such as `e4`.
    #[inline(always)]
    pub fn to_uci(self) -> String {
        format!("{}{}", self.file(), self.rank())
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl<T> Index<Square> for [T; Square::COUNT] {
    type Output = T;
    #[inline(always)]
    fn index(&self, index: Square) -> &Self::Output {
        &self[index.index()]
    }
}

impl<T> IndexMut<Square> for [T; Square::COUNT] {
    #[inline(always)]
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self[index.index()]
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_uci(), f)
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.to_uci(), self.0)
    }
}

/// One of the eight ranks (rows) of the board, numbered from White's side.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Rank(pub(crate) u8);

impl Rank {
    pub const ONE: Self = Self(0);
    pub const TWO: Self = Self(1);
    pub const SEVEN: Self = Self(6);
    pub const EIGHT: Self = Self(7);

    /// `ONE` up to `EIGHT`.
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (0..8).map(Self)
    }

    /// Parses a [`Rank`] from a digit in `1..=8`.
    #[inline(always)]
    pub fn from_char(rank: char) -> Result<Self> {
        match rank {
            '1'..='8' => Ok(Self(rank as u8 - b'1')),
            _ => bail!("Expected a rank digit 1 through 8, got {rank:?}"),
        }
    }

    /// The rank on which pawns of `color` start.
    ///
    /// # Example
    /// ```
    /// # use magpie::{Color, Rank};
    /// assert_eq!(Rank::second(Color::White), Rank::TWO);
    /// assert_eq!(Rank::second(Color::Black), Rank::SEVEN);
    /// ```
    #[inline(always)]
    pub const fn second(color: Color) -> Self {
        match color {
            Color::White => Self::TWO,
            Color::Black => Self::SEVEN,
        }
    }

    #[inline(always)]
    pub const fn offset(&self, delta: i8) -> Option<Self> {
        match offset_coordinate(self.0, delta) {
            Some(rank) => Some(Self(rank)),
            None => None,
        }
    }

    #[inline(always)]
    pub const fn inner(&self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub const fn char(&self) -> char {
        (self.0 + b'1') as char
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rank({})", self.char())
    }
}

/// One of the eight files (columns) of the board, `a` through `h`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct File(pub(crate) u8);

impl File {
    /// `a` up to `h`.
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (0..8).map(Self)
    }

    /// Parses a [`File`] from a letter in `a..=h` (either case).
    #[inline(always)]
    pub fn from_char(file: char) -> Result<Self> {
        match file.to_ascii_lowercase() {
            c @ 'a'..='h' => Ok(Self(c as u8 - b'a')),
            _ => bail!("Expected a file letter a through h, got {file:?}"),
        }
    }

    #[inline(always)]
    pub const fn offset(&self, delta: i8) -> Option<Self> {
        match offset_coordinate(self.0, delta) {
            Some(file) => Some(Self(file)),
            None => None,
        }
    }

    #[inline(always)]
    pub const fn inner(&self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub const fn char(&self) -> char {
        (self.0 + b'a') as char
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File({})", self.char())
    }
}

/// Shifts a rank or file coordinate, staying within `0..8`.
#[inline(always)]
const fn offset_coordinate(coord: u8, delta: i8) -> Option<u8> {
    let shifted = coord as i8 + delta;
    if shifted >= 0 && shifted < 8 {
        Some(shifted as u8)
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_square_layout() {
        assert_eq!(Square::A1.index(), 0);
        assert_eq!(Square::H1.index(), 7);
        assert_eq!(Square::A2.index(), 8);
        assert_eq!(Square::E4.index(), 28);
        assert_eq!(Square::H8.index(), 63);

        for square in Square::iter() {
            assert_eq!(
                square.index(),
                square.rank().index() * 8 + square.file().index()
            );
        }
    }

    #[test]
    fn test_square_parsing() {
        assert_eq!("e2".parse::<Square>().unwrap(), Square::E2);
        assert_eq!("H8".parse::<Square>().unwrap(), Square::H8);
        assert!("e9".parse::<Square>().is_err());
        assert!("i1".parse::<Square>().is_err());
        assert!("e".parse::<Square>().is_err());
        assert!("e22".parse::<Square>().is_err());

        for square in Square::iter() {
            assert_eq!(square.to_uci().parse::<Square>().unwrap(), square);
        }
    }

    #[test]
    fn test_square_offsets_stay_on_board() {
        assert_eq!(Square::H4.offset(1, 0), None);
        assert_eq!(Square::A4.offset(-1, 0), None);
        assert_eq!(Square::D8.offset(0, 1), None);
        assert_eq!(Square::D1.offset(0, -1), None);
        assert_eq!(Square::B1.offset(2, 1), Some(Square::D2));
    }
}
