/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut, Neg},
    str::FromStr,
};

use anyhow::{bail, Result};

/// One of the two sides. White moves first and starts on ranks 1 and 2.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Color {
    #[default]
    White,
    Black,
}

impl Color {
    pub const COUNT: usize = 2;

    /// `[White, Black]`.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [Self::White, Self::Black]
    }

    /// `1` for White and `-1` for Black.
    ///
    /// Multiplying a White-positive score by this gives the score from this side's point of view.
    /// It is also the rank direction this side's pawns advance in.
    ///
    /// # Example
    /// ```
    /// # use magpie::Color;
    /// assert_eq!(Color::White.negation_multiplier(), 1);
    /// assert_eq!(Color::Black.negation_multiplier(), -1);
    /// ```
    #[inline(always)]
    pub const fn negation_multiplier(&self) -> i8 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }

    #[inline(always)]
    pub const fn opponent(&self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Parses `w` or `b`, in either case.
    #[inline(always)]
    pub fn from_uci(color: char) -> Result<Self> {
        match color.to_ascii_lowercase() {
            'w' => Ok(Self::White),
            'b' => Ok(Self::Black),
            _ => bail!("Expected a color 'w' or 'b', got {color:?}"),
        }
    }

    /// `w` or `b`.
    #[inline(always)]
    pub const fn to_uci(&self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }

    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

impl Neg for Color {
    type Output = Self;
    /// The opponent.
    #[inline(always)]
    fn neg(self) -> Self::Output {
        self.opponent()
    }
}

/// What a piece is, regardless of who owns it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const COUNT: usize = 6;

    /// Lowercase letters, in discriminant order.
    const LETTERS: [char; Self::COUNT] = ['p', 'n', 'b', 'r', 'q', 'k'];

    /// Material values in centipawns, in discriminant order.
    const VALUES: [i32; Self::COUNT] = [100, 200, 230, 400, 900, 2000];

    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [
            Self::Pawn,
            Self::Knight,
            Self::Bishop,
            Self::Rook,
            Self::Queen,
            Self::King,
        ]
    }

    /// Inverse of [`PieceKind::bits`]. Anything above `4` decodes as a King.
    #[inline(always)]
    pub const fn from_bits_unchecked(bits: u8) -> Self {
        match bits {
            0 => Self::Pawn,
            1 => Self::Knight,
            2 => Self::Bishop,
            3 => Self::Rook,
            4 => Self::Queen,
            _ => Self::King,
        }
    }

    #[inline(always)]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Material value in centipawns.
    ///
    /// # Example
    /// ```
    /// # use magpie::PieceKind;
    /// assert_eq!(PieceKind::Bishop.value(), 230);
    /// assert_eq!(PieceKind::King.value(), 2000);
    /// ```
    #[inline(always)]
    pub const fn value(&self) -> i32 {
        Self::VALUES[self.index()]
    }

    /// Parses a FEN letter, ignoring case.
    ///
    /// # Example
    /// ```
    /// # use magpie::PieceKind;
    /// assert_eq!(PieceKind::from_uci('Q').unwrap(), PieceKind::Queen);
    /// assert!(PieceKind::from_uci('x').is_err());
    /// ```
    pub fn from_uci(kind: char) -> Result<Self> {
        let lower = kind.to_ascii_lowercase();
        match Self::LETTERS.iter().position(|&c| c == lower) {
            Some(i) => Ok(Self::from_bits_unchecked(i as u8)),
            None => bail!("Unknown piece letter {kind:?}"),
        }
    }

    /// Lowercase FEN letter.
    #[inline(always)]
    pub const fn to_uci(&self) -> char {
        Self::LETTERS[self.index()]
    }

    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pawn => "pawn",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Rook => "rook",
            Self::Queen => "queen",
            Self::King => "king",
        }
    }
}

/// A [`PieceKind`] owned by a [`Color`], packed into one byte.
///
/// Bit 3 holds the color and bits 0 to 2 hold the kind.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Piece(u8);

impl Piece {
    pub const WHITE_PAWN: Self = Self::new(Color::White, PieceKind::Pawn);
    pub const WHITE_KNIGHT: Self = Self::new(Color::White, PieceKind::Knight);
    pub const WHITE_BISHOP: Self = Self::new(Color::White, PieceKind::Bishop);
    pub const WHITE_ROOK: Self = Self::new(Color::White, PieceKind::Rook);
    pub const WHITE_QUEEN: Self = Self::new(Color::White, PieceKind::Queen);
    pub const WHITE_KING: Self = Self::new(Color::White, PieceKind::King);

    pub const BLACK_PAWN: Self = Self::new(Color::Black, PieceKind::Pawn);
    pub const BLACK_KNIGHT: Self = Self::new(Color::Black, PieceKind::Knight);
    pub const BLACK_BISHOP: Self = Self::new(Color::Black, PieceKind::Bishop);
    pub const BLACK_ROOK: Self = Self::new(Color::Black, PieceKind::Rook);
    pub const BLACK_QUEEN: Self = Self::new(Color::Black, PieceKind::Queen);
    pub const BLACK_KING: Self = Self::new(Color::Black, PieceKind::King);

    pub const COUNT: usize = Color::COUNT * PieceKind::COUNT;

    const COLOR_BIT: u8 = 1 << 3;
    const KIND_MASK: u8 = Self::COLOR_BIT - 1;

    #[inline(always)]
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        match color {
            Color::White => Self(kind.bits()),
            Color::Black => Self(kind.bits() | Self::COLOR_BIT),
        }
    }

    #[inline(always)]
    pub const fn color(&self) -> Color {
        if self.0 & Self::COLOR_BIT == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    #[inline(always)]
    pub const fn kind(&self) -> PieceKind {
        PieceKind::from_bits_unchecked(self.0 & Self::KIND_MASK)
    }

    #[inline(always)]
    pub const fn parts(&self) -> (Color, PieceKind) {
        (self.color(), self.kind())
    }

    /// Dense index in `[0, 12)`: the six White kinds, then the six Black kinds.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.color().index() * PieceKind::COUNT + self.kind().index()
    }

    /// Material value, negated for Black.
    ///
    /// # Example
    /// ```
    /// # use magpie::Piece;
    /// assert_eq!(Piece::WHITE_QUEEN.signed_value(), 900);
    /// assert_eq!(Piece::BLACK_PAWN.signed_value(), -100);
    /// ```
    #[inline(always)]
    pub const fn signed_value(&self) -> i32 {
        self.kind().value() * self.color().negation_multiplier() as i32
    }

    /// Parses a FEN letter. Uppercase letters are White pieces.
    ///
    /// # Example
    /// ```
    /// # use magpie::Piece;
    /// assert_eq!(Piece::from_uci('N').unwrap(), Piece::WHITE_KNIGHT);
    /// assert_eq!(Piece::from_uci('k').unwrap(), Piece::BLACK_KING);
    /// assert!(Piece::from_uci('0').is_err());
    /// ```
    pub fn from_uci(piece: char) -> Result<Self> {
        let color = if piece.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Ok(Self::new(color, PieceKind::from_uci(piece)?))
    }

    /// FEN letter: uppercase for White, lowercase for Black.
    #[inline(always)]
    pub const fn to_uci(&self) -> char {
        let letter = self.kind().to_uci();
        match self.color() {
            Color::White => letter.to_ascii_uppercase(),
            Color::Black => letter,
        }
    }

    /// Such as `"white knight"`.
    pub fn name(&self) -> String {
        format!("{} {}", self.color().name(), self.kind().name())
    }
}

macro_rules! impl_common_traits {
    ($type:ty) => {
        impl<T> Index<$type> for [T; <$type>::COUNT] {
            type Output = T;
            #[inline(always)]
            fn index(&self, index: $type) -> &Self::Output {
                &self[index.index()]
            }
        }

        impl<T> IndexMut<$type> for [T; <$type>::COUNT] {
            #[inline(always)]
            fn index_mut(&mut self, index: $type) -> &mut Self::Output {
                &mut self[index.index()]
            }
        }

        impl FromStr for $type {
            type Err = anyhow::Error;
            /// Parses a single letter with `from_uci`.
            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let chars: Vec<char> = s.chars().collect();
                let [c] = chars[..] else {
                    bail!("Expected one letter for {}, got {s:?}", stringify!($type));
                };
                Self::from_uci(c)
            }
        }

        impl fmt::Display for $type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_uci())
            }
        }

        impl fmt::Debug for $type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($type), self.name())
            }
        }
    };
}

impl_common_traits!(Piece);
impl_common_traits!(PieceKind);
impl_common_traits!(Color);
