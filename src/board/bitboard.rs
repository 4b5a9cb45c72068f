/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Not};

use super::{File, Rank, Square};

/// A set of squares packed into a `u64`, bit `n` standing for the square with index `n`.
///
/// `a1` is the least-significant bit and `h8` the most-significant, so each byte is one rank.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Bitboard(pub(crate) u64);

impl Bitboard {
    /// No squares at all.
    pub const EMPTY_BOARD: Self = Self(0);

    /// Wraps a raw bit pattern.
    #[inline(always)]
    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    /// The set holding only `square`.
    ///
    /// # Example
    /// ```
    /// # use magpie::{Bitboard, Square};
    /// let board = Bitboard::from_square(Square::H8);
    /// assert_eq!(board.inner(), 1 << 63);
    /// ```
    #[inline(always)]
    pub const fn from_square(square: Square) -> Self {
        Self(1 << square.index())
    }

    /// The raw bits.
    #[inline(always)]
    pub const fn inner(&self) -> u64 {
        self.0
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Membership test for a single square, usable in `const` table builders.
    #[inline(always)]
    pub const fn contains(&self, square: Square) -> bool {
        self.0 & (1 << square.index()) != 0
    }

    /// `true` if no square is in both sets.
    #[inline(always)]
    pub fn is_disjoint(&self, other: impl Into<Self>) -> bool {
        (*self & other.into()).is_empty()
    }

    /// Adds the square(s) of `other`.
    #[inline(always)]
    pub fn set(&mut self, other: impl Into<Self>) {
        *self |= other.into()
    }

    /// Removes the square(s) of `other`.
    ///
    /// # Example
    /// ```
    /// # use magpie::{Bitboard, Square};
    /// let mut board = Square::C1.bitboard() | Square::D1;
    /// board.clear(Square::C1);
    /// assert_eq!(board, Square::D1.bitboard());
    /// ```
    #[inline(always)]
    pub fn clear(&mut self, other: impl Into<Self>) {
        *self &= !other.into()
    }

    /// Removes and returns the lowest square in the set.
    #[inline(always)]
    pub fn pop_lsb(&mut self) -> Option<Square> {
        if self.is_empty() {
            return None;
        }

        let lsb = Square(self.0.trailing_zeros() as u8);
        self.0 &= self.0 - 1;
        Some(lsb)
    }

    /// Iterates the squares of this set from `a1` towards `h8`.
    ///
    /// The iterator owns a copy, so `self` is unchanged by iterating.
    #[inline(always)]
    pub const fn iter(&self) -> BitboardIter {
        BitboardIter { bitboard: *self }
    }

    /// Iterates every subset of this set, starting with the empty set and ending with `self`.
    #[inline(always)]
    pub const fn subsets(&self) -> BitboardSubsetIter {
        BitboardSubsetIter {
            bitboard: *self,
            subset: Self::EMPTY_BOARD,
            remaining: 1u128 << self.population(),
        }
    }

    /// Number of squares in the set.
    ///
    /// # Example
    /// ```
    /// # use magpie::{Bitboard, Square};
    /// assert_eq!(Bitboard::new(0xFF).population(), 8);
    /// ```
    #[inline(always)]
    pub const fn population(&self) -> u8 {
        self.0.count_ones() as u8
    }

    /// Union, for `const` contexts where `|` is unavailable.
    #[inline(always)]
    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<T: IntoIterator<Item = Square>>(iter: T) -> Self {
        iter.into_iter().fold(Self::EMPTY_BOARD, |bb, sq| bb | sq)
    }
}

macro_rules! impl_bitwise_op {
    ($op:tt, $op_assign:tt, $func:ident, $func_assign:ident) => {
        impl<T> std::ops::$op<T> for Bitboard
        where
            Self: From<T>,
        {
            type Output = Self;
            #[inline(always)]
            fn $func(self, rhs: T) -> Self::Output {
                Self(self.0.$func(Self::from(rhs).0))
            }
        }

        impl<T> std::ops::$op_assign<T> for Bitboard
        where
            Self: From<T>,
        {
            #[inline(always)]
            fn $func_assign(&mut self, rhs: T) {
                self.0.$func_assign(Self::from(rhs).0);
            }
        }
    };
}

impl_bitwise_op!(BitAnd, BitAndAssign, bitand, bitand_assign);
impl_bitwise_op!(BitOr, BitOrAssign, bitor, bitor_assign);
impl_bitwise_op!(BitXor, BitXorAssign, bitxor, bitxor_assign);

impl Not for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

impl From<Square> for Bitboard {
    #[inline(always)]
    fn from(value: Square) -> Self {
        Self::from_square(value)
    }
}

impl From<u64> for Bitboard {
    #[inline(always)]
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Default for Bitboard {
    #[inline(always)]
    fn default() -> Self {
        Self::EMPTY_BOARD
    }
}

impl fmt::Display for Bitboard {
    /// Eight rows of `X` (member) and `.` (not), rank 8 at the top.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            for file in File::iter() {
                let marker = if self.contains(Square::new(file, rank)) {
                    'X'
                } else {
                    '.'
                };
                write!(f, "{marker} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitboard(0x{:016X})\n{self}", self.0)
    }
}

/// An iterator over all set bits in a [`Bitboard`], lowest first.
///
/// See [`Bitboard::iter`].
#[derive(Debug, Clone)]
pub struct BitboardIter {
    bitboard: Bitboard,
}

impl Iterator for BitboardIter {
    type Item = Square;
    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        self.bitboard.pop_lsb()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let size = self.bitboard.population() as usize;
        (size, Some(size))
    }
}

impl ExactSizeIterator for BitboardIter {
    #[inline(always)]
    fn len(&self) -> usize {
        self.bitboard.population() as usize
    }
}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = BitboardIter;
    #[inline(always)]
    fn into_iter(self) -> Self::IntoIter {
        BitboardIter { bitboard: self }
    }
}

impl IntoIterator for &Bitboard {
    type Item = Square;
    type IntoIter = BitboardIter;
    #[inline(always)]
    fn into_iter(self) -> Self::IntoIter {
        BitboardIter { bitboard: *self }
    }
}

/// An iterator over all possible subsets of a [`Bitboard`].
///
/// See [`Bitboard::subsets`]. Used to enumerate blocker configurations when building the magic tables.
pub struct BitboardSubsetIter {
    /// The full set.
    bitboard: Bitboard,

    /// Next subset to yield.
    subset: Bitboard,

    /// Up to `2^64`, for the full board.
    remaining: u128,
}

impl Iterator for BitboardSubsetIter {
    type Item = Bitboard;
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let subset = self.subset;
        // Carry-rippler step: (n - mask) & mask enumerates subsets of mask in order
        self.subset.0 = self.subset.0.wrapping_sub(self.bitboard.0) & self.bitboard.0;
        self.remaining -= 1;
        Some(subset)
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_bitboard_display() {
        let board = Bitboard::from_iter([Square::A1, Square::B2, Square::H8]);
        let expected = ". . . . . . . X \n\
                        . . . . . . . . \n\
                        . . . . . . . . \n\
                        . . . . . . . . \n\
                        . . . . . . . . \n\
                        . . . . . . . . \n\
                        . X . . . . . . \n\
                        X . . . . . . . \n";
        assert_eq!(board.to_string(), expected);
    }

    #[test]
    fn test_bitboard_set_ops() {
        let mut board = Bitboard::EMPTY_BOARD;
        board.set(Square::E4);
        board.set(Square::A1);
        assert!(board.contains(Square::E4));
        assert!(!board.contains(Square::H8));

        board.clear(Square::E4);
        assert_eq!(board, Bitboard::from_square(Square::A1));
        assert_eq!(!Bitboard::new(u64::MAX), Bitboard::EMPTY_BOARD);
        assert!(board.is_disjoint(Square::B1));
        assert_eq!(board.or(Square::B1.bitboard()).population(), 2);
    }

    #[test]
    fn test_pop_lsb_drains_in_order() {
        let mut board = Bitboard::from_iter([Square::G7, Square::B1]);
        assert_eq!(board.pop_lsb(), Some(Square::B1));
        assert_eq!(board.pop_lsb(), Some(Square::G7));
        assert_eq!(board.pop_lsb(), None);
    }

    #[test]
    fn test_bitboard_iter_is_ascending_and_restartable() {
        let board = Bitboard::from_iter([Square::H8, Square::C3, Square::A1, Square::D1]);
        let expected = vec![Square::A1, Square::D1, Square::C3, Square::H8];

        let iter = board.iter();
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.clone().collect::<Vec<_>>(), expected);
        assert_eq!(board.population(), 4);
        assert_eq!(board.into_iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_bitboard_subsets() {
        let mask = Bitboard::from_iter([Square::B2, Square::C3, Square::D4]);
        let subsets = mask.subsets().collect::<Vec<_>>();

        assert_eq!(subsets.len(), 8);
        assert_eq!(subsets.first(), Some(&Bitboard::EMPTY_BOARD));
        assert_eq!(subsets.last(), Some(&mask));
        for (i, a) in subsets.iter().enumerate() {
            assert!((*a & !mask).is_empty());
            assert!(!subsets[i + 1..].contains(a));
        }
    }

    #[test]
    fn test_full_board_subsets_do_not_overflow() {
        let full = Bitboard::new(u64::MAX);
        let mut subsets = full.subsets();
        assert_eq!(subsets.size_hint(), (usize::MAX, None));
        assert_eq!(
            subsets.by_ref().take(3).collect::<Vec<_>>(),
            vec![Bitboard::new(0), Bitboard::new(1), Bitboard::new(2)]
        );

        let rank = Bitboard::new(0xFF);
        assert_eq!(rank.subsets().size_hint(), (256, Some(256)));
        assert_eq!(rank.subsets().count(), 256);
    }
}
