/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

/// A material evaluation in centipawns.
///
/// Absolute scores favor White when positive. Scores inside the search are relative:
/// positive favors the side the node is searched for.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Score(pub i32);

impl Score {
    /// Bound of the search window. No material balance comes close.
    pub const INF: Self = Self(1_000_000);

    /// Score of a balanced position.
    pub const DRAW: Self = Self(0);

    /// In pawns rather than centipawns.
    #[inline(always)]
    pub fn normalize(&self) -> f32 {
        self.0 as f32 / 100.0
    }
}

/// Implements an arithmetic operator and its assigning form, against both [`Score`] and `i32`.
macro_rules! impl_binary_op {
    ($trait:ident, $fn:ident, $assign_trait:ident, $assign_fn:ident) => {
        impl<T: Into<Score>> std::ops::$trait<T> for Score {
            type Output = Self;
            #[inline(always)]
            fn $fn(self, rhs: T) -> Self::Output {
                Self(self.0.$fn(rhs.into().0))
            }
        }

        impl<T: Into<Score>> std::ops::$assign_trait<T> for Score {
            #[inline(always)]
            fn $assign_fn(&mut self, rhs: T) {
                self.0.$assign_fn(rhs.into().0);
            }
        }
    };
}

impl_binary_op!(Add, add, AddAssign, add_assign);
impl_binary_op!(Sub, sub, SubAssign, sub_assign);
impl_binary_op!(Mul, mul, MulAssign, mul_assign);

impl From<i32> for Score {
    #[inline(always)]
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl std::ops::Neg for Score {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl std::iter::Sum for Score {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|score| score.0).sum())
    }
}

impl PartialEq<i32> for Score {
    #[inline(always)]
    fn eq(&self, other: &i32) -> bool {
        self.0 == *other
    }
}

impl PartialOrd<i32> for Score {
    #[inline(always)]
    fn partial_cmp(&self, other: &i32) -> Option<std::cmp::Ordering> {
        Some(self.0.cmp(other))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score({}cp)", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negation_is_symmetric_around_inf() {
        assert_eq!(-(-Score::INF), Score::INF);
        assert!(-Score::INF < Score::DRAW);
        assert_eq!((Score(230) - 100) * 2, 260);
        assert_eq!([Score(1), Score(-3)].into_iter().sum::<Score>(), -2);

        let mut score = Score::DRAW;
        score += 150;
        score -= Score(50);
        assert_eq!(score, 100);
        assert_eq!(format!("{score:?}"), "Score(100cp)");
    }
}
