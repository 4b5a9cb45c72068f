/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Color, CompactState, File, Rank, Score, Square};

/// Material balance of `state`, in centipawns. Positive favors White.
///
/// Piece values are given by [`crate::PieceKind::value`].
///
/// # Example
/// ```
/// # use magpie::{evaluate, CompactState, Position};
/// let state = CompactState::from(&Position::default());
/// assert_eq!(evaluate(&state), 0);
/// ```
#[inline(always)]
pub fn evaluate(state: &CompactState) -> Score {
    state
        .iter()
        .map(|(_, piece)| Score(piece.signed_value()))
        .sum()
}

/// Encapsulates the logic of scoring a position.
///
/// A high score is good for White and a low score is good for Black.
/// During a negamax search, positions are scored from the side to move's perspective instead,
/// which [`Evaluator::eval_for`] provides.
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    /// The state to evaluate.
    state: &'a CompactState,

    /// Side whose perspective the pretty-printed table reports.
    perspective: Color,
}

impl<'a> Evaluator<'a> {
    /// Construct a new [`Evaluator`] reporting from `perspective`'s point of view.
    #[inline(always)]
    pub fn new(state: &'a CompactState, perspective: Color) -> Self {
        Self { state, perspective }
    }

    /// Evaluate from `color`'s perspective: positive is good for `color`.
    #[inline(always)]
    pub fn eval_for(&self, color: Color) -> Score {
        evaluate(self.state) * color.negation_multiplier() as i32
    }

    /// Signed contribution of the piece on `square`, if one exists.
    ///
    /// Only used when printing the evaluator.
    #[inline(always)]
    fn value_at(&self, square: Square) -> Option<Score> {
        self.state
            .piece_at(square)
            .map(|piece| Score(piece.signed_value()))
    }
}

impl fmt::Display for Evaluator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  +")?;
        for _ in File::iter() {
            write!(f, "-----+")?;
        }
        writeln!(f)?;

        for rank in Rank::iter().rev() {
            write!(f, "{rank} |")?;

            for file in File::iter() {
                let piece = self.state.piece_at(Square::new(file, rank));
                let piece_char = piece.map(|p| p.to_uci()).unwrap_or(' ');
                write!(f, "  {piece_char}  |")?;
            }
            writeln!(f)?;
            write!(f, "  |")?;

            for file in File::iter() {
                let score = match self.value_at(Square::new(file, rank)) {
                    Some(val) => format!("{:^5}", format!("{:+}", val.normalize())),
                    None => String::from("     "),
                };
                write!(f, "{score}|")?;
            }
            writeln!(f)?;

            write!(f, "  +")?;
            for _ in File::iter() {
                write!(f, "-----+")?;
            }
            writeln!(f)?;
        }
        for file in File::iter() {
            write!(f, "     {file}")?;
        }

        let color = self.perspective;
        let score = self.eval_for(color);

        let winning_side = if score > Score::DRAW {
            Some(color)
        } else if score < Score::DRAW {
            Some(color.opponent())
        } else {
            None
        };

        writeln!(f)?;
        writeln!(
            f,
            "\nWinning side: {}",
            winning_side.map(|c| c.name()).unwrap_or("N/A")
        )?;
        writeln!(f, "Score ({}): {score}", color.name())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;

    fn state(placement: &str) -> CompactState {
        CompactState::from(&Position::from_placement(placement).unwrap())
    }

    #[test]
    fn test_material_values() {
        assert_eq!(evaluate(&state("8/8/8/8/8/8/8/8")), 0);
        // Lone white queen versus a black rook and knight.
        assert_eq!(evaluate(&state("8/8/8/3rn3/8/8/3Q4/8")), 900 - 400 - 200);
        // Kings carry a large finite value.
        assert_eq!(evaluate(&state("8/8/8/8/8/8/8/4K3")), 2000);
        assert_eq!(evaluate(&state("2b1k3/8/8/8/8/8/8/4K3")), -230);
    }

    #[test]
    fn test_perspective() {
        let state = state("8/8/8/8/8/8/PPP5/8");
        let eval = Evaluator::new(&state, Color::White);
        assert_eq!(eval.eval_for(Color::White), 300);
        assert_eq!(eval.eval_for(Color::Black), -300);
        assert!(eval.to_string().contains("Winning side: white"));
    }
}
