/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    ops::Neg,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};

use crate::{evaluate, Color, CompactState, Move, Score, DEFAULT_SEARCH_DEPTH};

/// The result of a search, containing the best move found, score, and total nodes searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchResult {
    /// Number of nodes searched.
    pub nodes: u64,

    /// Best move found during the search.
    ///
    /// `None` if the side to move had no moves at all.
    pub bestmove: Option<Move>,

    /// Score of `bestmove`, from the searching side's perspective.
    pub score: Score,

    /// Depth the root was searched to.
    pub depth: usize,

    /// Wall-clock time the search took.
    pub elapsed: Duration,
}

impl SearchResult {
    /// Search speed, in nodes per second.
    #[inline(always)]
    pub fn nps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.nodes as f64 / secs
        } else {
            self.nodes as f64
        }
    }
}

impl Default for SearchResult {
    /// A default search result should initialize to a *very bad* value,
    /// since there isn't a move to play.
    #[inline(always)]
    fn default() -> Self {
        Self {
            nodes: 0,
            bestmove: None,
            score: -Score::INF,
            depth: 0,
            elapsed: Duration::ZERO,
        }
    }
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Plies to search below the root. A depth of 0 is searched as 1.
    pub depth: usize,

    /// Disables alpha-beta cutoffs, visiting every node of the tree.
    ///
    /// The chosen move is the same either way; this exists for diagnostics.
    pub full_width: bool,
}

impl SearchConfig {
    /// A default configuration searching to `depth`.
    #[inline(always)]
    pub fn with_depth(depth: usize) -> Self {
        Self {
            depth,
            ..Default::default()
        }
    }
}

impl Default for SearchConfig {
    #[inline(always)]
    fn default() -> Self {
        Self {
            depth: DEFAULT_SEARCH_DEPTH,
            full_width: false,
        }
    }
}

/// Bounds within an alpha-beta search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBounds {
    /// Lower bound.
    ///
    /// We are guaranteed a score that is AT LEAST `alpha`.
    pub alpha: Score,

    /// Upper bound.
    ///
    /// Our opponent is guaranteed a score that is AT MOST `beta`.
    /// Once `alpha` reaches `beta`, the remaining moves at this node cannot matter.
    pub beta: Score,
}

impl SearchBounds {
    /// Create a new [`SearchBounds`] from the provided `alpha` and `beta` values.
    #[inline(always)]
    pub const fn new(alpha: Score, beta: Score) -> Self {
        Self { alpha, beta }
    }
}

impl Neg for SearchBounds {
    type Output = Self;
    /// Negating a [`SearchBounds`] swaps the `alpha` and `beta` fields and negates them both.
    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self {
            alpha: -self.beta,
            beta: -self.alpha,
        }
    }
}

impl Default for SearchBounds {
    /// Default [`SearchBounds`] are a `(-infinity, infinity)`.
    #[inline(always)]
    fn default() -> Self {
        Self::new(-Score::INF, Score::INF)
    }
}

/// Executes a fixed-depth search on a private copy of a [`CompactState`].
///
/// Moves are made and unmade on that copy in place, so the state is identical
/// before and after every subtree.
#[derive(Debug, Clone)]
pub struct Search {
    /// Working state. Mutated during search, always restored afterwards.
    state: CompactState,

    /// Number of [`Search::negamax`] calls so far.
    nodes: u64,

    /// Configuration variables for this instance of the search.
    config: SearchConfig,
}

impl Search {
    /// Construct a new [`Search`] on a copy of `state`.
    #[inline(always)]
    pub fn new(state: CompactState, config: SearchConfig) -> Self {
        Self {
            state,
            nodes: 0,
            config,
        }
    }

    /// Construct a new [`Search`] from a serialized 64-symbol state.
    ///
    /// Fails, and no search can happen, if `state` is not a valid state string.
    pub fn from_serialized(state: &str, config: SearchConfig) -> Result<Self> {
        let state = state
            .parse()
            .context("Refusing to search an invalid compact state")?;
        Ok(Self::new(state, config))
    }

    /// The working state. Between searches this always equals the state the search was created with.
    #[inline(always)]
    pub const fn state(&self) -> &CompactState {
        &self.state
    }

    /// Chooses a move for `color` and reports what the search saw.
    ///
    /// Every root move is searched with a full window and the first move with the strictly
    /// greatest score wins, so ties go to the move generated first.
    pub fn start(&mut self, color: Color) -> SearchResult {
        let depth = self.config.depth.max(1);
        let starttime = Instant::now();
        self.nodes = 0;

        let mut result = SearchResult {
            depth,
            ..Default::default()
        };

        for mv in self.state.pseudo_legal_moves(color) {
            let captured = self.state.apply(mv);
            let score = -self.negamax_dispatch(depth - 1, SearchBounds::default(), color.opponent());
            self.state.undo(mv, captured);

            tracing::debug!(%mv, %score, "root move");

            if result.bestmove.is_none() || score > result.score {
                result.score = score;
                result.bestmove = Some(mv);
            }
        }

        result.nodes = self.nodes;
        result.elapsed = starttime.elapsed();

        tracing::info!(
            "Negamax depth {} score {} nodes {} ({:.0} nodes/s)",
            result.depth,
            result.score,
            result.nodes,
            result.nps()
        );

        if result.bestmove.is_none() {
            tracing::info!("{} has no moves", color.name());
        }

        result
    }

    #[inline(always)]
    fn negamax_dispatch(&mut self, depth: usize, bounds: SearchBounds, color: Color) -> Score {
        if self.config.full_width {
            self.negamax::<false>(depth, bounds, color)
        } else {
            self.negamax::<true>(depth, bounds, color)
        }
    }

    /// Primary location of search logic.
    ///
    /// Uses the [negamax](https://www.chessprogramming.org/Negamax) algorithm. With `PRUNE`,
    /// a node stops searching as soon as `alpha >= beta`.
    ///
    /// Scores are relative to `color`. A node without moves scores like a leaf.
    fn negamax<const PRUNE: bool>(
        &mut self,
        depth: usize,
        mut bounds: SearchBounds,
        color: Color,
    ) -> Score {
        self.nodes += 1;

        let perspective = color.negation_multiplier() as i32;
        if depth == 0 {
            return evaluate(&self.state) * perspective;
        }

        let moves = self.state.pseudo_legal_moves(color);
        if moves.is_empty() {
            return evaluate(&self.state) * perspective;
        }

        let mut best = -Score::INF;
        for mv in moves {
            let captured = self.state.apply(mv);
            let score = -self.negamax::<PRUNE>(depth - 1, -bounds, color.opponent());
            self.state.undo(mv, captured);

            best = best.max(score);
            bounds.alpha = bounds.alpha.max(best);

            if PRUNE && bounds.alpha >= bounds.beta {
                break;
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{board::XoShiRo, Piece, PieceKind, Position, Square, START_PLACEMENT};

    fn search_for(placement: &str, config: SearchConfig) -> Search {
        let position = Position::from_placement(placement).unwrap();
        Search::new(CompactState::from(&position), config)
    }

    /// Scatters a handful of random pieces over the board.
    fn random_state(rng: &mut XoShiRo) -> CompactState {
        let mut state = CompactState::new();
        let count = 4 + rng.get_next() % 8;
        for _ in 0..count {
            let square = Square::from_index_unchecked((rng.get_next() % 64) as usize);
            let color = Color::all()[(rng.get_next() % 2) as usize];
            let kind = PieceKind::all()[(rng.get_next() % 6) as usize];
            state[square] = Some(Piece::new(color, kind));
        }
        state
    }

    #[test]
    fn test_depth_zero_is_signed_evaluation() {
        let mut search = search_for("8/8/8/8/8/8/PPP5/8", SearchConfig::default());
        assert_eq!(search.negamax::<true>(0, SearchBounds::default(), Color::White), 300);
        assert_eq!(search.negamax::<true>(0, SearchBounds::default(), Color::Black), -300);
        assert_eq!(search.nodes, 2);
    }

    #[test]
    fn test_captures_free_queen_at_depth_one() {
        let mut search = search_for("4k3/8/8/3q4/8/8/3R4/4K3", SearchConfig::with_depth(1));
        let res = search.start(Color::White);
        assert_eq!(
            res.bestmove,
            Some(Move::new(Square::D2, Square::D5, PieceKind::Rook)),
            "{res:#?}"
        );
        assert_eq!(res.score, 2000 + 400 - 2000);
    }

    #[test]
    fn test_avoids_losing_material_at_depth_two() {
        // The rook on d2 is attacked by the black queen; at depth 2, Rxd5 is still best.
        let mut search = search_for("4k3/8/8/3q4/8/8/3R4/4K3", SearchConfig::with_depth(2));
        let res = search.start(Color::White);
        assert_eq!(res.bestmove.map(|mv| mv.to()), Some(Square::D5), "{res:#?}");
    }

    #[test]
    fn test_no_moves_returns_none() {
        let mut search = search_for("8/8/8/8/8/8/8/8", SearchConfig::default());
        let res = search.start(Color::White);
        assert!(res.bestmove.is_none());
        assert_eq!(res.nodes, 0);

        // A lone blocked pawn has nowhere to go either.
        let mut search = search_for("8/8/8/8/8/p7/P7/8", SearchConfig::default());
        assert!(search.start(Color::White).bestmove.is_none());
    }

    #[test]
    fn test_state_unchanged_after_search() {
        let position = Position::from_placement(START_PLACEMENT).unwrap();
        let state = CompactState::from(&position);
        let mut search = Search::new(state, SearchConfig::default());
        let res = search.start(Color::White);
        assert!(res.bestmove.is_some());
        assert_eq!(search.state(), &state);
    }

    #[test]
    fn test_pruning_does_not_change_result() {
        let mut rng = XoShiRo::from_seeds([1, 2, 3, 4]);
        for _ in 0..12 {
            let state = random_state(&mut rng);
            for color in Color::all() {
                for depth in 1..=3 {
                    let pruned = Search::new(state, SearchConfig::with_depth(depth)).start(color);
                    let full = Search::new(
                        state,
                        SearchConfig {
                            depth,
                            full_width: true,
                        },
                    )
                    .start(color);

                    assert_eq!(pruned.bestmove, full.bestmove, "{state} depth {depth}");
                    assert_eq!(pruned.score, full.score, "{state} depth {depth}");
                    assert!(pruned.nodes <= full.nodes, "{state} depth {depth}");
                }
            }
        }
    }

    #[test]
    fn test_inner_nodes_prune_against_full_width() {
        let mut rng = XoShiRo::from_seeds([9, 8, 7, 6]);
        for _ in 0..16 {
            let state = random_state(&mut rng);
            let mut pruned = Search::new(state, SearchConfig::default());
            let mut full = Search::new(state, SearchConfig::default());
            let bounds = SearchBounds::default();
            assert_eq!(
                pruned.negamax::<true>(3, bounds, Color::White),
                full.negamax::<false>(3, bounds, Color::White),
                "{state}"
            );
            assert_eq!(pruned.state(), &state);
        }
    }

    #[test]
    fn test_serialized_input_is_validated() {
        assert!(Search::from_serialized(&"0".repeat(63), SearchConfig::default()).is_err());
        let search = Search::from_serialized(&"0".repeat(64), SearchConfig::default()).unwrap();
        assert_eq!(search.state(), &CompactState::new());
    }

    #[test]
    fn test_depth_zero_still_expands_root() {
        let mut search = search_for(START_PLACEMENT, SearchConfig::with_depth(0));
        let res = search.start(Color::Black);
        assert_eq!(res.depth, 1);
        assert_eq!(res.nodes, 20);
        assert!(res.bestmove.is_some());
    }
}
