/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Deref};

use anyhow::{bail, Result};

use crate::{
    evaluate, initialize_tables, Color, CompactState, Destinations, Move, MoveList, Position,
    Score, Search, SearchConfig, SearchResult, Square,
};

/// The capabilities a host application needs from a board game.
///
/// Squares cross this boundary as plain indices in `[0, 64)`, `a1` first.
/// Nothing here fails loudly: bad input yields an empty result or `false`.
pub trait BoardGame {
    /// Resets to the game's starting layout.
    fn setup(&mut self);

    /// Destination indices for the piece on `square`, if it may move now.
    fn moves_from(&self, square: usize) -> Vec<usize>;

    /// Moves a piece from `from` to `to` if that is allowed, returning whether it happened.
    fn apply_move(&mut self, from: usize, to: usize) -> bool;

    /// Snapshot of the board as a string.
    fn serialize_state(&self) -> String;

    /// Restores a snapshot made by [`BoardGame::serialize_state`], returning whether it was accepted.
    fn deserialize_state(&mut self, state: &str) -> bool;
}

/// The standard start layout as a serialized compact state.
///
/// # Example
/// ```
/// assert_eq!(
///     magpie::initial_state(),
///     "RNBQKBNRPPPPPPPP00000000000000000000000000000000pppppppprnbqkbnr"
/// );
/// ```
pub fn initial_state() -> String {
    CompactState::from(&Position::default()).to_string()
}

/// A game of chess against an optional automated opponent.
///
/// Wraps a [`Position`] with the side to move, which color (if any) the search plays,
/// and the configuration that search uses.
///
/// Moves are pseudo-legal: Kings may be left in check, and captured.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Game {
    /// Current piece placement.
    position: Position,

    /// Whose turn it is.
    side_to_move: Color,

    /// Whether the automated opponent moves at all.
    ai_enabled: bool,

    /// Which color the automated opponent plays. Kept while the AI is off.
    preferred_ai_color: Color,

    /// Configuration for every search this game starts.
    config: SearchConfig,
}

impl Game {
    /// Creates a new [`Game`] from the provided [`Position`], with White to move and the AI disabled.
    ///
    /// The AI will play Black once enabled, unless told otherwise.
    ///
    /// Builds the attack tables if nothing has yet.
    pub fn new(position: Position) -> Self {
        initialize_tables();
        Self {
            position,
            side_to_move: Color::White,
            ai_enabled: false,
            preferred_ai_color: Color::Black,
            config: SearchConfig::default(),
        }
    }

    /// Replaces the board with `placement`, a FEN piece-placement field.
    ///
    /// Extra FEN fields are ignored. If the placement is malformed, the error is logged,
    /// the board is left empty and `false` is returned.
    ///
    /// # Example
    /// ```
    /// # use magpie::Game;
    /// let mut game = Game::default();
    /// assert!(!game.load_placement("8/8/8"));
    /// assert!(game.occupied().is_empty());
    /// assert!(game.load_placement("4k3/8/8/8/8/8/8/4K3"));
    /// ```
    pub fn load_placement(&mut self, placement: &str) -> bool {
        self.position.clear_all();
        match Position::from_fen(placement) {
            Ok(position) => {
                self.position = position;
                true
            }
            Err(e) => {
                tracing::warn!("Failed to load placement {placement:?}: {e:#}");
                false
            }
        }
    }

    /// Resets to the standard starting position with White to move.
    pub fn load_startpos(&mut self) {
        self.position = Position::default();
        self.side_to_move = Color::White;
    }

    /// Fetches the current [`Position`].
    #[inline(always)]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// Whose turn it is.
    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Sets whose turn it is.
    #[inline(always)]
    pub fn set_side_to_move(&mut self, color: Color) {
        self.side_to_move = color;
    }

    /// Passes the turn to the other side.
    #[inline(always)]
    pub fn toggle_side_to_move(&mut self) {
        self.side_to_move = self.side_to_move.opponent();
    }

    /// The configuration used by [`Game::choose_move`].
    #[inline(always)]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Replaces the configuration used by [`Game::choose_move`].
    #[inline(always)]
    pub fn set_config(&mut self, config: SearchConfig) {
        self.config = config;
    }

    /// Destinations of the piece on `square`.
    ///
    /// Empty if `square` is not in `[0, 64)`, is empty, or holds a piece of the side not to move.
    ///
    /// # Example
    /// ```
    /// # use magpie::{Game, Square};
    /// let game = Game::default();
    /// assert_eq!(game.moves_from(Square::E2.index()).as_slice(), &[Square::E3, Square::E4]);
    /// assert!(game.moves_from(Square::E7.index()).is_empty());
    /// assert!(game.moves_from(64).is_empty());
    /// ```
    pub fn moves_from(&self, square: usize) -> Destinations {
        let Ok(square) = Square::from_index(square) else {
            return Destinations::new();
        };

        match self.position.piece_at(square) {
            Some(piece) if piece.color() == self.side_to_move => self.position.moves_from(square),
            _ => Destinations::new(),
        }
    }

    /// Returns `true` if the piece on `src` may move to `dst` right now.
    ///
    /// Out-of-range indices are never legal.
    pub fn is_legal_destination(&self, src: usize, dst: usize) -> bool {
        match Square::from_index(dst) {
            Ok(dst) => self.moves_from(src).contains(&dst),
            Err(_) => false,
        }
    }

    /// Every pseudo-legal move of the side to move.
    #[inline(always)]
    pub fn pseudo_legal_moves(&self) -> MoveList {
        self.position.pseudo_legal_moves(self.side_to_move)
    }

    /// Moves the piece on `from` to `to` and passes the turn, if [`Game::is_legal_destination`] allows it.
    ///
    /// Whatever stood on `to` is captured.
    pub fn make_move(&mut self, from: usize, to: usize) -> Result<Move> {
        if !self.is_legal_destination(from, to) {
            bail!(
                "Illegal move for {}: {} to {}",
                self.side_to_move.name(),
                describe_index(from),
                describe_index(to)
            );
        }

        // Validated above, so both indices are on the board and `from` holds a piece.
        let from = Square::from_index_unchecked(from);
        let to = Square::from_index_unchecked(to);
        let Some(piece) = self.position.piece_at(from) else {
            bail!("No piece on {from}");
        };

        let mv = Move::new(from, to, piece.kind());
        self.apply(mv);
        Ok(mv)
    }

    /// Applies `mv` to the board and passes the turn, without validation.
    fn apply(&mut self, mv: Move) {
        if let Some(captured) = self.position.make_move(mv) {
            tracing::debug!("{mv} captured {}", captured.name());
        }
        self.toggle_side_to_move();
    }

    /// Searches for the best move for `color`, using this game's [`SearchConfig`].
    ///
    /// The board is not changed. If `color` has no moves, the result's `bestmove` is `None`.
    pub fn choose_move(&self, color: Color) -> SearchResult {
        self.choose_move_with(color, self.config)
    }

    /// Like [`Game::choose_move`], but with a one-off configuration.
    pub fn choose_move_with(&self, color: Color, config: SearchConfig) -> SearchResult {
        Search::new(CompactState::from(&self.position), config).start(color)
    }

    /// Lets the automated opponent play `color`, remembering it as the preferred color.
    #[inline(always)]
    pub fn enable_ai_for(&mut self, color: Color) {
        self.preferred_ai_color = color;
        self.ai_enabled = true;
    }

    /// Turns the automated opponent on, playing its preferred color.
    #[inline(always)]
    pub fn enable_ai(&mut self) {
        self.ai_enabled = true;
    }

    /// Turns the automated opponent off. Its preferred color is kept.
    #[inline(always)]
    pub fn disable_ai(&mut self) {
        self.ai_enabled = false;
    }

    /// Changes the color the automated opponent plays, without turning it on or off.
    #[inline(always)]
    pub fn set_preferred_ai_color(&mut self, color: Color) {
        self.preferred_ai_color = color;
    }

    /// Returns `true` if the automated opponent is on.
    #[inline(always)]
    pub const fn is_ai_enabled(&self) -> bool {
        self.ai_enabled
    }

    /// The color the automated opponent plays whenever it is on.
    #[inline(always)]
    pub const fn preferred_ai_color(&self) -> Color {
        self.preferred_ai_color
    }

    /// The color the automated opponent plays, if enabled.
    #[inline(always)]
    pub fn ai_color(&self) -> Option<Color> {
        self.ai_enabled.then_some(self.preferred_ai_color)
    }

    /// Returns `true` if the automated opponent is enabled and it is its turn.
    #[inline(always)]
    pub fn is_ai_turn(&self) -> bool {
        self.ai_color() == Some(self.side_to_move)
    }

    /// Searches for the side to move, plays the chosen move and passes the turn.
    ///
    /// If there is no move to play, nothing changes.
    pub fn play_ai_move(&mut self) -> SearchResult {
        let res = self.choose_move(self.side_to_move);
        if let Some(mv) = res.bestmove {
            self.apply(mv);
        }
        res
    }

    /// Serializes the board as a 64-symbol compact state.
    #[inline(always)]
    pub fn serialize(&self) -> String {
        CompactState::from(&self.position).to_string()
    }

    /// Replaces the board with a serialized compact state.
    ///
    /// On error, the board is left untouched.
    pub fn deserialize(&mut self, state: &str) -> Result<()> {
        let state: CompactState = state.trim().parse()?;
        self.position = state.to_position();
        Ok(())
    }

    /// Material balance of the current board. Positive favors White.
    #[inline(always)]
    pub fn evaluate(&self) -> Score {
        evaluate(&CompactState::from(&self.position))
    }

    /// Counts leaf nodes of the pseudo-legal move tree from the side to move.
    pub fn perft(&self, depth: usize) -> u64 {
        CompactState::from(&self.position).perft(depth, self.side_to_move)
    }
}

/// Formats a host-provided index for error messages.
fn describe_index(index: usize) -> String {
    match Square::from_index(index) {
        Ok(square) => square.to_string(),
        Err(_) => format!("<index {index}>"),
    }
}

impl BoardGame for Game {
    fn setup(&mut self) {
        self.load_startpos();
    }

    fn moves_from(&self, square: usize) -> Vec<usize> {
        Game::moves_from(self, square)
            .into_iter()
            .map(|sq| sq.index())
            .collect()
    }

    fn apply_move(&mut self, from: usize, to: usize) -> bool {
        match self.make_move(from, to) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("{e:#}");
                false
            }
        }
    }

    fn serialize_state(&self) -> String {
        self.serialize()
    }

    fn deserialize_state(&mut self, state: &str) -> bool {
        match self.deserialize(state) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to load state: {e:#}");
                false
            }
        }
    }
}

impl Deref for Game {
    type Target = Position;
    /// A [`Game`] immutably dereferences to a [`Position`], for simplicity.
    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.position
    }
}

impl Default for Game {
    /// The standard starting position, White to move.
    #[inline(always)]
    fn default() -> Self {
        Self::new(Position::default())
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.position)?;
        writeln!(f)?;
        writeln!(f, "Placement: {}", self.position.to_placement())?;
        write!(f, "Side to move: {}", self.side_to_move.name())?;
        if let Some(ai) = self.ai_color() {
            write!(f, " (AI plays {})", ai.name())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("placement", &self.position.to_placement())
            .field("side_to_move", &self.side_to_move)
            .field("ai_enabled", &self.ai_enabled)
            .field("preferred_ai_color", &self.preferred_ai_color)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Piece, START_PLACEMENT};

    #[test]
    fn test_start_placement_matches_initial_state() {
        let mut game = Game::new(Position::new());
        assert!(game.load_placement(START_PLACEMENT));
        assert_eq!(game.serialize(), initial_state());
    }

    #[test]
    fn test_malformed_placement_leaves_board_empty() {
        let mut game = Game::default();
        assert!(!game.load_placement("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP"));
        assert!(game.occupied().is_empty());
        assert!(game.moves_from(Square::E2.index()).is_empty());
    }

    #[test]
    fn test_out_of_range_indices() {
        let game = Game::default();
        assert!(game.moves_from(64).is_empty());
        assert!(game.moves_from(usize::MAX).is_empty());
        assert!(!game.is_legal_destination(Square::E2.index(), 64));
        assert!(!game.is_legal_destination(100, Square::E4.index()));
    }

    #[test]
    fn test_only_side_to_move_may_move() {
        let mut game = Game::default();
        assert!(game.is_legal_destination(Square::E2.index(), Square::E4.index()));
        assert!(!game.is_legal_destination(Square::E7.index(), Square::E5.index()));
        assert!(!game.is_legal_destination(Square::E2.index(), Square::E5.index()));

        let mv = game
            .make_move(Square::E2.index(), Square::E4.index())
            .unwrap();
        assert_eq!(mv.to(), Square::E4);
        assert_eq!(game.side_to_move(), Color::Black);
        assert!(game.is_legal_destination(Square::E7.index(), Square::E5.index()));
        assert!(game.make_move(Square::D2.index(), Square::D4.index()).is_err());
    }

    #[test]
    fn test_capture_by_overwrite() {
        let mut game = Game::new(Position::from_placement("4k3/8/8/3q4/8/8/3R4/4K3").unwrap());
        game.make_move(Square::D2.index(), Square::D5.index())
            .unwrap();
        assert_eq!(game.piece_at(Square::D5), Some(Piece::WHITE_ROOK));
        assert_eq!(game.evaluate(), 400);
    }

    #[test]
    fn test_ai_plays_its_color() {
        let mut game = Game::new(Position::from_placement("4k3/8/8/3q4/8/8/3R4/4K3").unwrap());
        assert!(!game.is_ai_turn());
        game.enable_ai_for(Color::White);
        assert_eq!(game.ai_color(), Some(Color::White));
        assert!(game.is_ai_turn());

        let res = game.play_ai_move();
        assert_eq!(res.bestmove.map(|mv| mv.to()), Some(Square::D5));
        assert_eq!(game.side_to_move(), Color::Black);
        assert!(!game.is_ai_turn());

        game.disable_ai();
        assert_eq!(game.ai_color(), None);
    }

    #[test]
    fn test_preferred_ai_color_survives_disabling() {
        let mut game = Game::default();
        assert!(!game.is_ai_enabled());
        assert_eq!(game.preferred_ai_color(), Color::Black);
        assert_eq!(game.ai_color(), None);

        game.enable_ai();
        assert_eq!(game.ai_color(), Some(Color::Black));

        game.enable_ai_for(Color::White);
        game.disable_ai();
        assert!(!game.is_ai_enabled());
        assert!(!game.is_ai_turn());
        assert_eq!(game.preferred_ai_color(), Color::White);

        game.enable_ai();
        assert_eq!(game.ai_color(), Some(Color::White));
        assert!(game.is_ai_turn());

        // Switching colors leaves the on/off state alone.
        game.disable_ai();
        game.set_preferred_ai_color(Color::Black);
        assert!(!game.is_ai_enabled());
        game.enable_ai();
        assert_eq!(game.ai_color(), Some(Color::Black));
    }

    #[test]
    fn test_choose_move_does_not_touch_board() {
        let game = Game::default();
        let before = game.serialize();
        let res = game.choose_move(Color::White);
        assert!(res.bestmove.is_some());
        assert_eq!(game.serialize(), before);
    }

    #[test]
    fn test_board_game_capabilities() {
        let mut game = Game::new(Position::new());
        BoardGame::setup(&mut game);
        assert_eq!(game.serialize_state(), initial_state());

        let targets = BoardGame::moves_from(&game, Square::G1.index());
        assert_eq!(targets, vec![Square::F3.index(), Square::H3.index()]);

        assert!(game.apply_move(Square::G1.index(), Square::F3.index()));
        assert!(!game.apply_move(Square::G1.index(), Square::F3.index()));

        let saved = game.serialize_state();
        assert!(!game.deserialize_state("too short"));
        assert_eq!(game.serialize_state(), saved);
        assert!(game.deserialize_state(&initial_state()));
        assert_eq!(game.serialize_state(), initial_state());
    }
}
