/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use magpie::{
    initial_state, BoardGame, Color, CompactState, Game, Position, SearchConfig, Square,
};

fn test_perft_placement_nodes(depth: usize, placement: &str, color: Color, expected: u64) {
    let mut state = CompactState::from(&Position::from_placement(placement).unwrap());
    let res = state.perft(depth, color);
    assert_eq!(res, expected, "PERFT({depth}) failed on {placement}");
}

#[cfg(test)]
mod startpos_perft {
    use super::*;
    use magpie::START_PLACEMENT;

    #[test]
    fn test_startpos_depth_1() {
        test_perft_placement_nodes(1, START_PLACEMENT, Color::White, 20);
    }

    #[test]
    fn test_startpos_depth_2() {
        test_perft_placement_nodes(2, START_PLACEMENT, Color::White, 400);
    }

    #[test]
    fn test_startpos_depth_3() {
        test_perft_placement_nodes(3, START_PLACEMENT, Color::White, 8902);
    }

    #[test]
    fn test_startpos_black_to_move() {
        test_perft_placement_nodes(1, START_PLACEMENT, Color::Black, 20);
        test_perft_placement_nodes(2, START_PLACEMENT, Color::Black, 400);
    }

    #[test]
    fn test_game_perft_matches_state() {
        let game = Game::default();
        assert_eq!(game.perft(2), 400);
    }
}

#[cfg(test)]
mod sparse_perft {
    use super::*;

    #[test]
    fn test_lone_kings() {
        // Corner king has 3 moves, center king has 8.
        test_perft_placement_nodes(1, "7k/8/8/8/3K4/8/8/8", Color::White, 8);
        test_perft_placement_nodes(1, "7k/8/8/8/3K4/8/8/8", Color::Black, 3);
        test_perft_placement_nodes(2, "7k/8/8/8/3K4/8/8/8", Color::White, 24);
    }

    #[test]
    fn test_empty_board() {
        test_perft_placement_nodes(0, "8/8/8/8/8/8/8/8", Color::White, 1);
        test_perft_placement_nodes(1, "8/8/8/8/8/8/8/8", Color::White, 0);
    }

    #[test]
    fn test_pawns_on_last_rank_are_stuck() {
        test_perft_placement_nodes(1, "P7/8/8/8/8/8/8/7p", Color::White, 0);
        test_perft_placement_nodes(1, "P7/8/8/8/8/8/8/7p", Color::Black, 0);
    }
}

#[cfg(test)]
mod host_scenarios {
    use super::*;

    fn indices(squares: &[Square]) -> Vec<usize> {
        squares.iter().map(|sq| sq.index()).collect()
    }

    #[test]
    fn test_opening_through_host_trait() {
        let mut game = Game::default();
        game.setup();
        assert_eq!(game.serialize_state(), initial_state());

        // Knight on b1 reaches a3 and c3, in ascending order.
        assert_eq!(
            BoardGame::moves_from(&game, Square::B1.index()),
            indices(&[Square::A3, Square::C3])
        );

        assert!(game.apply_move(Square::E2.index(), Square::E4.index()));
        assert_eq!(game.side_to_move(), Color::Black);

        // White may not move twice in a row.
        assert!(!game.apply_move(Square::D2.index(), Square::D4.index()));
        assert!(BoardGame::moves_from(&game, Square::D2.index()).is_empty());

        assert!(game.apply_move(Square::E7.index(), Square::E5.index()));
        assert!(!game.apply_move(Square::E4.index(), Square::E5.index()));
        assert!(!game.apply_move(99, 0));
    }

    #[test]
    fn test_serialized_states_round_trip() {
        let mut game = Game::default();
        assert!(game.apply_move(Square::G1.index(), Square::F3.index()));
        let state = game.serialize_state();

        let mut other = Game::default();
        assert!(other.deserialize_state(&state));
        assert_eq!(other.position(), game.position());

        assert!(!other.deserialize_state("too short"));
        assert_eq!(other.position(), game.position());
    }

    #[test]
    fn test_search_takes_free_rook() {
        let mut game = Game::default();
        assert!(game.load_placement("4k3/8/8/3r4/8/8/3Q4/4K3"));
        let res = game.choose_move_with(Color::White, SearchConfig::with_depth(2));

        let mv = res.bestmove.expect("White has moves");
        assert_eq!((mv.from(), mv.to()), (Square::D2, Square::D5));
        assert!(res.nodes > 0);
    }

    #[test]
    fn test_ai_answers_human_move() {
        let mut game = Game::default();
        game.set_config(SearchConfig::with_depth(1));
        game.enable_ai_for(Color::Black);
        assert!(!game.is_ai_turn());

        game.make_move(Square::E2.index(), Square::E4.index()).unwrap();
        assert!(game.is_ai_turn());

        let res = game.play_ai_move();
        assert!(res.bestmove.is_some());
        assert_eq!(game.side_to_move(), Color::White);
    }
}
