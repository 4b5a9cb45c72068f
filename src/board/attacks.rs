/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{sync::OnceLock, time::Instant};

use super::{Bitboard, Color, Square, XoShiRo};

const KNIGHT_ATTACKS: [Bitboard; Square::COUNT] = generate_leaper_mobility(&KNIGHT_DELTAS);
const KING_ATTACKS: [Bitboard; Square::COUNT] = generate_leaper_mobility(&QUEEN_DELTAS);
const WHITE_PAWN_ATTACKS: [Bitboard; Square::COUNT] = generate_pawn_attacks(Color::White);
const BLACK_PAWN_ATTACKS: [Bitboard; Square::COUNT] = generate_pawn_attacks(Color::Black);

/// Deltas for the movement of the Queen, and the single steps of the King.
const QUEEN_DELTAS: [(i8, i8); 8] = [
    /* Rook */
    (1, 0),
    (0, -1),
    (-1, 0),
    (0, 1),
    /* Bishop */
    (1, 1),
    (1, -1),
    (-1, -1),
    (-1, 1),
];

const ROOK_DELTAS: [(i8, i8); 4] = [
    QUEEN_DELTAS[0],
    QUEEN_DELTAS[1],
    QUEEN_DELTAS[2],
    QUEEN_DELTAS[3],
];

const BISHOP_DELTAS: [(i8, i8); 4] = [
    QUEEN_DELTAS[4],
    QUEEN_DELTAS[5],
    QUEEN_DELTAS[6],
    QUEEN_DELTAS[7],
];

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (1, -2),
    (2, 1),
    (2, -1),
    (-1, 2),
    (-1, -2),
    (-2, 1),
    (-2, -1),
];

/// Process-wide slider tables, built on first use.
static TABLES: OnceLock<AttackTables> = OnceLock::new();

/// Builds the slider attack tables, if they have not been built already.
///
/// Calling this more than once is a no-op. Every lookup initializes the tables lazily as well,
/// so this only moves the construction cost to a predictable point.
#[inline(always)]
pub fn initialize_tables() {
    tables();
}

#[inline(always)]
fn tables() -> &'static AttackTables {
    TABLES.get_or_init(AttackTables::new)
}

/// Fetch the squares a Rook on `square` attacks, given the `blockers` on the board.
///
/// The first blocker along each ray is included.
///
/// # Example
/// ```
/// # use magpie::*;
/// let blockers = Bitboard::from_square(Square::A4);
/// let attacks = rook_attacks(Square::A1, blockers);
/// assert!(attacks.contains(Square::A4));
/// assert!(!attacks.contains(Square::A5));
/// assert!(attacks.contains(Square::H1));
/// ```
#[inline(always)]
pub fn rook_attacks(square: Square, blockers: Bitboard) -> Bitboard {
    tables().rook.attacks(square, blockers)
}

/// Fetch the squares a Bishop on `square` attacks, given the `blockers` on the board.
#[inline(always)]
pub fn bishop_attacks(square: Square, blockers: Bitboard) -> Bitboard {
    tables().bishop.attacks(square, blockers)
}

/// Fetch the squares a Queen on `square` attacks. This is the union of Rook and Bishop attacks.
#[inline(always)]
pub fn queen_attacks(square: Square, blockers: Bitboard) -> Bitboard {
    rook_attacks(square, blockers) | bishop_attacks(square, blockers)
}

/// Fetch the squares a Knight on `square` attacks.
#[inline(always)]
pub const fn knight_attacks(square: Square) -> Bitboard {
    KNIGHT_ATTACKS[square.index()]
}

/// Fetch the squares a King on `square` attacks.
#[inline(always)]
pub const fn king_attacks(square: Square) -> Bitboard {
    KING_ATTACKS[square.index()]
}

/// Fetch the squares a `color` Pawn on `square` could capture on.
#[inline(always)]
pub const fn pawn_attacks(square: Square, color: Color) -> Bitboard {
    match color {
        Color::White => WHITE_PAWN_ATTACKS[square.index()],
        Color::Black => BLACK_PAWN_ATTACKS[square.index()],
    }
}

/// Pawns capture one square diagonally forward.
const fn generate_pawn_attacks(color: Color) -> [Bitboard; Square::COUNT] {
    let mut boards = [Bitboard::EMPTY_BOARD; Square::COUNT];
    let forward = color.negation_multiplier();
    let mut i = 0;
    while i < Square::COUNT {
        let square = Square::from_index_unchecked(i);
        let mut bb = Bitboard::EMPTY_BOARD;
        if let Some(west) = square.offset(-1, forward) {
            bb = bb.or(west.bitboard());
        }
        if let Some(east) = square.offset(1, forward) {
            bb = bb.or(east.bitboard());
        }
        boards[i] = bb;
        i += 1;
    }
    boards
}

/// Generates the moves from every square for a "Leaper", a piece that jumps
/// straight to a square a fixed distance away.
///
/// Deltas that would leave the board are discarded.
const fn generate_leaper_mobility(deltas: &[(i8, i8)]) -> [Bitboard; Square::COUNT] {
    let mut mobility = [Bitboard::EMPTY_BOARD; Square::COUNT];

    let mut i = 0;
    while i < Square::COUNT {
        let square = Square::from_index_unchecked(i);
        let mut movement = Bitboard::EMPTY_BOARD;

        let mut j = 0;
        while j < deltas.len() {
            let (df, dr) = deltas[j];
            if let Some(shifted) = square.offset(df, dr) {
                movement = movement.or(shifted.bitboard());
            }
            j += 1;
        }

        mobility[i] = movement;
        i += 1;
    }

    mobility
}

/// Squares whose occupancy can change a slider's attacks from `square`.
///
/// This walks every ray but leaves off its final square: a piece on the edge cannot hide anything behind it.
pub fn relevant_occupancy(square: Square, deltas: &[(i8, i8)]) -> Bitboard {
    let mut mask = Bitboard::EMPTY_BOARD;
    for &(df, dr) in deltas {
        let mut ray = square;
        while let Some(next) = ray.offset(df, dr) {
            if next.offset(df, dr).is_none() {
                break;
            }
            mask.set(next);
            ray = next;
        }
    }
    mask
}

/// Slow, loop-based slider attacks, used to fill the magic tables and to check them.
///
/// Each ray stops at, and includes, the first square in `blockers`.
pub fn sliding_attacks(square: Square, blockers: Bitboard, deltas: &[(i8, i8)]) -> Bitboard {
    let mut attacks = Bitboard::EMPTY_BOARD;
    for &(df, dr) in deltas {
        let mut ray = square;
        while let Some(next) = ray.offset(df, dr) {
            attacks.set(next);
            if blockers.contains(next) {
                break;
            }
            ray = next;
        }
    }
    attacks
}

/// Per-square parameters of a magic lookup.
#[derive(Clone, Copy, Debug, Default)]
struct MagicEntry {
    mask: u64,
    magic: u64,
    shift: u8,
    offset: u32,
}

#[inline(always)]
const fn magic_index(entry: &MagicEntry, blockers: Bitboard) -> usize {
    let blockers = blockers.inner() & entry.mask;
    let hash = blockers.wrapping_mul(entry.magic);
    let index = (hash >> entry.shift) as usize;
    entry.offset as usize + index
}

/// Magic lookup table for one kind of slider.
///
/// All 64 squares share one flat `attacks` array; each entry's `offset` marks where its block starts.
struct SliderTable {
    entries: [MagicEntry; Square::COUNT],
    attacks: Vec<Bitboard>,
}

impl SliderTable {
    /// Searches a magic for every square and fills the attack array.
    fn new(deltas: &[(i8, i8)], rng: &mut XoShiRo) -> Self {
        let mut attacks = Vec::new();
        let entries = std::array::from_fn(|i| {
            let square = Square::from_index_unchecked(i);
            let mask = relevant_occupancy(square, deltas);
            let (magic, block) = find_magic(square, mask, deltas, rng);

            let offset = attacks.len() as u32;
            attacks.extend(block);

            MagicEntry {
                mask: mask.inner(),
                magic,
                shift: 64 - mask.population(),
                offset,
            }
        });

        Self { entries, attacks }
    }

    #[inline(always)]
    fn attacks(&self, square: Square, blockers: Bitboard) -> Bitboard {
        self.attacks[magic_index(&self.entries[square.index()], blockers)]
    }
}

/// Draws sparse candidates until one maps every occupancy subset of `mask` to a slot
/// that holds only its own attack set.
///
/// Two subsets may share a slot when their attack sets are equal. Returns the magic and its filled block.
fn find_magic(
    square: Square,
    mask: Bitboard,
    deltas: &[(i8, i8)],
    rng: &mut XoShiRo,
) -> (u64, Vec<Bitboard>) {
    let bits = mask.population();
    let shift = 64 - bits;
    let references: Vec<(Bitboard, Bitboard)> = mask
        .subsets()
        .map(|subset| (subset, sliding_attacks(square, subset, deltas)))
        .collect();

    let mut slots: Vec<Option<Bitboard>> = vec![None; 1 << bits];
    loop {
        let magic = rng.sparse();

        // Candidates that leave the top byte nearly empty rarely spread the subsets out.
        if (mask.inner().wrapping_mul(magic) >> 56).count_ones() < 6 {
            continue;
        }

        slots.fill(None);
        let found = references.iter().all(|&(subset, attacks)| {
            let index = (subset.inner().wrapping_mul(magic) >> shift) as usize;
            match slots[index] {
                None => {
                    slots[index] = Some(attacks);
                    true
                }
                Some(existing) => existing == attacks,
            }
        });

        if found {
            let block = slots
                .iter()
                .map(|slot| slot.unwrap_or(Bitboard::EMPTY_BOARD))
                .collect();
            return (magic, block);
        }
    }
}

/// Rook and Bishop magic tables.
struct AttackTables {
    rook: SliderTable,
    bishop: SliderTable,
}

impl AttackTables {
    fn new() -> Self {
        let timer = Instant::now();
        let mut rng = XoShiRo::new();
        let rook = SliderTable::new(&ROOK_DELTAS, &mut rng);
        let bishop = SliderTable::new(&BISHOP_DELTAS, &mut rng);

        tracing::debug!(
            rook_entries = rook.attacks.len(),
            bishop_entries = bishop.attacks.len(),
            elapsed_ms = timer.elapsed().as_millis() as u64,
            "built slider attack tables"
        );

        Self { rook, bishop }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Brute force version of the leaper tables.
    fn leaper_reference(square: Square, deltas: &[(i8, i8)]) -> Bitboard {
        Square::iter()
            .filter(|other| {
                let df = other.file().inner() as i8 - square.file().inner() as i8;
                let dr = other.rank().inner() as i8 - square.rank().inner() as i8;
                deltas.contains(&(df, dr))
            })
            .collect()
    }

    #[test]
    fn test_knight_table_matches_brute_force() {
        for square in Square::iter() {
            assert_eq!(
                knight_attacks(square),
                leaper_reference(square, &KNIGHT_DELTAS),
                "knight on {square}"
            );
        }
        assert_eq!(knight_attacks(Square::A1).population(), 2);
        assert_eq!(knight_attacks(Square::H8).population(), 2);
        assert_eq!(knight_attacks(Square::A4).population(), 4);
        assert_eq!(knight_attacks(Square::B1).population(), 3);
        assert_eq!(knight_attacks(Square::D4).population(), 8);
    }

    #[test]
    fn test_king_table_matches_brute_force() {
        for square in Square::iter() {
            assert_eq!(
                king_attacks(square),
                leaper_reference(square, &QUEEN_DELTAS),
                "king on {square}"
            );
        }
        assert_eq!(king_attacks(Square::A1).population(), 3);
        assert_eq!(king_attacks(Square::E4).population(), 8);
    }

    #[test]
    fn test_pawn_attacks() {
        assert_eq!(
            pawn_attacks(Square::E2, Color::White),
            Bitboard::from_square(Square::D3) | Square::F3
        );
        assert_eq!(
            pawn_attacks(Square::A7, Color::Black),
            Bitboard::from_square(Square::B6)
        );
        assert!(pawn_attacks(Square::H8, Color::White).is_empty());
    }

    #[test]
    fn test_relevant_occupancy_excludes_edges() {
        let rook = relevant_occupancy(Square::A1, &ROOK_DELTAS);
        assert_eq!(rook.population(), 12);
        assert!(!rook.contains(Square::A8));
        assert!(!rook.contains(Square::H1));

        let bishop = relevant_occupancy(Square::D4, &BISHOP_DELTAS);
        assert_eq!(bishop.population(), 9);
        assert!(!bishop.contains(Square::A1));
        assert!(!bishop.contains(Square::H8));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        initialize_tables();
        let first = tables() as *const AttackTables;
        initialize_tables();
        assert_eq!(first, tables() as *const AttackTables);
    }

    #[test]
    fn test_magic_lookups_match_ray_casting() {
        let mut rng = XoShiRo::from_seeds([7, 11, 13, 17]);
        for square in Square::iter() {
            let rook_mask = relevant_occupancy(square, &ROOK_DELTAS);
            let bishop_mask = relevant_occupancy(square, &BISHOP_DELTAS);

            // Every bishop subset is cheap to check; rook subsets are sampled.
            for subset in bishop_mask.subsets() {
                assert_eq!(
                    bishop_attacks(square, subset),
                    sliding_attacks(square, subset, &BISHOP_DELTAS),
                    "bishop on {square} with blockers {subset:?}"
                );
            }
            for subset in rook_mask.subsets().step_by(7) {
                assert_eq!(
                    rook_attacks(square, subset),
                    sliding_attacks(square, subset, &ROOK_DELTAS),
                    "rook on {square} with blockers {subset:?}"
                );
            }

            // Blockers outside the relevant mask, such as board edges, must not matter.
            for _ in 0..16 {
                let blockers = Bitboard::new(rng.get_next() & rng.get_next());
                assert_eq!(
                    rook_attacks(square, blockers),
                    sliding_attacks(square, blockers, &ROOK_DELTAS),
                    "rook on {square} with blockers {blockers:?}"
                );
                assert_eq!(
                    queen_attacks(square, blockers),
                    sliding_attacks(square, blockers, &QUEEN_DELTAS),
                    "queen on {square} with blockers {blockers:?}"
                );
            }
        }
    }
}
