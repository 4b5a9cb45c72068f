/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Default seed state. Fixed so that the magic search is reproducible between runs.
const SEEDS: [u64; 4] = [
    0x91C5_AB3C_EBFD_5A71,
    0x06BA_253B_9DD8_97CD,
    0x8015_B5E5_9CC2_75E9,
    0xF8F4_27FC_5411_D953,
];

/// A pseudo-random number generator using the xoshiro256** algorithm.
///
/// Reference: <https://prng.di.unimi.it/xoshiro256starstar.c>
#[derive(Clone, Debug)]
pub struct XoShiRo([u64; 4]);

impl XoShiRo {
    /// Construct a new generator from the crate's fixed seeds.
    #[inline(always)]
    pub const fn new() -> Self {
        Self(SEEDS)
    }

    /// Construct a new generator from caller-provided seeds.
    ///
    /// At least one seed must be nonzero, or the sequence is stuck at zero.
    #[inline(always)]
    pub const fn from_seeds(seeds: [u64; 4]) -> Self {
        Self(seeds)
    }

    /// Advance the generator and return the next value.
    pub fn get_next(&mut self) -> u64 {
        let s = &mut self.0;
        let result = s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = s[1] << 17;

        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];

        s[2] ^= t;
        s[3] = s[3].rotate_left(45);

        result
    }

    /// A value with few bits set, on average eight.
    ///
    /// Good magic multipliers tend to be sparse, so candidates are drawn from here.
    #[inline(always)]
    pub fn sparse(&mut self) -> u64 {
        self.get_next() & self.get_next() & self.get_next()
    }
}

impl Default for XoShiRo {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}
