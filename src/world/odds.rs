//! Weighted coin flips for procedural decisions.

use rand::Rng;

/// True with probability `1 / odds`. Odds of 0 or 1 always succeed.
pub fn random_bool<R: Rng + ?Sized>(rng: &mut R, odds: u32) -> bool {
    if odds <= 1 {
        return true;
    }
    rng.gen_range(0..odds) == 0
}
