//! Point arithmetic for tap resolution.

use six_seven_core::{
    ActivePowerUp, SpawnedDigit, COMBO_STEP, GOLDEN_MULTIPLIER, MAX_COMBO_MULTIPLIER,
    POINTS_PER_HIT,
};

/// Multiplier earned by a streak: one step per five hits, capped at five.
pub(crate) fn combo_multiplier(combo: u32) -> u32 {
    (combo / COMBO_STEP).saturating_add(1).min(MAX_COMBO_MULTIPLIER)
}

/// Points awarded for hitting `digit` with the provided streak.
///
/// `active` is the power-up that was running before the tap, so a power-up
/// collected by this very tap only affects later hits. A golden hit still
/// stacks with an already running multiplier.
pub(crate) fn hit_points(digit: &SpawnedDigit, combo: u32, active: Option<&ActivePowerUp>) -> u64 {
    let base = POINTS_PER_HIT.saturating_mul(u64::from(combo_multiplier(combo)));
    let awarded = if digit.is_golden() {
        base.saturating_mul(GOLDEN_MULTIPLIER)
    } else {
        base
    };
    let boost = active.map_or(1, |power_up| power_up.kind().score_multiplier());
    awarded.saturating_mul(boost)
}
