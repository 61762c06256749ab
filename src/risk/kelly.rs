//! Kelly criterion position sizing.
//!
//! `f* = (b·p − q) / b` where `b` is the profit ratio, `p` the win
//! probability and `q = 1 − p`. The raw fraction is scaled down by a
//! conservative factor (half-Kelly by default) and capped.

use tracing::{debug, warn};

/// Optimal fraction of capital to allocate.
///
/// Edge cases: `p == 1` collapses to the cap (still scaled by the
/// conservative factor), `p == 0` and any negative raw Kelly return 0.
pub fn kelly_fraction(
    win_probability: f64,
    profit_ratio: f64,
    max_fraction: f64,
    conservative_factor: f64,
) -> f64 {
    debug_assert!((0.0..=1.0).contains(&win_probability));
    debug_assert!(profit_ratio > 0.0);
    debug_assert!(max_fraction > 0.0 && max_fraction <= 1.0);
    debug_assert!(conservative_factor > 0.0 && conservative_factor <= 1.0);

    if win_probability == 0.0 {
        warn!("Win probability is 0, returning 0 position size");
        return 0.0;
    }

    let raw = if win_probability >= 1.0 {
        // Certain execution: go straight to the cap.
        max_fraction
    } else {
        let loss_probability = 1.0 - win_probability;
        let raw = (profit_ratio * win_probability - loss_probability) / profit_ratio;
        if raw < 0.0 {
            warn!(
                win_probability,
                profit_ratio, "Negative Kelly fraction, no edge"
            );
            return 0.0;
        }
        raw
    };

    let adjusted = raw * conservative_factor;
    let fraction = adjusted.min(max_fraction);

    debug!(
        win_probability,
        profit_ratio, raw, adjusted, fraction, "Kelly sizing"
    );

    fraction
}

/// Estimate the probability that both legs execute as planned.
///
/// Weighted geometric mean (0.4 / 0.4 / 0.2) of a bucketed
/// liquidity-utilisation factor, the detector's confidence score, and a
/// clamped slippage-tolerance factor.
pub fn execution_probability(
    liquidity: f64,
    required_size: f64,
    confidence_score: f64,
    slippage_tolerance: f64,
) -> f64 {
    if liquidity <= 0.0 || required_size <= 0.0 {
        return 0.0;
    }

    let utilisation = required_size / liquidity;
    let liquidity_factor: f64 = if utilisation > 0.5 {
        0.3
    } else if utilisation > 0.3 {
        0.6
    } else if utilisation > 0.1 {
        0.8
    } else {
        0.95
    };

    let slippage_factor = (1.0 - slippage_tolerance * 2.0).clamp(0.7, 1.0);

    let probability =
        liquidity_factor.powf(0.4) * confidence_score.powf(0.4) * slippage_factor.powf(0.2);

    debug!(
        utilisation,
        liquidity_factor, confidence_score, slippage_factor, probability,
        "Execution probability"
    );

    probability
}
