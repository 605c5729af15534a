/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Liu & Layland utilisation bound.
//!
//! For `n` independent periodic tasks on one CPU under rate-monotonic
//! priorities, `U = Σ Cᵢ/Tᵢ ≤ n(2^(1/n) − 1)` guarantees schedulability.
//! Above the bound (but ≤ 1) the set may still be schedulable; the check is
//! therefore advisory and only ever produces a warning.
//!
//! | n | Bound |
//! |---|---|
//! | 1 | 1.000 |
//! | 2 | 0.828 |
//! | 6 | 0.735 |
//! | ∞ | ln 2 ≈ 0.693 |

/// `n × (2^(1/n) − 1)`; `0.0` for `n = 0`.
pub fn liu_layland_bound(n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let nf = n as f64;
    nf * (2.0_f64.powf(1.0 / nf) - 1.0)
}

/// Total utilisation of `(cost, period)` pairs.  Zero periods contribute
/// nothing.
pub fn utilisation(pairs: &[(u64, u64)]) -> f64 {
    pairs
        .iter()
        .filter(|(_, period)| *period > 0)
        .map(|&(cost, period)| cost as f64 / period as f64)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_values() {
        assert_eq!(liu_layland_bound(0), 0.0);
        assert!((liu_layland_bound(1) - 1.0).abs() < 1e-10);
        assert!((liu_layland_bound(2) - 0.8284).abs() < 1e-3);
        assert!((liu_layland_bound(6) - 0.7348).abs() < 1e-3);
    }

    #[test]
    fn bound_tends_to_ln2() {
        assert!((liu_layland_bound(1000) - 2.0_f64.ln()).abs() < 1e-3);
    }

    #[test]
    fn utilisation_sums_cost_over_period() {
        // The two default loads: 5/10 + 12/100
        let u = utilisation(&[(5, 10), (12, 100)]);
        assert!((u - 0.62).abs() < 1e-9);
    }

    #[test]
    fn zero_period_is_ignored() {
        assert_eq!(utilisation(&[(5, 0)]), 0.0);
    }
}
