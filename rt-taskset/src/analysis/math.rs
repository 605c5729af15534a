/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! GCD and checked LCM over tick periods.

use super::HyperperiodError;
use crate::clock::Tick;

/// Euclidean GCD; `gcd(0, x) == x`.
pub fn gcd(mut a: Tick, mut b: Tick) -> Tick {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// LCM that reports overflow instead of wrapping.  Zero if either input is
/// zero.
pub fn lcm(a: Tick, b: Tick) -> Result<Tick, HyperperiodError> {
    if a == 0 || b == 0 {
        return Ok(0);
    }
    (a / gcd(a, b))
        .checked_mul(b)
        .ok_or(HyperperiodError::Overflow { a, b })
}

/// LCM of every period in `periods`; `0` for an empty slice.
pub fn lcm_all(periods: &[Tick]) -> Result<Tick, HyperperiodError> {
    match periods.split_first() {
        None => Ok(0),
        Some((&first, rest)) => rest.iter().try_fold(first, |acc, &p| lcm(acc, p)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gcd_cases() {
        assert_eq!(gcd(50, 20), 10);
        assert_eq!(gcd(17, 13), 1);
        assert_eq!(gcd(0, 9), 9);
        assert_eq!(gcd(9, 0), 9);
    }

    #[test]
    fn lcm_cases() {
        assert_eq!(lcm(20, 50).unwrap(), 100);
        assert_eq!(lcm(10, 100).unwrap(), 100);
        assert_eq!(lcm(0, 10).unwrap(), 0);
    }

    #[test]
    fn lcm_overflow_is_an_error() {
        let a = u64::MAX / 2 + 1;
        let b = u64::MAX / 2 + 3;
        assert!(matches!(lcm(a, b), Err(HyperperiodError::Overflow { .. })));
    }

    #[test]
    fn lcm_all_of_default_periods() {
        assert_eq!(lcm_all(&[50, 50, 100, 20, 10, 100]).unwrap(), 100);
        assert_eq!(lcm_all(&[]).unwrap(), 0);
        assert_eq!(lcm_all(&[7]).unwrap(), 7);
    }
}
