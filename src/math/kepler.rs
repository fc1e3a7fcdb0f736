//! Kepler's equation for elliptic orbits.
//!
//! Solves `M = E - e sin E` for the eccentric anomaly `E` and converts to the
//! true anomaly `ν`.
//!
//! Numerical notes:
//! - `M` is reduced to `[-π, π)` first; the solution then lies in the same
//!   half-plane, which gives a bracket `[-π, π]` for the safeguard.
//! - Newton steps that leave the bracket fall back to bisection, so the
//!   iteration converges for every `e ∈ [0, 1)` including `e → 1`.

use std::f64::consts::{PI, TAU};

/// Convergence threshold on `|ΔE|`.
const TOL: f64 = 1e-14;

/// Hard cap on iterations; bisection alone converges well within this.
const MAX_ITER: usize = 100;

/// Reduce an angle to `[-π, π)`.
pub fn wrap_pi(angle: f64) -> f64 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Mean anomaly at time `t` for periastron epoch `t0` and period `period`.
pub fn mean_anomaly(t: f64, t0: f64, period: f64) -> f64 {
    wrap_pi(TAU * (t - t0) / period)
}

/// Eccentric anomaly for mean anomaly `m` (radians) and eccentricity `e ∈ [0, 1)`.
pub fn eccentric_anomaly(m: f64, e: f64) -> f64 {
    let m = wrap_pi(m);
    if e == 0.0 {
        return m;
    }

    // Starting guess recommended for high eccentricities.
    let mut x = if e > 0.8 { PI.copysign(m) } else { m };
    let (mut lo, mut hi) = (-PI, PI);

    for _ in 0..MAX_ITER {
        let f = x - e * x.sin() - m;
        if f == 0.0 {
            return x;
        }
        if f > 0.0 {
            hi = x;
        } else {
            lo = x;
        }
        let fp = 1.0 - e * x.cos();
        let mut next = x - f / fp;
        if !(next > lo && next < hi) || !next.is_finite() {
            next = 0.5 * (lo + hi);
        }
        let step = (next - x).abs();
        x = next;
        if step < TOL {
            break;
        }
    }
    x
}

/// True anomaly from eccentric anomaly.
pub fn true_anomaly(ecc_anomaly: f64, e: f64) -> f64 {
    let half = 0.5 * ecc_anomaly;
    2.0 * (((1.0 + e) / (1.0 - e)).sqrt() * half.sin()).atan2(half.cos())
}
