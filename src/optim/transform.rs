//! Box-to-real reparameterization.
//!
//! Each bounded coordinate `x ∈ (lo, hi)` is searched through an unconstrained
//! coordinate `z`:
//!
//! - two finite edges: `x = lo + (hi − lo) · σ(z)` with `σ` the logistic function
//! - lower edge only:  `x = lo + exp(z)`
//! - upper edge only:  `x = hi − exp(z)`
//! - no edges:         `x = z`
//!
//! Any `z` maps strictly inside the box (up to rounding at extreme `|z|`), so
//! an unconstrained search never proposes an out-of-bounds point.

use crate::domain::Bound;
use crate::error::EstimateError;

/// Fraction of the box width used to pull starting points off an edge.
const EDGE_MARGIN: f64 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    Interval { lo: f64, width: f64 },
    Lower(f64),
    Upper(f64),
    Free,
}

/// Coordinate-wise transform for one bound list.
#[derive(Debug, Clone)]
pub struct BoxTransform {
    kinds: Vec<Kind>,
}

impl BoxTransform {
    pub fn new(bounds: &[Bound]) -> Result<Self, EstimateError> {
        let kinds = bounds
            .iter()
            .enumerate()
            .map(|(j, b)| {
                if !(b.low < b.high) {
                    return Err(EstimateError::config(format!(
                        "bound {j} must satisfy low < high, got ({}, {})",
                        b.low, b.high
                    )));
                }
                Ok(match (b.low.is_finite(), b.high.is_finite()) {
                    (true, true) => Kind::Interval {
                        lo: b.low,
                        width: b.high - b.low,
                    },
                    (true, false) => Kind::Lower(b.low),
                    (false, true) => Kind::Upper(b.high),
                    (false, false) => Kind::Free,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { kinds })
    }

    pub fn dim(&self) -> usize {
        self.kinds.len()
    }

    /// Map a bounded point to search coordinates, nudging edge points inward.
    pub fn to_unbounded(&self, x: &[f64]) -> Vec<f64> {
        self.kinds
            .iter()
            .zip(x)
            .map(|(kind, &xi)| match *kind {
                Kind::Interval { lo, width } => {
                    let u = ((xi - lo) / width).clamp(EDGE_MARGIN, 1.0 - EDGE_MARGIN);
                    (u / (1.0 - u)).ln()
                }
                Kind::Lower(lo) => (xi - lo).max(EDGE_MARGIN * lo.abs().max(1.0)).ln(),
                Kind::Upper(hi) => (hi - xi).max(EDGE_MARGIN * hi.abs().max(1.0)).ln(),
                Kind::Free => xi,
            })
            .collect()
    }

    /// Map search coordinates back into the box.
    pub fn to_bounded(&self, z: &[f64]) -> Vec<f64> {
        self.kinds
            .iter()
            .zip(z)
            .map(|(kind, &zi)| match *kind {
                Kind::Interval { lo, width } => lo + width * logistic(zi),
                Kind::Lower(lo) => lo + zi.exp(),
                Kind::Upper(hi) => hi - zi.exp(),
                Kind::Free => zi,
            })
            .collect()
    }
}

fn logistic(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bounds() -> Vec<Bound> {
        vec![
            Bound::new(-4.0, 4.0),
            Bound::new(0.0, f64::INFINITY),
            Bound::new(f64::NEG_INFINITY, 2.0),
            Bound::new(f64::NEG_INFINITY, f64::INFINITY),
        ]
    }

    #[test]
    fn roundtrip_interior_points() {
        let t = BoxTransform::new(&bounds()).unwrap();
        let x = [0.475, 3.5, -7.0, 42.0];
        let back = t.to_bounded(&t.to_unbounded(&x));
        for (a, b) in x.iter().zip(&back) {
            assert_relative_eq!(*a, *b, max_relative = 1e-12);
        }
    }

    #[test]
    fn extreme_search_coordinates_stay_inside() {
        let t = BoxTransform::new(&bounds()[..1]).unwrap();
        for &z in &[-30.0, -5.0, 0.0, 5.0, 30.0] {
            let x = t.to_bounded(&[z])[0];
            assert!(x > -4.0 && x < 4.0, "z={z} -> x={x}");
        }
    }

    #[test]
    fn edge_points_are_nudged_inward() {
        let t = BoxTransform::new(&bounds()).unwrap();
        let z = t.to_unbounded(&[4.0, 0.0, 2.0, 0.0]);
        assert!(z.iter().all(|v| v.is_finite()));
        let x = t.to_bounded(&z);
        assert!(x[0] < 4.0 && x[1] > 0.0 && x[2] < 2.0);
    }

    #[test]
    fn rejects_inverted_bounds() {
        assert!(BoxTransform::new(&[Bound::new(1.0, 1.0)]).is_err());
        assert!(BoxTransform::new(&[Bound::new(2.0, 1.0)]).is_err());
    }
}
