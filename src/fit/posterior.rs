//! Log-posterior.

use crate::error::EstimateError;
use crate::fit::estimator::OrbitalParams;
use crate::models::OrbitModel;

impl<M: OrbitModel> OrbitalParams<M> {
    /// `lnprior(θ) + lnlike(θ)`.
    ///
    /// Outside the bounds the result is `−∞` and the orbit model is never
    /// evaluated, so out-of-box proposals cannot reach it.
    pub fn lnprob(&self, theta: &[f64]) -> Result<f64, EstimateError> {
        let lp = self.lnprior(theta)?;
        if !lp.is_finite() {
            return Ok(f64::NEG_INFINITY);
        }
        Ok(lp + self.lnlike(theta)?)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{Bound, Dataset, OrbitBounds, OrbitalElements, VzBounds};
    use crate::error::EstimateError;
    use crate::fit::OrbitalParams;
    use crate::models::{KeplerOrbit, OrbitError, OrbitModel};

    /// Fails loudly if the posterior ever asks for a curve.
    struct MustNotEvaluate;

    impl OrbitModel for MustNotEvaluate {
        fn radial_velocities(
            &self,
            _: &OrbitalElements,
            _: f64,
            _: &[f64],
        ) -> Result<Vec<f64>, OrbitError> {
            panic!("orbit model evaluated outside the prior support");
        }
    }

    fn data() -> Dataset {
        let t: Vec<f64> = (0..40).map(|i| 1495.0 + 0.1 * i as f64).collect();
        let rv: Vec<f64> = t.iter().map(|x| 0.04 * (x * 2.1).cos()).collect();
        Dataset::new(t, rv, vec![0.01; 40]).unwrap()
    }

    fn inside() -> Vec<f64> {
        let mut t = OrbitalElements::from_physical(58.1e-3, 2.98565, 1497.5, 11.0, 0.213)
            .to_array()
            .to_vec();
        t.push(0.02);
        t
    }

    #[test]
    fn posterior_equals_likelihood_inside_bounds() {
        let est = OrbitalParams::new(
            vec![data()],
            inside(),
            VzBounds::Single(Bound::new(-1.0, 1.0)),
            OrbitBounds::default(),
            1,
        )
        .unwrap();
        let theta = inside();
        assert_eq!(est.lnprior(&theta).unwrap(), 0.0);
        assert_eq!(est.lnprob(&theta).unwrap(), est.lnlike(&theta).unwrap());
    }

    #[test]
    fn out_of_bounds_short_circuits_model() {
        let est = OrbitalParams::with_model(
            MustNotEvaluate,
            vec![data()],
            inside(),
            VzBounds::Single(Bound::new(-1.0, 1.0)),
            OrbitBounds::default(),
            1,
        )
        .unwrap();

        let bounds = est.bounds().to_vec();
        for j in 0..bounds.len() {
            for x in [bounds[j].low, bounds[j].high, bounds[j].low - 1.0, bounds[j].high + 1.0] {
                let mut theta = inside();
                theta[j] = x;
                assert_eq!(est.lnprior(&theta).unwrap(), f64::NEG_INFINITY);
                assert_eq!(est.lnprob(&theta).unwrap(), f64::NEG_INFINITY, "j={j} x={x}");
            }
        }
    }

    #[test]
    fn orbit_errors_inside_bounds_propagate() {
        // Looser eccentricity bound than the default lets log10(e) = 0.1 through.
        let mut orbit = OrbitBounds::default();
        orbit.0[4] = Bound::new(-4.0, 1.0);
        let est = OrbitalParams::with_model(
            KeplerOrbit,
            vec![data()],
            inside(),
            VzBounds::Single(Bound::new(-1.0, 1.0)),
            orbit,
            1,
        )
        .unwrap();
        let mut theta = inside();
        theta[4] = 0.1;
        let err = est.lnprob(&theta).unwrap_err();
        assert!(matches!(err, EstimateError::Orbit(OrbitError::Eccentricity(_))));
    }
}
