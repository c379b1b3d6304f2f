use std::f64::consts::PI;

use dyaa_core::{ErrorInfo, GenError};

use crate::kinematics::{KinematicPoint, Mandelstam};

/// Maps uniform variates onto partonic phase-space points.
pub trait PhaseSpaceGenerator {
    /// Generates a point from three variates in `[0, 1)`.
    fn generate(&self, r: [f64; 3]) -> KinematicPoint;
}

/// Hadronic 2 → 2 phase space for massless leptons, sampled flat in
/// `ln(tau)`, rapidity and `cos(theta)` between two invariant masses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HadronicPhaseSpace {
    mmin: f64,
    mmax: f64,
}

impl HadronicPhaseSpace {
    /// Variates are clamped into `[EPSILON_BORDER, 1 - EPSILON_BORDER]`.
    pub const EPSILON_BORDER: f64 = 1e-10;

    /// Creates the generator for the invariant-mass window `[mmin, mmax]` in GeV.
    pub fn new(mmin: f64, mmax: f64) -> Result<Self, GenError> {
        if !(mmin.is_finite() && mmax.is_finite()) || mmin <= 0.0 || mmin >= mmax {
            return Err(GenError::Config(
                ErrorInfo::new("mass-window", "require 0 < mmin < mmax")
                    .with_context("mmin", mmin.to_string())
                    .with_context("mmax", mmax.to_string()),
            ));
        }
        Ok(Self { mmin, mmax })
    }

    /// Lower edge of the mass window.
    pub fn mmin(&self) -> f64 {
        self.mmin
    }

    /// Upper edge of the mass window.
    pub fn mmax(&self) -> f64 {
        self.mmax
    }

    /// Smallest reachable `s`.
    pub fn smin(&self) -> f64 {
        self.mmin * self.mmin
    }

    /// Largest reachable `s`; fixes `s = x1 * x2 * smax`.
    pub fn smax(&self) -> f64 {
        self.mmax * self.mmax
    }
}

impl PhaseSpaceGenerator for HadronicPhaseSpace {
    fn generate(&self, r: [f64; 3]) -> KinematicPoint {
        let [r1, r2, r3] = r.map(|value| {
            value.clamp(
                HadronicPhaseSpace::EPSILON_BORDER,
                1.0 - HadronicPhaseSpace::EPSILON_BORDER,
            )
        });
        hadronic_pspgen(self.mmin, self.mmax, r1, r2, r3)
    }
}

/// Generates a phase-space point without validating or clamping its inputs.
///
/// `tau = tau0^r1` and `x1 = tau^(1 - r2)` sample `ln(tau)` and the rapidity
/// flat; `cos(theta) = 2 r3 - 1` is flat and `phi` is integrated out.
pub fn hadronic_pspgen(mmin: f64, mmax: f64, r1: f64, r2: f64, r3: f64) -> KinematicPoint {
    let smin = mmin * mmin;
    let smax = mmax * mmax;

    let tau0 = smin / smax;
    let tau = tau0.powf(r1);
    let y = tau.powf(1.0 - r2);
    let x1 = y;
    let x2 = tau / y;
    let s = tau * smax;

    let mut jacobian = tau * tau0.ln().powi(2) * r1;

    // theta integration (in the CMS)
    let cos_theta = 2.0 * r3 - 1.0;
    jacobian *= 2.0;

    let t = -0.5 * s * (1.0 - cos_theta);
    let u = -0.5 * s * (1.0 + cos_theta);

    // phi integration
    jacobian *= 2.0 * PI;

    KinematicPoint::new(Mandelstam::new(s, t, u), x1, x2, jacobian)
}
