use dyaa_core::{ErrorInfo, GenError};
use serde::{Deserialize, Serialize};

use crate::kinematics::{KinematicPoint, Mandelstam};

/// Dilepton observables derived from a phase-space point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedObservables {
    /// Lepton transverse momentum.
    pub ptl: f64,
    /// Dilepton invariant mass.
    pub mll: f64,
    /// Dilepton rapidity.
    pub yll: f64,
    /// Absolute rapidity of the positive lepton.
    pub ylp: f64,
    /// Absolute rapidity of the negative lepton.
    pub ylm: f64,
}

impl DerivedObservables {
    /// Computes the observables, or `None` for degenerate kinematics
    /// (`s <= 0`, vanishing or negative `t u / s`, or any non-finite value).
    pub fn compute(point: &KinematicPoint) -> Option<Self> {
        let Mandelstam { s, t, u } = *point.mandelstam();
        if !(s > 0.0) {
            return None;
        }
        let ptl2 = t * u / s;
        if !(ptl2 > 0.0 && ptl2.is_finite()) {
            return None;
        }
        let ptl = ptl2.sqrt();
        let mll = s.sqrt();
        let yll = 0.5 * (point.x1() / point.x2()).ln();
        // analytically ptl <= mll / 2, so only rounding can push the argument below one
        let eta = (0.5 * mll / ptl).max(1.0).acosh();
        let ylp = (yll + eta).abs();
        let ylm = (yll - eta).abs();

        let observables = Self {
            ptl,
            mll,
            yll,
            ylp,
            ylm,
        };
        observables.is_finite().then_some(observables)
    }

    fn is_finite(&self) -> bool {
        [self.ptl, self.mll, self.yll, self.ylp, self.ylm]
            .iter()
            .all(|value| value.is_finite())
    }
}

/// Fiducial acceptance cuts; the defaults are the LO cuts of the CMS 7 TeV
/// Drell-Yan measurement in the invariant-mass slice around the Z peak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiducialCuts {
    /// Minimum lepton transverse momentum in GeV.
    #[serde(default = "default_ptl_min")]
    pub ptl_min: f64,
    /// Maximum absolute dilepton rapidity.
    #[serde(default = "default_rapidity_max")]
    pub yll_max: f64,
    /// Maximum absolute rapidity of each lepton.
    #[serde(default = "default_rapidity_max")]
    pub ylep_max: f64,
    /// Minimum dilepton invariant mass in GeV.
    #[serde(default = "default_mll_min")]
    pub mll_min: f64,
    /// Maximum dilepton invariant mass in GeV.
    #[serde(default = "default_mll_max")]
    pub mll_max: f64,
}

fn default_ptl_min() -> f64 {
    14.0
}

fn default_rapidity_max() -> f64 {
    2.4
}

fn default_mll_min() -> f64 {
    60.0
}

fn default_mll_max() -> f64 {
    120.0
}

impl Default for FiducialCuts {
    fn default() -> Self {
        Self {
            ptl_min: default_ptl_min(),
            yll_max: default_rapidity_max(),
            ylep_max: default_rapidity_max(),
            mll_min: default_mll_min(),
            mll_max: default_mll_max(),
        }
    }
}

/// Outcome of running a point through the [`EventFilter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    /// Passed every cut.
    Accepted(DerivedObservables),
    /// Well-defined observables that fail a cut.
    Rejected,
    /// Observables could not be computed.
    Degenerate,
}

/// Derives observables from kinematic points and applies acceptance cuts.
pub trait EventFilter {
    /// Classifies a point.
    fn select(&self, point: &KinematicPoint) -> Selection;
}

impl FiducialCuts {
    /// Rejects cut sets that no event can pass: non-finite values, negative
    /// rapidity bounds or `mll_min > mll_max`.
    pub fn validate(&self) -> Result<(), GenError> {
        let values = [
            ("ptl_min", self.ptl_min),
            ("yll_max", self.yll_max),
            ("ylep_max", self.ylep_max),
            ("mll_min", self.mll_min),
            ("mll_max", self.mll_max),
        ];
        if let Some((name, value)) = values.iter().find(|(_, value)| !value.is_finite()) {
            return Err(GenError::Config(
                ErrorInfo::new("cut-window", "cut values must be finite")
                    .with_context(*name, value.to_string()),
            ));
        }
        if self.yll_max < 0.0 || self.ylep_max < 0.0 {
            return Err(GenError::Config(
                ErrorInfo::new("cut-window", "rapidity bounds must not be negative")
                    .with_context("yll_max", self.yll_max.to_string())
                    .with_context("ylep_max", self.ylep_max.to_string()),
            ));
        }
        if self.mll_min > self.mll_max {
            return Err(GenError::Config(
                ErrorInfo::new("cut-window", "require mll_min <= mll_max")
                    .with_context("mll_min", self.mll_min.to_string())
                    .with_context("mll_max", self.mll_max.to_string()),
            ));
        }
        Ok(())
    }

    /// Whether every cut holds; all comparisons are inclusive.
    pub fn accepts(&self, obs: &DerivedObservables) -> bool {
        obs.ptl >= self.ptl_min
            && obs.yll.abs() <= self.yll_max
            && obs.ylp <= self.ylep_max
            && obs.ylm <= self.ylep_max
            && obs.mll >= self.mll_min
            && obs.mll <= self.mll_max
    }
}

impl EventFilter for FiducialCuts {
    fn select(&self, point: &KinematicPoint) -> Selection {
        match DerivedObservables::compute(point) {
            None => Selection::Degenerate,
            Some(obs) if self.accepts(&obs) => Selection::Accepted(obs),
            Some(_) => Selection::Rejected,
        }
    }
}
