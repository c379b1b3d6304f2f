use serde::{Deserialize, Serialize};

/// Mandelstam invariants of a 2 → 2 partonic scattering.
///
/// Passing the invariants as a named triple keeps the crossing assignment
/// explicit between the phase-space generator and the matrix element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mandelstam {
    /// Partonic centre-of-mass energy squared.
    pub s: f64,
    /// Momentum transfer to the first outgoing lepton.
    pub t: f64,
    /// Momentum transfer to the second outgoing lepton.
    pub u: f64,
}

impl Mandelstam {
    /// Creates a new invariant triple.
    pub const fn new(s: f64, t: f64, u: f64) -> Self {
        Self { s, t, u }
    }

    /// The same point with `t` and `u` exchanged.
    pub const fn swapped(&self) -> Self {
        Self {
            s: self.s,
            t: self.u,
            u: self.t,
        }
    }

    /// `s + t + u`, zero for massless external states.
    pub fn sum(&self) -> f64 {
        self.s + self.t + self.u
    }
}

/// A sampled partonic phase-space point together with its generation weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicPoint {
    mandelstam: Mandelstam,
    x1: f64,
    x2: f64,
    jacobian: f64,
}

impl KinematicPoint {
    /// Assembles a point; the generator is the usual producer.
    pub const fn new(mandelstam: Mandelstam, x1: f64, x2: f64, jacobian: f64) -> Self {
        Self {
            mandelstam,
            x1,
            x2,
            jacobian,
        }
    }

    /// Mandelstam invariants in the generator's crossing.
    pub fn mandelstam(&self) -> &Mandelstam {
        &self.mandelstam
    }

    /// Momentum fraction of the first incoming parton.
    pub fn x1(&self) -> f64 {
        self.x1
    }

    /// Momentum fraction of the second incoming parton.
    pub fn x2(&self) -> f64 {
        self.x2
    }

    /// Product of all variable-transform Jacobians.
    pub fn jacobian(&self) -> f64 {
        self.jacobian
    }
}
